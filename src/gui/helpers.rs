//! Small formatting helpers for the GUI

use crate::recipients::REQUIRED_PERCENTAGE_TOTAL;

/// Helper to get a label for gas speed values
pub fn gas_speed_label(speed: f32) -> &'static str {
    if speed < 0.9 {
        "Slow"
    } else if speed < 1.2 {
        "Standard"
    } else if speed < 1.8 {
        "Fast"
    } else {
        "Aggressive"
    }
}

/// Get a warning message for extreme gas speed values, if any
pub fn gas_speed_warning(speed: f32) -> Option<&'static str> {
    if speed < 0.85 {
        Some("⚠ Very low: Transaction may be stuck for hours or days")
    } else if speed > 2.0 {
        Some("⚠ Very high: You may significantly overpay for gas")
    } else {
        None
    }
}

/// Text for the live percentage counter and whether the total is submittable.
pub fn percentage_total_label(total: u64) -> (String, bool) {
    let ok = total == REQUIRED_PERCENTAGE_TOTAL;
    let text = if ok {
        format!("Total: {}% ✔", total)
    } else if total < REQUIRED_PERCENTAGE_TOTAL {
        format!("Total: {}% ({}% left)", total, REQUIRED_PERCENTAGE_TOTAL - total)
    } else {
        format!("Total: {}% ({}% over)", total, total - REQUIRED_PERCENTAGE_TOTAL)
    };
    (text, ok)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== gas speed tests ====================

    #[test]
    fn test_gas_speed_label() {
        assert_eq!(gas_speed_label(0.5), "Slow");
        assert_eq!(gas_speed_label(1.0), "Standard");
        assert_eq!(gas_speed_label(1.5), "Fast");
        assert_eq!(gas_speed_label(2.5), "Aggressive");
    }

    #[test]
    fn test_gas_speed_warning_bounds() {
        assert!(gas_speed_warning(0.84).unwrap().contains("Very low"));
        assert!(gas_speed_warning(0.85).is_none());
        assert!(gas_speed_warning(2.0).is_none());
        assert!(gas_speed_warning(2.01).unwrap().contains("Very high"));
    }

    // ==================== percentage_total_label tests ====================

    #[test]
    fn test_percentage_total_label_exact() {
        let (text, ok) = percentage_total_label(100);
        assert!(ok);
        assert!(text.starts_with("Total: 100%"));
    }

    #[test]
    fn test_percentage_total_label_under() {
        assert_eq!(percentage_total_label(90), ("Total: 90% (10% left)".to_string(), false));
    }

    #[test]
    fn test_percentage_total_label_over() {
        assert_eq!(percentage_total_label(110), ("Total: 110% (10% over)".to_string(), false));
    }
}

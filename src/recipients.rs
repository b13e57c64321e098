//! Recipient rows and the percentage validation that gates a split.
//!
//! Rows hold raw text exactly as typed; nothing is validated when rows are added,
//! edited or removed. [`build_split_plan`] is the single place where rows turn into
//! addresses and percentages.

use crate::error::SplitterError;
use anyhow::{anyhow, Result};
use ethers::types::{Address, U256};

/// Percentages of a valid split add up to exactly this.
pub const REQUIRED_PERCENTAGE_TOTAL: u64 = 100;

/// One editable (address, percentage) row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientRow {
    pub id: u64,
    pub address: String,
    pub percentage: String,
}

impl RecipientRow {
    /// Percentage as submitted, or `None` when the row is skipped for it.
    pub fn parsed_percentage(&self) -> Option<u64> {
        self.percentage.trim().parse::<u64>().ok().filter(|p| *p > 0)
    }

    /// Rows without an address or without a positive percentage take no part in a split.
    pub fn is_active(&self) -> bool {
        !self.address.trim().is_empty() && self.parsed_percentage().is_some()
    }

    /// Why a partly filled row will be left out of the split. Untouched rows have no reason.
    pub fn skip_reason(&self) -> Option<&'static str> {
        let has_address = !self.address.trim().is_empty();
        let has_percentage = !self.percentage.trim().is_empty();
        match (has_address, has_percentage) {
            (false, false) => None,
            (false, true) => Some("No address; this row is skipped"),
            _ if self.parsed_percentage().is_none() => {
                Some("Percentage must be a whole number above 0; this row is skipped")
            }
            _ => None,
        }
    }
}

/// Ordered, unbounded list of recipient rows.
#[derive(Debug, Default, Clone)]
pub struct RecipientList {
    rows: Vec<RecipientRow>,
    next_id: u64,
}

impl RecipientList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an empty row and return its id.
    pub fn add(&mut self) -> u64 {
        self.push(String::new(), String::new())
    }

    fn push(&mut self, address: String, percentage: String) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.rows.push(RecipientRow {
            id,
            address,
            percentage,
        });
        id
    }

    /// Remove exactly the row with this id. Returns false if no such row exists.
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.rows.len();
        self.rows.retain(|row| row.id != id);
        self.rows.len() != before
    }

    pub fn rows(&self) -> &[RecipientRow] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [RecipientRow] {
        &mut self.rows
    }

    #[cfg(test)]
    pub fn get_mut(&mut self, id: u64) -> Option<&mut RecipientRow> {
        self.rows.iter_mut().find(|row| row.id == id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum of the percentages that would currently be submitted.
    pub fn percentage_total(&self) -> u64 {
        self.rows
            .iter()
            .filter(|row| row.is_active())
            .filter_map(RecipientRow::parsed_percentage)
            .fold(0u64, u64::saturating_add)
    }

    /// Append rows from `address,percentage` text. Returns how many rows were added.
    pub fn import_csv(&mut self, text: &str) -> Result<usize> {
        let entries = parse_recipient_csv(text)?;
        let count = entries.len();
        for (address, percentage) in entries {
            self.push(address, percentage);
        }
        Ok(count)
    }
}

/// Parse `address,percentage` lines (comma or whitespace separated).
///
/// A first line whose address column is not hex (e.g. `address,percent`) is taken
/// as a header and skipped. Values are kept as text; they are validated at submission.
pub fn parse_recipient_csv(text: &str) -> Result<Vec<(String, String)>> {
    let normalized: String = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            if line.contains(',') {
                line.to_string()
            } else {
                line.split_whitespace().collect::<Vec<_>>().join(",")
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(normalized.as_bytes());

    let mut entries = Vec::new();
    for (line_idx, record) in reader.records().enumerate() {
        let record = record.map_err(|e| anyhow!("Line {}: {}", line_idx + 1, e))?;
        if record.len() != 2 {
            return Err(anyhow!(
                "Line {}: expected `address,percentage`, got {} fields",
                line_idx + 1,
                record.len()
            ));
        }
        let address = record[0].to_string();
        let percentage = record[1].to_string();
        if line_idx == 0 && !address.starts_with("0x") && percentage.parse::<u64>().is_err() {
            continue;
        }
        entries.push((address, percentage));
    }
    Ok(entries)
}

/// Validated recipients and percentages, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPlan {
    pub recipients: Vec<Address>,
    pub percentages: Vec<U256>,
    pub total: u64,
}

/// Turn rows into a split plan.
///
/// Inactive rows are skipped. A non-empty address that does not parse fails the
/// whole plan, and so does any total other than exactly 100.
pub fn build_split_plan(rows: &[RecipientRow]) -> Result<SplitPlan, SplitterError> {
    let mut recipients = Vec::new();
    let mut percentages = Vec::new();
    let mut total = 0u64;

    for (idx, row) in rows.iter().enumerate() {
        let Some(percentage) = row.parsed_percentage() else {
            continue;
        };
        let address_text = row.address.trim();
        if address_text.is_empty() {
            continue;
        }
        let address: Address = address_text.parse().map_err(|_| SplitterError::InvalidRecipient {
            row: idx + 1,
            address: address_text.to_string(),
        })?;

        recipients.push(address);
        percentages.push(U256::from(percentage));
        total = total.saturating_add(percentage);
    }

    if total != REQUIRED_PERCENTAGE_TOTAL {
        return Err(SplitterError::PercentageTotal(total));
    }

    Ok(SplitPlan {
        recipients,
        percentages,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const B: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
    const C: &str = "0xcccccccccccccccccccccccccccccccccccccccc";

    fn list(rows: &[(&str, &str)]) -> RecipientList {
        let mut list = RecipientList::new();
        for (address, percentage) in rows {
            let id = list.add();
            let row = list.get_mut(id).unwrap();
            row.address = address.to_string();
            row.percentage = percentage.to_string();
        }
        list
    }

    // ==================== editor tests ====================

    #[test]
    fn test_add_creates_empty_row() {
        let mut list = RecipientList::new();
        let id = list.add();
        assert_eq!(list.len(), 1);
        assert_eq!(list.rows()[0].id, id);
        assert!(list.rows()[0].address.is_empty());
        assert!(list.rows()[0].percentage.is_empty());
    }

    #[test]
    fn test_ids_are_unique_after_removal() {
        let mut list = RecipientList::new();
        let first = list.add();
        list.remove(first);
        let second = list.add();
        assert_ne!(first, second);
    }

    #[test]
    fn test_remove_only_that_row() {
        let mut list = list(&[(A, "50"), (B, "25"), (C, "50")]);
        let middle = list.rows()[1].id;
        assert!(list.remove(middle));
        let addresses: Vec<&str> = list.rows().iter().map(|r| r.address.as_str()).collect();
        assert_eq!(addresses, vec![A, C]);

        let plan = build_split_plan(list.rows()).unwrap();
        assert_eq!(plan.recipients, vec![A.parse().unwrap(), C.parse().unwrap()]);
    }

    #[test]
    fn test_remove_unknown_id() {
        let mut list = list(&[(A, "100")]);
        assert!(!list.remove(999));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_no_row_limit() {
        let mut list = RecipientList::new();
        for _ in 0..500 {
            list.add();
        }
        assert_eq!(list.len(), 500);
    }

    #[test]
    fn test_percentage_total_ignores_inactive_rows() {
        let list = list(&[(A, "60"), ("", "30"), (B, "abc"), (C, "15")]);
        assert_eq!(list.percentage_total(), 75);
    }

    #[test]
    fn test_skip_reason_flags_fractional_and_suffixed_percentages() {
        let list = list(&[(A, "12.5"), (B, "60%"), (C, "0"), (A, "-5")]);
        for row in list.rows() {
            assert!(row.skip_reason().unwrap().contains("whole number"), "{:?}", row);
        }
    }

    #[test]
    fn test_skip_reason_missing_address() {
        let list = list(&[("  ", "40")]);
        assert!(list.rows()[0].skip_reason().unwrap().contains("No address"));
    }

    #[test]
    fn test_skip_reason_none_for_blank_or_valid_rows() {
        let list = list(&[("", ""), (A, "40"), (B, " 60 ")]);
        assert!(list.rows().iter().all(|row| row.skip_reason().is_none()));
    }

    // ==================== build_split_plan tests ====================

    #[test]
    fn test_plan_sixty_forty() {
        let list = list(&[(A, "60"), (B, "40")]);
        let plan = build_split_plan(list.rows()).unwrap();
        assert_eq!(plan.recipients, vec![A.parse().unwrap(), B.parse().unwrap()]);
        assert_eq!(plan.percentages, vec![U256::from(60), U256::from(40)]);
        assert_eq!(plan.total, 100);
    }

    #[test]
    fn test_plan_sum_ninety_rejected() {
        let list = list(&[(A, "60"), (B, "30")]);
        assert_eq!(build_split_plan(list.rows()), Err(SplitterError::PercentageTotal(90)));
    }

    #[test]
    fn test_plan_empty_address_filtered_then_rejected() {
        let list = list(&[("", "50"), (C, "50")]);
        assert_eq!(build_split_plan(list.rows()), Err(SplitterError::PercentageTotal(50)));
    }

    #[test]
    fn test_plan_over_hundred_rejected() {
        let list = list(&[(A, "70"), (B, "40")]);
        assert_eq!(build_split_plan(list.rows()), Err(SplitterError::PercentageTotal(110)));
    }

    #[test]
    fn test_plan_no_rows_rejected() {
        assert_eq!(build_split_plan(&[]), Err(SplitterError::PercentageTotal(0)));
    }

    #[test]
    fn test_plan_skips_zero_and_unparseable_percentages() {
        let list = list(&[(A, "0"), (B, "x"), (C, "100"), (A, ""), (B, "-5")]);
        let plan = build_split_plan(list.rows()).unwrap();
        assert_eq!(plan.recipients, vec![C.parse().unwrap()]);
        assert_eq!(plan.percentages, vec![U256::from(100)]);
    }

    #[test]
    fn test_plan_skipped_row_does_not_need_valid_address() {
        // the row is skipped for its percentage before its address is looked at
        let list = list(&[("garbage", "0"), (A, "100")]);
        assert!(build_split_plan(list.rows()).is_ok());
    }

    #[test]
    fn test_plan_invalid_address_rejected() {
        let list = list(&[(A, "50"), ("0xnothex", "50")]);
        assert_eq!(
            build_split_plan(list.rows()),
            Err(SplitterError::InvalidRecipient {
                row: 2,
                address: "0xnothex".to_string()
            })
        );
    }

    #[test]
    fn test_plan_keeps_display_order_and_duplicates() {
        let list = list(&[(B, "10"), (A, "20"), (B, "70")]);
        let plan = build_split_plan(list.rows()).unwrap();
        assert_eq!(
            plan.recipients,
            vec![B.parse().unwrap(), A.parse().unwrap(), B.parse().unwrap()]
        );
        assert_eq!(
            plan.percentages,
            vec![U256::from(10), U256::from(20), U256::from(70)]
        );
    }

    #[test]
    fn test_plan_trims_whitespace() {
        let list = list(&[(&format!("  {}  ", A), " 100 ")]);
        assert!(build_split_plan(list.rows()).is_ok());
    }

    // ==================== CSV import tests ====================

    #[test]
    fn test_parse_recipient_csv_commas_and_spaces() {
        let text = format!("{},60\n\n{} 40\n", A, B);
        let entries = parse_recipient_csv(&text).unwrap();
        assert_eq!(
            entries,
            vec![
                (A.to_string(), "60".to_string()),
                (B.to_string(), "40".to_string())
            ]
        );
    }

    #[test]
    fn test_parse_recipient_csv_skips_header() {
        let text = format!("address,percentage\n{},100\n", A);
        let entries = parse_recipient_csv(&text).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, A);
    }

    #[test]
    fn test_parse_recipient_csv_wrong_field_count() {
        let text = format!("{},60,extra\n", A);
        let err = parse_recipient_csv(&text).unwrap_err();
        assert!(err.to_string().contains("Line 1"));
    }

    #[test]
    fn test_import_csv_appends_rows() {
        let mut list = list(&[(A, "50")]);
        let added = list.import_csv(&format!("{},25\n{},25", B, C)).unwrap();
        assert_eq!(added, 2);
        assert_eq!(list.len(), 3);
        assert!(build_split_plan(list.rows()).is_ok());
    }
}

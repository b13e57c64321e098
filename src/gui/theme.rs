//! Centralized theme and styling system for the GUI

use eframe::egui;

#[derive(Clone, Copy)]
pub struct AppTheme {
    // Base colors
    pub background: egui::Color32,
    pub surface: egui::Color32,
    pub surface_hover: egui::Color32,
    pub surface_active: egui::Color32,
    pub panel_fill: egui::Color32,
    pub text_primary: egui::Color32,
    pub text_secondary: egui::Color32,

    // Semantic colors
    pub primary: egui::Color32,
    pub secondary: egui::Color32,
    pub success: egui::Color32,
    pub warning: egui::Color32,
    pub error: egui::Color32,
    pub accent: egui::Color32,

    // Spacing constants
    pub spacing_sm: f32,
    pub spacing_md: f32,
    pub spacing_lg: f32,

    // Button sizes
    pub button_small: egui::Vec2,
    pub button_medium: egui::Vec2,
}

impl Default for AppTheme {
    fn default() -> Self {
        Self {
            background: egui::Color32::from_rgb(10, 12, 16),
            surface: egui::Color32::from_rgb(18, 21, 28),
            surface_hover: egui::Color32::from_rgb(28, 32, 42),
            surface_active: egui::Color32::from_rgb(38, 44, 58),
            panel_fill: egui::Color32::from_rgb(14, 16, 22),
            text_primary: egui::Color32::from_rgb(222, 228, 240),
            text_secondary: egui::Color32::from_rgb(150, 158, 175),

            primary: egui::Color32::from_rgb(98, 160, 255),
            secondary: egui::Color32::from_rgb(70, 76, 92),
            success: egui::Color32::from_rgb(80, 210, 140),
            warning: egui::Color32::from_rgb(255, 176, 64),
            error: egui::Color32::from_rgb(255, 96, 96),
            accent: egui::Color32::from_rgb(0, 190, 190),

            spacing_sm: 8.0,
            spacing_md: 16.0,
            spacing_lg: 24.0,

            button_small: egui::vec2(32.0, 24.0),
            button_medium: egui::vec2(140.0, 34.0),
        }
    }
}

impl AppTheme {
    /// Main call-to-action button
    pub fn button_primary(&self, text: &str) -> egui::Button<'_> {
        egui::Button::new(egui::RichText::new(text).color(self.text_primary).strong())
            .fill(self.surface)
            .stroke(egui::Stroke::new(2.0, self.primary))
            .min_size(self.button_medium)
    }

    /// Button for the irreversible split submission
    pub fn button_success(&self, text: &str) -> egui::Button<'_> {
        egui::Button::new(egui::RichText::new(text).color(self.text_primary).strong())
            .fill(self.surface)
            .stroke(egui::Stroke::new(2.0, self.success))
            .min_size(self.button_medium)
    }

    pub fn button_secondary(&self, text: &str) -> egui::Button<'_> {
        egui::Button::new(egui::RichText::new(text).color(self.text_primary))
            .fill(self.surface)
            .stroke(egui::Stroke::new(1.0, self.secondary))
            .min_size(self.button_medium)
    }

    /// Compact icon button, e.g. row removal
    pub fn button_small(&self, text: &str) -> egui::Button<'_> {
        egui::Button::new(egui::RichText::new(text).color(self.text_primary))
            .fill(self.secondary)
            .min_size(self.button_small)
    }

    /// Rounded pill used for the address and chain badges
    pub fn badge(&self, ui: &mut egui::Ui, text: &str, color: egui::Color32) {
        egui::Frame::none()
            .fill(self.surface_active)
            .rounding(10.0)
            .inner_margin(egui::Margin::symmetric(10.0, 3.0))
            .stroke(egui::Stroke::new(1.0, color))
            .show(ui, |ui| {
                ui.label(egui::RichText::new(text).color(color).monospace());
            });
    }

    pub fn frame_panel(&self) -> egui::Frame {
        egui::Frame::none()
            .fill(self.panel_fill)
            .rounding(4.0)
            .inner_margin(self.spacing_md)
            .stroke(egui::Stroke::new(1.0, self.secondary))
    }
}

/// Configure the egui context style with the given theme
pub fn configure_style(ctx: &egui::Context, theme: &AppTheme) {
    let mut visuals = egui::Visuals::dark();
    visuals.window_fill = theme.background;
    visuals.panel_fill = theme.panel_fill;
    visuals.override_text_color = Some(theme.text_primary);

    visuals.widgets.noninteractive.bg_fill = theme.surface;
    visuals.widgets.inactive.bg_fill = theme.surface;
    visuals.widgets.hovered.bg_fill = theme.surface_hover;
    visuals.widgets.active.bg_fill = theme.surface_active;
    visuals.widgets.open.bg_fill = theme.surface_active;

    // Text inputs need a visible outline on the dark surface
    visuals.widgets.inactive.bg_stroke = egui::Stroke::new(1.0, theme.secondary);
    visuals.widgets.hovered.bg_stroke = egui::Stroke::new(1.0, theme.primary);
    visuals.widgets.active.bg_stroke = egui::Stroke::new(2.0, theme.primary);

    ctx.set_visuals(visuals);

    let mut style = (*ctx.style()).clone();
    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.button_padding = egui::vec2(10.0, 6.0);
    style.text_styles.insert(
        egui::TextStyle::Heading,
        egui::FontId::new(20.0, egui::FontFamily::Proportional),
    );
    style.text_styles.insert(
        egui::TextStyle::Monospace,
        egui::FontId::new(12.0, egui::FontFamily::Monospace),
    );
    ctx.set_style(style);
}

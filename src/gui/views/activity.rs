//! Activity log pane
//!
//! Read-only view of the session's transaction progress lines.

use crate::gui::app::GuiApp;
use eframe::egui::{self, RichText};

impl GuiApp {
    pub(crate) fn view_activity(&mut self, ui: &mut egui::Ui) {
        let theme = self.theme;
        ui.horizontal(|ui| {
            ui.label(RichText::new("Activity").strong().color(theme.text_primary));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui
                    .add_enabled(!self.activity.is_empty(), egui::Button::new("📋 Copy"))
                    .clicked()
                {
                    let text = self.activity.text();
                    ui.output_mut(|o| o.copied_text = text);
                }
            });
        });
        ui.separator();

        let mut text = self.activity.text();
        egui::ScrollArea::vertical()
            .stick_to_bottom(true)
            .auto_shrink([false, false])
            .show(ui, |ui| {
                if text.is_empty() {
                    ui.label(RichText::new("Transactions will be logged here.").color(theme.text_secondary));
                } else {
                    ui.add(
                        egui::TextEdit::multiline(&mut text)
                            .font(egui::TextStyle::Monospace)
                            .desired_width(f32::INFINITY)
                            .interactive(false),
                    );
                }
            });
    }
}

//! Editable list of (address, percentage) recipient rows

use crate::gui::helpers::percentage_total_label;
use crate::gui::theme::AppTheme;
use crate::recipients::RecipientList;
use eframe::egui::{self, RichText};

/// What the user asked for while the editor was drawn.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RecipientEditorResponse {
    pub removed: Option<u64>,
    pub import_requested: bool,
}

/// Text field ids follow the row id, not the row position, so focus and cursor
/// stay on the same recipient when a row above it is removed.
fn address_field_id(row_id: u64) -> egui::Id {
    egui::Id::new(("recipient_address", row_id))
}

fn percentage_field_id(row_id: u64) -> egui::Id {
    egui::Id::new(("recipient_percentage", row_id))
}

/// Renders a [`RecipientList`] with per-row removal and an add button.
///
/// No validation happens here; rows are checked when the split is executed.
pub struct RecipientEditor<'a> {
    list: &'a mut RecipientList,
    theme: &'a AppTheme,
    enabled: bool,
}

impl<'a> RecipientEditor<'a> {
    pub fn new(list: &'a mut RecipientList, theme: &'a AppTheme) -> Self {
        Self {
            list,
            theme,
            enabled: true,
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn show(self, ui: &mut egui::Ui) -> RecipientEditorResponse {
        let mut response = RecipientEditorResponse::default();
        let theme = self.theme;

        ui.add_enabled_ui(self.enabled, |ui| {
            if self.list.is_empty() {
                ui.label(RichText::new("No recipients yet. Add a row to start.").color(theme.text_secondary));
            }

            egui::Grid::new("recipient_rows")
                .num_columns(4)
                .spacing([theme.spacing_sm, theme.spacing_sm])
                .show(ui, |ui| {
                    for (idx, row) in self.list.rows_mut().iter_mut().enumerate() {
                        let skip_reason = row.skip_reason();
                        let text_color = if skip_reason.is_some() {
                            theme.warning
                        } else {
                            theme.text_primary
                        };

                        ui.label(RichText::new(format!("{}.", idx + 1)).color(theme.text_secondary));
                        ui.add(
                            egui::TextEdit::singleline(&mut row.address)
                                .id(address_field_id(row.id))
                                .hint_text("0x… recipient address")
                                .desired_width(360.0)
                                .text_color(text_color)
                                .font(egui::TextStyle::Monospace),
                        );
                        ui.horizontal(|ui| {
                            ui.add(
                                egui::TextEdit::singleline(&mut row.percentage)
                                    .id(percentage_field_id(row.id))
                                    .hint_text("%")
                                    .desired_width(48.0)
                                    .text_color(text_color),
                            );
                            ui.label("%");
                            if let Some(reason) = skip_reason {
                                ui.label(RichText::new("⚠").color(theme.warning))
                                    .on_hover_text(reason);
                            }
                        });
                        if ui
                            .add(theme.button_small("✖"))
                            .on_hover_text("Remove this recipient")
                            .clicked()
                        {
                            response.removed = Some(row.id);
                        }
                        ui.end_row();
                    }
                });

            if let Some(id) = response.removed {
                self.list.remove(id);
            }

            ui.add_space(theme.spacing_sm);
            ui.horizontal(|ui| {
                if ui.add(theme.button_secondary("➕ Add recipient")).clicked() {
                    self.list.add();
                }
                if ui
                    .add(theme.button_secondary("📂 Import CSV…"))
                    .on_hover_text("Append rows from an address,percentage file")
                    .clicked()
                {
                    response.import_requested = true;
                }

                let (text, ok) = percentage_total_label(self.list.percentage_total());
                let color = if ok { theme.success } else { theme.warning };
                ui.label(RichText::new(text).color(color).strong());
            });
        });

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(ctx: &egui::Context, list: &mut RecipientList) {
        let theme = AppTheme::default();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                RecipientEditor::new(list, &theme).show(ui);
            });
        });
    }

    #[test]
    fn test_field_ids_are_per_row_and_per_field() {
        assert_ne!(address_field_id(1), address_field_id(2));
        assert_ne!(address_field_id(1), percentage_field_id(1));
        assert_eq!(percentage_field_id(7), percentage_field_id(7));
    }

    #[test]
    fn test_focus_stays_on_row_after_removal_above() {
        let ctx = egui::Context::default();
        let mut list = RecipientList::new();
        let first = list.add();
        let second = list.add();
        list.add();

        render(&ctx, &mut list);
        ctx.memory_mut(|m| m.request_focus(address_field_id(second)));
        render(&ctx, &mut list);
        assert!(ctx.memory(|m| m.has_focus(address_field_id(second))));

        assert!(list.remove(first));
        render(&ctx, &mut list);
        assert!(ctx.memory(|m| m.has_focus(address_field_id(second))));
    }
}

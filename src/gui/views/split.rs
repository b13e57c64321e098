//! Split view implementation
//!
//! Token and amount inputs, the recipient editor, and the two submit
//! buttons (approve allowance, execute split) with their status lines.

use crate::config::get_tx_explorer_url;
use crate::gui::app::{GuiApp, SubmissionState};
use crate::gui::theme::AppTheme;
use crate::gui::widgets::RecipientEditor;
use eframe::egui::{self, RichText};

impl GuiApp {
    pub(crate) fn view_split(&mut self, ui: &mut egui::Ui) {
        let theme = self.theme;
        let submitting = self.is_submitting();
        let connected = self.session.is_some();

        theme.frame_panel().show(ui, |ui| {
            ui.label(RichText::new("Token Transfer").size(18.0).strong());
            ui.add_space(theme.spacing_sm);

            ui.add_enabled_ui(!submitting, |ui| {
                egui::Grid::new("transfer_inputs")
                    .num_columns(2)
                    .spacing([theme.spacing_md, theme.spacing_sm])
                    .show(ui, |ui| {
                        ui.label(RichText::new("Token:").color(theme.text_secondary));
                        ui.add(
                            egui::TextEdit::singleline(&mut self.token_input)
                                .hint_text("0x… ERC-20 contract")
                                .desired_width(360.0)
                                .font(egui::TextStyle::Monospace),
                        );
                        ui.end_row();

                        ui.label(RichText::new("Amount:").color(theme.text_secondary));
                        ui.add(
                            egui::TextEdit::singleline(&mut self.amount_input)
                                .hint_text("e.g. 1.5")
                                .desired_width(160.0),
                        );
                        ui.end_row();
                    });
            });

            if let Some(session) = &self.session {
                ui.label(
                    RichText::new(format!("Splitter contract: {:?}", session.splitter().address))
                        .small()
                        .monospace()
                        .color(theme.text_secondary),
                );
            }
        });

        ui.add_space(theme.spacing_md);

        theme.frame_panel().show(ui, |ui| {
            ui.label(RichText::new(format!("Recipients ({})", self.recipients.len())).size(18.0).strong());
            ui.add_space(theme.spacing_sm);
            let response = RecipientEditor::new(&mut self.recipients, &theme)
                .enabled(!submitting)
                .show(ui);
            if response.import_requested {
                self.import_recipients_from_file();
            }
        });

        ui.add_space(theme.spacing_md);

        theme.frame_panel().show(ui, |ui| {
            let can_submit = connected && !submitting;
            if !connected {
                ui.label(RichText::new("Connect a wallet to submit transactions.").color(theme.warning));
                ui.add_space(theme.spacing_sm);
            }

            ui.horizontal(|ui| {
                if ui
                    .add_enabled(can_submit, theme.button_primary("1. Approve Allowance"))
                    .on_hover_text("Let the splitter contract pull the amount from your wallet")
                    .clicked()
                {
                    self.start_approve();
                }
                if ui
                    .add_enabled(can_submit, theme.button_success("2. Execute Split"))
                    .on_hover_text("Send the amount to all recipients in one transaction")
                    .clicked()
                {
                    self.start_split(ui.ctx());
                }
                if submitting {
                    ui.spinner();
                }
            });

            ui.add_space(theme.spacing_sm);
            let chain_id = self.session.as_ref().map(|s| s.chain_id());
            render_submission_status(ui, &theme, &self.approve_state, chain_id);
            render_submission_status(ui, &theme, &self.split_state, chain_id);
        });
    }
}

fn render_submission_status(
    ui: &mut egui::Ui,
    theme: &AppTheme,
    state: &SubmissionState,
    chain_id: Option<u64>,
) {
    let Some(status) = &state.status else {
        return;
    };
    ui.horizontal_wrapped(|ui| {
        let color = if status.starts_with("[OK]") {
            theme.success
        } else if status.starts_with("[!!]") {
            theme.error
        } else {
            theme.text_secondary
        };
        ui.label(RichText::new(status).color(color));

        let Some(outcome) = &state.last_outcome else {
            return;
        };
        let hash = format!("{:?}", outcome.tx_hash);
        if let Some(url) = chain_id.and_then(|id| get_tx_explorer_url(id, &hash)) {
            if ui.link("View on explorer").clicked() {
                if let Err(e) = open::that(&url) {
                    tracing::warn!("Failed to open {}: {}", url, e);
                }
            }
        }
        if ui.small_button("📋").on_hover_text("Copy transaction hash").clicked() {
            ui.output_mut(|o| o.copied_text = hash.clone());
        }
    });
}

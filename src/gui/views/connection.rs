//! Connection view implementation
//!
//! Contains the top bar (title, badges, connect button) and the
//! connection settings panel:
//! - Network & RPC selection
//! - Wallet source and Ledger account index
//! - Token decimals handling
//! - Gas speed

use crate::config::{DecimalsPolicy, WalletSource, DEFAULT_TOKEN_DECIMALS, MAX_GAS_SPEED, MIN_GAS_SPEED, NETWORKS};
use crate::gui::app::GuiApp;
use crate::gui::helpers::{gas_speed_label, gas_speed_warning};
use eframe::egui::{self, RichText};

impl GuiApp {
    /// Title, wallet/chain badges and the connect button
    pub(crate) fn view_top_bar(&mut self, ui: &mut egui::Ui) {
        let theme = self.theme;
        ui.horizontal(|ui| {
            ui.heading(RichText::new("Tokensplit").color(theme.primary).strong());
            ui.label(
                RichText::new(format!("v{}", env!("CARGO_PKG_VERSION")))
                    .small()
                    .color(theme.text_secondary),
            );

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let bell = format!("🔔 {}", self.notifications.len());
                if ui.selectable_label(self.show_notifications_popup, bell).clicked() {
                    self.show_notifications_popup = !self.show_notifications_popup;
                }

                let connecting = self.connect_job.is_some();
                let label = if connecting {
                    "Connecting…"
                } else if self.session.is_some() {
                    "Reconnect"
                } else {
                    "Connect Wallet"
                };
                let enabled = !connecting && !self.is_submitting();
                if ui
                    .add_enabled(enabled, theme.button_primary(label))
                    .on_hover_text(format!("Connect using {}", self.config.wallet_source.display_name()))
                    .clicked()
                {
                    self.start_connect();
                }
                if connecting {
                    ui.spinner();
                }

                if let Some(session) = &self.session {
                    theme.badge(ui, &session.chain_badge(), theme.accent);
                    theme.badge(ui, &session.address_badge(), theme.success);
                } else {
                    ui.label(RichText::new("Not connected").color(theme.text_secondary));
                }
            });
        });
    }

    /// Network, wallet, decimals and gas settings
    pub(crate) fn view_connection_settings(&mut self, ui: &mut egui::Ui) {
        let theme = self.theme;
        let locked = self.connect_job.is_some() || self.is_submitting();

        egui::CollapsingHeader::new(RichText::new("Connection Settings").strong())
            .default_open(self.session.is_none())
            .show(ui, |ui| {
                theme.frame_panel().show(ui, |ui| {
                    ui.add_enabled_ui(!locked, |ui| {
                        egui::Grid::new("connection_settings")
                            .num_columns(2)
                            .spacing([theme.spacing_md, theme.spacing_sm])
                            .show(ui, |ui| {
                                self.render_network_row(ui);
                                ui.end_row();
                                self.render_rpc_row(ui);
                                ui.end_row();
                                self.render_wallet_row(ui);
                                ui.end_row();
                                self.render_decimals_row(ui);
                                ui.end_row();
                                self.render_gas_row(ui);
                                ui.end_row();
                            });
                    });

                    ui.add_space(theme.spacing_sm);
                    ui.label(
                        RichText::new("Changes take effect on the next connect.")
                            .small()
                            .color(theme.text_secondary),
                    );
                });
            });
    }

    fn render_network_row(&mut self, ui: &mut egui::Ui) {
        ui.label(RichText::new("Network:").color(self.theme.text_secondary));
        let selected = self
            .network_index
            .map(|idx| NETWORKS[idx].label.to_string())
            .unwrap_or_else(|| format!("Chain {}", self.config.chain_id));

        let mut changed = false;
        egui::ComboBox::from_id_source("network_select")
            .selected_text(selected)
            .show_ui(ui, |ui| {
                for (idx, network) in NETWORKS.iter().enumerate() {
                    let has_splitter = self.config.deployments.resolve(network.chain_id).is_some();
                    let text = if has_splitter {
                        network.label.to_string()
                    } else {
                        format!("{} (no splitter)", network.label)
                    };
                    if ui
                        .selectable_label(self.network_index == Some(idx), text)
                        .clicked()
                    {
                        self.network_index = Some(idx);
                        changed = true;
                    }
                }
            });
        if changed {
            self.apply_network_selection();
        }
    }

    fn render_rpc_row(&mut self, ui: &mut egui::Ui) {
        ui.label(RichText::new("RPC:").color(self.theme.text_secondary));
        ui.horizontal(|ui| {
            let mut changed = ui.checkbox(&mut self.use_custom_rpc, "Custom").changed();
            if self.use_custom_rpc {
                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.custom_rpc)
                        .hint_text("https://…")
                        .desired_width(320.0),
                );
                changed |= response.lost_focus();
            } else {
                ui.label(RichText::new(&self.config.rpc_url).monospace().color(self.theme.text_secondary));
            }
            if changed {
                self.apply_network_selection();
            }
        });
    }

    fn render_wallet_row(&mut self, ui: &mut egui::Ui) {
        ui.label(RichText::new("Wallet:").color(self.theme.text_secondary));
        ui.horizontal(|ui| {
            let before = self.config.wallet_source;
            egui::ComboBox::from_id_source("wallet_source")
                .selected_text(self.config.wallet_source.display_name())
                .show_ui(ui, |ui| {
                    for source in [WalletSource::Ledger, WalletSource::PrivateKey] {
                        ui.selectable_value(&mut self.config.wallet_source, source, source.display_name());
                    }
                });

            match self.config.wallet_source {
                WalletSource::Ledger => {
                    ui.label("Account index:");
                    let before_index = self.config.ledger_index;
                    ui.add(egui::DragValue::new(&mut self.config.ledger_index).clamp_range(0..=99));
                    if before_index != self.config.ledger_index {
                        self.disconnect();
                    }
                    ui.label(
                        RichText::new(self.config.ledger_derivation_path())
                            .small()
                            .monospace()
                            .color(self.theme.text_secondary),
                    );
                }
                WalletSource::PrivateKey => {
                    let (text, color) = if self.config.private_key.is_some() {
                        ("SPLITTER_PRIVATE_KEY loaded", self.theme.success)
                    } else {
                        ("SPLITTER_PRIVATE_KEY not set", self.theme.warning)
                    };
                    ui.label(RichText::new(text).small().color(color));
                }
            }

            if before != self.config.wallet_source {
                self.disconnect();
            }
        });
    }

    fn render_decimals_row(&mut self, ui: &mut egui::Ui) {
        ui.label(RichText::new("Decimals:").color(self.theme.text_secondary));
        let mut query = self.config.decimals_policy == DecimalsPolicy::QueryToken;
        let hint = match self.config.decimals_policy {
            DecimalsPolicy::Fixed(places) => format!("Amounts use {} decimals", places),
            DecimalsPolicy::QueryToken => "Amounts use the token's decimals()".to_string(),
        };
        if ui
            .checkbox(&mut query, "Read decimals from token")
            .on_hover_text(hint)
            .changed()
        {
            self.config.decimals_policy = if query {
                DecimalsPolicy::QueryToken
            } else {
                DecimalsPolicy::Fixed(DEFAULT_TOKEN_DECIMALS)
            };
        }
    }

    fn render_gas_row(&mut self, ui: &mut egui::Ui) {
        ui.label(RichText::new("Gas speed:").color(self.theme.text_secondary));
        ui.horizontal(|ui| {
            ui.add(
                egui::Slider::new(&mut self.config.gas_speed_multiplier, MIN_GAS_SPEED..=MAX_GAS_SPEED)
                    .step_by(0.05)
                    .suffix("×"),
            );
            ui.label(
                RichText::new(gas_speed_label(self.config.gas_speed_multiplier)).color(self.theme.accent),
            );
            if let Some(warning) = gas_speed_warning(self.config.gas_speed_multiplier) {
                ui.label(RichText::new(warning).small().color(self.theme.warning));
            }
        });
    }
}

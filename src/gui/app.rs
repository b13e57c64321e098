//! Main GUI application module
//!
//! Holds `GuiApp`, its per-operation state, and the job plumbing between the
//! frame loop and the session.

use crate::{
    activity_log::ActivityLog,
    allowance::{self, SubmissionOutcome, TokenAmountInput},
    config::{Config, NETWORKS},
    error::find_splitter_error,
    recipients::{self, RecipientList},
    session::{self, Session, SubmissionGuard},
    split_operations::{self, SplitRequest},
};
use anyhow::{anyhow, Result};
use eframe::{egui, App, Frame, NativeOptions};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;

use super::async_job::AsyncJob;
use super::notifications::{chime, poll_operation_state, NotificationEntry, OperationState};
use super::theme::{configure_style, AppTheme};

const MAX_NOTIFICATIONS: usize = 50;

/// State of one submission panel (approve or split).
pub(crate) struct SubmissionState {
    pub(crate) label: &'static str,
    pub(crate) job: Option<AsyncJob<SubmissionOutcome>>,
    pub(crate) status: Option<String>,
    pub(crate) last_outcome: Option<SubmissionOutcome>,
}

impl SubmissionState {
    fn new(label: &'static str) -> Self {
        Self {
            label,
            job: None,
            status: None,
            last_outcome: None,
        }
    }

    pub(crate) fn is_running(&self) -> bool {
        self.job.as_ref().map(AsyncJob::is_running).unwrap_or(false)
    }
}

impl OperationState for SubmissionState {
    fn label(&self) -> &'static str {
        self.label
    }

    fn job_mut(&mut self) -> &mut Option<AsyncJob<SubmissionOutcome>> {
        &mut self.job
    }

    fn status_mut(&mut self) -> &mut Option<String> {
        &mut self.status
    }

    fn last_outcome_mut(&mut self) -> &mut Option<SubmissionOutcome> {
        &mut self.last_outcome
    }
}

pub struct GuiApp {
    pub(crate) config: Config,
    pub(crate) theme: AppTheme,
    pub(crate) notifications: VecDeque<NotificationEntry>,
    pub(crate) show_notifications_popup: bool,
    // Network selection
    pub(crate) network_index: Option<usize>,
    pub(crate) custom_rpc: String,
    pub(crate) use_custom_rpc: bool,
    // Connection
    pub(crate) session: Option<Arc<Session>>,
    pub(crate) connect_job: Option<AsyncJob<Session>>,
    // Form
    pub(crate) recipients: RecipientList,
    pub(crate) token_input: String,
    pub(crate) amount_input: String,
    pub(crate) approve_state: SubmissionState,
    pub(crate) split_state: SubmissionState,
    pub(crate) guard: SubmissionGuard,
    pub(crate) activity: ActivityLog,
    /// Blocking alert; the form is unusable until it is dismissed
    pub(crate) alert: Option<String>,
}

impl GuiApp {
    fn new(config: Config, ctx: &egui::Context) -> Self {
        let theme = AppTheme::default();
        configure_style(ctx, &theme);

        let network_index = crate::config::find_network_index(config.chain_id);
        let custom_rpc = match network_index {
            Some(idx) if NETWORKS[idx].default_rpc == config.rpc_url => String::new(),
            _ => config.rpc_url.clone(),
        };
        let use_custom_rpc = !custom_rpc.is_empty();

        let mut recipients = RecipientList::new();
        recipients.add();

        Self {
            config,
            theme,
            notifications: VecDeque::with_capacity(MAX_NOTIFICATIONS),
            show_notifications_popup: false,
            network_index,
            custom_rpc,
            use_custom_rpc,
            session: None,
            connect_job: None,
            recipients,
            token_input: String::new(),
            amount_input: String::new(),
            approve_state: SubmissionState::new("Approval"),
            split_state: SubmissionState::new("Split"),
            guard: SubmissionGuard::new(),
            activity: ActivityLog::new(),
            alert: None,
        }
    }

    pub(crate) fn notify(&mut self, message: impl Into<String>) {
        if self.notifications.len() >= MAX_NOTIFICATIONS {
            self.notifications.pop_front();
        }
        self.notifications.push_back(NotificationEntry::new(message));
    }

    /// Apply the selected network / RPC override. Drops the session, which belongs to the old endpoint.
    pub(crate) fn apply_network_selection(&mut self) {
        if let Some(idx) = self.network_index {
            let network = &NETWORKS[idx];
            self.config.chain_id = network.chain_id;
            self.config.rpc_url = network.default_rpc.to_string();
        }
        if self.use_custom_rpc && !self.custom_rpc.trim().is_empty() {
            self.config.rpc_url = self.custom_rpc.trim().to_string();
        }
        self.disconnect();
    }

    pub(crate) fn disconnect(&mut self) {
        if self.session.take().is_some() {
            self.notify("Disconnected; connect again to continue.");
        }
    }

    pub(crate) fn is_submitting(&self) -> bool {
        self.approve_state.is_running() || self.split_state.is_running() || self.guard.is_busy()
    }

    pub(crate) fn start_connect(&mut self) {
        if self.connect_job.is_some() {
            return;
        }
        self.session = None;
        let config = self.config.clone();
        tracing::info!("Connecting via {} ({})", config.rpc_url, config.wallet_source.display_name());
        self.connect_job = Some(AsyncJob::spawn(move || async move {
            session::connect(&config).await
        }));
    }

    fn transfer_input(&self) -> TokenAmountInput {
        TokenAmountInput {
            token: self.token_input.clone(),
            amount: self.amount_input.clone(),
        }
    }

    pub(crate) fn start_approve(&mut self) {
        let Some(session) = self.session.clone() else {
            self.alert = Some("Connect a wallet first.".to_string());
            return;
        };
        let input = self.transfer_input();
        let guard = self.guard.clone();
        let log = self.activity.clone();
        let policy = self.config.decimals_policy;

        self.approve_state.status = Some("Waiting for wallet signature…".into());
        self.approve_state.last_outcome = None;
        self.approve_state.job = Some(AsyncJob::spawn(move || async move {
            allowance::approve_allowance(&*session, &guard, &log, &input, policy).await
        }));
    }

    pub(crate) fn start_split(&mut self, ctx: &egui::Context) {
        chime(ctx);
        let Some(session) = self.session.clone() else {
            self.alert = Some("Connect a wallet first.".to_string());
            return;
        };

        // Percentages are checked here as well so the alert appears without a round trip.
        if let Err(e) = recipients::build_split_plan(self.recipients.rows()) {
            self.alert = Some(e.to_string());
            return;
        }

        let request = SplitRequest {
            transfer: self.transfer_input(),
            rows: self.recipients.rows().to_vec(),
        };
        let guard = self.guard.clone();
        let log = self.activity.clone();
        let policy = self.config.decimals_policy;

        self.split_state.status = Some("Waiting for wallet signature…".into());
        self.split_state.last_outcome = None;
        self.split_state.job = Some(AsyncJob::spawn(move || async move {
            split_operations::execute_split(&*session, &guard, &log, &request, policy).await
        }));
    }

    pub(crate) fn import_recipients_from_file(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV", &["csv", "txt"])
            .pick_file()
        else {
            return;
        };
        match self.import_recipients(&path) {
            Ok(count) => self.notify(format!("Imported {} recipients from {}", count, path.display())),
            Err(e) => self.alert = Some(format!("Import failed: {:#}", e)),
        }
    }

    fn import_recipients(&mut self, path: &Path) -> Result<usize> {
        let text = std::fs::read_to_string(path)?;
        self.recipients.import_csv(&text)
    }

    fn poll_jobs(&mut self, ctx: &egui::Context) {
        if let Some(res) = self.connect_job.as_mut().and_then(AsyncJob::poll) {
            self.connect_job = None;
            match res {
                Ok(session) => {
                    self.notify(format!(
                        "Connected {} on chain {} ({})",
                        session.address_badge(),
                        session.chain_id(),
                        session.wallet_name()
                    ));
                    self.session = Some(Arc::new(session));
                    chime(ctx);
                }
                Err(e) => {
                    tracing::warn!("Connect failed: {:#}", e);
                    self.alert = Some(match find_splitter_error(&e) {
                        Some(err) => err.to_string(),
                        None => format!("Connection failed: {:#}", e),
                    });
                }
            }
        }

        let mut alerts = Vec::new();
        alerts.extend(poll_operation_state(&mut self.approve_state, &mut self.notifications));
        alerts.extend(poll_operation_state(&mut self.split_state, &mut self.notifications));
        if let Some(alert) = alerts.into_iter().next() {
            self.alert = Some(alert);
        }
        while self.notifications.len() > MAX_NOTIFICATIONS {
            self.notifications.pop_front();
        }
    }

    fn render_alert(&mut self, ctx: &egui::Context) {
        let Some(message) = self.alert.clone() else {
            return;
        };
        let mut dismissed = false;
        egui::Window::new("⚠ Attention")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.set_max_width(420.0);
                ui.label(egui::RichText::new(&message).color(self.theme.warning));
                ui.add_space(self.theme.spacing_sm);
                if ui.add(self.theme.button_primary("OK")).clicked() {
                    dismissed = true;
                }
            });
        if dismissed {
            self.alert = None;
        }
    }

    fn render_notifications_popup(&mut self, ctx: &egui::Context) {
        if !self.show_notifications_popup {
            return;
        }
        let mut open = true;
        egui::Window::new("Notifications")
            .open(&mut open)
            .default_width(380.0)
            .show(ctx, |ui| {
                if self.notifications.is_empty() {
                    ui.label(egui::RichText::new("Nothing yet.").color(self.theme.text_secondary));
                }
                egui::ScrollArea::vertical().max_height(300.0).show(ui, |ui| {
                    for entry in self.notifications.iter().rev() {
                        ui.horizontal_wrapped(|ui| {
                            ui.label(
                                egui::RichText::new(entry.time_ago())
                                    .small()
                                    .color(self.theme.text_secondary),
                            );
                            ui.label(&entry.message);
                        });
                    }
                });
                if !self.notifications.is_empty() && ui.button("Clear").clicked() {
                    self.notifications.clear();
                }
            });
        self.show_notifications_popup = open;
    }
}

impl App for GuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.poll_jobs(ctx);
        let blocked = self.alert.is_some();

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.add_enabled_ui(!blocked, |ui| self.view_top_bar(ui));
        });

        egui::TopBottomPanel::bottom("activity_log")
            .resizable(true)
            .default_height(180.0)
            .show(ctx, |ui| self.view_activity(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(!blocked, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.view_connection_settings(ui);
                    ui.add_space(self.theme.spacing_md);
                    self.view_split(ui);
                });
            });
        });

        self.render_notifications_popup(ctx);
        self.render_alert(ctx);

        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}

pub fn launch(config: Config) -> Result<()> {
    let app_creator = move |cc: &eframe::CreationContext<'_>| {
        Box::new(GuiApp::new(config.clone(), &cc.egui_ctx)) as Box<dyn App>
    };

    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([980.0, 760.0])
        .with_min_inner_size([720.0, 520.0]);

    let native_options = NativeOptions {
        viewport,
        persist_window: false,
        ..Default::default()
    };

    eframe::run_native("Tokensplit", native_options, Box::new(app_creator))
        .map_err(|e| anyhow!("Failed to start GUI: {}", e))
}

//! Notifications, the attention chime, and polling of submission jobs.

use super::async_job::AsyncJob;
use crate::allowance::SubmissionOutcome;
use crate::error::find_splitter_error;
use eframe::egui;
use std::collections::VecDeque;

/// A notification entry with message and timestamp
#[derive(Clone)]
pub struct NotificationEntry {
    pub message: String,
    pub timestamp: chrono::DateTime<chrono::Local>,
}

impl NotificationEntry {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timestamp: chrono::Local::now(),
        }
    }

    pub fn time_ago(&self) -> String {
        let duration = chrono::Local::now().signed_duration_since(self.timestamp);
        if duration.num_seconds() < 60 {
            "just now".to_string()
        } else if duration.num_minutes() < 60 {
            format!("{}m ago", duration.num_minutes())
        } else {
            self.timestamp.format("%H:%M").to_string()
        }
    }
}

/// Ask the OS to draw the user's attention (taskbar flash / dock bounce, with the
/// platform's notification sound where it has one).
pub fn chime(ctx: &egui::Context) {
    ctx.send_viewport_cmd(egui::ViewportCommand::RequestUserAttention(
        egui::UserAttentionType::Informational,
    ));
}

/// A submission panel (approve or split) whose job the frame loop polls.
pub trait OperationState {
    fn label(&self) -> &'static str;
    fn job_mut(&mut self) -> &mut Option<AsyncJob<SubmissionOutcome>>;
    fn status_mut(&mut self) -> &mut Option<String>;
    fn last_outcome_mut(&mut self) -> &mut Option<SubmissionOutcome>;
}

/// Poll an operation and record its result.
///
/// Returns the alert text when the job failed with a blocking error.
pub fn poll_operation_state<T: OperationState>(
    state: &mut T,
    notifications: &mut VecDeque<NotificationEntry>,
) -> Option<String> {
    let res = state.job_mut().as_mut()?.poll()?;
    *state.job_mut() = None;
    let label = state.label();

    match res {
        Ok(outcome) => {
            *state.status_mut() = Some(format!("[OK] {} mined", label));
            notifications.push_back(NotificationEntry::new(format!(
                "{} confirmed: {:?}",
                label, outcome.tx_hash
            )));
            *state.last_outcome_mut() = Some(outcome);
            None
        }
        Err(e) => {
            let error_msg = format!("{:#}", e);
            match find_splitter_error(&e).filter(|err| err.is_blocking()) {
                Some(blocking) => {
                    *state.status_mut() = None;
                    Some(blocking.to_string())
                }
                None => {
                    *state.status_mut() = Some(format!("[!!] {} failed: {}", label, error_msg));
                    notifications.push_back(NotificationEntry::new(format!(
                        "{} failed: {}",
                        label, error_msg
                    )));
                    None
                }
            }
        }
    }
}

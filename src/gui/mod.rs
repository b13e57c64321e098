//! GUI module for the Tokensplit application
//!
//! This module provides the graphical user interface built with egui/eframe.
//!
//! ## Module Structure
//!
//! - `app` - Main GuiApp struct, submission state, and job plumbing
//! - `async_job` - Background job polling
//! - `theme` - Centralized theme and styling system (AppTheme)
//! - `helpers` - Gas speed and percentage label helpers
//! - `notifications` - Notifications, attention chime, operation state polling
//! - `views` - View rendering (connection, split, activity)
//! - `widgets` - Reusable UI widgets (RecipientEditor)
//!
//! ## Usage
//!
//! ```no_run
//! use tokensplit::config::Config;
//! use tokensplit::gui;
//!
//! let config = Config::default();
//! gui::launch(config).expect("Failed to launch GUI");
//! ```

mod app;
pub mod async_job;
pub mod helpers;
pub mod notifications;
pub mod theme;
pub mod views;
pub mod widgets;

pub use app::{launch, GuiApp};

pub use async_job::AsyncJob;
pub use helpers::{gas_speed_label, gas_speed_warning, percentage_total_label};
pub use notifications::{chime, NotificationEntry, OperationState};
pub use theme::{configure_style, AppTheme};
pub use widgets::{RecipientEditor, RecipientEditorResponse};

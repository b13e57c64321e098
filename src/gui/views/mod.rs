//! View modules for the GUI
//!
//! Each submodule adds rendering methods to `GuiApp`; `App::update` in
//! `app.rs` lays them out.
//!
//! - `connection` - Top bar and connection settings
//! - `split` - Token transfer form, recipients and submit buttons
//! - `activity` - Transaction activity log

pub mod activity;
pub mod connection;
pub mod split;

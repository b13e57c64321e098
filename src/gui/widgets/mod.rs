//! Widget components for the GUI
//!
//! - `RecipientEditor` - Editable recipient rows with add/remove controls

mod recipient_editor;

pub use recipient_editor::{RecipientEditor, RecipientEditorResponse};

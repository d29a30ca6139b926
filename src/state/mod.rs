//! UI state machine (pure).
//!
//! All state transitions are pure functions testable without TUI.

pub mod app_state;
pub mod status;
pub mod target_form;
pub mod text_input;
pub mod view_model;

// Re-export for convenience
pub use app_state::{AppState, Mode, PendingAction};
pub use status::{Severity, StatusMessage};
pub use target_form::{FormField, TargetForm};
pub use text_input::TextInput;
pub use view_model::{Movement, Sort, SortKey, SortOrder, ViewModel};

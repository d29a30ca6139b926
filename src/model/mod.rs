//! Domain model types (pure).
//!
//! All types in this module are pure data with smart constructors.

pub mod error;
pub mod key_action;
pub mod remote_target;
pub mod size;
pub mod snapshot;

// Re-export for convenience
pub use error::{
    ActionError, AppError, CommandFailure, EnumerationError, RegistryError, SendFailure,
    SendStage,
};
pub use key_action::KeyAction;
pub use remote_target::{Destination, InvalidTarget, RemoteTarget, LOCAL_HOST};
pub use size::format_bytes;
pub use snapshot::{InvalidSnapshotName, Snapshot};

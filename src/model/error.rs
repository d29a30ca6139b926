//! Error types for zsnap.
//!
//! This module defines the error taxonomy using `thiserror` for structured error
//! handling. Errors compose via `?` and `From` conversions.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level error for startup and terminal failures
//!   - `ConfigError` - config file read/parse failures
//!   - `LoggingError` - log file setup failures
//!   - [`RegistryError`] - remote target store failures
//!   - `TuiError` - terminal failures
//! - [`EnumerationError`] - snapshot enumeration failed (non-fatal to the session)
//! - [`ActionError`] - a snapshot action failed (non-fatal, becomes a status message)
//! - [`CommandFailure`] / [`SendFailure`] - raw collaborator failures, converted into
//!   the errors above at the executor and inventory boundaries
//!
//! # Recovery Strategy
//!
//! Only `AppError` ends the process. A corrupt registry is an `AppError` at
//! startup so that saved targets are never silently replaced. Every other error
//! is reported through the session's status line and the session returns to a
//! consistent mode.

use crate::model::remote_target::InvalidTarget;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration file could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Log file could not be set up.
    #[error("Logging error: {0}")]
    Logging(#[from] crate::logging::LoggingError),

    /// The remote target store could not be loaded.
    ///
    /// A corrupt store is fatal at startup: the user must repair or move the
    /// file rather than have it overwritten by the next `add`.
    #[error("Remote target registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Terminal setup, rendering, or restore failed.
    #[error("Terminal error: {0}")]
    Tui(#[from] crate::view::TuiError),
}

/// Failure reported by an external command.
///
/// `status` is `None` when the program could not be started or was killed by
/// a signal; `stderr` then carries the OS error text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{program} failed{}: {}", format_status(.status), .stderr.trim())]
pub struct CommandFailure {
    /// Program that was run (without the `sudo` prefix).
    pub program: String,
    /// Exit code, if the process exited normally.
    pub status: Option<i32>,
    /// Captured standard error.
    pub stderr: String,
}

impl CommandFailure {
    /// Failure for a program that could not be spawned at all.
    pub fn spawn(program: impl Into<String>, err: &std::io::Error) -> Self {
        Self {
            program: program.into(),
            status: None,
            stderr: err.to_string(),
        }
    }

    /// Lowercased stderr for pattern classification.
    pub fn stderr_lower(&self) -> String {
        self.stderr.to_lowercase()
    }
}

fn format_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!(" (exit {code})"),
        None => String::new(),
    }
}

/// Stage of a replication pipeline that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendStage {
    /// Local `zfs send` producing the stream.
    Send,
    /// SSH connection carrying the stream.
    Transport,
    /// `zfs receive` on the destination.
    Receive,
}

/// Failure of the replication collaborator, tagged with the failing stage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{stage:?} stage: {failure}")]
pub struct SendFailure {
    /// Which side of the pipeline failed.
    pub stage: SendStage,
    /// Underlying command failure.
    pub failure: CommandFailure,
}

/// Snapshot enumeration failed; the previous inventory stays in place.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("EnumerationFailed: {0}")]
pub struct EnumerationError(#[from] pub CommandFailure);

/// Errors from the remote target registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The backing file exists but does not hold a valid target list.
    #[error("RegistryCorrupt: {path} is not a valid target list ({reason}); fix or move the file")]
    Corrupt {
        /// Backing file path.
        path: PathBuf,
        /// Parse or validation detail.
        reason: String,
    },

    /// Reading or writing the backing file failed.
    #[error("failed to access {path}: {source}")]
    Io {
        /// Backing file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A target with this name already exists.
    #[error("DuplicateName: a target named '{0}' already exists")]
    DuplicateName(String),

    /// The target violates the host/ssh invariant or has empty fields.
    #[error("InvalidTarget: {0}")]
    InvalidTarget(#[from] InvalidTarget),
}

/// Failure of a snapshot action.
///
/// `Display` starts with the kind name so the status line always names the
/// error kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// Snapshot no longer exists (or the selection is stale).
    #[error("NotFound: snapshot {snapshot} does not exist")]
    NotFound {
        /// Snapshot full name.
        snapshot: String,
    },

    /// The operator lacks the rights for the storage command.
    #[error("PermissionDenied: {detail}")]
    PermissionDenied {
        /// Collaborator detail.
        detail: String,
    },

    /// Snapshot or mount is in use.
    #[error("Busy: snapshot is in use ({detail})")]
    Busy {
        /// Collaborator detail.
        detail: String,
    },

    /// Mount requested for an already mounted snapshot.
    #[error("AlreadyMounted: already mounted at {mount_point}")]
    AlreadyMounted {
        /// Derived mount point.
        mount_point: PathBuf,
    },

    /// Unmount requested for a snapshot that is not mounted.
    #[error("NotMounted: nothing mounted at {mount_point}")]
    NotMounted {
        /// Derived mount point.
        mount_point: PathBuf,
    },

    /// The mount point directory could not be prepared.
    #[error("MountPointUnavailable: {mount_point}: {reason}")]
    MountPointUnavailable {
        /// Derived mount point.
        mount_point: PathBuf,
        /// OS detail.
        reason: String,
    },

    /// None of the configured browsers is installed.
    #[error("NoBrowserAvailable: none of {} found in PATH", .tried.join(", "))]
    NoBrowserAvailable {
        /// Programs looked up, in preference order.
        tried: Vec<String>,
    },

    /// The configured pager is not installed.
    #[error("NoPagerAvailable: {pager} not found in PATH")]
    NoPagerAvailable {
        /// Pager program name.
        pager: String,
    },

    /// The stream could not reach the destination.
    #[error("TransportFailure: {detail}")]
    TransportFailure {
        /// Collaborator detail.
        detail: String,
    },

    /// The destination rejected the stream.
    #[error("RemoteRefused: {detail}")]
    RemoteRefused {
        /// Collaborator detail.
        detail: String,
    },

    /// Any other collaborator failure or hand-off error.
    #[error("CommandFailed: {detail}")]
    CommandFailed {
        /// Collaborator detail.
        detail: String,
    },
}

impl ActionError {
    /// Short kind name, as used in status messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ActionError::NotFound { .. } => "NotFound",
            ActionError::PermissionDenied { .. } => "PermissionDenied",
            ActionError::Busy { .. } => "Busy",
            ActionError::AlreadyMounted { .. } => "AlreadyMounted",
            ActionError::NotMounted { .. } => "NotMounted",
            ActionError::MountPointUnavailable { .. } => "MountPointUnavailable",
            ActionError::NoBrowserAvailable { .. } => "NoBrowserAvailable",
            ActionError::NoPagerAvailable { .. } => "NoPagerAvailable",
            ActionError::TransportFailure { .. } => "TransportFailure",
            ActionError::RemoteRefused { .. } => "RemoteRefused",
            ActionError::CommandFailed { .. } => "CommandFailed",
        }
    }

    /// Remediation hint shown after the error, where one is known.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            ActionError::PermissionDenied { .. } => Some("run as root or start with --sudo"),
            ActionError::Busy { .. } => Some("unmount it or close programs using it"),
            ActionError::NotFound { .. } => Some("press r to refresh"),
            ActionError::NoBrowserAvailable { .. } => {
                Some("install one or set `browsers` in config")
            }
            ActionError::TransportFailure { .. } => {
                Some("check SSH key authentication to the target")
            }
            _ => None,
        }
    }

    /// Status-line text: the error followed by its hint.
    pub fn status_text(&self) -> String {
        match self.hint() {
            Some(hint) => format!("{self} - {hint}"),
            None => self.to_string(),
        }
    }
}

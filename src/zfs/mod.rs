//! Storage subsystem collaborators.
//!
//! [`SnapshotBackend`] is the contract the inventory and the executor program
//! against. [`ZfsCli`] implements it with the `zfs`, `mount`, `umount`
//! and `ssh` command-line tools. Tests substitute in-memory fakes.

use crate::model::{CommandFailure, RemoteTarget, SendFailure};
use std::fmt;
use std::path::Path;

pub mod command;

pub use command::ZfsCli;

/// Operations the session needs from the storage subsystem.
///
/// Every method is synchronous and returns the raw collaborator failure; the
/// executor classifies failures into `ActionError` kinds.
pub trait SnapshotBackend {
    /// Raw enumeration output for the given pools (all pools when empty).
    ///
    /// Output follows the `-H -p` schema: `name<TAB>used<TAB>refer<TAB>creation`.
    fn list_snapshots(&self, pools: &[String]) -> Result<String, CommandFailure>;

    /// Destroy one snapshot.
    fn destroy(&self, full_name: &str) -> Result<(), CommandFailure>;

    /// Mount a snapshot read-only at an existing directory.
    fn mount(&self, full_name: &str, mount_point: &Path) -> Result<(), CommandFailure>;

    /// Unmount whatever is mounted at `mount_point`.
    fn unmount(&self, mount_point: &Path) -> Result<(), CommandFailure>;

    /// Whether something is mounted at `mount_point`.
    fn is_mounted(&self, mount_point: &Path) -> Result<bool, CommandFailure>;

    /// Create the mount point directory (and parents).
    fn prepare_mount_point(&self, mount_point: &Path) -> std::io::Result<()>;

    /// Remove an empty mount point directory.
    fn remove_mount_point(&self, mount_point: &Path) -> std::io::Result<()>;

    /// Raw `zfs diff -F -H` output between a snapshot and its live dataset.
    fn diff(&self, full_name: &str, dataset: &str) -> Result<String, CommandFailure>;

    /// Replicate a snapshot into the target's dataset.
    fn send(&self, full_name: &str, target: &RemoteTarget) -> Result<(), SendFailure>;

    /// Whether `program` resolves to an executable in `PATH`.
    fn program_available(&self, program: &str) -> bool;
}

/// A program that takes over the terminal until it exits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractiveCommand {
    /// Executable name or path.
    pub program: String,
    /// Arguments, not shell-interpreted.
    pub args: Vec<String>,
}

impl InteractiveCommand {
    /// Build a command from a program and its arguments.
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for InteractiveCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

//! Snapshot actions: delete, mount, unmount, browse, diff, send.
//!
//! Every action returns exactly one `ActionOutcome` or one `ActionError`.
//! Raw collaborator failures are classified here so nothing above this layer
//! sees command output.

use crate::model::{
    ActionError, CommandFailure, RemoteTarget, SendFailure, SendStage, Snapshot,
};
use crate::parser::format_diff;
use crate::session::Frontend;
use crate::zfs::{InteractiveCommand, SnapshotBackend};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{info, warn};

/// Prefix of derived mount point directory names.
pub const MOUNT_DIR_PREFIX: &str = "zfs_snap_";

/// Executor configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorSettings {
    /// Directory that holds derived mount points.
    pub mount_root: PathBuf,
    /// Browsers to try, in preference order.
    pub browsers: Vec<String>,
    /// Pager command line, e.g. `less -R`.
    pub pager: String,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            mount_root: PathBuf::from("/tmp"),
            browsers: vec!["ncdu".to_string(), "yazi".to_string(), "mc".to_string()],
            pager: "less -R".to_string(),
        }
    }
}

/// Result of a successful action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    /// Status-line summary.
    pub summary: String,
    /// Whether the snapshot list may have changed and needs a refresh.
    pub inventory_changed: bool,
}

impl ActionOutcome {
    fn unchanged(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            inventory_changed: false,
        }
    }

    fn changed(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            inventory_changed: true,
        }
    }
}

/// Mount point for a snapshot: `<mount_root>/zfs_snap_<name>` with `/` and `@`
/// replaced by `_`.
pub fn mount_point_for(mount_root: &Path, full_name: &str) -> PathBuf {
    let flat: String = full_name
        .chars()
        .map(|c| if c == '/' || c == '@' { '_' } else { c })
        .collect();
    mount_root.join(format!("{MOUNT_DIR_PREFIX}{flat}"))
}

/// Runs actions against a backend.
#[derive(Debug)]
pub struct ActionExecutor<Z> {
    backend: Z,
    settings: ExecutorSettings,
}

impl<Z: SnapshotBackend> ActionExecutor<Z> {
    /// Create an executor over `backend`.
    pub fn new(backend: Z, settings: ExecutorSettings) -> Self {
        Self { backend, settings }
    }

    /// The backend, for enumeration.
    pub fn backend(&self) -> &Z {
        &self.backend
    }

    /// Executor configuration.
    pub fn settings(&self) -> &ExecutorSettings {
        &self.settings
    }

    /// Derived mount point for `snapshot`.
    pub fn mount_point(&self, snapshot: &Snapshot) -> PathBuf {
        mount_point_for(&self.settings.mount_root, snapshot.full_name())
    }

    /// Destroy a snapshot.
    ///
    /// # Errors
    ///
    /// `NotFound`, `PermissionDenied`, `Busy` or `CommandFailed`.
    pub fn delete(&self, snapshot: &Snapshot) -> Result<ActionOutcome, ActionError> {
        self.backend
            .destroy(snapshot.full_name())
            .map_err(|f| classify(&f, snapshot.full_name()))?;
        info!(snapshot = %snapshot, "Deleted snapshot");
        Ok(ActionOutcome::changed(format!("Deleted {snapshot}")))
    }

    /// Mount a snapshot read-only at its derived mount point.
    ///
    /// # Errors
    ///
    /// `AlreadyMounted`, `MountPointUnavailable`, `PermissionDenied`, `NotFound`
    /// or `CommandFailed`.
    pub fn mount(&self, snapshot: &Snapshot) -> Result<ActionOutcome, ActionError> {
        let mount_point = self.mount_point(snapshot);
        self.mount_at(snapshot, &mount_point)?;
        Ok(ActionOutcome::unchanged(format!(
            "Mounted {snapshot} at {}",
            mount_point.display()
        )))
    }

    fn mount_at(&self, snapshot: &Snapshot, mount_point: &Path) -> Result<(), ActionError> {
        let mounted = self
            .backend
            .is_mounted(mount_point)
            .map_err(|f| classify(&f, snapshot.full_name()))?;
        if mounted {
            return Err(ActionError::AlreadyMounted {
                mount_point: mount_point.to_path_buf(),
            });
        }

        self.backend
            .prepare_mount_point(mount_point)
            .map_err(|e| ActionError::MountPointUnavailable {
                mount_point: mount_point.to_path_buf(),
                reason: e.to_string(),
            })?;

        if let Err(failure) = self.backend.mount(snapshot.full_name(), mount_point) {
            self.remove_mount_point_quietly(mount_point);
            if failure.stderr_lower().contains("already mounted") {
                return Err(ActionError::AlreadyMounted {
                    mount_point: mount_point.to_path_buf(),
                });
            }
            return Err(classify(&failure, snapshot.full_name()));
        }

        info!(snapshot = %snapshot, mount_point = %mount_point.display(), "Mounted snapshot");
        Ok(())
    }

    /// Unmount a snapshot and remove its mount point.
    ///
    /// # Errors
    ///
    /// `NotMounted`, `Busy`, `PermissionDenied` or `CommandFailed`.
    pub fn unmount(&self, snapshot: &Snapshot) -> Result<ActionOutcome, ActionError> {
        let mount_point = self.mount_point(snapshot);
        self.unmount_at(snapshot, &mount_point)?;
        Ok(ActionOutcome::unchanged(format!("Unmounted {snapshot}")))
    }

    fn unmount_at(&self, snapshot: &Snapshot, mount_point: &Path) -> Result<(), ActionError> {
        let not_mounted = || ActionError::NotMounted {
            mount_point: mount_point.to_path_buf(),
        };

        let mounted = self
            .backend
            .is_mounted(mount_point)
            .map_err(|f| classify(&f, snapshot.full_name()))?;
        if !mounted {
            return Err(not_mounted());
        }

        if let Err(failure) = self.backend.unmount(mount_point) {
            if failure.stderr_lower().contains("not mounted") {
                return Err(not_mounted());
            }
            return Err(classify(&failure, snapshot.full_name()));
        }

        self.remove_mount_point_quietly(mount_point);
        info!(snapshot = %snapshot, mount_point = %mount_point.display(), "Unmounted snapshot");
        Ok(())
    }

    fn remove_mount_point_quietly(&self, mount_point: &Path) {
        if let Err(e) = self.backend.remove_mount_point(mount_point) {
            warn!(mount_point = %mount_point.display(), error = %e, "Could not remove mount point");
        }
    }

    /// Open the snapshot's contents in the first available browser.
    ///
    /// Mounts on demand and unmounts afterwards if this call mounted it.
    ///
    /// # Errors
    ///
    /// `NoBrowserAvailable`, any mount or unmount failure, or `CommandFailed`
    /// if the browser can not be started.
    pub fn browse<F: Frontend + ?Sized>(
        &self,
        snapshot: &Snapshot,
        frontend: &mut F,
    ) -> Result<ActionOutcome, ActionError> {
        let browser = self
            .settings
            .browsers
            .iter()
            .find(|b| self.backend.program_available(b))
            .ok_or_else(|| ActionError::NoBrowserAvailable {
                tried: self.settings.browsers.clone(),
            })?;

        let mount_point = self.mount_point(snapshot);
        let already_mounted = self
            .backend
            .is_mounted(&mount_point)
            .map_err(|f| classify(&f, snapshot.full_name()))?;
        if !already_mounted {
            self.mount_at(snapshot, &mount_point)?;
        }

        let command = InteractiveCommand::new(
            browser.clone(),
            [mount_point.to_string_lossy().into_owned()],
        );
        info!(%command, "Handing terminal to browser");
        let handed_off = frontend.hand_off(&command);

        if !already_mounted {
            self.unmount_at(snapshot, &mount_point)?;
        }

        let status = handed_off.map_err(|e| ActionError::CommandFailed {
            detail: format!("{browser}: {e}"),
        })?;
        if !status.success() {
            warn!(%command, ?status, "Browser exited with failure");
        }
        Ok(ActionOutcome::unchanged(format!(
            "Browsed {snapshot} with {browser}"
        )))
    }

    /// Show changes between a snapshot and its live dataset in the pager.
    ///
    /// # Errors
    ///
    /// `NotFound`, `PermissionDenied`, `NoPagerAvailable` or `CommandFailed`.
    pub fn diff<F: Frontend + ?Sized>(
        &self,
        snapshot: &Snapshot,
        frontend: &mut F,
    ) -> Result<ActionOutcome, ActionError> {
        let raw = self
            .backend
            .diff(snapshot.full_name(), snapshot.dataset())
            .map_err(|f| classify(&f, snapshot.full_name()))?;
        let lines = format_diff(&raw);
        if lines.is_empty() {
            return Ok(ActionOutcome::unchanged(format!(
                "No differences since {snapshot}"
            )));
        }

        let mut pager_words = self.settings.pager.split_whitespace();
        let pager = pager_words.next().unwrap_or_default().to_string();
        if pager.is_empty() || !self.backend.program_available(&pager) {
            return Err(ActionError::NoPagerAvailable { pager });
        }

        let mut text = format!("Changes since {snapshot}:\n\n");
        for line in &lines {
            text.push_str(line);
            text.push('\n');
        }
        // Removed on close, after the pager exits.
        let file = write_diff_file(&text)?;

        let mut args: Vec<String> = pager_words.map(str::to_string).collect();
        args.push(file.path().to_string_lossy().into_owned());
        let command = InteractiveCommand::new(pager.clone(), args);
        info!(%command, changes = lines.len(), "Handing terminal to pager");
        let handed_off = frontend.hand_off(&command);

        if let Err(e) = file.close() {
            warn!(error = %e, "Could not remove diff file");
        }

        handed_off.map_err(|e| ActionError::CommandFailed {
            detail: format!("{pager}: {e}"),
        })?;
        Ok(ActionOutcome::unchanged(format!(
            "{} changes since {snapshot}",
            lines.len()
        )))
    }

    /// Replicate a snapshot to a saved target.
    ///
    /// # Errors
    ///
    /// `TransportFailure`, `RemoteRefused`, `PermissionDenied`, `NotFound` or
    /// `CommandFailed`.
    pub fn send(
        &self,
        snapshot: &Snapshot,
        target: &RemoteTarget,
    ) -> Result<ActionOutcome, ActionError> {
        self.backend
            .send(snapshot.full_name(), target)
            .map_err(|f| classify_send(&f, snapshot.full_name()))?;
        info!(snapshot = %snapshot, destination = %target, "Sent snapshot");
        let summary = format!("Sent {snapshot} to {}", target.name());
        // A local receive adds snapshots to pools this session may list.
        Ok(if target.use_ssh() {
            ActionOutcome::unchanged(summary)
        } else {
            ActionOutcome::changed(summary)
        })
    }
}

fn write_diff_file(text: &str) -> Result<NamedTempFile, ActionError> {
    let write_failed = |e: std::io::Error| ActionError::CommandFailed {
        detail: format!("could not write diff file: {e}"),
    };
    let mut file = tempfile::Builder::new()
        .prefix("zsnap-diff-")
        .suffix(".txt")
        .tempfile()
        .map_err(write_failed)?;
    file.write_all(text.as_bytes()).map_err(write_failed)?;
    file.flush().map_err(write_failed)?;
    Ok(file)
}

fn detail(failure: &CommandFailure) -> String {
    let stderr = failure.stderr.trim();
    if stderr.is_empty() {
        failure.to_string()
    } else {
        stderr.to_string()
    }
}

fn is_permission_error(stderr_lower: &str) -> bool {
    ["permission denied", "must be superuser", "not permitted"]
        .iter()
        .any(|pattern| stderr_lower.contains(pattern))
}

/// Map a command failure to an action error by stderr pattern.
pub fn classify(failure: &CommandFailure, snapshot: &str) -> ActionError {
    let stderr = failure.stderr_lower();
    if stderr.contains("does not exist") {
        ActionError::NotFound {
            snapshot: snapshot.to_string(),
        }
    } else if is_permission_error(&stderr) {
        ActionError::PermissionDenied {
            detail: detail(failure),
        }
    } else if stderr.contains("busy") {
        ActionError::Busy {
            detail: detail(failure),
        }
    } else {
        ActionError::CommandFailed {
            detail: detail(failure),
        }
    }
}

/// Map a replication failure by stage, then by stderr pattern.
pub fn classify_send(failure: &SendFailure, snapshot: &str) -> ActionError {
    let stderr = failure.failure.stderr_lower();
    match failure.stage {
        SendStage::Transport => ActionError::TransportFailure {
            detail: detail(&failure.failure),
        },
        SendStage::Receive if is_permission_error(&stderr) => ActionError::PermissionDenied {
            detail: detail(&failure.failure),
        },
        SendStage::Receive => ActionError::RemoteRefused {
            detail: detail(&failure.failure),
        },
        SendStage::Send => classify(&failure.failure, snapshot),
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;

//! In-memory collaborators for unit tests.

use crate::model::{CommandFailure, RemoteTarget, SendFailure};
use crate::session::Frontend;
use crate::state::AppState;
use crate::zfs::{InteractiveCommand, SnapshotBackend};
use std::cell::RefCell;
use std::collections::HashSet;
use std::io;
use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

/// Failure with the given stderr, as `zfs` would report it.
pub fn zfs_failure(stderr: &str) -> CommandFailure {
    CommandFailure {
        program: "zfs".to_string(),
        status: Some(1),
        stderr: stderr.to_string(),
    }
}

/// Scriptable backend. Records every mutating call in `calls`.
///
/// `destroy` removes the snapshot's line from the listing so a following
/// refresh no longer sees it.
#[derive(Debug)]
pub struct FakeBackend {
    listing: RefCell<Result<String, CommandFailure>>,
    listed_pools: RefCell<Vec<Vec<String>>>,
    calls: RefCell<Vec<String>>,
    destroy_failure: RefCell<Option<CommandFailure>>,
    mount_failure: RefCell<Option<CommandFailure>>,
    unmount_failure: RefCell<Option<CommandFailure>>,
    prepare_failure: RefCell<Option<io::ErrorKind>>,
    diff_output: RefCell<Result<String, CommandFailure>>,
    send_failure: RefCell<Option<SendFailure>>,
    mounted: RefCell<HashSet<PathBuf>>,
    programs: RefCell<HashSet<String>>,
}

impl FakeBackend {
    /// Backend whose enumeration returns `listing`.
    pub fn with_listing(listing: &str) -> Self {
        Self {
            listing: RefCell::new(Ok(listing.to_string())),
            listed_pools: RefCell::default(),
            calls: RefCell::default(),
            destroy_failure: RefCell::default(),
            mount_failure: RefCell::default(),
            unmount_failure: RefCell::default(),
            prepare_failure: RefCell::default(),
            diff_output: RefCell::new(Ok(String::new())),
            send_failure: RefCell::default(),
            mounted: RefCell::default(),
            programs: RefCell::new(["less".to_string()].into_iter().collect()),
        }
    }

    /// Make enumeration fail from now on.
    pub fn fail_listing(&self, failure: CommandFailure) {
        *self.listing.borrow_mut() = Err(failure);
    }

    /// Make `destroy` fail.
    pub fn fail_destroy(&self, failure: CommandFailure) {
        *self.destroy_failure.borrow_mut() = Some(failure);
    }

    /// Make `mount` fail.
    pub fn fail_mount(&self, failure: CommandFailure) {
        *self.mount_failure.borrow_mut() = Some(failure);
    }

    /// Make `unmount` fail.
    pub fn fail_unmount(&self, failure: CommandFailure) {
        *self.unmount_failure.borrow_mut() = Some(failure);
    }

    /// Make `prepare_mount_point` fail.
    pub fn fail_prepare(&self, kind: io::ErrorKind) {
        *self.prepare_failure.borrow_mut() = Some(kind);
    }

    /// Set the diff result.
    pub fn set_diff(&self, output: Result<String, CommandFailure>) {
        *self.diff_output.borrow_mut() = output;
    }

    /// Make `send` fail.
    pub fn fail_send(&self, failure: SendFailure) {
        *self.send_failure.borrow_mut() = Some(failure);
    }

    /// Pretend something is mounted at `mount_point`.
    pub fn mark_mounted(&self, mount_point: impl Into<PathBuf>) {
        self.mounted.borrow_mut().insert(mount_point.into());
    }

    /// Whether something is mounted at `mount_point`.
    pub fn mounted(&self, mount_point: &Path) -> bool {
        self.mounted.borrow().contains(mount_point)
    }

    /// Make `program` resolvable in PATH.
    pub fn install(&self, program: &str) {
        self.programs.borrow_mut().insert(program.to_string());
    }

    /// Remove `program` from PATH.
    pub fn uninstall(&self, program: &str) {
        self.programs.borrow_mut().remove(program);
    }

    /// Mutating calls in order, e.g. `destroy pool/a@1`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Pool filters passed to enumeration.
    pub fn listed_pools(&self) -> Vec<Vec<String>> {
        self.listed_pools.borrow().clone()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

impl SnapshotBackend for FakeBackend {
    fn list_snapshots(&self, pools: &[String]) -> Result<String, CommandFailure> {
        self.listed_pools.borrow_mut().push(pools.to_vec());
        self.listing.borrow().clone()
    }

    fn destroy(&self, full_name: &str) -> Result<(), CommandFailure> {
        self.record(format!("destroy {full_name}"));
        if let Some(failure) = self.destroy_failure.borrow().clone() {
            return Err(failure);
        }
        let mut listing = self.listing.borrow_mut();
        if let Ok(text) = listing.as_mut() {
            let prefix = format!("{full_name}\t");
            *text = text
                .lines()
                .filter(|line| !line.starts_with(&prefix))
                .map(|line| format!("{line}\n"))
                .collect();
        }
        Ok(())
    }

    fn mount(&self, full_name: &str, mount_point: &Path) -> Result<(), CommandFailure> {
        self.record(format!("mount {full_name} {}", mount_point.display()));
        if let Some(failure) = self.mount_failure.borrow().clone() {
            return Err(failure);
        }
        self.mounted.borrow_mut().insert(mount_point.to_path_buf());
        Ok(())
    }

    fn unmount(&self, mount_point: &Path) -> Result<(), CommandFailure> {
        self.record(format!("unmount {}", mount_point.display()));
        if let Some(failure) = self.unmount_failure.borrow().clone() {
            return Err(failure);
        }
        self.mounted.borrow_mut().remove(mount_point);
        Ok(())
    }

    fn is_mounted(&self, mount_point: &Path) -> Result<bool, CommandFailure> {
        Ok(self.mounted(mount_point))
    }

    fn prepare_mount_point(&self, mount_point: &Path) -> io::Result<()> {
        self.record(format!("mkdir {}", mount_point.display()));
        match *self.prepare_failure.borrow() {
            Some(kind) => Err(io::Error::new(kind, "cannot create directory")),
            None => Ok(()),
        }
    }

    fn remove_mount_point(&self, mount_point: &Path) -> io::Result<()> {
        self.record(format!("rmdir {}", mount_point.display()));
        Ok(())
    }

    fn diff(&self, full_name: &str, dataset: &str) -> Result<String, CommandFailure> {
        self.record(format!("diff {full_name} {dataset}"));
        self.diff_output.borrow().clone()
    }

    fn send(&self, full_name: &str, target: &RemoteTarget) -> Result<(), SendFailure> {
        self.record(format!("send {full_name} {}", target.name()));
        match self.send_failure.borrow().clone() {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }

    fn program_available(&self, program: &str) -> bool {
        self.programs.borrow().contains(program)
    }
}

/// Frontend that records repaints and hand-offs instead of drawing.
#[derive(Debug, Default)]
pub struct FakeFrontend {
    /// Number of forced repaints.
    pub repaints: usize,
    /// Status text at each repaint.
    pub repaint_statuses: Vec<Option<String>>,
    /// Commands handed the terminal, in order.
    pub handed_off: Vec<InteractiveCommand>,
    /// Make hand-offs fail with this error kind.
    pub hand_off_error: Option<io::ErrorKind>,
    /// Contents of the first argument file at hand-off time, if readable.
    pub handed_off_files: Vec<String>,
}

impl Frontend for FakeFrontend {
    fn repaint(&mut self, state: &AppState) -> io::Result<()> {
        self.repaints += 1;
        self.repaint_statuses
            .push(state.status.as_ref().map(|s| s.text.clone()));
        Ok(())
    }

    fn hand_off(&mut self, command: &InteractiveCommand) -> io::Result<ExitStatus> {
        self.handed_off.push(command.clone());
        if let Some(path) = command.args.last() {
            if let Ok(contents) = std::fs::read_to_string(path) {
                self.handed_off_files.push(contents);
            }
        }
        match self.hand_off_error {
            Some(kind) => Err(io::Error::new(kind, "program not found")),
            None => Ok(ExitStatus::from_raw(0)),
        }
    }
}

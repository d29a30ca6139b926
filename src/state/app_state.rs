//! Application state and mode transitions.
//!
//! AppState is the root state type: the mode the session is in, the snapshot
//! inventory, the view over it, the saved targets and the status line. It
//! performs no I/O; the session drives collaborators and records the results
//! here.

use crate::inventory::InventoryService;
use crate::model::Snapshot;
use crate::registry::TargetRegistry;
use crate::state::{Severity, StatusMessage, TargetForm, TextInput, ViewModel};
use std::time::{Duration, Instant};

// ===== Mode =====

/// An action waiting for y/n.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    /// Destroy `snapshot`.
    Delete {
        /// Snapshot full name.
        snapshot: String,
    },
    /// Replicate `snapshot` to the registry entry at `target_index`.
    Send {
        /// Snapshot full name.
        snapshot: String,
        /// Index into the registry.
        target_index: usize,
    },
}

impl PendingAction {
    /// Snapshot the action applies to.
    pub fn snapshot(&self) -> &str {
        match self {
            PendingAction::Delete { snapshot } | PendingAction::Send { snapshot, .. } => snapshot,
        }
    }
}

/// UI mode. Mode-specific data lives in the variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Browsing the table. Initial and return state.
    Listing,
    /// Editing the filter; the prior filter stays applied until Enter.
    FilterEntry(TextInput),
    /// Waiting for confirmation of a destructive or outbound action.
    ConfirmAction(PendingAction),
    /// Key reference overlay.
    Help,
    /// Entering a new replication target.
    AddTarget(TargetForm),
}

impl Mode {
    /// Short name for the status bar.
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Listing => "LIST",
            Mode::FilterEntry(_) => "FILTER",
            Mode::ConfirmAction(_) => "CONFIRM",
            Mode::Help => "HELP",
            Mode::AddTarget(_) => "ADD TARGET",
        }
    }
}

// ===== AppState =====

/// Application state. No side effects.
///
/// # State Machine
///
/// - `Listing` → `FilterEntry` → `Listing` (Enter applies, Esc discards)
/// - `Listing` → `ConfirmAction` → `Listing` (y runs the action, n/Esc cancels)
/// - `Listing` → `AddTarget` → `Listing`, or → `ConfirmAction` when the form was
///   opened from a send
/// - `Listing` → `Help` → `Listing`
#[derive(Debug, Clone)]
pub struct AppState {
    /// Current UI mode.
    pub mode: Mode,

    /// Snapshots from the last successful enumeration.
    /// The view model derives everything it shows from this.
    pub inventory: InventoryService,

    /// Filter, ordering, page and selection over the inventory.
    /// Must be revalidated after every inventory change.
    pub view: ViewModel,

    /// Saved replication targets.
    pub registry: TargetRegistry,

    /// Message in the status bar, if any. May be expired; see `visible_status`.
    pub status: Option<StatusMessage>,

    /// How long status messages stay visible.
    status_ttl: Duration,
}

impl AppState {
    /// Create state in `Listing` mode.
    pub fn new(
        inventory: InventoryService,
        registry: TargetRegistry,
        page_size: usize,
        status_ttl: Duration,
    ) -> Self {
        let mut view = ViewModel::new(page_size);
        view.revalidate(inventory.current());
        Self {
            mode: Mode::Listing,
            inventory,
            view,
            registry,
            status: None,
            status_ttl,
        }
    }

    /// Show `text` in the status bar from now for the configured duration.
    pub fn set_status(&mut self, text: impl Into<String>, severity: Severity) {
        self.status = Some(StatusMessage::new(
            text,
            severity,
            Instant::now(),
            self.status_ttl,
        ));
    }

    /// Status message still visible at `now`.
    pub fn visible_status(&self, now: Instant) -> Option<&StatusMessage> {
        self.status.as_ref().filter(|msg| !msg.is_expired(now))
    }

    /// Currently selected snapshot.
    pub fn selected(&self) -> Option<&Snapshot> {
        self.view.selected(self.inventory.current())
    }

    /// Snapshots on the current page.
    pub fn visible_page(&self) -> Vec<&Snapshot> {
        self.view.visible_page(self.inventory.current())
    }

    /// Re-clamp the view after the inventory changed.
    pub fn revalidate_view(&mut self) {
        self.view.revalidate(self.inventory.current());
    }

    /// Configured status duration.
    pub fn status_ttl(&self) -> Duration {
        self.status_ttl
    }
}

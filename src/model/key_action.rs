//! Domain-level keyboard actions independent of key bindings.

/// Domain-level actions that can be mapped to configurable key bindings.
///
/// These represent user intent in the Listing mode, not specific keys. The
/// mapping from `crossterm::event::KeyEvent` to `KeyAction` is handled by
/// `KeyBindings`. Text-entry modes (filter, add-target form) read raw keys
/// before bindings are consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    // Navigation
    /// Move selection up one row. Default: k/↑
    SelectPrev,
    /// Move selection down one row. Default: j/↓
    SelectNext,
    /// Move selection up one page. Default: Page Up/Ctrl+u
    PageUp,
    /// Move selection down one page. Default: Page Down/Ctrl+d
    PageDown,
    /// Jump to first snapshot. Default: g/Home
    SelectFirst,
    /// Jump to last snapshot. Default: G/End
    SelectLast,

    // View
    /// Re-enumerate snapshots. Default: r
    Refresh,
    /// Open the filter input. Default: /
    StartFilter,
    /// Cycle the sort column. Default: o
    CycleSort,
    /// Reverse the sort direction. Default: O
    ReverseSort,

    // Snapshot actions
    /// Ask to destroy the selected snapshot. Default: D
    Delete,
    /// Show changes since the selected snapshot. Default: d
    Diff,
    /// Mount the selected snapshot read-only. Default: m
    Mount,
    /// Unmount the selected snapshot. Default: u
    Unmount,
    /// Browse the selected snapshot's contents. Default: b
    Browse,
    /// Replicate the selected snapshot to a saved target. Default: s
    Send,
    /// Add a replication target. Default: a
    AddTarget,

    // Application
    /// Show the help overlay. Default: ?/h
    Help,
    /// Exit the application. Default: q/Ctrl+c
    Quit,
}

impl KeyAction {
    /// Whether the action operates on the selected snapshot.
    pub fn needs_selection(self) -> bool {
        matches!(
            self,
            KeyAction::Delete
                | KeyAction::Diff
                | KeyAction::Mount
                | KeyAction::Unmount
                | KeyAction::Browse
                | KeyAction::Send
        )
    }
}

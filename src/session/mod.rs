//! Session engine: routes key events by mode and drives the executor.
//!
//! One event is handled to completion before the next is read. Actions that
//! run an external program first set a Progress status and force a repaint
//! through the [`Frontend`], then record exactly one success or failure
//! status and return to `Listing`.

use crate::config::KeyBindings;
use crate::executor::{ActionExecutor, ActionOutcome};
use crate::model::{ActionError, KeyAction, Snapshot};
use crate::state::{
    AppState, FormField, Mode, Movement, PendingAction, Severity, SortKey, SortOrder,
    TargetForm, TextInput,
};
use crate::zfs::{InteractiveCommand, SnapshotBackend};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::io;
use std::process::ExitStatus;
use tracing::{info, warn};

/// Status text when an action needs a selection and the view is empty.
pub const NO_SELECTION: &str = "No snapshot selected";

/// Terminal side of the session.
pub trait Frontend {
    /// Draw `state` immediately (used before blocking actions).
    fn repaint(&mut self, state: &AppState) -> io::Result<()>;

    /// Suspend the UI, run `command` with the terminal, then restore the UI.
    fn hand_off(&mut self, command: &InteractiveCommand) -> io::Result<ExitStatus>;
}

/// Which executor operation to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DirectAction {
    Diff,
    Mount,
    Unmount,
    Browse,
}

/// The interactive session: state plus the executor that changes the world.
#[derive(Debug)]
pub struct Session<Z> {
    state: AppState,
    executor: ActionExecutor<Z>,
}

impl<Z: SnapshotBackend> Session<Z> {
    /// Create a session. Call [`Session::refresh`] to load the inventory.
    pub fn new(state: AppState, executor: ActionExecutor<Z>) -> Self {
        Self { state, executor }
    }

    /// Current state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Mutable state (used by the view for resize).
    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    /// The executor.
    pub fn executor(&self) -> &ActionExecutor<Z> {
        &self.executor
    }

    // ===== Inventory =====

    /// Re-enumerate snapshots and revalidate the view.
    ///
    /// Returns `true` on success. On failure the previous inventory stays and an
    /// Error status is set.
    pub fn refresh(&mut self) -> bool {
        match self.state.inventory.refresh(self.executor.backend()) {
            Ok(count) => {
                self.state.revalidate_view();
                self.state
                    .set_status(format!("Loaded {count} snapshots"), Severity::Info);
                true
            }
            Err(e) => {
                warn!(error = %e, "Snapshot refresh failed");
                self.state.revalidate_view();
                self.state.set_status(e.to_string(), Severity::Error);
                false
            }
        }
    }

    /// Resize the page to `rows` table rows.
    pub fn set_page_size(&mut self, rows: usize) {
        let inventory = self.state.inventory.current();
        self.state.view.set_page_size(rows, inventory);
    }

    /// Sort by a column after a header click. Ignored outside Listing.
    pub fn sort_by_column(&mut self, key: SortKey) {
        if self.state.mode != Mode::Listing {
            return;
        }
        self.state.view.sort_by(key, self.state.inventory.current());
        self.announce_sort();
    }

    // ===== Key routing =====

    /// Handle one key event. Returns `true` when the session should exit.
    pub fn handle_key<F: Frontend + ?Sized>(
        &mut self,
        key: KeyEvent,
        bindings: &KeyBindings,
        frontend: &mut F,
    ) -> bool {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }

        let mode = std::mem::replace(&mut self.state.mode, Mode::Listing);
        match mode {
            Mode::Listing => {
                if let Some(action) = bindings.get(key) {
                    return self.dispatch(action, frontend);
                }
            }
            Mode::FilterEntry(input) => self.handle_filter_key(input, key),
            Mode::ConfirmAction(pending) => self.handle_confirm_key(pending, key, frontend),
            Mode::Help => {}
            Mode::AddTarget(form) => self.handle_form_key(form, key),
        }
        false
    }

    fn dispatch<F: Frontend + ?Sized>(&mut self, action: KeyAction, frontend: &mut F) -> bool {
        if action.needs_selection() {
            self.dispatch_on_selection(action, frontend);
            return false;
        }

        let inventory = self.state.inventory.current();
        match action {
            KeyAction::SelectPrev => self.state.view.move_selection(Movement::Up, inventory),
            KeyAction::SelectNext => self.state.view.move_selection(Movement::Down, inventory),
            KeyAction::PageUp => self.state.view.move_selection(Movement::PageUp, inventory),
            KeyAction::PageDown => self.state.view.move_selection(Movement::PageDown, inventory),
            KeyAction::SelectFirst => self.state.view.move_selection(Movement::Home, inventory),
            KeyAction::SelectLast => self.state.view.move_selection(Movement::End, inventory),
            KeyAction::Refresh => {
                self.show_progress("Refreshing snapshots...", frontend);
                self.refresh();
            }
            KeyAction::StartFilter => {
                let current = self.state.view.filter_query().to_string();
                self.state.mode = Mode::FilterEntry(TextInput::new(current));
            }
            KeyAction::CycleSort => {
                self.state.view.cycle_sort_key(inventory);
                self.announce_sort();
            }
            KeyAction::ReverseSort => {
                self.state.view.toggle_sort_order(inventory);
                self.announce_sort();
            }
            KeyAction::AddTarget => self.state.mode = Mode::AddTarget(TargetForm::new()),
            KeyAction::Help => self.state.mode = Mode::Help,
            KeyAction::Quit => return true,
            // Snapshot actions were routed above.
            _ => {}
        }
        false
    }

    fn dispatch_on_selection<F: Frontend + ?Sized>(&mut self, action: KeyAction, frontend: &mut F) {
        let Some(snapshot) = self.state.selected().cloned() else {
            self.state.set_status(NO_SELECTION, Severity::Info);
            return;
        };
        let name = snapshot.full_name().to_string();

        match action {
            KeyAction::Delete => {
                self.state.mode = Mode::ConfirmAction(PendingAction::Delete { snapshot: name });
            }
            KeyAction::Send if self.state.registry.is_empty() => {
                self.state.mode = Mode::AddTarget(TargetForm::for_send(name));
                self.state.set_status(
                    "No replication targets saved; add one to continue",
                    Severity::Info,
                );
            }
            KeyAction::Send => {
                self.state.mode = Mode::ConfirmAction(PendingAction::Send {
                    snapshot: name,
                    target_index: 0,
                });
            }
            KeyAction::Diff => self.run_direct(DirectAction::Diff, &snapshot, frontend),
            KeyAction::Mount => self.run_direct(DirectAction::Mount, &snapshot, frontend),
            KeyAction::Unmount => self.run_direct(DirectAction::Unmount, &snapshot, frontend),
            KeyAction::Browse => self.run_direct(DirectAction::Browse, &snapshot, frontend),
            _ => {}
        }
    }

    // ===== FilterEntry =====

    fn handle_filter_key(&mut self, input: TextInput, key: KeyEvent) {
        let input = match key.code {
            KeyCode::Esc => return,
            KeyCode::Enter => {
                let query = input.into_text();
                self.state
                    .view
                    .apply_filter(query.clone(), self.state.inventory.current());
                let status = if query.is_empty() {
                    "Filter cleared".to_string()
                } else {
                    let matches = self
                        .state
                        .view
                        .filtered_count(self.state.inventory.current());
                    format!("Filter '{query}': {matches} matching snapshots")
                };
                self.state.set_status(status, Severity::Info);
                return;
            }
            KeyCode::Backspace => input.backspace(),
            KeyCode::Delete => input.delete(),
            KeyCode::Left => input.left(),
            KeyCode::Right => input.right(),
            KeyCode::Home => input.home(),
            KeyCode::End => input.end(),
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => input.insert(ch),
            _ => input,
        };
        self.state.mode = Mode::FilterEntry(input);
    }

    // ===== ConfirmAction =====

    fn handle_confirm_key<F: Frontend + ?Sized>(
        &mut self,
        pending: PendingAction,
        key: KeyEvent,
        frontend: &mut F,
    ) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                self.run_pending(pending, frontend);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                info!(snapshot = pending.snapshot(), "Action cancelled");
                self.state.set_status("Cancelled", Severity::Info);
            }
            _ => {
                let pending = self.choose_target(pending, key.code);
                self.state.mode = Mode::ConfirmAction(pending);
            }
        }
    }

    /// Target selection keys inside a send confirmation.
    fn choose_target(&self, pending: PendingAction, code: KeyCode) -> PendingAction {
        let PendingAction::Send {
            snapshot,
            target_index,
        } = pending
        else {
            return pending;
        };
        let count = self.state.registry.len().max(1);
        let target_index = match code {
            KeyCode::Char(ch @ '1'..='9') => {
                let chosen = ch as usize - '1' as usize;
                if chosen < self.state.registry.len() {
                    chosen
                } else {
                    target_index
                }
            }
            KeyCode::Tab | KeyCode::Right | KeyCode::Down => (target_index + 1) % count,
            KeyCode::BackTab | KeyCode::Left | KeyCode::Up => (target_index + count - 1) % count,
            _ => target_index,
        };
        PendingAction::Send {
            snapshot,
            target_index,
        }
    }

    fn run_pending<F: Frontend + ?Sized>(&mut self, pending: PendingAction, frontend: &mut F) {
        let Some(snapshot) = self.resolve(pending.snapshot()) else {
            return;
        };

        let result = match &pending {
            PendingAction::Delete { .. } => {
                self.show_progress(&format!("Deleting {snapshot}..."), frontend);
                self.executor.delete(&snapshot)
            }
            PendingAction::Send { target_index, .. } => {
                let Some(target) = self.state.registry.get(*target_index).cloned() else {
                    self.state.set_status(
                        format!("No replication target #{}", target_index + 1),
                        Severity::Error,
                    );
                    return;
                };
                self.show_progress(
                    &format!("Sending {snapshot} to {}...", target.name()),
                    frontend,
                );
                self.executor.send(&snapshot, &target)
            }
        };
        self.finish(result);
    }

    /// Look up a snapshot named by a pending action in the current inventory.
    ///
    /// A stale name sets a NotFound status instead of reaching the executor.
    fn resolve(&mut self, full_name: &str) -> Option<Snapshot> {
        match self.state.inventory.find(full_name) {
            Some(snapshot) => Some(snapshot.clone()),
            None => {
                let err = ActionError::NotFound {
                    snapshot: full_name.to_string(),
                };
                warn!(snapshot = full_name, "Selection is stale");
                self.state.set_status(err.status_text(), Severity::Error);
                None
            }
        }
    }

    // ===== AddTarget =====

    fn handle_form_key(&mut self, form: TargetForm, key: KeyEvent) {
        let form = match key.code {
            KeyCode::Esc => {
                self.state.set_status("Add target cancelled", Severity::Info);
                return;
            }
            KeyCode::Enter => {
                self.submit_form(form);
                return;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.prev_field(),
            KeyCode::Char(' ') if form.focus() == FormField::UseSsh => form.toggle_ssh(),
            KeyCode::Backspace => form.edit(TextInput::backspace),
            KeyCode::Delete => form.edit(TextInput::delete),
            KeyCode::Left => form.edit(TextInput::left),
            KeyCode::Right => form.edit(TextInput::right),
            KeyCode::Home => form.edit(TextInput::home),
            KeyCode::End => form.edit(TextInput::end),
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                form.edit(|input| input.insert(ch))
            }
            _ => form,
        };
        self.state.mode = Mode::AddTarget(form);
    }

    fn submit_form(&mut self, form: TargetForm) {
        let added = form
            .to_target()
            .map_err(Into::into)
            .and_then(|target| {
                let name = target.name().to_string();
                self.state.registry.add(target).map(|()| name)
            });

        match added {
            Ok(name) => {
                info!(target_name = %name, "Added replication target");
                if let Some(snapshot) = form.send_after() {
                    self.state.mode = Mode::ConfirmAction(PendingAction::Send {
                        snapshot: snapshot.to_string(),
                        target_index: self.state.registry.len().saturating_sub(1),
                    });
                }
                self.state
                    .set_status(format!("Added target {name}"), Severity::Info);
            }
            Err(e) => {
                warn!(error = %e, "Target rejected");
                self.state.set_status(e.to_string(), Severity::Error);
                self.state.mode = Mode::AddTarget(form);
            }
        }
    }

    // ===== Execution =====

    fn run_direct<F: Frontend + ?Sized>(
        &mut self,
        action: DirectAction,
        snapshot: &Snapshot,
        frontend: &mut F,
    ) {
        let progress = match action {
            DirectAction::Diff => format!("Computing changes since {snapshot}..."),
            DirectAction::Mount => format!("Mounting {snapshot}..."),
            DirectAction::Unmount => format!("Unmounting {snapshot}..."),
            DirectAction::Browse => format!("Opening {snapshot}..."),
        };
        self.show_progress(&progress, frontend);

        let result = match action {
            DirectAction::Diff => self.executor.diff(snapshot, frontend),
            DirectAction::Mount => self.executor.mount(snapshot),
            DirectAction::Unmount => self.executor.unmount(snapshot),
            DirectAction::Browse => self.executor.browse(snapshot, frontend),
        };
        self.finish(result);
    }

    fn show_progress<F: Frontend + ?Sized>(&mut self, text: &str, frontend: &mut F) {
        self.state.set_status(text, Severity::Progress);
        if let Err(e) = frontend.repaint(&self.state) {
            warn!(error = %e, "Repaint failed");
        }
    }

    /// Record the single outcome status of an action.
    fn finish(&mut self, result: Result<ActionOutcome, ActionError>) {
        self.state.mode = Mode::Listing;
        match result {
            Ok(outcome) => {
                if outcome.inventory_changed {
                    match self.state.inventory.refresh(self.executor.backend()) {
                        Ok(_) => self.state.revalidate_view(),
                        Err(e) => {
                            warn!(error = %e, "Refresh after action failed");
                            self.state.set_status(
                                format!("{} (refresh failed: {e})", outcome.summary),
                                Severity::Error,
                            );
                            return;
                        }
                    }
                }
                self.state.set_status(outcome.summary, Severity::Info);
            }
            Err(e) => {
                warn!(error = %e, "Action failed");
                self.state.set_status(e.status_text(), Severity::Error);
            }
        }
    }

    fn announce_sort(&mut self) {
        let text = match self.state.view.sort() {
            Some(sort) => {
                let arrow = match sort.order {
                    SortOrder::Ascending => "ascending",
                    SortOrder::Descending => "descending",
                };
                format!("Sorted by {} ({arrow})", sort.key.label())
            }
            None => "Enumeration order".to_string(),
        };
        self.state.set_status(text, Severity::Info);
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;

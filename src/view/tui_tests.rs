//! Tests for the terminal shell, driven through a TestBackend.

use super::*;
use crate::executor::{ActionExecutor, ExecutorSettings};
use crate::inventory::InventoryService;
use crate::registry::TargetRegistry;
use crate::state::{SortKey, SortOrder};
use crate::test_support::FakeBackend;
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::backend::TestBackend;
use tempfile::TempDir;

const LISTING: &str = "tank/home@daily-1\t1024\t2048\t1704067200\n\
                       tank/home@daily-2\t8192\t4096\t1706745600\n\
                       tank/var@weekly\t0\t512\t1705000000\n";

struct Fixture {
    app: TuiApp<TestBackend, FakeBackend>,
    _dir: TempDir,
}

impl Fixture {
    fn new(listing: &str, width: u16, height: u16) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let registry = TargetRegistry::empty(dir.path().join("remote_targets.json"));
        let state = AppState::new(
            InventoryService::new(vec![]),
            registry,
            10,
            Duration::from_secs(5),
        );
        let executor = ActionExecutor::new(
            FakeBackend::with_listing(listing),
            ExecutorSettings::default(),
        );
        let terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        let mut app = TuiApp::with_terminal(
            terminal,
            Session::new(state, executor),
            ColorConfig::with_colors(false),
        );
        app.start().unwrap();
        Self { app, _dir: dir }
    }

    fn key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        let quit = self.app.handle_key(KeyEvent::new(code, modifiers));
        self.app.draw().unwrap();
        quit
    }

    fn type_text(&mut self, text: &str) {
        for ch in text.chars() {
            self.key(KeyCode::Char(ch), KeyModifiers::NONE);
        }
    }

    fn click(&mut self, kind: MouseEventKind, column: u16, row: u16) {
        self.app
            .handle_mouse(MouseEvent {
                kind,
                column,
                row,
                modifiers: KeyModifiers::NONE,
            })
            .unwrap();
        self.app.draw().unwrap();
    }

    fn state(&self) -> &AppState {
        self.app.session.state()
    }

    fn screen(&self) -> String {
        let buffer = self.app.frontend.terminal.backend().buffer();
        let width = usize::from(buffer.area.width);
        buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Column and row of a column heading.
    fn heading(&self, key: SortKey) -> (u16, u16) {
        let area = self.app.frontend.area().unwrap();
        let table = layout::screen_areas(area).table;
        let index = SortKey::ALL.iter().position(|k| *k == key).unwrap();
        let rect = layout::column_areas(table)[index];
        (rect.x, rect.y)
    }
}

#[test]
fn tui_error_from_io_error() {
    let io_err = io::Error::other("test error");
    let tui_err: TuiError = io_err.into();
    assert!(matches!(tui_err, TuiError::Io(_)));
}

#[test]
fn start_loads_and_renders_snapshots() {
    let fixture = Fixture::new(LISTING, 100, 24);
    let screen = fixture.screen();

    assert!(screen.contains("tank/home@daily-1"));
    assert!(screen.contains("tank/var@weekly"));
    assert!(screen.contains("3 snapshots"));
    assert!(screen.contains("Loaded 3 snapshots"));
}

#[test]
fn start_sizes_page_to_terminal() {
    let fixture = Fixture::new(LISTING, 80, 10);
    assert_eq!(fixture.state().view.page_size(), 4);
}

#[test]
fn resize_updates_page_size() {
    let mut fixture = Fixture::new(LISTING, 80, 24);
    fixture.app.handle_resize(80, 8);
    assert_eq!(fixture.state().view.page_size(), 2);
}

#[test]
fn empty_inventory_shows_placeholder() {
    let fixture = Fixture::new("", 80, 24);
    assert!(fixture.screen().contains("No snapshots found"));
}

#[test]
fn header_click_sorts_by_column_and_second_click_reverses() {
    let mut fixture = Fixture::new(LISTING, 100, 24);
    let (column, row) = fixture.heading(SortKey::Used);

    fixture.click(MouseEventKind::Down(MouseButton::Left), column, row);
    let sort = fixture.state().view.sort().unwrap();
    assert_eq!(sort.key, SortKey::Used);
    assert_eq!(sort.order, SortOrder::Descending);
    assert_eq!(
        fixture.state().selected().unwrap().full_name(),
        "tank/home@daily-2"
    );
    assert!(fixture.screen().contains("USED ▼"));

    fixture.click(MouseEventKind::Down(MouseButton::Left), column, row);
    assert_eq!(
        fixture.state().view.sort().unwrap().order,
        SortOrder::Ascending
    );
}

#[test]
fn click_below_header_does_not_sort() {
    let mut fixture = Fixture::new(LISTING, 100, 24);
    let (column, row) = fixture.heading(SortKey::Created);
    fixture.click(MouseEventKind::Down(MouseButton::Left), column, row + 1);
    assert!(fixture.state().view.sort().is_none());
}

#[test]
fn mouse_is_ignored_outside_listing() {
    let mut fixture = Fixture::new(LISTING, 100, 24);
    fixture.key(KeyCode::Char('?'), KeyModifiers::NONE);
    let (column, row) = fixture.heading(SortKey::Name);

    fixture.click(MouseEventKind::Down(MouseButton::Left), column, row);

    assert!(fixture.state().view.sort().is_none());
    assert_eq!(fixture.state().mode, Mode::Help);
}

#[test]
fn scroll_wheel_moves_selection() {
    let mut fixture = Fixture::new(LISTING, 100, 24);
    fixture.click(MouseEventKind::ScrollDown, 10, 10);
    assert_eq!(fixture.state().view.selected_index(), Some(1));
    fixture.click(MouseEventKind::ScrollUp, 10, 10);
    assert_eq!(fixture.state().view.selected_index(), Some(0));
}

#[test]
fn filter_input_is_shown_while_typing_and_applied_on_enter() {
    let mut fixture = Fixture::new(LISTING, 100, 24);
    fixture.key(KeyCode::Char('/'), KeyModifiers::NONE);
    fixture.type_text("var");
    assert!(fixture.screen().contains(" / var"));
    assert!(
        fixture.screen().contains("tank/home@daily-1"),
        "Table keeps the old filter until Enter"
    );

    fixture.key(KeyCode::Enter, KeyModifiers::NONE);

    let screen = fixture.screen();
    assert!(screen.contains("filter: var"));
    assert!(screen.contains("tank/var@weekly"));
    assert!(!screen.contains("tank/home@daily-1"));
}

#[test]
fn delete_key_shows_confirmation_dialog() {
    let mut fixture = Fixture::new(LISTING, 100, 24);
    fixture.key(KeyCode::Char('D'), KeyModifiers::SHIFT);

    let screen = fixture.screen();
    assert!(screen.contains("Delete snapshot"));
    assert!(screen.contains("Destroy tank/home@daily-1?"));
    assert!(screen.contains("CONFIRM"));
}

#[test]
fn add_target_key_shows_form() {
    let mut fixture = Fixture::new(LISTING, 100, 24);
    fixture.key(KeyCode::Char('a'), KeyModifiers::NONE);
    fixture.type_text("backup");

    let screen = fixture.screen();
    assert!(screen.contains("Add replication target"));
    assert!(screen.contains("backup"));
    assert!(screen.contains("[x] ssh"));
}

#[test]
fn expired_status_is_cleared_without_changing_mode() {
    let mut fixture = Fixture::new(LISTING, 100, 24);
    assert!(fixture.state().status.is_some());

    let later = Instant::now() + Duration::from_secs(10);
    assert!(fixture.app.clear_expired_status(later));
    assert!(fixture.state().status.is_none());
    assert_eq!(fixture.state().mode, Mode::Listing);
    assert!(!fixture.app.clear_expired_status(later));
}

#[test]
fn fresh_status_is_kept() {
    let mut fixture = Fixture::new(LISTING, 100, 24);
    assert!(!fixture.app.clear_expired_status(Instant::now()));
    assert!(fixture.state().status.is_some());
}

#[test]
fn q_quits() {
    let mut fixture = Fixture::new(LISTING, 100, 24);
    assert!(fixture.key(KeyCode::Char('q'), KeyModifiers::NONE));
}

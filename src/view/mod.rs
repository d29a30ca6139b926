//! TUI rendering and terminal management (impure shell)

pub mod constants;
mod dialog;
mod help;
pub mod layout;
mod styles;
mod table;

pub use help::render_help_overlay;
pub use styles::{ColorConfig, Styles};

use crate::config::KeyBindings;
use crate::session::{Frontend, Session};
use crate::state::{AppState, Mode, Movement};
use crate::zfs::{InteractiveCommand, SnapshotBackend};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyEvent, KeyEventKind,
        MouseButton, MouseEvent, MouseEventKind,
    },
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Terminal,
};
use std::io::{self, Stdout};
use std::process::{Command, ExitStatus};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur during TUI operations
#[derive(Debug, Error)]
pub enum TuiError {
    /// IO error during terminal operations
    #[error("Terminal IO error: {0}")]
    Io(#[from] io::Error),
}

/// Draws the session and lends the terminal to interactive programs.
pub struct TerminalFrontend<B: Backend> {
    terminal: Terminal<B>,
    styles: Styles,
    /// Whether the real tty must be released around hand-offs.
    owns_tty: bool,
}

impl<B: Backend> TerminalFrontend<B> {
    /// Size of the drawable area.
    fn area(&self) -> io::Result<Rect> {
        let size = self.terminal.size()?;
        Ok(Rect::new(0, 0, size.width, size.height))
    }
}

impl<B: Backend> Frontend for TerminalFrontend<B> {
    fn repaint(&mut self, state: &AppState) -> io::Result<()> {
        let styles = &self.styles;
        self.terminal
            .draw(|frame| layout::render(frame, state, styles, Instant::now()))?;
        Ok(())
    }

    fn hand_off(&mut self, command: &InteractiveCommand) -> io::Result<ExitStatus> {
        info!(command = %command, "Handing terminal to external program");
        if self.owns_tty {
            suspend_terminal()?;
        }
        let status = Command::new(&command.program).args(&command.args).status();
        if self.owns_tty {
            resume_terminal()?;
            // The program drew over our screen; force a full redraw.
            self.terminal.clear()?;
        }
        status
    }
}

/// Main TUI application
///
/// Generic over backend to support testing with TestBackend
pub struct TuiApp<B: Backend, Z> {
    frontend: TerminalFrontend<B>,
    session: Session<Z>,
    key_bindings: KeyBindings,
}

impl<Z: SnapshotBackend> TuiApp<CrosstermBackend<Stdout>, Z> {
    /// Take over the terminal: raw mode, alternate screen, mouse capture.
    pub fn new(
        session: Session<Z>,
        key_bindings: KeyBindings,
        colors: ColorConfig,
    ) -> Result<Self, TuiError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        stdout.execute(EnableMouseCapture)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        Ok(Self {
            frontend: TerminalFrontend {
                terminal,
                styles: Styles::new(colors),
                owns_tty: true,
            },
            session,
            key_bindings,
        })
    }
}

impl<B: Backend, Z: SnapshotBackend> TuiApp<B, Z> {
    /// Run the main event loop
    ///
    /// Returns when the user quits (q or Ctrl+C). Between events the loop
    /// wakes on a short tick so expired status messages disappear.
    pub fn run(&mut self) -> Result<(), TuiError> {
        const TICK: Duration = Duration::from_millis(250);

        self.start()?;

        loop {
            if event::poll(TICK)? {
                match event::read()? {
                    Event::Key(key) => {
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }
                        if self.handle_key(key) {
                            return Ok(());
                        }
                    }
                    Event::Mouse(mouse) => self.handle_mouse(mouse)?,
                    Event::Resize(width, height) => self.handle_resize(width, height),
                    _ => continue,
                }
                self.draw()?;
            } else if self.clear_expired_status(Instant::now()) {
                self.draw()?;
            }
        }
    }

    /// Size the page to the terminal, load snapshots, and draw the first frame.
    fn start(&mut self) -> Result<(), TuiError> {
        let area = self.frontend.area()?;
        self.handle_resize(area.width, area.height);
        self.session.refresh();
        self.draw()
    }

    /// Handle a single key event. Returns `true` on quit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        self.session
            .handle_key(key, &self.key_bindings, &mut self.frontend)
    }

    /// Handle a single mouse event
    ///
    /// A left click on a column heading sorts by that column; the wheel moves
    /// the selection.
    fn handle_mouse(&mut self, mouse: MouseEvent) -> Result<(), TuiError> {
        if self.session.state().mode != Mode::Listing {
            return Ok(());
        }
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let area = self.frontend.area()?;
                if let Some(key) = layout::column_at(area, mouse.column, mouse.row) {
                    self.session.sort_by_column(key);
                }
            }
            MouseEventKind::ScrollUp => self.scroll(Movement::Up),
            MouseEventKind::ScrollDown => self.scroll(Movement::Down),
            _ => {}
        }
        Ok(())
    }

    fn scroll(&mut self, movement: Movement) {
        let state = self.session.state_mut();
        state.view.move_selection(movement, state.inventory.current());
    }

    /// Handle a terminal resize event
    fn handle_resize(&mut self, width: u16, height: u16) {
        let rows = layout::page_rows(Rect::new(0, 0, width, height));
        debug!(width, height, rows, "Terminal resized");
        self.session.set_page_size(rows);
    }

    /// Drop the status message once it has expired. Returns whether it did.
    fn clear_expired_status(&mut self, now: Instant) -> bool {
        let state = self.session.state_mut();
        let expired = state
            .status
            .as_ref()
            .is_some_and(|status| status.is_expired(now));
        if expired {
            state.status = None;
        }
        expired
    }

    /// Render the current frame
    fn draw(&mut self) -> Result<(), TuiError> {
        self.frontend.repaint(self.session.state())?;
        Ok(())
    }
}

/// Initialize and run the TUI for `session`.
///
/// Restores the terminal on every exit path, including setup failures.
/// Logging must be initialized by the caller.
pub fn run<Z: SnapshotBackend>(
    session: Session<Z>,
    key_bindings: KeyBindings,
    colors: ColorConfig,
) -> Result<(), TuiError> {
    let result = TuiApp::new(session, key_bindings, colors).and_then(|mut app| app.run());

    restore_terminal()?;

    result
}

/// Leave the alternate screen and raw mode so a child program gets a normal tty.
fn suspend_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    stdout.execute(DisableMouseCapture)?;
    stdout.execute(LeaveAlternateScreen)?;
    disable_raw_mode()
}

/// Undo [`suspend_terminal`].
fn resume_terminal() -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(EnableMouseCapture)?;
    Ok(())
}

/// Restore terminal to normal state
///
/// Disables raw mode, mouse capture, and leaves alternate screen
fn restore_terminal() -> Result<(), TuiError> {
    disable_raw_mode()?;
    io::stdout().execute(DisableMouseCapture)?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

#[cfg(test)]
impl<B: Backend, Z: SnapshotBackend> TuiApp<B, Z> {
    fn with_terminal(terminal: Terminal<B>, session: Session<Z>, colors: ColorConfig) -> Self {
        Self {
            frontend: TerminalFrontend {
                terminal,
                styles: Styles::new(colors),
                owns_tty: false,
            },
            session,
            key_bindings: KeyBindings::default(),
        }
    }
}

#[cfg(test)]
#[path = "tui_tests.rs"]
mod tests;

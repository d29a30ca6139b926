//! Colour configuration and the styles used by every widget.

use crate::state::Severity;
use ratatui::style::{Color, Modifier, Style};

// ===== ColorConfig =====

/// Configuration for color output.
///
/// Determines whether colors should be enabled or disabled based on:
/// - `--no-color` CLI flag
/// - `NO_COLOR` environment variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorConfig {
    enabled: bool,
}

impl ColorConfig {
    /// Create a ColorConfig from CLI args and environment.
    ///
    /// `--no-color` wins, then `NO_COLOR` (any value disables colours).
    pub fn from_env_and_args(no_color_flag: bool) -> Self {
        let enabled = !no_color_flag && std::env::var_os("NO_COLOR").is_none();
        Self { enabled }
    }

    /// Fixed configuration, for tests and embedding.
    pub fn with_colors(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Check if colors are enabled.
    pub fn colors_enabled(self) -> bool {
        self.enabled
    }
}

// ===== Styles =====

/// Styles for the table, dialogs and status bar.
///
/// With colours disabled only modifiers remain, so the selection and headers
/// stay distinguishable on monochrome terminals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Styles {
    /// Title bar across the top.
    pub header: Style,
    /// Table column headings.
    pub column_header: Style,
    /// Highlighted table row.
    pub selected: Style,
    /// Dialog borders.
    pub border: Style,
    /// Key names in help and hints.
    pub key: Style,
    /// Secondary text.
    pub muted: Style,
    /// Focused form field.
    pub focused: Style,
    /// Text cursor in input fields.
    pub cursor: Style,
    info: Style,
    progress: Style,
    error: Style,
}

impl Styles {
    /// Build styles for `config`.
    pub fn new(config: ColorConfig) -> Self {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        if config.colors_enabled() {
            Self {
                header: bold.fg(Color::Black).bg(Color::Cyan),
                column_header: bold.fg(Color::Yellow),
                selected: Style::default()
                    .fg(Color::Black)
                    .bg(Color::LightBlue)
                    .add_modifier(Modifier::BOLD),
                border: Style::default().fg(Color::Cyan),
                key: bold.fg(Color::Yellow),
                muted: Style::default().fg(Color::DarkGray),
                focused: bold.fg(Color::Cyan),
                cursor: Style::default().fg(Color::Black).bg(Color::White),
                info: Style::default().fg(Color::Green),
                progress: bold.fg(Color::Yellow),
                error: bold.fg(Color::Red),
            }
        } else {
            Self {
                header: bold,
                column_header: bold.add_modifier(Modifier::UNDERLINED),
                selected: Style::default().add_modifier(Modifier::REVERSED),
                border: Style::default(),
                key: bold,
                muted: Style::default().add_modifier(Modifier::DIM),
                focused: bold.add_modifier(Modifier::UNDERLINED),
                cursor: Style::default().add_modifier(Modifier::REVERSED),
                info: Style::default(),
                progress: bold,
                error: bold,
            }
        }
    }

    /// Style for a status message.
    pub fn status(&self, severity: Severity) -> Style {
        match severity {
            Severity::Info => self.info,
            Severity::Progress => self.progress,
            Severity::Error => self.error,
        }
    }
}

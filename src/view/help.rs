//! Help overlay widget displaying keyboard shortcuts.
//!
//! Shows a centered modal overlay with the default bindings grouped by
//! category. Any key dismisses it.

use super::constants::{HELP_POPUP_HEIGHT_PERCENT, HELP_POPUP_WIDTH_PERCENT};
use super::styles::Styles;
use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Navigation",
        &[
            ("j/↓  k/↑", "Next / previous snapshot"),
            ("g/Home  G/End", "First / last snapshot"),
            ("PgDn/Ctrl+d  PgUp/Ctrl+u", "Next / previous page"),
        ],
    ),
    (
        "View",
        &[
            ("/", "Filter by name (Enter applies, Esc keeps old filter)"),
            ("o", "Cycle sort column"),
            ("O", "Reverse sort order"),
            ("click header", "Sort by that column"),
            ("r", "Refresh snapshot list"),
        ],
    ),
    (
        "Snapshot",
        &[
            ("D", "Delete (asks for confirmation)"),
            ("m  u", "Mount read-only / unmount"),
            ("b", "Browse contents"),
            ("d", "Show changes since snapshot"),
            ("s", "Send to a saved target"),
            ("a", "Add replication target"),
        ],
    ),
    (
        "Application",
        &[("?/h", "This help"), ("q/Ctrl+c", "Quit")],
    ),
];

/// Render the help overlay centered on the screen.
pub fn render_help_overlay(frame: &mut Frame, styles: &Styles) {
    let area = frame.area();
    let popup_area = centered_rect(HELP_POPUP_WIDTH_PERCENT, HELP_POPUP_HEIGHT_PERCENT, area);

    frame.render_widget(Clear, popup_area);

    let help_paragraph = Paragraph::new(build_help_content(styles))
        .block(
            Block::default()
                .title(" Keyboard Shortcuts ")
                .borders(Borders::ALL)
                .border_style(styles.border),
        )
        .wrap(Wrap { trim: false })
        .alignment(Alignment::Left);

    frame.render_widget(help_paragraph, popup_area);

    let hint_area = Rect {
        x: popup_area.x,
        y: popup_area.y + popup_area.height.saturating_sub(1),
        width: popup_area.width,
        height: 1,
    };
    let hint = Paragraph::new(Line::from(Span::styled(
        " Press any key to close ",
        styles.muted,
    )))
    .alignment(Alignment::Center);

    frame.render_widget(hint, hint_area);
}

/// Calculate the centered rect for the help overlay.
///
/// Returns a Rect that is centered on the screen with the specified
/// percentage of width and height.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_width = area.width * percent_x / 100;
    let popup_height = area.height * percent_y / 100;
    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    Rect {
        x: area.x + popup_x,
        y: area.y + popup_y,
        width: popup_width,
        height: popup_height,
    }
}

fn build_help_content(styles: &Styles) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (index, (title, entries)) in SECTIONS.iter().enumerate() {
        if index > 0 {
            lines.push(Line::default());
        }
        lines.push(Line::from(Span::styled(*title, styles.column_header)));
        for (keys, description) in *entries {
            lines.push(Line::from(vec![
                Span::styled(format!("  {keys:<26}"), styles.key),
                Span::raw(*description),
            ]));
        }
    }
    lines
}

//! Confirmation dialog, add-target form, and the text input rendering they share
//! with the filter line.

use super::constants::DIALOG_WIDTH;
use super::styles::Styles;
use crate::state::{AppState, FormField, PendingAction, TargetForm, TextInput};
use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Spans for `input` with a block cursor at its cursor position.
pub fn input_spans(input: &TextInput, styles: &Styles) -> Vec<Span<'static>> {
    let before: String = input.text().chars().take(input.cursor()).collect();
    let mut rest = input.text().chars().skip(input.cursor());
    let under_cursor = rest.next().map_or_else(|| " ".to_string(), String::from);
    let after: String = rest.collect();

    vec![
        Span::raw(before),
        Span::styled(under_cursor, styles.cursor),
        Span::raw(after),
    ]
}

/// Rectangle of `width` x `height` centred in `area`, shrunk to fit.
fn centered(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn render_dialog(frame: &mut Frame, title: &str, lines: Vec<Line<'static>>, styles: &Styles) {
    // Border and one blank line of padding at the bottom.
    let height = u16::try_from(lines.len()).unwrap_or(u16::MAX).saturating_add(3);
    let area = centered(DIALOG_WIDTH, height, frame.area());
    frame.render_widget(Clear, area);
    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .title(format!(" {title} "))
                .borders(Borders::ALL)
                .border_style(styles.border),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

/// Render the y/n dialog for `pending`.
///
/// For a send, every saved target is listed with its number and the chosen
/// one highlighted.
pub fn render_confirm(
    frame: &mut Frame,
    pending: &PendingAction,
    state: &AppState,
    styles: &Styles,
) {
    let mut lines = Vec::new();
    let title = match pending {
        PendingAction::Delete { snapshot } => {
            lines.push(Line::from(vec![
                Span::raw("Destroy "),
                Span::styled(snapshot.clone(), styles.focused),
                Span::raw("?"),
            ]));
            lines.push(Line::from(Span::styled(
                "This cannot be undone.",
                styles.status(crate::state::Severity::Error),
            )));
            "Delete snapshot"
        }
        PendingAction::Send {
            snapshot,
            target_index,
        } => {
            lines.push(Line::from(vec![
                Span::raw("Send "),
                Span::styled(snapshot.clone(), styles.focused),
                Span::raw(" to:"),
            ]));
            for (index, target) in state.registry.list().iter().enumerate() {
                let text = format!(" {} {target}", index + 1);
                if index == *target_index {
                    lines.push(Line::from(Span::styled(format!(">{text}"), styles.selected)));
                } else {
                    lines.push(Line::from(format!(" {text}")));
                }
            }
            lines.push(Line::from(Span::styled(
                "1-9/Tab choose target",
                styles.muted,
            )));
            "Send snapshot"
        }
    };
    lines.push(Line::default());
    lines.push(
        Line::from(vec![
            Span::styled("y", styles.key),
            Span::raw(" confirm   "),
            Span::styled("n/Esc", styles.key),
            Span::raw(" cancel"),
        ])
        .alignment(Alignment::Center),
    );
    render_dialog(frame, title, lines, styles);
}

/// Render the add-target form with the focused field marked.
pub fn render_target_form(frame: &mut Frame, form: &TargetForm, styles: &Styles) {
    let mut lines = Vec::new();
    if let Some(snapshot) = form.send_after() {
        lines.push(Line::from(Span::styled(
            format!("No targets saved yet. Add one to send {snapshot}."),
            styles.muted,
        )));
    }

    for field in form.fields() {
        let focused = field == form.focus();
        let label_style = if focused { styles.focused } else { styles.muted };
        let marker = if focused { "▶ " } else { "  " };
        let mut spans = vec![Span::styled(
            format!("{marker}{:<9}", field_label(field)),
            label_style,
        )];
        match field {
            FormField::UseSsh => {
                let value = if form.use_ssh() { "[x] ssh" } else { "[ ] local" };
                spans.push(Span::raw(value));
            }
            FormField::Name | FormField::Host | FormField::Dataset => {
                let input = match field {
                    FormField::Name => form.name(),
                    FormField::Host => form.host(),
                    _ => form.dataset(),
                };
                if focused {
                    spans.extend(input_spans(input, styles));
                } else {
                    spans.push(Span::raw(input.text().to_string()));
                }
            }
        }
        lines.push(Line::from(spans));
    }

    lines.push(Line::default());
    lines.push(
        Line::from(vec![
            Span::styled("Tab", styles.key),
            Span::raw(" next  "),
            Span::styled("Space", styles.key),
            Span::raw(" toggle ssh  "),
            Span::styled("Enter", styles.key),
            Span::raw(" save  "),
            Span::styled("Esc", styles.key),
            Span::raw(" cancel"),
        ])
        .alignment(Alignment::Center),
    );
    render_dialog(frame, "Add replication target", lines, styles);
}

fn field_label(field: FormField) -> &'static str {
    match field {
        FormField::Name => "Name",
        FormField::UseSsh => "Use SSH",
        FormField::Host => "Host",
        FormField::Dataset => "Dataset",
    }
}

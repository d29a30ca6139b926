//! Screen layout: title bar, snapshot table, filter line, status bar, and the
//! overlay for the current mode.
//!
//! Area calculations are pure so the event loop can hit-test mouse clicks and
//! size pages with the same geometry the renderer uses.

use super::constants::{
    COLUMN_SPACING, CREATED_COLUMN_WIDTH, FILTER_LINE_HEIGHT, HEADER_HEIGHT, SIZE_COLUMN_WIDTH,
    STATUS_BAR_HEIGHT, TABLE_CHROME_ROWS,
};
use super::styles::Styles;
use super::{dialog, help, table};
use crate::state::{AppState, Mode, SortKey, SortOrder};
use ratatui::{
    layout::{Constraint, Direction, Flex, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use std::rc::Rc;
use std::time::Instant;

/// Top-level screen regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenAreas {
    /// Title bar.
    pub header: Rect,
    /// Bordered snapshot table.
    pub table: Rect,
    /// Filter input or current filter.
    pub filter: Rect,
    /// Mode and status message.
    pub status: Rect,
}

/// Split the frame into its fixed regions.
pub fn screen_areas(area: Rect) -> ScreenAreas {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(0),
            Constraint::Length(FILTER_LINE_HEIGHT),
            Constraint::Length(STATUS_BAR_HEIGHT),
        ])
        .split(area);

    ScreenAreas {
        header: chunks[0],
        table: chunks[1],
        filter: chunks[2],
        status: chunks[3],
    }
}

/// Number of snapshot rows that fit in the table. Never zero.
pub fn page_rows(area: Rect) -> usize {
    let table = screen_areas(area).table;
    usize::from(table.height.saturating_sub(TABLE_CHROME_ROWS)).max(1)
}

/// Column widths, in [`SortKey::ALL`] order.
pub fn column_constraints() -> [Constraint; 4] {
    [
        Constraint::Fill(1),
        Constraint::Length(SIZE_COLUMN_WIDTH),
        Constraint::Length(SIZE_COLUMN_WIDTH),
        Constraint::Length(CREATED_COLUMN_WIDTH),
    ]
}

/// Horizontal extent of each column inside the table border.
pub fn column_areas(table: Rect) -> Rc<[Rect]> {
    let inner = table_block().inner(table);
    Layout::horizontal(column_constraints())
        .flex(Flex::Legacy)
        .spacing(COLUMN_SPACING)
        .split(Rect::new(inner.x, inner.y, inner.width, 1))
}

/// Column whose heading is at (`column`, `row`) on a frame of size `area`.
pub fn column_at(area: Rect, column: u16, row: u16) -> Option<SortKey> {
    let table = screen_areas(area).table;
    let heading_row = table_block().inner(table).y;
    if row != heading_row || table.height < TABLE_CHROME_ROWS {
        return None;
    }
    column_areas(table)
        .iter()
        .zip(SortKey::ALL)
        .find(|(rect, _)| column >= rect.x && column < rect.x + rect.width)
        .map(|(_, key)| key)
}

/// Border around the snapshot table.
pub(super) fn table_block() -> Block<'static> {
    Block::default().borders(Borders::ALL)
}

/// Render the whole screen for `state` as of `now`.
pub fn render(frame: &mut Frame, state: &AppState, styles: &Styles, now: Instant) {
    let areas = screen_areas(frame.area());

    render_header(frame, areas.header, state, styles);
    table::render_table(frame, areas.table, state, styles);
    render_filter_line(frame, areas.filter, state, styles);
    render_status_bar(frame, areas.status, state, styles, now);

    match &state.mode {
        Mode::Help => help::render_help_overlay(frame, styles),
        Mode::ConfirmAction(pending) => dialog::render_confirm(frame, pending, state, styles),
        Mode::AddTarget(form) => dialog::render_target_form(frame, form, styles),
        Mode::Listing | Mode::FilterEntry(_) => {}
    }
}

fn render_header(frame: &mut Frame, area: Rect, state: &AppState, styles: &Styles) {
    let inventory = &state.inventory;
    let pools = if inventory.pools().is_empty() {
        "all pools".to_string()
    } else {
        inventory.pools().join(", ")
    };
    let loaded = inventory
        .loaded_at()
        .map(|t| format!("loaded {}", t.format("%H:%M:%S")))
        .unwrap_or_else(|| "not loaded".to_string());
    let sort = match state.view.sort() {
        Some(sort) => format!("sort {} {}", sort.key.label(), order_arrow(sort.order)),
        None => "unsorted".to_string(),
    };

    let text = format!(
        " zsnap │ {pools} │ {} snapshots │ {loaded} │ {sort} ",
        inventory.len()
    );
    frame.render_widget(Paragraph::new(text).style(styles.header), area);
}

/// Arrow shown next to the sorted column.
pub(super) fn order_arrow(order: SortOrder) -> &'static str {
    match order {
        SortOrder::Ascending => "▲",
        SortOrder::Descending => "▼",
    }
}

fn render_filter_line(frame: &mut Frame, area: Rect, state: &AppState, styles: &Styles) {
    let line = match &state.mode {
        Mode::FilterEntry(input) => {
            let mut spans = vec![Span::styled(" / ", styles.key)];
            spans.extend(dialog::input_spans(input, styles));
            Line::from(spans)
        }
        _ if !state.view.filter_query().is_empty() => Line::from(vec![
            Span::styled(" filter: ", styles.muted),
            Span::raw(state.view.filter_query().to_string()),
        ]),
        _ => Line::from(Span::styled(
            " / filter  o sort  D delete  m mount  b browse  d diff  s send  ? help",
            styles.muted,
        )),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_status_bar(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    styles: &Styles,
    now: Instant,
) {
    let mut spans = vec![Span::styled(format!(" {} ", state.mode.label()), styles.header)];
    if let Some(status) = state.visible_status(now) {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(status.text.clone(), styles.status(status.severity)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
#[path = "layout_tests.rs"]
mod tests;

//! Snapshot table widget.

use super::layout::{column_constraints, order_arrow, table_block};
use super::constants::COLUMN_SPACING;
use super::styles::Styles;
use crate::model::{format_bytes, Snapshot};
use crate::state::{AppState, SortKey};
use chrono::Local;
use ratatui::{
    layout::{Flex, Rect},
    text::Line,
    widgets::{Cell, Row, Table, TableState},
    Frame,
};

/// Render the current page of snapshots with the selection highlighted.
pub fn render_table(frame: &mut Frame, area: Rect, state: &AppState, styles: &Styles) {
    let inventory = state.inventory.current();
    let view = &state.view;

    let header = Row::new(SortKey::ALL.map(|key| heading(key, state))).style(styles.column_header);

    let page = state.visible_page();
    let rows: Vec<Row> = if page.is_empty() {
        let message = if inventory.is_empty() {
            "No snapshots found".to_string()
        } else {
            format!("No snapshots match '{}'", view.filter_query())
        };
        vec![Row::new([Cell::from(message)]).style(styles.muted)]
    } else {
        page.into_iter().map(snapshot_row).collect()
    };

    let page_count = view.page_count(inventory);
    let title = if page_count == 0 {
        " Snapshots ".to_string()
    } else {
        format!(
            " Snapshots {} of {} │ page {}/{} ",
            view.absolute_position().map_or(0, |p| p + 1),
            view.filtered_count(inventory),
            view.page_index() + 1,
            page_count
        )
    };

    let table = Table::new(rows, column_constraints())
        .header(header)
        .block(table_block().title(title).border_style(styles.border))
        .flex(Flex::Legacy)
        .column_spacing(COLUMN_SPACING)
        .row_highlight_style(styles.selected);

    let mut table_state = TableState::default().with_selected(view.selected_index());
    frame.render_stateful_widget(table, area, &mut table_state);
}

fn heading(key: SortKey, state: &AppState) -> Line<'static> {
    match state.view.sort() {
        Some(sort) if sort.key == key => {
            Line::from(format!("{} {}", key.label(), order_arrow(sort.order)))
        }
        _ => Line::from(key.label()),
    }
}

fn snapshot_row(snapshot: &Snapshot) -> Row<'static> {
    let created = snapshot
        .created_at()
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M")
        .to_string();
    Row::new([
        Cell::from(snapshot.full_name().to_string()),
        Cell::from(Line::from(format_bytes(snapshot.used_bytes())).right_aligned()),
        Cell::from(Line::from(format_bytes(snapshot.referenced_bytes())).right_aligned()),
        Cell::from(created),
    ])
}

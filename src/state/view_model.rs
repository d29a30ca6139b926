//! Filter, sort and pagination over the snapshot inventory (pure).
//!
//! The view model never owns snapshots. Every query takes the current
//! inventory slice and derives the visible sequence from it, so a refresh can
//! never leave the view pointing at records that no longer exist. Callers must
//! run [`ViewModel::revalidate`] after every refresh.

use crate::model::Snapshot;
use std::cmp::Ordering;

/// Column the view can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    /// Full snapshot name.
    Name,
    /// Space reclaimed by deleting.
    Used,
    /// Space referenced.
    Referenced,
    /// Creation time.
    Created,
}

impl SortKey {
    /// All keys in column order.
    pub const ALL: [SortKey; 4] = [
        SortKey::Name,
        SortKey::Used,
        SortKey::Referenced,
        SortKey::Created,
    ];

    /// Next key in column order, wrapping.
    pub fn next(self) -> SortKey {
        match self {
            SortKey::Name => SortKey::Used,
            SortKey::Used => SortKey::Referenced,
            SortKey::Referenced => SortKey::Created,
            SortKey::Created => SortKey::Name,
        }
    }

    /// Direction used when the key is first chosen.
    ///
    /// Sizes and dates start largest/newest first; names start alphabetical.
    pub fn initial_order(self) -> SortOrder {
        match self {
            SortKey::Name => SortOrder::Ascending,
            SortKey::Used | SortKey::Referenced | SortKey::Created => SortOrder::Descending,
        }
    }

    /// Column header text.
    pub fn label(self) -> &'static str {
        match self {
            SortKey::Name => "NAME",
            SortKey::Used => "USED",
            SortKey::Referenced => "REFER",
            SortKey::Created => "CREATED",
        }
    }

    fn compare(self, a: &Snapshot, b: &Snapshot) -> Ordering {
        match self {
            SortKey::Name => a.full_name().cmp(b.full_name()),
            SortKey::Used => a.used_bytes().cmp(&b.used_bytes()),
            SortKey::Referenced => a.referenced_bytes().cmp(&b.referenced_bytes()),
            SortKey::Created => a.created_at().cmp(&b.created_at()),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Smallest first.
    Ascending,
    /// Largest first.
    Descending,
}

impl SortOrder {
    /// The opposite direction.
    pub fn flip(self) -> SortOrder {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }
}

/// Active ordering: a key and a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    /// Column.
    pub key: SortKey,
    /// Direction.
    pub order: SortOrder,
}

/// Selection movement within the filtered sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    /// One row up.
    Up,
    /// One row down.
    Down,
    /// First row.
    Home,
    /// Last row.
    End,
    /// One page up.
    PageUp,
    /// One page down.
    PageDown,
}

/// Transient view state: filter, ordering, page and selection.
///
/// Invariants after any operation:
/// - `page_size > 0`
/// - `selected_index` is `None` exactly when the filtered view is empty
/// - a selected row is inside the current page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModel {
    filter_query: String,
    sort: Option<Sort>,
    page_size: usize,
    page_index: usize,
    selected_index: Option<usize>,
}

impl Default for ViewModel {
    fn default() -> Self {
        Self::new(20)
    }
}

impl ViewModel {
    /// Empty-filter view in enumeration order.
    pub fn new(page_size: usize) -> Self {
        Self {
            filter_query: String::new(),
            sort: None,
            page_size: page_size.max(1),
            page_index: 0,
            selected_index: None,
        }
    }

    // ===== Accessors =====

    /// Current filter (empty = no filtering).
    pub fn filter_query(&self) -> &str {
        &self.filter_query
    }

    /// Active ordering; `None` means enumeration order.
    pub fn sort(&self) -> Option<Sort> {
        self.sort
    }

    /// Rows per page.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Zero-based page index.
    pub fn page_index(&self) -> usize {
        self.page_index
    }

    /// Selected row within the page.
    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    /// Selected position within the whole filtered sequence.
    pub fn absolute_position(&self) -> Option<usize> {
        self.selected_index
            .map(|row| self.page_index * self.page_size + row)
    }

    // ===== Derivation =====

    /// Filtered and ordered snapshots, unpaginated.
    pub fn filtered<'a>(&self, inventory: &'a [Snapshot]) -> Vec<&'a Snapshot> {
        let needle = self.filter_query.to_lowercase();
        let mut visible: Vec<&Snapshot> = inventory
            .iter()
            .filter(|s| s.matches_lowercase(&needle))
            .collect();
        if let Some(sort) = self.sort {
            // Stable: ties keep enumeration order.
            visible.sort_by(|a, b| match sort.order {
                SortOrder::Ascending => sort.key.compare(a, b),
                SortOrder::Descending => sort.key.compare(b, a),
            });
        }
        visible
    }

    /// Number of snapshots passing the filter.
    pub fn filtered_count(&self, inventory: &[Snapshot]) -> usize {
        if self.filter_query.is_empty() {
            return inventory.len();
        }
        let needle = self.filter_query.to_lowercase();
        inventory
            .iter()
            .filter(|s| s.matches_lowercase(&needle))
            .count()
    }

    /// `ceil(filtered_count / page_size)`; zero for an empty view.
    pub fn page_count(&self, inventory: &[Snapshot]) -> usize {
        self.filtered_count(inventory).div_ceil(self.page_size)
    }

    /// Snapshots on the current page.
    pub fn visible_page<'a>(&self, inventory: &'a [Snapshot]) -> Vec<&'a Snapshot> {
        let filtered = self.filtered(inventory);
        let start = (self.page_index * self.page_size).min(filtered.len());
        let end = (start + self.page_size).min(filtered.len());
        filtered[start..end].to_vec()
    }

    /// The selected snapshot, if the view is non-empty.
    pub fn selected<'a>(&self, inventory: &'a [Snapshot]) -> Option<&'a Snapshot> {
        let position = self.absolute_position()?;
        self.filtered(inventory).get(position).copied()
    }

    // ===== Transitions =====

    /// Replace the filter and jump to the top of the result.
    pub fn apply_filter(&mut self, query: impl Into<String>, inventory: &[Snapshot]) {
        self.filter_query = query.into();
        self.select_position(0, self.filtered_count(inventory));
    }

    /// Move the selection, clamping at both ends.
    pub fn move_selection(&mut self, movement: Movement, inventory: &[Snapshot]) {
        let count = self.filtered_count(inventory);
        let Some(current) = self.absolute_position() else {
            self.select_position(0, count);
            return;
        };
        let last = count.saturating_sub(1);
        let target = match movement {
            Movement::Up => current.saturating_sub(1),
            Movement::Down => (current + 1).min(last),
            Movement::Home => 0,
            Movement::End => last,
            Movement::PageUp => current.saturating_sub(self.page_size),
            Movement::PageDown => (current + self.page_size).min(last),
        };
        self.select_position(target, count);
    }

    /// Change rows per page, keeping the selected snapshot selected.
    pub fn set_page_size(&mut self, rows: usize, inventory: &[Snapshot]) {
        let position = self.absolute_position().unwrap_or(0);
        self.page_size = rows.max(1);
        self.select_position(position, self.filtered_count(inventory));
    }

    /// Order by `key`: a new key starts in its initial direction, the current
    /// key flips direction. Selection returns to the top.
    pub fn sort_by(&mut self, key: SortKey, inventory: &[Snapshot]) {
        self.sort = Some(match self.sort {
            Some(sort) if sort.key == key => Sort {
                key,
                order: sort.order.flip(),
            },
            _ => Sort {
                key,
                order: key.initial_order(),
            },
        });
        self.select_position(0, self.filtered_count(inventory));
    }

    /// Advance to the next sort column in its initial direction.
    pub fn cycle_sort_key(&mut self, inventory: &[Snapshot]) {
        let key = match self.sort {
            Some(sort) => sort.key.next(),
            None => SortKey::Name,
        };
        self.sort = Some(Sort {
            key,
            order: key.initial_order(),
        });
        self.select_position(0, self.filtered_count(inventory));
    }

    /// Reverse the current direction.
    ///
    /// In enumeration order this switches to reverse name order.
    pub fn toggle_sort_order(&mut self, inventory: &[Snapshot]) {
        self.sort = Some(match self.sort {
            Some(sort) => Sort {
                key: sort.key,
                order: sort.order.flip(),
            },
            None => Sort {
                key: SortKey::Name,
                order: SortKey::Name.initial_order().flip(),
            },
        });
        self.select_position(0, self.filtered_count(inventory));
    }

    /// Clamp page and selection to the current filtered sequence.
    ///
    /// Keeps the absolute position when it is still in range, otherwise
    /// selects the last row. An empty view clears the selection.
    pub fn revalidate(&mut self, inventory: &[Snapshot]) {
        let count = self.filtered_count(inventory);
        let position = self.absolute_position().unwrap_or(0);
        self.select_position(position.min(count.saturating_sub(1)), count);
    }

    fn select_position(&mut self, position: usize, count: usize) {
        if count == 0 {
            self.page_index = 0;
            self.selected_index = None;
            return;
        }
        let position = position.min(count - 1);
        self.page_index = position / self.page_size;
        self.selected_index = Some(position % self.page_size);
    }
}

#[cfg(test)]
#[path = "view_model_tests.rs"]
mod tests;

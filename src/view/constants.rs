//! Layout dimension constants for TUI rendering.

/// Height of the title bar.
pub const HEADER_HEIGHT: u16 = 1;

/// Height of the filter line below the table.
pub const FILTER_LINE_HEIGHT: u16 = 1;

/// Height of the status bar.
pub const STATUS_BAR_HEIGHT: u16 = 1;

/// Lines the table spends on its border and column heading.
pub const TABLE_CHROME_ROWS: u16 = 3;

/// Fixed widths of the size and date columns.
pub const SIZE_COLUMN_WIDTH: u16 = 10;
/// Width of `YYYY-MM-DD HH:MM`.
pub const CREATED_COLUMN_WIDTH: u16 = 16;
/// Gap between table columns.
pub const COLUMN_SPACING: u16 = 1;

/// Width percentage for help overlay popup.
pub const HELP_POPUP_WIDTH_PERCENT: u16 = 70;

/// Height percentage for help overlay popup.
pub const HELP_POPUP_HEIGHT_PERCENT: u16 = 80;

/// Width of the confirmation and add-target dialogs.
pub const DIALOG_WIDTH: u16 = 64;

//! Strict-schema parsers for storage command output.
//!
//! Two record formats are parsed here:
//!
//! - Snapshot enumeration (`zfs list -H -p -t snapshot -o name,used,refer,creation`):
//!   four tab-separated fields per line.
//! - Change listing (`zfs diff -F -H`): `change<TAB>type<TAB>path[<TAB>new path]`.
//!
//! Parsing is pure. A malformed enumeration record is returned as a
//! [`RecordError`] next to the good records so the caller can log it and carry on.

use crate::model::Snapshot;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Number of tab-separated fields in an enumeration record.
pub const SNAPSHOT_FIELD_COUNT: usize = 4;

/// Why a single enumeration record was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// The line does not have exactly four fields.
    #[error("line {line}: expected {SNAPSHOT_FIELD_COUNT} tab-separated fields, found {found}")]
    FieldCount {
        /// 1-based line number.
        line: usize,
        /// Fields actually present.
        found: usize,
    },

    /// The name is not `<dataset>@<label>`.
    #[error("line {line}: {reason}")]
    InvalidName {
        /// 1-based line number.
        line: usize,
        /// Constructor error text.
        reason: String,
    },

    /// A size field is not a byte count.
    #[error("line {line}: field '{field}' is not a byte count: '{raw}'")]
    InvalidSize {
        /// 1-based line number.
        line: usize,
        /// Column name.
        field: &'static str,
        /// Raw value.
        raw: String,
    },

    /// The creation field is not epoch seconds.
    #[error("line {line}: creation time is not epoch seconds: '{raw}'")]
    InvalidCreation {
        /// 1-based line number.
        line: usize,
        /// Raw value.
        raw: String,
    },
}

/// Result of parsing one enumeration listing.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParsedListing {
    /// Records that passed validation, in input order.
    pub snapshots: Vec<Snapshot>,
    /// Records that were skipped.
    pub malformed: Vec<RecordError>,
}

/// Parse one enumeration record.
///
/// Field policy:
/// - field count must be exactly four
/// - `name` must be a valid `<dataset>@<label>`
/// - `used`/`refer` are byte counts; `-` means zero
/// - `creation` is epoch seconds
///
/// # Errors
///
/// Returns the first field violation found.
pub fn parse_snapshot_record(line: &str, line_number: usize) -> Result<Snapshot, RecordError> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != SNAPSHOT_FIELD_COUNT {
        return Err(RecordError::FieldCount {
            line: line_number,
            found: fields.len(),
        });
    }

    let name = fields[0].trim();
    let used = parse_size(fields[1], "used", line_number)?;
    let referenced = parse_size(fields[2], "refer", line_number)?;
    let created_at = parse_creation(fields[3], line_number)?;

    Snapshot::new(name, used, referenced, created_at).map_err(|e| RecordError::InvalidName {
        line: line_number,
        reason: e.to_string(),
    })
}

/// Parse a whole enumeration listing.
///
/// Blank lines are ignored. Records are kept in input order.
pub fn parse_snapshot_listing(output: &str) -> ParsedListing {
    let mut parsed = ParsedListing::default();

    for (index, line) in output.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_snapshot_record(line, index + 1) {
            Ok(snapshot) => parsed.snapshots.push(snapshot),
            Err(err) => parsed.malformed.push(err),
        }
    }

    parsed
}

fn parse_size(raw: &str, field: &'static str, line: usize) -> Result<u64, RecordError> {
    let raw = raw.trim();
    if raw == "-" {
        return Ok(0);
    }
    raw.parse::<u64>().map_err(|_| RecordError::InvalidSize {
        line,
        field,
        raw: raw.to_string(),
    })
}

fn parse_creation(raw: &str, line: usize) -> Result<DateTime<Utc>, RecordError> {
    let raw = raw.trim();
    raw.parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or_else(|| RecordError::InvalidCreation {
            line,
            raw: raw.to_string(),
        })
}

// ===== Diff output =====

/// Readable name for a `zfs diff` change code.
fn change_description(code: &str) -> &str {
    match code {
        "-" => "Removed",
        "+" => "Added",
        "M" => "Modified",
        "R" => "Renamed",
        other => other,
    }
}

/// Readable name for a `zfs diff -F` file type code.
fn file_type_description(code: &str) -> &str {
    match code {
        "F" => "File",
        "/" => "Directory",
        "@" => "Symlink",
        "P" => "Pipe",
        "=" => "Socket",
        ">" => "Door",
        "|" => "FIFO",
        "B" => "Block device",
        "C" => "Character device",
        other => other,
    }
}

/// Format `zfs diff -F -H` output into one readable line per change.
///
/// Lines with fewer than three fields are skipped. Renames show both paths.
pub fn format_diff(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 3 {
                return None;
            }
            let change = change_description(fields[0]);
            let file_type = file_type_description(fields[1]);
            let formatted = match fields.get(3) {
                Some(new_path) => format!("{change} {file_type}: {} -> {new_path}", fields[2]),
                None => format!("{change} {file_type}: {}", fields[2]),
            };
            Some(formatted)
        })
        .collect()
}

//! Snapshot record with a validating constructor.
//!
//! A snapshot is identified by its full name `<dataset>@<label>`. The dataset
//! and pool are derived from the full name at construction and never stored
//! independently of it, so the three can not disagree.

use chrono::{DateTime, Utc};
use std::fmt;

/// One point-in-time copy of a dataset.
///
/// Immutable after construction. An inventory refresh replaces the whole
/// sequence instead of mutating records in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    full_name: String,
    /// Byte offset of the `@` separator inside `full_name`.
    at: usize,
    used_bytes: u64,
    referenced_bytes: u64,
    created_at: DateTime<Utc>,
}

impl Snapshot {
    /// Smart constructor: validates the `<dataset>@<label>` shape.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSnapshotName` if the name has no `@`, more than one `@`,
    /// an empty dataset, an empty label, or a dataset with an empty path segment.
    pub fn new(
        full_name: impl Into<String>,
        used_bytes: u64,
        referenced_bytes: u64,
        created_at: DateTime<Utc>,
    ) -> Result<Self, InvalidSnapshotName> {
        let full_name = full_name.into();
        let at = validate_full_name(&full_name)?;
        Ok(Self {
            full_name,
            at,
            used_bytes,
            referenced_bytes,
            created_at,
        })
    }

    /// Full `<dataset>@<label>` name, unique within one inventory load.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Dataset the snapshot was taken of (everything before `@`).
    pub fn dataset(&self) -> &str {
        &self.full_name[..self.at]
    }

    /// Snapshot label (everything after `@`).
    pub fn label(&self) -> &str {
        &self.full_name[self.at + 1..]
    }

    /// Pool containing the dataset (leading path segment).
    pub fn pool(&self) -> &str {
        let dataset = self.dataset();
        dataset.split('/').next().unwrap_or(dataset)
    }

    /// Space reclaimed if this snapshot is destroyed.
    pub fn used_bytes(&self) -> u64 {
        self.used_bytes
    }

    /// Space visible through this snapshot.
    pub fn referenced_bytes(&self) -> u64 {
        self.referenced_bytes
    }

    /// Creation time as reported by the storage subsystem.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Case-insensitive substring match against the full name.
    ///
    /// `needle_lower` must already be lowercased; callers lowercase the filter
    /// once per view derivation rather than once per record.
    pub fn matches_lowercase(&self, needle_lower: &str) -> bool {
        needle_lower.is_empty() || self.full_name.to_lowercase().contains(needle_lower)
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name)
    }
}

fn validate_full_name(name: &str) -> Result<usize, InvalidSnapshotName> {
    let mut separators = name.match_indices('@');
    let Some((at, _)) = separators.next() else {
        return Err(InvalidSnapshotName::MissingSeparator(name.to_string()));
    };
    if separators.next().is_some() {
        return Err(InvalidSnapshotName::MultipleSeparators(name.to_string()));
    }

    let dataset = &name[..at];
    let label = &name[at + 1..];
    if dataset.is_empty() || dataset.split('/').any(str::is_empty) {
        return Err(InvalidSnapshotName::EmptyDataset(name.to_string()));
    }
    if label.is_empty() {
        return Err(InvalidSnapshotName::EmptyLabel(name.to_string()));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(InvalidSnapshotName::Whitespace(name.to_string()));
    }
    Ok(at)
}

/// Reasons a snapshot name is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidSnapshotName {
    /// No `@` between dataset and label.
    #[error("snapshot name '{0}' has no '@' separator")]
    MissingSeparator(String),
    /// More than one `@`.
    #[error("snapshot name '{0}' has more than one '@'")]
    MultipleSeparators(String),
    /// Dataset part is empty or has an empty path segment.
    #[error("snapshot name '{0}' has an empty dataset")]
    EmptyDataset(String),
    /// Label part is empty.
    #[error("snapshot name '{0}' has an empty label")]
    EmptyLabel(String),
    /// Names never contain whitespace.
    #[error("snapshot name '{0}' contains whitespace")]
    Whitespace(String),
}

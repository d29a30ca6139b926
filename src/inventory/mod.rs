//! Snapshot inventory: the last successful enumeration.

use crate::model::{EnumerationError, Snapshot};
use crate::parser::parse_snapshot_listing;
use crate::zfs::SnapshotBackend;
use chrono::{DateTime, Local};
use std::collections::HashSet;
use tracing::{info, warn};

/// In-memory snapshot list in enumeration order.
///
/// A refresh replaces the whole list. A failed refresh keeps the previous one.
#[derive(Debug, Clone, Default)]
pub struct InventoryService {
    pools: Vec<String>,
    snapshots: Vec<Snapshot>,
    loaded_at: Option<DateTime<Local>>,
}

impl InventoryService {
    /// Create an empty inventory restricted to `pools` (empty = all pools).
    pub fn new(pools: Vec<String>) -> Self {
        Self {
            pools,
            snapshots: Vec::new(),
            loaded_at: None,
        }
    }

    /// Re-enumerate snapshots through `backend`.
    ///
    /// Malformed records and duplicate names are skipped with a warning.
    /// Returns the number of snapshots loaded.
    ///
    /// # Errors
    ///
    /// Returns `EnumerationError` if the enumeration command fails; the prior
    /// inventory is kept.
    pub fn refresh<Z: SnapshotBackend + ?Sized>(
        &mut self,
        backend: &Z,
    ) -> Result<usize, EnumerationError> {
        let output = backend.list_snapshots(&self.pools)?;
        let parsed = parse_snapshot_listing(&output);

        for err in &parsed.malformed {
            warn!(error = %err, "Skipping malformed snapshot record");
        }

        let mut seen = HashSet::new();
        let mut snapshots = Vec::with_capacity(parsed.snapshots.len());
        for snapshot in parsed.snapshots {
            if seen.insert(snapshot.full_name().to_string()) {
                snapshots.push(snapshot);
            } else {
                warn!(snapshot = %snapshot, "Skipping duplicate snapshot record");
            }
        }

        info!(
            count = snapshots.len(),
            skipped = parsed.malformed.len(),
            "Snapshot inventory refreshed"
        );
        self.snapshots = snapshots;
        self.loaded_at = Some(Local::now());
        Ok(self.snapshots.len())
    }

    /// Snapshots from the last successful load (empty before the first).
    pub fn current(&self) -> &[Snapshot] {
        &self.snapshots
    }

    /// Look up a snapshot by full name.
    pub fn find(&self, full_name: &str) -> Option<&Snapshot> {
        self.snapshots.iter().find(|s| s.full_name() == full_name)
    }

    /// When the last successful load finished.
    pub fn loaded_at(&self) -> Option<DateTime<Local>> {
        self.loaded_at
    }

    /// Configured pool filter (empty = all pools).
    pub fn pools(&self) -> &[String] {
        &self.pools
    }

    /// Number of snapshots loaded.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Whether the inventory holds no snapshots.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

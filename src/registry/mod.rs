//! Persistent list of replication targets.
//!
//! The store is a JSON array of `{name, host, dataset, use_ssh}` objects.
//! Loading never discards data: anything that is not a valid target list is
//! reported as [`RegistryError::Corrupt`] and the file is left untouched.
//! Saving is atomic (temp file in the same directory, fsync, rename), and the
//! in-memory list changes only after the file has been replaced.

use crate::model::{RegistryError, RemoteTarget};
use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// File name of the target store inside the config directory.
pub const REGISTRY_FILE_NAME: &str = "remote_targets.json";

/// Default store location: `<config_dir>/zsnap/remote_targets.json`.
///
/// Returns `None` if the platform has no config directory.
pub fn default_registry_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("zsnap").join(REGISTRY_FILE_NAME))
}

/// Saved replication targets, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetRegistry {
    path: PathBuf,
    targets: Vec<RemoteTarget>,
}

impl TargetRegistry {
    /// An empty registry backed by `path` (nothing is written until `add`).
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            targets: Vec::new(),
        }
    }

    /// Load the store at `path`.
    ///
    /// # Errors
    ///
    /// - `Corrupt` if the file is not a JSON target array, a record violates the
    ///   target invariant, or two records share a name
    /// - `Io` if the file exists but can not be read
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, RegistryError> {
        let path = path.into();
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "No target registry yet, starting empty");
                return Ok(Self::empty(path));
            }
            Err(source) => return Err(RegistryError::Io { path, source }),
        };

        let corrupt = |reason: String| RegistryError::Corrupt {
            path: path.clone(),
            reason,
        };

        let targets: Vec<RemoteTarget> =
            serde_json::from_str(&contents).map_err(|e| corrupt(e.to_string()))?;

        let mut names = HashSet::new();
        for (index, target) in targets.iter().enumerate() {
            target
                .validate()
                .map_err(|e| corrupt(format!("entry {index}: {e}")))?;
            if !names.insert(target.name()) {
                return Err(corrupt(format!(
                    "entry {index}: duplicate target name '{}'",
                    target.name()
                )));
            }
        }

        info!(path = %path.display(), count = targets.len(), "Loaded target registry");
        Ok(Self { path, targets })
    }

    /// Append a target and persist the whole list.
    ///
    /// # Errors
    ///
    /// - `DuplicateName` if a target with the same name exists
    /// - `InvalidTarget` if the target fails validation
    /// - `Io` if the store can not be written; the registry is then unchanged
    pub fn add(&mut self, target: RemoteTarget) -> Result<(), RegistryError> {
        target.validate()?;
        if self.targets.iter().any(|t| t.name() == target.name()) {
            return Err(RegistryError::DuplicateName(target.name().to_string()));
        }

        let mut updated = self.targets.clone();
        updated.push(target);
        save_atomic(&self.path, &updated).map_err(|source| RegistryError::Io {
            path: self.path.clone(),
            source,
        })?;

        info!(path = %self.path.display(), count = updated.len(), "Saved target registry");
        self.targets = updated;
        Ok(())
    }

    /// All targets in insertion order.
    pub fn list(&self) -> &[RemoteTarget] {
        &self.targets
    }

    /// Target at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&RemoteTarget> {
        self.targets.get(index)
    }

    /// Number of saved targets.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether no targets are saved.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Atomic save: serialize, write a temp file beside the target, fsync, rename.
fn save_atomic(path: &Path, targets: &[RemoteTarget]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(targets)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    let tmp_path = path.with_extension("json.tmp");
    {
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
    }

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(name: &str) -> RemoteTarget {
        RemoteTarget::new(name, "user@host", "pool/bak", true).unwrap()
    }

    #[test]
    fn missing_file_is_empty_registry() {
        let dir = tempfile::tempdir().unwrap();
        let registry = TargetRegistry::load(dir.path().join("remote_targets.json")).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn add_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("remote_targets.json");
        let mut registry = TargetRegistry::load(&path).unwrap();

        registry.add(target("backup")).unwrap();

        let reloaded = TargetRegistry::load(&path).unwrap();
        assert_eq!(reloaded.list(), registry.list());
        assert_eq!(reloaded.get(0).map(RemoteTarget::name), Some("backup"));
    }

    #[test]
    fn duplicate_name_is_rejected_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("remote_targets.json");
        let mut registry = TargetRegistry::load(&path).unwrap();
        registry.add(target("backup")).unwrap();
        let before = fs::read_to_string(&path).unwrap();

        let err = registry
            .add(RemoteTarget::local("backup", "tank/copy").unwrap())
            .unwrap_err();

        assert!(matches!(err, RegistryError::DuplicateName(ref n) if n == "backup"));
        assert_eq!(registry.len(), 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("remote_targets.json");
        let mut registry = TargetRegistry::load(&path).unwrap();
        registry.add(target("backup")).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn malformed_json_is_corrupt_and_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("remote_targets.json");
        fs::write(&path, "not valid json {{{").unwrap();

        let err = TargetRegistry::load(&path).unwrap_err();

        assert!(matches!(err, RegistryError::Corrupt { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "not valid json {{{");
    }

    #[test]
    fn invalid_record_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("remote_targets.json");
        fs::write(
            &path,
            r#"[{"name":"x","host":"local","dataset":"pool/bak","use_ssh":true}]"#,
        )
        .unwrap();

        let err = TargetRegistry::load(&path).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Corrupt { ref reason, .. } if reason.contains("entry 0")
        ));
    }

    #[test]
    fn duplicate_names_on_disk_are_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("remote_targets.json");
        fs::write(
            &path,
            r#"[{"name":"x","host":"local","dataset":"a/b","use_ssh":false},
                {"name":"x","host":"local","dataset":"c/d","use_ssh":false}]"#,
        )
        .unwrap();

        assert!(matches!(
            TargetRegistry::load(&path),
            Err(RegistryError::Corrupt { .. })
        ));
    }

    #[test]
    fn failed_write_leaves_memory_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        // Parent is a regular file, so create_dir_all fails.
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let mut registry = TargetRegistry::empty(blocker.join("remote_targets.json"));

        let err = registry.add(target("backup")).unwrap_err();

        assert!(matches!(err, RegistryError::Io { .. }));
        assert!(registry.is_empty());
    }
}

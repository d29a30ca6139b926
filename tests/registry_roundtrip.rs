//! Integration test: remote targets survive a restart.

use zsnap::model::{RegistryError, RemoteTarget};
use zsnap::registry::TargetRegistry;

#[test]
fn added_targets_are_returned_by_a_fresh_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("remote_targets.json");

    let mut registry = TargetRegistry::load(&path).unwrap();
    assert!(registry.is_empty());

    let offsite =
        RemoteTarget::new("offsite", "backup@vault.example", "tank/replica", true).unwrap();
    let mirror = RemoteTarget::local("mirror", "backup/mirror").unwrap();
    registry.add(offsite.clone()).unwrap();
    registry.add(mirror.clone()).unwrap();

    let reloaded = TargetRegistry::load(&path).unwrap();
    assert_eq!(reloaded.list(), [offsite, mirror]);
}

#[test]
fn duplicate_name_is_rejected_and_file_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("remote_targets.json");
    let mut registry = TargetRegistry::load(&path).unwrap();

    registry
        .add(RemoteTarget::local("backup", "pool/one").unwrap())
        .unwrap();
    let before = std::fs::read_to_string(&path).unwrap();

    let err = registry
        .add(RemoteTarget::local("backup", "pool/two").unwrap())
        .unwrap_err();

    assert!(matches!(err, RegistryError::DuplicateName(ref name) if name == "backup"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    assert_eq!(registry.len(), 1);
}

#[test]
fn stored_file_uses_plain_field_names() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("remote_targets.json");
    let mut registry = TargetRegistry::load(&path).unwrap();
    registry
        .add(RemoteTarget::new("offsite", "root@host", "pool/in", true).unwrap())
        .unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

    assert_eq!(
        value,
        serde_json::json!([
            {"name": "offsite", "host": "root@host", "dataset": "pool/in", "use_ssh": true}
        ])
    );
}

#[test]
fn hand_edited_file_with_invalid_entry_is_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("remote_targets.json");
    std::fs::write(
        &path,
        r#"[{"name": "bad", "host": "local", "dataset": "pool/in", "use_ssh": true}]"#,
    )
    .unwrap();

    match TargetRegistry::load(&path) {
        Err(RegistryError::Corrupt { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected Corrupt, got {other:?}"),
    }
}

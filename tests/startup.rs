//! Integration test: startup failures are reported before the TUI starts.

use std::process::Command;

#[test]
fn corrupt_registry_aborts_with_path_on_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let registry = dir.path().join("remote_targets.json");
    std::fs::write(&registry, "[{broken").unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(
        &config,
        format!("log_file_path = {:?}\n", dir.path().join("zsnap.log")),
    )
    .unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_zsnap"))
        .arg("--config")
        .arg(&config)
        .arg("--registry")
        .arg(&registry)
        .output()
        .expect("Failed to execute binary");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("RegistryCorrupt"), "stderr: {stderr}");
    assert!(stderr.contains("remote_targets.json"), "stderr: {stderr}");
    assert_eq!(std::fs::read_to_string(&registry).unwrap(), "[{broken");
}

#[test]
fn invalid_config_aborts_with_field_name() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "status_seconds = 0\n").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_zsnap"))
        .arg("--config")
        .arg(&config)
        .output()
        .expect("Failed to execute binary");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("status_seconds"));
}

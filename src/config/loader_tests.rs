//! Tests for configuration file loading.

use super::*;
use serial_test::serial;
use std::env;
use std::fs;

#[test]
fn default_config_path_contains_zsnap_config_toml() {
    let path = default_config_path().expect("Should have default path");
    let path_str = path.to_string_lossy();
    assert!(
        path_str.contains("zsnap") && path_str.ends_with("config.toml"),
        "Path should contain 'zsnap' and end with 'config.toml', got: {}",
        path_str
    );
}

#[test]
fn load_config_file_returns_ok_none_for_missing_file() {
    let result = load_config_file("/nonexistent/path/to/config.toml");
    assert_eq!(
        result,
        Ok(None),
        "Missing config file should return Ok(None), not an error"
    );
}

#[test]
fn load_config_file_parses_valid_toml() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.toml");

    let toml_content = r#"
pools = ["tank", "backup"]
mount_root = "/mnt/snaps"
status_seconds = 8
browsers = ["mc"]
pager = "more"
use_sudo = true
registry_path = "/etc/zsnap/targets.json"
"#;
    fs::write(&config_path, toml_content).expect("Failed to write test config");

    let config = load_config_file(&config_path)
        .expect("Should successfully parse valid TOML")
        .expect("Should return Some(ConfigFile) for existing file");

    assert_eq!(
        config.pools,
        Some(vec!["tank".to_string(), "backup".to_string()])
    );
    assert_eq!(config.mount_root, Some(PathBuf::from("/mnt/snaps")));
    assert_eq!(config.status_seconds, Some(8));
    assert_eq!(config.browsers, Some(vec!["mc".to_string()]));
    assert_eq!(config.pager, Some("more".to_string()));
    assert_eq!(config.use_sudo, Some(true));
    assert_eq!(
        config.registry_path,
        Some(PathBuf::from("/etc/zsnap/targets.json"))
    );
    assert_eq!(config.log_file_path, None);
}

#[test]
fn load_config_file_returns_error_for_invalid_toml() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "this is not valid TOML ][}{").unwrap();

    match load_config_file(&config_path) {
        Err(ConfigError::ParseError { path, reason: _ }) => assert_eq!(path, config_path),
        other => panic!("Expected ParseError, got {:?}", other),
    }
}

#[test]
fn config_file_rejects_unknown_fields() {
    let result: Result<ConfigFile, _> = toml::from_str(r#"theme = "dark""#);
    assert!(
        result.is_err(),
        "Unknown keys should be rejected by deny_unknown_fields"
    );
}

#[test]
fn zero_status_seconds_is_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "status_seconds = 0").unwrap();

    assert!(matches!(
        load_config_file(&config_path),
        Err(ConfigError::InvalidValue {
            field: "status_seconds",
            ..
        })
    ));
}

#[test]
fn oversized_status_seconds_is_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "status_seconds = 9223372036854775807").unwrap();

    assert!(matches!(
        load_config_file(&config_path),
        Err(ConfigError::InvalidValue {
            field: "status_seconds",
            ..
        })
    ));
}

#[test]
fn status_seconds_upper_bound_is_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, format!("status_seconds = {MAX_STATUS_SECONDS}")).unwrap();

    let config = load_config_file(&config_path).unwrap().unwrap();
    assert_eq!(config.status_seconds, Some(MAX_STATUS_SECONDS));
}

#[test]
fn merge_config_uses_defaults_when_none() {
    assert_eq!(merge_config(None), ResolvedConfig::default());
}

#[test]
fn resolved_config_default_has_expected_values() {
    let config = ResolvedConfig::default();
    assert!(config.pools.is_empty());
    assert_eq!(config.mount_root, PathBuf::from("/tmp"));
    assert_eq!(config.status_seconds, 5);
    assert_eq!(config.browsers, vec!["ncdu", "yazi", "mc"]);
    assert_eq!(config.pager, "less -R");
    assert!(!config.use_sudo);
    assert!(config
        .registry_path
        .to_string_lossy()
        .ends_with("remote_targets.json"));
    assert!(config.log_file_path.to_string_lossy().ends_with("zsnap.log"));
}

#[test]
fn merge_config_uses_defaults_for_none_fields() {
    let config_file = ConfigFile {
        pager: Some("most".to_string()),
        ..ConfigFile::default()
    };

    let resolved = merge_config(Some(config_file));
    let defaults = ResolvedConfig::default();

    assert_eq!(resolved.pager, "most");
    assert_eq!(resolved.browsers, defaults.browsers);
    assert_eq!(resolved.mount_root, defaults.mount_root);
    assert_eq!(resolved.log_file_path, defaults.log_file_path);
}

/// RAII guard to ensure environment variable cleanup even under test parallelism.
/// Removes the var on drop, preventing test pollution in parallel execution.
struct EnvGuard(&'static str);

impl EnvGuard {
    fn new(name: &'static str) -> Self {
        env::remove_var(name);
        EnvGuard(name)
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        env::remove_var(self.0);
    }
}

#[test]
#[serial(zsnap_env)]
fn apply_env_overrides_respects_registry_path() {
    let _guard = EnvGuard::new(ENV_REGISTRY);
    env::set_var(ENV_REGISTRY, "/srv/targets.json");

    let result = apply_env_overrides(ResolvedConfig::default());

    assert_eq!(result.registry_path, PathBuf::from("/srv/targets.json"));
}

#[test]
#[serial(zsnap_env)]
fn apply_env_overrides_parses_sudo_flag() {
    let _guard = EnvGuard::new(ENV_SUDO);

    env::set_var(ENV_SUDO, "yes");
    assert!(apply_env_overrides(ResolvedConfig::default()).use_sudo);

    env::set_var(ENV_SUDO, "0");
    let base = ResolvedConfig {
        use_sudo: true,
        ..ResolvedConfig::default()
    };
    assert!(!apply_env_overrides(base).use_sudo);

    env::set_var(ENV_SUDO, "maybe");
    assert!(
        !apply_env_overrides(ResolvedConfig::default()).use_sudo,
        "Unrecognised values leave the setting alone"
    );
}

#[test]
#[serial(zsnap_env)]
fn apply_env_overrides_no_change_when_env_var_not_set() {
    let _registry = EnvGuard::new(ENV_REGISTRY);
    let _sudo = EnvGuard::new(ENV_SUDO);

    let base = ResolvedConfig::default();
    let result = apply_env_overrides(base.clone());

    assert_eq!(result, base, "Config should be unchanged when no env var is set");
}

#[test]
#[serial(zsnap_config)]
fn load_config_with_precedence_prefers_explicit_path() {
    let _guard = EnvGuard::new(ENV_CONFIG);
    let dir = tempfile::tempdir().unwrap();

    let explicit_path = dir.path().join("explicit.toml");
    fs::write(&explicit_path, r#"pager = "explicit""#).unwrap();
    let env_path = dir.path().join("env.toml");
    fs::write(&env_path, r#"pager = "env""#).unwrap();
    env::set_var(ENV_CONFIG, &env_path);

    let config = load_config_with_precedence(Some(explicit_path))
        .unwrap()
        .unwrap();

    assert_eq!(
        config.pager,
        Some("explicit".to_string()),
        "Should use explicit path, not ZSNAP_CONFIG env var"
    );
}

#[test]
#[serial(zsnap_config)]
fn load_config_with_precedence_uses_env_var_when_no_explicit_path() {
    let _guard = EnvGuard::new(ENV_CONFIG);
    let dir = tempfile::tempdir().unwrap();
    let env_path = dir.path().join("env.toml");
    fs::write(&env_path, r#"pager = "env""#).unwrap();
    env::set_var(ENV_CONFIG, &env_path);

    let config = load_config_with_precedence(None).unwrap().unwrap();

    assert_eq!(config.pager, Some("env".to_string()));
}

#[test]
fn apply_cli_overrides_replaces_pools_registry_and_sudo() {
    let result = apply_cli_overrides(
        ResolvedConfig::default(),
        vec!["tank".to_string()],
        Some(PathBuf::from("/tmp/targets.json")),
        Some(true),
    );

    assert_eq!(result.pools, vec!["tank".to_string()]);
    assert_eq!(result.registry_path, PathBuf::from("/tmp/targets.json"));
    assert!(result.use_sudo);
}

#[test]
fn apply_cli_overrides_no_overrides() {
    let base = ResolvedConfig {
        pools: vec!["backup".to_string()],
        ..ResolvedConfig::default()
    };
    let result = apply_cli_overrides(base.clone(), Vec::new(), None, None);
    assert_eq!(result, base, "Empty CLI input keeps configured values");
}

#[test]
#[serial(zsnap_env)]
fn precedence_chain_file_then_env_then_cli() {
    let _guard = EnvGuard::new(ENV_REGISTRY);

    let config_file = ConfigFile {
        registry_path: Some(PathBuf::from("/from/file.json")),
        use_sudo: Some(false),
        ..ConfigFile::default()
    };
    let merged = merge_config(Some(config_file));
    assert_eq!(merged.registry_path, PathBuf::from("/from/file.json"));

    env::set_var(ENV_REGISTRY, "/from/env.json");
    let with_env = apply_env_overrides(merged);
    assert_eq!(with_env.registry_path, PathBuf::from("/from/env.json"));

    let final_config = apply_cli_overrides(
        with_env,
        Vec::new(),
        Some(PathBuf::from("/from/cli.json")),
        Some(true),
    );
    assert_eq!(final_config.registry_path, PathBuf::from("/from/cli.json"));
    assert!(final_config.use_sudo);
}

//! Configuration file loading with precedence handling.

use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const ENV_CONFIG: &str = "ZSNAP_CONFIG";
/// Environment variable overriding the target registry path.
pub const ENV_REGISTRY: &str = "ZSNAP_REGISTRY";
/// Environment variable enabling `sudo` for privileged commands.
pub const ENV_SUDO: &str = "ZSNAP_SUDO";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (file may not exist or have permission issues).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax or unknown keys.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },

    /// A value parsed but is out of range.
    #[error("Invalid value for '{field}' in {path}: {reason}")]
    InvalidValue {
        /// Config file path.
        path: PathBuf,
        /// Offending key.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/zsnap/config.toml`.
///
/// ```toml
/// pools = ["tank", "backup"]
/// mount_root = "/tmp"
/// status_seconds = 5
/// browsers = ["ncdu", "yazi", "mc"]
/// pager = "less -R"
/// use_sudo = true
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Pools to list (empty or missing = all pools).
    #[serde(default)]
    pub pools: Option<Vec<String>>,

    /// Directory that holds snapshot mount points.
    #[serde(default)]
    pub mount_root: Option<PathBuf>,

    /// Seconds a status message stays visible.
    #[serde(default)]
    pub status_seconds: Option<u64>,

    /// Content browsers in preference order.
    #[serde(default)]
    pub browsers: Option<Vec<String>>,

    /// Pager command line for diffs.
    #[serde(default)]
    pub pager: Option<String>,

    /// Run privileged commands through `sudo`.
    #[serde(default)]
    pub use_sudo: Option<bool>,

    /// Path of the replication target store.
    #[serde(default)]
    pub registry_path: Option<PathBuf>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Pools to list (empty = all pools).
    pub pools: Vec<String>,
    /// Directory that holds snapshot mount points.
    pub mount_root: PathBuf,
    /// Seconds a status message stays visible.
    pub status_seconds: u64,
    /// Content browsers in preference order.
    pub browsers: Vec<String>,
    /// Pager command line for diffs.
    pub pager: String,
    /// Run privileged commands through `sudo`.
    pub use_sudo: bool,
    /// Path of the replication target store.
    pub registry_path: PathBuf,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            pools: Vec::new(),
            mount_root: PathBuf::from("/tmp"),
            status_seconds: 5,
            browsers: vec!["ncdu".to_string(), "yazi".to_string(), "mc".to_string()],
            pager: "less -R".to_string(),
            use_sudo: false,
            registry_path: default_registry_path(),
            log_file_path: default_log_path(),
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/zsnap/zsnap.log` on Linux, or the platform state
/// directory elsewhere. Falls back to the current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("zsnap").join("zsnap.log")
    } else {
        PathBuf::from("zsnap.log")
    }
}

/// Resolve default target registry path, falling back to the current directory.
pub fn default_registry_path() -> PathBuf {
    crate::registry::default_registry_path()
        .unwrap_or_else(|| PathBuf::from(crate::registry::REGISTRY_FILE_NAME))
}

/// Longest accepted status message lifetime, in seconds.
pub const MAX_STATUS_SECONDS: u64 = 3600;

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors, or if
/// `status_seconds` is outside `1..=MAX_STATUS_SECONDS`.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    // Missing file is not an error - use defaults
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    if let Some(seconds) = config.status_seconds {
        if !(1..=MAX_STATUS_SECONDS).contains(&seconds) {
            return Err(ConfigError::InvalidValue {
                path,
                field: "status_seconds",
                reason: format!("must be between 1 and {MAX_STATUS_SECONDS}"),
            });
        }
    }

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/zsnap/config.toml` on Linux, appropriate path on other platforms.
/// Returns `None` if home directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("zsnap").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `ZSNAP_CONFIG` environment variable
/// 3. Default path `~/.config/zsnap/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var(ENV_CONFIG) {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        pools: config.pools.unwrap_or(defaults.pools),
        mount_root: config.mount_root.unwrap_or(defaults.mount_root),
        status_seconds: config.status_seconds.unwrap_or(defaults.status_seconds),
        browsers: config.browsers.unwrap_or(defaults.browsers),
        pager: config.pager.unwrap_or(defaults.pager),
        use_sudo: config.use_sudo.unwrap_or(defaults.use_sudo),
        registry_path: config.registry_path.unwrap_or(defaults.registry_path),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Parse a boolean environment value (`1/true/yes/on`, `0/false/no/off`).
fn parse_env_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `ZSNAP_REGISTRY`: Override registry path
/// - `ZSNAP_SUDO`: Override `use_sudo` (unrecognised values are ignored)
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(path) = std::env::var(ENV_REGISTRY) {
        if !path.is_empty() {
            config.registry_path = PathBuf::from(path);
        }
    }

    if let Some(sudo) = std::env::var(ENV_SUDO)
        .ok()
        .as_deref()
        .and_then(parse_env_bool)
    {
        config.use_sudo = sudo;
    }

    config
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only applies overrides for flags that were explicitly set by the user.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
///
/// # Arguments
///
/// * `config` - Base resolved config (already merged with defaults, file, and env vars)
/// * `pools` - Positional pool names; an empty list keeps the configured pools
/// * `registry_override` - Optional path from `--registry`
/// * `sudo_override` - `Some(true)` when `--sudo` was passed
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    pools: Vec<String>,
    registry_override: Option<PathBuf>,
    sudo_override: Option<bool>,
) -> ResolvedConfig {
    if !pools.is_empty() {
        config.pools = pools;
    }

    if let Some(path) = registry_override {
        config.registry_path = path;
    }

    if let Some(sudo) = sudo_override {
        config.use_sudo = sudo;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;

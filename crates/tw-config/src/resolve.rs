//! Configuration resolution, path discovery, and loading.
//!
//! Resolution order: CLI argument → environment variables → XDG paths →
//! system config → built-in defaults.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::monitor::MonitorConfig;
use crate::snapshot::ConfigSnapshot;
use crate::validate::{validate_monitor, ValidationError, ValidationResult};

/// Discovered configuration file path.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Path to monitor.json (or None if not found).
    pub monitor: Option<PathBuf>,

    /// Source of the monitor config (for diagnostics).
    pub source: ConfigSource,
}

/// Where a configuration file was found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided via CLI argument.
    CliArgument,

    /// Set via environment variable.
    Environment,

    /// Found in XDG config directory.
    XdgConfig,

    /// Found in /etc/trapwatch/.
    SystemConfig,

    /// Using built-in defaults.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::SystemConfig => write!(f, "system config"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// Environment variable names.
pub const ENV_CONFIG_PATH: &str = "TRAPWATCH_CONFIG";
pub const ENV_CONFIG_DIR: &str = "TRAPWATCH_CONFIG_DIR";

/// Standard config file name.
const MONITOR_FILENAME: &str = "monitor.json";

/// Application name for XDG directories.
const APP_NAME: &str = "trapwatch";

/// Resolve the monitor config path using the standard resolution order.
///
/// 1. Explicit CLI path (if it exists)
/// 2. TRAPWATCH_CONFIG environment variable
/// 3. TRAPWATCH_CONFIG_DIR environment variable + monitor.json
/// 4. XDG config directory (~/.config/trapwatch/)
/// 5. System config (/etc/trapwatch/)
/// 6. Built-in defaults (None)
pub fn resolve_config(cli_path: Option<&Path>) -> ConfigPaths {
    let mut paths = ConfigPaths::default();

    if let Some(path) = cli_path {
        if path.exists() {
            paths.source = ConfigSource::CliArgument;
            paths.monitor = Some(path.to_path_buf());
            return paths;
        }
    }

    if let Ok(env_path) = std::env::var(ENV_CONFIG_PATH) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            paths.source = ConfigSource::Environment;
            paths.monitor = Some(path);
            return paths;
        }
    }

    if let Ok(config_dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = PathBuf::from(config_dir).join(MONITOR_FILENAME);
        if path.exists() {
            paths.source = ConfigSource::Environment;
            paths.monitor = Some(path);
            return paths;
        }
    }

    if let Some(dir) = xdg_config_dir() {
        let path = dir.join(MONITOR_FILENAME);
        if path.exists() {
            paths.source = ConfigSource::XdgConfig;
            paths.monitor = Some(path);
            return paths;
        }
    }

    let system_path = system_config_dir().join(MONITOR_FILENAME);
    if system_path.exists() {
        paths.source = ConfigSource::SystemConfig;
        paths.monitor = Some(system_path);
        return paths;
    }

    paths.source = ConfigSource::BuiltinDefault;
    paths
}

/// Get the XDG config directory for trapwatch.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Get the system config directory.
pub fn system_config_dir() -> PathBuf {
    PathBuf::from("/etc").join(APP_NAME)
}

/// A validated configuration together with its provenance.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: MonitorConfig,
    pub paths: ConfigPaths,
    /// SHA-256 of the file content (None when using defaults).
    pub content_hash: Option<String>,
}

impl LoadedConfig {
    /// Whether built-in defaults are in use.
    pub fn is_default(&self) -> bool {
        self.paths.monitor.is_none()
    }

    /// Snapshot of this configuration for reports.
    pub fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot::new(&self.config, &self.paths, self.content_hash.as_deref())
    }
}

/// Resolve, read, parse, and validate the monitor configuration.
///
/// An explicit CLI path that does not exist is an error rather than a
/// silent fall-through to defaults.
pub fn load_config(cli_path: Option<&Path>) -> ValidationResult<LoadedConfig> {
    if let Some(path) = cli_path {
        if !path.exists() {
            return Err(ValidationError::IoError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
    }

    let paths = resolve_config(cli_path);
    let (config, content_hash) = match &paths.monitor {
        Some(path) => {
            let content = std::fs::read_to_string(path).map_err(|e| {
                ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
            })?;
            let config = MonitorConfig::parse_json(&content)?;
            (config, Some(hash_content(&content)))
        }
        None => (MonitorConfig::default(), None),
    };

    validate_monitor(&config)?;

    Ok(LoadedConfig {
        config,
        paths,
        content_hash,
    })
}

/// SHA-256 hex digest of config content.
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

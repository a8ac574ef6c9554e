//! No-mock configuration validation + resolution tests.
//!
//! Covers:
//! - Resolution order (CLI > env path > env dir)
//! - Loading and validating real files on disk
//! - Snapshot provenance

use std::env;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, OnceLock};
use tempfile::TempDir;
use tw_config::resolve::{ENV_CONFIG_DIR, ENV_CONFIG_PATH};
use tw_config::{load_config, resolve_config, ConfigSource, ValidationError};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

struct EnvGuard {
    keys: Vec<String>,
    saved: Vec<Option<String>>,
}

impl EnvGuard {
    fn new(keys: &[&str]) -> Self {
        let mut saved = Vec::with_capacity(keys.len());
        for key in keys {
            saved.push(env::var(key).ok());
        }
        Self {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            saved,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (idx, key) in self.keys.iter().enumerate() {
            match self.saved.get(idx).and_then(|v| v.as_ref()) {
                Some(val) => env::set_var(key, val),
                None => env::remove_var(key),
            }
        }
    }
}

fn with_env_lock<T>(f: impl FnOnce() -> T) -> T {
    let _guard = ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    f()
}

fn write_config(path: &Path, window_days: u32) {
    fs::write(
        path,
        format!(
            r#"{{
  "schema_version": "1.0.0",
  "description": "test orchard",
  "window_days": {window_days},
  "pest_thresholds": {{ "default_threshold": 12, "by_pest": {{ "Codling Moth": 4 }} }},
  "notifications": {{ "renotify_on_repeat_warning": true }}
}}"#
        ),
    )
    .expect("write config");
}

#[test]
fn cli_path_wins_over_environment() {
    with_env_lock(|| {
        let _guard = EnvGuard::new(&[ENV_CONFIG_PATH, ENV_CONFIG_DIR]);
        let dir = TempDir::new().unwrap();
        let cli = dir.path().join("cli.json");
        let from_env = dir.path().join("env.json");
        write_config(&cli, 3);
        write_config(&from_env, 5);
        env::set_var(ENV_CONFIG_PATH, &from_env);

        let paths = resolve_config(Some(&cli));
        assert_eq!(paths.source, ConfigSource::CliArgument);
        assert_eq!(paths.monitor.as_deref(), Some(cli.as_path()));

        let loaded = load_config(Some(&cli)).unwrap();
        assert_eq!(loaded.config.window_days, 3);
    });
}

#[test]
fn env_path_then_env_dir() {
    with_env_lock(|| {
        let _guard = EnvGuard::new(&[ENV_CONFIG_PATH, ENV_CONFIG_DIR]);
        let dir = TempDir::new().unwrap();
        let config_dir = dir.path().join("conf");
        fs::create_dir_all(&config_dir).unwrap();
        write_config(&config_dir.join("monitor.json"), 21);

        env::remove_var(ENV_CONFIG_PATH);
        env::set_var(ENV_CONFIG_DIR, &config_dir);
        let loaded = load_config(None).unwrap();
        assert_eq!(loaded.paths.source, ConfigSource::Environment);
        assert_eq!(loaded.config.window_days, 21);
        assert!(!loaded.is_default());

        let direct = dir.path().join("direct.json");
        write_config(&direct, 9);
        env::set_var(ENV_CONFIG_PATH, &direct);
        let loaded = load_config(None).unwrap();
        assert_eq!(loaded.config.window_days, 9);
    });
}

#[test]
fn loaded_file_thresholds_and_snapshot() {
    with_env_lock(|| {
        let _guard = EnvGuard::new(&[ENV_CONFIG_PATH, ENV_CONFIG_DIR]);
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("monitor.json");
        write_config(&path, 10);

        let loaded = load_config(Some(&path)).unwrap();
        let pest = tw_common::PestType::new("codling_moth");
        assert_eq!(loaded.config.pest_thresholds.threshold_for(Some(&pest)), 4);
        assert_eq!(loaded.config.pest_thresholds.threshold_for(None), 12);
        assert!(loaded.config.notifications.renotify_on_repeat_warning);
        assert!(loaded.config.notifications.renotify_on_repeat_danger);

        let snapshot = loaded.snapshot();
        assert_eq!(snapshot.config_source, "CLI argument");
        assert_eq!(snapshot.config_hash.as_ref().map(String::len), Some(64));
        assert_eq!(snapshot.summary.default_threshold, 12);
    });
}

#[test]
fn invalid_file_fails_semantic_validation() {
    with_env_lock(|| {
        let _guard = EnvGuard::new(&[ENV_CONFIG_PATH, ENV_CONFIG_DIR]);
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("monitor.json");
        write_config(&path, 0);

        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidValue { .. }));
    });
}

#[test]
fn unparseable_file_is_parse_error() {
    with_env_lock(|| {
        let _guard = EnvGuard::new(&[ENV_CONFIG_PATH, ENV_CONFIG_DIR]);
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("monitor.json");
        fs::write(&path, "{ window_days: 3 ").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, ValidationError::ParseError(_)));
    });
}

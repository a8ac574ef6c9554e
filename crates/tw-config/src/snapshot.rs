//! Configuration snapshots for report provenance.
//!
//! A snapshot records which configuration produced an assessment, so a
//! warning sent to a grower can be traced back to its thresholds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::monitor::MonitorConfig;
use crate::resolve::ConfigPaths;

/// A frozen snapshot of configuration state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    /// When this snapshot was taken.
    pub timestamp: DateTime<Utc>,

    /// Schema version of the configuration.
    pub schema_version: String,

    /// SHA-256 hash of the monitor.json content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_hash: Option<String>,

    /// Path where the config was loaded from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_path: Option<String>,

    /// Source of the configuration.
    pub config_source: String,

    /// Key configuration values for quick reference.
    pub summary: ConfigSummary,
}

/// Summary of key configuration values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSummary {
    pub window_days: u32,
    pub default_threshold: u32,
    pub pest_threshold_count: usize,
    pub renotify_on_repeat_warning: bool,
    pub renotify_on_repeat_danger: bool,
}

impl ConfigSnapshot {
    /// Create a new snapshot from loaded configuration.
    pub fn new(config: &MonitorConfig, paths: &ConfigPaths, content_hash: Option<&str>) -> Self {
        ConfigSnapshot {
            timestamp: Utc::now(),
            schema_version: config.schema_version.clone(),
            config_hash: content_hash.map(str::to_string),
            config_path: paths.monitor.as_ref().map(|p| p.display().to_string()),
            config_source: paths.source.to_string(),
            summary: ConfigSummary {
                window_days: config.window_days,
                default_threshold: config.pest_thresholds.default_threshold,
                pest_threshold_count: config.pest_thresholds.by_pest.len(),
                renotify_on_repeat_warning: config.notifications.renotify_on_repeat_warning,
                renotify_on_repeat_danger: config.notifications.renotify_on_repeat_danger,
            },
        }
    }

    /// Whether two snapshots describe the same configuration content.
    pub fn same_content(&self, other: &ConfigSnapshot) -> bool {
        self.config_hash == other.config_hash && self.schema_version == other.schema_version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::ConfigSource;

    #[test]
    fn snapshot_of_defaults() {
        let snapshot = ConfigSnapshot::new(&MonitorConfig::default(), &ConfigPaths::default(), None);
        assert_eq!(snapshot.config_source, "builtin default");
        assert!(snapshot.config_hash.is_none());
        assert!(snapshot.config_path.is_none());
        assert_eq!(snapshot.summary.window_days, 7);
        assert_eq!(snapshot.summary.pest_threshold_count, 4);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json.get("config_hash").is_none());
    }

    #[test]
    fn snapshot_records_path_and_hash() {
        let paths = ConfigPaths {
            monitor: Some(std::path::PathBuf::from("/etc/trapwatch/monitor.json")),
            source: ConfigSource::SystemConfig,
        };
        let a = ConfigSnapshot::new(&MonitorConfig::default(), &paths, Some("abc"));
        let b = ConfigSnapshot::new(&MonitorConfig::default(), &paths, Some("abc"));
        assert_eq!(a.config_path.as_deref(), Some("/etc/trapwatch/monitor.json"));
        assert_eq!(a.config_source, "system config");
        assert!(a.same_content(&b));
    }
}

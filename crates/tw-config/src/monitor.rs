//! Monitor configuration types.
//!
//! These types match the monitor.json document. Every section has a
//! default so a partial file only overrides what it names.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tw_common::PestType;

/// Default trailing window for the windowed average, in days.
pub const DEFAULT_WINDOW_DAYS: u32 = 7;

/// Upper bound accepted for `window_days`.
pub const MAX_WINDOW_DAYS: u32 = 365;

/// Legacy count threshold for pests without their own entry.
pub const DEFAULT_THRESHOLD: u32 = 10;

/// Complete monitor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MonitorConfig {
    pub schema_version: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Length of the trailing window used for the average rate.
    #[serde(default = "default_window_days")]
    pub window_days: u32,

    #[serde(default)]
    pub pest_thresholds: PestThresholds,

    #[serde(default)]
    pub notifications: NotificationPolicy,
}

fn default_window_days() -> u32 {
    DEFAULT_WINDOW_DAYS
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
            description: None,
            window_days: DEFAULT_WINDOW_DAYS,
            pest_thresholds: PestThresholds::default(),
            notifications: NotificationPolicy::default(),
        }
    }
}

impl MonitorConfig {
    /// Load monitor config from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, crate::validate::ValidationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::validate::ValidationError::IoError(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::parse_json(&content)
    }

    /// Parse monitor config from a JSON string.
    pub fn parse_json(json: &str) -> Result<Self, crate::validate::ValidationError> {
        serde_json::from_str(json).map_err(|e| {
            crate::validate::ValidationError::ParseError(format!("Invalid JSON: {}", e))
        })
    }
}

/// Legacy count thresholds per pest type.
///
/// Keys are matched after pest-name normalization, so `"Codling Moth"` in
/// the file matches a trap tagged `codling_moth`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PestThresholds {
    /// Threshold for traps with no pest type or an unlisted one.
    #[serde(default = "default_threshold")]
    pub default_threshold: u32,

    #[serde(default)]
    pub by_pest: BTreeMap<String, u32>,
}

impl Default for PestThresholds {
    fn default() -> Self {
        let by_pest = [
            ("codling_moth", 5),
            ("oriental_fruit_moth", 10),
            ("fruit_fly", 8),
            ("aphid", 20),
        ]
        .into_iter()
        .map(|(name, threshold)| (name.to_string(), threshold))
        .collect();

        Self {
            default_threshold: DEFAULT_THRESHOLD,
            by_pest,
        }
    }
}

fn default_threshold() -> u32 {
    DEFAULT_THRESHOLD
}

impl PestThresholds {
    /// Threshold for a pest type, falling back to the default.
    pub fn threshold_for(&self, pest: Option<&PestType>) -> u32 {
        pest.and_then(|pest| {
            self.by_pest
                .iter()
                .find(|(name, _)| PestType::new(name) == *pest)
                .map(|(_, threshold)| *threshold)
        })
        .unwrap_or(self.default_threshold)
    }
}

/// When a repeated risk level should notify the grower again.
///
/// Escalations always notify; these flags only govern a level that is
/// unchanged since the previous evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NotificationPolicy {
    #[serde(default)]
    pub renotify_on_repeat_warning: bool,

    #[serde(default = "default_true")]
    pub renotify_on_repeat_danger: bool,
}

fn default_true() -> bool {
    true
}

impl Default for NotificationPolicy {
    fn default() -> Self {
        Self {
            renotify_on_repeat_warning: false,
            renotify_on_repeat_danger: true,
        }
    }
}

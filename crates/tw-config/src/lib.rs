//! Trapwatch configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for monitor.json
//! - Config resolution (CLI → env → XDG → system → defaults)
//! - Semantic validation
//! - Config snapshots for report provenance

pub mod monitor;
pub mod resolve;
pub mod snapshot;
pub mod validate;

pub use monitor::{MonitorConfig, NotificationPolicy, PestThresholds};
pub use resolve::{load_config, resolve_config, ConfigPaths, ConfigSource, LoadedConfig};
pub use snapshot::ConfigSnapshot;
pub use validate::{validate_monitor, ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";

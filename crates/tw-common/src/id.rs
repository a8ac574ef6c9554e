//! Identity types for observations, traps, and CLI runs.
//!
//! Observation and trap identities are owned by the external record store;
//! these wrappers only carry them through the engine unchanged.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque observation identifier assigned by the record store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ObservationId(pub String);

impl ObservationId {
    pub fn new(id: impl Into<String>) -> Self {
        ObservationId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ObservationId {
    fn from(id: &str) -> Self {
        ObservationId(id.to_string())
    }
}

/// Trap identifier. A trap owns one chronological observation sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct TrapId(pub String);

impl TrapId {
    pub fn new(id: impl Into<String>) -> Self {
        TrapId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TrapId {
    fn from(id: &str) -> Self {
        TrapId(id.to_string())
    }
}

/// Pest type key used to look up legacy count thresholds.
///
/// Normalized to lowercase snake_case so `"Codling Moth"` and
/// `"codling_moth"` resolve to the same threshold entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct PestType(pub String);

impl PestType {
    pub fn new(name: &str) -> Self {
        PestType(normalize_pest_name(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn normalize_pest_name(name: &str) -> String {
    name.trim()
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .map(|part| part.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Per-invocation correlation ID used in structured logs.
///
/// Format: `run-<12 hex chars>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub String);

impl RunId {
    /// Generate a new random run ID.
    pub fn new() -> Self {
        let uuid = uuid::Uuid::new_v4().simple().to_string();
        RunId(format!("run-{}", &uuid[..12]))
    }

    /// Parse an existing run ID string.
    pub fn parse(s: &str) -> Option<Self> {
        let suffix = s.strip_prefix("run-")?;
        if suffix.len() != 12 || !suffix.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        Some(RunId(s.to_string()))
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observation_id_display() {
        let id = ObservationId::new("obs-42");
        assert_eq!(id.to_string(), "obs-42");
        assert_eq!(id.as_str(), "obs-42");
    }

    #[test]
    fn test_ids_serialize_transparent() {
        let id = TrapId::from("north-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"north-1\"");
        let back: TrapId = serde_json::from_str("\"north-1\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_pest_type_normalized() {
        assert_eq!(PestType::new("Codling Moth").as_str(), "codling_moth");
        assert_eq!(PestType::new("  oriental-fruit  fly ").as_str(), "oriental_fruit_fly");
        assert_eq!(PestType::new("codling_moth"), PestType::new("CODLING MOTH"));
    }

    #[test]
    fn test_run_id_roundtrip() {
        let id = RunId::new();
        assert!(id.0.starts_with("run-"));
        assert_eq!(id.0.len(), 16);
        assert_eq!(RunId::parse(&id.0), Some(id));
    }

    #[test]
    fn test_run_id_parse_rejects_malformed() {
        assert!(RunId::parse("run-xyz").is_none());
        assert!(RunId::parse("job-0123456789ab").is_none());
        assert!(RunId::parse("run-0123456789ag").is_none());
    }
}

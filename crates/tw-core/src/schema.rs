//! JSON Schema generation for input, config and report types.
//!
//! ```bash
//! trapwatch schema --list
//! trapwatch schema TrapRecord
//! trapwatch schema --all
//! ```

use schemars::schema_for;
use serde_json::Value;
use std::collections::BTreeMap;

pub use crate::alerting::NotificationDecision;
pub use crate::assess::{FarmAssessment, LatestCountAssessment, TrapAssessment};
pub use crate::engine::{Coverage, DailyRatePoint, RatedObservation, WindowAverage};
pub use crate::risk::{RiskAssessment, RiskLevel};
pub use tw_common::{Observation, RawObservation, TrapRecord};
pub use tw_config::MonitorConfig;

/// Available schema types with their descriptions.
pub fn available_schemas() -> Vec<(&'static str, &'static str)> {
    vec![
        // Input
        ("TrapRecord", "One trap's observation history as delivered"),
        ("RawObservation", "Observation row before validation"),
        ("Observation", "Validated trap check"),
        // Configuration
        ("MonitorConfig", "monitor.json configuration"),
        // Engine
        ("RatedObservation", "Observation with derived rate and coverage"),
        ("Coverage", "Inclusive day interval a rate is attributed to"),
        ("WindowAverage", "Average rate over the window ending today"),
        ("DailyRatePoint", "One day of the expanded rate series"),
        // Risk and reports
        ("RiskLevel", "safe, warning or danger"),
        ("RiskAssessment", "Classified risk with messages"),
        ("NotificationDecision", "Whether a risk change should alert"),
        ("LatestCountAssessment", "Legacy count check of the latest observation"),
        ("TrapAssessment", "Full assessment of one trap"),
        ("FarmAssessment", "Assessment of every trap with rollup"),
    ]
}

/// Generate JSON Schema for a type by name. None if the name is unknown.
pub fn generate_schema(type_name: &str) -> Option<Value> {
    let schema = match type_name {
        "TrapRecord" => schema_for!(TrapRecord),
        "RawObservation" => schema_for!(RawObservation),
        "Observation" => schema_for!(Observation),
        "MonitorConfig" => schema_for!(MonitorConfig),
        "RatedObservation" => schema_for!(RatedObservation),
        "Coverage" => schema_for!(Coverage),
        "WindowAverage" => schema_for!(WindowAverage),
        "DailyRatePoint" => schema_for!(DailyRatePoint),
        "RiskLevel" => schema_for!(RiskLevel),
        "RiskAssessment" => schema_for!(RiskAssessment),
        "NotificationDecision" => schema_for!(NotificationDecision),
        "LatestCountAssessment" => schema_for!(LatestCountAssessment),
        "TrapAssessment" => schema_for!(TrapAssessment),
        "FarmAssessment" => schema_for!(FarmAssessment),
        _ => return None,
    };

    serde_json::to_value(schema).ok()
}

/// All schemas keyed by type name.
pub fn generate_all_schemas() -> BTreeMap<String, Value> {
    available_schemas()
        .into_iter()
        .filter_map(|(name, _)| generate_schema(name).map(|s| (name.to_string(), s)))
        .collect()
}

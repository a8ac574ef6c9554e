//! Observation input model and boundary validation.
//!
//! The record store hands over loosely-typed rows (`RawObservation`). They
//! are validated once here into `Observation`, the typed form the rate
//! engine consumes. The engine assumes validated input and does not
//! re-check any of these rules.

use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::id::{ObservationId, PestType, TrapId};

/// A single validated trap check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Observation {
    pub id: ObservationId,
    /// Calendar day of the check. No time-of-day semantics.
    pub date: NaiveDate,
    /// Insects newly caught since the previous check (a delta).
    pub count: u32,
    /// Trap setup/reset marker. Baselines anchor rates but carry none.
    #[serde(default)]
    pub is_baseline: bool,
}

impl Observation {
    pub fn new(id: impl Into<String>, date: NaiveDate, count: u32) -> Self {
        Observation {
            id: ObservationId::new(id),
            date,
            count,
            is_baseline: false,
        }
    }

    pub fn baseline(id: impl Into<String>, date: NaiveDate) -> Self {
        Observation {
            id: ObservationId::new(id),
            date,
            count: 0,
            is_baseline: true,
        }
    }
}

/// An observation row as delivered by the record store, before validation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RawObservation {
    pub id: String,
    /// `YYYY-MM-DD`, or an RFC 3339 timestamp whose UTC date is used.
    pub date: String,
    pub count: i64,
    #[serde(default, alias = "isBaseline")]
    pub is_baseline: bool,
}

/// One trap's observation history as delivered by the record store.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TrapRecord {
    #[serde(alias = "trapId")]
    pub trap_id: String,
    #[serde(default, alias = "pestType")]
    pub pest_type: Option<String>,
    #[serde(default)]
    pub observations: Vec<RawObservation>,
}

/// A trap's observations after boundary validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationBatch {
    pub trap_id: TrapId,
    pub pest_type: Option<PestType>,
    pub observations: Vec<Observation>,
}

impl ObservationBatch {
    /// Validate a raw trap record.
    ///
    /// Rejects blank ids, negative counts, unparseable dates, baselines
    /// carrying a catch, and two observations on one calendar day. The
    /// returned observations keep their input order.
    pub fn validate(record: &TrapRecord) -> Result<Self> {
        if record.trap_id.trim().is_empty() {
            return Err(Error::InvalidInput("trap_id must not be blank".to_string()));
        }

        let mut observations = Vec::with_capacity(record.observations.len());
        let mut seen: HashMap<NaiveDate, &str> = HashMap::new();

        for (index, raw) in record.observations.iter().enumerate() {
            let observation = validate_observation(index, raw)?;
            if let Some(first) = seen.insert(observation.date, raw.id.as_str()) {
                return Err(Error::DuplicateDate {
                    first: first.to_string(),
                    second: raw.id.clone(),
                    date: observation.date.to_string(),
                });
            }
            observations.push(observation);
        }

        Ok(ObservationBatch {
            trap_id: TrapId::new(record.trap_id.trim()),
            pest_type: record
                .pest_type
                .as_deref()
                .filter(|p| !p.trim().is_empty())
                .map(PestType::new),
            observations,
        })
    }

    /// Parse a JSON document holding either one trap record or an array.
    pub fn parse_json(json: &str) -> Result<Vec<Self>> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let records: Vec<TrapRecord> = if value.is_array() {
            serde_json::from_value(value)?
        } else {
            vec![serde_json::from_value(value)?]
        };
        records.iter().map(Self::validate).collect()
    }

    /// Read and validate a JSON observation file.
    pub fn from_file(path: &std::path::Path) -> Result<Vec<Self>> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_json(&content)
    }
}

fn validate_observation(index: usize, raw: &RawObservation) -> Result<Observation> {
    let id = raw.id.trim();
    if id.is_empty() {
        return Err(Error::BlankId { index });
    }

    if raw.count < 0 {
        return Err(Error::NegativeCount {
            id: id.to_string(),
            count: raw.count,
        });
    }
    let count = u32::try_from(raw.count).map_err(|_| {
        Error::InvalidInput(format!("observation {} count {} is out of range", id, raw.count))
    })?;

    if raw.is_baseline && count != 0 {
        return Err(Error::BaselineWithCount {
            id: id.to_string(),
            count: raw.count,
        });
    }

    let date = parse_calendar_day(&raw.date).ok_or_else(|| Error::InvalidDate {
        id: id.to_string(),
        value: raw.date.clone(),
    })?;

    Ok(Observation {
        id: ObservationId::new(id),
        date,
        count,
        is_baseline: raw.is_baseline,
    })
}

/// Parse a calendar day from `YYYY-MM-DD` or an RFC 3339 timestamp.
///
/// Timestamps are normalized to their UTC calendar day, matching how the
/// window anchor is computed.
pub fn parse_calendar_day(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|ts| ts.with_timezone(&Utc).date_naive())
}

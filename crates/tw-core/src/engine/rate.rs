//! Per-observation daily rates and coverage intervals.
//!
//! Each observation records only the insects caught since the previous
//! check. Dividing that delta by the elapsed days gives a rate, and the
//! rate is attributed to every day since the previous check: the
//! observation's coverage interval.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tw_common::{Observation, ObservationId};

/// Inclusive calendar-day interval an observation's rate is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Coverage {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Coverage {
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// Number of days covered.
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// An observation with its derived rate. Recomputed on every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RatedObservation {
    pub id: ObservationId,
    pub date: NaiveDate,
    pub count: u32,
    pub is_baseline: bool,
    /// Whole days since the preceding observation; None for the first.
    pub days_since_previous: Option<i64>,
    /// Insects per day; None for baselines and a leading observation.
    pub rate: Option<f64>,
    /// None exactly when `rate` is None.
    pub coverage: Option<Coverage>,
}

impl RatedObservation {
    pub fn coverage_start(&self) -> Option<NaiveDate> {
        self.coverage.map(|c| c.start)
    }

    pub fn coverage_end(&self) -> Option<NaiveDate> {
        self.coverage.map(|c| c.end)
    }
}

/// Compute rates for a trap's observations.
///
/// Input may be in any order; output is ascending by date. A leading
/// observation that is not a baseline has no start reference and gets no
/// rate. Two observations on one day violate the input contract; the last
/// one after a stable sort is kept and the earlier ones are dropped.
pub fn compute_rates(observations: &[Observation]) -> Vec<RatedObservation> {
    let mut sorted: Vec<&Observation> = observations.iter().collect();
    sorted.sort_by_key(|obs| obs.date);

    let mut deduped: Vec<&Observation> = Vec::with_capacity(sorted.len());
    for obs in sorted {
        match deduped.last_mut() {
            Some(last) if last.date == obs.date => {
                tracing::warn!(
                    date = %obs.date,
                    dropped = %last.id,
                    kept = %obs.id,
                    "duplicate observation day; keeping the later entry"
                );
                *last = obs;
            }
            _ => deduped.push(obs),
        }
    }

    let mut rated = Vec::with_capacity(deduped.len());
    let mut previous: Option<NaiveDate> = None;
    for obs in deduped {
        rated.push(rate_observation(obs, previous));
        previous = Some(obs.date);
    }

    tracing::trace!(observations = rated.len(), "rated observation sequence");
    rated
}

fn rate_observation(obs: &Observation, previous: Option<NaiveDate>) -> RatedObservation {
    let days_since_previous = previous.map(|prev| (obs.date - prev).num_days());

    let rate = match days_since_previous {
        Some(days) if !obs.is_baseline && days > 0 => Some(f64::from(obs.count) / days as f64),
        _ => None,
    };

    let coverage = rate.and(previous).and_then(|prev| {
        prev.succ_opt().map(|start| Coverage {
            start,
            end: obs.date,
        })
    });

    RatedObservation {
        id: obs.id.clone(),
        date: obs.date,
        count: obs.count,
        is_baseline: obs.is_baseline,
        days_since_previous,
        rate: coverage.and(rate),
        coverage,
    }
}

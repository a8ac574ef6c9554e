//! Trap and farm assessment.
//!
//! Runs the whole pipeline for validated batches: rate the observations,
//! average the window ending today, classify by rate, classify the latest
//! check against its pest threshold, and decide on notification.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tw_common::{ObservationBatch, ObservationId, PestType, TrapId};
use tw_config::MonitorConfig;

use crate::alerting::{decide_notification, NotificationDecision};
use crate::engine::{
    compute_rates, expand_last_n_days, expand_to_daily_rates, summarize_window, DailyRatePoint,
    RatedObservation, WindowAverage,
};
use crate::risk::{classify_by_rate, classify_by_threshold, RiskAssessment, RiskLevel};

/// Caller-controlled knobs for one assessment run.
#[derive(Debug, Clone, Default)]
pub struct AssessOptions {
    /// Overrides `MonitorConfig::window_days`.
    pub window_days: Option<u32>,
    pub include_series: bool,
    /// Limit the series to observations from the last N days.
    pub series_last_days: Option<u32>,
    /// Last known level per trap, for the notification decision.
    pub previous_levels: BTreeMap<TrapId, RiskLevel>,
    /// Used for traps absent from `previous_levels`.
    pub default_previous_level: Option<RiskLevel>,
}

impl AssessOptions {
    fn previous_level(&self, trap_id: &TrapId) -> Option<RiskLevel> {
        self.previous_levels
            .get(trap_id)
            .copied()
            .or(self.default_previous_level)
    }
}

/// Legacy count check of the most recent non-baseline observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LatestCountAssessment {
    pub observation_id: ObservationId,
    pub date: NaiveDate,
    pub assessment: RiskAssessment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TrapAssessment {
    pub trap_id: TrapId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pest_type: Option<PestType>,
    pub today: NaiveDate,
    pub observation_count: usize,
    pub window: WindowAverage,
    /// Primary classification.
    pub rate_risk: RiskAssessment,
    /// None when the latest observation is a baseline or there is none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_count: Option<LatestCountAssessment>,
    pub notification: NotificationDecision,
    pub observations: Vec<RatedObservation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<Vec<DailyRatePoint>>,
}

impl TrapAssessment {
    pub fn level(&self) -> RiskLevel {
        self.rate_risk.level
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FarmAssessment {
    pub schema_version: String,
    pub today: NaiveDate,
    pub window_days: u32,
    /// Highest rate-based level across traps; safe when there are none.
    pub worst_level: RiskLevel,
    pub notify_count: usize,
    pub traps: Vec<TrapAssessment>,
}

/// Assess one trap as of `today`.
pub fn assess_trap(
    batch: &ObservationBatch,
    config: &MonitorConfig,
    options: &AssessOptions,
    today: NaiveDate,
) -> TrapAssessment {
    let window_days = options.window_days.unwrap_or(config.window_days);
    let rated = compute_rates(&batch.observations);
    let window = summarize_window(&rated, window_days, today);
    let rate_risk = classify_by_rate(window.average_rate);

    let threshold = config
        .pest_thresholds
        .threshold_for(batch.pest_type.as_ref());
    let latest_count = rated
        .last()
        .filter(|latest| !latest.is_baseline)
        .map(|latest| LatestCountAssessment {
            observation_id: latest.id.clone(),
            date: latest.date,
            assessment: classify_by_threshold(latest.count, threshold),
        });

    let notification = decide_notification(
        options.previous_level(&batch.trap_id),
        rate_risk.level,
        &config.notifications,
    );

    let series = options.include_series.then(|| match options.series_last_days {
        Some(n) => expand_last_n_days(&rated, n, today),
        None => expand_to_daily_rates(&rated),
    });

    tracing::debug!(
        trap_id = %batch.trap_id,
        observations = rated.len(),
        average_rate = window.average_rate,
        level = %rate_risk.level,
        notify = notification.notify,
        "trap assessed"
    );

    TrapAssessment {
        trap_id: batch.trap_id.clone(),
        pest_type: batch.pest_type.clone(),
        today,
        observation_count: rated.len(),
        window,
        rate_risk,
        latest_count,
        notification,
        observations: rated,
        series,
    }
}

/// Assess every trap and roll up the worst level.
pub fn assess_farm(
    batches: &[ObservationBatch],
    config: &MonitorConfig,
    options: &AssessOptions,
    today: NaiveDate,
) -> FarmAssessment {
    let traps: Vec<TrapAssessment> = batches
        .iter()
        .map(|batch| assess_trap(batch, config, options, today))
        .collect();

    let worst_level = traps
        .iter()
        .map(TrapAssessment::level)
        .max()
        .unwrap_or(RiskLevel::Safe);
    let notify_count = traps.iter().filter(|t| t.notification.notify).count();

    FarmAssessment {
        schema_version: tw_common::SCHEMA_VERSION.to_string(),
        today,
        window_days: options.window_days.unwrap_or(config.window_days),
        worst_level,
        notify_count,
        traps,
    }
}

//! Gap-free daily rate series for charting.

use chrono::{NaiveDate, NaiveTime};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::coverage::CoverageIndex;
use super::rate::RatedObservation;
use super::window::window_bounds;

/// One calendar day of the expanded series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DailyRatePoint {
    pub date: NaiveDate,
    /// UTC midnight of `date`, epoch milliseconds.
    pub timestamp: i64,
    /// Rate of the covering observation, 0 when uncovered.
    pub rate: f64,
    /// Only present on observation days.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    pub days_since_previous: Option<i64>,
    pub is_observation_day: bool,
}

/// Epoch milliseconds of UTC midnight on `date`.
pub fn day_timestamp_millis(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
}

/// Expand a rated sequence into one point per day from the first to the
/// last observation date, inclusive.
///
/// Never extrapolates past either end. `days_since_previous` comes from
/// the covering observation; on an uncovered observation day (a baseline,
/// or a leading check) it falls back to that observation's own value.
pub fn expand_to_daily_rates(rated: &[RatedObservation]) -> Vec<DailyRatePoint> {
    let (Some(start), Some(end)) = (
        rated.iter().map(|r| r.date).min(),
        rated.iter().map(|r| r.date).max(),
    ) else {
        return Vec::new();
    };

    let index = CoverageIndex::new(rated);
    let by_day: HashMap<NaiveDate, &RatedObservation> =
        rated.iter().map(|r| (r.date, r)).collect();

    let mut points = Vec::with_capacity(((end - start).num_days() + 1) as usize);
    for date in start.iter_days().take_while(|d| *d <= end) {
        let covering = index.covering(date);
        let own = by_day.get(&date).copied();

        points.push(DailyRatePoint {
            date,
            timestamp: day_timestamp_millis(date),
            rate: covering.and_then(|r| r.rate).unwrap_or(0.0),
            count: own.map(|r| r.count),
            days_since_previous: covering
                .and_then(|r| r.days_since_previous)
                .or_else(|| own.and_then(|r| r.days_since_previous)),
            is_observation_day: own.is_some(),
        });
    }

    tracing::debug!(
        %start,
        %end,
        points = points.len(),
        "expanded daily rate series"
    );
    points
}

/// Restrict a rated sequence to observations dated within the `n` days
/// ending at `today`. Plain date filtering; coverage is left untouched.
pub fn filter_to_last_n_days(
    rated: &[RatedObservation],
    n: u32,
    today: NaiveDate,
) -> Vec<RatedObservation> {
    let Some((start, end)) = window_bounds(today, n) else {
        return Vec::new();
    };
    rated
        .iter()
        .filter(|r| r.date >= start && r.date <= end)
        .cloned()
        .collect()
}

/// Convenience: expand only the last `n` days of observations.
pub fn expand_last_n_days(
    rated: &[RatedObservation],
    n: u32,
    today: NaiveDate,
) -> Vec<DailyRatePoint> {
    expand_to_daily_rates(&filter_to_last_n_days(rated, n, today))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::compute_rates;
    use tw_common::Observation;

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, 1).unwrap() + chrono::Duration::days(offset)
    }

    #[test]
    fn expansion_covers_full_span() {
        let rated = compute_rates(&[
            Observation::baseline("b", day(0)),
            Observation::new("x", day(3), 6),
            Observation::new("y", day(5), 1),
        ]);
        let points = expand_to_daily_rates(&rated);
        assert_eq!(points.len(), 6);

        let rates: Vec<f64> = points.iter().map(|p| p.rate).collect();
        assert_eq!(rates, vec![0.0, 2.0, 2.0, 2.0, 0.5, 0.5]);

        let observed: Vec<bool> = points.iter().map(|p| p.is_observation_day).collect();
        assert_eq!(observed, vec![true, false, false, true, false, true]);

        assert_eq!(points[0].count, Some(0));
        assert_eq!(points[1].count, None);
        assert_eq!(points[3].count, Some(6));
        assert_eq!(points[1].days_since_previous, Some(3));
        assert_eq!(points[4].days_since_previous, Some(2));
        assert_eq!(points[0].days_since_previous, None);
    }

    #[test]
    fn baseline_day_falls_back_to_own_gap() {
        let rated = compute_rates(&[
            Observation::baseline("b", day(0)),
            Observation::new("x", day(2), 2),
            Observation::baseline("reset", day(6)),
        ]);
        let points = expand_to_daily_rates(&rated);
        assert_eq!(points.len(), 7);
        // Days 3..=6 are uncovered: the reset carries no rate.
        assert!(points[3..].iter().all(|p| p.rate == 0.0));
        assert_eq!(points[6].days_since_previous, Some(4));
        assert!(points[6].is_observation_day);
        assert_eq!(points[5].days_since_previous, None);
    }

    #[test]
    fn timestamps_are_utc_midnight() {
        let rated = compute_rates(&[Observation::baseline("b", day(0))]);
        let points = expand_to_daily_rates(&rated);
        assert_eq!(points.len(), 1);
        // 2026-04-01T00:00:00Z
        assert_eq!(points[0].timestamp, 1_775_001_600_000);
        assert_eq!(points[0].timestamp % 86_400_000, 0);
    }

    #[test]
    fn empty_series() {
        assert!(expand_to_daily_rates(&[]).is_empty());
    }

    #[test]
    fn filter_keeps_window_days_only() {
        let rated = compute_rates(&[
            Observation::baseline("b", day(0)),
            Observation::new("x", day(5), 5),
            Observation::new("y", day(9), 4),
            Observation::new("z", day(12), 3),
        ]);
        let today = day(10);
        let kept = filter_to_last_n_days(&rated, 6, today);
        let ids: Vec<&str> = kept.iter().map(|r| r.id.as_str()).collect();
        // Window is day 5..=10; "z" is after today.
        assert_eq!(ids, vec!["x", "y"]);
        assert!(filter_to_last_n_days(&rated, 0, today).is_empty());

        let points = expand_last_n_days(&rated, 6, today);
        assert_eq!(points.first().map(|p| p.date), Some(day(5)));
        assert_eq!(points.last().map(|p| p.date), Some(day(9)));
    }
}

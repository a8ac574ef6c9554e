//! Windowed average rate anchored at the current date.
//!
//! The window is the `n` calendar days ending today, not ending at the
//! latest observation. Days no observation covers count as zero, so a
//! trap that has gone unchecked decays toward safe.

use chrono::{Days, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::coverage::CoverageIndex;
use super::rate::RatedObservation;

/// Inclusive bounds of the `n`-day window ending at `today`.
///
/// None for `n == 0`.
pub fn window_bounds(today: NaiveDate, n: u32) -> Option<(NaiveDate, NaiveDate)> {
    let n = n.checked_sub(1)?;
    let start = today.checked_sub_days(Days::new(u64::from(n)))?;
    Some((start, today))
}

/// Result of averaging one window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WindowAverage {
    pub days: u32,
    /// None when the window is empty (`days == 0`).
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// Days in the window some observation covers.
    pub covered_days: u32,
    pub average_rate: f64,
}

impl WindowAverage {
    fn empty(days: u32, bounds: Option<(NaiveDate, NaiveDate)>) -> Self {
        WindowAverage {
            days,
            start: bounds.map(|(s, _)| s),
            end: bounds.map(|(_, e)| e),
            covered_days: 0,
            average_rate: 0.0,
        }
    }
}

/// Average each window day's covered rate over the last `n` days.
pub fn summarize_window(rated: &[RatedObservation], n: u32, today: NaiveDate) -> WindowAverage {
    let bounds = window_bounds(today, n);
    let Some((start, end)) = bounds else {
        return WindowAverage::empty(n, None);
    };

    let index = CoverageIndex::new(rated);
    if index.is_empty() {
        return WindowAverage::empty(n, bounds);
    }

    let mut total = 0.0;
    let mut covered_days = 0;
    for day in start.iter_days().take_while(|d| *d <= end) {
        if let Some(rate) = index.covering(day).and_then(|r| r.rate) {
            total += rate;
            covered_days += 1;
        }
    }

    let average_rate = total / f64::from(n);
    tracing::debug!(
        window_days = n,
        %start,
        %end,
        covered_days,
        average_rate,
        "window averaged"
    );

    WindowAverage {
        days: n,
        start: Some(start),
        end: Some(end),
        covered_days,
        average_rate,
    }
}

/// Mean covered rate over the `n` days ending at `today`.
///
/// Returns 0 for empty input, `n == 0`, or no coverage in the window.
pub fn average_rate_for_last_n_days(rated: &[RatedObservation], n: u32, today: NaiveDate) -> f64 {
    summarize_window(rated, n, today).average_rate
}

//! Observation rate engine.
//!
//! Pure functions over an in-memory observation sequence:
//! - `rate`: per-observation daily rate and coverage interval
//! - `coverage`: day → covering observation lookup
//! - `window`: average rate over the last N days ending today
//! - `series`: gap-free daily series and date filtering
//!
//! Functions that depend on "today" take it as a parameter. `RateEngine`
//! wraps them with an injected clock, read once per call.

pub mod coverage;
pub mod rate;
pub mod series;
pub mod window;

pub use coverage::CoverageIndex;
pub use rate::{compute_rates, Coverage, RatedObservation};
pub use series::{
    day_timestamp_millis, expand_last_n_days, expand_to_daily_rates, filter_to_last_n_days,
    DailyRatePoint,
};
pub use window::{average_rate_for_last_n_days, summarize_window, window_bounds, WindowAverage};

use chrono::NaiveDate;
use tw_common::Observation;

use crate::clock::{Clock, SystemClock};

/// Stateless engine holding only a clock.
///
/// Safe to share across threads; every method is a function of its
/// arguments and a single read of the clock.
#[derive(Debug, Clone, Default)]
pub struct RateEngine<C: Clock = SystemClock> {
    clock: C,
}

impl<C: Clock> RateEngine<C> {
    pub fn new(clock: C) -> Self {
        RateEngine { clock }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn compute_rates(&self, observations: &[Observation]) -> Vec<RatedObservation> {
        compute_rates(observations)
    }

    pub fn average_rate_for_last_n_days(&self, rated: &[RatedObservation], n: u32) -> f64 {
        average_rate_for_last_n_days(rated, n, self.clock.today())
    }

    pub fn summarize_window(&self, rated: &[RatedObservation], n: u32) -> WindowAverage {
        summarize_window(rated, n, self.clock.today())
    }

    pub fn expand_to_daily_rates(&self, rated: &[RatedObservation]) -> Vec<DailyRatePoint> {
        expand_to_daily_rates(rated)
    }

    pub fn filter_to_last_n_days(&self, rated: &[RatedObservation], n: u32) -> Vec<RatedObservation> {
        filter_to_last_n_days(rated, n, self.clock.today())
    }
}

//! Trapwatch Core Library
//!
//! This library provides the observation rate and risk engine:
//! - Per-observation daily rates and coverage intervals
//! - Windowed average rates anchored at the current date
//! - Gap-free daily rate series for charting
//! - Rate-based and legacy count-based risk classification
//! - Notification decisions and trap/farm assessments
//!
//! The binary entry point is in `main.rs`.

pub mod alerting;
pub mod assess;
pub mod clock;
pub mod engine;
pub mod exit_codes;
pub mod logging;
pub mod output;
pub mod risk;
pub mod schema;

pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::{
    average_rate_for_last_n_days, compute_rates, expand_to_daily_rates, filter_to_last_n_days,
    DailyRatePoint, RateEngine, RatedObservation,
};
pub use risk::{classify_by_rate, classify_by_threshold, RiskAssessment, RiskLevel};

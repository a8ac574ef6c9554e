//! Calendar-day clocks.
//!
//! The windowed average is anchored at "today". The clock is injected so
//! each top-level call reads it exactly once and tests can pin the date.

use chrono::{NaiveDate, Utc};

/// Source of the current calendar day.
pub trait Clock: Send + Sync {
    /// Current calendar day, normalized to UTC midnight.
    fn today(&self) -> NaiveDate;
}

/// Wall-clock time in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// A clock pinned to one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}

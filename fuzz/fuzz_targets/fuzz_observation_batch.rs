//! Fuzz target for observation input parsing.
//!
//! Arbitrary bytes go through boundary validation; anything accepted is
//! run through the engine, which must never panic on validated input.

#![no_main]

use chrono::NaiveDate;
use libfuzzer_sys::fuzz_target;
use tw_common::ObservationBatch;
use tw_core::engine::{average_rate_for_last_n_days, compute_rates, expand_to_daily_rates};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(batches) = ObservationBatch::parse_json(text) else {
        return;
    };
    let Some(today) = NaiveDate::from_ymd_opt(2026, 7, 1) else {
        return;
    };
    for batch in batches {
        let rated = compute_rates(&batch.observations);
        let avg = average_rate_for_last_n_days(&rated, 7, today);
        assert!(avg.is_finite() && avg >= 0.0);
        // Bound the expansion so huge date spans do not exhaust memory.
        let span = match (rated.first(), rated.last()) {
            (Some(first), Some(last)) => (last.date - first.date).num_days(),
            _ => 0,
        };
        if span <= 20_000 {
            let points = expand_to_daily_rates(&rated);
            assert_eq!(points.len() as i64, if rated.is_empty() { 0 } else { span + 1 });
        }
    }
});

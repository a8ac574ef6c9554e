//! End-to-end engine scenarios over realistic trap histories.
//!
//! No mocks: input goes through boundary validation, then the engine,
//! classifier and assessment exactly as the CLI runs them.

use chrono::NaiveDate;
use tw_common::{Observation, ObservationBatch, TrapId};
use tw_config::MonitorConfig;
use tw_core::alerting::DecisionReason;
use tw_core::assess::{assess_farm, assess_trap, AssessOptions};
use tw_core::engine::{
    average_rate_for_last_n_days, compute_rates, expand_to_daily_rates, filter_to_last_n_days,
    RateEngine,
};
use tw_core::{classify_by_rate, classify_by_threshold, FixedClock, RiskLevel};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 7, 15).unwrap()
}

fn day(offset: i64) -> NaiveDate {
    today() + chrono::Duration::days(offset)
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-3
}

#[test]
fn baseline_then_check_today() {
    let rated = compute_rates(&[
        Observation::baseline("setup", day(-2)),
        Observation::new("check", day(0), 5),
    ]);
    assert_eq!(rated[1].days_since_previous, Some(2));
    assert_eq!(rated[1].rate, Some(2.5));

    let avg = average_rate_for_last_n_days(&rated, 3, today());
    assert!(approx(avg, 1.667), "avg = {avg}");
    assert_eq!(classify_by_rate(avg).level, RiskLevel::Warning);
}

#[test]
fn coverage_ends_before_today() {
    let rated = compute_rates(&[
        Observation::baseline("setup", day(-5)),
        Observation::new("check", day(-2), 9),
    ]);
    let check = &rated[1];
    assert_eq!(check.rate, Some(3.0));
    assert_eq!(check.coverage_start(), Some(day(-4)));
    assert_eq!(check.coverage_end(), Some(day(-2)));

    let avg = average_rate_for_last_n_days(&rated, 3, today());
    assert!(approx(avg, 1.0));
    assert_eq!(classify_by_rate(avg).level, RiskLevel::Warning);
}

#[test]
fn leading_check_without_baseline_has_no_rate() {
    let rated = compute_rates(&[
        Observation::new("first", day(-6), 12),
        Observation::new("second", day(-3), 3),
    ]);
    assert_eq!(rated[0].rate, None);
    assert_eq!(rated[0].days_since_previous, None);
    assert_eq!(rated[1].rate, Some(1.0));
}

#[test]
fn reset_mid_season_restarts_coverage() {
    let rated = compute_rates(&[
        Observation::baseline("setup", day(-10)),
        Observation::new("a", day(-7), 6),
        Observation::baseline("new-lure", day(-5)),
        Observation::new("b", day(-1), 8),
    ]);
    assert_eq!(rated[2].rate, None);
    assert_eq!(rated[3].coverage_start(), Some(day(-4)));

    // Days -6 and -5 are covered by nobody: "a" ends at -7, "b" starts at -4.
    let points = expand_to_daily_rates(&rated);
    let rate_on = |d: NaiveDate| points.iter().find(|p| p.date == d).unwrap().rate;
    assert_eq!(rate_on(day(-6)), 0.0);
    assert_eq!(rate_on(day(-5)), 0.0);
    assert_eq!(rate_on(day(-4)), 2.0);
    assert_eq!(rate_on(day(-8)), 2.0);
}

#[test]
fn unsorted_and_duplicate_days_resolve_deterministically() {
    let rated = compute_rates(&[
        Observation::new("late", day(0), 4),
        Observation::baseline("setup", day(-4)),
        Observation::new("dup-first", day(-2), 100),
        Observation::new("dup-second", day(-2), 2),
    ]);
    let ids: Vec<&str> = rated.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["setup", "dup-second", "late"]);
    assert_eq!(rated[1].rate, Some(1.0));
}

#[test]
fn series_round_trip_reproduces_counts() {
    let obs = vec![
        Observation::baseline("setup", day(-14)),
        Observation::new("w1", day(-7), 14),
        Observation::new("w2", day(-3), 2),
        Observation::new("w3", day(0), 9),
    ];
    let rated = compute_rates(&obs);
    let points = expand_to_daily_rates(&rated);
    assert_eq!(points.len(), 15);
    for o in &obs {
        let point = points.iter().find(|p| p.date == o.date).unwrap();
        assert!(point.is_observation_day);
        assert_eq!(point.count, Some(o.count));
    }
}

#[test]
fn filter_is_plain_date_filtering() {
    let rated = compute_rates(&[
        Observation::baseline("setup", day(-20)),
        Observation::new("old", day(-10), 10),
        Observation::new("recent", day(-1), 3),
    ]);
    let kept = filter_to_last_n_days(&rated, 7, today());
    assert_eq!(kept.len(), 1);
    // Coverage still reflects the full gap.
    assert_eq!(kept[0].coverage_start(), Some(day(-9)));
}

#[test]
fn engine_reads_injected_clock() {
    let engine = RateEngine::new(FixedClock(day(-2)));
    let rated = engine.compute_rates(&[
        Observation::baseline("setup", day(-5)),
        Observation::new("check", day(-2), 9),
    ]);
    // Anchored two days earlier, the whole window is covered at 3/day.
    assert!(approx(engine.average_rate_for_last_n_days(&rated, 3), 3.0));
    assert_eq!(engine.today(), day(-2));
}

#[test]
fn legacy_threshold_classification() {
    let a = classify_by_threshold(8, 10);
    assert_eq!(a.percentage, 80.0);
    assert!(a.should_show_warning);
    assert_eq!(a.level, RiskLevel::Warning);
    assert_eq!(classify_by_threshold(10, 10).level, RiskLevel::Danger);
}

#[test]
fn validated_record_flows_into_assessment() {
    let json = r#"{
        "trapId": "block-7",
        "pestType": "Codling Moth",
        "observations": [
            {"id": "o3", "date": "2026-07-15", "count": 4},
            {"id": "o1", "date": "2026-07-08", "count": 0, "isBaseline": true},
            {"id": "o2", "date": "2026-07-11T16:30:00Z", "count": 3}
        ]
    }"#;
    let batches = ObservationBatch::parse_json(json).unwrap();
    let trap = assess_trap(
        &batches[0],
        &MonitorConfig::default(),
        &AssessOptions::default(),
        today(),
    );
    // o2 covers 07-09..07-11 at 1/day, o3 covers 07-12..07-15 at 1/day.
    assert!(approx(trap.window.average_rate, 1.0));
    assert_eq!(trap.level(), RiskLevel::Warning);
    assert_eq!(trap.pest_type.as_ref().map(|p| p.as_str()), Some("codling_moth"));
    let latest = trap.latest_count.as_ref().unwrap();
    assert_eq!(latest.assessment.threshold, Some(5));
    assert_eq!(latest.assessment.level, RiskLevel::Warning);
}

#[test]
fn farm_notification_tracks_previous_levels() {
    let make = |trap: &str, count: u32| ObservationBatch {
        trap_id: TrapId::new(trap),
        pest_type: None,
        observations: vec![
            Observation::baseline("setup", day(-7)),
            Observation::new("check", day(0), count),
        ],
    };
    let batches = vec![make("north", 21), make("south", 21), make("west", 0)];

    let mut options = AssessOptions::default();
    options.previous_levels.insert(TrapId::new("north"), RiskLevel::Danger);
    options.default_previous_level = Some(RiskLevel::Warning);

    let farm = assess_farm(&batches, &MonitorConfig::default(), &options, today());
    assert_eq!(farm.worst_level, RiskLevel::Danger);

    let reason = |id: &str| {
        farm.traps
            .iter()
            .find(|t| t.trap_id.as_str() == id)
            .map(|t| (t.notification.notify, t.notification.reason))
            .unwrap()
    };
    assert_eq!(reason("north"), (true, DecisionReason::Repeated));
    assert_eq!(reason("south"), (true, DecisionReason::Escalated));
    assert_eq!(reason("west"), (false, DecisionReason::BelowAlertLevel));
    assert_eq!(farm.notify_count, 2);
}

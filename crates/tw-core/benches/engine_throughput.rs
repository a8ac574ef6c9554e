//! Criterion benchmarks for the rate engine.
//!
//! Season-length histories (weekly checks) up to multi-year archives.

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tw_common::Observation;
use tw_core::engine::{average_rate_for_last_n_days, compute_rates, expand_to_daily_rates};

fn history(checks: usize) -> (Vec<Observation>, NaiveDate) {
    let mut date = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
    let mut out = vec![Observation::baseline("obs-0", date)];
    for i in 1..=checks {
        date += chrono::Duration::days(3 + (i % 5) as i64);
        out.push(Observation::new(format!("obs-{i}"), date, (i * 7 % 23) as u32));
    }
    out.reverse();
    (out, date)
}

fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine");

    for checks in [30usize, 365, 2_000] {
        let (obs, last) = history(checks);
        let rated = compute_rates(&obs);

        group.bench_with_input(BenchmarkId::new("compute_rates", checks), &obs, |b, obs| {
            b.iter(|| black_box(compute_rates(black_box(obs))));
        });

        group.bench_with_input(
            BenchmarkId::new("average_7d", checks),
            &rated,
            |b, rated| {
                b.iter(|| black_box(average_rate_for_last_n_days(black_box(rated), 7, last)));
            },
        );

        group.bench_with_input(
            BenchmarkId::new("expand_to_daily_rates", checks),
            &rated,
            |b, rated| {
                b.iter(|| black_box(expand_to_daily_rates(black_box(rated))));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_engine);
criterion_main!(benches);

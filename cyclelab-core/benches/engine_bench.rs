//! Criterion benchmarks for the table hot paths.
//!
//! 1. Merging a recent-window batch into a multi-decade table
//! 2. Calendar resampling of a long trading-day series
//! 3. Bucketing a long return series

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use cyclelab_core::analytics::{CalendarResampler, DistributionBinner, ReturnCalculator, SeriesMerger};
use cyclelab_core::domain::{Observation, Point};

// ── Helpers ──────────────────────────────────────────────────────────

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1990, 1, 2).unwrap()
}

fn make_observations(columns: &[&str], days: usize, start_offset: usize) -> Vec<Observation> {
    let mut out = Vec::with_capacity(columns.len() * days);
    for (c, column) in columns.iter().enumerate() {
        for i in start_offset..start_offset + days {
            let price = 100.0 + (i as f64 * 0.05 + c as f64).sin() * 10.0;
            out.push(Observation::on_date(
                *column,
                base_date() + chrono::Duration::days(i as i64),
                price,
            ));
        }
    }
    out
}

fn make_prices(n: usize) -> Vec<Point> {
    // Weekdays only, so resampling has gaps to fill.
    (0..n)
        .map(|i| base_date() + chrono::Duration::days((i / 5 * 7 + i % 5) as i64))
        .enumerate()
        .map(|(i, date)| Point::some(date, 100.0 + (i as f64 * 0.1).sin() * 10.0))
        .collect()
}

// ── Benchmarks ───────────────────────────────────────────────────────

const COLUMNS: &[&str] = &["S&P 500", "NASDAQ 100", "US 10-Year Treasury Yield", "Nikkei 225", "TOPIX"];

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");
    for days in [2_500usize, 10_000] {
        let table = SeriesMerger::merge(None, &make_observations(COLUMNS, days, 0));
        let recent = make_observations(COLUMNS, 7, days - 3);
        group.bench_with_input(BenchmarkId::new("recent_window", days), &days, |b, _| {
            b.iter(|| SeriesMerger::merge(Some(black_box(&table)), black_box(&recent)))
        });
    }
    group.finish();
}

fn bench_resample(c: &mut Criterion) {
    let prices = make_prices(10_000);
    c.bench_function("to_daily_10k", |b| {
        b.iter(|| CalendarResampler::to_daily(black_box(&prices)))
    });
    c.bench_function("to_month_end_10k", |b| {
        b.iter(|| CalendarResampler::to_month_end(black_box(&prices)))
    });
}

fn bench_bucket(c: &mut Criterion) {
    let returns: Vec<f64> = ReturnCalculator::daily_return(&make_prices(10_000))
        .iter()
        .filter_map(Point::valid)
        .collect();
    let binner = DistributionBinner::default();
    c.bench_function("bucket_10k", |b| b.iter(|| binner.bucket(black_box(&returns))));
}

criterion_group!(benches, bench_merge, bench_resample, bench_bucket);
criterion_main!(benches);

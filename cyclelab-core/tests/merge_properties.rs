//! Property tests for merge and bucketing invariants.
//!
//! 1. Idempotent merge: merging the same batch twice equals merging it once
//! 2. Column preservation: a batch without column C leaves C untouched
//! 3. One row per date, ascending, after any merge
//! 4. Bucket exhaustiveness: every finite return lands in exactly one bucket

use chrono::NaiveDate;
use cyclelab_core::analytics::distribution::{BucketScheme, DistributionBinner};
use cyclelab_core::analytics::SeriesMerger;
use cyclelab_core::domain::Observation;
use proptest::prelude::*;

// ── Strategies ───────────────────────────────────────────────────────

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn arb_observation(columns: &'static [&'static str]) -> impl Strategy<Value = Observation> {
    (0..columns.len(), 0i64..40, 1.0..5000.0_f64).prop_map(move |(c, offset, price)| {
        Observation::on_date(
            columns[c],
            base_date() + chrono::Duration::days(offset),
            (price * 100.0).round() / 100.0,
        )
    })
}

fn arb_batch(columns: &'static [&'static str]) -> impl Strategy<Value = Vec<Observation>> {
    prop::collection::vec(arb_observation(columns), 0..60)
}

const ALL: &[&str] = &["S&P 500", "NASDAQ 100", "Nikkei 225"];
const US_ONLY: &[&str] = &["S&P 500", "NASDAQ 100"];

fn arb_return() -> impl Strategy<Value = f64> {
    prop_oneof![
        -10.0..10.0_f64,
        Just(-3.0),
        Just(-0.5),
        Just(0.0),
        Just(0.5),
        Just(3.0),
    ]
}

// ── Merge ────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn merge_is_idempotent(existing in arb_batch(ALL), incoming in arb_batch(ALL)) {
        let table = SeriesMerger::merge(None, &existing);
        let once = SeriesMerger::merge(Some(&table), &incoming);
        let twice = SeriesMerger::merge(Some(&once), &incoming);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn absent_column_is_preserved(existing in arb_batch(ALL), incoming in arb_batch(US_ONLY)) {
        let table = SeriesMerger::merge(None, &existing);
        let merged = SeriesMerger::merge(Some(&table), &incoming);

        for column in table.columns() {
            prop_assert!(merged.has_column(column));
        }
        for row in table.rows() {
            prop_assert_eq!(
                merged.value(row.date, "Nikkei 225"),
                row.get("Nikkei 225")
            );
        }
    }

    #[test]
    fn one_row_per_date(existing in arb_batch(ALL), incoming in arb_batch(ALL)) {
        let table = SeriesMerger::merge(None, &existing);
        let merged = SeriesMerger::merge(Some(&table), &incoming);
        let dates = merged.dates();
        prop_assert!(dates.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn last_incoming_value_wins(existing in arb_batch(ALL), incoming in arb_batch(ALL)) {
        let table = SeriesMerger::merge(None, &existing);
        let merged = SeriesMerger::merge(Some(&table), &incoming);
        let mut expected = std::collections::HashMap::new();
        for obs in &incoming {
            expected.insert((obs.trading_day(), obs.column.clone()), obs.price);
        }
        for ((date, column), price) in expected {
            prop_assert_eq!(merged.value(date, &column), Some(price));
        }
    }
}

// ── Buckets ──────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn every_return_lands_in_exactly_one_bucket(
        returns in prop::collection::vec(arb_return(), 0..200)
    ) {
        let scheme = BucketScheme::standard();
        for r in &returns {
            let hits = scheme.buckets().iter().filter(|b| b.contains(*r)).count();
            prop_assert_eq!(hits, 1, "return {} matched {} buckets", r, hits);
            let idx = scheme.index_of(*r).unwrap();
            prop_assert!(scheme.buckets()[idx].contains(*r));
        }

        let histogram = DistributionBinner::new(scheme).bucket(&returns);
        let counted: usize = histogram.buckets.iter().map(|b| b.count).sum();
        prop_assert_eq!(counted, returns.len());
        prop_assert_eq!(histogram.total, returns.len());
        prop_assert_eq!(histogram.excluded, 0);
    }
}

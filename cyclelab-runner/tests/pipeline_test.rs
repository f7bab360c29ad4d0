//! Update, rebuild and backfill runs against an in-memory provider and a
//! table in a temp directory.

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use cyclelab_core::data::{DataError, DataProvider, FetchWindow, PricePoint, StoreError, TableStore};
use cyclelab_core::domain::{ConsolidatedTable, TableRow, TrackedSeries};
use cyclelab_runner::{run_backfill, run_rebuild, run_update, LabConfig, PipelineError, RunKind};
use std::collections::HashMap;
use std::sync::Mutex;
use tempfile::TempDir;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// US market close on `date`, as a New York timestamp (UTC-5).
fn close_at(date: NaiveDate) -> DateTime<FixedOffset> {
    FixedOffset::west_opt(5 * 3600)
        .unwrap()
        .from_local_datetime(&date.and_hms_opt(16, 0, 0).unwrap())
        .unwrap()
}

/// Canned prices per ticker; unknown tickers are not found.
struct Scripted {
    prices: HashMap<String, Vec<PricePoint>>,
    windows: Mutex<Vec<(String, FetchWindow)>>,
}

impl Scripted {
    fn new() -> Self {
        Self {
            prices: HashMap::new(),
            windows: Mutex::new(Vec::new()),
        }
    }

    fn with(mut self, ticker: &str, closes: &[(NaiveDate, f64)]) -> Self {
        let points = closes
            .iter()
            .map(|(date, close)| PricePoint::new(close_at(*date), *close))
            .collect();
        self.prices.insert(ticker.to_string(), points);
        self
    }

    fn requested(&self) -> Vec<(String, FetchWindow)> {
        self.windows.lock().unwrap().clone()
    }
}

impl DataProvider for Scripted {
    fn name(&self) -> &str {
        "scripted"
    }

    fn fetch(&self, ticker: &str, window: FetchWindow) -> Result<Vec<PricePoint>, DataError> {
        self.windows
            .lock()
            .unwrap()
            .push((ticker.to_string(), window));
        self.prices
            .get(ticker)
            .cloned()
            .ok_or_else(|| DataError::SymbolNotFound {
                symbol: ticker.to_string(),
            })
    }

    fn is_available(&self) -> bool {
        true
    }
}

fn config() -> LabConfig {
    let mut config = LabConfig::default();
    config.series = vec![
        TrackedSeries::new("S&P 500", "^GSPC"),
        TrackedSeries::new("Nikkei 225", "^N225"),
    ];
    config
}

fn seeded_table() -> ConsolidatedTable {
    ConsolidatedTable::from_rows(
        vec!["S&P 500".into(), "Nikkei 225".into()],
        vec![
            TableRow::new(d(2024, 1, 2)).with("S&P 500", 100.0).with("Nikkei 225", 33000.0),
            TableRow::new(d(2024, 1, 3)).with("S&P 500", 101.0).with("Nikkei 225", 33100.0),
        ],
    )
}

fn store_in(dir: &TempDir) -> TableStore {
    TableStore::new(dir.path().join("market_data.csv"))
}

#[test]
fn update_requires_an_existing_table() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let provider = Scripted::new().with("^GSPC", &[(d(2024, 1, 4), 102.0)]);

    let err = run_update(&config(), &provider, &store).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Store(StoreError::MissingSource { .. })
    ));
    assert!(!store.exists());
    assert!(provider.requested().is_empty(), "nothing fetched before the load");
}

#[test]
fn update_merges_recent_window_and_keeps_other_columns() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.save(&seeded_table()).unwrap();

    // Only the S&P answers; the Nikkei ticker is unknown to the provider.
    let provider = Scripted::new().with(
        "^GSPC",
        &[(d(2024, 1, 3), 101.5), (d(2024, 1, 4), 102.0)],
    );

    let outcome = run_update(&config(), &provider, &store).unwrap();
    assert_eq!(outcome.kind, RunKind::Update);
    assert_eq!(outcome.fetched, vec!["S&P 500".to_string()]);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].column, "Nikkei 225");
    assert!(outcome.written());

    let stats = outcome.stats.unwrap();
    assert_eq!(stats.rows_before, 2);
    assert_eq!(stats.rows_after, 3);
    assert_eq!(stats.dates_added, 1);

    for (_, window) in provider.requested() {
        assert_eq!(window, FetchWindow::Recent { days: 7 });
    }

    let table = store.load().unwrap();
    assert_eq!(table.len(), 3);
    assert_eq!(table.value(d(2024, 1, 3), "S&P 500"), Some(101.5));
    assert_eq!(table.value(d(2024, 1, 4), "S&P 500"), Some(102.0));
    // Untouched column survives, and the new date has no Nikkei value.
    assert_eq!(table.value(d(2024, 1, 2), "Nikkei 225"), Some(33000.0));
    assert_eq!(table.value(d(2024, 1, 3), "Nikkei 225"), Some(33100.0));
    assert_eq!(table.value(d(2024, 1, 4), "Nikkei 225"), None);
    assert!(store.verify().unwrap());
}

#[test]
fn update_with_no_data_leaves_table_untouched() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.save(&seeded_table()).unwrap();
    let before = std::fs::read(store.path()).unwrap();

    let provider = Scripted::new();
    let outcome = run_update(&config(), &provider, &store).unwrap();
    assert!(!outcome.written());
    assert!(outcome.stats.is_none());
    assert_eq!(outcome.failures.len(), 2);

    assert_eq!(std::fs::read(store.path()).unwrap(), before);
}

#[test]
fn rebuild_writes_a_fresh_table_from_full_history() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let provider = Scripted::new()
        .with("^GSPC", &[(d(2023, 12, 29), 99.0), (d(2024, 1, 2), 100.0)])
        .with("^N225", &[(d(2024, 1, 4), 33300.0)]);

    let outcome = run_rebuild(&config(), &provider, &store).unwrap();
    assert_eq!(outcome.kind, RunKind::Rebuild);
    assert!(outcome.failures.is_empty());
    assert_eq!(outcome.saved.as_ref().unwrap().rows, 3);
    assert!(provider
        .requested()
        .iter()
        .all(|(_, w)| *w == FetchWindow::Max));

    let table = store.load().unwrap();
    assert_eq!(table.first_date(), Some(d(2023, 12, 29)));
    assert_eq!(table.last_date(), Some(d(2024, 1, 4)));
    assert_eq!(table.value(d(2024, 1, 4), "Nikkei 225"), Some(33300.0));
    assert_eq!(table.value(d(2024, 1, 4), "S&P 500"), None);
}

#[test]
fn backfill_with_replace_drops_only_refetched_columns() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.save(&seeded_table()).unwrap();

    let provider = Scripted::new().with("^N225", &[(d(2024, 1, 3), 33500.0)]);
    let columns = vec!["Nikkei 225".to_string()];

    let outcome = run_backfill(&config(), &provider, &store, &columns, true).unwrap();
    assert_eq!(outcome.kind, RunKind::Backfill);
    assert_eq!(provider.requested().len(), 1, "only the named column is fetched");

    let table = store.load().unwrap();
    // Old Nikkei history is gone; only the refetched value remains.
    assert_eq!(table.value(d(2024, 1, 2), "Nikkei 225"), None);
    assert_eq!(table.value(d(2024, 1, 3), "Nikkei 225"), Some(33500.0));
    // The S&P column is untouched.
    assert_eq!(table.value(d(2024, 1, 2), "S&P 500"), Some(100.0));
    assert_eq!(table.value(d(2024, 1, 3), "S&P 500"), Some(101.0));
}

#[test]
fn backfill_failure_keeps_existing_column() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.save(&seeded_table()).unwrap();

    let provider = Scripted::new();
    let columns = vec!["Nikkei 225".to_string()];
    let outcome = run_backfill(&config(), &provider, &store, &columns, true).unwrap();
    assert!(!outcome.written());

    let table = store.load().unwrap();
    assert_eq!(table.value(d(2024, 1, 2), "Nikkei 225"), Some(33000.0));
}

#[test]
fn backfill_starts_a_missing_table() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let provider = Scripted::new().with("^GSPC", &[(d(2024, 1, 2), 100.0)]);

    let outcome = run_backfill(&config(), &provider, &store, &["S&P 500".to_string()], false)
        .unwrap();
    assert!(outcome.written());
    assert_eq!(store.load().unwrap().len(), 1);
}

#[test]
fn backfill_of_unknown_column_is_a_config_error() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let provider = Scripted::new();

    let err = run_backfill(&config(), &provider, &store, &["DAX".to_string()], false).unwrap_err();
    assert!(matches!(err, PipelineError::Config(_)));
}

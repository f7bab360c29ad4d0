//! Update, rebuild and backfill runs: load, fetch, merge, save.
//!
//! Merging happens entirely in memory; the store is only touched again by the
//! final atomic save, so a run that fails part-way leaves the table as it was.

use crate::config::{ConfigError, LabConfig};
use cyclelab_core::analytics::{MergeStats, SeriesMerger};
use cyclelab_core::data::{
    fetch_series, DataProvider, FetchSummary, FetchWindow, StoreError, TableMeta, TableStore,
};
use cyclelab_core::domain::{ConsolidatedTable, TrackedSeries};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunKind {
    Update,
    Rebuild,
    Backfill,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolFailure {
    pub column: String,
    pub error: String,
}

/// What a pipeline run did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunOutcome {
    pub kind: RunKind,
    pub fetched: Vec<String>,
    pub empty: Vec<String>,
    pub failures: Vec<SymbolFailure>,
    pub stats: Option<MergeStats>,
    /// Sidecar of the saved table; `None` when nothing was written.
    pub saved: Option<TableMeta>,
}

impl RunOutcome {
    fn from_fetch(kind: RunKind, summary: &FetchSummary) -> Self {
        Self {
            kind,
            fetched: summary.succeeded.clone(),
            empty: summary.empty.clone(),
            failures: summary
                .failures
                .iter()
                .map(|(column, e)| SymbolFailure {
                    column: column.clone(),
                    error: e.to_string(),
                })
                .collect(),
            stats: None,
            saved: None,
        }
    }

    pub fn written(&self) -> bool {
        self.saved.is_some()
    }
}

/// Merge the recent window of every configured series into the stored table.
///
/// The table must already exist: a missing table is an error and nothing is
/// written, so an update can never silently start a fresh table.
pub fn run_update(
    config: &LabConfig,
    provider: &dyn DataProvider,
    store: &TableStore,
) -> Result<RunOutcome, PipelineError> {
    let existing = store.load()?;
    tracing::info!(rows = existing.len(), last = ?existing.last_date(), "starting update");

    let window = FetchWindow::Recent {
        days: config.data.recent_days,
    };
    let summary = fetch_series(provider, &config.series, window);
    merge_and_save(RunKind::Update, Some(&existing), summary, store)
}

/// Fetch full history for every configured series and write a fresh table.
pub fn run_rebuild(
    config: &LabConfig,
    provider: &dyn DataProvider,
    store: &TableStore,
) -> Result<RunOutcome, PipelineError> {
    tracing::info!(series = config.series.len(), "starting rebuild");
    let summary = fetch_series(provider, &config.series, FetchWindow::Max);
    merge_and_save(RunKind::Rebuild, None, summary, store)
}

/// Fetch full history for `columns` and merge it into the stored table.
///
/// With `replace`, those columns are dropped from the existing table first so
/// the fetched history replaces them outright. A missing table starts empty.
pub fn run_backfill(
    config: &LabConfig,
    provider: &dyn DataProvider,
    store: &TableStore,
    columns: &[String],
    replace: bool,
) -> Result<RunOutcome, PipelineError> {
    let series: Vec<TrackedSeries> = config.series_for(columns)?;
    let existing = store.load_optional()?;
    tracing::info!(?columns, replace, existing = existing.is_some(), "starting backfill");

    let summary = fetch_series(provider, &series, FetchWindow::Max);

    // Only drop columns that were actually refetched.
    let base = match existing {
        Some(table) if replace && !summary.succeeded.is_empty() => {
            let drop: Vec<&str> = summary.succeeded.iter().map(String::as_str).collect();
            Some(table.without_columns(&drop))
        }
        other => other,
    };
    merge_and_save(RunKind::Backfill, base.as_ref(), summary, store)
}

fn merge_and_save(
    kind: RunKind,
    existing: Option<&ConsolidatedTable>,
    summary: FetchSummary,
    store: &TableStore,
) -> Result<RunOutcome, PipelineError> {
    let mut outcome = RunOutcome::from_fetch(kind, &summary);

    if summary.observations.is_empty() {
        tracing::warn!(?kind, "no series produced data, table left unchanged");
        return Ok(outcome);
    }

    let (merged, stats) = SeriesMerger::merge_with_stats(existing, &summary.observations);
    tracing::info!(
        ?kind,
        rows_before = stats.rows_before,
        rows_after = stats.rows_after,
        dates_added = stats.dates_added,
        cells_written = stats.cells_written,
        "merge complete"
    );

    outcome.saved = Some(store.save(&merged)?);
    outcome.stats = Some(stats);
    Ok(outcome)
}

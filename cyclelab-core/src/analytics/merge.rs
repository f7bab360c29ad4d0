//! Merging fetched observations into the consolidated table.
//!
//! The merge is a pure transform over full in-memory snapshots:
//! existing rows and incoming rows are stacked in merge order, then reduced by
//! [`collapse_by_date`] so that each date keeps, per column, the last
//! non-missing value seen. Columns that a batch does not mention are never
//! touched.

use crate::domain::{ConsolidatedTable, Observation, TableRow};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Counters describing what a merge changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeStats {
    pub observations: usize,
    pub rows_before: usize,
    pub rows_after: usize,
    /// Dates that did not exist in the existing table.
    pub dates_added: usize,
    /// Cells that are new or whose value changed.
    pub cells_written: usize,
}

/// Merges batches of observations into a [`ConsolidatedTable`].
pub struct SeriesMerger;

impl SeriesMerger {
    /// Merge `incoming` into `existing` (or into nothing on a first run).
    pub fn merge(existing: Option<&ConsolidatedTable>, incoming: &[Observation]) -> ConsolidatedTable {
        Self::merge_with_stats(existing, incoming).0
    }

    /// Same as [`SeriesMerger::merge`], also reporting what changed.
    pub fn merge_with_stats(
        existing: Option<&ConsolidatedTable>,
        incoming: &[Observation],
    ) -> (ConsolidatedTable, MergeStats) {
        let mut columns: Vec<String> = existing.map(|t| t.columns().to_vec()).unwrap_or_default();
        for obs in incoming {
            if !columns.iter().any(|c| c == &obs.column) {
                columns.push(obs.column.clone());
            }
        }

        let mut stacked: Vec<TableRow> = existing.map(|t| t.rows().to_vec()).unwrap_or_default();
        stacked.extend(Self::to_rows(incoming));

        let merged = ConsolidatedTable::from_rows(columns, stacked);
        let stats = diff_stats(existing, &merged, incoming.len());

        tracing::debug!(
            observations = stats.observations,
            rows_before = stats.rows_before,
            rows_after = stats.rows_after,
            dates_added = stats.dates_added,
            cells_written = stats.cells_written,
            "merged observations"
        );

        (merged, stats)
    }

    /// One single-cell row per observation, keyed by its UTC calendar day.
    pub fn to_rows(incoming: &[Observation]) -> Vec<TableRow> {
        incoming
            .iter()
            .map(|obs| TableRow::new(obs.trading_day()).with(obs.column.clone(), obs.price))
            .collect()
    }
}

/// Reduce stacked rows to one row per date, ascending.
///
/// Rows are visited in the given order; for every (date, column) the last
/// non-missing value wins. A missing cell never overwrites a present one, so
/// a row carrying only column A leaves column B on the same date intact.
pub fn collapse_by_date(rows: Vec<TableRow>) -> Vec<TableRow> {
    let mut by_date: BTreeMap<NaiveDate, BTreeMap<String, f64>> = BTreeMap::new();
    for row in rows {
        let cells = by_date.entry(row.date).or_default();
        for (column, value) in row.values {
            if value.is_finite() {
                cells.insert(column, value);
            }
        }
    }
    by_date
        .into_iter()
        .map(|(date, values)| TableRow { date, values })
        .collect()
}

fn diff_stats(
    existing: Option<&ConsolidatedTable>,
    merged: &ConsolidatedTable,
    observations: usize,
) -> MergeStats {
    let mut stats = MergeStats {
        observations,
        rows_before: existing.map_or(0, |t| t.len()),
        rows_after: merged.len(),
        ..MergeStats::default()
    };
    for row in merged.rows() {
        let before = existing.and_then(|t| t.row(row.date));
        if before.is_none() {
            stats.dates_added += 1;
        }
        for (column, value) in &row.values {
            if before.and_then(|b| b.get(column)) != Some(*value) {
                stats.cells_written += 1;
            }
        }
    }
    stats
}

//! The consolidated daily table: one row per calendar day, one column per series.

use crate::analytics::merge::collapse_by_date;
use crate::analytics::AnalyticsError;
use crate::domain::series::Point;
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One dated row. A column absent from `values` is missing on that date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub date: NaiveDate,
    pub values: BTreeMap<String, f64>,
}

impl TableRow {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            values: BTreeMap::new(),
        }
    }

    /// Set a cell. Non-finite values are stored as missing.
    pub fn with(mut self, column: impl Into<String>, value: f64) -> Self {
        self.set(column, value);
        self
    }

    pub fn set(&mut self, column: impl Into<String>, value: f64) {
        if value.is_finite() {
            self.values.insert(column.into(), value);
        }
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.values.get(column).copied()
    }
}

/// Per-column coverage, used by status reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnCoverage {
    pub column: String,
    pub count: usize,
    pub first: Option<NaiveDate>,
    pub last: Option<NaiveDate>,
}

/// The persistent table.
///
/// Invariants, upheld by every constructor:
/// - rows are strictly ascending by date (so at most one row per date);
/// - `columns` lists every column that appears in any row, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsolidatedTable {
    columns: Vec<String>,
    rows: Vec<TableRow>,
}

impl ConsolidatedTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from arbitrary rows (unsorted, possibly repeating dates).
    ///
    /// Rows are reduced with [`collapse_by_date`]; `columns` fixes the column
    /// order and is extended with any extra column found in the rows.
    pub fn from_rows(columns: Vec<String>, rows: Vec<TableRow>) -> Self {
        let rows = collapse_by_date(rows);
        let mut columns = dedupe_columns(columns);
        for row in &rows {
            for name in row.values.keys() {
                if !columns.iter().any(|c| c == name) {
                    columns.push(name.clone());
                }
            }
        }
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.date).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|r| r.date)
    }

    pub fn row(&self, date: NaiveDate) -> Option<&TableRow> {
        self.rows
            .binary_search_by_key(&date, |r| r.date)
            .ok()
            .map(|i| &self.rows[i])
    }

    pub fn value(&self, date: NaiveDate, column: &str) -> Option<f64> {
        self.row(date).and_then(|r| r.get(column))
    }

    /// The column aligned to every table row, missing cells as `None`.
    pub fn column(&self, column: &str) -> Result<Vec<Point>, AnalyticsError> {
        self.require(column)?;
        Ok(self
            .rows
            .iter()
            .map(|r| Point::new(r.date, r.get(column)))
            .collect())
    }

    /// Only the dates on which `column` has a value: that series' trading days.
    pub fn prices(&self, column: &str) -> Result<Vec<Point>, AnalyticsError> {
        self.require(column)?;
        Ok(self
            .rows
            .iter()
            .filter_map(|r| r.get(column).map(|v| Point::some(r.date, v)))
            .collect())
    }

    fn require(&self, column: &str) -> Result<(), AnalyticsError> {
        if self.has_column(column) {
            Ok(())
        } else {
            Err(AnalyticsError::ColumnUnavailable {
                column: column.to_string(),
            })
        }
    }

    /// A copy without the named columns.
    ///
    /// Merging never removes a column; this is the only path that does, and
    /// it is reserved for an explicit refresh of those series.
    pub fn without_columns(&self, drop: &[&str]) -> Self {
        let columns = self
            .columns
            .iter()
            .filter(|c| !drop.contains(&c.as_str()))
            .cloned()
            .collect();
        let rows = self
            .rows
            .iter()
            .map(|r| TableRow {
                date: r.date,
                values: r
                    .values
                    .iter()
                    .filter(|(k, _)| !drop.contains(&k.as_str()))
                    .map(|(k, v)| (k.clone(), *v))
                    .collect(),
            })
            .collect();
        Self { columns, rows }
    }

    pub fn coverage(&self) -> Vec<ColumnCoverage> {
        self.columns
            .iter()
            .map(|name| {
                let present: Vec<NaiveDate> = self
                    .rows
                    .iter()
                    .filter(|r| r.values.contains_key(name))
                    .map(|r| r.date)
                    .collect();
                ColumnCoverage {
                    column: name.clone(),
                    count: present.len(),
                    first: present.first().copied(),
                    last: present.last().copied(),
                }
            })
            .collect()
    }

    /// Columnar view for consumers that work on data frames.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        // NaiveDate::default() is the Unix epoch.
        let epoch = NaiveDate::default();
        let days: Vec<i32> = self
            .rows
            .iter()
            .map(|r| (r.date - epoch).num_days() as i32)
            .collect();

        let mut frame_columns = vec![Column::new("Date".into(), days).cast(&DataType::Date)?];
        for name in &self.columns {
            let values: Vec<Option<f64>> = self.rows.iter().map(|r| r.get(name)).collect();
            frame_columns.push(Column::new(name.as_str().into(), values));
        }
        DataFrame::new(frame_columns)
    }
}

fn dedupe_columns(columns: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(columns.len());
    for c in columns {
        if !out.contains(&c) {
            out.push(c);
        }
    }
    out
}

//! Named lookback windows ("All Time", "Last 20 Years", ...).

use crate::domain::series::Point;
use crate::domain::ConsolidatedTable;
use chrono::Datelike;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookbackRange {
    pub label: String,
    pub start_year: i32,
    /// Last year counted, inclusive: the as-of year.
    pub end_year: i32,
}

impl LookbackRange {
    pub fn new(label: impl Into<String>, start_year: i32, end_year: i32) -> Self {
        Self {
            label: label.into(),
            start_year,
            end_year,
        }
    }

    pub fn includes(&self, year: i32) -> bool {
        (self.start_year..=self.end_year).contains(&year)
    }

    /// Points whose year falls inside the range.
    ///
    /// Derived series (returns, gaps) must be computed on the full history
    /// first, so the range's first day keeps its true predecessor.
    pub fn slice(&self, series: &[Point]) -> Vec<Point> {
        series
            .iter()
            .filter(|p| self.includes(p.date.year()))
            .copied()
            .collect()
    }
}

/// "All Time" from `first_year`, then "Last N Years" for each `N`, all ending
/// at `as_of_year`.
///
/// A window reaching before the data starts is clamped to `first_year`.
/// Years after `as_of_year` never belong to any range.
pub fn standard_ranges(first_year: i32, as_of_year: i32, years_back: &[u32]) -> Vec<LookbackRange> {
    let mut ranges = vec![LookbackRange::new("All Time", first_year, as_of_year)];
    ranges.extend(years_back.iter().map(|n| {
        LookbackRange::new(
            format!("Last {n} Years"),
            (as_of_year - *n as i32).max(first_year),
            as_of_year,
        )
    }));
    ranges
}

/// Year of the table's last row: the "current" year for every report.
pub fn as_of_year(table: &ConsolidatedTable) -> Option<i32> {
    table.last_date().map(|d| d.year())
}

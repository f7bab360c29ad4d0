//! Year-to-date paths (first price of each year = 100) averaged across years.

use super::ReportContext;
use chrono::{Datelike, NaiveDate};
use cyclelab_core::analytics::normalize::{cross_year_average, to_reference_path};
use cyclelab_core::analytics::{AnalyticsError, CalendarResampler, LookbackRange, YearNormalizer};
use cyclelab_core::domain::Point;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
pub struct YtdRange {
    pub range: LookbackRange,
    /// One point per reference day (366).
    pub average: Vec<Point>,
}

#[derive(Debug, Clone, Serialize)]
pub struct YtdColumn {
    pub column: String,
    pub ranges: Vec<YtdRange>,
    pub current_year: Vec<Point>,
}

#[derive(Debug, Clone, Serialize)]
pub struct YtdReport {
    pub as_of_year: i32,
    pub columns: Vec<YtdColumn>,
}

pub fn build(ctx: &ReportContext<'_>) -> Result<YtdReport, AnalyticsError> {
    let columns = ctx
        .config
        .seasonal_columns
        .iter()
        .map(|column| build_column(ctx, column))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(YtdReport {
        as_of_year: ctx.as_of_year,
        columns,
    })
}

/// Each year on its own calendar, filled only from that year's prices.
///
/// The as-of year stops at its last real price instead of being carried to
/// December 31.
pub fn year_to_date_paths(prices: &[Point], as_of_year: i32) -> BTreeMap<i32, Vec<Point>> {
    let mut last_in_year: BTreeMap<i32, NaiveDate> = BTreeMap::new();
    for p in prices.iter().filter(|p| p.valid().is_some()) {
        last_in_year.insert(p.date.year(), p.date);
    }

    last_in_year
        .into_iter()
        .filter_map(|(year, last)| {
            let start = NaiveDate::from_ymd_opt(year, 1, 1)?;
            let end = if year == as_of_year {
                last
            } else {
                NaiveDate::from_ymd_opt(year, 12, 31)?
            };
            let filled = CalendarResampler::fill_calendar(prices, start, end);
            YearNormalizer::normalize(&filled).map(|path| (year, path))
        })
        .collect()
}

fn build_column(ctx: &ReportContext<'_>, column: &str) -> Result<YtdColumn, AnalyticsError> {
    let prices = ctx.prices(column)?;
    let years = year_to_date_paths(&prices, ctx.as_of_year);

    let ranges = ctx
        .ranges_for(&prices)
        .into_par_iter()
        .map(|range| YtdRange {
            average: cross_year_average(&years, |y| range.includes(y)),
            range,
        })
        .collect();

    Ok(YtdColumn {
        column: column.to_string(),
        ranges,
        current_year: years
            .get(&ctx.as_of_year)
            .map(|points| to_reference_path(points))
            .unwrap_or_default(),
    })
}

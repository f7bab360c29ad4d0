//! Month-of-year seasonality for the seasonal columns.

use super::ReportContext;
use chrono::Datelike;
use cyclelab_core::analytics::{
    month_stats, monthly_returns, AnalyticsError, LookbackRange, MonthStat,
};
use cyclelab_core::domain::Point;
use rayon::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyRange {
    pub range: LookbackRange,
    pub stats: Vec<MonthStat>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyColumn {
    pub column: String,
    pub ranges: Vec<MonthlyRange>,
    /// Month-end returns of the as-of year so far.
    pub current_year: Vec<Point>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyReport {
    pub as_of_year: i32,
    pub columns: Vec<MonthlyColumn>,
}

pub fn build(ctx: &ReportContext<'_>) -> Result<MonthlyReport, AnalyticsError> {
    let columns = ctx
        .config
        .seasonal_columns
        .iter()
        .map(|column| build_column(ctx, column))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(MonthlyReport {
        as_of_year: ctx.as_of_year,
        columns,
    })
}

fn build_column(ctx: &ReportContext<'_>, column: &str) -> Result<MonthlyColumn, AnalyticsError> {
    let prices = ctx.prices(column)?;
    let monthly = monthly_returns(&prices);

    let ranges = ctx
        .ranges_for(&prices)
        .into_par_iter()
        .map(|range| MonthlyRange {
            stats: month_stats(&monthly, &range),
            range,
        })
        .collect();

    Ok(MonthlyColumn {
        column: column.to_string(),
        ranges,
        current_year: monthly
            .iter()
            .filter(|p| p.date.year() == ctx.as_of_year)
            .copied()
            .collect(),
    })
}

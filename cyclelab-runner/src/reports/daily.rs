//! Trading-day table for one year.

use super::ReportContext;
use chrono::{Datelike, NaiveDate};
use cyclelab_core::analytics::calendar_effects::weekday_name;
use cyclelab_core::analytics::{AnalyticsError, ReturnCalculator};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRow {
    pub date: NaiveDate,
    pub weekday: String,
    pub close: f64,
    /// Against the previous trading day, which may be in the prior year.
    pub return_pct: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyReport {
    pub column: String,
    pub year: i32,
    /// Most recent day first.
    pub rows: Vec<DailyRow>,
}

pub fn build(ctx: &ReportContext<'_>) -> Result<DailyReport, AnalyticsError> {
    let prices = ctx.prices(ctx.target())?;
    let returns = ReturnCalculator::daily_return(&prices);

    let mut rows: Vec<DailyRow> = prices
        .iter()
        .zip(&returns)
        .filter(|(p, _)| p.date.year() == ctx.daily_year)
        .filter_map(|(p, r)| {
            p.valid().map(|close| DailyRow {
                date: p.date,
                weekday: weekday_name(p.date.weekday()).to_string(),
                close,
                return_pct: r.valid(),
            })
        })
        .collect();
    rows.reverse();

    Ok(DailyReport {
        column: ctx.target().to_string(),
        year: ctx.daily_year,
        rows,
    })
}

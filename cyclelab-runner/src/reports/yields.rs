//! Weekly average of the treasury yield column.

use super::ReportContext;
use chrono::Datelike;
use cyclelab_core::analytics::{AnalyticsError, CalendarResampler};
use cyclelab_core::domain::Point;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct YieldReport {
    pub column: String,
    /// Oldest week first, each dated on its closing Sunday.
    pub weeks: Vec<Point>,
}

pub fn build(ctx: &ReportContext<'_>) -> Result<YieldReport, AnalyticsError> {
    let column = &ctx.config.yield_column;
    let mut values = ctx.prices(column)?;
    values.retain(|p| p.date.year() <= ctx.as_of_year);
    Ok(YieldReport {
        column: column.clone(),
        weeks: CalendarResampler::to_week_end_mean(&values),
    })
}

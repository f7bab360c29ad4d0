//! Calendar-year returns with their cycle phase.

use super::ReportContext;
use cyclelab_core::analytics::{yearly_summary, AnalyticsError, YearSummary};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct YearlyReport {
    pub column: String,
    /// Most recent year first.
    pub years: Vec<YearSummary>,
}

pub fn build(ctx: &ReportContext<'_>) -> Result<YearlyReport, AnalyticsError> {
    let prices = ctx.prices(ctx.target())?;
    let mut years = yearly_summary(&prices);
    years.retain(|y| y.year <= ctx.as_of_year);
    years.reverse();
    Ok(YearlyReport {
        column: ctx.target().to_string(),
        years,
    })
}

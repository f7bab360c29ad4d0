//! Returns around market holidays, per lookback range.
//!
//! Holiday and long-holiday effects are separate passes over the same days.

use super::ReportContext;
use cyclelab_core::analytics::calendar_effects::{
    classify_gaps, gap_effect, GapDay, GapEffect, HOLIDAY_GAP, LONG_HOLIDAY_GAP,
};
use cyclelab_core::analytics::{AnalyticsError, LookbackRange, ReturnCalculator};
use chrono::Datelike;
use rayon::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct HolidayRange {
    pub range: LookbackRange,
    pub holiday: GapEffect,
    pub long_holiday: GapEffect,
}

#[derive(Debug, Clone, Serialize)]
pub struct HolidayReport {
    pub column: String,
    pub ranges: Vec<HolidayRange>,
}

pub fn build(ctx: &ReportContext<'_>) -> Result<HolidayReport, AnalyticsError> {
    let prices = ctx.prices(ctx.target())?;
    // Gaps are measured on the full series before any range is cut.
    let days = classify_gaps(&ReturnCalculator::daily_return(&prices));

    let ranges = ctx
        .ranges_for(&prices)
        .into_par_iter()
        .map(|range| {
            let in_range: Vec<GapDay> = days
                .iter()
                .filter(|d| range.includes(d.date.year()))
                .copied()
                .collect();
            HolidayRange {
                holiday: gap_effect(&in_range, HOLIDAY_GAP),
                long_holiday: gap_effect(&in_range, LONG_HOLIDAY_GAP),
                range,
            }
        })
        .collect();

    Ok(HolidayReport {
        column: ctx.target().to_string(),
        ranges,
    })
}

//! Average calendar-day return by weekday, per lookback range.

use super::ReportContext;
use cyclelab_core::analytics::calendar_effects::{weekday_stats, WeekdayStat};
use cyclelab_core::analytics::{AnalyticsError, CalendarResampler, LookbackRange, ReturnCalculator};
use rayon::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct WeekdayRange {
    pub range: LookbackRange,
    pub stats: Vec<WeekdayStat>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeekdayReport {
    pub column: String,
    pub ranges: Vec<WeekdayRange>,
}

pub fn build(ctx: &ReportContext<'_>) -> Result<WeekdayReport, AnalyticsError> {
    let prices = ctx.prices(ctx.target())?;
    // Forward-filled, so Monday is measured against Friday's close.
    let returns = ReturnCalculator::daily_return(&CalendarResampler::to_daily(&prices));

    let ranges = ctx
        .ranges_for(&prices)
        .into_par_iter()
        .map(|range| WeekdayRange {
            stats: weekday_stats(&range.slice(&returns)),
            range,
        })
        .collect();

    Ok(WeekdayReport {
        column: ctx.target().to_string(),
        ranges,
    })
}

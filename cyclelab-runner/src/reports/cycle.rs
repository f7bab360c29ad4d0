//! Presidential-cycle seasonality: year-normalized paths averaged per phase.

use super::ReportContext;
use chrono::NaiveDate;
use cyclelab_core::analytics::normalize::{
    cross_year_average, month_end_distribution, normalize_years, rolling_mean, to_reference_path,
};
use cyclelab_core::analytics::{AnalyticsError, CalendarResampler, CyclePhase, LookbackRange};
use cyclelab_core::domain::Point;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

/// Normalized values of every contributing year on one reference month end.
#[derive(Debug, Clone, Serialize)]
pub struct MonthEndValues {
    pub date: NaiveDate,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PhaseAverage {
    pub phase: CyclePhase,
    pub label: String,
    pub years: Vec<i32>,
    /// One point per reference day (366).
    pub daily_average: Vec<Point>,
    pub smoothed: Vec<Point>,
    pub month_ends: Vec<MonthEndValues>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CycleRange {
    pub range: LookbackRange,
    pub phases: Vec<PhaseAverage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub column: String,
    pub as_of_year: i32,
    pub current_phase: CyclePhase,
    /// The as-of year's own normalized path, missing past its last price.
    pub current_year: Vec<Point>,
    pub current_year_smoothed: Vec<Point>,
    pub ranges: Vec<CycleRange>,
}

pub fn build(ctx: &ReportContext<'_>) -> Result<CycleReport, AnalyticsError> {
    let prices = ctx.prices(ctx.target())?;
    let years = normalize_years(&CalendarResampler::to_daily(&prices));
    let window = ctx.config.smoothing_window;

    let ranges = ctx
        .ranges_for(&prices)
        .into_par_iter()
        .map(|range| CycleRange {
            phases: CyclePhase::ALL
                .iter()
                .map(|phase| phase_average(&years, &range, *phase, window))
                .collect(),
            range,
        })
        .collect();

    let (current_year, current_year_smoothed) = match years.get(&ctx.as_of_year) {
        Some(points) => (
            to_reference_path(points),
            to_reference_path(&rolling_mean(points, window)),
        ),
        None => (Vec::new(), Vec::new()),
    };

    Ok(CycleReport {
        column: ctx.target().to_string(),
        as_of_year: ctx.as_of_year,
        current_phase: CyclePhase::of_year(ctx.as_of_year),
        current_year,
        current_year_smoothed,
        ranges,
    })
}

fn phase_average(
    years: &BTreeMap<i32, Vec<Point>>,
    range: &LookbackRange,
    phase: CyclePhase,
    window: usize,
) -> PhaseAverage {
    let include = |y: i32| range.includes(y) && CyclePhase::of_year(y) == phase;
    let daily_average = cross_year_average(years, include);
    PhaseAverage {
        phase,
        label: phase.label().to_string(),
        years: years.keys().copied().filter(|y| include(*y)).collect(),
        smoothed: rolling_mean(&daily_average, window),
        month_ends: month_end_distribution(years, include)
            .into_iter()
            .map(|(date, values)| MonthEndValues { date, values })
            .collect(),
        daily_average,
    }
}

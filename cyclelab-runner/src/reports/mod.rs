//! Report builders: the consolidated table in, chart-ready analytics out.
//!
//! Each builder is a pure function of a [`ReportContext`]. The as-of year is
//! fixed once when the context is built and never read from the clock.

pub mod cycle;
pub mod daily;
pub mod distribution;
pub mod holiday;
pub mod monthly;
pub mod weekday;
pub mod yearly;
pub mod yields;
pub mod ytd;

use crate::config::ReportConfig;
use chrono::Datelike;
use cyclelab_core::analytics::{standard_ranges, AnalyticsError, LookbackRange};
use cyclelab_core::domain::{ConsolidatedTable, Point};
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

pub use cycle::CycleReport;
pub use daily::DailyReport;
pub use distribution::DistributionReport;
pub use holiday::HolidayReport;
pub use monthly::MonthlyReport;
pub use weekday::WeekdayReport;
pub use yearly::YearlyReport;
pub use yields::YieldReport;
pub use ytd::YtdReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Weekday,
    Holiday,
    Distribution,
    Yearly,
    Cycle,
    Monthly,
    Ytd,
    Daily,
    Yield,
}

impl ReportKind {
    pub const ALL: [ReportKind; 9] = [
        ReportKind::Weekday,
        ReportKind::Holiday,
        ReportKind::Distribution,
        ReportKind::Yearly,
        ReportKind::Cycle,
        ReportKind::Monthly,
        ReportKind::Ytd,
        ReportKind::Daily,
        ReportKind::Yield,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ReportKind::Weekday => "weekday",
            ReportKind::Holiday => "holiday",
            ReportKind::Distribution => "distribution",
            ReportKind::Yearly => "yearly",
            ReportKind::Cycle => "cycle",
            ReportKind::Monthly => "monthly",
            ReportKind::Ytd => "ytd",
            ReportKind::Daily => "daily",
            ReportKind::Yield => "yield",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReportKind::ALL
            .iter()
            .copied()
            .find(|k| k.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let names: Vec<&str> = ReportKind::ALL.iter().map(|k| k.name()).collect();
                format!("unknown report '{s}' (expected one of: {})", names.join(", "))
            })
    }
}

/// A built report, tagged with its kind when serialized.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Report {
    Weekday(WeekdayReport),
    Holiday(HolidayReport),
    Distribution(DistributionReport),
    Yearly(YearlyReport),
    Cycle(CycleReport),
    Monthly(MonthlyReport),
    Ytd(YtdReport),
    Daily(DailyReport),
    Yield(YieldReport),
}

impl Report {
    pub fn kind(&self) -> ReportKind {
        match self {
            Report::Weekday(_) => ReportKind::Weekday,
            Report::Holiday(_) => ReportKind::Holiday,
            Report::Distribution(_) => ReportKind::Distribution,
            Report::Yearly(_) => ReportKind::Yearly,
            Report::Cycle(_) => ReportKind::Cycle,
            Report::Monthly(_) => ReportKind::Monthly,
            Report::Ytd(_) => ReportKind::Ytd,
            Report::Daily(_) => ReportKind::Daily,
            Report::Yield(_) => ReportKind::Yield,
        }
    }
}

/// Everything a report builder needs besides the table.
#[derive(Debug, Clone)]
pub struct ReportContext<'a> {
    pub table: &'a ConsolidatedTable,
    pub as_of_year: i32,
    pub config: ReportConfig,
    /// Year of the daily table; defaults to the as-of year.
    pub daily_year: i32,
}

impl<'a> ReportContext<'a> {
    pub fn new(table: &'a ConsolidatedTable, config: ReportConfig, as_of_year: i32) -> Self {
        Self {
            table,
            as_of_year,
            config,
            daily_year: as_of_year,
        }
    }

    pub fn with_daily_year(mut self, year: i32) -> Self {
        self.daily_year = year;
        self
    }

    pub fn target(&self) -> &str {
        &self.config.target
    }

    /// Trading-day prices of `column`.
    pub fn prices(&self, column: &str) -> Result<Vec<Point>, AnalyticsError> {
        let prices = self.table.prices(column)?;
        if prices.is_empty() {
            return Err(AnalyticsError::InsufficientData(format!(
                "column '{column}' has no prices"
            )));
        }
        Ok(prices)
    }

    /// "All Time" plus the configured lookbacks, anchored on the first year
    /// `prices` cover.
    pub fn ranges_for(&self, prices: &[Point]) -> Vec<LookbackRange> {
        self.ranges_with(prices, &self.config.lookback_years)
    }

    pub fn ranges_with(&self, prices: &[Point], years_back: &[u32]) -> Vec<LookbackRange> {
        let first_year = prices
            .first()
            .map(|p| p.date.year())
            .unwrap_or(self.as_of_year);
        standard_ranges(first_year, self.as_of_year, years_back)
    }
}

/// Build one report.
pub fn build(kind: ReportKind, ctx: &ReportContext<'_>) -> Result<Report, AnalyticsError> {
    let report = match kind {
        ReportKind::Weekday => Report::Weekday(weekday::build(ctx)?),
        ReportKind::Holiday => Report::Holiday(holiday::build(ctx)?),
        ReportKind::Distribution => Report::Distribution(distribution::build(ctx)?),
        ReportKind::Yearly => Report::Yearly(yearly::build(ctx)?),
        ReportKind::Cycle => Report::Cycle(cycle::build(ctx)?),
        ReportKind::Monthly => Report::Monthly(monthly::build(ctx)?),
        ReportKind::Ytd => Report::Ytd(ytd::build(ctx)?),
        ReportKind::Daily => Report::Daily(daily::build(ctx)?),
        ReportKind::Yield => Report::Yield(yields::build(ctx)?),
    };
    tracing::debug!(report = %kind, "built report");
    Ok(report)
}

/// Build every report in parallel. One failing report does not stop the rest.
pub fn build_all(ctx: &ReportContext<'_>) -> Vec<(ReportKind, Result<Report, AnalyticsError>)> {
    ReportKind::ALL
        .par_iter()
        .map(|kind| (*kind, build(*kind, ctx)))
        .collect()
}

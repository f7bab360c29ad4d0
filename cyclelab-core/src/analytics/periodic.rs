//! Year-over-year and month-of-year aggregates.

use super::cycle::CyclePhase;
use super::lookback::LookbackRange;
use super::resample::CalendarResampler;
use super::returns::pct_change;
use crate::domain::series::{hit_rate, mean, Point};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearSummary {
    pub year: i32,
    pub phase: CyclePhase,
    pub first_close: f64,
    pub last_close: f64,
    pub return_pct: f64,
}

/// First and last trading close of each calendar year and the change between.
///
/// A year whose first close is zero has no meaningful return and is left out.
pub fn yearly_summary(prices: &[Point]) -> Vec<YearSummary> {
    let mut bounds: BTreeMap<i32, (f64, f64)> = BTreeMap::new();
    for p in prices {
        let Some(v) = p.valid() else { continue };
        bounds
            .entry(p.date.year())
            .and_modify(|(_, last)| *last = v)
            .or_insert((v, v));
    }
    bounds
        .into_iter()
        .filter_map(|(year, (first, last))| {
            pct_change(Some(first), Some(last)).map(|r| YearSummary {
                year,
                phase: CyclePhase::of_year(year),
                first_close: first,
                last_close: last,
                return_pct: r,
            })
        })
        .collect()
}

/// Month-end returns over the whole series, dated on each month's last day.
///
/// The first month has no return. A month without any price stays missing,
/// and the month after it is measured against the last month that had one.
pub fn monthly_returns(prices: &[Point]) -> Vec<Point> {
    let mut last_close: Option<f64> = None;
    CalendarResampler::to_month_end(prices)
        .into_iter()
        .map(|p| {
            let close = p.valid();
            let r = pct_change(last_close, close);
            if close.is_some() {
                last_close = close;
            }
            Point::new(p.date, r)
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthStat {
    /// 1 = January.
    pub month: u32,
    pub name: String,
    pub avg_return: Option<f64>,
    pub hit_rate: Option<f64>,
    pub count: usize,
}

pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Per calendar month statistics of the monthly returns inside `range`.
///
/// Always twelve entries; months without data report no average.
pub fn month_stats(monthly: &[Point], range: &LookbackRange) -> Vec<MonthStat> {
    let mut by_month: [Vec<f64>; 12] = Default::default();
    for p in monthly.iter().filter(|p| range.includes(p.date.year())) {
        if let Some(r) = p.valid() {
            by_month[p.date.month0() as usize].push(r);
        }
    }
    by_month
        .iter()
        .enumerate()
        .map(|(i, values)| MonthStat {
            month: i as u32 + 1,
            name: MONTH_NAMES[i].to_string(),
            avg_return: mean(values),
            hit_rate: hit_rate(values),
            count: values.len(),
        })
        .collect()
}

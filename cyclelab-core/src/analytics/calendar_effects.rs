//! Weekday and holiday-gap effects on daily returns.
//!
//! Two holiday passes are run independently: a gap of two or more calendar
//! days marks a holiday, three or more a long holiday. A day after a
//! three-day weekend counts in both passes; they answer different questions
//! and are never folded into one taxonomy.

use crate::domain::series::{hit_rate, mean, Point};
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Gap (in calendar days) that marks a holiday between two trading days.
pub const HOLIDAY_GAP: i64 = 2;
/// Gap that marks a long holiday, typically a weekend or longer.
pub const LONG_HOLIDAY_GAP: i64 = 3;

pub const TRADING_WEEKDAYS: [Weekday; 5] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayStat {
    pub weekday: Weekday,
    pub name: String,
    pub avg_return: Option<f64>,
    /// Share of positive returns, in percent.
    pub hit_rate: Option<f64>,
    pub count: usize,
}

/// Mean, hit rate and count per weekday, Monday to Friday.
///
/// Expects a calendar-day return series (forward-filled prices), so a
/// Monday return spans the weekend. Weekend entries are always 0% and are
/// left out.
pub fn weekday_stats(calendar_returns: &[Point]) -> Vec<WeekdayStat> {
    TRADING_WEEKDAYS
        .iter()
        .map(|wd| {
            let values: Vec<f64> = calendar_returns
                .iter()
                .filter(|p| p.date.weekday() == *wd)
                .filter_map(Point::valid)
                .collect();
            WeekdayStat {
                weekday: *wd,
                name: weekday_name(*wd).to_string(),
                avg_return: mean(&values),
                hit_rate: hit_rate(&values),
                count: values.len(),
            }
        })
        .collect()
}

pub fn weekday_name(wd: Weekday) -> &'static str {
    match wd {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// A trading-day return with the calendar gaps around it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GapDay {
    pub date: NaiveDate,
    pub return_pct: f64,
    /// Days since the previous trading day; `None` for the first day.
    pub prev_gap: Option<i64>,
    /// Days until the next trading day; `None` for the last day.
    pub next_gap: Option<i64>,
}

impl GapDay {
    pub fn is_before(&self, threshold: i64) -> bool {
        self.next_gap.is_some_and(|g| g >= threshold)
    }

    pub fn is_after(&self, threshold: i64) -> bool {
        self.prev_gap.is_some_and(|g| g >= threshold)
    }
}

/// Attach gaps to every valid return of a trading-day return series.
///
/// Run this on the full series and slice afterwards, so the first day of a
/// window still knows how far back the previous trading day was.
pub fn classify_gaps(trading_returns: &[Point]) -> Vec<GapDay> {
    let valid: Vec<(NaiveDate, f64)> = trading_returns
        .iter()
        .filter_map(|p| p.valid().map(|v| (p.date, v)))
        .collect();
    valid
        .iter()
        .enumerate()
        .map(|(i, (date, r))| GapDay {
            date: *date,
            return_pct: *r,
            prev_gap: i
                .checked_sub(1)
                .map(|j| (*date - valid[j].0).num_days()),
            next_gap: valid.get(i + 1).map(|(next, _)| (*next - *date).num_days()),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStat {
    pub avg_return: Option<f64>,
    pub count: usize,
}

impl CategoryStat {
    fn from_values(values: &[f64]) -> Self {
        Self {
            avg_return: mean(values),
            count: values.len(),
        }
    }
}

/// Returns on the day before a gap, the day after one, and all other days.
///
/// `before` and `after` may overlap (a single trading day between two
/// holidays); `other` is every day in neither.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapEffect {
    pub threshold: i64,
    pub before: CategoryStat,
    pub after: CategoryStat,
    pub other: CategoryStat,
}

pub fn gap_effect(days: &[GapDay], threshold: i64) -> GapEffect {
    let mut before = Vec::new();
    let mut after = Vec::new();
    let mut other = Vec::new();
    for day in days {
        let b = day.is_before(threshold);
        let a = day.is_after(threshold);
        if b {
            before.push(day.return_pct);
        }
        if a {
            after.push(day.return_pct);
        }
        if !b && !a {
            other.push(day.return_pct);
        }
    }
    GapEffect {
        threshold,
        before: CategoryStat::from_values(&before),
        after: CategoryStat::from_values(&after),
        other: CategoryStat::from_values(&other),
    }
}

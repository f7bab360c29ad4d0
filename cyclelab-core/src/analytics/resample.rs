//! Calendar resampling: trading days onto calendar days, month ends and
//! Sunday-ending weeks.

use crate::domain::series::Point;
use chrono::{Datelike, Days, NaiveDate};
use std::collections::BTreeMap;

pub struct CalendarResampler;

impl CalendarResampler {
    /// Dense calendar-day series from the first to the last priced date.
    ///
    /// Days without a price carry the most recent prior price, so a calendar
    /// return over a weekend is exactly 0% and Monday's return is still
    /// measured against Friday's close. Input dates are expected to be
    /// unique; if not, the later entry for a date is used.
    pub fn to_daily(prices: &[Point]) -> Vec<Point> {
        let known = priced_by_date(prices);
        match (known.keys().next(), known.keys().next_back()) {
            (Some(&first), Some(&last)) => fill_from(&known, first, last),
            _ => Vec::new(),
        }
    }

    /// Every calendar day in `start..=end`, forward-filled from prices inside
    /// that window only. Days before the window's first price stay missing.
    pub fn fill_calendar(prices: &[Point], start: NaiveDate, end: NaiveDate) -> Vec<Point> {
        let known: BTreeMap<NaiveDate, f64> = priced_by_date(prices)
            .into_iter()
            .filter(|(d, _)| *d >= start && *d <= end)
            .collect();
        fill_from(&known, start, end)
    }

    /// Last price of each calendar month, dated on the month's final day.
    ///
    /// Months between the first and last priced month with no price at all
    /// are present with no value.
    pub fn to_month_end(prices: &[Point]) -> Vec<Point> {
        let mut by_month: BTreeMap<(i32, u32), f64> = BTreeMap::new();
        for (date, value) in priced_by_date(prices) {
            by_month.insert((date.year(), date.month()), value);
        }
        let (Some(&first), Some(&last)) = (by_month.keys().next(), by_month.keys().next_back())
        else {
            return Vec::new();
        };

        let mut out = Vec::new();
        let (mut year, mut month) = first;
        while (year, month) <= last {
            if let Some(date) = month_end(year, month) {
                out.push(Point::new(date, by_month.get(&(year, month)).copied()));
            }
            if month == 12 {
                year += 1;
                month = 1;
            } else {
                month += 1;
            }
        }
        out
    }

    /// Mean of each Monday-to-Sunday week's valid values, dated on the
    /// Sunday. Weeks with no valid value are left out.
    pub fn to_week_end_mean(values: &[Point]) -> Vec<Point> {
        let mut by_week: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
        for p in values {
            let (Some(v), Some(sunday)) = (p.valid(), week_end(p.date)) else {
                continue;
            };
            let entry = by_week.entry(sunday).or_insert((0.0, 0));
            entry.0 += v;
            entry.1 += 1;
        }
        by_week
            .into_iter()
            .map(|(sunday, (sum, n))| Point::some(sunday, sum / n as f64))
            .collect()
    }
}

/// The Sunday closing the week that contains `date`.
pub fn week_end(date: NaiveDate) -> Option<NaiveDate> {
    let ahead = 6 - date.weekday().num_days_from_monday();
    date.checked_add_days(Days::new(u64::from(ahead)))
}

/// Last calendar day of `year`-`month`.
pub fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1).and_then(|d| d.pred_opt())
}

fn priced_by_date(prices: &[Point]) -> BTreeMap<NaiveDate, f64> {
    prices
        .iter()
        .filter_map(|p| p.valid().map(|v| (p.date, v)))
        .collect()
}

fn fill_from(known: &BTreeMap<NaiveDate, f64>, start: NaiveDate, end: NaiveDate) -> Vec<Point> {
    let mut last: Option<f64> = None;
    start
        .iter_days()
        .take_while(|day| *day <= end)
        .map(|day| {
            if let Some(v) = known.get(&day) {
                last = Some(*v);
            }
            Point::new(day, last)
        })
        .collect()
}

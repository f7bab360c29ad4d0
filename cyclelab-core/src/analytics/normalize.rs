//! Year-start indexing and cross-year averages on a reference leap year.

use crate::domain::series::{mean, Point};
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

/// Leap year every month/day is mapped onto, so February 29 has a slot.
pub const REFERENCE_YEAR: i32 = 2000;

pub struct YearNormalizer;

impl YearNormalizer {
    /// Rescale one year's prices so the first available price is 100.
    ///
    /// Returns `None` when the slice has no usable base (no price at all, or a
    /// zero first price); such a year is left out of normalized output.
    pub fn normalize(year_prices: &[Point]) -> Option<Vec<Point>> {
        let base = year_prices.iter().find_map(Point::valid)?;
        if base == 0.0 {
            return None;
        }
        Some(
            year_prices
                .iter()
                .map(|p| Point::new(p.date, p.valid().map(|v| v / base * 100.0)))
                .collect(),
        )
    }
}

/// Split a calendar-resampled series by year and normalize each year.
pub fn normalize_years(daily: &[Point]) -> BTreeMap<i32, Vec<Point>> {
    let mut by_year: BTreeMap<i32, Vec<Point>> = BTreeMap::new();
    for p in daily {
        by_year.entry(p.date.year()).or_default().push(*p);
    }
    by_year
        .into_iter()
        .filter_map(|(year, points)| match YearNormalizer::normalize(&points) {
            Some(normalized) => Some((year, normalized)),
            None => {
                tracing::debug!(year, "no base price, year excluded from normalization");
                None
            }
        })
        .collect()
}

/// `date`'s month and day on [`REFERENCE_YEAR`].
pub fn to_reference_day(date: NaiveDate) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(REFERENCE_YEAR, date.month(), date.day())
}

/// All 366 days of the reference year.
pub fn reference_days() -> Vec<NaiveDate> {
    let Some(start) = NaiveDate::from_ymd_opt(REFERENCE_YEAR, 1, 1) else {
        return Vec::new();
    };
    start
        .iter_days()
        .take_while(|d| d.year() == REFERENCE_YEAR)
        .collect()
}

/// Day-by-day mean of the selected years, aligned by month and day.
///
/// Output has one point per reference day. A year missing a value on a day
/// does not contribute to that day; a day nobody contributes to is missing.
pub fn cross_year_average<F>(years: &BTreeMap<i32, Vec<Point>>, include: F) -> Vec<Point>
where
    F: Fn(i32) -> bool,
{
    let mut buckets: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for (year, points) in years {
        if !include(*year) {
            continue;
        }
        for p in points {
            if let (Some(day), Some(v)) = (to_reference_day(p.date), p.valid()) {
                buckets.entry(day).or_default().push(v);
            }
        }
    }
    reference_days()
        .into_iter()
        .map(|day| Point::new(day, buckets.get(&day).and_then(|vs| mean(vs))))
        .collect()
}

/// One year's path re-dated onto the reference year.
pub fn to_reference_path(points: &[Point]) -> Vec<Point> {
    let by_day: BTreeMap<NaiveDate, Option<f64>> = points
        .iter()
        .filter_map(|p| to_reference_day(p.date).map(|day| (day, p.valid())))
        .collect();
    reference_days()
        .into_iter()
        .map(|day| Point::new(day, by_day.get(&day).copied().flatten()))
        .collect()
}

/// Trailing mean over the last `window` entries, using whatever values are
/// present (at least one) in that window.
pub fn rolling_mean(series: &[Point], window: usize) -> Vec<Point> {
    let window = window.max(1);
    series
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let from = (i + 1).saturating_sub(window);
            let values: Vec<f64> = series[from..=i].iter().filter_map(Point::valid).collect();
            Point::new(p.date, mean(&values))
        })
        .collect()
}

/// Normalized values of the selected years on each month's last reference
/// day (January 31 .. December 31, February 29 included).
pub fn month_end_distribution<F>(
    years: &BTreeMap<i32, Vec<Point>>,
    include: F,
) -> Vec<(NaiveDate, Vec<f64>)>
where
    F: Fn(i32) -> bool,
{
    let month_ends: Vec<NaiveDate> = (1..=12)
        .filter_map(|m| crate::analytics::resample::month_end(REFERENCE_YEAR, m))
        .collect();
    month_ends
        .into_iter()
        .map(|day| {
            let values = years
                .iter()
                .filter(|(year, _)| include(**year))
                .filter_map(|(_, points)| {
                    points
                        .iter()
                        .find(|p| to_reference_day(p.date) == Some(day))
                        .and_then(Point::valid)
                })
                .collect();
            (day, values)
        })
        .collect()
}

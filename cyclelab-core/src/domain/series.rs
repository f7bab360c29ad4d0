//! Ordered (date, value) series shared by every derived computation.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// One entry of a dated series. `None` is the explicit "no value" marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

impl Point {
    pub fn new(date: NaiveDate, value: Option<f64>) -> Self {
        Self { date, value }
    }

    pub fn some(date: NaiveDate, value: f64) -> Self {
        Self::new(date, Some(value))
    }

    pub fn missing(date: NaiveDate) -> Self {
        Self::new(date, None)
    }

    /// Value if present and finite.
    pub fn valid(&self) -> Option<f64> {
        self.value.filter(|v| v.is_finite())
    }
}

/// Points with `start <= date <= end`.
///
/// Slicing happens after derived values are computed; see
/// [`crate::analytics::ReturnCalculator::daily_return_between`].
pub fn slice_between(series: &[Point], start: NaiveDate, end: NaiveDate) -> Vec<Point> {
    series
        .iter()
        .filter(|p| p.date >= start && p.date <= end)
        .copied()
        .collect()
}

/// Points falling in calendar `year`.
pub fn slice_year(series: &[Point], year: i32) -> Vec<Point> {
    series.iter().filter(|p| p.date.year() == year).copied().collect()
}

/// Points from January 1 of `year` onwards.
pub fn from_year(series: &[Point], year: i32) -> Vec<Point> {
    series.iter().filter(|p| p.date.year() >= year).copied().collect()
}

/// The present, finite values in order.
pub fn valid_values(series: &[Point]) -> Vec<f64> {
    series.iter().filter_map(Point::valid).collect()
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Share of strictly positive values, in percent.
pub fn hit_rate(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let positive = values.iter().filter(|v| **v > 0.0).count();
    Some(positive as f64 / values.len() as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn slicing_selects_inclusive_ranges() {
        let series = vec![
            Point::some(d(2024, 12, 31), 1.0),
            Point::some(d(2025, 1, 2), 2.0),
            Point::some(d(2025, 1, 3), 3.0),
        ];
        assert_eq!(slice_year(&series, 2025).len(), 2);
        assert_eq!(slice_between(&series, d(2024, 12, 31), d(2025, 1, 2)).len(), 2);
        assert_eq!(from_year(&series, 2024).len(), 3);
    }

    #[test]
    fn valid_skips_missing_and_nan() {
        let series = vec![
            Point::missing(d(2025, 1, 1)),
            Point::some(d(2025, 1, 2), f64::NAN),
            Point::some(d(2025, 1, 3), 3.0),
        ];
        assert_eq!(valid_values(&series), vec![3.0]);
    }

    #[test]
    fn mean_and_hit_rate_of_empty_are_missing() {
        assert_eq!(mean(&[]), None);
        assert_eq!(hit_rate(&[]), None);
        assert_eq!(hit_rate(&[1.0, -1.0, 0.0, 2.0]), Some(50.0));
    }
}

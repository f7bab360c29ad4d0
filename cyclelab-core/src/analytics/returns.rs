//! Percentage daily returns.
//!
//! Returns are always computed over the complete sorted series and only then
//! sliced to a reporting window. Slicing first would make the window's first
//! day look like a series start and lose its true return.

use crate::domain::series::{slice_between, Point};
use chrono::NaiveDate;

pub struct ReturnCalculator;

impl ReturnCalculator {
    /// Percentage change between consecutive entries.
    ///
    /// The output has one point per input point. The first entry, and any
    /// entry whose own or prior price is missing or zero, carries no value.
    pub fn daily_return(prices: &[Point]) -> Vec<Point> {
        let mut out = Vec::with_capacity(prices.len());
        let mut prev: Option<f64> = None;
        for p in prices {
            let current = p.valid();
            out.push(Point::new(p.date, pct_change(prev, current)));
            prev = current;
        }
        out
    }

    /// Returns for `start..=end`, computed on the full series before slicing.
    ///
    /// The first entry of the window is measured against the last price
    /// before `start`, when one exists.
    pub fn daily_return_between(prices: &[Point], start: NaiveDate, end: NaiveDate) -> Vec<Point> {
        slice_between(&Self::daily_return(prices), start, end)
    }
}

/// `(current - prev) / prev * 100`, or `None` without a usable base.
pub fn pct_change(prev: Option<f64>, current: Option<f64>) -> Option<f64> {
    match (prev, current) {
        (Some(p), Some(c)) if p != 0.0 => Some((c - p) / p * 100.0),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn first_entry_has_no_return() {
        let r = ReturnCalculator::daily_return(&[
            Point::some(d(2024, 1, 2), 100.0),
            Point::some(d(2024, 1, 3), 102.0),
        ]);
        assert_eq!(r[0].value, None);
        assert!((r[1].value.unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn zero_or_missing_base_yields_no_value() {
        let r = ReturnCalculator::daily_return(&[
            Point::some(d(2024, 1, 2), 0.0),
            Point::some(d(2024, 1, 3), 5.0),
            Point::missing(d(2024, 1, 4)),
            Point::some(d(2024, 1, 5), 6.0),
        ]);
        assert_eq!(r[1].value, None);
        assert_eq!(r[2].value, None);
        assert_eq!(r[3].value, None);
    }

    #[test]
    fn window_start_uses_prior_close() {
        let prices = vec![
            Point::some(d(2024, 12, 30), 100.0),
            Point::some(d(2024, 12, 31), 102.0),
            Point::some(d(2025, 1, 2), 101.0),
        ];
        let window = ReturnCalculator::daily_return_between(&prices, d(2025, 1, 1), d(2025, 12, 31));
        assert_eq!(window.len(), 1);
        let expected = (101.0 - 102.0) / 102.0 * 100.0;
        assert!((window[0].value.unwrap() - expected).abs() < 1e-12);
    }
}

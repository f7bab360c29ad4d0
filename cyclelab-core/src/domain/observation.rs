//! Fetched price observations and the series they belong to.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A single price reported by the fetch collaborator for one table column.
///
/// The timestamp keeps whatever offset the source reported; it is only
/// reduced to a calendar day when the observation is keyed into the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Table column this price belongs to (e.g. "S&P 500").
    pub column: String,
    pub timestamp: DateTime<FixedOffset>,
    pub price: f64,
}

impl Observation {
    pub fn new(column: impl Into<String>, timestamp: DateTime<FixedOffset>, price: f64) -> Self {
        Self {
            column: column.into(),
            timestamp,
            price,
        }
    }

    /// Observation stamped at UTC midnight of `date`.
    pub fn on_date(column: impl Into<String>, date: NaiveDate, price: f64) -> Self {
        let ts = date.and_time(chrono::NaiveTime::MIN).and_utc().fixed_offset();
        Self::new(column, ts, price)
    }

    /// Calendar day this observation is keyed under.
    ///
    /// The timestamp is converted to UTC and the time of day dropped, so
    /// `00:00Z` and `05:00Z` on the same day resolve to the same date.
    pub fn trading_day(&self) -> NaiveDate {
        self.timestamp.with_timezone(&Utc).date_naive()
    }
}

/// A tracked instrument: the provider ticker and the table column it fills.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedSeries {
    pub column: String,
    pub ticker: String,
}

impl TrackedSeries {
    pub fn new(column: impl Into<String>, ticker: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ticker: ticker.into(),
        }
    }

    /// The default tracked set: three US series and two Japanese ones.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("S&P 500", "^GSPC"),
            Self::new("NASDAQ 100", "^NDX"),
            Self::new("US 10-Year Treasury Yield", "^TNX"),
            Self::new("Nikkei 225", "^N225"),
            Self::new("TOPIX", "1306.T"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trading_day_ignores_time_of_day() {
        let a = Observation::new(
            "S&P 500",
            DateTime::parse_from_rfc3339("2024-03-01T00:00:00+00:00").unwrap(),
            1.0,
        );
        let b = Observation::new(
            "S&P 500",
            DateTime::parse_from_rfc3339("2024-03-01T05:00:00+00:00").unwrap(),
            1.0,
        );
        assert_eq!(a.trading_day(), b.trading_day());
        assert_eq!(a.trading_day(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn trading_day_converts_to_utc_first() {
        // 00:00 in Tokyo is still the previous day in UTC.
        let obs = Observation::new(
            "Nikkei 225",
            DateTime::parse_from_rfc3339("2024-03-04T00:00:00+09:00").unwrap(),
            1.0,
        );
        assert_eq!(obs.trading_day(), NaiveDate::from_ymd_opt(2024, 3, 3).unwrap());
    }

    #[test]
    fn defaults_cover_five_series() {
        let defaults = TrackedSeries::defaults();
        assert_eq!(defaults.len(), 5);
        assert!(defaults.iter().any(|s| s.column == "TOPIX" && s.ticker == "1306.T"));
    }
}

//! Fetch collaborator contract and its error type.
//!
//! A [`DataProvider`] turns a ticker and a window into closing prices. The
//! engine never talks to the network directly, so tests drive the pipelines
//! with scripted providers.

use crate::domain::Observation;
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One closing price as reported by a provider, in the exchange's offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<FixedOffset>,
    pub close: f64,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<FixedOffset>, close: f64) -> Self {
        Self { timestamp, close }
    }
}

/// How much history to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchWindow {
    /// The most recent `days` calendar days.
    Recent { days: u32 },
    /// Inclusive date range.
    Range { start: NaiveDate, end: NaiveDate },
    /// Everything the provider has.
    Max,
}

/// Failures fetching a single symbol. All are recoverable per symbol.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("data error: {0}")]
    Other(String),
}

pub trait DataProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Closing prices for `ticker` over `window`, oldest first.
    ///
    /// No data for the window is `Ok(vec![])`, not an error.
    fn fetch(&self, ticker: &str, window: FetchWindow) -> Result<Vec<PricePoint>, DataError>;

    /// Whether requests are currently allowed (not rate-limited or blocked).
    fn is_available(&self) -> bool;
}

/// Label fetched prices with the table column they fill.
pub fn to_observations(column: &str, points: &[PricePoint]) -> Vec<Observation> {
    points
        .iter()
        .map(|p| Observation::new(column, p.timestamp, p.close))
        .collect()
}

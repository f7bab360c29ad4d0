//! Yahoo Finance provider over the v8 chart API.
//!
//! Only daily closes are read. Retries back off exponentially and share a
//! circuit breaker with every other request made by this provider.

use super::circuit_breaker::CircuitBreaker;
use super::provider::{DataError, DataProvider, FetchWindow, PricePoint};
use chrono::{DateTime, FixedOffset, NaiveTime};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

const CHART_BASE: &str = "https://query2.finance.yahoo.com/v8/finance/chart";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    /// Exchange offset from UTC, in seconds.
    gmtoffset: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

pub struct YahooProvider {
    client: reqwest::blocking::Client,
    circuit_breaker: Arc<CircuitBreaker>,
    max_retries: u32,
    base_delay: Duration,
}

impl YahooProvider {
    pub fn new(circuit_breaker: Arc<CircuitBreaker>) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            circuit_breaker,
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        })
    }

    pub fn with_retries(mut self, max_retries: u32, base_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.base_delay = base_delay;
        self
    }

    fn chart_url(ticker: &str, window: FetchWindow) -> String {
        let span = match window {
            FetchWindow::Recent { days } => format!("range={days}d"),
            FetchWindow::Max => "range=max".to_string(),
            FetchWindow::Range { start, end } => {
                let start_ts = start.and_time(NaiveTime::MIN).and_utc().timestamp();
                // period2 is exclusive; cover the whole end day.
                let end_ts = end.and_time(NaiveTime::MIN).and_utc().timestamp() + 86_400;
                format!("period1={start_ts}&period2={end_ts}")
            }
        };
        format!("{CHART_BASE}/{ticker}?{span}&interval=1d")
    }

    fn parse_response(ticker: &str, resp: ChartResponse) -> Result<Vec<PricePoint>, DataError> {
        let result = match (resp.chart.result, resp.chart.error) {
            (Some(result), _) => result,
            (None, Some(err)) if err.code == "Not Found" => {
                return Err(DataError::SymbolNotFound {
                    symbol: ticker.to_string(),
                })
            }
            (None, Some(err)) => {
                return Err(DataError::ResponseFormatChanged(format!(
                    "{}: {}",
                    err.code, err.description
                )))
            }
            (None, None) => {
                return Err(DataError::ResponseFormatChanged(
                    "empty result with no error".into(),
                ))
            }
        };

        let Some(data) = result.into_iter().next() else {
            return Ok(Vec::new());
        };
        let Some(timestamps) = data.timestamp else {
            // A window with no sessions comes back without timestamps.
            return Ok(Vec::new());
        };

        let offset_secs = data.meta.and_then(|m| m.gmtoffset).unwrap_or(0);
        let offset = FixedOffset::east_opt(offset_secs).ok_or_else(|| {
            DataError::ResponseFormatChanged(format!("invalid gmtoffset: {offset_secs}"))
        })?;

        let closes = data
            .indicators
            .quote
            .into_iter()
            .next()
            .map(|q| q.close)
            .unwrap_or_default();

        let mut points = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            let Some(close) = closes.get(i).copied().flatten() else {
                continue;
            };
            let timestamp = DateTime::from_timestamp(ts, 0)
                .ok_or_else(|| DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}")))?
                .with_timezone(&offset);
            points.push(PricePoint::new(timestamp, close));
        }
        Ok(points)
    }

    fn fetch_with_retry(&self, ticker: &str, window: FetchWindow) -> Result<Vec<PricePoint>, DataError> {
        let url = Self::chart_url(ticker, window);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                tracing::debug!(ticker, attempt, ?delay, "retrying");
                std::thread::sleep(delay);
            }

            if !self.circuit_breaker.is_allowed() {
                return Err(DataError::CircuitBreakerTripped);
            }

            let resp = match self.client.get(&url).send() {
                Ok(resp) => resp,
                Err(e) if e.is_connect() || e.is_timeout() => {
                    self.circuit_breaker.record_failure();
                    last_error = Some(DataError::NetworkUnreachable(e.to_string()));
                    continue;
                }
                Err(e) => return Err(DataError::NetworkUnreachable(e.to_string())),
            };

            let status = resp.status();
            if status == reqwest::StatusCode::FORBIDDEN {
                self.circuit_breaker.trip();
                return Err(DataError::CircuitBreakerTripped);
            }
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(DataError::SymbolNotFound {
                    symbol: ticker.to_string(),
                });
            }
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                self.circuit_breaker.record_failure();
                let retry_after = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                last_error = Some(DataError::RateLimited {
                    retry_after_secs: retry_after,
                });
                continue;
            }
            if !status.is_success() {
                self.circuit_breaker.record_failure();
                last_error = Some(DataError::Other(format!("HTTP {status} for {ticker}")));
                continue;
            }

            let chart: ChartResponse = resp.json().map_err(|e| {
                DataError::ResponseFormatChanged(format!("failed to parse response for {ticker}: {e}"))
            })?;
            let points = Self::parse_response(ticker, chart)?;
            self.circuit_breaker.record_success();
            return Ok(points);
        }

        Err(last_error.unwrap_or_else(|| DataError::Other("max retries exceeded".into())))
    }
}

impl DataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(&self, ticker: &str, window: FetchWindow) -> Result<Vec<PricePoint>, DataError> {
        self.fetch_with_retry(ticker, window)
    }

    fn is_available(&self) -> bool {
        self.circuit_breaker.is_allowed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn parse(ticker: &str, body: &str) -> Result<Vec<PricePoint>, DataError> {
        YahooProvider::parse_response(ticker, serde_json::from_str(body).unwrap())
    }

    #[test]
    fn urls_follow_window() {
        assert!(YahooProvider::chart_url("^GSPC", FetchWindow::Recent { days: 7 })
            .ends_with("/^GSPC?range=7d&interval=1d"));
        assert!(YahooProvider::chart_url("^N225", FetchWindow::Max).contains("range=max"));
        let url = YahooProvider::chart_url(
            "1306.T",
            FetchWindow::Range {
                start: NaiveDate::from_ymd_opt(1970, 1, 2).unwrap(),
                end: NaiveDate::from_ymd_opt(1970, 1, 2).unwrap(),
            },
        );
        assert!(url.contains("period1=86400&period2=172800"));
    }

    #[test]
    fn parses_closes_in_exchange_offset() {
        let body = r#"{"chart":{"result":[{
            "meta":{"gmtoffset":32400},
            "timestamp":[1714521600,1714608000],
            "indicators":{"quote":[{"close":[38000.5,null]}]}
        }],"error":null}}"#;
        let points = parse("^N225", body).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].close, 38000.5);
        assert_eq!(points[0].timestamp.offset().local_minus_utc(), 32400);
    }

    #[test]
    fn missing_timestamps_are_empty_not_error() {
        let body = r#"{"chart":{"result":[{"meta":{},"indicators":{"quote":[{}]}}],"error":null}}"#;
        assert!(parse("^GSPC", body).unwrap().is_empty());
    }

    #[test]
    fn not_found_maps_to_symbol_error() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found"}}}"#;
        assert!(matches!(
            parse("^NOPE", body),
            Err(DataError::SymbolNotFound { symbol }) if symbol == "^NOPE"
        ));
    }
}

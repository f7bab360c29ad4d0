//! Multi-series fetch: one request per tracked series, partial success allowed.

use super::provider::{to_observations, DataError, DataProvider, FetchWindow};
use crate::domain::{Observation, TrackedSeries};

/// What a batch fetch produced.
#[derive(Debug, Default)]
pub struct FetchSummary {
    pub observations: Vec<Observation>,
    /// Columns that returned at least one price.
    pub succeeded: Vec<String>,
    /// Columns whose provider answered with no data.
    pub empty: Vec<String>,
    pub failures: Vec<(String, DataError)>,
}

impl FetchSummary {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.empty.len() + self.failures.len()
    }

    pub fn all_failed(&self) -> bool {
        self.succeeded.is_empty()
    }
}

/// Fetch every series in `series`, in order.
///
/// A failing symbol is logged and recorded; the others still contribute.
/// Once the provider stops accepting requests the remaining series are
/// recorded as failed without being attempted.
pub fn fetch_series(
    provider: &dyn DataProvider,
    series: &[TrackedSeries],
    window: FetchWindow,
) -> FetchSummary {
    let mut summary = FetchSummary::default();

    for (i, s) in series.iter().enumerate() {
        tracing::info!(
            column = %s.column,
            ticker = %s.ticker,
            provider = provider.name(),
            "fetching [{}/{}]",
            i + 1,
            series.len()
        );

        match provider.fetch(&s.ticker, window) {
            Ok(points) if points.is_empty() => {
                tracing::warn!(column = %s.column, ticker = %s.ticker, "no data returned");
                summary.empty.push(s.column.clone());
            }
            Ok(points) => {
                tracing::debug!(column = %s.column, prices = points.len(), "fetched");
                summary.observations.extend(to_observations(&s.column, &points));
                summary.succeeded.push(s.column.clone());
            }
            Err(e) => {
                tracing::warn!(column = %s.column, ticker = %s.ticker, error = %e, "fetch failed");
                summary.failures.push((s.column.clone(), e));
            }
        }

        if !provider.is_available() {
            for rest in &series[i + 1..] {
                summary
                    .failures
                    .push((rest.column.clone(), DataError::CircuitBreakerTripped));
            }
            if i + 1 < series.len() {
                tracing::warn!(
                    skipped = series.len() - i - 1,
                    "provider unavailable, skipping remaining series"
                );
            }
            break;
        }
    }

    tracing::info!(
        succeeded = summary.succeeded.len(),
        empty = summary.empty.len(),
        failed = summary.failures.len(),
        "fetch complete"
    );
    summary
}

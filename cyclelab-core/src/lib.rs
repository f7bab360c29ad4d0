//! CycleLab Core: the consolidated daily market table and everything derived from it.
//!
//! - Domain types (observations, dated series, the consolidated table)
//! - Merge of fetched observations into the table, one row per calendar day
//! - Returns, calendar resampling, year normalization, cycle phases
//! - Calendar effects, periodic aggregates and return distributions
//! - Fetch collaborator contract (Yahoo Finance) and the CSV table store

pub mod analytics;
pub mod data;
pub mod domain;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: shared types can cross threads (reports run on rayon).
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::ConsolidatedTable>();
        require_sync::<domain::ConsolidatedTable>();
        require_send::<domain::Observation>();
        require_sync::<domain::Observation>();
        require_send::<domain::Point>();
        require_sync::<domain::Point>();

        require_send::<analytics::DistributionBinner>();
        require_sync::<analytics::DistributionBinner>();
        require_send::<analytics::LookbackRange>();
        require_sync::<analytics::LookbackRange>();
        require_send::<analytics::AnalyticsError>();
        require_sync::<analytics::AnalyticsError>();

        require_send::<data::CircuitBreaker>();
        require_sync::<data::CircuitBreaker>();
        require_send::<data::DataError>();
        require_sync::<data::DataError>();
        require_send::<data::YahooProvider>();
        require_sync::<data::YahooProvider>();
    }

    /// The provider contract stays object-safe: pipelines take `&dyn DataProvider`.
    #[test]
    fn data_provider_is_object_safe() {
        fn _fetch(
            provider: &dyn data::DataProvider,
        ) -> Result<Vec<data::PricePoint>, data::DataError> {
            provider.fetch("^GSPC", data::FetchWindow::Recent { days: 7 })
        }
    }
}

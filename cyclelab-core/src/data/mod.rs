//! Fetching prices and persisting the consolidated table.

pub mod circuit_breaker;
pub mod fetch;
pub mod provider;
pub mod store;
pub mod yahoo;

pub use circuit_breaker::CircuitBreaker;
pub use fetch::{fetch_series, FetchSummary};
pub use provider::{DataError, DataProvider, FetchWindow, PricePoint};
pub use store::{export_parquet, StoreError, TableMeta, TableStore};
pub use yahoo::YahooProvider;

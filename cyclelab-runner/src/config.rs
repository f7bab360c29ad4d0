//! Lab configuration, loaded from TOML.
//!
//! ```toml
//! [data]
//! table_path = "market_data.csv"
//! recent_days = 7
//!
//! [[series]]
//! column = "S&P 500"
//! ticker = "^GSPC"
//!
//! [report]
//! target = "S&P 500"
//! lookback_years = [50, 30, 20, 10]
//! output_dir = "reports"
//! ```
//!
//! Every section is optional; omitted values fall back to the defaults below.

use cyclelab_core::domain::TrackedSeries;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub table_path: PathBuf,
    /// Calendar days fetched by an update run.
    pub recent_days: u32,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            table_path: PathBuf::from("market_data.csv"),
            recent_days: 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Column most reports analyse.
    pub target: String,
    pub lookback_years: Vec<u32>,
    /// Extra short windows for the return distribution.
    pub distribution_extra_years: Vec<u32>,
    pub output_dir: PathBuf,
    /// Trailing window of the smoothed cycle averages, in days.
    pub smoothing_window: usize,
    /// Columns covered by the monthly and year-to-date reports.
    pub seasonal_columns: Vec<String>,
    /// Column averaged per week by the yield report.
    pub yield_column: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            target: "S&P 500".to_string(),
            lookback_years: vec![50, 30, 20, 10],
            distribution_extra_years: vec![5],
            output_dir: PathBuf::from("reports"),
            smoothing_window: 30,
            seasonal_columns: vec!["Nikkei 225".to_string(), "TOPIX".to_string()],
            yield_column: "US 10-Year Treasury Yield".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabConfig {
    pub data: DataConfig,
    pub series: Vec<TrackedSeries>,
    pub report: ReportConfig,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            series: TrackedSeries::defaults(),
            report: ReportConfig::default(),
        }
    }
}

impl LabConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read `path` if it exists, otherwise use the built-in defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data.recent_days == 0 {
            return Err(ConfigError::Invalid("data.recent_days must be at least 1".into()));
        }
        if self.series.is_empty() {
            return Err(ConfigError::Invalid("at least one [[series]] is required".into()));
        }
        for (i, s) in self.series.iter().enumerate() {
            if s.column.trim().is_empty() || s.ticker.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "series #{} needs both column and ticker",
                    i + 1
                )));
            }
            if self.series[..i].iter().any(|prev| prev.column == s.column) {
                return Err(ConfigError::Invalid(format!(
                    "column '{}' is configured twice",
                    s.column
                )));
            }
        }
        if self.report.smoothing_window == 0 {
            return Err(ConfigError::Invalid("report.smoothing_window must be at least 1".into()));
        }
        if self
            .report
            .lookback_years
            .iter()
            .chain(&self.report.distribution_extra_years)
            .any(|n| *n == 0)
        {
            return Err(ConfigError::Invalid("lookback windows must be at least 1 year".into()));
        }
        Ok(())
    }

    /// The configured series for the named columns, in the order given.
    pub fn series_for(&self, columns: &[String]) -> Result<Vec<TrackedSeries>, ConfigError> {
        columns
            .iter()
            .map(|c| {
                self.series
                    .iter()
                    .find(|s| &s.column == c)
                    .cloned()
                    .ok_or_else(|| ConfigError::Invalid(format!("no series configured for column '{c}'")))
            })
            .collect()
    }
}

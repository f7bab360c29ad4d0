//! Derived metrics over the consolidated table.
//!
//! Everything here is a pure function of its inputs. Nothing reads the clock:
//! where a "current year" matters it is passed in.

pub mod calendar_effects;
pub mod cycle;
pub mod distribution;
pub mod lookback;
pub mod merge;
pub mod normalize;
pub mod periodic;
pub mod resample;
pub mod returns;

pub use calendar_effects::{
    classify_gaps, gap_effect, weekday_stats, GapDay, GapEffect, WeekdayStat, HOLIDAY_GAP,
    LONG_HOLIDAY_GAP,
};
pub use cycle::{cycle, CyclePhase};
pub use distribution::{Band, BandCounts, BucketScheme, DistributionBinner, DistributionSummary, Histogram};
pub use lookback::{as_of_year, standard_ranges, LookbackRange};
pub use merge::{MergeStats, SeriesMerger};
pub use normalize::{cross_year_average, normalize_years, YearNormalizer};
pub use periodic::{month_stats, monthly_returns, yearly_summary, MonthStat, YearSummary};
pub use resample::CalendarResampler;
pub use returns::ReturnCalculator;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("column '{column}' is not present in the table")]
    ColumnUnavailable { column: String },

    #[error("not enough data: {0}")]
    InsufficientData(String),

    #[error("invalid bucket boundaries: {0}")]
    InvalidBuckets(String),
}

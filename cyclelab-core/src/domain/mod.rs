//! Domain types: observations, dated series, and the consolidated table.

pub mod observation;
pub mod series;
pub mod table;

pub use observation::{Observation, TrackedSeries};
pub use series::Point;
pub use table::{ColumnCoverage, ConsolidatedTable, TableRow};

//! CycleLab Runner: pipelines, configuration and reports.
//!
//! This crate builds on `cyclelab-core` to provide:
//! - TOML configuration of the tracked series and report windows
//! - Update, rebuild and backfill runs against the persisted table
//! - Report builders (weekday, holiday, distribution, yearly, cycle,
//!   monthly, year-to-date, daily, weekly yield) and their JSON/CSV export

pub mod config;
pub mod export;
pub mod pipeline;
pub mod reports;

pub use config::{ConfigError, DataConfig, LabConfig, ReportConfig};
pub use export::{export_csv, export_json, write_report};
pub use pipeline::{
    run_backfill, run_rebuild, run_update, PipelineError, RunKind, RunOutcome, SymbolFailure,
};
pub use reports::{build, build_all, Report, ReportContext, ReportKind};

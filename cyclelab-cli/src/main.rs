//! CycleLab CLI: keep the market table current and build reports from it.
//!
//! Commands:
//! - `update` merge the last few days of every series into the table
//! - `rebuild` refetch full history and write a fresh table
//! - `backfill` refetch full history for selected columns
//! - `report` build one report (or all of them) as JSON/CSV
//! - `status` show table coverage and sidecar integrity
//! - `export-parquet` write a Parquet snapshot of the table

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use cyclelab_core::analytics::as_of_year;
use cyclelab_core::data::{export_parquet, CircuitBreaker, TableStore, YahooProvider};
use cyclelab_runner::reports::{self, ReportContext, ReportKind};
use cyclelab_runner::{run_backfill, run_rebuild, run_update, write_report, LabConfig, RunOutcome};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "cyclelab",
    version,
    about = "CycleLab CLI: consolidated market table and seasonal analytics"
)]
struct Cli {
    /// Path to the TOML config. Built-in defaults apply when it is missing.
    #[arg(long, global = true, default_value = "cyclelab.toml")]
    config: PathBuf,

    /// Override the table path from the config.
    #[arg(long, global = true)]
    table: Option<PathBuf>,

    /// Debug-level logging (RUST_LOG takes precedence).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge the recent window of every configured series into the table.
    Update,
    /// Refetch full history for every series and replace the table.
    Rebuild,
    /// Refetch full history for the given columns.
    Backfill {
        /// Column names as configured (e.g. "Nikkei 225").
        #[arg(required = true)]
        columns: Vec<String>,

        /// Drop the columns' existing history before merging.
        #[arg(long, default_value_t = false)]
        replace: bool,
    },
    /// Build a report: weekday, holiday, distribution, yearly, cycle,
    /// monthly, ytd, daily, yield, or all.
    Report {
        #[arg(default_value = "all")]
        kind: String,

        /// Year shown by the daily report. Defaults to the as-of year.
        #[arg(long)]
        year: Option<i32>,

        /// Override the as-of year (defaults to the year of the last row).
        #[arg(long)]
        as_of: Option<i32>,

        /// Output directory. Defaults to the configured one.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Show rows, per-column coverage and sidecar integrity.
    Status,
    /// Write the table as a Parquet file.
    ExportParquet {
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = LabConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config {}", cli.config.display()))?;
    if let Some(table) = cli.table {
        config.data.table_path = table;
    }
    let store = TableStore::new(&config.data.table_path);
    tracing::debug!(
        config = %cli.config.display(),
        table = %store.path().display(),
        series = config.series.len(),
        "configuration loaded"
    );

    match cli.command {
        Commands::Update => {
            let provider = provider()?;
            print_outcome(&run_update(&config, &provider, &store)?, &store);
        }
        Commands::Rebuild => {
            let provider = provider()?;
            print_outcome(&run_rebuild(&config, &provider, &store)?, &store);
        }
        Commands::Backfill { columns, replace } => {
            let provider = provider()?;
            print_outcome(
                &run_backfill(&config, &provider, &store, &columns, replace)?,
                &store,
            );
        }
        Commands::Report {
            kind,
            year,
            as_of,
            output_dir,
        } => {
            let output_dir = output_dir.unwrap_or_else(|| config.report.output_dir.clone());
            run_report(&config, &store, &kind, year, as_of, &output_dir)?;
        }
        Commands::Status => run_status(&store)?,
        Commands::ExportParquet { path } => {
            let table = store.load()?;
            export_parquet(&table, &path)?;
            println!("Wrote {} rows to {}", table.len(), path.display());
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "cyclelab=debug,cyclelab_core=debug,cyclelab_runner=debug"
    } else {
        "cyclelab=info,cyclelab_core=info,cyclelab_runner=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // Stdout carries command output; logs go to stderr.
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn provider() -> Result<YahooProvider> {
    let circuit_breaker = Arc::new(CircuitBreaker::default_provider());
    Ok(YahooProvider::new(circuit_breaker)?)
}

fn print_outcome(outcome: &RunOutcome, store: &TableStore) {
    println!("Fetched: {}", outcome.fetched.join(", "));
    if !outcome.empty.is_empty() {
        println!("No data: {}", outcome.empty.join(", "));
    }
    for failure in &outcome.failures {
        eprintln!("Error for {}: {}", failure.column, failure.error);
    }

    match (&outcome.stats, &outcome.saved) {
        (Some(stats), Some(meta)) => {
            println!(
                "Merged {} observations: {} -> {} rows ({} new dates, {} cells written)",
                stats.observations,
                stats.rows_before,
                stats.rows_after,
                stats.dates_added,
                stats.cells_written
            );
            println!("Saved {} rows to {}", meta.rows, store.path().display());
        }
        _ => println!("No data fetched; {} left unchanged", store.path().display()),
    }
}

fn run_report(
    config: &LabConfig,
    store: &TableStore,
    kind: &str,
    daily_year: Option<i32>,
    as_of: Option<i32>,
    output_dir: &Path,
) -> Result<()> {
    let table = store.load()?;
    let Some(as_of_year) = as_of.or_else(|| as_of_year(&table)) else {
        bail!("table {} has no rows", store.path().display());
    };

    let mut ctx = ReportContext::new(&table, config.report.clone(), as_of_year);
    if let Some(year) = daily_year {
        ctx = ctx.with_daily_year(year);
    }

    let built = if kind.trim().eq_ignore_ascii_case("all") {
        reports::build_all(&ctx)
    } else {
        let kind: ReportKind = kind.parse().map_err(anyhow::Error::msg)?;
        vec![(kind, reports::build(kind, &ctx))]
    };

    println!("As-of year: {as_of_year}");
    let mut failed = 0;
    for (kind, result) in built {
        match result {
            Ok(report) => {
                let files = write_report(&report, output_dir)?;
                println!("{:<14} {} file(s)", kind.name(), files.len());
            }
            Err(e) => {
                failed += 1;
                eprintln!("{:<14} failed: {e}", kind.name());
            }
        }
    }
    println!("Reports written to: {}", output_dir.display());

    if failed > 0 {
        bail!("{failed} report(s) failed");
    }
    Ok(())
}

fn run_status(store: &TableStore) -> Result<()> {
    if !store.exists() {
        println!("Table does not exist: {}", store.path().display());
        return Ok(());
    }

    let table = store.load()?;
    println!("Table: {}", store.path().display());
    println!("Rows: {}", table.len());
    if let (Some(first), Some(last)) = (table.first_date(), table.last_date()) {
        println!("Dates: {first} to {last}");
    }

    match store.read_meta() {
        Some(meta) => {
            let verified = if store.verify()? { "ok" } else { "MISMATCH" };
            println!("Saved at: {} (hash {verified})", meta.saved_at.format("%Y-%m-%d %H:%M:%S UTC"));
        }
        None => println!("Saved at: (no sidecar)"),
    }

    println!();
    println!("{:<14} {:>8} {:<12} {:<12}", "Column", "Values", "First", "Last");
    println!("{}", "-".repeat(50));
    for c in table.coverage() {
        let first = c.first.map(|d| d.to_string()).unwrap_or_else(|| "-".into());
        let last = c.last.map(|d| d.to_string()).unwrap_or_else(|| "-".into());
        println!("{:<14} {:>8} {:<12} {:<12}", c.column, c.count, first, last);
    }

    Ok(())
}

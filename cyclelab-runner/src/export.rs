//! Report export: pretty JSON for every report, CSV for the tabular ones.
//!
//! Files are named after the report kind (`weekday.json`, `weekday.csv`, ...)
//! inside the output directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::reports::{
    DailyReport, DistributionReport, HolidayReport, MonthlyReport, Report, WeekdayReport,
    YearlyReport, YieldReport,
};

fn opt(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.6}")).unwrap_or_default()
}

// ─── JSON export ────────────────────────────────────────────────────

pub fn export_json(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report)
        .with_context(|| format!("failed to serialize {} report to JSON", report.kind()))
}

// ─── CSV export ─────────────────────────────────────────────────────

/// CSV rendering of a report, or `None` for the curve-shaped ones.
pub fn export_csv(report: &Report) -> Result<Option<String>> {
    let csv = match report {
        Report::Weekday(r) => Some(weekday_csv(r)?),
        Report::Holiday(r) => Some(holiday_csv(r)?),
        Report::Distribution(r) => Some(distribution_csv(r)?),
        Report::Yearly(r) => Some(yearly_csv(r)?),
        Report::Monthly(r) => Some(monthly_csv(r)?),
        Report::Daily(r) => Some(daily_csv(r)?),
        Report::Yield(r) => Some(yield_csv(r)?),
        Report::Cycle(_) | Report::Ytd(_) => None,
    };
    Ok(csv)
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}

pub fn weekday_csv(report: &WeekdayReport) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["range", "start_year", "end_year", "weekday", "avg_return", "hit_rate", "count"])?;
    for r in &report.ranges {
        for s in &r.stats {
            wtr.write_record(&[
                r.range.label.clone(),
                r.range.start_year.to_string(),
                r.range.end_year.to_string(),
                s.name.clone(),
                opt(s.avg_return),
                opt(s.hit_rate),
                s.count.to_string(),
            ])?;
        }
    }
    finish(wtr)
}

pub fn holiday_csv(report: &HolidayReport) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["range", "start_year", "end_year", "gap", "category", "avg_return", "count"])?;
    for r in &report.ranges {
        for effect in [&r.holiday, &r.long_holiday] {
            for (category, stat) in [
                ("before", &effect.before),
                ("after", &effect.after),
                ("other", &effect.other),
            ] {
                wtr.write_record(&[
                    r.range.label.clone(),
                    r.range.start_year.to_string(),
                    r.range.end_year.to_string(),
                    effect.threshold.to_string(),
                    category.to_string(),
                    opt(stat.avg_return),
                    stat.count.to_string(),
                ])?;
            }
        }
    }
    finish(wtr)
}

pub fn distribution_csv(report: &DistributionReport) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["range", "start_year", "end_year", "bucket", "count", "percent"])?;
    for r in &report.ranges {
        for b in &r.histogram.buckets {
            wtr.write_record(&[
                r.range.label.clone(),
                r.range.start_year.to_string(),
                r.range.end_year.to_string(),
                b.label.clone(),
                b.count.to_string(),
                opt(b.percent),
            ])?;
        }
    }
    finish(wtr)
}

pub fn yearly_csv(report: &YearlyReport) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["year", "phase", "first_close", "last_close", "return_pct"])?;
    for y in &report.years {
        wtr.write_record(&[
            y.year.to_string(),
            y.phase.label().to_string(),
            format!("{:.6}", y.first_close),
            format!("{:.6}", y.last_close),
            format!("{:.6}", y.return_pct),
        ])?;
    }
    finish(wtr)
}

pub fn monthly_csv(report: &MonthlyReport) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["column", "range", "start_year", "end_year", "month", "avg_return", "hit_rate", "count"])?;
    for c in &report.columns {
        for r in &c.ranges {
            for m in &r.stats {
                wtr.write_record(&[
                    c.column.clone(),
                    r.range.label.clone(),
                    r.range.start_year.to_string(),
                    r.range.end_year.to_string(),
                    m.name.clone(),
                    opt(m.avg_return),
                    opt(m.hit_rate),
                    m.count.to_string(),
                ])?;
            }
        }
    }
    finish(wtr)
}

pub fn daily_csv(report: &DailyReport) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "weekday", "close", "return_pct"])?;
    for row in &report.rows {
        wtr.write_record(&[
            row.date.to_string(),
            row.weekday.clone(),
            format!("{:.6}", row.close),
            opt(row.return_pct),
        ])?;
    }
    finish(wtr)
}

pub fn yield_csv(report: &YieldReport) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["week_end", "average"])?;
    for week in &report.weeks {
        wtr.write_record(&[week.date.to_string(), opt(week.value)])?;
    }
    finish(wtr)
}

// ─── Files ──────────────────────────────────────────────────────────

/// Write `report` into `dir`, returning the paths written.
pub fn write_report(report: &Report, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let name = report.kind().name();
    let mut written = Vec::new();

    let json_path = dir.join(format!("{name}.json"));
    fs::write(&json_path, export_json(report)?)
        .with_context(|| format!("failed to write {}", json_path.display()))?;
    written.push(json_path);

    if let Some(csv) = export_csv(report)? {
        let csv_path = dir.join(format!("{name}.csv"));
        fs::write(&csv_path, csv).with_context(|| format!("failed to write {}", csv_path.display()))?;
        written.push(csv_path);
    }

    tracing::info!(report = name, files = written.len(), dir = %dir.display(), "report written");
    Ok(written)
}

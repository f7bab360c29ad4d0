//! Every report built from a synthetic multi-year table.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use cyclelab_core::analytics::{AnalyticsError, CyclePhase};
use cyclelab_core::domain::{ConsolidatedTable, TableRow};
use cyclelab_runner::reports::{self, Report, ReportContext, ReportKind};
use cyclelab_runner::{write_report, ReportConfig};
use tempfile::TempDir;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// Weekday rows from 2018-01-02 to 2024-06-28 for three indices and the
/// treasury yield.
fn synthetic_table() -> ConsolidatedTable {
    let mut rows = Vec::new();
    let mut date = d(2018, 1, 2);
    let mut i = 0.0_f64;
    while date <= d(2024, 6, 28) {
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            let wobble = (i * 0.7).sin();
            rows.push(
                TableRow::new(date)
                    .with("S&P 500", 2500.0 + i * 0.8 + 20.0 * wobble)
                    .with("Nikkei 225", 21000.0 + i * 5.0 - 150.0 * wobble)
                    .with("TOPIX", 1700.0 + i * 0.4 + 10.0 * wobble)
                    .with("US 10-Year Treasury Yield", 2.5 + 0.1 * wobble),
            );
            i += 1.0;
        }
        date += Duration::days(1);
    }
    ConsolidatedTable::from_rows(
        vec![
            "S&P 500".into(),
            "Nikkei 225".into(),
            "TOPIX".into(),
            "US 10-Year Treasury Yield".into(),
        ],
        rows,
    )
}

fn context(table: &ConsolidatedTable) -> ReportContext<'_> {
    let mut config = ReportConfig::default();
    config.lookback_years = vec![5, 2];
    ReportContext::new(table, config, 2024)
}

#[test]
fn build_all_produces_every_report() {
    let table = synthetic_table();
    let ctx = context(&table);

    let built = reports::build_all(&ctx);
    assert_eq!(built.len(), ReportKind::ALL.len());
    for (kind, result) in built {
        let report = result.unwrap_or_else(|e| panic!("{kind} failed: {e}"));
        assert_eq!(report.kind(), kind);
    }
}

#[test]
fn ranges_are_all_time_then_lookbacks() {
    let table = synthetic_table();
    let ctx = context(&table);

    let Report::Weekday(report) = reports::build(ReportKind::Weekday, &ctx).unwrap() else {
        panic!("wrong report kind");
    };
    let labels: Vec<&str> = report.ranges.iter().map(|r| r.range.label.as_str()).collect();
    assert_eq!(labels, vec!["All Time", "Last 5 Years", "Last 2 Years"]);
    assert_eq!(report.ranges[0].range.start_year, 2018);
    assert_eq!(report.ranges[1].range.start_year, 2019);
    assert_eq!(report.ranges[2].range.start_year, 2022);
    assert!(report.ranges.iter().all(|r| r.range.end_year == 2024));

    // Five trading weekdays per range, each with observations.
    for range in &report.ranges {
        assert_eq!(range.stats.len(), 5);
        assert!(range.stats.iter().all(|s| s.count > 0));
    }
}

#[test]
fn distribution_counts_every_return_once() {
    let table = synthetic_table();
    let ctx = context(&table);

    let Report::Distribution(report) = reports::build(ReportKind::Distribution, &ctx).unwrap()
    else {
        panic!("wrong report kind");
    };
    // Lookbacks plus the extra short window.
    assert_eq!(report.ranges.len(), 4);
    for range in &report.ranges {
        let counted: usize = range.histogram.buckets.iter().map(|b| b.count).sum();
        assert_eq!(counted, range.histogram.total);
        assert_eq!(range.histogram.excluded, 0);
        assert_eq!(range.bands.total(), range.histogram.total);
    }
    // The all-time window holds one return per trading day but the first.
    assert_eq!(report.ranges[0].histogram.total, table.len() - 1);
}

#[test]
fn as_of_year_bounds_every_range() {
    let table = synthetic_table();
    let mut config = ReportConfig::default();
    config.lookback_years = vec![2];
    let ctx = ReportContext::new(&table, config, 2020);

    // Trading days through 2020, less the first row which has no return.
    let returns_to_2020 = table.dates().iter().filter(|d| d.year() <= 2020).count() - 1;
    assert_eq!(returns_to_2020, 782);

    let Report::Distribution(report) = reports::build(ReportKind::Distribution, &ctx).unwrap()
    else {
        panic!("wrong report kind");
    };
    // Every window clamps to 2018 and stops at 2020; later rows count nowhere.
    assert_eq!(report.ranges.len(), 3);
    for range in &report.ranges {
        assert_eq!(range.range.start_year, 2018);
        assert_eq!(range.range.end_year, 2020);
        assert_eq!(range.histogram.total, returns_to_2020);
    }

    let Report::Weekday(report) = reports::build(ReportKind::Weekday, &ctx).unwrap() else {
        panic!("wrong report kind");
    };
    let counted: usize = report.ranges[0].stats.iter().map(|s| s.count).sum();
    assert_eq!(counted, returns_to_2020);

    let Report::Yearly(report) = reports::build(ReportKind::Yearly, &ctx).unwrap() else {
        panic!("wrong report kind");
    };
    let years: Vec<i32> = report.years.iter().map(|y| y.year).collect();
    assert_eq!(years, vec![2020, 2019, 2018]);
}

#[test]
fn yield_report_averages_each_week() {
    let table = synthetic_table();
    let ctx = context(&table);

    let Report::Yield(report) = reports::build(ReportKind::Yield, &ctx).unwrap() else {
        panic!("wrong report kind");
    };
    assert_eq!(report.column, "US 10-Year Treasury Yield");
    assert_eq!(report.weeks.len(), 339);
    assert_eq!(report.weeks[0].date, d(2018, 1, 7));
    assert_eq!(report.weeks.last().unwrap().date, d(2024, 6, 30));
    assert!(report.weeks.iter().all(|w| w.date.weekday() == Weekday::Sun));
    assert!(report
        .weeks
        .iter()
        .all(|w| (2.4..=2.6).contains(&w.value.unwrap())));

    let dir = TempDir::new().unwrap();
    write_report(&Report::Yield(report), dir.path()).unwrap();
    let csv = std::fs::read_to_string(dir.path().join("yield.csv")).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("week_end,average"));
    assert_eq!(lines.count(), 339);
}

#[test]
fn yearly_summary_is_newest_first() {
    let table = synthetic_table();
    let ctx = context(&table);

    let Report::Yearly(report) = reports::build(ReportKind::Yearly, &ctx).unwrap() else {
        panic!("wrong report kind");
    };
    let years: Vec<i32> = report.years.iter().map(|y| y.year).collect();
    assert_eq!(years, vec![2024, 2023, 2022, 2021, 2020, 2019, 2018]);
    assert_eq!(report.years[0].phase, CyclePhase::Election);
    assert_eq!(report.years[1].phase, CyclePhase::PreElection);
}

#[test]
fn daily_report_measures_first_day_against_prior_year() {
    let table = synthetic_table();
    let ctx = context(&table).with_daily_year(2024);

    let Report::Daily(report) = reports::build(ReportKind::Daily, &ctx).unwrap() else {
        panic!("wrong report kind");
    };
    assert_eq!(report.year, 2024);
    assert_eq!(report.rows[0].date, d(2024, 6, 28));

    let first = report.rows.last().unwrap();
    assert_eq!(first.date, d(2024, 1, 1));
    assert_eq!(first.weekday, "Monday");
    assert!(first.return_pct.is_some(), "first day of the year keeps its return");
}

#[test]
fn cycle_report_tracks_current_phase() {
    let table = synthetic_table();
    let ctx = context(&table);

    let Report::Cycle(report) = reports::build(ReportKind::Cycle, &ctx).unwrap() else {
        panic!("wrong report kind");
    };
    assert_eq!(report.current_phase, CyclePhase::Election);
    assert!(!report.current_year.is_empty());

    let all_time = &report.ranges[0];
    assert_eq!(all_time.phases.len(), 4);
    let election = all_time
        .phases
        .iter()
        .find(|p| p.phase == CyclePhase::Election)
        .unwrap();
    assert_eq!(election.years, vec![2020, 2024]);
}

#[test]
fn missing_target_column_is_reported() {
    let table = synthetic_table();
    let mut config = ReportConfig::default();
    config.target = "DAX".to_string();
    let ctx = ReportContext::new(&table, config, 2024);

    let err = reports::build(ReportKind::Weekday, &ctx).unwrap_err();
    assert!(matches!(err, AnalyticsError::ColumnUnavailable { .. }));

    // Seasonal reports use their own columns and still build.
    assert!(reports::build(ReportKind::Monthly, &ctx).is_ok());
    assert!(reports::build(ReportKind::Ytd, &ctx).is_ok());
}

#[test]
fn reports_are_written_as_json_and_csv() {
    let table = synthetic_table();
    let ctx = context(&table);
    let dir = TempDir::new().unwrap();

    let weekday = reports::build(ReportKind::Weekday, &ctx).unwrap();
    let written = write_report(&weekday, dir.path()).unwrap();
    assert_eq!(written.len(), 2);
    assert!(dir.path().join("weekday.json").is_file());

    let csv = std::fs::read_to_string(dir.path().join("weekday.csv")).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("range,start_year,end_year,weekday,avg_return,hit_rate,count")
    );
    // Three ranges of five weekdays.
    assert_eq!(lines.count(), 15);

    let json = std::fs::read_to_string(dir.path().join("weekday.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["kind"], "weekday");

    // Curve-shaped reports only get JSON.
    let cycle = reports::build(ReportKind::Cycle, &ctx).unwrap();
    let written = write_report(&cycle, dir.path()).unwrap();
    assert_eq!(written, vec![dir.path().join("cycle.json")]);
}

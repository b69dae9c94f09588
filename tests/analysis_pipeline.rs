//! Analysis Pipeline Integration Test
//!
//! Exercises the public path end to end:
//! load fleet CSV -> select fan / date window -> normalize + score + classify -> reports.

use chrono::NaiveDate;
use fanwatch::{
    normalize_all, ConditionAnalyzer, ConditionScorer, DateRange, FanStatus, FleetAggregator,
    FleetTable, Metric, TelemetryError,
};
use std::io::Write;
use std::path::PathBuf;

/// Sample fleet export that ships with the repo.
fn sample_csv_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/fan_data.csv")
}

fn load_sample() -> FleetTable {
    FleetTable::load(sample_csv_path()).expect("Failed to load sample fleet CSV")
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

#[test]
fn sample_table_lists_fans_in_file_order() {
    let table = load_sample();
    assert_eq!(table.len(), 8);
    assert_eq!(table.fan_ids(), vec!["FAN-001", "FAN-002", "FAN-003"]);
}

#[test]
fn full_series_latest_at_every_maximum_scores_fifty() {
    let table = load_sample();
    let series = table.series_for("FAN-001").unwrap();

    let normalized = normalize_all(&series).unwrap();
    for metric in Metric::ALL {
        let values = normalized.series(metric).unwrap();
        assert_eq!(values.len(), 4);
        assert_eq!(values[0], 0.0, "{metric} minimum");
        assert_eq!(values[3], 1.0, "{metric} maximum");
    }

    let score = ConditionScorer::default().score(&normalized).unwrap();
    assert!((score.value() - 50.0).abs() < 1e-9, "Score: {}", score);
}

#[test]
fn narrower_window_rescales_against_its_own_extremes() {
    let table = load_sample();
    let series = table.series_for("FAN-001").unwrap();
    let range = DateRange::new(day(1), day(3)).unwrap();

    let report = ConditionAnalyzer::default()
        .analyze_window(&series, &range)
        .unwrap();

    // Latest in window is day 3: power 0.4, temp 0.5, airflow 0.4, vibration 0.5
    assert_eq!(report.reading_count, 3);
    assert!((report.normalized_metrics[&Metric::PowerKw] - 0.4).abs() < 1e-12);
    assert!((report.normalized_metrics[&Metric::MotorTempC] - 0.5).abs() < 1e-12);
    let score = report.condition_score.value();
    assert!((score - 45.0).abs() < 1e-9, "Score: {}", score);
    assert_eq!(report.window_end_timestamp.date_naive(), day(3));
    assert_eq!(report.kpis.operational_status.to_string(), "Idle");
}

#[test]
fn fleet_has_exactly_one_critical_fan() {
    let table = load_sample();
    let fleet = table.fleet().unwrap();

    let summary = FleetAggregator::default().aggregate(&fleet).unwrap();
    let order: Vec<&str> = summary.rows.iter().map(|r| r.fan_id.as_str()).collect();
    assert_eq!(order, vec!["FAN-001", "FAN-002", "FAN-003"]);
    assert_eq!(summary.critical_set.len(), 1);
    assert!(summary.critical_set.contains("FAN-002"));

    // FAN-002's hot reading is first in the file but latest by date
    assert_eq!(summary.rows[1].latest.motor_temp_c, 85.0);
    // FAN-003 sits exactly on the vibration limit
    assert_eq!(summary.rows[2].status, FanStatus::Normal);
}

#[test]
fn fleet_report_matches_aggregate() {
    let table = load_sample();
    let report = ConditionAnalyzer::default()
        .analyze_fleet(&table.fleet().unwrap())
        .unwrap();

    assert_eq!(report.fans.len(), 3);
    assert_eq!(report.normal_fans(), vec!["FAN-001", "FAN-003"]);
    let hot = report.get("FAN-002").unwrap();
    assert_eq!(hot.status, FanStatus::Critical);
    assert_eq!(hot.kpis.power_rating_kw, 12.0);
    for fan in &report.fans {
        let score = fan.condition_score.value();
        assert!((0.0..=100.0).contains(&score), "{}: {}", fan.fan_id, score);
    }
}

#[test]
fn empty_date_window_is_invalid_range() {
    let table = load_sample();
    let series = table.series_for("FAN-002").unwrap();
    let range = DateRange::new(day(10), day(12)).unwrap();

    let err = ConditionAnalyzer::default()
        .analyze_window(&series, &range)
        .unwrap_err();
    assert!(matches!(err, TelemetryError::InvalidRange { .. }));
}

#[test]
fn header_only_file_yields_empty_window_on_analysis() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "date,Fan ID,Power Consumption (kW),Motor Temp (°C),Operational Status,\
         Airflow (m³/s),Vibration (mm/s),Power Rating (kW),Notes"
    )
    .unwrap();

    let table = FleetTable::load(file.path()).unwrap();
    assert!(table.is_empty());
    assert!(table.fleet().unwrap().is_empty());

    let series = fanwatch::FanSeries::new("FAN-404", Vec::new()).unwrap();
    assert!(matches!(
        ConditionAnalyzer::default().analyze_fan(&series),
        Err(TelemetryError::EmptyWindow { .. })
    ));
}

#[test]
fn missing_file_is_io_error() {
    let err = FleetTable::load("/definitely/missing/fan_data.csv").unwrap_err();
    assert!(matches!(err, TelemetryError::Io(_)));
}

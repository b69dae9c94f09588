//! Shared data structures for fan telemetry analysis
//!
//! - Ingestion: `SensorReading`, `OperationalStatus`
//! - Windows: `FanSeries` (one fan, ascending by timestamp)
//! - Derived: `NormalizedMetricSet`, `ConditionScore`, `ConditionBand`, `FanStatus`
//!
//! Derived values are rebuilt from scratch on every selection change; nothing
//! here is mutated after construction.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Result, TelemetryError};

// ============================================================================
// Metrics
// ============================================================================

/// The four numeric metrics that feed normalization and scoring.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    PowerKw,
    MotorTempC,
    AirflowM3s,
    VibrationMms,
}

impl Metric {
    /// All scored metrics, in weight-table order.
    pub const ALL: [Self; 4] = [
        Self::PowerKw,
        Self::MotorTempC,
        Self::AirflowM3s,
        Self::VibrationMms,
    ];

    /// Stable snake_case key used in reports and config.
    pub const fn key(self) -> &'static str {
        match self {
            Self::PowerKw => "power_kw",
            Self::MotorTempC => "motor_temp_c",
            Self::AirflowM3s => "airflow_m3s",
            Self::VibrationMms => "vibration_mms",
        }
    }

    /// Column heading in the tabular source.
    pub const fn column(self) -> &'static str {
        match self {
            Self::PowerKw => "Power Consumption (kW)",
            Self::MotorTempC => "Motor Temp (°C)",
            Self::AirflowM3s => "Airflow (m³/s)",
            Self::VibrationMms => "Vibration (mm/s)",
        }
    }

    /// Read this metric's raw value off a reading.
    pub const fn value_of(self, reading: &SensorReading) -> f64 {
        match self {
            Self::PowerKw => reading.power_kw,
            Self::MotorTempC => reading.motor_temp_c,
            Self::AirflowM3s => reading.airflow_m3s,
            Self::VibrationMms => reading.vibration_mms,
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

// ============================================================================
// Readings
// ============================================================================

/// Operational status label reported by the fan controller.
///
/// Known labels are matched case-insensitively; anything else is kept verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
pub enum OperationalStatus {
    #[default]
    Running,
    Idle,
    Maintenance,
    Fault,
    Other(String),
}

impl OperationalStatus {
    pub fn from_label(label: &str) -> Self {
        let trimmed = label.trim();
        match trimmed.to_lowercase().as_str() {
            "running" | "operational" | "active" | "on" => Self::Running,
            "idle" | "standby" | "off" => Self::Idle,
            "maintenance" | "under maintenance" | "service" => Self::Maintenance,
            "fault" | "faulty" | "failed" | "failure" | "error" => Self::Fault,
            _ => Self::Other(trimmed.to_string()),
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Self::Running => "Running",
            Self::Idle => "Idle",
            Self::Maintenance => "Maintenance",
            Self::Fault => "Fault",
            Self::Other(label) => label,
        }
    }
}

impl std::fmt::Display for OperationalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One row of fan telemetry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SensorReading {
    pub fan_id: String,
    pub timestamp: DateTime<Utc>,
    /// Power consumption (kW), >= 0
    pub power_kw: f64,
    /// Motor temperature (°C)
    pub motor_temp_c: f64,
    /// Airflow (m³/s), >= 0
    pub airflow_m3s: f64,
    /// Vibration velocity (mm/s), >= 0
    pub vibration_mms: f64,
    /// Nameplate power rating (kW), > 0
    pub power_rating_kw: f64,
    pub operational_status: OperationalStatus,
    #[serde(default)]
    pub notes: String,
}

impl SensorReading {
    /// Fraction of nameplate rating currently drawn.
    pub fn power_load_fraction(&self) -> f64 {
        self.power_kw / self.power_rating_kw
    }
}

// ============================================================================
// Fan Series
// ============================================================================

/// Time-ordered readings for a single fan.
///
/// Invariant: every reading carries `fan_id`, and readings are sorted
/// ascending by timestamp. May be empty; computations reject empty series.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FanSeries {
    fan_id: String,
    readings: Vec<SensorReading>,
}

impl FanSeries {
    /// Build a series, sorting by timestamp (stable, so equal timestamps keep
    /// their source order).
    pub fn new(fan_id: impl Into<String>, mut readings: Vec<SensorReading>) -> Result<Self> {
        let fan_id = fan_id.into();
        if let Some(stray) = readings.iter().find(|r| r.fan_id != fan_id) {
            return Err(TelemetryError::MixedFanSeries {
                expected: fan_id,
                found: stray.fan_id.clone(),
            });
        }
        readings.sort_by_key(|r| r.timestamp);
        Ok(Self { fan_id, readings })
    }

    pub fn fan_id(&self) -> &str {
        &self.fan_id
    }

    pub fn readings(&self) -> &[SensorReading] {
        &self.readings
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Reading with the maximum timestamp. Ties resolve to the later entry.
    pub fn latest(&self) -> Option<&SensorReading> {
        self.readings.iter().max_by_key(|r| r.timestamp)
    }

    /// Calendar dates of the first and last reading.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.readings.iter().map(|r| r.timestamp).min()?;
        let last = self.readings.iter().map(|r| r.timestamp).max()?;
        Some((first.date_naive(), last.date_naive()))
    }

    /// Like [`latest`](Self::latest), but an empty series is an
    /// `EmptyWindow` error naming this fan.
    pub fn latest_reading(&self) -> Result<&SensorReading> {
        self.latest().ok_or_else(|| TelemetryError::EmptyWindow {
            fan_id: Some(self.fan_id.clone()),
        })
    }

    pub(crate) fn filtered<F>(&self, keep: F) -> Self
    where
        F: Fn(&SensorReading) -> bool,
    {
        Self {
            fan_id: self.fan_id.clone(),
            readings: self.readings.iter().filter(|&r| keep(r)).cloned().collect(),
        }
    }
}

// ============================================================================
// Derived Values
// ============================================================================

/// Per-metric values rescaled to [0,1], aligned index-for-index with the
/// source window.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct NormalizedMetricSet {
    values: BTreeMap<Metric, Vec<f64>>,
    len: usize,
}

impl NormalizedMetricSet {
    pub(crate) fn from_columns(values: BTreeMap<Metric, Vec<f64>>, len: usize) -> Self {
        Self { values, len }
    }

    /// Number of aligned entries per metric (the window length).
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when no metric carries any value.
    pub fn is_empty(&self) -> bool {
        self.len == 0 || self.values.is_empty()
    }

    pub fn metrics(&self) -> impl Iterator<Item = Metric> + '_ {
        self.values.keys().copied()
    }

    /// Full normalized trend for one metric.
    pub fn series(&self, metric: Metric) -> Option<&[f64]> {
        self.values.get(&metric).map(Vec::as_slice)
    }

    /// Normalized value of the most recent reading.
    pub fn latest(&self, metric: Metric) -> Option<f64> {
        self.values.get(&metric).and_then(|v| v.last().copied())
    }

    /// Most recent normalized value for every metric present.
    pub fn latest_values(&self) -> BTreeMap<Metric, f64> {
        self.values
            .iter()
            .filter_map(|(m, v)| v.last().map(|last| (*m, *last)))
            .collect()
    }
}

/// Composite condition score in [0,100]; higher is healthier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, PartialOrd)]
#[serde(transparent)]
pub struct ConditionScore(f64);

impl ConditionScore {
    pub(crate) const fn new(value: f64) -> Self {
        Self(value)
    }

    pub const fn value(self) -> f64 {
        self.0
    }
}

impl std::fmt::Display for ConditionScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Coarse reading of a condition score, matching the dashboard gauge zones.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ConditionBand {
    Poor,
    Fair,
    Good,
}

impl std::fmt::Display for ConditionBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Poor => write!(f, "Poor"),
            Self::Fair => write!(f, "Fair"),
            Self::Good => write!(f, "Good"),
        }
    }
}

/// Binary safety classification of a fan's latest reading.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum FanStatus {
    Critical,
    #[default]
    Normal,
}

impl FanStatus {
    pub const fn is_critical(self) -> bool {
        matches!(self, Self::Critical)
    }
}

impl std::fmt::Display for FanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Critical => write!(f, "Critical"),
            Self::Normal => write!(f, "Normal"),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::reading;
    use super::*;

    #[test]
    fn test_series_sorts_ascending() {
        let series = FanSeries::new(
            "F1",
            vec![
                reading("F1", 3, 1.0, 40.0, 10.0, 2.0),
                reading("F1", 1, 2.0, 41.0, 11.0, 2.1),
                reading("F1", 2, 3.0, 42.0, 12.0, 2.2),
            ],
        )
        .unwrap();

        let days: Vec<u32> = series
            .readings()
            .iter()
            .map(|r| chrono::Datelike::day(&r.timestamp))
            .collect();
        assert_eq!(days, vec![1, 2, 3]);
        assert_eq!(series.latest().unwrap().power_kw, 1.0);
    }

    #[test]
    fn test_series_rejects_mixed_fans() {
        let err = FanSeries::new(
            "F1",
            vec![
                reading("F1", 1, 1.0, 40.0, 10.0, 2.0),
                reading("F2", 2, 1.0, 40.0, 10.0, 2.0),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, TelemetryError::MixedFanSeries { ref found, .. } if found == "F2"));
    }

    #[test]
    fn test_empty_series_requirement() {
        let series = FanSeries::new("F9", Vec::new()).unwrap();
        assert!(series.latest().is_none());
        assert!(series.date_span().is_none());
        assert!(matches!(
            series.latest_reading(),
            Err(TelemetryError::EmptyWindow { fan_id: Some(ref id) }) if id == "F9"
        ));
    }

    #[test]
    fn test_operational_status_labels() {
        assert_eq!(OperationalStatus::from_label(" running "), OperationalStatus::Running);
        assert_eq!(
            OperationalStatus::from_label("Under Maintenance"),
            OperationalStatus::Maintenance
        );
        assert_eq!(
            OperationalStatus::from_label("Degraded"),
            OperationalStatus::Other("Degraded".to_string())
        );
        assert_eq!(OperationalStatus::from_label("Degraded").to_string(), "Degraded");
    }

    #[test]
    fn test_power_load_fraction() {
        let r = reading("F1", 1, 7.5, 40.0, 10.0, 2.0);
        assert!((r.power_load_fraction() - 0.5).abs() < 1e-12);
    }
}

//! Structured analysis results handed to the presentation layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::processing::ThresholdBreach;
use crate::types::{
    ConditionBand, ConditionScore, FanStatus, Metric, OperationalStatus, SensorReading,
};

/// Headline figures of a fan's latest reading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FanKpis {
    pub power_kw: f64,
    pub motor_temp_c: f64,
    pub airflow_m3s: f64,
    pub vibration_mms: f64,
    pub power_rating_kw: f64,
    /// power_kw / power_rating_kw
    pub power_load_fraction: f64,
    pub operational_status: OperationalStatus,
}

impl From<&SensorReading> for FanKpis {
    fn from(r: &SensorReading) -> Self {
        Self {
            power_kw: r.power_kw,
            motor_temp_c: r.motor_temp_c,
            airflow_m3s: r.airflow_m3s,
            vibration_mms: r.vibration_mms,
            power_rating_kw: r.power_rating_kw,
            power_load_fraction: r.power_load_fraction(),
            operational_status: r.operational_status.clone(),
        }
    }
}

/// Analysis of one fan over one window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FanReport {
    pub fan_id: String,
    pub window_start: DateTime<Utc>,
    pub window_end_timestamp: DateTime<Utc>,
    pub reading_count: usize,
    /// Latest normalized value per metric
    pub normalized_metrics: BTreeMap<Metric, f64>,
    pub condition_score: ConditionScore,
    pub condition_band: ConditionBand,
    pub status: FanStatus,
    pub breaches: Vec<ThresholdBreach>,
    pub kpis: FanKpis,
}

impl FanReport {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Analysis of every fan, in caller order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FleetReport {
    pub fans: Vec<FanReport>,
    pub critical_set: BTreeSet<String>,
}

impl FleetReport {
    pub fn critical_count(&self) -> usize {
        self.critical_set.len()
    }

    /// Fan ids classified Normal, in caller order.
    pub fn normal_fans(&self) -> Vec<&str> {
        self.fans
            .iter()
            .filter(|f| !f.status.is_critical())
            .map(|f| f.fan_id.as_str())
            .collect()
    }

    pub fn get(&self, fan_id: &str) -> Option<&FanReport> {
        self.fans.iter().find(|f| f.fan_id == fan_id)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

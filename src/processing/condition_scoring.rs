//! Condition Scoring Module
//!
//! Deterministic weighted condition score (0-100) for a fan, computed from the
//! most recent entry of each normalized metric trend.
//!
//! # Scoring Algorithm
//!
//! - 30% Power consumption (direct: higher normalized draw scores higher)
//! - 30% Motor temperature (inverted: lower is better)
//! - 20% Airflow (direct: higher is better)
//! - 20% Vibration (inverted: lower is better)
//!
//! ```text
//! score = 100 × (w_p·power + w_t·(1 − temp) + w_a·airflow + w_v·(1 − vib))
//! ```
//!
//! Weights sum to 1.0, so the score stays in [0,100] whenever every normalized
//! input is in [0,1].

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::error::{Result, TelemetryError};
use crate::types::{ConditionBand, ConditionScore, Metric, NormalizedMetricSet};

/// Tolerance on the weight sum.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Per-metric weights of the condition score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScoreWeights {
    #[serde(default = "default_power_weight")]
    pub power: f64,
    #[serde(default = "default_motor_temp_weight")]
    pub motor_temp: f64,
    #[serde(default = "default_airflow_weight")]
    pub airflow: f64,
    #[serde(default = "default_vibration_weight")]
    pub vibration: f64,
}

fn default_power_weight() -> f64 {
    0.3
}
fn default_motor_temp_weight() -> f64 {
    0.3
}
fn default_airflow_weight() -> f64 {
    0.2
}
fn default_vibration_weight() -> f64 {
    0.2
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            power: default_power_weight(),
            motor_temp: default_motor_temp_weight(),
            airflow: default_airflow_weight(),
            vibration: default_vibration_weight(),
        }
    }
}

impl ScoreWeights {
    pub fn sum(&self) -> f64 {
        self.power + self.motor_temp + self.airflow + self.vibration
    }

    /// Problems that would let a score leave [0,100]: non-finite or negative
    /// weights, or a sum other than 1.0. Empty when the weights are usable.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        for (name, value) in [
            ("weights.power", self.power),
            ("weights.motor_temp", self.motor_temp),
            ("weights.airflow", self.airflow),
            ("weights.vibration", self.vibration),
        ] {
            if !value.is_finite() || value < 0.0 {
                problems.push(format!("{name} = {value} must be finite and >= 0"));
            }
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            problems.push(format!("weights must sum to 1.0 (got {sum:.6})"));
        }
        problems
    }
}

/// Score cut-offs for the Poor / Fair / Good bands.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ConditionBands {
    /// Scores below this are Poor
    #[serde(default = "default_fair_min")]
    pub fair_min: f64,
    /// Scores at or above this are Good
    #[serde(default = "default_good_min")]
    pub good_min: f64,
}

fn default_fair_min() -> f64 {
    50.0
}
fn default_good_min() -> f64 {
    75.0
}

impl Default for ConditionBands {
    fn default() -> Self {
        Self {
            fair_min: default_fair_min(),
            good_min: default_good_min(),
        }
    }
}

impl ConditionBands {
    pub fn band_for(&self, score: ConditionScore) -> ConditionBand {
        let value = score.value();
        if value >= self.good_min {
            ConditionBand::Good
        } else if value >= self.fair_min {
            ConditionBand::Fair
        } else {
            ConditionBand::Poor
        }
    }
}

/// Combines the latest normalized metric values into a single score.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConditionScorer {
    weights: ScoreWeights,
}

impl ConditionScorer {
    /// Fails with `ConfigError::Validation` unless the weights are finite,
    /// non-negative and sum to 1.0.
    pub fn new(weights: ScoreWeights) -> std::result::Result<Self, ConfigError> {
        let problems = weights.problems();
        if problems.is_empty() {
            Ok(Self { weights })
        } else {
            Err(ConfigError::Validation(problems))
        }
    }

    pub const fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    /// Calculate the condition score from the last element of each metric.
    ///
    /// Fails with `EmptyWindow` if the set has no elements and with
    /// `MissingMetric` if one of the four scored metrics was not normalized.
    pub fn score(&self, normalized: &NormalizedMetricSet) -> Result<ConditionScore> {
        if normalized.is_empty() {
            return Err(TelemetryError::EmptyWindow { fan_id: None });
        }

        let latest = |metric: Metric| {
            normalized
                .latest(metric)
                .ok_or(TelemetryError::MissingMetric(metric))
        };
        let power = latest(Metric::PowerKw)?;
        let temp = latest(Metric::MotorTempC)?;
        let airflow = latest(Metric::AirflowM3s)?;
        let vibration = latest(Metric::VibrationMms)?;

        let w = &self.weights;
        let score = 100.0
            * (w.power * power
                + w.motor_temp * (1.0 - temp)
                + w.airflow * airflow
                + w.vibration * (1.0 - vibration));

        Ok(ConditionScore::new(score))
    }
}

//! Critical/Normal classification of a single reading.
//!
//! A reading is Critical iff motor temperature or vibration is strictly above
//! its limit. Values equal to a limit are Normal.

use serde::{Deserialize, Serialize};

use crate::types::{FanStatus, SensorReading};

/// Safety limits above which a fan is flagged Critical.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CriticalThresholds {
    #[serde(default = "default_motor_temp_critical_c")]
    pub motor_temp_critical_c: f64,
    #[serde(default = "default_vibration_critical_mms")]
    pub vibration_critical_mms: f64,
}

fn default_motor_temp_critical_c() -> f64 {
    80.0
}
fn default_vibration_critical_mms() -> f64 {
    10.0
}

impl Default for CriticalThresholds {
    fn default() -> Self {
        Self {
            motor_temp_critical_c: default_motor_temp_critical_c(),
            vibration_critical_mms: default_vibration_critical_mms(),
        }
    }
}

/// Which limit a reading exceeded.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ThresholdBreach {
    MotorTemperature,
    Vibration,
}

impl std::fmt::Display for ThresholdBreach {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MotorTemperature => write!(f, "Motor temperature above limit"),
            Self::Vibration => write!(f, "Vibration above limit"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ThresholdClassifier {
    thresholds: CriticalThresholds,
}

impl ThresholdClassifier {
    pub const fn new(thresholds: CriticalThresholds) -> Self {
        Self { thresholds }
    }

    pub const fn thresholds(&self) -> &CriticalThresholds {
        &self.thresholds
    }

    pub fn classify(&self, reading: &SensorReading) -> FanStatus {
        if self.breaches(reading).is_empty() {
            FanStatus::Normal
        } else {
            FanStatus::Critical
        }
    }

    /// Limits exceeded by this reading, temperature first.
    pub fn breaches(&self, reading: &SensorReading) -> Vec<ThresholdBreach> {
        let mut breaches = Vec::with_capacity(2);
        if reading.motor_temp_c > self.thresholds.motor_temp_critical_c {
            breaches.push(ThresholdBreach::MotorTemperature);
        }
        if reading.vibration_mms > self.thresholds.vibration_critical_mms {
            breaches.push(ThresholdBreach::Vibration);
        }
        breaches
    }
}

//! Configuration Module
//!
//! Scoring weights, critical limits and condition bands loaded from TOML.
//!
//! ## Loading Order
//!
//! 1. `FANWATCH_CONFIG` environment variable (path to TOML file)
//! 2. `fanwatch.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ## Example
//!
//! ```toml
//! [thresholds]
//! motor_temp_critical_c = 80.0
//! vibration_critical_mms = 10.0
//!
//! [weights]
//! power = 0.3
//! motor_temp = 0.3
//! airflow = 0.2
//! vibration = 0.2
//!
//! [bands]
//! fair_min = 50.0
//! good_min = 75.0
//! ```

mod fan_config;
pub mod validation;

pub use fan_config::*;

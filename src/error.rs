//! Error taxonomy for fan telemetry analysis.
//!
//! Every failure is raised at the point of detection and propagated to the
//! caller unchanged. The only silent numeric rule in the crate is the
//! zero-variance normalization policy, which is not an error path.

use chrono::NaiveDate;
use thiserror::Error;

use crate::types::Metric;

/// Errors raised while loading, windowing or analyzing fan telemetry.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// No readings in the requested window or series.
    #[error("Empty window{}", fan_suffix(.fan_id))]
    EmptyWindow { fan_id: Option<String> },

    /// Required column missing, duplicated or header absent.
    #[error("Schema error: {0}")]
    Schema(String),

    /// Requested date range is inverted or selects nothing.
    #[error("Invalid date range {start}..={end}: {reason}")]
    InvalidRange {
        start: NaiveDate,
        end: NaiveDate,
        reason: String,
    },

    /// Non-numeric value in a numeric column, or an unparseable timestamp.
    #[error("Data type error at line {line}, column '{column}': cannot parse '{value}'")]
    DataType {
        line: usize,
        column: String,
        value: String,
    },

    /// Numeric value that violates the reading's physical constraints.
    #[error("Invalid value at line {line}, column '{column}': {value} (must be {constraint})")]
    InvalidValue {
        line: usize,
        column: String,
        value: f64,
        constraint: &'static str,
    },

    #[error("Fan series mixes fan ids: expected '{expected}', found '{found}'")]
    MixedFanSeries { expected: String, found: String },

    #[error("Unknown fan id: {0}")]
    UnknownFan(String),

    #[error("Metric not present in normalized set: {0}")]
    MissingMetric(Metric),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn fan_suffix(fan_id: &Option<String>) -> String {
    fan_id
        .as_ref()
        .map(|id| format!(" for fan {id}"))
        .unwrap_or_default()
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TelemetryError>;

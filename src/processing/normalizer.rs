//! Window-relative min-max normalization.
//!
//! Each metric is rescaled against its own extremes within the window:
//! `(value - min) / (max - min)`. A metric that never varies (including any
//! single-reading window) maps to exactly 0 for every reading.

use std::collections::BTreeMap;

use crate::error::{Result, TelemetryError};
use crate::types::{FanSeries, Metric, NormalizedMetricSet};

/// Normalize the requested metrics over `window`.
///
/// Duplicate entries in `metrics` are ignored. Fails with `EmptyWindow` when
/// the window has no readings.
pub fn normalize(window: &FanSeries, metrics: &[Metric]) -> Result<NormalizedMetricSet> {
    if window.is_empty() {
        return Err(TelemetryError::EmptyWindow {
            fan_id: Some(window.fan_id().to_string()),
        });
    }

    let mut columns = BTreeMap::new();
    for &metric in metrics {
        if columns.contains_key(&metric) {
            continue;
        }
        let raw: Vec<f64> = window.readings().iter().map(|r| metric.value_of(r)).collect();
        columns.insert(metric, rescale(&raw));
    }

    tracing::debug!(
        fan = window.fan_id(),
        readings = window.len(),
        metrics = columns.len(),
        "Normalized window"
    );

    Ok(NormalizedMetricSet::from_columns(columns, window.len()))
}

/// Normalize all four scored metrics.
pub fn normalize_all(window: &FanSeries) -> Result<NormalizedMetricSet> {
    normalize(window, &Metric::ALL)
}

fn rescale(raw: &[f64]) -> Vec<f64> {
    let min = raw.iter().copied().fold(f64::INFINITY, f64::min);
    let max = raw.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    if range > 0.0 {
        raw.iter().map(|v| (v - min) / range).collect()
    } else {
        vec![0.0; raw.len()]
    }
}

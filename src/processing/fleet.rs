//! Fleet-wide classification.
//!
//! Picks each fan's latest reading (by maximum timestamp, never by position),
//! classifies it and partitions the fleet into critical and normal fans.
//! Fans keep the caller's order.

use serde::Serialize;
use std::collections::BTreeSet;

use super::ThresholdClassifier;
use crate::error::Result;
use crate::types::{FanSeries, FanStatus, SensorReading};

/// One fan's line in the fleet summary.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FleetRow {
    pub fan_id: String,
    pub status: FanStatus,
    pub latest: SensorReading,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct FleetSummary {
    /// Fans in input order
    pub rows: Vec<FleetRow>,
    pub critical_set: BTreeSet<String>,
}

impl FleetSummary {
    pub fn critical_count(&self) -> usize {
        self.critical_set.len()
    }

    /// Fan ids classified Normal, in input order.
    pub fn normal_fans(&self) -> Vec<&str> {
        self.rows
            .iter()
            .filter(|row| !row.status.is_critical())
            .map(|row| row.fan_id.as_str())
            .collect()
    }

    pub fn is_critical(&self, fan_id: &str) -> bool {
        self.critical_set.contains(fan_id)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FleetAggregator {
    classifier: ThresholdClassifier,
}

impl FleetAggregator {
    pub const fn new(classifier: ThresholdClassifier) -> Self {
        Self { classifier }
    }

    /// Classify every fan's latest reading.
    ///
    /// Fails with `EmptyWindow` naming the first fan whose series is empty.
    pub fn aggregate(&self, fleet: &[FanSeries]) -> Result<FleetSummary> {
        let mut summary = FleetSummary {
            rows: Vec::with_capacity(fleet.len()),
            critical_set: BTreeSet::new(),
        };

        for series in fleet {
            let latest = series.latest_reading()?;

            let status = self.classifier.classify(latest);
            if status.is_critical() {
                summary.critical_set.insert(series.fan_id().to_string());
            }
            summary.rows.push(FleetRow {
                fan_id: series.fan_id().to_string(),
                status,
                latest: latest.clone(),
            });
        }

        tracing::info!(
            fans = summary.rows.len(),
            critical = summary.critical_count(),
            "Fleet classified"
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TelemetryError;
    use crate::types::test_support::reading;

    fn fleet() -> Vec<FanSeries> {
        vec![
            FanSeries::new(
                "FAN-C",
                vec![
                    reading("FAN-C", 1, 5.0, 60.0, 10.0, 2.0),
                    reading("FAN-C", 2, 5.0, 62.0, 10.0, 2.5),
                ],
            )
            .unwrap(),
            FanSeries::new(
                "FAN-A",
                vec![
                    reading("FAN-A", 1, 5.0, 70.0, 10.0, 3.0),
                    reading("FAN-A", 2, 5.0, 85.0, 10.0, 3.0),
                ],
            )
            .unwrap(),
            FanSeries::new("FAN-B", vec![reading("FAN-B", 1, 5.0, 55.0, 10.0, 9.0)]).unwrap(),
        ]
    }

    #[test]
    fn test_one_critical_fan_in_input_order() {
        let summary = FleetAggregator::default().aggregate(&fleet()).unwrap();

        let order: Vec<&str> = summary.rows.iter().map(|r| r.fan_id.as_str()).collect();
        assert_eq!(order, vec!["FAN-C", "FAN-A", "FAN-B"]);
        assert_eq!(summary.critical_count(), 1);
        assert!(summary.is_critical("FAN-A"));
        assert_eq!(summary.normal_fans(), vec!["FAN-C", "FAN-B"]);
    }

    #[test]
    fn test_latest_chosen_by_timestamp() {
        // An earlier hot reading must not decide the status
        let series = FanSeries::new(
            "FAN-X",
            vec![
                reading("FAN-X", 5, 5.0, 50.0, 10.0, 2.0),
                reading("FAN-X", 1, 5.0, 95.0, 10.0, 2.0),
            ],
        )
        .unwrap();
        let summary = FleetAggregator::default().aggregate(&[series]).unwrap();

        assert_eq!(summary.rows[0].status, FanStatus::Normal);
        assert_eq!(summary.rows[0].latest.motor_temp_c, 50.0);
    }

    #[test]
    fn test_empty_fan_is_an_error() {
        let mut fans = fleet();
        fans.push(FanSeries::new("FAN-EMPTY", Vec::new()).unwrap());

        let err = FleetAggregator::default().aggregate(&fans).unwrap_err();
        assert!(matches!(
            err,
            TelemetryError::EmptyWindow { fan_id: Some(ref id) } if id == "FAN-EMPTY"
        ));
    }

    #[test]
    fn test_empty_fleet_is_empty_summary() {
        let summary = FleetAggregator::default().aggregate(&[]).unwrap();
        assert!(summary.rows.is_empty());
        assert!(summary.critical_set.is_empty());
    }
}

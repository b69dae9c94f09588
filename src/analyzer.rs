//! Condition analysis service.
//!
//! Wires normalization, scoring and classification together and produces the
//! reports consumed by the presentation layer. Each call recomputes from the
//! window it is given; the analyzer holds configuration only.

use crate::acquisition::DateRange;
use crate::config::{ConfigError, FanwatchConfig};
use crate::error::Result;
use crate::processing::{
    normalize_all, ConditionBands, ConditionScorer, FleetAggregator, ThresholdClassifier,
};
use crate::report::{FanKpis, FanReport, FleetReport};
use crate::types::{FanSeries, FanStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConditionAnalyzer {
    scorer: ConditionScorer,
    classifier: ThresholdClassifier,
    bands: ConditionBands,
}

impl ConditionAnalyzer {
    /// Validates `config` first, so a hand-built config cannot push scores
    /// outside [0,100].
    pub fn new(config: &FanwatchConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            scorer: ConditionScorer::new(config.weights)?,
            classifier: ThresholdClassifier::new(config.thresholds),
            bands: config.bands,
        })
    }

    pub const fn scorer(&self) -> &ConditionScorer {
        &self.scorer
    }

    pub const fn classifier(&self) -> &ThresholdClassifier {
        &self.classifier
    }

    /// Score and classify one fan over its whole series.
    pub fn analyze_fan(&self, window: &FanSeries) -> Result<FanReport> {
        let status = self.classifier.classify(window.latest_reading()?);
        self.report(window, status)
    }

    /// Select `range` from the series, then analyze that window.
    pub fn analyze_window(&self, series: &FanSeries, range: &DateRange) -> Result<FanReport> {
        self.analyze_fan(&series.within(range)?)
    }

    /// Analyze every fan, keeping the caller's order.
    ///
    /// Each fan is normalized against its own series. Fails on the first
    /// empty series.
    pub fn analyze_fleet(&self, fleet: &[FanSeries]) -> Result<FleetReport> {
        let summary = FleetAggregator::new(self.classifier).aggregate(fleet)?;
        let fans = fleet
            .iter()
            .zip(&summary.rows)
            .map(|(series, row)| self.report(series, row.status))
            .collect::<Result<Vec<_>>>()?;

        Ok(FleetReport {
            fans,
            critical_set: summary.critical_set,
        })
    }

    fn report(&self, window: &FanSeries, status: FanStatus) -> Result<FanReport> {
        let latest = window.latest_reading()?;
        let first = window.readings().first().unwrap_or(latest);
        let normalized = normalize_all(window)?;
        let condition_score = self.scorer.score(&normalized)?;

        tracing::debug!(
            fan = window.fan_id(),
            readings = window.len(),
            score = condition_score.value(),
            status = %status,
            "Fan analyzed"
        );

        Ok(FanReport {
            fan_id: window.fan_id().to_string(),
            window_start: first.timestamp,
            window_end_timestamp: latest.timestamp,
            reading_count: window.len(),
            normalized_metrics: normalized.latest_values(),
            condition_score,
            condition_band: self.bands.band_for(condition_score),
            status,
            breaches: self.classifier.breaches(latest),
            kpis: FanKpis::from(latest),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TelemetryError;
    use crate::processing::ScoreWeights;
    use crate::types::test_support::reading;
    use crate::types::{ConditionBand, FanStatus, Metric};
    use chrono::NaiveDate;

    fn hot_fan() -> FanSeries {
        FanSeries::new(
            "FAN-HOT",
            vec![
                reading("FAN-HOT", 1, 5.0, 40.0, 10.0, 2.0),
                reading("FAN-HOT", 2, 10.0, 85.0, 20.0, 4.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_fan_report_contents() {
        let report = ConditionAnalyzer::default().analyze_fan(&hot_fan()).unwrap();

        assert_eq!(report.fan_id, "FAN-HOT");
        assert_eq!(report.reading_count, 2);
        assert!((report.condition_score.value() - 50.0).abs() < 1e-9);
        assert_eq!(report.condition_band, ConditionBand::Fair);
        assert_eq!(report.status, FanStatus::Critical);
        assert_eq!(report.normalized_metrics[&Metric::MotorTempC], 1.0);
        assert!((report.kpis.power_load_fraction - 10.0 / 15.0).abs() < 1e-12);
        assert!(report.window_start < report.window_end_timestamp);
    }

    #[test]
    fn test_window_narrows_normalization() {
        let analyzer = ConditionAnalyzer::default();
        let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
        let range = DateRange::new(day(2), day(2)).unwrap();

        let report = analyzer.analyze_window(&hot_fan(), &range).unwrap();
        assert_eq!(report.reading_count, 1);
        assert_eq!(report.normalized_metrics[&Metric::PowerKw], 0.0);
    }

    #[test]
    fn test_config_thresholds_apply() {
        let mut config = FanwatchConfig::default();
        config.thresholds.motor_temp_critical_c = 90.0;
        let report = ConditionAnalyzer::new(&config)
            .unwrap()
            .analyze_fan(&hot_fan())
            .unwrap();
        assert_eq!(report.status, FanStatus::Normal);
        assert!(report.breaches.is_empty());
    }

    #[test]
    fn test_hand_built_config_with_bad_weights_rejected() {
        let config = FanwatchConfig {
            weights: ScoreWeights {
                power: 1.0,
                ..ScoreWeights::default()
            },
            ..FanwatchConfig::default()
        };
        assert!(matches!(
            ConditionAnalyzer::new(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_hand_built_config_with_inverted_bands_rejected() {
        let mut config = FanwatchConfig::default();
        config.bands.fair_min = 90.0;
        assert!(ConditionAnalyzer::new(&config).is_err());
    }

    #[test]
    fn test_empty_fan_fails() {
        let empty = FanSeries::new("FAN-0", Vec::new()).unwrap();
        assert!(matches!(
            ConditionAnalyzer::default().analyze_fan(&empty),
            Err(TelemetryError::EmptyWindow { .. })
        ));
    }

    #[test]
    fn test_fleet_report_json() {
        let cool =
            FanSeries::new("FAN-COOL", vec![reading("FAN-COOL", 1, 7.0, 50.0, 15.0, 3.0)])
                .unwrap();
        let report = ConditionAnalyzer::default()
            .analyze_fleet(&[cool, hot_fan()])
            .unwrap();

        assert_eq!(report.normal_fans(), vec!["FAN-COOL"]);
        assert_eq!(report.critical_count(), 1);

        let json = report.to_json_pretty().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["critical_set"][0], "FAN-HOT");
        assert_eq!(value["fans"][0]["status"], "Normal");
        assert!(value["fans"][1]["normalized_metrics"]["motor_temp_c"].is_number());
    }

    #[test]
    fn test_fleet_statuses_match_single_fan_analysis() {
        let analyzer = ConditionAnalyzer::default();
        let fleet = [hot_fan()];
        let report = analyzer.analyze_fleet(&fleet).unwrap();
        assert_eq!(report.fans[0], analyzer.analyze_fan(&fleet[0]).unwrap());
    }

    #[test]
    fn test_fleet_with_empty_fan_names_it() {
        let empty = FanSeries::new("FAN-0", Vec::new()).unwrap();
        let err = ConditionAnalyzer::default()
            .analyze_fleet(&[hot_fan(), empty])
            .unwrap_err();
        assert!(matches!(
            err,
            TelemetryError::EmptyWindow { fan_id: Some(ref id) } if id == "FAN-0"
        ));
    }
}

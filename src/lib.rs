//! fanwatch: Industrial Fan Condition Analysis
//!
//! Turns per-fan telemetry windows into normalized metric trends, a weighted
//! condition score (0-100) and a Critical/Normal classification, for a single
//! fan or the whole fleet.
//!
//! ## Architecture
//!
//! - **Acquisition**: CSV fleet table loading and date-range windows
//! - **Processing**: min-max normalizer, condition scorer, threshold classifier, fleet aggregator
//! - **Analyzer**: side-effect-free service that runs the processing chain and builds reports
//! - **Config**: TOML-tunable weights, limits and score bands
//!
//! Every computation is a pure function of the window it receives; results are
//! rebuilt on each call and never stored.

pub mod acquisition;
pub mod analyzer;
pub mod config;
pub mod error;
pub mod processing;
pub mod report;
pub mod types;

pub use acquisition::{DateRange, FleetTable};
pub use analyzer::ConditionAnalyzer;
pub use config::FanwatchConfig;
pub use error::{Result, TelemetryError};
pub use processing::{
    normalize, normalize_all, ConditionScorer, FleetAggregator, FleetSummary, ThresholdClassifier,
};
pub use report::{FanKpis, FanReport, FleetReport};
pub use types::{
    ConditionBand, ConditionScore, FanSeries, FanStatus, Metric, NormalizedMetricSet,
    OperationalStatus, SensorReading,
};

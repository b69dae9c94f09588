//! Signal processing module - normalization, scoring and classification
//!
//! Components, leaves first:
//! - [`normalize`]: per-window min-max rescaling of each metric to [0,1]
//! - [`ConditionScorer`]: weighted composite score from the latest normalized values
//! - [`ThresholdClassifier`]: Critical/Normal from fixed temperature and vibration limits
//! - [`FleetAggregator`]: classifies every fan's latest reading and partitions the fleet
//!
//! Everything here is a pure function of its inputs.

mod classifier;
mod condition_scoring;
mod fleet;
mod normalizer;

pub use classifier::{CriticalThresholds, ThresholdBreach, ThresholdClassifier};
pub use condition_scoring::{ConditionBands, ConditionScorer, ScoreWeights};
pub use fleet::{FleetAggregator, FleetRow, FleetSummary};
pub use normalizer::{normalize, normalize_all};

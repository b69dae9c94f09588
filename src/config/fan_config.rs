//! Fan analysis configuration - scoring weights, critical limits and bands
//! as operator-tunable TOML values.
//!
//! Every field defaults to the built-in constants, so behavior is unchanged
//! when no config file is present.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::processing::{ConditionBands, CriticalThresholds, ScoreWeights};

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "FANWATCH_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "fanwatch.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration.
///
/// Load with `FanwatchConfig::load()` which searches:
/// 1. `$FANWATCH_CONFIG`
/// 2. `./fanwatch.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FanwatchConfig {
    /// Limits above which a fan is Critical
    #[serde(default)]
    pub thresholds: CriticalThresholds,

    /// Condition score weights
    #[serde(default)]
    pub weights: ScoreWeights,

    /// Poor / Fair / Good cut-offs
    #[serde(default)]
    pub bands: ConditionBands,
}

impl FanwatchConfig {
    /// Load configuration using the standard search order, falling back to
    /// defaults on any failure.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded config from {}", CONFIG_ENV_VAR);
                        return config;
                    }
                    Err(e) => {
                        warn!(
                            path = %p.display(),
                            error = %e,
                            "Failed to load config from {}, falling back",
                            CONFIG_ENV_VAR
                        );
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", CONFIG_ENV_VAR);
            }
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded config from ./{}", LOCAL_CONFIG_FILE);
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", LOCAL_CONFIG_FILE);
                }
            }
        }

        info!("No {} found, using built-in defaults", LOCAL_CONFIG_FILE);
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate a TOML document. Unknown keys and suspicious values
    /// are logged as warnings.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;

        for w in super::validation::validate_typical_ranges(&config) {
            warn!("{}", w);
        }
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Validate weights, thresholds and bands.
    ///
    /// Rules:
    /// - Weights finite, non-negative, summing to 1.0
    /// - Thresholds finite and positive
    /// - `0 <= fair_min <= good_min <= 100`
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = self.weights.problems();

        let t = &self.thresholds;
        for (name, value) in [
            ("thresholds.motor_temp_critical_c", t.motor_temp_critical_c),
            ("thresholds.vibration_critical_mms", t.vibration_critical_mms),
        ] {
            if !value.is_finite() || value <= 0.0 {
                errors.push(format!("{name} = {value} must be finite and > 0"));
            }
        }

        let b = &self.bands;
        if !b.fair_min.is_finite() || !b.good_min.is_finite() {
            errors.push(format!(
                "bands: values must be finite (got fair_min={}, good_min={})",
                b.fair_min, b.good_min
            ));
        } else if b.fair_min < 0.0 || b.good_min > 100.0 || b.fair_min > b.good_min {
            errors.push(format!(
                "bands: require 0 <= fair_min ({:.1}) <= good_min ({:.1}) <= 100",
                b.fair_min, b.good_min
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            Self::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            Self::Serialize(e) => write!(f, "Config serialization error: {}", e),
            Self::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {}", e)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = FanwatchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.thresholds.motor_temp_critical_c, 80.0);
        assert_eq!(config.thresholds.vibration_critical_mms, 10.0);
        assert_eq!(config.weights, ScoreWeights::default());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = FanwatchConfig::from_toml_str(
            r#"
[thresholds]
motor_temp_critical_c = 75.0
"#,
        )
        .unwrap();
        assert_eq!(config.thresholds.motor_temp_critical_c, 75.0);
        assert_eq!(config.thresholds.vibration_critical_mms, 10.0);
        assert_eq!(config.bands.good_min, 75.0);
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let err = FanwatchConfig::from_toml_str(
            r#"
[weights]
power = 0.5
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errs) if errs[0].contains("sum to 1.0")));
    }

    #[test]
    fn test_inverted_bands_rejected() {
        let mut config = FanwatchConfig::default();
        config.bands.fair_min = 80.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_nan_threshold_rejected() {
        let mut config = FanwatchConfig::default();
        config.thresholds.vibration_critical_mms = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = FanwatchConfig::default();
        let text = config.to_toml().unwrap();
        assert_eq!(FanwatchConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = FanwatchConfig::load_from_file(Path::new("/no/such/fanwatch.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(..)));
    }
}

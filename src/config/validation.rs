//! Config validation: unknown-key detection with Levenshtein suggestions
//! and typical-range checks.
//!
//! Unknown keys are found by walking the raw `toml::Value` tree before serde
//! deserialization. Warnings never break existing configs.

use std::collections::HashSet;

use super::FanwatchConfig;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

/// Every valid dotted key path of `FanwatchConfig`.
///
/// Kept in step with the structs in `fan_config.rs` and `processing`.
pub fn known_config_keys() -> HashSet<&'static str> {
    [
        "thresholds",
        "thresholds.motor_temp_critical_c",
        "thresholds.vibration_critical_mms",
        "weights",
        "weights.power",
        "weights.motor_temp",
        "weights.airflow",
        "weights.vibration",
        "bands",
        "bands.fair_min",
        "bands.good_min",
    ]
    .into_iter()
    .collect()
}

/// Recursively collect dotted key paths from a TOML tree.
///
/// A table `{ a = { b = 1, c = 2 } }` yields `["a", "a.b", "a.c"]`.
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

/// Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_chars.len()]
}

/// Closest known key within edit distance 3, ties broken alphabetically.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|k| (levenshtein(unknown, k), *k))
        .filter(|(dist, _)| *dist <= 3)
        .min()
        .map(|(_, k)| k.to_string())
}

/// Warnings for every unknown key in a raw TOML document.
///
/// Parse errors are left to serde and produce no warnings here.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let Ok(value) = toml::from_str::<toml::Value>(raw_toml) else {
        return Vec::new();
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

/// Warnings for valid but unusual limits.
///
/// Industrial fan motors rarely run with a critical limit outside 40-150 °C,
/// and ISO 10816 vibration zones sit well within 1-50 mm/s.
pub fn validate_typical_ranges(config: &FanwatchConfig) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let t = &config.thresholds;

    if !(40.0..=150.0).contains(&t.motor_temp_critical_c) {
        warnings.push(ValidationWarning {
            field: "thresholds.motor_temp_critical_c".to_string(),
            message: format!(
                "motor_temp_critical_c = {:.1} is outside typical range (40-150 °C)",
                t.motor_temp_critical_c
            ),
            suggestion: None,
        });
    }
    if !(1.0..=50.0).contains(&t.vibration_critical_mms) {
        warnings.push(ValidationWarning {
            field: "thresholds.vibration_critical_mms".to_string(),
            message: format!(
                "vibration_critical_mms = {:.1} is outside typical range (1-50 mm/s)",
                t.vibration_critical_mms
            ),
            suggestion: None,
        });
    }

    warnings
}

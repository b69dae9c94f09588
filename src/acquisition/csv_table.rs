//! Fan telemetry CSV loader
//!
//! Reads the delimited fleet export (one row per reading) into a
//! [`FleetTable`]. Expected header columns:
//!
//! `date, Fan ID, Power Consumption (kW), Motor Temp (°C), Operational Status,
//! Airflow (m³/s), Vibration (mm/s), Power Rating (kW), Notes`
//!
//! Columns may appear in any order and are matched case-insensitively.
//! snake_case aliases (`fan_id`, `power_kw`, ...) are also accepted. `Notes`
//! is optional.
//!
//! # Usage
//!
//! ```ignore
//! use fanwatch::acquisition::FleetTable;
//!
//! let table = FleetTable::load("fan_data.csv")?;
//! for fan in table.fan_ids() {
//!     let series = table.series_for(fan)?;
//! }
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::{Result, TelemetryError};
use crate::types::{FanSeries, Metric, OperationalStatus, SensorReading};

// ============================================================================
// Record Splitting
// ============================================================================

/// Splits CSV records fed one physical line at a time.
///
/// Quote state carries over between lines, so a quoted field (typically
/// `Notes`) may span several lines; the line break is kept in the value.
/// `""` inside a quoted field is a literal quote.
#[derive(Debug, Default)]
struct RecordSplitter {
    fields: Vec<String>,
    field: String,
    quoted: bool,
    /// A quote was just seen inside a quoted field: either it closes the
    /// field or it is the first half of `""`.
    quote_pending: bool,
}

impl RecordSplitter {
    /// True while a quoted field is still waiting for its closing quote.
    const fn is_open(&self) -> bool {
        self.quoted
    }

    /// Feed one line. Returns the record's fields once it is complete.
    fn push_line(&mut self, line: &str) -> Option<Vec<String>> {
        if self.quoted {
            self.field.push('\n');
        }

        for ch in line.chars() {
            if self.quote_pending {
                self.quote_pending = false;
                if ch == '"' {
                    self.field.push('"');
                    continue;
                }
                self.quoted = false;
            }
            match (self.quoted, ch) {
                (true, '"') => self.quote_pending = true,
                (false, '"') => self.quoted = true,
                (false, ',') => self.fields.push(std::mem::take(&mut self.field)),
                (_, c) => self.field.push(c),
            }
        }

        // A quote ending the line closes the field
        if self.quote_pending {
            self.quote_pending = false;
            self.quoted = false;
        }
        if self.quoted {
            return None;
        }
        self.fields.push(std::mem::take(&mut self.field));
        Some(std::mem::take(&mut self.fields))
    }
}

// ============================================================================
// Column Mapping
// ============================================================================

/// Required column headings and their accepted aliases (lowercase).
const DATE_NAMES: &[&str] = &["date", "timestamp"];
const FAN_ID_NAMES: &[&str] = &["fan id", "fan_id"];
const POWER_NAMES: &[&str] = &["power consumption (kw)", "power_kw"];
const MOTOR_TEMP_NAMES: &[&str] = &["motor temp (°c)", "motor temp (c)", "motor_temp_c"];
const STATUS_NAMES: &[&str] = &["operational status", "operational_status"];
const AIRFLOW_NAMES: &[&str] = &["airflow (m³/s)", "airflow (m3/s)", "airflow_m3s"];
const VIBRATION_NAMES: &[&str] = &["vibration (mm/s)", "vibration_mms"];
const RATING_NAMES: &[&str] = &["power rating (kw)", "power_rating_kw"];
const NOTES_NAMES: &[&str] = &["notes"];

/// Maps the header to field indices.
#[derive(Debug, Clone)]
struct ColumnMap {
    date: usize,
    fan_id: usize,
    power: usize,
    motor_temp: usize,
    status: usize,
    airflow: usize,
    vibration: usize,
    rating: usize,
    notes: Option<usize>,
    /// Fields a row needs to cover every required column
    min_width: usize,
}

impl ColumnMap {
    fn from_header(header: &str) -> Result<Self> {
        let columns: Vec<String> = RecordSplitter::default()
            .push_line(header)
            .ok_or_else(|| TelemetryError::Schema("unterminated quote in header".to_string()))?
            .iter()
            .map(|c| c.trim().trim_start_matches('\u{feff}').to_lowercase())
            .collect();

        let mut seen: HashMap<String, usize> = HashMap::new();
        for (idx, col) in columns.iter().enumerate() {
            if col.is_empty() {
                continue;
            }
            if seen.insert(col.clone(), idx).is_some() {
                return Err(TelemetryError::Schema(format!("duplicate column '{col}'")));
            }
        }

        let find = |names: &[&str]| names.iter().find_map(|n| seen.get(*n).copied());
        let require = |names: &[&str], label: &str| {
            find(names).ok_or_else(|| {
                TelemetryError::Schema(format!("missing required column '{label}'"))
            })
        };

        let mut map = Self {
            date: require(DATE_NAMES, "date")?,
            fan_id: require(FAN_ID_NAMES, "Fan ID")?,
            power: require(POWER_NAMES, "Power Consumption (kW)")?,
            motor_temp: require(MOTOR_TEMP_NAMES, "Motor Temp (°C)")?,
            status: require(STATUS_NAMES, "Operational Status")?,
            airflow: require(AIRFLOW_NAMES, "Airflow (m³/s)")?,
            vibration: require(VIBRATION_NAMES, "Vibration (mm/s)")?,
            rating: require(RATING_NAMES, "Power Rating (kW)")?,
            notes: find(NOTES_NAMES),
            min_width: 0,
        };
        map.min_width = [
            map.date,
            map.fan_id,
            map.power,
            map.motor_temp,
            map.status,
            map.airflow,
            map.vibration,
            map.rating,
        ]
        .into_iter()
        .max()
        .map_or(0, |idx| idx + 1);
        Ok(map)
    }
}

// ============================================================================
// Fleet Table
// ============================================================================

/// All readings of a fleet export, in file order.
#[derive(Debug, Clone, Default)]
pub struct FleetTable {
    readings: Vec<SensorReading>,
}

impl FleetTable {
    /// Load a CSV file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let table = Self::from_reader(BufReader::new(file))?;

        tracing::info!(
            file = %path.display(),
            readings = table.len(),
            fans = table.fan_ids().len(),
            "Fleet table loaded"
        );
        Ok(table)
    }

    /// Parse CSV text already in memory.
    pub fn parse(text: &str) -> Result<Self> {
        Self::from_reader(text.as_bytes())
    }

    /// Parse CSV from any buffered reader. The first non-blank line is the
    /// header. Errors report the line on which the offending record starts.
    pub fn from_reader(reader: impl BufRead) -> Result<Self> {
        let mut lines = reader.lines().enumerate();

        let col_map = loop {
            match lines.next() {
                Some((_, line)) => {
                    let line = line?;
                    if !line.trim().is_empty() {
                        break ColumnMap::from_header(&line)?;
                    }
                }
                None => return Err(TelemetryError::Schema("missing header row".to_string())),
            }
        };

        let mut readings = Vec::new();
        let mut splitter = RecordSplitter::default();
        let mut record_line = 0;
        for (idx, line) in lines {
            let line = line?;
            if !splitter.is_open() {
                if line.trim().is_empty() {
                    continue;
                }
                record_line = idx + 1;
            }
            if let Some(fields) = splitter.push_line(&line) {
                readings.push(parse_row(&fields, &col_map, record_line)?);
            }
        }
        if splitter.is_open() {
            return Err(TelemetryError::Schema(format!(
                "line {record_line}: unterminated quoted field"
            )));
        }

        Ok(Self { readings })
    }

    /// Build a table from readings already in memory.
    pub fn from_readings(readings: Vec<SensorReading>) -> Self {
        Self { readings }
    }

    pub fn readings(&self) -> &[SensorReading] {
        &self.readings
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Distinct fan ids in order of first appearance.
    pub fn fan_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for r in &self.readings {
            if !ids.contains(&r.fan_id.as_str()) {
                ids.push(&r.fan_id);
            }
        }
        ids
    }

    /// All readings for one fan, ascending by timestamp.
    pub fn series_for(&self, fan_id: &str) -> Result<FanSeries> {
        let readings: Vec<SensorReading> = self
            .readings
            .iter()
            .filter(|r| r.fan_id == fan_id)
            .cloned()
            .collect();
        if readings.is_empty() {
            return Err(TelemetryError::UnknownFan(fan_id.to_string()));
        }
        FanSeries::new(fan_id, readings)
    }

    /// One series per fan, in order of first appearance.
    pub fn fleet(&self) -> Result<Vec<FanSeries>> {
        self.fan_ids().into_iter().map(|id| self.series_for(id)).collect()
    }
}

// ============================================================================
// Row Parsing
// ============================================================================

fn parse_row(fields: &[String], col_map: &ColumnMap, line_num: usize) -> Result<SensorReading> {
    if fields.len() < col_map.min_width {
        return Err(TelemetryError::Schema(format!(
            "line {line_num}: expected at least {} fields, found {}",
            col_map.min_width,
            fields.len()
        )));
    }
    let field = |idx: usize| fields.get(idx).map_or("", |s| s.trim());

    let date_raw = field(col_map.date);
    let timestamp = parse_datetime_string(date_raw).ok_or_else(|| TelemetryError::DataType {
        line: line_num,
        column: "date".to_string(),
        value: date_raw.to_string(),
    })?;

    let fan_id = field(col_map.fan_id);
    if fan_id.is_empty() {
        return Err(TelemetryError::DataType {
            line: line_num,
            column: "Fan ID".to_string(),
            value: String::new(),
        });
    }

    let number = |idx: usize, column: &str| parse_number(field(idx), column, line_num);
    let metric = |idx: usize, m: Metric| number(idx, m.column());
    let measured = |idx: usize, m: Metric| non_negative(metric(idx, m)?, m, line_num);
    let power_kw = measured(col_map.power, Metric::PowerKw)?;
    let motor_temp_c = metric(col_map.motor_temp, Metric::MotorTempC)?;
    let airflow_m3s = measured(col_map.airflow, Metric::AirflowM3s)?;
    let vibration_mms = measured(col_map.vibration, Metric::VibrationMms)?;
    let power_rating_kw = number(col_map.rating, "Power Rating (kW)")?;
    if power_rating_kw <= 0.0 {
        return Err(TelemetryError::InvalidValue {
            line: line_num,
            column: "Power Rating (kW)".to_string(),
            value: power_rating_kw,
            constraint: "> 0",
        });
    }

    Ok(SensorReading {
        fan_id: fan_id.to_string(),
        timestamp,
        power_kw,
        motor_temp_c,
        airflow_m3s,
        vibration_mms,
        power_rating_kw,
        operational_status: OperationalStatus::from_label(field(col_map.status)),
        notes: col_map.notes.map(|idx| field(idx).to_string()).unwrap_or_default(),
    })
}

/// Parse a finite f64; NaN, infinities and non-numeric text are type errors.
fn parse_number(raw: &str, column: &str, line: usize) -> Result<f64> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| TelemetryError::DataType {
            line,
            column: column.to_string(),
            value: raw.to_string(),
        })
}

fn non_negative(value: f64, metric: Metric, line: usize) -> Result<f64> {
    if value < 0.0 {
        return Err(TelemetryError::InvalidValue {
            line,
            column: metric.column().to_string(),
            value,
            constraint: ">= 0",
        });
    }
    Ok(value)
}

/// Parse the supported timestamp formats to UTC.
fn parse_datetime_string(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim().trim_matches('"');
    if s.is_empty() {
        return None;
    }

    // Unix epoch seconds
    if let Ok(epoch) = s.parse::<i64>() {
        return DateTime::from_timestamp(epoch, 0);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(dt.with_timezone(&Utc));
    }

    // Without timezone (assume UTC)
    for fmt in &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

//! Date-range window selection.
//!
//! Ranges are picked as calendar dates and applied as instants: a reading is
//! kept when `start 00:00 <= timestamp <= end 00:00` (UTC). Readings later in
//! the day on the end date fall outside the range.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TelemetryError};
use crate::types::FanSeries;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Fails with `InvalidRange` if `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(TelemetryError::InvalidRange {
                start,
                end,
                reason: "start is after end".to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Full span of a series, the default selection for a fan.
    pub fn spanning(series: &FanSeries) -> Result<Self> {
        let (start, end) = series.date_span().ok_or_else(|| TelemetryError::EmptyWindow {
            fan_id: Some(series.fan_id().to_string()),
        })?;
        Ok(Self { start, end })
    }

    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        midnight(self.start) <= at && at <= midnight(self.end)
    }
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

impl FanSeries {
    /// Readings falling inside `range`.
    ///
    /// Fails with `InvalidRange` when the range selects no readings.
    pub fn within(&self, range: &DateRange) -> Result<Self> {
        let window = self.filtered(|r| range.contains(r.timestamp));
        if window.is_empty() {
            return Err(TelemetryError::InvalidRange {
                start: range.start,
                end: range.end,
                reason: format!("no readings for fan {}", self.fan_id()),
            });
        }
        tracing::debug!(
            fan = self.fan_id(),
            start = %range.start,
            end = %range.end,
            readings = window.len(),
            "Window selected"
        );
        Ok(window)
    }
}

//! SessionSpec — a named, recurring local time-of-day window.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const MINUTES_PER_DAY: i64 = 24 * 60;

/// A named session such as `"0900"` or `"0030"`.
///
/// Day offsets are relative to the trading day `D` the session belongs to.
/// They make next-day placement explicit: the `0030` session of trading day
/// `D` starts on `D+1`, and a scan that ends at 09:00 the following morning
/// has `scan_end_day_offset = 1`. Nothing is inferred from clock values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSessionSpec")]
pub struct SessionSpec {
    name: String,
    start: NaiveTime,
    start_day_offset: u32,
    duration_minutes: u32,
    scan_end: NaiveTime,
    scan_end_day_offset: u32,
}

/// Unvalidated wire form of [`SessionSpec`].
#[derive(Debug, Clone, Deserialize)]
struct RawSessionSpec {
    name: String,
    start: NaiveTime,
    #[serde(default)]
    start_day_offset: u32,
    duration_minutes: u32,
    scan_end: NaiveTime,
    #[serde(default)]
    scan_end_day_offset: u32,
}

impl TryFrom<RawSessionSpec> for SessionSpec {
    type Error = SessionSpecError;

    fn try_from(raw: RawSessionSpec) -> Result<Self, Self::Error> {
        SessionSpec::new(
            raw.name,
            raw.start,
            raw.start_day_offset,
            raw.duration_minutes,
            raw.scan_end,
            raw.scan_end_day_offset,
        )
    }
}

impl SessionSpec {
    /// Build a validated session.
    pub fn new(
        name: impl Into<String>,
        start: NaiveTime,
        start_day_offset: u32,
        duration_minutes: u32,
        scan_end: NaiveTime,
        scan_end_day_offset: u32,
    ) -> Result<Self, SessionSpecError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(SessionSpecError::EmptyName);
        }
        if duration_minutes == 0 {
            return Err(SessionSpecError::NonPositiveDuration { name });
        }
        if start_day_offset > 1 || scan_end_day_offset > 1 {
            return Err(SessionSpecError::DayOffsetOutOfRange { name });
        }

        let spec = Self {
            name,
            start,
            start_day_offset,
            duration_minutes,
            scan_end,
            scan_end_day_offset,
        };
        let window_end = spec.nominal_start_minute() + i64::from(duration_minutes);
        if spec.nominal_scan_end_minute() <= window_end {
            return Err(SessionSpecError::ScanEndBeforeWindowEnd { name: spec.name });
        }
        Ok(spec)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn start_day_offset(&self) -> u32 {
        self.start_day_offset
    }

    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    pub fn scan_end(&self) -> NaiveTime {
        self.scan_end
    }

    pub fn scan_end_day_offset(&self) -> u32 {
        self.scan_end_day_offset
    }

    /// Minutes from local midnight of `D` to the session start, ignoring DST.
    fn nominal_start_minute(&self) -> i64 {
        i64::from(self.start_day_offset) * MINUTES_PER_DAY + minute_of_day(self.start)
    }

    /// Minutes from local midnight of `D` to the scan end, ignoring DST.
    fn nominal_scan_end_minute(&self) -> i64 {
        i64::from(self.scan_end_day_offset) * MINUTES_PER_DAY + minute_of_day(self.scan_end)
    }
}

fn minute_of_day(t: NaiveTime) -> i64 {
    use chrono::Timelike;
    i64::from(t.hour()) * 60 + i64::from(t.minute())
}

#[derive(Debug, Error, PartialEq)]
pub enum SessionSpecError {
    #[error("session name must not be empty")]
    EmptyName,

    #[error("session '{name}': duration must be positive")]
    NonPositiveDuration { name: String },

    #[error("session '{name}': day offsets must be 0 or 1")]
    DayOffsetOutOfRange { name: String },

    #[error("session '{name}': scan end must fall after the range window closes")]
    ScanEndBeforeWindowEnd { name: String },
}

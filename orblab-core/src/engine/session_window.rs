//! Session window resolution: symbolic session + trading day → absolute instants.
//!
//! All downstream comparisons use the UTC instants produced here. Local clock
//! values are never compared directly, so sessions that cross midnight and
//! days with a daylight-saving transition resolve correctly.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::domain::{InstrumentDescriptor, SessionSpec};

/// Longest spring-forward gap searched when a local time does not exist.
const MAX_GAP_MINUTES: i64 = 180;

/// Absolute instants for one (trading day, session).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionWindow {
    pub trading_day: NaiveDate,
    /// Inclusive start of the range window.
    pub window_start: DateTime<Utc>,
    /// Exclusive end of the range window; breakout scanning starts here.
    pub window_end: DateTime<Utc>,
    /// Exclusive end of breakout and exit scanning.
    pub scan_end: DateTime<Utc>,
}

impl SessionWindow {
    /// False when a DST shift leaves no time between window end and scan end.
    ///
    /// `SessionSpec` checks this on nominal local times only; a clock change
    /// between the two can still collapse the interval on a particular day.
    pub fn has_scan(&self) -> bool {
        self.scan_end > self.window_end
    }
}

/// Convert a local wall-clock time to UTC in `tz`.
///
/// Ambiguous times (clocks falling back) take the earlier instant. Times in a
/// spring-forward gap move to the first local minute that exists.
pub fn local_to_utc(tz: Tz, local: NaiveDateTime) -> DateTime<Utc> {
    let mut candidate = local;
    for _ in 0..=MAX_GAP_MINUTES {
        match tz.from_local_datetime(&candidate) {
            LocalResult::Single(t) => return t.with_timezone(&Utc),
            LocalResult::Ambiguous(earlier, _) => return earlier.with_timezone(&Utc),
            LocalResult::None => candidate += Duration::minutes(1),
        }
    }
    // No real zone has a gap this long; fall back to reading the clock as UTC.
    Utc.from_utc_datetime(&local)
}

fn local_instant(tz: Tz, day: NaiveDate, day_offset: u32, time: NaiveTime) -> DateTime<Utc> {
    let date = day + Duration::days(i64::from(day_offset));
    local_to_utc(tz, date.and_time(time))
}

/// Resolve `spec` on trading day `trading_day` in timezone `tz`.
pub fn resolve_window(trading_day: NaiveDate, spec: &SessionSpec, tz: Tz) -> SessionWindow {
    let window_start = local_instant(tz, trading_day, spec.start_day_offset(), spec.start());
    let window_end = window_start + Duration::minutes(i64::from(spec.duration_minutes()));
    let scan_end = local_instant(tz, trading_day, spec.scan_end_day_offset(), spec.scan_end());
    SessionWindow {
        trading_day,
        window_start,
        window_end,
        scan_end,
    }
}

/// `[D at trading_day_start, D+1 at trading_day_start)` for the instrument.
pub fn trading_day_bounds(
    trading_day: NaiveDate,
    instrument: &InstrumentDescriptor,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let tz = instrument.timezone();
    let start = local_instant(tz, trading_day, 0, instrument.trading_day_start());
    let end = local_instant(tz, trading_day, 1, instrument.trading_day_start());
    (start, end)
}

/// Latest instant any value stored for `trading_day` may depend on (exclusive).
///
/// The later of the trading-day end and every session's scan end.
pub fn decision_horizon(trading_day: NaiveDate, instrument: &InstrumentDescriptor) -> DateTime<Utc> {
    let (_, day_end) = trading_day_bounds(trading_day, instrument);
    instrument
        .sessions()
        .iter()
        .map(|s| resolve_window(trading_day, s, instrument.timezone()).scan_end)
        .fold(day_end, |acc, t| acc.max(t))
}

//! Bar — the fundamental market data unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OHLCV minute bar for a single instrument.
///
/// `ts` is the instant the bar OPENS. A bar stamped at a window's end
/// therefore lies entirely after that window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub symbol: String,
    pub ts: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Returns true if any OHLC field is NaN (void bar).
    pub fn is_void(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }

    /// Basic OHLC sanity check: high >= low, high >= open, high >= close, etc.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.volume >= 0.0
    }

    /// True if `price` lies inside `[low, high]`, both ends inclusive.
    pub fn touches(&self, price: f64) -> bool {
        self.low <= price && price <= self.high
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum BarError {
    #[error("bars out of order at index {index}: {prev} is not before {next}")]
    OutOfOrder {
        index: usize,
        prev: DateTime<Utc>,
        next: DateTime<Utc>,
    },
}

/// Check that bars are strictly ascending by `ts` (no duplicates).
///
/// Every scan in the engine relies on this ordering; reordering changes results.
pub fn ensure_ordered(bars: &[Bar]) -> Result<(), BarError> {
    for (i, pair) in bars.windows(2).enumerate() {
        if pair[0].ts >= pair[1].ts {
            return Err(BarError::OutOfOrder {
                index: i + 1,
                prev: pair[0].ts,
                next: pair[1].ts,
            });
        }
    }
    Ok(())
}

/// Sub-slice of `bars` with `start <= ts < end`.
///
/// Binary search; `bars` must be strictly ordered.
pub fn bars_between(bars: &[Bar], start: DateTime<Utc>, end: DateTime<Utc>) -> &[Bar] {
    if end <= start {
        return &[];
    }
    let lo = bars.partition_point(|b| b.ts < start);
    let hi = bars.partition_point(|b| b.ts < end);
    &bars[lo..hi.max(lo)]
}

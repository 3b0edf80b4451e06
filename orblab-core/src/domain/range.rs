//! Opening range and breakout event types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// High/low of the bars inside one session's range window.
///
/// Only constructed with `high > low`; a degenerate window has no range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpeningRange {
    pub high: f64,
    pub low: f64,
    pub size: f64,
}

impl OpeningRange {
    /// Returns `None` unless `high > low` and both are finite.
    pub fn new(high: f64, low: f64) -> Option<Self> {
        if !high.is_finite() || !low.is_finite() || high <= low {
            return None;
        }
        Some(Self {
            high,
            low,
            size: high - low,
        })
    }

    pub fn midpoint(&self) -> f64 {
        (self.high + self.low) / 2.0
    }

    /// The edge price crosses to break out in `direction`.
    pub fn edge(&self, direction: Direction) -> f64 {
        match direction {
            Direction::Up => self.high,
            Direction::Down => self.low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// +1 for UP, -1 for DOWN.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Up => 1.0,
            Direction::Down => -1.0,
        }
    }
}

/// First qualifying close outside the opening range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreakoutEvent {
    pub direction: Direction,
    pub ts: DateTime<Utc>,
    pub close: f64,
}

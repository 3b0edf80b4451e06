//! Trade specification and simulated trade outcome.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where the protective stop sits relative to the opening range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopMode {
    /// Opposite edge of the range.
    Full,
    /// Range midpoint.
    Half,
    /// `fraction * range.size` back from the entry edge.
    Fraction(f64),
}

impl StopMode {
    /// Share of the range size between entry edge and stop.
    pub fn fraction(self) -> f64 {
        match self {
            StopMode::Full => 1.0,
            StopMode::Half => 0.5,
            StopMode::Fraction(f) => f,
        }
    }
}

/// How a breakout is traded. Validated on construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTradeSpec")]
pub struct TradeSpec {
    name: String,
    rr: f64,
    stop_mode: StopMode,
    confirm_bars: u32,
    entry_buffer_ticks: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct RawTradeSpec {
    name: String,
    rr: f64,
    stop_mode: StopMode,
    #[serde(default = "default_confirm_bars")]
    confirm_bars: u32,
    #[serde(default)]
    entry_buffer_ticks: f64,
}

fn default_confirm_bars() -> u32 {
    1
}

impl TryFrom<RawTradeSpec> for TradeSpec {
    type Error = TradeSpecError;

    fn try_from(raw: RawTradeSpec) -> Result<Self, Self::Error> {
        TradeSpec::new(
            raw.name,
            raw.rr,
            raw.stop_mode,
            raw.confirm_bars,
            raw.entry_buffer_ticks,
        )
    }
}

impl TradeSpec {
    pub fn new(
        name: impl Into<String>,
        rr: f64,
        stop_mode: StopMode,
        confirm_bars: u32,
        entry_buffer_ticks: f64,
    ) -> Result<Self, TradeSpecError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(TradeSpecError::EmptyName);
        }
        if !rr.is_finite() || rr <= 0.0 {
            return Err(TradeSpecError::NonPositiveReward { name, rr });
        }
        if let StopMode::Fraction(f) = stop_mode {
            if !f.is_finite() || f <= 0.0 || f > 1.0 {
                return Err(TradeSpecError::StopFractionOutOfRange { name, fraction: f });
            }
        }
        if confirm_bars == 0 {
            return Err(TradeSpecError::ZeroConfirmBars { name });
        }
        if !entry_buffer_ticks.is_finite() || entry_buffer_ticks < 0.0 {
            return Err(TradeSpecError::NegativeBuffer { name });
        }
        Ok(Self {
            name,
            rr,
            stop_mode,
            confirm_bars,
            entry_buffer_ticks,
        })
    }

    /// Plain breakout: first close outside the range, no buffer.
    pub fn simple(name: impl Into<String>, rr: f64, stop_mode: StopMode) -> Result<Self, TradeSpecError> {
        Self::new(name, rr, stop_mode, 1, 0.0)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rr(&self) -> f64 {
        self.rr
    }

    pub fn stop_mode(&self) -> StopMode {
        self.stop_mode
    }

    pub fn confirm_bars(&self) -> u32 {
        self.confirm_bars
    }

    pub fn entry_buffer_ticks(&self) -> f64 {
        self.entry_buffer_ticks
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum TradeSpecError {
    #[error("trade spec name must not be empty")]
    EmptyName,

    #[error("trade spec '{name}': risk:reward must be positive, got {rr}")]
    NonPositiveReward { name: String, rr: f64 },

    #[error("trade spec '{name}': stop fraction must be in (0, 1], got {fraction}")]
    StopFractionOutOfRange { name: String, fraction: f64 },

    #[error("trade spec '{name}': confirm_bars must be at least 1")]
    ZeroConfirmBars { name: String },

    #[error("trade spec '{name}': entry buffer must be a non-negative tick count")]
    NegativeBuffer { name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeKind {
    Win,
    Loss,
    Expired,
}

/// Gross result of one simulated trade.
///
/// `r_multiple` is exactly `-1.0`, `0.0` or `+rr`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeOutcome {
    pub kind: OutcomeKind,
    pub r_multiple: f64,
    pub exit_ts: Option<DateTime<Utc>>,
    pub entry: f64,
    pub stop: f64,
    pub target: f64,
    pub risk_size: f64,
    /// Stop and target were both inside one bar; resolved as LOSS.
    #[serde(default)]
    pub tie_break: bool,
}

//! Cost model — commission and slippage expressed in price ticks.
//!
//! Commission is a round-turn charge. Slippage is charged on every fill, so a
//! completed trade pays it twice (entry and exit). The combined per-trade cost
//! is converted to R using the trade's own risk size.

use serde::{Deserialize, Serialize};

use crate::domain::{OutcomeKind, TradeOutcome};

/// Transaction cost assumption for one instrument.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CostModel {
    /// Round-turn commission, in ticks.
    #[serde(default)]
    pub commission_ticks: f64,
    /// Slippage per fill, in ticks.
    #[serde(default)]
    pub slippage_ticks: f64,
}

impl CostModel {
    pub fn new(commission_ticks: f64, slippage_ticks: f64) -> Self {
        Self {
            commission_ticks,
            slippage_ticks,
        }
    }

    pub fn frictionless() -> Self {
        Self::default()
    }

    /// Fixed cost of one complete trade, in ticks.
    pub fn round_trip_ticks(&self) -> f64 {
        self.commission_ticks + 2.0 * self.slippage_ticks
    }

    /// Per-trade cost expressed as a multiple of `risk_size`.
    ///
    /// Returns 0.0 for a non-positive risk size; such trades never reach here.
    pub fn cost_in_r(&self, risk_size: f64, tick_size: f64) -> f64 {
        if risk_size <= 0.0 {
            return 0.0;
        }
        self.round_trip_ticks() * tick_size / risk_size
    }

    /// Derive the cost-adjusted outcome of a gross trade.
    pub fn apply(&self, outcome: &TradeOutcome, tick_size: f64) -> NetOutcome {
        let cost_r = self.cost_in_r(outcome.risk_size, tick_size);
        let r_multiple = outcome.r_multiple - cost_r;
        let (kind, cost_flip) = match outcome.kind {
            OutcomeKind::Win if r_multiple > 0.0 => (OutcomeKind::Win, false),
            OutcomeKind::Win => (OutcomeKind::Loss, true),
            OutcomeKind::Loss => (OutcomeKind::Loss, false),
            OutcomeKind::Expired => (OutcomeKind::Expired, false),
        };
        NetOutcome {
            kind,
            r_multiple,
            cost_r,
            cost_flip,
        }
    }
}

/// Cost-adjusted view of a [`TradeOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NetOutcome {
    pub kind: OutcomeKind,
    pub r_multiple: f64,
    pub cost_r: f64,
    /// Gross WIN that became a net loss because of costs.
    pub cost_flip: bool,
}

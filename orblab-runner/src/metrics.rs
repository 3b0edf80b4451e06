//! Trade metrics — pure functions over collections of outcomes.
//!
//! EXPIRED trades count toward `trades` (and so the win-rate denominator) at
//! R = 0. `win_rate` is 0.0 for an empty collection, never NaN.

use serde::{Deserialize, Serialize};

use orblab_core::cost_model::NetOutcome;
use orblab_core::domain::{OutcomeKind, TradeOutcome};

/// Gross metrics over simulated trades.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeMetrics {
    pub trades: usize,
    pub wins: usize,
    pub losses: usize,
    pub expired: usize,
    pub win_rate: f64,
    pub avg_r: f64,
    pub total_r: f64,
}

impl TradeMetrics {
    pub fn compute<'a>(outcomes: impl IntoIterator<Item = &'a TradeOutcome>) -> Self {
        let mut m = TradeMetrics::default();
        for o in outcomes {
            m.trades += 1;
            m.total_r += o.r_multiple;
            match o.kind {
                OutcomeKind::Win => m.wins += 1,
                OutcomeKind::Loss => m.losses += 1,
                OutcomeKind::Expired => m.expired += 1,
            }
        }
        m.win_rate = ratio(m.wins, m.trades);
        m.avg_r = mean(m.total_r, m.trades);
        m
    }
}

/// Net-of-cost metrics.
///
/// A gross WIN pushed to a net loss by costs is counted in `cost_flips` only,
/// so `trades == wins + losses + cost_flips + expired`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostAdjustedMetrics {
    pub trades: usize,
    pub wins: usize,
    pub losses: usize,
    pub cost_flips: usize,
    pub expired: usize,
    pub win_rate: f64,
    pub avg_r: f64,
    pub total_r: f64,
}

impl CostAdjustedMetrics {
    pub fn compute<'a>(outcomes: impl IntoIterator<Item = &'a NetOutcome>) -> Self {
        let mut m = CostAdjustedMetrics::default();
        for o in outcomes {
            m.trades += 1;
            m.total_r += o.r_multiple;
            match (o.kind, o.cost_flip) {
                (_, true) => m.cost_flips += 1,
                (OutcomeKind::Win, false) => m.wins += 1,
                (OutcomeKind::Loss, false) => m.losses += 1,
                (OutcomeKind::Expired, false) => m.expired += 1,
            }
        }
        m.win_rate = ratio(m.wins, m.trades);
        m.avg_r = mean(m.total_r, m.trades);
        m
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

fn mean(sum: f64, n: usize) -> f64 {
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

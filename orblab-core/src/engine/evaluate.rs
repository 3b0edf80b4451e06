//! Per-session pipeline: window → range → breakout → trade → net outcome.
//!
//! Absent inputs short-circuit: no range means no breakout scan, no breakout
//! means no simulation.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::cost_model::NetOutcome;
use crate::domain::{Bar, BreakoutEvent, InstrumentDescriptor, OpeningRange, SessionSpec, TradeOutcome, TradeSpec};

use super::breakout::{detect_breakout, BreakoutRule};
use super::opening_range::opening_range;
use super::session_window::{resolve_window, SessionWindow};
use super::simulator::simulate_trade;

/// Result of one trade spec applied to one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionTrade {
    pub breakout: Option<BreakoutEvent>,
    pub outcome: Option<TradeOutcome>,
    pub net: Option<NetOutcome>,
}

/// Everything computed for one (trading day, session).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEvaluation {
    pub window: SessionWindow,
    pub range: Option<OpeningRange>,
    /// Keyed by trade spec name. Empty when there is no range.
    pub trades: BTreeMap<String, SessionTrade>,
}

/// Breakout rule for `spec` on an instrument with `tick_size`.
pub fn breakout_rule(spec: &TradeSpec, tick_size: f64) -> BreakoutRule {
    BreakoutRule {
        confirm_bars: spec.confirm_bars(),
        buffer: spec.entry_buffer_ticks() * tick_size,
    }
}

/// Run every trade spec against one session of `trading_day`.
///
/// `bars` must be strictly ordered; only bars before the session's scan end
/// are ever read.
pub fn evaluate_session(
    bars: &[Bar],
    trading_day: NaiveDate,
    session: &SessionSpec,
    instrument: &InstrumentDescriptor,
    specs: &[TradeSpec],
) -> SessionEvaluation {
    let window = resolve_window(trading_day, session, instrument.timezone());
    let range = opening_range(bars, &window);
    let mut trades = BTreeMap::new();
    if !window.has_scan() {
        tracing::warn!(
            session = session.name(),
            %trading_day,
            window_end = %window.window_end,
            scan_end = %window.scan_end,
            "scan end falls at or before window end; no breakout possible"
        );
    }

    if let Some(range) = range {
        for spec in specs {
            let rule = breakout_rule(spec, instrument.tick_size());
            let breakout = detect_breakout(bars, &window, &range, rule);
            let outcome = breakout
                .as_ref()
                .and_then(|b| simulate_trade(bars, b, &range, spec, window.scan_end));
            let net = outcome
                .as_ref()
                .map(|o| instrument.costs().apply(o, instrument.tick_size()));
            trades.insert(
                spec.name().to_string(),
                SessionTrade {
                    breakout,
                    outcome,
                    net,
                },
            );
        }
    }

    SessionEvaluation {
        window,
        range,
        trades,
    }
}

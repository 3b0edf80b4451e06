//! Trade simulator — stop/target placement and forward scan.
//!
//! This is the only place the stop, target and tie-break arithmetic lives.
//! Every caller (builder, validation tests, benches) goes through it.

use chrono::{DateTime, Utc};

use crate::domain::{Bar, BreakoutEvent, Direction, OpeningRange, OutcomeKind, TradeOutcome, TradeSpec};

/// Price levels of a trade, derived from the range and the trade spec.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeLevels {
    /// Edge of the range that was crossed, not the triggering close.
    pub entry: f64,
    pub stop: f64,
    pub target: f64,
    pub risk_size: f64,
}

/// Compute entry/stop/target for a breakout in `direction`.
///
/// Returns `None` if the risk size is not positive; such a trade is invalid
/// and excluded from results.
pub fn trade_levels(direction: Direction, range: &OpeningRange, spec: &TradeSpec) -> Option<TradeLevels> {
    let sign = direction.sign();
    let entry = range.edge(direction);
    let stop = entry - sign * spec.stop_mode().fraction() * range.size;
    let risk_size = (entry - stop).abs();
    if !risk_size.is_finite() || risk_size <= 0.0 {
        return None;
    }
    let target = entry + sign * spec.rr() * risk_size;
    Some(TradeLevels {
        entry,
        stop,
        target,
        risk_size,
    })
}

/// Simulate one trade from `breakout` until `scan_end`.
///
/// Scans bars with `breakout.ts < ts < scan_end` in ascending order. A bar
/// containing both stop and target resolves as a stop-out (LOSS, tie-break)
/// in either direction. `bars` must be strictly ordered.
pub fn simulate_trade(
    bars: &[Bar],
    breakout: &BreakoutEvent,
    range: &OpeningRange,
    spec: &TradeSpec,
    scan_end: DateTime<Utc>,
) -> Option<TradeOutcome> {
    let levels = trade_levels(breakout.direction, range, spec)?;
    let start = bars.partition_point(|b| b.ts <= breakout.ts);
    let end = bars.partition_point(|b| b.ts < scan_end);

    let outcome = |kind, r_multiple, exit_ts, tie_break| TradeOutcome {
        kind,
        r_multiple,
        exit_ts,
        entry: levels.entry,
        stop: levels.stop,
        target: levels.target,
        risk_size: levels.risk_size,
        tie_break,
    };

    for bar in bars.get(start..end).unwrap_or_default() {
        if bar.is_void() {
            continue;
        }
        let hit_stop = bar.touches(levels.stop);
        let hit_target = bar.touches(levels.target);
        match (hit_stop, hit_target) {
            (true, true) => return Some(outcome(OutcomeKind::Loss, -1.0, Some(bar.ts), true)),
            (false, true) => return Some(outcome(OutcomeKind::Win, spec.rr(), Some(bar.ts), false)),
            (true, false) => return Some(outcome(OutcomeKind::Loss, -1.0, Some(bar.ts), false)),
            (false, false) => {}
        }
    }
    Some(outcome(OutcomeKind::Expired, 0.0, None, false))
}

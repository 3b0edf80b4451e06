//! Property tests for engine invariants.
//!
//! Uses proptest to verify:
//! 1. R-multiple set: every gross outcome is exactly -1, 0 or +rr
//! 2. Tie-break conservatism: a bar containing stop and target is always a LOSS
//! 3. Degenerate ranges never produce a range, breakout or trade
//! 4. Net R never exceeds gross R, and only WINs flip

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use proptest::prelude::*;

use orblab_core::cost_model::CostModel;
use orblab_core::domain::{
    Bar, BreakoutEvent, Direction, InstrumentDescriptor, OpeningRange, OutcomeKind, SessionSpec, StopMode, TradeSpec,
};
use orblab_core::engine::{evaluate_session, simulate_trade, trade_levels};

fn ts(min: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap() + Duration::minutes(min)
}

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_direction() -> impl Strategy<Value = Direction> {
    prop_oneof![Just(Direction::Up), Just(Direction::Down)]
}

fn arb_stop_mode() -> impl Strategy<Value = StopMode> {
    prop_oneof![
        Just(StopMode::Full),
        Just(StopMode::Half),
        (0.05..1.0_f64).prop_map(StopMode::Fraction),
    ]
}

fn arb_range() -> impl Strategy<Value = OpeningRange> {
    (100.0..5000.0_f64, 0.1..50.0_f64)
        .prop_filter_map("valid range", |(low, size)| OpeningRange::new(low + size, low))
}

fn arb_rr() -> impl Strategy<Value = f64> {
    (0.25..5.0_f64).prop_map(|r| (r * 4.0).round() / 4.0)
}

/// Minute bars as (drift, half-spread) steps; turned into a walk around `start`.
fn arb_steps() -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((-3.0..3.0_f64, 0.0..4.0_f64), 0..120)
}

fn walk(start: f64, steps: &[(f64, f64)]) -> Vec<Bar> {
    let mut price = start;
    steps
        .iter()
        .enumerate()
        .map(|(i, (drift, spread))| {
            let open = price;
            price += drift;
            Bar {
                symbol: "MGC".into(),
                ts: ts(i as i64 + 1),
                open,
                high: open.max(price) + spread,
                low: open.min(price) - spread,
                close: price,
                volume: 1.0,
            }
        })
        .collect()
}

// ── 1. R-multiple set ────────────────────────────────────────────────

proptest! {
    #[test]
    fn gross_r_is_minus_one_zero_or_rr(
        range in arb_range(),
        direction in arb_direction(),
        stop_mode in arb_stop_mode(),
        rr in arb_rr(),
        steps in arb_steps(),
    ) {
        let spec = TradeSpec::simple("p", rr, stop_mode).unwrap();
        let breakout = BreakoutEvent { direction, ts: ts(0), close: range.edge(direction) };
        let bars = walk(range.edge(direction), &steps);
        let out = simulate_trade(&bars, &breakout, &range, &spec, ts(10_000)).unwrap();

        match out.kind {
            OutcomeKind::Win => prop_assert_eq!(out.r_multiple, rr),
            OutcomeKind::Loss => prop_assert_eq!(out.r_multiple, -1.0),
            OutcomeKind::Expired => prop_assert_eq!(out.r_multiple, 0.0),
        }
        prop_assert!(out.risk_size > 0.0);
        if out.tie_break {
            prop_assert_eq!(out.kind, OutcomeKind::Loss);
        }
    }
}

// ── 2. Tie-break conservatism ────────────────────────────────────────

proptest! {
    #[test]
    fn bar_containing_both_levels_is_loss(
        range in arb_range(),
        direction in arb_direction(),
        stop_mode in arb_stop_mode(),
        rr in arb_rr(),
        below in 0.0..10.0_f64,
        above in 0.0..10.0_f64,
    ) {
        let spec = TradeSpec::simple("p", rr, stop_mode).unwrap();
        let levels = trade_levels(direction, &range, &spec).unwrap();
        let low = levels.stop.min(levels.target) - below;
        let high = levels.stop.max(levels.target) + above;
        let bar = Bar {
            symbol: "MGC".into(),
            ts: ts(1),
            open: low,
            high,
            low,
            close: high,
            volume: 1.0,
        };
        let breakout = BreakoutEvent { direction, ts: ts(0), close: levels.entry };
        let out = simulate_trade(&[bar], &breakout, &range, &spec, ts(100)).unwrap();

        prop_assert_eq!(out.kind, OutcomeKind::Loss);
        prop_assert_eq!(out.r_multiple, -1.0);
        prop_assert!(out.tie_break);
    }
}

// ── 3. Degenerate ranges ─────────────────────────────────────────────

proptest! {
    #[test]
    fn non_positive_width_has_no_range(level in 1.0..5000.0_f64, dip in 0.0..10.0_f64) {
        prop_assert!(OpeningRange::new(level, level).is_none());
        prop_assert!(OpeningRange::new(level - dip, level).is_none());
    }

    #[test]
    fn flat_window_never_breaks_out(level in 100.0..5000.0_f64, steps in arb_steps()) {
        let t = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap();
        let inst = InstrumentDescriptor::builder("MGC", chrono_tz::UTC, 0.1)
            .session(SessionSpec::new("0000", t(0), 0, 5, t(23), 0).unwrap())
            .build()
            .unwrap();
        let specs = vec![
            TradeSpec::simple("rr1_full", 1.0, StopMode::Full).unwrap(),
            TradeSpec::simple("rr2_half", 2.0, StopMode::Half).unwrap(),
        ];

        // Five identical bars fill the window; the walk after it may go anywhere.
        let mut bars: Vec<Bar> = (0..5)
            .map(|m| Bar {
                symbol: "MGC".into(),
                ts: ts(m),
                open: level,
                high: level,
                low: level,
                close: level,
                volume: 1.0,
            })
            .collect();
        bars.extend(walk(level, &steps).into_iter().map(|mut b| {
            b.ts += Duration::minutes(4);
            b
        }));

        let eval = evaluate_session(&bars, ts(0).date_naive(), &inst.sessions()[0], &inst, &specs);
        prop_assert!(eval.range.is_none());
        prop_assert!(eval.trades.is_empty());
    }
}

// ── 4. Costs ─────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn costs_only_reduce_r(
        range in arb_range(),
        direction in arb_direction(),
        rr in arb_rr(),
        steps in arb_steps(),
        commission in 0.0..20.0_f64,
        slippage in 0.0..10.0_f64,
    ) {
        let spec = TradeSpec::simple("p", rr, StopMode::Full).unwrap();
        let breakout = BreakoutEvent { direction, ts: ts(0), close: range.edge(direction) };
        let bars = walk(range.edge(direction), &steps);
        let gross = simulate_trade(&bars, &breakout, &range, &spec, ts(10_000)).unwrap();
        let net = CostModel::new(commission, slippage).apply(&gross, 0.1);

        prop_assert!(net.r_multiple <= gross.r_multiple);
        prop_assert!(net.cost_r >= 0.0);
        if net.cost_flip {
            prop_assert_eq!(gross.kind, OutcomeKind::Win);
            prop_assert_eq!(net.kind, OutcomeKind::Loss);
        }
        if gross.kind != OutcomeKind::Win {
            prop_assert_eq!(net.kind, gross.kind);
        }
    }
}

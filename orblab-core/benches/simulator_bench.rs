//! Criterion benchmarks for the session pipeline hot paths.
//!
//! Benchmarks:
//! 1. Trade simulation over a full day of minute bars
//! 2. Full session evaluation (window, range, breakout, trades) for the catalog

use chrono::{Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Australia::Brisbane;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use orblab_core::domain::{Bar, BreakoutEvent, Direction, InstrumentDescriptor, OpeningRange, SessionSpec, StopMode, TradeSpec};
use orblab_core::engine::{evaluate_session, simulate_trade};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_bars(n: usize) -> Vec<Bar> {
    let start = Utc.with_ymd_and_hms(2024, 1, 14, 23, 0, 0).unwrap();
    (0..n)
        .map(|i| {
            let close = 2000.0 + (i as f64 * 0.05).sin() * 3.0;
            Bar {
                symbol: "MGC".into(),
                ts: start + Duration::minutes(i as i64),
                open: close - 0.1,
                high: close + 0.3,
                low: close - 0.4,
                close,
                volume: 25.0,
            }
        })
        .collect()
}

fn instrument() -> InstrumentDescriptor {
    let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
    let session = |name: &str, start, offset| SessionSpec::new(name, start, offset, 5, t(9, 0), 1).unwrap();
    InstrumentDescriptor::builder("MGC", Brisbane, 0.1)
        .session(session("0900", t(9, 0), 0))
        .session(session("1000", t(10, 0), 0))
        .session(session("1100", t(11, 0), 0))
        .session(session("1800", t(18, 0), 0))
        .session(session("2300", t(23, 0), 0))
        .session(session("0030", t(0, 30), 1))
        .build()
        .unwrap()
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_simulate(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulate_trade");
    let range = OpeningRange::new(2010.0, 1990.0).unwrap();
    let spec = TradeSpec::simple("rr2_full", 2.0, StopMode::Full).unwrap();
    for n in [60usize, 1440] {
        let bars = make_bars(n);
        let breakout = BreakoutEvent {
            direction: Direction::Up,
            ts: bars[0].ts,
            close: 2011.0,
        };
        let scan_end = bars[n - 1].ts + Duration::minutes(1);
        group.bench_with_input(BenchmarkId::from_parameter(n), &bars, |b, bars| {
            b.iter(|| simulate_trade(black_box(bars), &breakout, &range, &spec, scan_end))
        });
    }
    group.finish();
}

fn bench_evaluate_day(c: &mut Criterion) {
    let inst = instrument();
    let bars = make_bars(1440);
    let day = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
    let specs = vec![
        TradeSpec::simple("rr1_full", 1.0, StopMode::Full).unwrap(),
        TradeSpec::simple("rr2_half", 2.0, StopMode::Half).unwrap(),
        TradeSpec::simple("rr3_full", 3.0, StopMode::Full).unwrap(),
    ];
    c.bench_function("evaluate_all_sessions", |b| {
        b.iter(|| {
            for session in inst.sessions() {
                black_box(evaluate_session(black_box(&bars), day, session, &inst, &specs));
            }
        })
    });
}

criterion_group!(benches, bench_simulate, bench_evaluate_day);
criterion_main!(benches);

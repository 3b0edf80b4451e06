//! Criterion benchmarks for batch building and aggregate queries.
//!
//! Run with: `cargo bench -p orblab-runner`

use chrono::{Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Australia::Brisbane;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use orblab_core::data::InMemorySource;
use orblab_core::domain::{Bar, InstrumentDescriptor, SessionSpec, StopMode, TradeSpec};
use orblab_runner::{AggregateQuery, DailyFeatureBuilder, FeatureStore};

fn instrument() -> InstrumentDescriptor {
    let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
    let session = |name: &str, start, offset| SessionSpec::new(name, start, offset, 5, t(9, 0), 1).unwrap();
    InstrumentDescriptor::builder("MGC", Brisbane, 0.1)
        .trading_day_start(t(9, 0))
        .session(session("0900", t(9, 0), 0))
        .session(session("1800", t(18, 0), 0))
        .session(session("2300", t(23, 0), 0))
        .session(session("0030", t(0, 30), 1))
        .build()
        .unwrap()
}

/// One-minute bars covering every scheduled day, oscillating around 2000.
fn history(inst: &InstrumentDescriptor, start: NaiveDate, end: NaiveDate) -> Vec<Bar> {
    let mut bars = Vec::new();
    for day in inst.trading_days(start, end) {
        let open = Utc.from_utc_datetime(&day.and_hms_opt(23, 0, 0).unwrap()) - Duration::days(1);
        for i in 0..1440i64 {
            let close = 2000.0 + (i as f64 * 0.03).sin() * 4.0;
            bars.push(Bar {
                symbol: "MGC".into(),
                ts: open + Duration::minutes(i),
                open: close - 0.1,
                high: close + 0.3,
                low: close - 0.4,
                close,
                volume: 10.0,
            });
        }
    }
    bars
}

fn bench_build_month(c: &mut Criterion) {
    let inst = instrument();
    let specs = vec![
        TradeSpec::simple("rr1_full", 1.0, StopMode::Full).unwrap(),
        TradeSpec::simple("rr2_half", 2.0, StopMode::Half).unwrap(),
    ];
    let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
    let source = InMemorySource::new()
        .with_bars("MGC", history(&inst, start, end))
        .unwrap();
    let builder = DailyFeatureBuilder::new(&inst, &specs, 5);

    c.bench_function("build_range_one_month", |b| {
        b.iter(|| {
            let dir = tempfile::tempdir().unwrap();
            let store = FeatureStore::open(dir.path()).unwrap();
            black_box(builder.build_range(&source, &store, start, end).unwrap())
        })
    });

    let dir = tempfile::tempdir().unwrap();
    let store = FeatureStore::open(dir.path()).unwrap();
    builder.build_range(&source, &store, start, end).unwrap();
    c.bench_function("aggregate_query_one_month", |b| {
        b.iter(|| black_box(AggregateQuery::new("MGC").session("0900").run(&store).unwrap()))
    });
}

criterion_group!(benches, bench_build_month);
criterion_main!(benches);

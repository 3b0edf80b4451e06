//! Shared fixtures: a Brisbane gold-style instrument and synthetic minute history.
//!
//! Every scheduled day has 5-minute bars covering 09:00 → 09:00 local. The
//! first bar sets a 2-point opening range around `base`; price then climbs
//! 0.5 per bar, so both sessions break out UP and reach their targets.

#![allow(dead_code)]

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Australia::Brisbane;

use orblab_core::cost_model::CostModel;
use orblab_core::data::InMemorySource;
use orblab_core::domain::{Bar, InstrumentDescriptor, SessionSpec, StopMode, TradeSpec};

pub const BARS_PER_DAY: i64 = 288;

pub fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

pub fn instrument(costs: CostModel) -> InstrumentDescriptor {
    InstrumentDescriptor::builder("MGC", Brisbane, 0.1)
        .trading_day_start(t(9, 0))
        .costs(costs)
        .session(SessionSpec::new("0900", t(9, 0), 0, 5, t(9, 0), 1).unwrap())
        .session(SessionSpec::new("2300", t(23, 0), 0, 5, t(9, 0), 1).unwrap())
        .build()
        .unwrap()
}

pub fn trade_specs() -> Vec<TradeSpec> {
    vec![
        TradeSpec::simple("rr1_full", 1.0, StopMode::Full).unwrap(),
        TradeSpec::simple("rr2_half", 2.0, StopMode::Half).unwrap(),
    ]
}

/// 09:00 Brisbane on `day`.
pub fn day_open(day: NaiveDate) -> DateTime<Utc> {
    Brisbane
        .from_local_datetime(&day.and_time(t(9, 0)))
        .single()
        .unwrap()
        .with_timezone(&Utc)
}

pub fn day_bars(day: NaiveDate, base: f64) -> Vec<Bar> {
    let start = day_open(day);
    (0..BARS_PER_DAY)
        .map(|k| {
            let ts = start + Duration::minutes(5 * k);
            if k == 0 {
                return Bar {
                    symbol: "MGC".into(),
                    ts,
                    open: base,
                    high: base + 1.0,
                    low: base - 1.0,
                    close: base,
                    volume: 100.0,
                };
            }
            let close = base + 0.5 * k as f64;
            let open = close - 0.5;
            Bar {
                symbol: "MGC".into(),
                ts,
                open,
                high: close + 0.3,
                low: open - 0.3,
                close,
                volume: 100.0,
            }
        })
        .collect()
}

/// History for every scheduled day of `inst` in `[start, end]`, except `skip`.
pub fn history(inst: &InstrumentDescriptor, start: NaiveDate, end: NaiveDate, skip: &[NaiveDate]) -> Vec<Bar> {
    inst.trading_days(start, end)
        .into_iter()
        .enumerate()
        .filter(|(_, day)| !skip.contains(day))
        .flat_map(|(i, day)| day_bars(day, 2000.0 + 3.0 * i as f64))
        .collect()
}

pub fn source(inst: &InstrumentDescriptor, start: NaiveDate, end: NaiveDate, skip: &[NaiveDate]) -> InMemorySource {
    InMemorySource::new()
        .with_bars("MGC", history(inst, start, end, skip))
        .unwrap()
}

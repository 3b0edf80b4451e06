//! Session catalog resolution for a 09:00 → 09:00 Brisbane trading day.
//!
//! Brisbane has no daylight saving, so every session of trading day D lands at
//! a fixed UTC instant. The 0030 session belongs to D but starts on D+1.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Australia::Brisbane;
use orblab_core::domain::{InstrumentDescriptor, SessionSpec};
use orblab_core::engine::{resolve_window, trading_day_bounds};

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn utc(d: u32, h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, d, h, m, 0).unwrap()
}

fn catalog() -> InstrumentDescriptor {
    let session = |name: &str, start: NaiveTime, offset: u32| {
        SessionSpec::new(name, start, offset, 5, t(9, 0), 1).unwrap()
    };
    InstrumentDescriptor::builder("MGC", Brisbane, 0.1)
        .trading_day_start(t(9, 0))
        .session(session("0900", t(9, 0), 0))
        .session(session("1000", t(10, 0), 0))
        .session(session("1100", t(11, 0), 0))
        .session(session("1800", t(18, 0), 0))
        .session(session("2300", t(23, 0), 0))
        .session(session("0030", t(0, 30), 1))
        .build()
        .unwrap()
}

#[test]
fn every_session_resolves_inside_the_trading_day() {
    let inst = catalog();
    let day = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
    let (day_start, day_end) = trading_day_bounds(day, &inst);
    assert_eq!(day_start, utc(14, 23, 0));
    assert_eq!(day_end, utc(15, 23, 0));

    let expected_starts = [
        ("0900", utc(14, 23, 0)),
        ("1000", utc(15, 0, 0)),
        ("1100", utc(15, 1, 0)),
        ("1800", utc(15, 8, 0)),
        ("2300", utc(15, 13, 0)),
        ("0030", utc(15, 14, 30)),
    ];
    for (name, start) in expected_starts {
        let session = inst.session(name).unwrap();
        let w = resolve_window(day, session, inst.timezone());
        assert_eq!(w.window_start, start, "{name}");
        assert_eq!(w.scan_end, day_end, "{name}");
        assert!(w.window_start >= day_start && w.window_end <= day_end, "{name}");
    }
}

#[test]
fn sessions_are_ordered_in_absolute_time() {
    let inst = catalog();
    let day = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
    let starts: Vec<_> = inst
        .sessions()
        .iter()
        .map(|s| resolve_window(day, s, inst.timezone()).window_start)
        .collect();
    let mut sorted = starts.clone();
    sorted.sort();
    assert_eq!(starts, sorted);
}

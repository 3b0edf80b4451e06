//! Canonicalization: sort by instant, drop duplicate instants, drop insane bars.
//!
//! Every bar that reaches the engine went through here, so downstream scans
//! can rely on strict ordering.

use polars::prelude::*;

use super::frame::{bars_to_dataframe, dataframe_to_bars};
use super::provider::DataError;
use crate::domain::Bar;

/// Canonical bars plus what was removed on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Canonicalized {
    pub bars: Vec<Bar>,
    pub duplicates: usize,
    pub insane: usize,
}

/// Sort ascending by `ts`, keeping the first bar seen for each instant.
pub fn sort_dedupe(df: LazyFrame) -> LazyFrame {
    df.sort(["ts"], SortMultipleOptions::default().with_maintain_order(true))
        .unique_stable(Some(vec!["ts".into()]), UniqueKeepStrategy::First)
}

/// Canonicalize bars for one symbol.
pub fn canonicalize(symbol: &str, bars: &[Bar]) -> Result<Canonicalized, DataError> {
    if bars.is_empty() {
        return Ok(Canonicalized {
            bars: Vec::new(),
            duplicates: 0,
            insane: 0,
        });
    }
    let df = bars_to_dataframe(bars)?;
    let sorted = sort_dedupe(df.lazy())
        .collect()
        .map_err(|e| DataError::Parquet(format!("canonicalize: {e}")))?;
    let deduped = dataframe_to_bars(&sorted, symbol)?;
    let duplicates = bars.len() - deduped.len();

    let before = deduped.len();
    let clean: Vec<Bar> = deduped.into_iter().filter(Bar::is_sane).collect();
    let insane = before - clean.len();

    if duplicates > 0 || insane > 0 {
        tracing::warn!(
            symbol,
            duplicates,
            insane,
            kept = clean.len(),
            "dropped bars during canonicalization"
        );
    }
    Ok(Canonicalized {
        bars: clean,
        duplicates,
        insane,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ensure_ordered;
    use chrono::{Duration, TimeZone, Utc};

    fn bar(min: i64, close: f64) -> Bar {
        Bar {
            symbol: "MGC".into(),
            ts: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap() + Duration::minutes(min),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 5.0,
        }
    }

    #[test]
    fn sorts_and_keeps_first_duplicate() {
        let bars = vec![bar(2, 102.0), bar(0, 100.0), bar(1, 101.0), bar(0, 999.0)];
        let out = canonicalize("MGC", &bars).unwrap();
        assert_eq!(out.bars.len(), 3);
        assert_eq!(out.duplicates, 1);
        assert_eq!(out.bars[0].close, 100.0);
        assert!(ensure_ordered(&out.bars).is_ok());
    }

    #[test]
    fn drops_insane_bars() {
        let mut broken = bar(1, 101.0);
        broken.high = 90.0;
        let out = canonicalize("MGC", &[bar(0, 100.0), broken]).unwrap();
        assert_eq!(out.bars.len(), 1);
        assert_eq!(out.insane, 1);
    }

    #[test]
    fn empty_input_is_empty_output() {
        let out = canonicalize("MGC", &[]).unwrap();
        assert!(out.bars.is_empty());
    }
}

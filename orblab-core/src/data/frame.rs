//! Conversions between `Bar` slices and Polars frames.
//!
//! Frame schema: `ts` (Int64, epoch milliseconds UTC), `open`, `high`, `low`,
//! `close`, `volume` (Float64). The symbol is implied by the partition.

use chrono::{DateTime, Utc};
use polars::prelude::*;

use super::provider::DataError;
use crate::domain::Bar;

pub(crate) const COLUMNS: [&str; 6] = ["ts", "open", "high", "low", "close", "volume"];

pub(crate) fn bars_to_dataframe(bars: &[Bar]) -> Result<DataFrame, DataError> {
    let ts: Vec<i64> = bars.iter().map(|b| b.ts.timestamp_millis()).collect();
    let opens: Vec<f64> = bars.iter().map(|b| b.open).collect();
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();

    DataFrame::new(vec![
        Column::new("ts".into(), ts),
        Column::new("open".into(), opens),
        Column::new("high".into(), highs),
        Column::new("low".into(), lows),
        Column::new("close".into(), closes),
        Column::new("volume".into(), volumes),
    ])
    .map_err(|e| DataError::Parquet(format!("dataframe creation: {e}")))
}

pub(crate) fn dataframe_to_bars(df: &DataFrame, symbol: &str) -> Result<Vec<Bar>, DataError> {
    for name in COLUMNS {
        if df.column(name).is_err() {
            return Err(DataError::Validation(format!("missing column '{name}'")));
        }
    }
    let col_err = |name: &str, e: PolarsError| DataError::Parquet(format!("{name} column: {e}"));
    let f64_col = |name: &str| -> Result<Float64Chunked, DataError> {
        let column = df.column(name).map_err(|e| col_err(name, e))?;
        column
            .f64()
            .map(|ca| ca.clone())
            .map_err(|e| col_err(name, e))
    };

    let ts = df
        .column("ts")
        .map_err(|e| col_err("ts", e))?
        .i64()
        .map_err(|e| col_err("ts", e))?
        .clone();
    let open = f64_col("open")?;
    let high = f64_col("high")?;
    let low = f64_col("low")?;
    let close = f64_col("close")?;
    let volume = f64_col("volume")?;

    let mut bars = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let millis = ts
            .get(i)
            .ok_or_else(|| DataError::Validation(format!("null ts at row {i}")))?;
        let ts = DateTime::<Utc>::from_timestamp_millis(millis)
            .ok_or_else(|| DataError::Validation(format!("ts out of range at row {i}: {millis}")))?;
        bars.push(Bar {
            symbol: symbol.to_string(),
            ts,
            open: open.get(i).unwrap_or(f64::NAN),
            high: high.get(i).unwrap_or(f64::NAN),
            low: low.get(i).unwrap_or(f64::NAN),
            close: close.get(i).unwrap_or(f64::NAN),
            volume: volume.get(i).unwrap_or(0.0),
        });
    }
    Ok(bars)
}

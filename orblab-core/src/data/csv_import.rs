//! CSV import of minute bars.
//!
//! Expected header: `timestamp,open,high,low,close,volume`, with RFC 3339
//! timestamps marking each bar's open (`2024-01-02T23:00:00Z` or with an
//! explicit offset). Rows are canonicalized before being returned.

use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::canonicalize::{canonicalize, Canonicalized};
use super::provider::DataError;
use crate::domain::Bar;

#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: f64,
}

/// Read and canonicalize bars for `symbol` from any CSV reader.
pub fn read_bars<R: Read>(symbol: &str, reader: R) -> Result<Canonicalized, DataError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut bars = Vec::new();
    for (i, row) in rdr.deserialize::<CsvRow>().enumerate() {
        let row = row.map_err(|e| DataError::Csv(format!("row {}: {e}", i + 1)))?;
        let ts = DateTime::parse_from_rfc3339(&row.timestamp)
            .map_err(|e| DataError::Csv(format!("row {}: bad timestamp '{}': {e}", i + 1, row.timestamp)))?
            .with_timezone(&Utc);
        bars.push(Bar {
            symbol: symbol.to_string(),
            ts,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        });
    }
    canonicalize(symbol, &bars)
}

/// Read and canonicalize bars for `symbol` from a CSV file.
pub fn import_csv(symbol: &str, path: &Path) -> Result<Canonicalized, DataError> {
    let file = std::fs::File::open(path).map_err(|e| DataError::io(path, e))?;
    let out = read_bars(symbol, file)?;
    tracing::info!(symbol, path = %path.display(), bars = out.bars.len(), "imported csv");
    Ok(out)
}

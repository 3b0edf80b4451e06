//! Parquet bar cache with Hive-style partitioning.
//!
//! Layout: `{cache_dir}/symbol={SYMBOL}/{year}.parquet`
//!
//! - Atomic writes (write to .tmp, rename into place)
//! - Incremental imports: new bars are merged into the existing year partition
//! - Integrity validation on load (schema check, row count > 0)
//! - Quarantine for corrupt files (`{year}.parquet.quarantined`)

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, Utc};
use polars::prelude::*;

use super::canonicalize::canonicalize;
use super::frame::{bars_to_dataframe, dataframe_to_bars};
use super::provider::{BarSource, DataError};
use crate::domain::{bars_between, Bar};

/// Summary of one import into the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteSummary {
    pub symbol: String,
    pub years: Vec<i32>,
    /// Bars stored across the touched partitions after merging.
    pub stored: usize,
}

pub struct ParquetBarCache {
    cache_dir: PathBuf,
}

impl ParquetBarCache {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn symbol_dir(&self, symbol: &str) -> PathBuf {
        self.cache_dir.join(format!("symbol={symbol}"))
    }

    fn year_path(&self, symbol: &str, year: i32) -> PathBuf {
        self.symbol_dir(symbol).join(format!("{year}.parquet"))
    }

    /// Merge `bars` into the cache for `symbol`.
    ///
    /// Bars are grouped by UTC year. Each touched partition is re-read, merged,
    /// canonicalized and written back atomically. On a duplicate instant the
    /// bar already in the cache wins.
    pub fn write(&self, symbol: &str, bars: &[Bar]) -> Result<WriteSummary, DataError> {
        if bars.is_empty() {
            return Err(DataError::Validation("no bars to cache".into()));
        }
        let sym_dir = self.symbol_dir(symbol);
        fs::create_dir_all(&sym_dir).map_err(|e| DataError::io(&sym_dir, e))?;

        let mut by_year: BTreeMap<i32, Vec<Bar>> = BTreeMap::new();
        for bar in bars {
            by_year.entry(bar.ts.year()).or_default().push(bar.clone());
        }

        let mut stored = 0;
        for (year, incoming) in &by_year {
            let path = self.year_path(symbol, *year);
            let mut merged = if path.exists() {
                self.load_partition(symbol, &path)
            } else {
                Vec::new()
            };
            merged.extend(incoming.iter().cloned());
            let canonical = canonicalize(symbol, &merged)?;
            stored += canonical.bars.len();

            let mut df = bars_to_dataframe(&canonical.bars)?;
            let tmp_path = path.with_extension("parquet.tmp");
            write_parquet(&mut df, &tmp_path)?;
            fs::rename(&tmp_path, &path).map_err(|e| {
                let _ = fs::remove_file(&tmp_path);
                DataError::io(&path, e)
            })?;
            tracing::debug!(symbol, year, rows = canonical.bars.len(), "wrote cache partition");
        }

        Ok(WriteSummary {
            symbol: symbol.to_string(),
            years: by_year.keys().copied().collect(),
            stored,
        })
    }

    /// Years with a readable partition for `symbol`, ascending.
    pub fn years(&self, symbol: &str) -> Result<Vec<i32>, DataError> {
        let sym_dir = self.symbol_dir(symbol);
        if !sym_dir.exists() {
            return Err(DataError::NoCachedData {
                symbol: symbol.to_string(),
            });
        }
        let entries = fs::read_dir(&sym_dir).map_err(|e| DataError::io(&sym_dir, e))?;
        let mut years = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| DataError::io(&sym_dir, e))?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("parquet") {
                continue;
            }
            if let Some(year) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<i32>().ok())
            {
                years.push(year);
            }
        }
        years.sort_unstable();
        Ok(years)
    }

    /// Read one partition; a corrupt file is quarantined and reads as empty.
    fn load_partition(&self, symbol: &str, path: &Path) -> Vec<Bar> {
        match load_and_validate_parquet(path, symbol) {
            Ok(bars) => bars,
            Err(e) => {
                let quarantine = path.with_extension("parquet.quarantined");
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "quarantining corrupt cache file"
                );
                let _ = fs::rename(path, &quarantine);
                Vec::new()
            }
        }
    }
}

impl BarSource for ParquetBarCache {
    fn name(&self) -> &str {
        "parquet"
    }

    fn load(&self, symbol: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Bar>, DataError> {
        let wanted = start.year()..=end.year();
        let mut bars = Vec::new();
        for year in self.years(symbol)?.into_iter().filter(|y| wanted.contains(y)) {
            bars.extend(self.load_partition(symbol, &self.year_path(symbol, year)));
        }
        // Partitions are canonical on write; merge order across years still matters.
        bars.sort_by_key(|b| b.ts);
        bars.dedup_by_key(|b| b.ts);
        let in_range = bars_between(&bars, start, end).to_vec();
        tracing::debug!(symbol, bars = in_range.len(), %start, %end, "loaded bars from cache");
        Ok(in_range)
    }
}

fn write_parquet(df: &mut DataFrame, path: &Path) -> Result<(), DataError> {
    let file = fs::File::create(path).map_err(|e| DataError::io(path, e))?;
    ParquetWriter::new(file)
        .finish(df)
        .map_err(|e| DataError::Parquet(format!("write parquet: {e}")))?;
    Ok(())
}

fn load_and_validate_parquet(path: &Path, symbol: &str) -> Result<Vec<Bar>, DataError> {
    let file = fs::File::open(path).map_err(|e| DataError::io(path, e))?;
    let df = ParquetReader::new(file)
        .finish()
        .map_err(|e| DataError::Parquet(format!("read: {e}")))?;
    if df.height() == 0 {
        return Err(DataError::Validation("empty parquet file".into()));
    }
    dataframe_to_bars(&df, symbol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn bar(ts: DateTime<Utc>, close: f64) -> Bar {
        Bar {
            symbol: "MGC".into(),
            ts,
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 3.0,
        }
    }

    fn jan(min: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap() + Duration::minutes(min)
    }

    #[test]
    fn write_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ParquetBarCache::new(dir.path());
        let bars: Vec<Bar> = (0..5).map(|m| bar(jan(m), 100.0 + m as f64)).collect();

        let summary = cache.write("MGC", &bars).unwrap();
        assert_eq!(summary.years, vec![2024]);
        assert_eq!(summary.stored, 5);

        let loaded = cache.load("MGC", jan(1), jan(4)).unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded[0], bars[1]);
    }

    #[test]
    fn write_merges_into_existing_partition() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ParquetBarCache::new(dir.path());
        cache.write("MGC", &[bar(jan(0), 100.0), bar(jan(2), 102.0)]).unwrap();
        let summary = cache.write("MGC", &[bar(jan(1), 101.0), bar(jan(2), 999.0)]).unwrap();
        assert_eq!(summary.stored, 3);

        let loaded = cache.load("MGC", jan(0), jan(10)).unwrap();
        let closes: Vec<f64> = loaded.iter().map(|b| b.close).collect();
        assert_eq!(closes, vec![100.0, 101.0, 102.0]);
    }

    #[test]
    fn spans_year_partitions() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ParquetBarCache::new(dir.path());
        let late = Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 0).unwrap();
        cache.write("MGC", &[bar(late, 1.0), bar(jan(0), 2.0)]).unwrap();
        assert_eq!(cache.years("MGC").unwrap(), vec![2023, 2024]);
        assert_eq!(cache.load("MGC", late, jan(1)).unwrap().len(), 2);
    }

    #[test]
    fn missing_symbol_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ParquetBarCache::new(dir.path());
        assert!(matches!(
            cache.load("NOPE", jan(0), jan(1)),
            Err(DataError::NoCachedData { .. })
        ));
    }

    #[test]
    fn corrupt_partition_is_quarantined() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ParquetBarCache::new(dir.path());
        cache.write("MGC", &[bar(jan(0), 100.0)]).unwrap();
        let path = dir.path().join("symbol=MGC").join("2024.parquet");
        fs::write(&path, b"not parquet").unwrap();

        let loaded = cache.load("MGC", jan(0), jan(1)).unwrap();
        assert!(loaded.is_empty());
        assert!(path.with_extension("parquet.quarantined").exists());
        assert!(!path.exists());
    }
}

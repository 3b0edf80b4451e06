//! Bar source trait and structured error types.
//!
//! `BarSource` abstracts over where minute bars come from (Parquet cache,
//! in-memory fixtures) so the builder can run against either and tests can
//! hand it synthetic history.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{ensure_ordered, Bar, BarError};

/// Structured error types for bar data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parquet I/O error: {0}")]
    Parquet(String),

    #[error("csv error: {0}")]
    Csv(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("no cached data for symbol '{symbol}'; run `orblab import` first")]
    NoCachedData { symbol: String },

    #[error(transparent)]
    Unordered(#[from] BarError),
}

impl DataError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DataError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Anything that can hand out ordered minute bars for a symbol.
pub trait BarSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Bars for `symbol` with `start <= ts < end`, strictly ascending.
    fn load(&self, symbol: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Bar>, DataError>;
}

/// Bars held in memory, keyed by symbol. Used for fixtures and tests.
#[derive(Debug, Default, Clone)]
pub struct InMemorySource {
    bars: HashMap<String, Vec<Bar>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert bars for a symbol. Rejects unordered input.
    pub fn insert(&mut self, symbol: impl Into<String>, bars: Vec<Bar>) -> Result<(), DataError> {
        ensure_ordered(&bars)?;
        self.bars.insert(symbol.into(), bars);
        Ok(())
    }

    pub fn with_bars(mut self, symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self, DataError> {
        self.insert(symbol, bars)?;
        Ok(self)
    }
}

impl BarSource for InMemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    fn load(&self, symbol: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Bar>, DataError> {
        let bars = self.bars.get(symbol).map(Vec::as_slice).unwrap_or_default();
        Ok(crate::domain::bars_between(bars, start, end).to_vec())
    }
}

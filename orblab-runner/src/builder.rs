//! Daily Feature Builder — batch computation of DailyFeatureRecords.
//!
//! Two phases per batch:
//!
//! 1. Compute: every scheduled day is evaluated in parallel from bars alone.
//!    Each day only sees bars before its decision horizon.
//! 2. Finalize + write: sequentially in ascending date order, rolling
//!    statistics are attached from already-persisted earlier records and the
//!    record replaces whatever was stored for that day.
//!
//! A day that fails (no bars, store error) is reported and skipped; the rest
//! of the batch still runs.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use orblab_core::data::{BarSource, DataError};
use orblab_core::domain::{bars_between, ensure_ordered, Bar, InstrumentDescriptor, TradeSpec};
use orblab_core::engine::{
    average_true_range, decision_horizon, evaluate_session, resolve_window, trading_day_bounds, DayStats,
};
use orblab_core::fingerprint::fingerprint_bars;

use crate::record::{DailyFeatureRecord, SessionFeatures};
use crate::store::{RecordStore, StoreError};

/// Why a single day could not be built.
#[derive(Debug, Error)]
pub enum DayError {
    #[error("{day}: no bars inside the trading day")]
    MissingBars { day: NaiveDate },

    #[error("{day}: {source}")]
    Store {
        day: NaiveDate,
        #[source]
        source: StoreError,
    },
}

/// Failures that stop a whole batch before any day is computed.
///
/// A source with no bars at all for the instrument fails the batch with
/// `Data`. Gaps inside the range only fail the affected days.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("loading bars: {0}")]
    Data(#[from] DataError),

    #[error("end date {end} is before start date {start}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
}

/// One failed day in a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayFailure {
    pub day: NaiveDate,
    pub reason: String,
}

/// Outcome of a batch: which days were written and which failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildReport {
    pub instrument: String,
    pub succeeded: Vec<NaiveDate>,
    pub failed: Vec<DayFailure>,
}

impl BuildReport {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

pub struct DailyFeatureBuilder<'a> {
    instrument: &'a InstrumentDescriptor,
    trade_specs: &'a [TradeSpec],
    atr_lookback: usize,
}

impl<'a> DailyFeatureBuilder<'a> {
    pub fn new(instrument: &'a InstrumentDescriptor, trade_specs: &'a [TradeSpec], atr_lookback: usize) -> Self {
        Self {
            instrument,
            trade_specs,
            atr_lookback,
        }
    }

    /// Scheduled trading days in `[start, end]` for this instrument.
    pub fn scheduled_days(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        self.instrument.trading_days(start, end)
    }

    /// Earliest instant any computation for `day` reads.
    fn first_needed(&self, day: NaiveDate) -> DateTime<Utc> {
        let (day_start, _) = trading_day_bounds(day, self.instrument);
        self.instrument
            .sessions()
            .iter()
            .map(|s| resolve_window(day, s, self.instrument.timezone()).window_start)
            .fold(day_start, |acc, t| acc.min(t))
    }

    /// Compute everything for `day` that depends on bars alone.
    ///
    /// Pure: `bars` may extend past the day; only bars inside
    /// `[first_needed, decision_horizon)` are read or hashed. Rolling
    /// statistics are left unset until [`finalize`](Self::finalize).
    pub fn compute_day(&self, day: NaiveDate, bars: &[Bar]) -> Result<DailyFeatureRecord, DayError> {
        let visible = bars_between(bars, self.first_needed(day), decision_horizon(day, self.instrument));
        let (day_start, day_end) = trading_day_bounds(day, self.instrument);
        let stats = DayStats::from_bars(bars_between(visible, day_start, day_end))
            .ok_or(DayError::MissingBars { day })?;

        let sessions: BTreeMap<String, SessionFeatures> = self
            .instrument
            .sessions()
            .iter()
            .map(|session| {
                let eval = evaluate_session(visible, day, session, self.instrument, self.trade_specs);
                (
                    session.name().to_string(),
                    SessionFeatures {
                        window: eval.window,
                        range: eval.range,
                        range_to_atr: None,
                        trades: eval.trades,
                    },
                )
            })
            .collect();

        Ok(DailyFeatureRecord {
            instrument: self.instrument.symbol().to_string(),
            trading_day: day,
            day: stats,
            atr: None,
            sessions,
            bars_hash: fingerprint_bars(visible),
        })
    }

    /// Rolling ATR for `day` from persisted records of earlier trading days.
    ///
    /// `None` unless all `atr_lookback + 1` dependency records exist.
    pub fn rolling_atr(&self, day: NaiveDate, store: &dyn RecordStore) -> Result<Option<f64>, StoreError> {
        let deps = self.instrument.previous_trading_days(day, self.atr_lookback + 1);
        if deps.len() < self.atr_lookback + 1 {
            return Ok(None);
        }
        let mut stats = Vec::with_capacity(deps.len());
        for dep in deps {
            match store.read(self.instrument.symbol(), dep)? {
                Some(record) => stats.push(record.day),
                None => return Ok(None),
            }
        }
        Ok(average_true_range(&stats))
    }

    /// Attach rolling statistics read from `store`.
    pub fn finalize(
        &self,
        mut record: DailyFeatureRecord,
        store: &dyn RecordStore,
    ) -> Result<DailyFeatureRecord, StoreError> {
        record.atr = self.rolling_atr(record.trading_day, store)?;
        for features in record.sessions.values_mut() {
            features.range_to_atr = match (features.range, record.atr) {
                (Some(range), Some(atr)) if atr > 0.0 => Some(range.size / atr),
                _ => None,
            };
        }
        Ok(record)
    }

    /// Build and persist every scheduled day in `[start, end]`.
    pub fn build_range(
        &self,
        source: &dyn BarSource,
        store: &dyn RecordStore,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BuildReport, BuildError> {
        if end < start {
            return Err(BuildError::InvertedRange { start, end });
        }
        let symbol = self.instrument.symbol();
        let mut report = BuildReport {
            instrument: symbol.to_string(),
            ..BuildReport::default()
        };
        let days = self.scheduled_days(start, end);
        let (Some(&first), Some(&last)) = (days.first(), days.last()) else {
            tracing::info!(symbol, %start, %end, "no scheduled trading days in range");
            return Ok(report);
        };

        let bars = source.load(symbol, self.first_needed(first), decision_horizon(last, self.instrument))?;
        ensure_ordered(&bars).map_err(DataError::from)?;
        tracing::info!(symbol, days = days.len(), bars = bars.len(), source = source.name(), "building");

        let computed: Vec<(NaiveDate, Result<DailyFeatureRecord, DayError>)> = days
            .par_iter()
            .map(|&day| (day, self.compute_day(day, &bars)))
            .collect();

        for (day, result) in computed {
            let written = result.and_then(|record| {
                let record = self
                    .finalize(record, store)
                    .map_err(|source| DayError::Store { day, source })?;
                store
                    .write(&record)
                    .map_err(|source| DayError::Store { day, source })
            });
            match written {
                Ok(()) => report.succeeded.push(day),
                Err(e) => {
                    tracing::warn!(symbol, %day, error = %e, "day failed");
                    report.failed.push(DayFailure {
                        day,
                        reason: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            symbol,
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            "build complete"
        );
        Ok(report)
    }
}

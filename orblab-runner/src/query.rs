//! Aggregate queries over stored records.
//!
//! Missing days simply contribute no trades; gaps in the store are never an
//! error.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::metrics::{CostAdjustedMetrics, TradeMetrics};
use crate::record::TradeRow;
use crate::store::{RecordStore, StoreError};

/// Filter for an aggregate query. `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateQuery {
    pub instrument: String,
    pub session: Option<String>,
    pub trade_spec: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Stored days inside the date filter.
    pub days: usize,
    pub gross: TradeMetrics,
    pub net: CostAdjustedMetrics,
}

impl AggregateQuery {
    pub fn new(instrument: impl Into<String>) -> Self {
        Self {
            instrument: instrument.into(),
            ..Self::default()
        }
    }

    pub fn session(mut self, session: impl Into<String>) -> Self {
        self.session = Some(session.into());
        self
    }

    pub fn trade_spec(mut self, trade_spec: impl Into<String>) -> Self {
        self.trade_spec = Some(trade_spec.into());
        self
    }

    pub fn between(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    pub fn matches(&self, row: &TradeRow<'_>) -> bool {
        self.session.as_deref().map_or(true, |s| s == row.session)
            && self.trade_spec.as_deref().map_or(true, |t| t == row.trade_spec)
    }

    /// Run the query against `store`.
    pub fn run(&self, store: &dyn RecordStore) -> Result<QueryResult, StoreError> {
        let records = store.read_range(&self.instrument, self.start, self.end)?;
        let rows: Vec<TradeRow<'_>> = records
            .iter()
            .flat_map(|r| r.trades())
            .filter(|row| self.matches(row))
            .collect();

        let gross = TradeMetrics::compute(rows.iter().filter_map(|row| row.trade.outcome.as_ref()));
        let net = CostAdjustedMetrics::compute(rows.iter().filter_map(|row| row.trade.net.as_ref()));
        tracing::debug!(instrument = %self.instrument, days = records.len(), trades = gross.trades, "query");
        Ok(QueryResult {
            days: records.len(),
            gross,
            net,
        })
    }
}

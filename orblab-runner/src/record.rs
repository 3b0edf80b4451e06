//! DailyFeatureRecord — everything persisted for one (instrument, trading day).
//!
//! Maps are `BTreeMap` so serialization order is deterministic, and the record
//! carries no wall-clock fields: identical inputs serialize byte-identically.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use orblab_core::domain::OpeningRange;
use orblab_core::engine::{DayStats, SessionTrade, SessionWindow};
use orblab_core::fingerprint::BarsHash;

/// Version of the record layout. Bumped on any incompatible change.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyFeatureRecord {
    pub instrument: String,
    pub trading_day: NaiveDate,
    /// OHLC over the trading-day bounds.
    pub day: DayStats,
    /// Rolling ATR over earlier trading days; `None` until every dependency exists.
    pub atr: Option<f64>,
    /// Keyed by session name.
    pub sessions: BTreeMap<String, SessionFeatures>,
    /// Fingerprint of the bars this record was computed from.
    pub bars_hash: BarsHash,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionFeatures {
    pub window: SessionWindow,
    pub range: Option<OpeningRange>,
    pub range_to_atr: Option<f64>,
    /// Keyed by trade spec name.
    pub trades: BTreeMap<String, SessionTrade>,
}

/// On-disk wrapper that carries the schema version next to the record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordEnvelope {
    pub schema_version: u32,
    pub record: DailyFeatureRecord,
}

/// One trade row flattened out of a record.
#[derive(Debug, Clone, Copy)]
pub struct TradeRow<'a> {
    pub trading_day: NaiveDate,
    pub session: &'a str,
    pub trade_spec: &'a str,
    pub features: &'a SessionFeatures,
    pub trade: &'a SessionTrade,
}

impl DailyFeatureRecord {
    /// Iterate every (session, trade spec) entry in key order.
    pub fn trades(&self) -> impl Iterator<Item = TradeRow<'_>> + '_ {
        self.sessions.iter().flat_map(move |(session, features)| {
            features.trades.iter().map(move |(spec, trade)| TradeRow {
                trading_day: self.trading_day,
                session: session.as_str(),
                trade_spec: spec.as_str(),
                features,
                trade,
            })
        })
    }
}

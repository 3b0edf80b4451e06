//! orblab runner — daily feature builds, the feature store, metrics and queries.
//!
//! This crate builds on `orblab-core` to provide:
//! - TOML configuration of instruments, sessions and trade specs
//! - The versioned DailyFeatureRecord store
//! - Batch building of daily records with rolling statistics
//! - Gross and cost-adjusted trade metrics
//! - Aggregate queries and CSV export of the trade tape

pub mod builder;
pub mod config;
pub mod export;
pub mod metrics;
pub mod query;
pub mod record;
pub mod store;

pub use builder::{BuildError, BuildReport, DailyFeatureBuilder, DayError, DayFailure};
pub use config::{ConfigError, OrbConfig, RollingConfig, StoreConfig};
pub use export::{write_trades_csv, ExportError};
pub use metrics::{CostAdjustedMetrics, TradeMetrics};
pub use query::{AggregateQuery, QueryResult};
pub use record::{DailyFeatureRecord, RecordEnvelope, SessionFeatures, TradeRow, SCHEMA_VERSION};
pub use store::{FeatureStore, RecordStore, StoreError};

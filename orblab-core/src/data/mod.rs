//! Bar data access: sources, Parquet cache, CSV import, canonicalization

pub mod cache;
pub mod canonicalize;
pub mod csv_import;
mod frame;
pub mod provider;

pub use cache::{ParquetBarCache, WriteSummary};
pub use canonicalize::{canonicalize, Canonicalized};
pub use csv_import::{import_csv, read_bars};
pub use provider::{BarSource, DataError, InMemorySource};

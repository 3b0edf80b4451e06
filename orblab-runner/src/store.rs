//! Versioned feature store on the local filesystem.
//!
//! Layout: `{root}/instrument={SYMBOL}/{YYYY-MM-DD}.json`, plus a `store.json`
//! manifest at the root naming the schema version.
//!
//! Writes replace the whole record: serialize, write `{day}.json.tmp`, rename
//! into place. Readers see either the old record or the new one, never a
//! partial file.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::record::{DailyFeatureRecord, RecordEnvelope, SCHEMA_VERSION};

const MANIFEST: &str = "store.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path}: schema version {found} is not supported (expected {expected}); rebuild the store")]
    DeprecatedSchema {
        path: PathBuf,
        found: u32,
        expected: u32,
    },

    #[error("{0}")]
    Other(String),
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn json(path: &Path, source: serde_json::Error) -> Self {
        StoreError::Json {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Persistence boundary for daily records.
///
/// The builder only talks to this trait, so tests can substitute a store
/// that fails on chosen days.
pub trait RecordStore: Send + Sync {
    /// The record for `(instrument, day)`, or `None` if it was never written.
    fn read(&self, instrument: &str, day: NaiveDate) -> Result<Option<DailyFeatureRecord>, StoreError>;

    /// Replace the record for its `(instrument, trading_day)` wholesale.
    fn write(&self, record: &DailyFeatureRecord) -> Result<(), StoreError>;

    /// Days with a stored record for `instrument`, ascending.
    fn list_days(&self, instrument: &str) -> Result<Vec<NaiveDate>, StoreError>;

    /// Records for `instrument` with `start <= day <= end`, ascending. Gaps are skipped.
    fn read_range(
        &self,
        instrument: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<DailyFeatureRecord>, StoreError> {
        let mut out = Vec::new();
        for day in self.list_days(instrument)? {
            if start.is_some_and(|s| day < s) || end.is_some_and(|e| day > e) {
                continue;
            }
            if let Some(record) = self.read(instrument, day)? {
                out.push(record);
            }
        }
        Ok(out)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Manifest {
    schema_version: u32,
}

#[derive(Debug, Deserialize)]
struct VersionProbe {
    schema_version: u32,
}

/// JSON-file implementation of [`RecordStore`].
#[derive(Debug, Clone)]
pub struct FeatureStore {
    root: PathBuf,
}

impl FeatureStore {
    /// Open (or initialize) a store at `root`.
    ///
    /// A store written under another schema version is rejected.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| StoreError::io(&root, e))?;
        let manifest_path = root.join(MANIFEST);
        if manifest_path.exists() {
            let content = fs::read_to_string(&manifest_path).map_err(|e| StoreError::io(&manifest_path, e))?;
            let manifest: Manifest =
                serde_json::from_str(&content).map_err(|e| StoreError::json(&manifest_path, e))?;
            if manifest.schema_version != SCHEMA_VERSION {
                return Err(StoreError::DeprecatedSchema {
                    path: manifest_path,
                    found: manifest.schema_version,
                    expected: SCHEMA_VERSION,
                });
            }
        } else {
            let manifest = Manifest {
                schema_version: SCHEMA_VERSION,
            };
            let json = serde_json::to_string_pretty(&manifest).map_err(|e| StoreError::json(&manifest_path, e))?;
            write_atomic(&manifest_path, json.as_bytes())?;
            tracing::info!(root = %root.display(), schema_version = SCHEMA_VERSION, "initialized feature store");
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn instrument_dir(&self, instrument: &str) -> PathBuf {
        self.root.join(format!("instrument={instrument}"))
    }

    /// Path of the record file for `(instrument, day)`.
    pub fn record_path(&self, instrument: &str, day: NaiveDate) -> PathBuf {
        self.instrument_dir(instrument)
            .join(format!("{}.json", day.format("%Y-%m-%d")))
    }
}

impl RecordStore for FeatureStore {
    fn read(&self, instrument: &str, day: NaiveDate) -> Result<Option<DailyFeatureRecord>, StoreError> {
        let path = self.record_path(instrument, day);
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io(&path, e)),
        };
        // Check the version before trying the full record shape.
        let probe: VersionProbe = serde_json::from_str(&content).map_err(|e| StoreError::json(&path, e))?;
        if probe.schema_version != SCHEMA_VERSION {
            return Err(StoreError::DeprecatedSchema {
                path,
                found: probe.schema_version,
                expected: SCHEMA_VERSION,
            });
        }
        let envelope: RecordEnvelope = serde_json::from_str(&content).map_err(|e| StoreError::json(&path, e))?;
        Ok(Some(envelope.record))
    }

    fn write(&self, record: &DailyFeatureRecord) -> Result<(), StoreError> {
        let dir = self.instrument_dir(&record.instrument);
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;
        let path = self.record_path(&record.instrument, record.trading_day);
        let envelope = RecordEnvelope {
            schema_version: SCHEMA_VERSION,
            record: record.clone(),
        };
        let json = serde_json::to_string_pretty(&envelope).map_err(|e| StoreError::json(&path, e))?;
        write_atomic(&path, json.as_bytes())
    }

    fn list_days(&self, instrument: &str) -> Result<Vec<NaiveDate>, StoreError> {
        let dir = self.instrument_dir(instrument);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&dir, e)),
        };
        let mut days = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| StoreError::io(&dir, e))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(day) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
            {
                days.push(day);
            }
        }
        days.sort_unstable();
        Ok(days)
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, bytes).map_err(|e| StoreError::io(&tmp_path, e))?;
    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        StoreError::io(path, e)
    })
}

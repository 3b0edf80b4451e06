//! TOML configuration: store locations, rolling statistics, instruments, trade specs.
//!
//! Instruments, sessions and trade specs validate themselves while being
//! deserialized, so an invalid spec is rejected before any day is computed.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use orblab_core::domain::{InstrumentDescriptor, TradeSpec};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub rolling: RollingConfig,
    pub instruments: Vec<InstrumentDescriptor>,
    pub trade_specs: Vec<TradeSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Root of the daily feature store.
    #[serde(default = "default_features_dir")]
    pub features_dir: PathBuf,
    /// Root of the Parquet bar cache.
    #[serde(default = "default_bars_dir")]
    pub bars_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            features_dir: default_features_dir(),
            bars_dir: default_bars_dir(),
        }
    }
}

fn default_features_dir() -> PathBuf {
    PathBuf::from("data/features")
}

fn default_bars_dir() -> PathBuf {
    PathBuf::from("data/bars")
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollingConfig {
    /// Trading days averaged by the rolling ATR.
    #[serde(default = "default_atr_lookback")]
    pub atr_lookback: usize,
}

impl Default for RollingConfig {
    fn default() -> Self {
        Self {
            atr_lookback: default_atr_lookback(),
        }
    }
}

fn default_atr_lookback() -> usize {
    14
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config must declare at least one instrument")]
    NoInstruments,

    #[error("config must declare at least one trade spec")]
    NoTradeSpecs,

    #[error("duplicate instrument '{0}'")]
    DuplicateInstrument(String),

    #[error("duplicate trade spec '{0}'")]
    DuplicateTradeSpec(String),

    #[error("rolling.atr_lookback must be at least 1")]
    ZeroLookback,

    #[error("unknown instrument '{0}'")]
    UnknownInstrument(String),
}

impl OrbConfig {
    /// Load and validate a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: OrbConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Cross-entry checks the individual types cannot make on their own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.instruments.is_empty() {
            return Err(ConfigError::NoInstruments);
        }
        if self.trade_specs.is_empty() {
            return Err(ConfigError::NoTradeSpecs);
        }
        if self.rolling.atr_lookback == 0 {
            return Err(ConfigError::ZeroLookback);
        }
        let mut symbols = HashSet::new();
        for inst in &self.instruments {
            if !symbols.insert(inst.symbol()) {
                return Err(ConfigError::DuplicateInstrument(inst.symbol().to_string()));
            }
        }
        let mut names = HashSet::new();
        for spec in &self.trade_specs {
            if !names.insert(spec.name()) {
                return Err(ConfigError::DuplicateTradeSpec(spec.name().to_string()));
            }
        }
        Ok(())
    }

    pub fn instrument(&self, symbol: &str) -> Result<&InstrumentDescriptor, ConfigError> {
        self.instruments
            .iter()
            .find(|i| i.symbol() == symbol)
            .ok_or_else(|| ConfigError::UnknownInstrument(symbol.to_string()))
    }
}

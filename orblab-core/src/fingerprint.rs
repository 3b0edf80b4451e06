//! Bar fingerprinting — identifies exactly which bars a record was built from.
//!
//! Two runs over the same bars produce the same hash; any changed price,
//! volume or instant changes it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::Bar;

/// BLAKE3 hex digest over a bar sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BarsHash(pub String);

impl fmt::Display for BarsHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hash bars in order. Floats are hashed by bit pattern, so the digest does not
/// depend on formatting.
pub fn fingerprint_bars(bars: &[Bar]) -> BarsHash {
    let mut hasher = blake3::Hasher::new();
    for bar in bars {
        hasher.update(&bar.ts.timestamp_millis().to_le_bytes());
        for v in [bar.open, bar.high, bar.low, bar.close, bar.volume] {
            hasher.update(&v.to_bits().to_le_bytes());
        }
    }
    BarsHash(hasher.finalize().to_hex().to_string())
}

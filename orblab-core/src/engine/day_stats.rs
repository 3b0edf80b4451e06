//! Daily OHLC statistics and the rolling average true range.

use serde::{Deserialize, Serialize};

use crate::domain::Bar;

/// OHLC of one trading day, from the bars inside its trading-day bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayStats {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub bar_count: usize,
}

impl DayStats {
    /// Aggregate ordered bars. Void bars are skipped; `None` if nothing remains.
    pub fn from_bars(bars: &[Bar]) -> Option<Self> {
        let mut valid = bars.iter().filter(|b| !b.is_void());
        let first = valid.next()?;
        let mut stats = DayStats {
            open: first.open,
            high: first.high,
            low: first.low,
            close: first.close,
            bar_count: 1,
        };
        for bar in valid {
            stats.high = stats.high.max(bar.high);
            stats.low = stats.low.min(bar.low);
            stats.close = bar.close;
            stats.bar_count += 1;
        }
        Some(stats)
    }

    /// True range against the previous day's close.
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }
}

/// Mean true range over consecutive days, oldest first.
///
/// The first entry only supplies the previous close, so `n` days yield the
/// average of `n - 1` true ranges. Returns `None` with fewer than two days.
pub fn average_true_range(days: &[DayStats]) -> Option<f64> {
    if days.len() < 2 {
        return None;
    }
    let sum: f64 = days
        .windows(2)
        .map(|pair| pair[1].true_range(pair[0].close))
        .sum();
    Some(sum / (days.len() - 1) as f64)
}

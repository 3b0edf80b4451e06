//! Range aggregator — high/low over a session's range window.

use crate::domain::{bars_between, Bar, OpeningRange};

use super::session_window::SessionWindow;

/// Opening range over `[window_start, window_end)`.
///
/// Returns `None` when the window holds no bars or the range is degenerate
/// (`high <= low`). Callers treat both the same.
pub fn opening_range(bars: &[Bar], window: &SessionWindow) -> Option<OpeningRange> {
    let in_window = bars_between(bars, window.window_start, window.window_end);
    let (high, low) = in_window
        .iter()
        .filter(|b| !b.is_void())
        .fold(None, |acc: Option<(f64, f64)>, b| match acc {
            None => Some((b.high, b.low)),
            Some((h, l)) => Some((h.max(b.high), l.min(b.low))),
        })?;
    OpeningRange::new(high, low)
}

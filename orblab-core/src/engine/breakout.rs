//! Breakout detector — first confirmed close outside the opening range.

use crate::domain::{bars_between, Bar, BreakoutEvent, Direction, OpeningRange};

use super::session_window::SessionWindow;

/// How a close must clear the range to count toward a breakout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreakoutRule {
    /// Consecutive qualifying closes required; the breakout is the last one.
    pub confirm_bars: u32,
    /// Extra distance beyond the edge, in price units.
    pub buffer: f64,
}

impl BreakoutRule {
    /// First close outside the range, no buffer.
    pub const FIRST_CLOSE: Self = Self {
        confirm_bars: 1,
        buffer: 0.0,
    };
}

impl Default for BreakoutRule {
    fn default() -> Self {
        Self::FIRST_CLOSE
    }
}

/// Scan `[window_end, scan_end)` in ascending order for a breakout.
///
/// Only closes are compared; wicks through the edge do not count. A close that
/// qualifies in neither direction resets both confirmation counters, and a
/// close in one direction resets the other's.
pub fn detect_breakout(
    bars: &[Bar],
    window: &SessionWindow,
    range: &OpeningRange,
    rule: BreakoutRule,
) -> Option<BreakoutEvent> {
    let needed = rule.confirm_bars.max(1);
    let up_level = range.high + rule.buffer;
    let down_level = range.low - rule.buffer;
    let mut up_run = 0u32;
    let mut down_run = 0u32;

    for bar in bars_between(bars, window.window_end, window.scan_end) {
        if bar.is_void() {
            up_run = 0;
            down_run = 0;
            continue;
        }
        let direction = if bar.close > up_level {
            up_run += 1;
            down_run = 0;
            Direction::Up
        } else if bar.close < down_level {
            down_run += 1;
            up_run = 0;
            Direction::Down
        } else {
            up_run = 0;
            down_run = 0;
            continue;
        };
        let run = match direction {
            Direction::Up => up_run,
            Direction::Down => down_run,
        };
        if run >= needed {
            return Some(BreakoutEvent {
                direction,
                ts: bar.ts,
                close: bar.close,
            });
        }
    }
    None
}

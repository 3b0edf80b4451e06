//! ORB engine — pure functions from ordered bars to per-session results.
//!
//! Pipeline per (trading day, session):
//!
//! 1. Resolve the session window to absolute instants
//! 2. Aggregate the opening range over `[window_start, window_end)`
//! 3. Detect the first confirmed close outside the range before `scan_end`
//! 4. Simulate the trade forward from the breakout, stop-first on ties

pub mod breakout;
pub mod day_stats;
pub mod evaluate;
pub mod opening_range;
pub mod session_window;
pub mod simulator;

pub use breakout::{detect_breakout, BreakoutRule};
pub use day_stats::{average_true_range, DayStats};
pub use evaluate::{breakout_rule, evaluate_session, SessionEvaluation, SessionTrade};
pub use opening_range::opening_range;
pub use session_window::{decision_horizon, local_to_utc, resolve_window, trading_day_bounds, SessionWindow};
pub use simulator::{simulate_trade, trade_levels, TradeLevels};

//! Domain types for orblab

pub mod bar;
pub mod instrument;
pub mod range;
pub mod session;
pub mod trade;

pub use bar::{bars_between, ensure_ordered, Bar, BarError};
pub use instrument::{InstrumentBuilder, InstrumentDescriptor, InstrumentError};
pub use range::{BreakoutEvent, Direction, OpeningRange};
pub use session::{SessionSpec, SessionSpecError};
pub use trade::{OutcomeKind, StopMode, TradeOutcome, TradeSpec, TradeSpecError};

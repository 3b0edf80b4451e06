//! Per-instrument descriptor: tick size, calendar, cost model, session catalog.
//!
//! Every component reads instrument specifics from here instead of branching
//! on the symbol name.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::session::SessionSpec;
use crate::cost_model::CostModel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawInstrument")]
pub struct InstrumentDescriptor {
    symbol: String,
    timezone: Tz,
    tick_size: f64,
    trading_day_start: NaiveTime,
    trading_weekdays: Vec<Weekday>,
    holidays: Vec<NaiveDate>,
    costs: CostModel,
    sessions: Vec<SessionSpec>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawInstrument {
    symbol: String,
    timezone: Tz,
    tick_size: f64,
    trading_day_start: NaiveTime,
    #[serde(default = "default_weekdays")]
    trading_weekdays: Vec<Weekday>,
    #[serde(default)]
    holidays: Vec<NaiveDate>,
    #[serde(default)]
    costs: CostModel,
    sessions: Vec<SessionSpec>,
}

fn default_weekdays() -> Vec<Weekday> {
    vec![
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
    ]
}

impl TryFrom<RawInstrument> for InstrumentDescriptor {
    type Error = InstrumentError;

    fn try_from(raw: RawInstrument) -> Result<Self, Self::Error> {
        InstrumentDescriptor::builder(raw.symbol, raw.timezone, raw.tick_size)
            .trading_day_start(raw.trading_day_start)
            .trading_weekdays(raw.trading_weekdays)
            .holidays(raw.holidays)
            .costs(raw.costs)
            .sessions(raw.sessions)
            .build()
    }
}

impl InstrumentDescriptor {
    /// Start a descriptor with a 09:00 trading day, Mon–Fri, no costs, no sessions.
    pub fn builder(symbol: impl Into<String>, timezone: Tz, tick_size: f64) -> InstrumentBuilder {
        InstrumentBuilder {
            symbol: symbol.into(),
            timezone,
            tick_size,
            trading_day_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            trading_weekdays: default_weekdays(),
            holidays: Vec::new(),
            costs: CostModel::default(),
            sessions: Vec::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn tick_size(&self) -> f64 {
        self.tick_size
    }

    pub fn trading_day_start(&self) -> NaiveTime {
        self.trading_day_start
    }

    pub fn costs(&self) -> &CostModel {
        &self.costs
    }

    pub fn sessions(&self) -> &[SessionSpec] {
        &self.sessions
    }

    pub fn session(&self, name: &str) -> Option<&SessionSpec> {
        self.sessions.iter().find(|s| s.name() == name)
    }

    /// True if `day` is a scheduled trading day (listed weekday, not a holiday).
    pub fn is_trading_day(&self, day: NaiveDate) -> bool {
        self.trading_weekdays.contains(&day.weekday()) && !self.holidays.contains(&day)
    }

    /// Scheduled trading days in `[start, end]`, ascending.
    pub fn trading_days(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        start
            .iter_days()
            .take_while(|d| *d <= end)
            .filter(|d| self.is_trading_day(*d))
            .collect()
    }

    /// The `count` scheduled trading days strictly before `day`, oldest first.
    pub fn previous_trading_days(&self, day: NaiveDate, count: usize) -> Vec<NaiveDate> {
        let mut out = Vec::with_capacity(count);
        let mut cursor = day;
        while out.len() < count {
            match cursor.pred_opt() {
                Some(prev) => cursor = prev,
                None => break,
            }
            if self.is_trading_day(cursor) {
                out.push(cursor);
            }
        }
        out.reverse();
        out
    }
}

pub struct InstrumentBuilder {
    symbol: String,
    timezone: Tz,
    tick_size: f64,
    trading_day_start: NaiveTime,
    trading_weekdays: Vec<Weekday>,
    holidays: Vec<NaiveDate>,
    costs: CostModel,
    sessions: Vec<SessionSpec>,
}

impl InstrumentBuilder {
    pub fn trading_day_start(mut self, start: NaiveTime) -> Self {
        self.trading_day_start = start;
        self
    }

    pub fn trading_weekdays(mut self, weekdays: Vec<Weekday>) -> Self {
        self.trading_weekdays = weekdays;
        self
    }

    pub fn holidays(mut self, holidays: Vec<NaiveDate>) -> Self {
        self.holidays = holidays;
        self
    }

    pub fn costs(mut self, costs: CostModel) -> Self {
        self.costs = costs;
        self
    }

    pub fn sessions(mut self, sessions: Vec<SessionSpec>) -> Self {
        self.sessions = sessions;
        self
    }

    pub fn session(mut self, session: SessionSpec) -> Self {
        self.sessions.push(session);
        self
    }

    pub fn build(self) -> Result<InstrumentDescriptor, InstrumentError> {
        let symbol = self.symbol;
        if symbol.trim().is_empty() {
            return Err(InstrumentError::EmptySymbol);
        }
        if !self.tick_size.is_finite() || self.tick_size <= 0.0 {
            return Err(InstrumentError::InvalidTickSize {
                symbol,
                tick_size: self.tick_size,
            });
        }
        if self.trading_weekdays.is_empty() {
            return Err(InstrumentError::NoTradingWeekdays { symbol });
        }
        if self.sessions.is_empty() {
            return Err(InstrumentError::NoSessions { symbol });
        }
        let mut seen = HashSet::new();
        for session in &self.sessions {
            if !seen.insert(session.name()) {
                return Err(InstrumentError::DuplicateSession {
                    symbol,
                    session: session.name().to_string(),
                });
            }
        }
        let costs = self.costs;
        let valid = |v: f64| v.is_finite() && v >= 0.0;
        if !valid(costs.commission_ticks) || !valid(costs.slippage_ticks) {
            return Err(InstrumentError::InvalidCost { symbol });
        }

        Ok(InstrumentDescriptor {
            symbol,
            timezone: self.timezone,
            tick_size: self.tick_size,
            trading_day_start: self.trading_day_start,
            trading_weekdays: self.trading_weekdays,
            holidays: self.holidays,
            costs,
            sessions: self.sessions,
        })
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum InstrumentError {
    #[error("instrument symbol must not be empty")]
    EmptySymbol,

    #[error("{symbol}: tick_size must be positive, got {tick_size}")]
    InvalidTickSize { symbol: String, tick_size: f64 },

    #[error("{symbol}: at least one trading weekday is required")]
    NoTradingWeekdays { symbol: String },

    #[error("{symbol}: at least one session is required")]
    NoSessions { symbol: String },

    #[error("{symbol}: duplicate session '{session}'")]
    DuplicateSession { symbol: String, session: String },

    #[error("{symbol}: cost assumptions must be finite and non-negative")]
    InvalidCost { symbol: String },
}

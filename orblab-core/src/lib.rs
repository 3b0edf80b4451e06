//! orblab core — opening range breakout engine.
//!
//! This crate contains the deterministic part of the system:
//! - Domain types (bars, sessions, instruments, trade specs, outcomes)
//! - Session window resolution across midnight and daylight-saving changes
//! - Opening range, breakout detection and trade simulation
//! - Cost model and daily statistics
//! - Bar data access (Parquet cache, CSV import, in-memory source)
//!
//! Nothing here persists results; see `orblab-runner` for the feature store.

pub mod cost_model;
pub mod data;
pub mod domain;
pub mod engine;
pub mod fingerprint;

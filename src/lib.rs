//! Shift and sanction accrual engine.
//!
//! This crate tracks members going on and off duty, derives whole-minute
//! worked durations net of pauses, works those minutes off against
//! time-based disciplinary marks, blocks suspended members from starting
//! shifts, and aggregates worked time into weekly reports.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod store;

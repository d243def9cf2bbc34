//! Calculation logic for the duty engine.
//!
//! This module contains the pure functions behind the engine: whole-minute
//! duration arithmetic for shifts and pauses, reporting week boundaries,
//! per-member weekly aggregation, and the hour-to-minute quota conversion
//! applied to sanctions at the caller boundary.

mod duration;
mod quota;
mod week;
mod weekly_totals;

pub use duration::{NetMinutes, elapsed_minutes, format_minutes, net_minutes, paused_minutes};
pub use quota::required_minutes_from_hours;
pub use week::{week_start, week_window};
pub use weekly_totals::calculate_weekly_totals;

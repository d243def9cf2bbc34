//! Report window and weekly total models.
//!
//! This module contains the [`WeekWindow`] type used to select the shift logs
//! counted by a weekly report, and the [`WeeklyTotal`] rows the report yields.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{MemberId, ShiftLog};

/// An inclusive time window over which shift logs are reported or reset.
///
/// # Example
///
/// ```
/// use duty_engine::models::WeekWindow;
/// use chrono::NaiveDateTime;
///
/// let parse = |s| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
/// let window = WeekWindow {
///     start: parse("2026-01-12 00:00:00"),
///     end: parse("2026-01-18 23:59:59"),
/// };
///
/// assert!(window.contains(parse("2026-01-12 00:00:00"))); // start
/// assert!(window.contains(parse("2026-01-18 23:59:59"))); // end
/// assert!(!window.contains(parse("2026-01-19 00:00:00"))); // after
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekWindow {
    /// First instant of the window (inclusive).
    pub start: NaiveDateTime,
    /// Last instant of the window (inclusive).
    pub end: NaiveDateTime,
}

impl WeekWindow {
    /// Checks if a timestamp falls within the window, both bounds inclusive.
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        at >= self.start && at <= self.end
    }

    /// Checks if a closed log lies entirely within the window.
    ///
    /// Open logs never qualify, and neither do logs that straddle a bound.
    pub fn contains_log(&self, log: &ShiftLog) -> bool {
        match log.end_time {
            Some(end) => log.start_time >= self.start && end <= self.end,
            None => false,
        }
    }
}

/// Net worked minutes of one member over a report window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyTotal {
    /// The member the total belongs to.
    pub member_id: MemberId,
    /// Net worked minutes.
    pub minutes: i64,
    /// The same total expressed in hours.
    pub hours: Decimal,
}

impl WeeklyTotal {
    /// Builds a total from net minutes.
    pub fn new(member_id: MemberId, minutes: i64) -> Self {
        Self {
            member_id,
            minutes,
            hours: (Decimal::new(minutes, 0) / Decimal::new(60, 0)).round_dp(2),
        }
    }
}

//! Shift log and pause interval models.
//!
//! This module defines the [`ShiftLog`] and [`PauseInterval`] records that
//! make up a member's duty history.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::MemberId;

/// Identifies a [`ShiftLog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShiftLogId(pub u64);

impl std::fmt::Display for ShiftLogId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies a [`PauseInterval`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PauseId(pub u64);

/// One duty session of a member.
///
/// A log with no `end_time` is open: the member is currently on that shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftLog {
    /// Unique identifier for the log.
    pub id: ShiftLogId,
    /// The member who worked the shift.
    pub member_id: MemberId,
    /// The mission the shift was started for.
    #[serde(default)]
    pub mission_type: Option<String>,
    /// When the shift started.
    pub start_time: NaiveDateTime,
    /// When the shift ended, `None` while it is still open.
    pub end_time: Option<NaiveDateTime>,
}

impl ShiftLog {
    /// Returns true while the shift has not been ended.
    ///
    /// # Example
    ///
    /// ```
    /// use duty_engine::models::{MemberId, ShiftLog, ShiftLogId};
    /// use chrono::NaiveDateTime;
    ///
    /// let log = ShiftLog {
    ///     id: ShiftLogId(1),
    ///     member_id: MemberId(1),
    ///     mission_type: None,
    ///     start_time: NaiveDateTime::parse_from_str("2026-01-15 09:00:00", "%Y-%m-%d %H:%M:%S").unwrap(),
    ///     end_time: None,
    /// };
    /// assert!(log.is_open());
    /// ```
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }
}

/// A pause taken within a shift.
///
/// A pause with no `pause_end` is open: the member is currently paused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseInterval {
    /// Unique identifier for the pause.
    pub id: PauseId,
    /// The shift the pause belongs to.
    pub shift_log_id: ShiftLogId,
    /// When the pause started.
    pub pause_start: NaiveDateTime,
    /// When the pause ended, `None` while it is still open.
    pub pause_end: Option<NaiveDateTime>,
}

impl PauseInterval {
    /// Returns true while the pause has not been resumed or force-closed.
    pub fn is_open(&self) -> bool {
        self.pause_end.is_none()
    }
}

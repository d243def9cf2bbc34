//! Core data models for the duty engine.
//!
//! This module contains all the domain records the engine persists and reports.

mod duty_state;
mod member;
mod report;
mod sanction;
mod shift_log;

pub use duty_state::{DutyState, DutyStatus, OperationalStatus};
pub use member::{MemberId, MemberProfile};
pub use report::{WeekWindow, WeeklyTotal};
pub use sanction::{Sanction, SanctionId, SanctionKind, SanctionSummary};
pub use shift_log::{PauseId, PauseInterval, ShiftLog, ShiftLogId};

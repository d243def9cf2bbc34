//! Per-member duty state.
//!
//! This module defines the [`DutyState`] record, the derived [`DutyStatus`]
//! of the shift state machine, and the auxiliary [`OperationalStatus`].

use serde::{Deserialize, Serialize};

/// Operational availability of an on-duty member.
///
/// This is dispatch metadata and plays no part in the shift state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationalStatus {
    /// Free to take an assignment.
    #[default]
    Available,
    /// Currently handling an intervention.
    OnIntervention,
    /// Occupied with something else.
    Busy,
}

impl OperationalStatus {
    /// Parses a caller-supplied status, falling back to `Available`.
    ///
    /// Both the snake_case names and the legacy dispatch spellings are
    /// accepted. Anything else is not an error: it simply resolves to
    /// [`OperationalStatus::Available`].
    ///
    /// # Example
    ///
    /// ```
    /// use duty_engine::models::OperationalStatus;
    ///
    /// assert_eq!(OperationalStatus::parse_or_default("busy"), OperationalStatus::Busy);
    /// assert_eq!(OperationalStatus::parse_or_default("intervention"), OperationalStatus::OnIntervention);
    /// assert_eq!(OperationalStatus::parse_or_default("napping"), OperationalStatus::Available);
    /// ```
    pub fn parse_or_default(raw: &str) -> Self {
        match raw.trim() {
            "available" | "disponible" => OperationalStatus::Available,
            "on_intervention" | "intervention" => OperationalStatus::OnIntervention,
            "busy" | "occupe" => OperationalStatus::Busy,
            _ => OperationalStatus::Available,
        }
    }
}

impl std::fmt::Display for OperationalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationalStatus::Available => write!(f, "available"),
            OperationalStatus::OnIntervention => write!(f, "on_intervention"),
            OperationalStatus::Busy => write!(f, "busy"),
        }
    }
}

/// State of the shift state machine for one member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DutyStatus {
    /// Not on duty.
    Off,
    /// On duty and working.
    On,
    /// On duty, currently paused.
    OnPaused,
}

/// The live duty record of a member.
///
/// Exactly one exists per member once the member has been touched by a
/// transition. `on_pause` implies `on_duty`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DutyState {
    /// Whether the member is on duty.
    pub on_duty: bool,
    /// Whether the member is paused within the current shift.
    pub on_pause: bool,
    /// The mission the member is on, if any.
    pub mission_type: Option<String>,
    /// The zone the member is assigned to, if any.
    pub zone: Option<String>,
    /// Dispatch availability.
    #[serde(default)]
    pub operational_status: OperationalStatus,
}

impl DutyState {
    /// Returns the state machine status derived from the flags.
    ///
    /// # Example
    ///
    /// ```
    /// use duty_engine::models::{DutyState, DutyStatus};
    ///
    /// let state = DutyState { on_duty: true, on_pause: true, ..DutyState::default() };
    /// assert_eq!(state.status(), DutyStatus::OnPaused);
    /// assert_eq!(DutyState::default().status(), DutyStatus::Off);
    /// ```
    pub fn status(&self) -> DutyStatus {
        match (self.on_duty, self.on_pause) {
            (false, _) => DutyStatus::Off,
            (true, false) => DutyStatus::On,
            (true, true) => DutyStatus::OnPaused,
        }
    }

    /// Resets the record to off duty.
    ///
    /// Zone and operational status survive; they describe the member rather
    /// than the shift.
    pub fn reset_to_off(&mut self) {
        self.on_duty = false;
        self.on_pause = false;
        self.mission_type = None;
    }
}

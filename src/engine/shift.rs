//! Shift state machine.
//!
//! Each member cycles through `Off -> On -> OnPaused -> On -> Off`. Every
//! transition runs as one store transaction and is safe to repeat: a second
//! identical call is a successful no-op, never an error, because duty actions
//! are routinely double-submitted.
//!
//! The machine does not know about the sanction ledger. It is wired to two
//! narrow capabilities instead: a [`SuspensionGate`] consulted by
//! [`ShiftStateMachine::start`] and a [`WorkedMinutesSink`] that receives the
//! net minutes of every shift closed by [`ShiftStateMachine::end`]. Both
//! run inside the transition's transaction.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::calculation::net_minutes;
use crate::clock::Clock;
use crate::error::{EngineError, EngineResult};
use crate::models::{DutyState, MemberId, OperationalStatus, ShiftLogId};
use crate::store::{Store, Tables};

/// Receives the net worked minutes of each completed shift.
pub trait WorkedMinutesSink: Send + Sync {
    /// Posts `minutes` for `member_id` inside the current transaction.
    fn apply_worked_minutes(
        &self,
        tables: &mut Tables,
        member_id: MemberId,
        minutes: i64,
    ) -> EngineResult<()>;
}

/// Decides whether a member may start a shift.
pub trait SuspensionGate: Send + Sync {
    /// Returns true if `member_id` must not start a shift.
    fn blocks_start(&self, tables: &Tables, member_id: MemberId) -> bool;
}

/// The outcome of ending an open shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedShift {
    /// The log that was closed.
    pub shift_log_id: ShiftLogId,
    /// The member who worked it.
    pub member_id: MemberId,
    /// Net worked minutes posted to the sanction ledger.
    pub net_minutes: i64,
}

/// Owns the duty transitions of every member.
pub struct ShiftStateMachine {
    store: Arc<Store>,
    clock: Arc<dyn Clock>,
    gate: Arc<dyn SuspensionGate>,
    sink: Arc<dyn WorkedMinutesSink>,
}

impl ShiftStateMachine {
    /// Creates a state machine over `store`.
    pub fn new(
        store: Arc<Store>,
        clock: Arc<dyn Clock>,
        gate: Arc<dyn SuspensionGate>,
        sink: Arc<dyn WorkedMinutesSink>,
    ) -> Self {
        Self {
            store,
            clock,
            gate,
            sink,
        }
    }

    /// Starts (or re-asserts) a member's shift.
    ///
    /// If the member is already on duty the flags are rewritten and the
    /// mission replaced, and a log is opened only if none is open. That
    /// second branch repairs a duty state left claiming "on duty" without a
    /// log. A pause still open on the current log is closed, since the
    /// member is no longer paused afterward.
    ///
    /// Returns the id of the member's open log.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Suspended`] if the member is suspended; nothing
    /// is written in that case.
    pub fn start(
        &self,
        member_id: MemberId,
        mission_type: Option<String>,
    ) -> EngineResult<ShiftLogId> {
        let now = self.clock.now();

        self.store.transaction(|tables| {
            if self.gate.blocks_start(tables, member_id) {
                info!(%member_id, "Shift start refused, member is suspended");
                return Err(EngineError::Suspended { member_id });
            }

            let was_on_duty = tables.duty_state(member_id).is_some_and(|s| s.on_duty);
            let open_log = tables.open_shift_log(member_id).map(|log| log.id);

            let log_id = match open_log {
                Some(id) => {
                    if let Some(pause) = tables.open_pause(id).map(|p| p.id) {
                        tables.close_pause(pause, now)?;
                        debug!(%member_id, shift_log_id = %id, "Open pause closed by restart");
                    }
                    debug!(%member_id, shift_log_id = %id, "Shift already open");
                    id
                }
                None => {
                    if was_on_duty {
                        warn!(%member_id, "Duty state on without an open log, opening a new one");
                    }
                    let id = tables.insert_shift_log(member_id, mission_type.clone(), now)?;
                    info!(%member_id, shift_log_id = %id, mission = ?mission_type, "Shift started");
                    id
                }
            };

            let state = tables.duty_state_mut(member_id);
            state.on_duty = true;
            state.on_pause = false;
            state.mission_type = mission_type;
            Ok(log_id)
        })
    }

    /// Pauses the member's open shift.
    ///
    /// Returns false when there is no open shift or the shift is already
    /// paused.
    pub fn pause(&self, member_id: MemberId) -> EngineResult<bool> {
        let now = self.clock.now();

        self.store.transaction(|tables| {
            let Some(log_id) = tables.open_shift_log(member_id).map(|log| log.id) else {
                debug!(%member_id, "Pause ignored, no open shift");
                return Ok(false);
            };
            if tables.open_pause(log_id).is_some() {
                debug!(%member_id, shift_log_id = %log_id, "Pause ignored, already paused");
                return Ok(false);
            }

            tables.insert_pause(log_id, now)?;
            let state = tables.duty_state_mut(member_id);
            state.on_duty = true;
            state.on_pause = true;
            info!(%member_id, shift_log_id = %log_id, "Shift paused");
            Ok(true)
        })
    }

    /// Resumes the member's paused shift.
    ///
    /// Returns false when there is no open shift or no open pause.
    pub fn resume(&self, member_id: MemberId) -> EngineResult<bool> {
        let now = self.clock.now();

        self.store.transaction(|tables| {
            let Some(log_id) = tables.open_shift_log(member_id).map(|log| log.id) else {
                debug!(%member_id, "Resume ignored, no open shift");
                return Ok(false);
            };
            let Some(pause_id) = tables.open_pause(log_id).map(|pause| pause.id) else {
                debug!(%member_id, shift_log_id = %log_id, "Resume ignored, not paused");
                return Ok(false);
            };

            tables.close_pause(pause_id, now)?;
            tables.duty_state_mut(member_id).on_pause = false;
            info!(%member_id, shift_log_id = %log_id, "Shift resumed");
            Ok(true)
        })
    }

    /// Ends the member's shift.
    ///
    /// An open shift is closed together with any open pause, its net minutes
    /// are computed and posted to the worked-minutes sink. Whether or not a
    /// shift was open, the duty state is then reset to off. That reset is
    /// unconditional so that a duty state and its logs can never stay out of
    /// step.
    ///
    /// Returns the completed shift, or `None` if no shift was open.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidInterval`] if the clock reads earlier
    /// than the shift or pause start; nothing is written in that case.
    pub fn end(&self, member_id: MemberId) -> EngineResult<Option<CompletedShift>> {
        let now = self.clock.now();

        self.store.transaction(|tables| {
            let completed = match tables.open_shift_log(member_id).map(|log| log.id) {
                Some(log_id) => {
                    if let Some(pause_id) = tables.open_pause(log_id).map(|pause| pause.id) {
                        tables.close_pause(pause_id, now)?;
                    }
                    tables.close_shift_log(log_id, now)?;

                    let net = match tables.shift_log(log_id) {
                        Some(log) => net_minutes(log, tables.pauses_for(log_id))?,
                        None => {
                            return Err(EngineError::storage(format!(
                                "shift log {} missing after close",
                                log_id
                            )));
                        }
                    };
                    self.sink
                        .apply_worked_minutes(tables, member_id, net.minutes)?;

                    info!(%member_id, shift_log_id = %log_id, net_minutes = net.minutes, "Shift ended");
                    Some(CompletedShift {
                        shift_log_id: log_id,
                        member_id,
                        net_minutes: net.minutes,
                    })
                }
                None => {
                    debug!(%member_id, "End with no open shift, resetting duty state");
                    None
                }
            };

            tables.duty_state_mut(member_id).reset_to_off();
            Ok(completed)
        })
    }

    /// Sets the member's zone; blank zones clear it.
    pub fn set_zone(&self, member_id: MemberId, zone: Option<String>) -> EngineResult<()> {
        let zone = zone
            .map(|z| z.trim().to_string())
            .filter(|z| !z.is_empty());

        self.store.transaction(|tables| {
            debug!(%member_id, zone = ?zone, "Zone set");
            tables.duty_state_mut(member_id).zone = zone;
            Ok(())
        })
    }

    /// Sets the member's operational status from a raw value.
    ///
    /// Unknown values resolve to [`OperationalStatus::Available`]. Returns
    /// the status actually stored.
    pub fn set_operational_status(
        &self,
        member_id: MemberId,
        raw_status: &str,
    ) -> EngineResult<OperationalStatus> {
        let status = OperationalStatus::parse_or_default(raw_status);

        self.store.transaction(|tables| {
            debug!(%member_id, %status, "Operational status set");
            tables.duty_state_mut(member_id).operational_status = status;
            Ok(status)
        })
    }

    /// Changes the mission of the member's current shift.
    pub fn set_mission_type(
        &self,
        member_id: MemberId,
        mission_type: Option<String>,
    ) -> EngineResult<()> {
        self.store.transaction(|tables| {
            if let Some(log_id) = tables.open_shift_log(member_id).map(|log| log.id) {
                tables.set_shift_log_mission(log_id, mission_type.clone());
            }
            debug!(%member_id, mission = ?mission_type, "Mission changed");
            tables.duty_state_mut(member_id).mission_type = mission_type;
            Ok(())
        })
    }

    /// Returns the member's duty state; untouched members read as off duty.
    pub fn duty_state(&self, member_id: MemberId) -> EngineResult<DutyState> {
        self.store
            .read(|tables| tables.duty_state(member_id).cloned().unwrap_or_default())
    }

    /// Returns every member currently on duty, ascending by id.
    pub fn on_duty_members(&self) -> EngineResult<Vec<(MemberId, DutyState)>> {
        self.store.read(|tables| {
            tables
                .duty_states()
                .filter(|(_, state)| state.on_duty)
                .map(|(id, state)| (id, state.clone()))
                .collect()
        })
    }
}

//! Arena tables behind the store.
//!
//! Records live in maps keyed by their typed ids. The per-member uniqueness
//! rules are enforced here, at the storage boundary, through small indexes
//! that the insert and close methods keep in step with the records:
//!
//! - at most one open [`ShiftLog`] per member,
//! - at most one open [`PauseInterval`] per shift log,
//! - at most one active [`Sanction`] per member.
//!
//! A violated rule is a [`EngineError::Storage`] error, which rolls back the
//! surrounding transaction.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{
    DutyState, MemberId, PauseId, PauseInterval, Sanction, SanctionId, SanctionKind, ShiftLog,
    ShiftLogId,
};

/// Every record the engine persists.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    duty_states: BTreeMap<MemberId, DutyState>,
    shift_logs: BTreeMap<ShiftLogId, ShiftLog>,
    pauses: BTreeMap<PauseId, PauseInterval>,
    sanctions: BTreeMap<SanctionId, Sanction>,
    open_log_by_member: BTreeMap<MemberId, ShiftLogId>,
    open_pause_by_log: BTreeMap<ShiftLogId, PauseId>,
    active_sanction_by_member: BTreeMap<MemberId, SanctionId>,
    last_shift_log_id: u64,
    last_pause_id: u64,
    last_sanction_id: u64,
}

impl Tables {
    // Duty state

    /// Returns a member's duty state, if the member was ever touched.
    pub fn duty_state(&self, member_id: MemberId) -> Option<&DutyState> {
        self.duty_states.get(&member_id)
    }

    /// Returns a member's duty state, creating an off-duty record if needed.
    pub fn duty_state_mut(&mut self, member_id: MemberId) -> &mut DutyState {
        self.duty_states.entry(member_id).or_default()
    }

    /// Iterates over every duty state in ascending member order.
    pub fn duty_states(&self) -> impl Iterator<Item = (MemberId, &DutyState)> {
        self.duty_states.iter().map(|(id, state)| (*id, state))
    }

    // Shift logs

    /// Returns a shift log by id.
    pub fn shift_log(&self, id: ShiftLogId) -> Option<&ShiftLog> {
        self.shift_logs.get(&id)
    }

    /// Returns the member's open shift log, if any.
    pub fn open_shift_log(&self, member_id: MemberId) -> Option<&ShiftLog> {
        self.open_log_by_member
            .get(&member_id)
            .and_then(|id| self.shift_logs.get(id))
    }

    /// Iterates over every shift log in ascending id order.
    pub fn shift_logs(&self) -> impl Iterator<Item = &ShiftLog> {
        self.shift_logs.values()
    }

    /// Opens a new shift log for a member.
    ///
    /// # Errors
    ///
    /// Fails if the member already has an open log.
    pub fn insert_shift_log(
        &mut self,
        member_id: MemberId,
        mission_type: Option<String>,
        start_time: NaiveDateTime,
    ) -> EngineResult<ShiftLogId> {
        if let Some(open) = self.open_log_by_member.get(&member_id) {
            return Err(EngineError::storage(format!(
                "member {} already has open shift log {}",
                member_id, open
            )));
        }

        self.last_shift_log_id += 1;
        let id = ShiftLogId(self.last_shift_log_id);
        self.shift_logs.insert(
            id,
            ShiftLog {
                id,
                member_id,
                mission_type,
                start_time,
                end_time: None,
            },
        );
        self.open_log_by_member.insert(member_id, id);
        Ok(id)
    }

    /// Records the mission type on an open shift log.
    pub fn set_shift_log_mission(&mut self, id: ShiftLogId, mission_type: Option<String>) {
        if let Some(log) = self.shift_logs.get_mut(&id).filter(|log| log.is_open()) {
            log.mission_type = mission_type;
        }
    }

    /// Closes an open shift log.
    ///
    /// # Errors
    ///
    /// Fails if the log does not exist or is already closed.
    pub fn close_shift_log(&mut self, id: ShiftLogId, end_time: NaiveDateTime) -> EngineResult<()> {
        let log = self
            .shift_logs
            .get_mut(&id)
            .ok_or_else(|| EngineError::storage(format!("shift log {} not found", id)))?;
        if !log.is_open() {
            return Err(EngineError::storage(format!(
                "shift log {} is already closed",
                id
            )));
        }

        log.end_time = Some(end_time);
        self.open_log_by_member.remove(&log.member_id);
        Ok(())
    }

    // Pauses

    /// Returns the open pause of a shift log, if any.
    pub fn open_pause(&self, shift_log_id: ShiftLogId) -> Option<&PauseInterval> {
        self.open_pause_by_log
            .get(&shift_log_id)
            .and_then(|id| self.pauses.get(id))
    }

    /// Iterates over the pauses of one shift log.
    pub fn pauses_for(&self, shift_log_id: ShiftLogId) -> impl Iterator<Item = &PauseInterval> {
        self.pauses
            .values()
            .filter(move |pause| pause.shift_log_id == shift_log_id)
    }

    /// Iterates over every pause in ascending id order.
    pub fn pauses(&self) -> impl Iterator<Item = &PauseInterval> {
        self.pauses.values()
    }

    /// Opens a pause within an open shift log.
    ///
    /// # Errors
    ///
    /// Fails if the log is missing or closed, or already has an open pause.
    pub fn insert_pause(
        &mut self,
        shift_log_id: ShiftLogId,
        pause_start: NaiveDateTime,
    ) -> EngineResult<PauseId> {
        match self.shift_logs.get(&shift_log_id) {
            Some(log) if log.is_open() => {}
            Some(_) => {
                return Err(EngineError::storage(format!(
                    "cannot pause closed shift log {}",
                    shift_log_id
                )));
            }
            None => {
                return Err(EngineError::storage(format!(
                    "shift log {} not found",
                    shift_log_id
                )));
            }
        }
        if self.open_pause_by_log.contains_key(&shift_log_id) {
            return Err(EngineError::storage(format!(
                "shift log {} already has an open pause",
                shift_log_id
            )));
        }

        self.last_pause_id += 1;
        let id = PauseId(self.last_pause_id);
        self.pauses.insert(
            id,
            PauseInterval {
                id,
                shift_log_id,
                pause_start,
                pause_end: None,
            },
        );
        self.open_pause_by_log.insert(shift_log_id, id);
        Ok(id)
    }

    /// Closes an open pause.
    ///
    /// # Errors
    ///
    /// Fails if the pause does not exist or is already closed.
    pub fn close_pause(&mut self, id: PauseId, pause_end: NaiveDateTime) -> EngineResult<()> {
        let pause = self
            .pauses
            .get_mut(&id)
            .ok_or_else(|| EngineError::storage(format!("pause {} not found", id.0)))?;
        if !pause.is_open() {
            return Err(EngineError::storage(format!(
                "pause {} is already closed",
                id.0
            )));
        }

        pause.pause_end = Some(pause_end);
        self.open_pause_by_log.remove(&pause.shift_log_id);
        Ok(())
    }

    /// Deletes shift logs together with their pauses.
    ///
    /// Returns the number of logs and pauses removed. Unknown ids are skipped.
    pub fn delete_shift_logs(&mut self, ids: &[ShiftLogId]) -> (usize, usize) {
        let doomed: BTreeSet<ShiftLogId> = ids.iter().copied().collect();
        let pauses_before = self.pauses.len();
        self.pauses
            .retain(|_, pause| !doomed.contains(&pause.shift_log_id));
        let pauses_removed = pauses_before - self.pauses.len();

        let mut logs_removed = 0;
        for id in &doomed {
            if let Some(log) = self.shift_logs.remove(id) {
                logs_removed += 1;
                if self.open_log_by_member.get(&log.member_id) == Some(id) {
                    self.open_log_by_member.remove(&log.member_id);
                }
                self.open_pause_by_log.remove(id);
            }
        }
        (logs_removed, pauses_removed)
    }

    /// Deletes every shift log and pause.
    ///
    /// Returns the number of logs and pauses removed. Duty states are kept.
    pub fn clear_history(&mut self) -> (usize, usize) {
        let removed = (self.shift_logs.len(), self.pauses.len());
        self.shift_logs.clear();
        self.pauses.clear();
        self.open_log_by_member.clear();
        self.open_pause_by_log.clear();
        removed
    }

    // Sanctions

    /// Returns the member's active sanction, if any.
    pub fn active_sanction(&self, member_id: MemberId) -> Option<&Sanction> {
        self.active_sanction_by_member
            .get(&member_id)
            .and_then(|id| self.sanctions.get(id))
    }

    /// Iterates over a member's sanctions, oldest first.
    pub fn sanctions_for(&self, member_id: MemberId) -> impl Iterator<Item = &Sanction> {
        self.sanctions
            .values()
            .filter(move |sanction| sanction.member_id == member_id)
    }

    /// Inserts a new active sanction.
    ///
    /// # Errors
    ///
    /// Fails if the member already has an active sanction.
    pub fn insert_sanction(
        &mut self,
        member_id: MemberId,
        kind: SanctionKind,
        required_minutes: Option<u32>,
        created_at: NaiveDateTime,
    ) -> EngineResult<SanctionId> {
        if self.active_sanction_by_member.contains_key(&member_id) {
            return Err(EngineError::storage(format!(
                "member {} already has an active sanction",
                member_id
            )));
        }

        self.last_sanction_id += 1;
        let id = SanctionId(self.last_sanction_id);
        self.sanctions.insert(
            id,
            Sanction {
                id,
                member_id,
                kind,
                active: true,
                required_minutes,
                worked_minutes: 0,
                created_at,
            },
        );
        self.active_sanction_by_member.insert(member_id, id);
        Ok(id)
    }

    /// Applies `update` to the member's active sanction.
    ///
    /// The active-sanction index follows the record: if `update` clears the
    /// `active` flag the member is left with no active sanction. Returns the
    /// updated record, or `None` when the member had no active sanction.
    pub fn update_active_sanction(
        &mut self,
        member_id: MemberId,
        update: impl FnOnce(&mut Sanction),
    ) -> Option<&Sanction> {
        let id = *self.active_sanction_by_member.get(&member_id)?;
        let sanction = self.sanctions.get_mut(&id)?;
        update(sanction);
        if !sanction.active {
            self.active_sanction_by_member.remove(&member_id);
        }
        self.sanctions.get(&id)
    }

    /// Deactivates the member's active sanction, returning its id.
    pub fn deactivate_sanction(&mut self, member_id: MemberId) -> Option<SanctionId> {
        self.update_active_sanction(member_id, |sanction| sanction.active = false)
            .map(|sanction| sanction.id)
    }

    // Snapshot support

    pub(super) fn to_snapshot(&self) -> TablesSnapshot {
        TablesSnapshot {
            duty_states: self
                .duty_states
                .iter()
                .map(|(id, state)| (*id, state.clone()))
                .collect(),
            shift_logs: self.shift_logs.values().cloned().collect(),
            pauses: self.pauses.values().cloned().collect(),
            sanctions: self.sanctions.values().cloned().collect(),
            last_shift_log_id: self.last_shift_log_id,
            last_pause_id: self.last_pause_id,
            last_sanction_id: self.last_sanction_id,
        }
    }

    /// Rebuilds tables and indexes from a snapshot, re-checking every rule.
    pub(super) fn from_snapshot(snapshot: TablesSnapshot) -> EngineResult<Self> {
        let mut tables = Tables {
            duty_states: snapshot.duty_states.into_iter().collect(),
            last_shift_log_id: snapshot.last_shift_log_id,
            last_pause_id: snapshot.last_pause_id,
            last_sanction_id: snapshot.last_sanction_id,
            ..Tables::default()
        };

        for log in snapshot.shift_logs {
            if log.is_open() {
                if let Some(other) = tables.open_log_by_member.insert(log.member_id, log.id) {
                    return Err(EngineError::storage(format!(
                        "snapshot has two open shift logs for member {} ({} and {})",
                        log.member_id, other, log.id
                    )));
                }
            }
            tables.last_shift_log_id = tables.last_shift_log_id.max(log.id.0);
            tables.shift_logs.insert(log.id, log);
        }

        for pause in snapshot.pauses {
            if pause.is_open() && tables.open_pause_by_log.insert(pause.shift_log_id, pause.id).is_some() {
                return Err(EngineError::storage(format!(
                    "snapshot has two open pauses for shift log {}",
                    pause.shift_log_id
                )));
            }
            tables.last_pause_id = tables.last_pause_id.max(pause.id.0);
            tables.pauses.insert(pause.id, pause);
        }

        for sanction in snapshot.sanctions {
            if sanction.active
                && tables
                    .active_sanction_by_member
                    .insert(sanction.member_id, sanction.id)
                    .is_some()
            {
                return Err(EngineError::storage(format!(
                    "snapshot has two active sanctions for member {}",
                    sanction.member_id
                )));
            }
            tables.last_sanction_id = tables.last_sanction_id.max(sanction.id.0);
            tables.sanctions.insert(sanction.id, sanction);
        }

        Ok(tables)
    }
}

/// Serialized form of [`Tables`]; indexes are rebuilt on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(super) struct TablesSnapshot {
    duty_states: Vec<(MemberId, DutyState)>,
    shift_logs: Vec<ShiftLog>,
    pauses: Vec<PauseInterval>,
    sanctions: Vec<Sanction>,
    last_shift_log_id: u64,
    last_pause_id: u64,
    last_sanction_id: u64,
}

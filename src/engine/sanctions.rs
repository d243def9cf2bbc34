//! Sanction ledger.
//!
//! Sanctions are single-slot per member: applying one supersedes whatever
//! was active. Minor and major marks are worked off by duty minutes posted
//! when shifts end, and clear themselves once the quota is met. A
//! suspension blocks starting shifts until it is cleared by hand.

use std::sync::Arc;

use tracing::{debug, info};

use crate::clock::Clock;
use crate::error::{EngineError, EngineResult};
use crate::models::{MemberId, Sanction, SanctionKind, SanctionSummary};
use crate::store::{Store, Tables};

use super::shift::{SuspensionGate, WorkedMinutesSink};

/// Owns the disciplinary records of every member.
pub struct SanctionLedger {
    store: Arc<Store>,
    clock: Arc<dyn Clock>,
}

impl SanctionLedger {
    /// Creates a ledger over `store`.
    pub fn new(store: Arc<Store>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Returns true if the member has an active suspension.
    pub fn is_suspended(&self, member_id: MemberId) -> EngineResult<bool> {
        self.store
            .read(|tables| suspended_in(tables, member_id))
    }

    /// Returns the member's active sanction, if any.
    pub fn active_sanction(&self, member_id: MemberId) -> EngineResult<Option<Sanction>> {
        self.store
            .read(|tables| tables.active_sanction(member_id).cloned())
    }

    /// Returns every sanction the member ever received, oldest first.
    pub fn history(&self, member_id: MemberId) -> EngineResult<Vec<Sanction>> {
        self.store
            .read(|tables| tables.sanctions_for(member_id).cloned().collect())
    }

    /// Applies a new sanction, superseding the member's active one.
    ///
    /// `required_minutes` is kept only for minor and major marks. Callers
    /// convert and validate the quota before calling, see
    /// [`required_minutes_from_hours`](crate::calculation::required_minutes_from_hours).
    pub fn apply(
        &self,
        member_id: MemberId,
        kind: SanctionKind,
        required_minutes: Option<u32>,
    ) -> EngineResult<Sanction> {
        let required_minutes = required_minutes.filter(|_| kind.is_time_based());
        let now = self.clock.now();

        self.store.transaction(|tables| {
            if let Some(previous) = tables.deactivate_sanction(member_id) {
                debug!(%member_id, sanction_id = previous.0, "Previous sanction superseded");
            }
            let id = tables.insert_sanction(member_id, kind, required_minutes, now)?;
            info!(%member_id, %kind, ?required_minutes, sanction_id = id.0, "Sanction applied");

            tables
                .active_sanction(member_id)
                .cloned()
                .ok_or_else(|| EngineError::storage(format!("sanction {} missing after insert", id.0)))
        })
    }

    /// Lifts the member's active sanction.
    ///
    /// Returns false, without error, when there was nothing to lift.
    pub fn clear(&self, member_id: MemberId) -> EngineResult<bool> {
        self.store.transaction(|tables| {
            let cleared = tables.deactivate_sanction(member_id);
            match cleared {
                Some(id) => info!(%member_id, sanction_id = id.0, "Sanction cleared"),
                None => debug!(%member_id, "No active sanction to clear"),
            }
            Ok(cleared.is_some())
        })
    }

    /// Posts worked minutes against the member's active mark in its own transaction.
    pub fn apply_worked_minutes(&self, member_id: MemberId, minutes: i64) -> EngineResult<()> {
        self.store
            .transaction(|tables| post_worked_minutes(tables, member_id, minutes))
    }

    /// Builds one overview row per member, in the order given.
    pub fn overview(&self, members: &[MemberId]) -> EngineResult<Vec<SanctionSummary>> {
        self.store.read(|tables| {
            members
                .iter()
                .map(|id| SanctionSummary::from_active(*id, tables.active_sanction(*id)))
                .collect()
        })
    }
}

impl WorkedMinutesSink for SanctionLedger {
    fn apply_worked_minutes(
        &self,
        tables: &mut Tables,
        member_id: MemberId,
        minutes: i64,
    ) -> EngineResult<()> {
        post_worked_minutes(tables, member_id, minutes)
    }
}

impl SuspensionGate for SanctionLedger {
    fn blocks_start(&self, tables: &Tables, member_id: MemberId) -> bool {
        suspended_in(tables, member_id)
    }
}

fn suspended_in(tables: &Tables, member_id: MemberId) -> bool {
    tables
        .active_sanction(member_id)
        .is_some_and(|s| s.kind == SanctionKind::Suspension)
}

fn post_worked_minutes(tables: &mut Tables, member_id: MemberId, minutes: i64) -> EngineResult<()> {
    let is_mark = tables
        .active_sanction(member_id)
        .is_some_and(|s| s.kind.is_time_based());
    if !is_mark {
        debug!(%member_id, minutes, "No active mark, worked minutes not posted");
        return Ok(());
    }

    let minutes = u32::try_from(minutes.max(0)).unwrap_or(u32::MAX);
    let updated = tables.update_active_sanction(member_id, |sanction| {
        sanction.worked_minutes = sanction.worked_minutes.saturating_add(minutes);
        if sanction.quota_met() {
            sanction.active = false;
        }
    });

    if let Some(sanction) = updated {
        if sanction.active {
            debug!(
                %member_id,
                minutes,
                worked = sanction.worked_minutes,
                remaining = ?sanction.remaining_minutes(),
                "Worked minutes posted to mark"
            );
        } else {
            info!(
                %member_id,
                sanction_id = sanction.id.0,
                worked = sanction.worked_minutes,
                "Mark worked off, sanction cleared"
            );
        }
    }
    Ok(())
}

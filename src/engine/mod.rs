//! The duty engine.
//!
//! This module wires the three stateful components over one [`Store`]:
//!
//! - [`ShiftStateMachine`]: start, pause, resume and end transitions
//! - [`SanctionLedger`]: disciplinary records and worked-minute accrual
//! - [`WeeklyReport`]: weekly totals and history resets
//!
//! The state machine only sees the ledger through the [`WorkedMinutesSink`]
//! and [`SuspensionGate`] traits.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use chrono::{Duration, NaiveDateTime};
//! use duty_engine::clock::ManualClock;
//! use duty_engine::engine::DutyEngine;
//! use duty_engine::models::{MemberId, SanctionKind};
//! use duty_engine::store::Store;
//!
//! let start = NaiveDateTime::parse_from_str("2026-01-15 09:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
//! let clock = Arc::new(ManualClock::new(start));
//! let engine = DutyEngine::new(Arc::new(Store::in_memory()), clock.clone());
//! let member = MemberId(7);
//!
//! engine.sanctions().apply(member, SanctionKind::MinorMark, Some(60)).unwrap();
//! engine.shifts().start(member, None).unwrap();
//! clock.advance(Duration::minutes(60));
//! let shift = engine.shifts().end(member).unwrap().unwrap();
//!
//! assert_eq!(shift.net_minutes, 60);
//! assert!(engine.sanctions().active_sanction(member).unwrap().is_none());
//! ```

mod reports;
mod sanctions;
mod shift;

pub use reports::{ResetSummary, WeeklyReport};
pub use sanctions::SanctionLedger;
pub use shift::{CompletedShift, ShiftStateMachine, SuspensionGate, WorkedMinutesSink};

use std::sync::Arc;

use chrono::NaiveDate;

use crate::calculation::{NetMinutes, net_minutes, paused_minutes};
use crate::clock::Clock;
use crate::error::{EngineError, EngineResult};
use crate::models::ShiftLogId;
use crate::store::Store;

/// Facade over the engine components sharing one store and clock.
pub struct DutyEngine {
    store: Arc<Store>,
    clock: Arc<dyn Clock>,
    shifts: ShiftStateMachine,
    sanctions: Arc<SanctionLedger>,
    reports: WeeklyReport,
}

impl DutyEngine {
    /// Builds an engine, wiring the sanction ledger into the state machine.
    pub fn new(store: Arc<Store>, clock: Arc<dyn Clock>) -> Self {
        let sanctions = Arc::new(SanctionLedger::new(store.clone(), clock.clone()));
        let shifts = ShiftStateMachine::new(
            store.clone(),
            clock.clone(),
            sanctions.clone(),
            sanctions.clone(),
        );
        let reports = WeeklyReport::new(store.clone(), clock.clone());

        Self {
            store,
            clock,
            shifts,
            sanctions,
            reports,
        }
    }

    /// The shift state machine.
    pub fn shifts(&self) -> &ShiftStateMachine {
        &self.shifts
    }

    /// The sanction ledger.
    pub fn sanctions(&self) -> &SanctionLedger {
        &self.sanctions
    }

    /// Weekly reporting and resets.
    pub fn reports(&self) -> &WeeklyReport {
        &self.reports
    }

    /// Today's date on the engine clock.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Net worked minutes of a closed shift log.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidRequest`] if the log is unknown or still
    /// open.
    pub fn net_minutes(&self, shift_log_id: ShiftLogId) -> EngineResult<NetMinutes> {
        self.store.read(|tables| {
            let log = tables
                .shift_log(shift_log_id)
                .ok_or_else(|| unknown_log(shift_log_id))?;
            net_minutes(log, tables.pauses_for(shift_log_id))
        })?
    }

    /// Whole minutes spent in closed pauses of a shift log.
    pub fn paused_minutes(&self, shift_log_id: ShiftLogId) -> EngineResult<i64> {
        self.store.read(|tables| {
            if tables.shift_log(shift_log_id).is_none() {
                return Err(unknown_log(shift_log_id));
            }
            paused_minutes(tables.pauses_for(shift_log_id))
        })?
    }
}

fn unknown_log(shift_log_id: ShiftLogId) -> EngineError {
    EngineError::InvalidRequest {
        field: "shift_log_id".to_string(),
        message: format!("shift log {} not found", shift_log_id),
    }
}

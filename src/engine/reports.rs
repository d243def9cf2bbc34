//! Weekly reporting and history maintenance.
//!
//! Reports are read-only over persisted closed logs. Resets delete history
//! on demand; nothing here runs on a timer.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::calculation::{calculate_weekly_totals, week_window};
use crate::clock::Clock;
use crate::error::{EngineError, EngineResult};
use crate::models::{ShiftLogId, WeekWindow, WeeklyTotal};
use crate::store::Store;

/// Counts of the records removed by a reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetSummary {
    /// Shift logs deleted.
    pub logs: usize,
    /// Pause intervals deleted.
    pub pauses: usize,
}

/// Aggregates worked minutes per week and resets history.
pub struct WeeklyReport {
    store: Arc<Store>,
    clock: Arc<dyn Clock>,
}

impl WeeklyReport {
    /// Creates a report over `store`.
    pub fn new(store: Arc<Store>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Totals net minutes per member for the week containing `reference`.
    ///
    /// Rows are ordered by `sort_key`, typically the member's display name.
    /// Equal keys fall back to ascending member id so the order is stable.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidInterval`] if a stored log or pause is
    /// inverted.
    pub fn weekly_totals<K, F>(&self, reference: NaiveDate, sort_key: F) -> EngineResult<Vec<WeeklyTotal>>
    where
        K: Ord,
        F: Fn(&WeeklyTotal) -> K,
    {
        let window = week_window(reference);
        let mut totals = self.store.read(|tables| {
            calculate_weekly_totals(tables.shift_logs(), tables.pauses(), &window)
        })??;

        // Totals arrive in member id order; a stable sort keeps it for ties.
        totals.sort_by_key(|total| sort_key(total));
        info!(
            week_start = %window.start,
            members = totals.len(),
            "Weekly totals computed"
        );
        Ok(totals)
    }

    /// Deletes the closed logs lying entirely inside `window`, with their pauses.
    ///
    /// Open logs are never matched, even if they started inside the window.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidRequest`] if the window ends before it
    /// starts.
    pub fn reset_window(&self, window: WeekWindow) -> EngineResult<ResetSummary> {
        if window.start > window.end {
            warn!(start = %window.start, end = %window.end, "Reset window rejected");
            return Err(EngineError::InvalidRequest {
                field: "window".to_string(),
                message: format!("end {} is before start {}", window.end, window.start),
            });
        }

        self.store.transaction(|tables| {
            let ids: Vec<ShiftLogId> = tables
                .shift_logs()
                .filter(|log| window.contains_log(log))
                .map(|log| log.id)
                .collect();
            let (logs, pauses) = tables.delete_shift_logs(&ids);
            info!(start = %window.start, end = %window.end, logs, pauses, "Report window reset");
            Ok(ResetSummary { logs, pauses })
        })
    }

    /// Resets the week containing today.
    pub fn reset_current_week(&self) -> EngineResult<ResetSummary> {
        self.reset_window(week_window(self.clock.today()))
    }

    /// Deletes every shift log and pause, open ones included.
    ///
    /// Duty states are left as they are, so a member still on duty keeps
    /// its flags but loses the provenance of the shift in progress.
    pub fn reset_all(&self) -> EngineResult<ResetSummary> {
        self.store.transaction(|tables| {
            let (logs, pauses) = tables.clear_history();
            warn!(logs, pauses, "All shift history deleted");
            Ok(ResetSummary { logs, pauses })
        })
    }
}

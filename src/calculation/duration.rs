//! Duration arithmetic for shifts and pauses.
//!
//! This module derives whole-minute durations from timestamps. Every
//! interval is truncated toward zero to whole minutes on its own, so a
//! shift's paused time is the sum of each pause's whole minutes.

use chrono::NaiveDateTime;
use tracing::{error, warn};

use crate::error::{EngineError, EngineResult};
use crate::models::{PauseInterval, ShiftLog};

/// Net worked minutes of a closed shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetMinutes {
    /// Net minutes, never negative.
    pub minutes: i64,
    /// Elapsed minus paused minutes before clamping.
    pub raw_minutes: i64,
}

impl NetMinutes {
    /// Returns true when the raw value was negative and had to be clamped.
    pub fn was_clamped(&self) -> bool {
        self.raw_minutes < 0
    }
}

/// Returns the whole minutes between two timestamps.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInterval`] if `end` is before `start`.
///
/// # Example
///
/// ```
/// use duty_engine::calculation::elapsed_minutes;
/// use chrono::NaiveDateTime;
///
/// let parse = |s| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
/// let minutes = elapsed_minutes(parse("2026-01-15 09:00:00"), parse("2026-01-15 10:10:59")).unwrap();
/// assert_eq!(minutes, 70);
/// ```
pub fn elapsed_minutes(start: NaiveDateTime, end: NaiveDateTime) -> EngineResult<i64> {
    if end < start {
        error!(%start, %end, "Interval ends before it starts");
        return Err(EngineError::InvalidInterval { start, end });
    }
    Ok((end - start).num_minutes())
}

/// Sums the whole minutes of every closed pause in `pauses`.
///
/// Open pauses are skipped; they count only once resumed or force-closed.
pub fn paused_minutes<'a>(
    pauses: impl IntoIterator<Item = &'a PauseInterval>,
) -> EngineResult<i64> {
    let mut total = 0;
    for pause in pauses {
        if let Some(end) = pause.pause_end {
            total += elapsed_minutes(pause.pause_start, end)?;
        }
    }
    Ok(total)
}

/// Computes the net worked minutes of a closed shift.
///
/// Only pauses belonging to `log` are counted. The result is clamped at
/// zero; a clamp is reported with a warning since it means overlapping
/// pauses or bad timestamps.
///
/// # Errors
///
/// Returns [`EngineError::InvalidRequest`] if the log is still open, and
/// [`EngineError::InvalidInterval`] if the log or any pause is inverted.
///
/// # Example
///
/// ```
/// use duty_engine::calculation::net_minutes;
/// use duty_engine::models::{MemberId, PauseId, PauseInterval, ShiftLog, ShiftLogId};
/// use chrono::NaiveDateTime;
///
/// let parse = |s| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
/// let log = ShiftLog {
///     id: ShiftLogId(1),
///     member_id: MemberId(1),
///     mission_type: None,
///     start_time: parse("2026-01-15 09:00:00"),
///     end_time: Some(parse("2026-01-15 10:10:00")),
/// };
/// let pause = PauseInterval {
///     id: PauseId(1),
///     shift_log_id: ShiftLogId(1),
///     pause_start: parse("2026-01-15 09:30:00"),
///     pause_end: Some(parse("2026-01-15 09:40:00")),
/// };
///
/// assert_eq!(net_minutes(&log, [&pause]).unwrap().minutes, 60);
/// ```
pub fn net_minutes<'a>(
    log: &ShiftLog,
    pauses: impl IntoIterator<Item = &'a PauseInterval>,
) -> EngineResult<NetMinutes> {
    let end = log.end_time.ok_or_else(|| EngineError::InvalidRequest {
        field: "end_time".to_string(),
        message: format!("shift log {} is still open", log.id),
    })?;

    let elapsed = elapsed_minutes(log.start_time, end)?;
    let paused = paused_minutes(pauses.into_iter().filter(|p| p.shift_log_id == log.id))?;
    let raw_minutes = elapsed - paused;

    if raw_minutes < 0 {
        warn!(
            shift_log_id = %log.id,
            member_id = %log.member_id,
            elapsed,
            paused,
            raw_minutes,
            "Paused time exceeds shift length, net minutes clamped to zero"
        );
    }

    Ok(NetMinutes {
        minutes: raw_minutes.max(0),
        raw_minutes,
    })
}

/// Formats minutes as hours and zero-padded minutes, e.g. `"7h 05min"`.
///
/// # Example
///
/// ```
/// use duty_engine::calculation::format_minutes;
///
/// assert_eq!(format_minutes(425), "7h 05min");
/// assert_eq!(format_minutes(0), "0h 00min");
/// ```
pub fn format_minutes(minutes: i64) -> String {
    let minutes = minutes.max(0);
    format!("{}h {:02}min", minutes / 60, minutes % 60)
}

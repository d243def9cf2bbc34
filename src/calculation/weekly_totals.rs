//! Per-member net minute totals over a report window.

use std::collections::{BTreeMap, HashMap};

use crate::error::EngineResult;
use crate::models::{MemberId, PauseInterval, ShiftLog, ShiftLogId, WeekWindow, WeeklyTotal};

use super::net_minutes;

/// Sums net worked minutes per member over the logs fully inside `window`.
///
/// Open logs and logs straddling either window bound are left out, so a
/// shift crossing midnight between Sunday and Monday counts toward neither
/// week. Members appear once, in ascending id order; members without a
/// qualifying log are absent.
///
/// # Example
///
/// ```
/// use duty_engine::calculation::{calculate_weekly_totals, week_window};
/// use duty_engine::models::{MemberId, ShiftLog, ShiftLogId};
/// use chrono::{NaiveDate, NaiveDateTime};
///
/// let parse = |s| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
/// let logs = vec![ShiftLog {
///     id: ShiftLogId(1),
///     member_id: MemberId(4),
///     mission_type: None,
///     start_time: parse("2026-01-13 09:00:00"),
///     end_time: Some(parse("2026-01-13 12:00:00")),
/// }];
/// let window = week_window(NaiveDate::from_ymd_opt(2026, 1, 15).unwrap());
///
/// let totals = calculate_weekly_totals(&logs, &[], &window).unwrap();
/// assert_eq!(totals.len(), 1);
/// assert_eq!(totals[0].minutes, 180);
/// ```
pub fn calculate_weekly_totals<'a>(
    logs: impl IntoIterator<Item = &'a ShiftLog>,
    pauses: impl IntoIterator<Item = &'a PauseInterval>,
    window: &WeekWindow,
) -> EngineResult<Vec<WeeklyTotal>> {
    let mut pauses_by_log: HashMap<ShiftLogId, Vec<&PauseInterval>> = HashMap::new();
    for pause in pauses {
        pauses_by_log.entry(pause.shift_log_id).or_default().push(pause);
    }

    let mut per_member: BTreeMap<MemberId, i64> = BTreeMap::new();
    for log in logs.into_iter().filter(|log| window.contains_log(log)) {
        let pauses = pauses_by_log.get(&log.id).map(Vec::as_slice).unwrap_or(&[]);
        let net = net_minutes(log, pauses.iter().copied())?;
        *per_member.entry(log.member_id).or_insert(0) += net.minutes;
    }

    Ok(per_member
        .into_iter()
        .map(|(member_id, minutes)| WeeklyTotal::new(member_id, minutes))
        .collect())
}

//! Reporting week boundaries.
//!
//! A reporting week runs from Monday 00:00:00 through Sunday 23:59:59 local
//! time, both bounds inclusive, following the ISO week.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime};

use crate::models::WeekWindow;

/// Returns the Monday of the week containing `date`.
///
/// # Example
///
/// ```
/// use duty_engine::calculation::week_start;
/// use chrono::NaiveDate;
///
/// // 2026-01-18 is a Sunday; its week started on Monday 2026-01-12.
/// let sunday = NaiveDate::from_ymd_opt(2026, 1, 18).unwrap();
/// assert_eq!(week_start(sunday), NaiveDate::from_ymd_opt(2026, 1, 12).unwrap());
/// ```
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Returns the Monday-to-Sunday window containing `date`.
///
/// # Example
///
/// ```
/// use duty_engine::calculation::week_window;
/// use chrono::{NaiveDate, NaiveDateTime};
///
/// let window = week_window(NaiveDate::from_ymd_opt(2026, 1, 15).unwrap());
/// let parse = |s| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
/// assert_eq!(window.start, parse("2026-01-12 00:00:00"));
/// assert_eq!(window.end, parse("2026-01-18 23:59:59"));
/// ```
pub fn week_window(date: NaiveDate) -> WeekWindow {
    let start = week_start(date).and_time(NaiveTime::MIN);
    WeekWindow {
        start,
        end: start + Duration::days(7) - Duration::seconds(1),
    }
}

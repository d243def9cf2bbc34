//! Sanction quota conversion at the caller boundary.
//!
//! Administrators state a quota in hours; the ledger stores whole minutes.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::SanctionKind;

/// Converts an hour quota to the minutes the ledger stores.
///
/// Only minor and major marks carry a quota. Missing or negative hours are
/// treated as no quota at all rather than rejected, and so are hours whose
/// minute count overflows. Half minutes round away from zero.
///
/// # Example
///
/// ```
/// use duty_engine::calculation::required_minutes_from_hours;
/// use duty_engine::models::SanctionKind;
/// use rust_decimal::Decimal;
///
/// let hours = Some(Decimal::new(25, 1)); // 2.5 hours
/// assert_eq!(required_minutes_from_hours(SanctionKind::MinorMark, hours), Some(150));
/// assert_eq!(required_minutes_from_hours(SanctionKind::Suspension, hours), None);
/// assert_eq!(required_minutes_from_hours(SanctionKind::MajorMark, Some(Decimal::NEGATIVE_ONE)), None);
/// ```
pub fn required_minutes_from_hours(kind: SanctionKind, hours: Option<Decimal>) -> Option<u32> {
    if !kind.is_time_based() {
        return None;
    }
    let hours = hours.filter(|h| !h.is_sign_negative())?;
    hours
        .checked_mul(Decimal::new(60, 0))?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
}

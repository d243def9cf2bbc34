//! Disciplinary sanction models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::MemberId;

/// Identifies a [`Sanction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SanctionId(pub u64);

/// The kind of a disciplinary record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SanctionKind {
    /// A formal reminder; carries no quota and never auto-clears.
    Reminder,
    /// A minor mark, worked off by accumulating duty minutes.
    MinorMark,
    /// A major mark, worked off by accumulating duty minutes.
    MajorMark,
    /// Blocks starting new shifts until explicitly lifted.
    Suspension,
}

impl SanctionKind {
    /// Returns true for the kinds that accrue worked minutes toward a quota.
    ///
    /// # Example
    ///
    /// ```
    /// use duty_engine::models::SanctionKind;
    ///
    /// assert!(SanctionKind::MinorMark.is_time_based());
    /// assert!(!SanctionKind::Suspension.is_time_based());
    /// ```
    pub fn is_time_based(self) -> bool {
        matches!(self, SanctionKind::MinorMark | SanctionKind::MajorMark)
    }
}

impl std::fmt::Display for SanctionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SanctionKind::Reminder => write!(f, "reminder"),
            SanctionKind::MinorMark => write!(f, "minor_mark"),
            SanctionKind::MajorMark => write!(f, "major_mark"),
            SanctionKind::Suspension => write!(f, "suspension"),
        }
    }
}

/// A disciplinary record against a member.
///
/// At most one sanction per member is active; applying a new one supersedes
/// the previous.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sanction {
    /// Unique identifier for the sanction.
    pub id: SanctionId,
    /// The sanctioned member.
    pub member_id: MemberId,
    /// What kind of sanction this is.
    pub kind: SanctionKind,
    /// Whether the sanction is still in force.
    pub active: bool,
    /// Worked minutes needed to clear a time-based sanction.
    pub required_minutes: Option<u32>,
    /// Worked minutes accrued so far.
    pub worked_minutes: u32,
    /// When the sanction was applied.
    pub created_at: NaiveDateTime,
}

impl Sanction {
    /// Returns the minutes still to be worked, or `None` without a quota.
    ///
    /// # Example
    ///
    /// ```
    /// use duty_engine::models::{MemberId, Sanction, SanctionId, SanctionKind};
    /// use chrono::NaiveDateTime;
    ///
    /// let sanction = Sanction {
    ///     id: SanctionId(1),
    ///     member_id: MemberId(1),
    ///     kind: SanctionKind::MinorMark,
    ///     active: true,
    ///     required_minutes: Some(120),
    ///     worked_minutes: 70,
    ///     created_at: NaiveDateTime::parse_from_str("2026-01-15 09:00:00", "%Y-%m-%d %H:%M:%S").unwrap(),
    /// };
    /// assert_eq!(sanction.remaining_minutes(), Some(50));
    /// ```
    pub fn remaining_minutes(&self) -> Option<u32> {
        self.required_minutes
            .map(|required| required.saturating_sub(self.worked_minutes))
    }

    /// Returns true once the accrued minutes meet the quota.
    pub fn quota_met(&self) -> bool {
        self.required_minutes
            .is_some_and(|required| self.worked_minutes >= required)
    }
}

/// One row of the administrative sanction overview.
///
/// Members without an active sanction appear with every field empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanctionSummary {
    /// The member the row describes.
    pub member_id: MemberId,
    /// Kind of the active sanction, if any.
    pub kind: Option<SanctionKind>,
    /// Quota of the active sanction.
    pub required_minutes: Option<u32>,
    /// Minutes accrued against the active sanction.
    pub worked_minutes: Option<u32>,
    /// Minutes still to be worked.
    pub remaining_minutes: Option<u32>,
}

impl SanctionSummary {
    /// Builds the overview row for a member from their active sanction.
    pub fn from_active(member_id: MemberId, active: Option<&Sanction>) -> Self {
        match active {
            Some(sanction) => Self {
                member_id,
                kind: Some(sanction.kind),
                required_minutes: sanction.required_minutes,
                worked_minutes: Some(sanction.worked_minutes),
                remaining_minutes: sanction.remaining_minutes(),
            },
            None => Self {
                member_id,
                kind: None,
                required_minutes: None,
                worked_minutes: None,
                remaining_minutes: None,
            },
        }
    }
}

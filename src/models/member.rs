//! Member identity and roster profile.
//!
//! The engine only needs a member's id as a foreign key. Profile fields are
//! owned by the identity collaborator and arrive through the roster in the
//! configuration, where they serve as display data and the report sort key.

use serde::{Deserialize, Serialize};

/// Identifies a member of the organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(pub i64);

impl std::fmt::Display for MemberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display data for a member, supplied by the identity collaborator.
///
/// # Example
///
/// ```
/// use duty_engine::models::{MemberId, MemberProfile};
///
/// let profile = MemberProfile {
///     id: MemberId(3),
///     display_name: "Rosa Vidal".to_string(),
///     badge_number: "SEC-014".to_string(),
/// };
/// assert_eq!(profile.id, MemberId(3));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberProfile {
    /// The member's id.
    pub id: MemberId,
    /// The name shown on reports and rosters.
    pub display_name: String,
    /// The member's badge number.
    pub badge_number: String,
}

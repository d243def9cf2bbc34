//! Response types for the duty engine API.
//!
//! This module defines the JSON bodies returned by the endpoints, the error
//! response structure, and the mapping from [`EngineError`] to HTTP status.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::format_minutes;
use crate::engine::CompletedShift;
use crate::error::EngineError;
use crate::models::{
    DutyState, DutyStatus, MemberId, MemberProfile, OperationalStatus, Sanction,
    SanctionSummary, ShiftLogId, WeeklyTotal,
};

/// A member's duty state as shown to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DutyStateResponse {
    /// The member.
    pub member_id: MemberId,
    /// Roster display name, when the member is on the roster.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub display_name: Option<String>,
    /// Derived state machine status.
    pub status: DutyStatus,
    /// Whether the member is on duty.
    pub on_duty: bool,
    /// Whether the member's shift is paused.
    pub on_pause: bool,
    /// Mission of the current shift.
    pub mission_type: Option<String>,
    /// Assigned zone.
    pub zone: Option<String>,
    /// Operational status.
    pub operational_status: OperationalStatus,
}

impl DutyStateResponse {
    /// Builds the response from a stored state.
    pub fn new(member_id: MemberId, state: DutyState, profile: Option<&MemberProfile>) -> Self {
        Self {
            member_id,
            display_name: profile.map(|p| p.display_name.clone()),
            status: state.status(),
            on_duty: state.on_duty,
            on_pause: state.on_pause,
            mission_type: state.mission_type,
            zone: state.zone,
            operational_status: state.operational_status,
        }
    }
}

/// Result of a duty transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionResponse {
    /// False when the transition was a no-op.
    pub changed: bool,
    /// Open shift log after a start.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub shift_log_id: Option<ShiftLogId>,
    /// The shift closed by an end.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub completed: Option<CompletedShift>,
    /// The duty state after the transition.
    pub state: DutyStateResponse,
}

/// A member's sanction standing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SanctionResponse {
    /// The member.
    pub member_id: MemberId,
    /// The active sanction, if any.
    pub active: Option<Sanction>,
    /// Minutes left to work off an active mark.
    pub remaining_minutes: Option<u32>,
}

impl SanctionResponse {
    /// Builds the response from the member's active sanction.
    pub fn new(member_id: MemberId, active: Option<Sanction>) -> Self {
        let remaining_minutes = active.as_ref().and_then(Sanction::remaining_minutes);
        Self {
            member_id,
            active,
            remaining_minutes,
        }
    }
}

/// Result of lifting a sanction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClearSanctionResponse {
    /// The member.
    pub member_id: MemberId,
    /// False when the member had no active sanction.
    pub cleared: bool,
}

/// One roster row of the sanction overview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SanctionOverviewRow {
    /// Roster display name.
    pub display_name: String,
    /// The member's sanction standing.
    #[serde(flatten)]
    pub summary: SanctionSummary,
}

/// One member's line in the weekly report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyReportRow {
    /// The member.
    pub member_id: MemberId,
    /// Roster display name, when the member is on the roster.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub display_name: Option<String>,
    /// Net worked minutes.
    pub minutes: i64,
    /// Net worked hours.
    pub hours: Decimal,
    /// Minutes rendered as `"{h}h {mm}min"`.
    pub formatted: String,
}

impl WeeklyReportRow {
    /// Builds a row from a weekly total.
    pub fn new(total: WeeklyTotal, profile: Option<&MemberProfile>) -> Self {
        Self {
            member_id: total.member_id,
            display_name: profile.map(|p| p.display_name.clone()),
            minutes: total.minutes,
            hours: total.hours,
            formatted: format_minutes(total.minutes),
        }
    }
}

/// Body of `GET /reports/weekly`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyReportResponse {
    /// First instant of the reported week.
    pub week_start: NaiveDateTime,
    /// Last instant of the reported week.
    pub week_end: NaiveDateTime,
    /// One row per member with closed shifts in the week.
    pub rows: Vec<WeeklyReportRow>,
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
#[derive(Debug)]
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// A 400 response carrying `error`.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        match error {
            EngineError::Suspended { member_id } => ApiErrorResponse {
                status: StatusCode::CONFLICT,
                error: ApiError::with_details(
                    "SUSPENDED",
                    message,
                    format!("Member {} must have the suspension cleared first", member_id),
                ),
            },
            EngineError::InvalidInterval { .. } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "INVALID_INTERVAL",
                    message,
                    "Stored timestamps are inconsistent with the clock",
                ),
            },
            EngineError::Storage { .. } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::new("STORAGE_ERROR", message),
            },
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => {
                ApiErrorResponse {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    error: ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
                }
            }
            EngineError::InvalidRequest { field, .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "INVALID_REQUEST",
                    message,
                    format!("Check the '{}' field", field),
                ),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    #[test]
    fn test_api_error_serialization() {
        let error = ApiError::new("TEST_ERROR", "Test message");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"code\":\"TEST_ERROR\""));
        assert!(json.contains("\"message\":\"Test message\""));
        assert!(!json.contains("details"));
    }

    #[test]
    fn test_suspended_maps_to_conflict() {
        let api_error: ApiErrorResponse = EngineError::Suspended {
            member_id: MemberId(3),
        }
        .into();
        assert_eq!(api_error.status, StatusCode::CONFLICT);
        assert_eq!(api_error.error.code, "SUSPENDED");
        assert!(api_error.error.message.contains('3'));
    }

    #[test]
    fn test_invalid_interval_maps_to_server_error() {
        let at = NaiveDateTime::parse_from_str("2026-01-15 09:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let api_error: ApiErrorResponse = EngineError::InvalidInterval { start: at, end: at }.into();
        assert_eq!(api_error.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api_error.error.code, "INVALID_INTERVAL");
    }

    #[test]
    fn test_invalid_request_maps_to_bad_request() {
        let api_error: ApiErrorResponse = EngineError::InvalidRequest {
            field: "window".to_string(),
            message: "inverted".to_string(),
        }
        .into();
        assert_eq!(api_error.status, StatusCode::BAD_REQUEST);
        assert_eq!(api_error.error.code, "INVALID_REQUEST");
    }

    #[test]
    fn test_report_row_formats_minutes() {
        let profile = MemberProfile {
            id: MemberId(2),
            display_name: "Noah Baptiste".to_string(),
            badge_number: "SEC-101".to_string(),
        };
        let row = WeeklyReportRow::new(WeeklyTotal::new(MemberId(2), 125), Some(&profile));
        assert_eq!(row.formatted, "2h 05min");
        assert_eq!(row.display_name.as_deref(), Some("Noah Baptiste"));
    }

    #[test]
    fn test_sanction_overview_row_flattens_summary() {
        let row = SanctionOverviewRow {
            display_name: "Lina Okafor".to_string(),
            summary: SanctionSummary::from_active(MemberId(4), None),
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["member_id"], 4);
        assert_eq!(json["display_name"], "Lina Okafor");
    }
}

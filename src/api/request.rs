//! Request types for the duty engine API.
//!
//! This module defines the JSON bodies and query strings accepted by the
//! endpoints.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::SanctionKind;

/// Body of `POST /members/:id/duty/start` and `POST /members/:id/duty/mission`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MissionRequest {
    /// The mission being worked, if any.
    #[serde(default)]
    pub mission_type: Option<String>,
}

/// Body of `POST /members/:id/duty/zone`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ZoneRequest {
    /// The zone; absent or blank clears it.
    #[serde(default)]
    pub zone: Option<String>,
}

/// Body of `POST /members/:id/duty/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRequest {
    /// Raw operational status; unknown values become `available`.
    pub status: String,
}

/// Body of `POST /members/:id/sanction`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SanctionRequest {
    /// The kind of sanction to apply.
    pub kind: SanctionKind,
    /// Hours to work off a mark; ignored for other kinds.
    #[serde(default)]
    pub required_hours: Option<Decimal>,
}

/// Query string of `GET /reports/weekly`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeeklyReportQuery {
    /// Any date in the reported week; defaults to today.
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// What a history reset covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetScope {
    /// The current reporting week.
    Week,
    /// All history, open shifts included.
    All,
    /// An explicit window given by `start` and `end`.
    Window,
}

/// Body of `POST /reports/reset`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetRequest {
    /// What to reset.
    pub scope: ResetScope,
    /// Window start, required for [`ResetScope::Window`].
    #[serde(default)]
    pub start: Option<NaiveDateTime>,
    /// Window end, required for [`ResetScope::Window`].
    #[serde(default)]
    pub end: Option<NaiveDateTime>,
}

//! HTTP API module for the duty engine.
//!
//! This module exposes the engine operations as JSON endpoints: duty
//! transitions and metadata, sanctions, weekly reports and resets.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    MissionRequest, ResetRequest, ResetScope, SanctionRequest, StatusRequest, WeeklyReportQuery,
    ZoneRequest,
};
pub use response::{
    ApiError, ClearSanctionResponse, DutyStateResponse, SanctionOverviewRow, SanctionResponse,
    TransitionResponse, WeeklyReportResponse, WeeklyReportRow,
};
pub use state::AppState;

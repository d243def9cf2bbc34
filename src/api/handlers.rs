//! HTTP request handlers for the duty engine API.
//!
//! This module contains the handler functions for all API endpoints. The
//! handlers are thin: they decode the request, call the engine, and map
//! engine errors through [`ApiErrorResponse`]. Access control is the
//! surrounding deployment's concern.

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, post},
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{required_minutes_from_hours, week_window};
use crate::engine::ResetSummary;
use crate::error::EngineError;
use crate::models::{DutyState, MemberId, WeekWindow};

use super::request::{
    MissionRequest, ResetRequest, ResetScope, SanctionRequest, StatusRequest, WeeklyReportQuery,
    ZoneRequest,
};
use super::response::{
    ApiError, ApiErrorResponse, ClearSanctionResponse, DutyStateResponse, SanctionOverviewRow,
    SanctionResponse, TransitionResponse, WeeklyReportResponse, WeeklyReportRow,
};
use super::state::AppState;

type ApiResult<T> = Result<T, ApiErrorResponse>;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/duty", get(list_on_duty))
        .route("/members/:id/duty", get(get_duty_state))
        .route("/members/:id/duty/start", post(start_shift))
        .route("/members/:id/duty/pause", post(pause_shift))
        .route("/members/:id/duty/resume", post(resume_shift))
        .route("/members/:id/duty/end", post(end_shift))
        .route("/members/:id/duty/zone", post(set_zone))
        .route("/members/:id/duty/status", post(set_status))
        .route("/members/:id/duty/mission", post(set_mission))
        .route(
            "/members/:id/sanction",
            get(get_sanction).post(apply_sanction).delete(clear_sanction),
        )
        .route("/sanctions", get(sanction_overview))
        .route("/reports/weekly", get(weekly_report))
        .route("/reports/reset", post(reset_reports))
        .with_state(state)
}

/// Unwraps a JSON body, turning a rejection into a 400 response.
fn json_body<T>(
    correlation_id: Uuid,
    payload: Result<Json<T>, JsonRejection>,
) -> ApiResult<T> {
    let rejection = match payload {
        Ok(Json(body)) => return Ok(body),
        Err(rejection) => rejection,
    };

    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(correlation_id = %correlation_id, error = %body_text, "JSON data error");
            if body_text.contains("missing field") {
                ApiError::new("VALIDATION_ERROR", body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "JSON syntax error");
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    Err(ApiErrorResponse::bad_request(error))
}

/// Logs an engine failure and converts it for the response.
fn engine_failure(correlation_id: Uuid, member_id: Option<MemberId>, err: EngineError) -> ApiErrorResponse {
    warn!(
        correlation_id = %correlation_id,
        member_id = ?member_id.map(|id| id.0),
        error = %err,
        "Request failed"
    );
    err.into()
}

fn duty_response(state: &AppState, member_id: MemberId, duty: DutyState) -> DutyStateResponse {
    DutyStateResponse::new(member_id, duty, state.profile(member_id))
}

/// Handler for GET /duty.
async fn list_on_duty(State(state): State<AppState>) -> ApiResult<Json<Vec<DutyStateResponse>>> {
    let correlation_id = Uuid::new_v4();
    let members = state
        .run(|engine| engine.shifts().on_duty_members())
        .await
        .map_err(|err| engine_failure(correlation_id, None, err))?;

    info!(correlation_id = %correlation_id, count = members.len(), "Listed on-duty members");
    Ok(Json(
        members
            .into_iter()
            .map(|(id, duty)| duty_response(&state, id, duty))
            .collect(),
    ))
}

/// Handler for GET /members/:id/duty.
async fn get_duty_state(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<DutyStateResponse>> {
    let correlation_id = Uuid::new_v4();
    let member_id = MemberId(id);
    let duty = state
        .run(move |engine| engine.shifts().duty_state(member_id))
        .await
        .map_err(|err| engine_failure(correlation_id, Some(member_id), err))?;
    Ok(Json(duty_response(&state, member_id, duty)))
}

/// Handler for POST /members/:id/duty/start.
async fn start_shift(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<MissionRequest>, JsonRejection>,
) -> ApiResult<Json<TransitionResponse>> {
    let correlation_id = Uuid::new_v4();
    let member_id = MemberId(id);
    info!(correlation_id = %correlation_id, %member_id, "Processing shift start");

    let request = json_body(correlation_id, payload)?;
    let (shift_log_id, duty) = state
        .run(move |engine| {
            let shift_log_id = engine.shifts().start(member_id, request.mission_type)?;
            Ok((shift_log_id, engine.shifts().duty_state(member_id)?))
        })
        .await
        .map_err(|err| engine_failure(correlation_id, Some(member_id), err))?;

    Ok(Json(TransitionResponse {
        changed: true,
        shift_log_id: Some(shift_log_id),
        completed: None,
        state: duty_response(&state, member_id, duty),
    }))
}

/// Handler for POST /members/:id/duty/pause.
async fn pause_shift(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<TransitionResponse>> {
    let correlation_id = Uuid::new_v4();
    let member_id = MemberId(id);
    info!(correlation_id = %correlation_id, %member_id, "Processing shift pause");

    let (changed, duty) = state
        .run(move |engine| {
            let changed = engine.shifts().pause(member_id)?;
            Ok((changed, engine.shifts().duty_state(member_id)?))
        })
        .await
        .map_err(|err| engine_failure(correlation_id, Some(member_id), err))?;
    Ok(transition(&state, member_id, changed, duty))
}

/// Handler for POST /members/:id/duty/resume.
async fn resume_shift(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<TransitionResponse>> {
    let correlation_id = Uuid::new_v4();
    let member_id = MemberId(id);
    info!(correlation_id = %correlation_id, %member_id, "Processing shift resume");

    let (changed, duty) = state
        .run(move |engine| {
            let changed = engine.shifts().resume(member_id)?;
            Ok((changed, engine.shifts().duty_state(member_id)?))
        })
        .await
        .map_err(|err| engine_failure(correlation_id, Some(member_id), err))?;
    Ok(transition(&state, member_id, changed, duty))
}

fn transition(
    state: &AppState,
    member_id: MemberId,
    changed: bool,
    duty: DutyState,
) -> Json<TransitionResponse> {
    Json(TransitionResponse {
        changed,
        shift_log_id: None,
        completed: None,
        state: duty_response(state, member_id, duty),
    })
}

/// Handler for POST /members/:id/duty/end.
async fn end_shift(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<TransitionResponse>> {
    let correlation_id = Uuid::new_v4();
    let member_id = MemberId(id);
    info!(correlation_id = %correlation_id, %member_id, "Processing shift end");

    let (completed, duty) = state
        .run(move |engine| {
            let completed = engine.shifts().end(member_id)?;
            Ok((completed, engine.shifts().duty_state(member_id)?))
        })
        .await
        .map_err(|err| engine_failure(correlation_id, Some(member_id), err))?;
    if let Some(shift) = &completed {
        info!(
            correlation_id = %correlation_id,
            %member_id,
            net_minutes = shift.net_minutes,
            "Shift closed"
        );
    }

    Ok(Json(TransitionResponse {
        changed: completed.is_some(),
        shift_log_id: completed.map(|shift| shift.shift_log_id),
        completed,
        state: duty_response(&state, member_id, duty),
    }))
}

/// Handler for POST /members/:id/duty/zone.
async fn set_zone(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<ZoneRequest>, JsonRejection>,
) -> ApiResult<Json<DutyStateResponse>> {
    let correlation_id = Uuid::new_v4();
    let member_id = MemberId(id);
    let request = json_body(correlation_id, payload)?;

    let duty = state
        .run(move |engine| {
            engine.shifts().set_zone(member_id, request.zone)?;
            engine.shifts().duty_state(member_id)
        })
        .await
        .map_err(|err| engine_failure(correlation_id, Some(member_id), err))?;
    Ok(Json(duty_response(&state, member_id, duty)))
}

/// Handler for POST /members/:id/duty/status.
async fn set_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<StatusRequest>, JsonRejection>,
) -> ApiResult<Json<DutyStateResponse>> {
    let correlation_id = Uuid::new_v4();
    let member_id = MemberId(id);
    let request = json_body(correlation_id, payload)?;

    let duty = state
        .run(move |engine| {
            engine
                .shifts()
                .set_operational_status(member_id, &request.status)?;
            engine.shifts().duty_state(member_id)
        })
        .await
        .map_err(|err| engine_failure(correlation_id, Some(member_id), err))?;
    Ok(Json(duty_response(&state, member_id, duty)))
}

/// Handler for POST /members/:id/duty/mission.
async fn set_mission(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<MissionRequest>, JsonRejection>,
) -> ApiResult<Json<DutyStateResponse>> {
    let correlation_id = Uuid::new_v4();
    let member_id = MemberId(id);
    let request = json_body(correlation_id, payload)?;

    let duty = state
        .run(move |engine| {
            engine
                .shifts()
                .set_mission_type(member_id, request.mission_type)?;
            engine.shifts().duty_state(member_id)
        })
        .await
        .map_err(|err| engine_failure(correlation_id, Some(member_id), err))?;
    Ok(Json(duty_response(&state, member_id, duty)))
}

/// Handler for GET /members/:id/sanction.
async fn get_sanction(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<SanctionResponse>> {
    let correlation_id = Uuid::new_v4();
    let member_id = MemberId(id);
    state
        .run(move |engine| engine.sanctions().active_sanction(member_id))
        .await
        .map(|active| Json(SanctionResponse::new(member_id, active)))
        .map_err(|err| engine_failure(correlation_id, Some(member_id), err))
}

/// Handler for POST /members/:id/sanction.
///
/// `required_hours` is converted to whole minutes here; negative or
/// unrepresentable hours are treated as absent.
async fn apply_sanction(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<SanctionRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SanctionResponse>)> {
    let correlation_id = Uuid::new_v4();
    let member_id = MemberId(id);
    let request = json_body(correlation_id, payload)?;

    let kind = request.kind;
    let required_minutes = required_minutes_from_hours(kind, request.required_hours);
    let sanction = state
        .run(move |engine| engine.sanctions().apply(member_id, kind, required_minutes))
        .await
        .map_err(|err| engine_failure(correlation_id, Some(member_id), err))?;

    info!(
        correlation_id = %correlation_id,
        %member_id,
        kind = %sanction.kind,
        "Sanction recorded"
    );
    Ok((
        StatusCode::CREATED,
        Json(SanctionResponse::new(member_id, Some(sanction))),
    ))
}

/// Handler for DELETE /members/:id/sanction.
async fn clear_sanction(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ClearSanctionResponse>> {
    let correlation_id = Uuid::new_v4();
    let member_id = MemberId(id);
    let cleared = state
        .run(move |engine| engine.sanctions().clear(member_id))
        .await
        .map_err(|err| engine_failure(correlation_id, Some(member_id), err))?;

    info!(correlation_id = %correlation_id, %member_id, cleared, "Sanction clear requested");
    Ok(Json(ClearSanctionResponse { member_id, cleared }))
}

/// Handler for GET /sanctions.
async fn sanction_overview(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<SanctionOverviewRow>>> {
    let correlation_id = Uuid::new_v4();
    let roster = state.config().roster();
    let ids: Vec<MemberId> = roster.iter().map(|profile| profile.id).collect();

    let summaries = state
        .run(move |engine| engine.sanctions().overview(&ids))
        .await
        .map_err(|err| engine_failure(correlation_id, None, err))?;

    Ok(Json(
        roster
            .iter()
            .zip(summaries)
            .map(|(profile, summary)| SanctionOverviewRow {
                display_name: profile.display_name.clone(),
                summary,
            })
            .collect(),
    ))
}

/// Handler for GET /reports/weekly.
///
/// Rows are sorted by roster display name; members missing from the roster
/// come last.
async fn weekly_report(
    State(state): State<AppState>,
    Query(query): Query<WeeklyReportQuery>,
) -> ApiResult<Json<WeeklyReportResponse>> {
    let correlation_id = Uuid::new_v4();
    let reference = query.date.unwrap_or_else(|| state.engine().today());
    let window = week_window(reference);

    let config = state.shared_config();
    let totals = state
        .run(move |engine| {
            engine.reports().weekly_totals(reference, |total| {
                let name = config
                    .profile(total.member_id)
                    .map(|profile| profile.display_name.clone());
                (name.is_none(), name)
            })
        })
        .await
        .map_err(|err| engine_failure(correlation_id, None, err))?;

    info!(
        correlation_id = %correlation_id,
        week_start = %window.start,
        rows = totals.len(),
        "Weekly report served"
    );
    Ok(Json(WeeklyReportResponse {
        week_start: window.start,
        week_end: window.end,
        rows: totals
            .into_iter()
            .map(|total| {
                let profile = state.profile(total.member_id);
                WeeklyReportRow::new(total, profile)
            })
            .collect(),
    }))
}

/// Handler for POST /reports/reset.
async fn reset_reports(
    State(state): State<AppState>,
    payload: Result<Json<ResetRequest>, JsonRejection>,
) -> ApiResult<Json<ResetSummary>> {
    let correlation_id = Uuid::new_v4();
    let request = json_body(correlation_id, payload)?;
    info!(correlation_id = %correlation_id, scope = ?request.scope, "Processing history reset");

    let summary = state
        .run(move |engine| {
            let reports = engine.reports();
            match request.scope {
                ResetScope::Week => reports.reset_current_week(),
                ResetScope::All => reports.reset_all(),
                ResetScope::Window => match (request.start, request.end) {
                    (Some(start), Some(end)) => reports.reset_window(WeekWindow { start, end }),
                    _ => Err(EngineError::InvalidRequest {
                        field: "start".to_string(),
                        message: "a window reset needs both start and end".to_string(),
                    }),
                },
            }
        })
        .await
        .map_err(|err| engine_failure(correlation_id, None, err))?;

    Ok(Json(summary))
}

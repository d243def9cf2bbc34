//! Integration tests for the duty engine.
//!
//! This test suite covers the engine end to end:
//! - Duty cycles and whole-minute durations
//! - Idempotent transitions
//! - Suspension gating
//! - Mark accrual and auto-clear
//! - Weekly reports and resets
//! - Snapshot persistence
//! - The HTTP adapter

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

use duty_engine::api::{AppState, create_router};
use duty_engine::calculation::{required_minutes_from_hours, week_window};
use duty_engine::clock::ManualClock;
use duty_engine::config::ConfigLoader;
use duty_engine::engine::DutyEngine;
use duty_engine::error::EngineError;
use duty_engine::models::{DutyStatus, MemberId, SanctionKind, WeekWindow};
use duty_engine::store::Store;

// =============================================================================
// Test Helpers
// =============================================================================

fn make_datetime(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

fn make_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn create_engine(now: &str) -> (Arc<ManualClock>, DutyEngine) {
    let clock = Arc::new(ManualClock::new(make_datetime(now)));
    let engine = DutyEngine::new(Arc::new(Store::in_memory()), clock.clone());
    (clock, engine)
}

/// Works one shift of `minutes`, with an optional pause of `paused` minutes in the middle.
fn work_shift(clock: &ManualClock, engine: &DutyEngine, member: MemberId, minutes: i64, paused: i64) {
    engine.shifts().start(member, None).unwrap();
    clock.advance(Duration::minutes(minutes / 2));
    if paused > 0 {
        engine.shifts().pause(member).unwrap();
        clock.advance(Duration::minutes(paused));
        engine.shifts().resume(member).unwrap();
    }
    clock.advance(Duration::minutes(minutes - minutes / 2));
    engine.shifts().end(member).unwrap();
}

fn create_router_for_test() -> (Arc<ManualClock>, Router) {
    let config = ConfigLoader::load("./config/duty-engine.yaml").expect("Failed to load config");
    let (clock, engine) = create_engine("2026-01-14 08:00:00");
    (clock, create_router(AppState::new(engine, config)))
}

async fn request(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

    (status, json)
}

// =============================================================================
// SECTION 1: Duty cycles and durations
// =============================================================================

#[test]
fn test_seventy_minute_shift_with_ten_minute_pause() {
    let (clock, engine) = create_engine("2026-01-14 09:00:00");
    let member = MemberId(1);

    let log = engine.shifts().start(member, Some("patrol".to_string())).unwrap();
    clock.set(make_datetime("2026-01-14 09:30:00"));
    engine.shifts().pause(member).unwrap();
    clock.set(make_datetime("2026-01-14 09:40:00"));
    engine.shifts().resume(member).unwrap();
    clock.set(make_datetime("2026-01-14 10:10:00"));
    let completed = engine.shifts().end(member).unwrap().unwrap();

    assert_eq!(completed.shift_log_id, log);
    assert_eq!(completed.net_minutes, 60);
    assert_eq!(engine.paused_minutes(log).unwrap(), 10);
}

#[test]
fn test_seconds_truncate_per_interval() {
    let (clock, engine) = create_engine("2026-01-14 09:00:00");
    let member = MemberId(1);

    let log = engine.shifts().start(member, None).unwrap();
    clock.set(make_datetime("2026-01-14 09:10:00"));
    engine.shifts().pause(member).unwrap();
    clock.set(make_datetime("2026-01-14 09:11:59"));
    engine.shifts().resume(member).unwrap();
    clock.set(make_datetime("2026-01-14 09:30:59"));
    engine.shifts().end(member).unwrap();

    // 30 elapsed minutes, 1 paused minute
    assert_eq!(engine.net_minutes(log).unwrap().minutes, 29);
}

#[test]
fn test_end_while_paused_excludes_trailing_pause() {
    let (clock, engine) = create_engine("2026-01-14 09:00:00");
    let member = MemberId(1);

    engine.shifts().start(member, None).unwrap();
    clock.advance(Duration::minutes(45));
    engine.shifts().pause(member).unwrap();
    clock.advance(Duration::minutes(20));
    let completed = engine.shifts().end(member).unwrap().unwrap();

    assert_eq!(completed.net_minutes, 45);
    assert_eq!(
        engine.shifts().duty_state(member).unwrap().status(),
        DutyStatus::Off
    );
}

// =============================================================================
// SECTION 2: Idempotent transitions
// =============================================================================

#[test]
fn test_repeated_transitions_are_noops() {
    let (clock, engine) = create_engine("2026-01-14 09:00:00");
    let member = MemberId(2);

    let first = engine.shifts().start(member, None).unwrap();
    assert_eq!(engine.shifts().start(member, None).unwrap(), first);

    assert!(engine.shifts().pause(member).unwrap());
    assert!(!engine.shifts().pause(member).unwrap());
    clock.advance(Duration::minutes(5));
    assert!(engine.shifts().resume(member).unwrap());
    assert!(!engine.shifts().resume(member).unwrap());

    assert!(engine.shifts().end(member).unwrap().is_some());
    assert!(engine.shifts().end(member).unwrap().is_none());
}

#[test]
fn test_paused_implies_on_duty_through_cycle() {
    let (clock, engine) = create_engine("2026-01-14 09:00:00");
    let member = MemberId(2);

    let check = |engine: &DutyEngine| {
        let state = engine.shifts().duty_state(member).unwrap();
        assert!(!state.on_pause || state.on_duty);
    };

    check(&engine);
    engine.shifts().pause(member).unwrap();
    check(&engine);
    engine.shifts().start(member, None).unwrap();
    engine.shifts().pause(member).unwrap();
    check(&engine);
    clock.advance(Duration::minutes(3));
    engine.shifts().end(member).unwrap();
    check(&engine);
}

// =============================================================================
// SECTION 3: Concurrent transitions
// =============================================================================

fn create_shared_engine() -> (Arc<Store>, Arc<DutyEngine>) {
    let store = Arc::new(Store::in_memory());
    let clock = Arc::new(ManualClock::new(make_datetime("2026-01-14 08:00:00")));
    let engine = Arc::new(DutyEngine::new(store.clone(), clock));
    (store, engine)
}

#[test]
fn test_concurrent_start_and_pause_keep_one_open_record() {
    let (store, engine) = create_shared_engine();
    let member = MemberId(1);

    std::thread::scope(|scope| {
        for _ in 0..16 {
            let engine = Arc::clone(&engine);
            scope.spawn(move || {
                for _ in 0..200 {
                    engine.shifts().start(member, None).unwrap();
                    engine.shifts().pause(member).unwrap();
                }
            });
        }
    });

    let (open_logs, open_pauses) = store
        .read(|tables| {
            let open_logs = tables.shift_logs().filter(|log| log.is_open()).count();
            let open_pauses = tables
                .shift_logs()
                .filter(|log| log.is_open())
                .filter(|log| tables.open_pause(log.id).is_some())
                .count();
            (open_logs, open_pauses)
        })
        .unwrap();
    assert_eq!(open_logs, 1);
    assert!(open_pauses <= 1);

    let state = engine.shifts().duty_state(member).unwrap();
    assert!(state.on_duty);
    assert!(!state.on_pause || state.on_duty);
}

#[test]
fn test_concurrent_cycles_across_members_stay_consistent() {
    let (store, engine) = create_shared_engine();

    std::thread::scope(|scope| {
        for worker in 0..8i64 {
            let engine = Arc::clone(&engine);
            scope.spawn(move || {
                for round in 0..100i64 {
                    let member = MemberId((worker + round) % 3);
                    let shifts = engine.shifts();
                    match round % 4 {
                        0 => {
                            shifts.start(member, None).unwrap();
                        }
                        1 => {
                            shifts.pause(member).unwrap();
                        }
                        2 => {
                            shifts.resume(member).unwrap();
                        }
                        _ => {
                            shifts.end(member).unwrap();
                        }
                    }
                }
            });
        }
    });

    for id in 0..3 {
        let member = MemberId(id);
        let state = engine.shifts().duty_state(member).unwrap();
        let (open_log, open_pause, open_logs) = store
            .read(|tables| {
                let open = tables.open_shift_log(member).map(|log| log.id);
                (
                    open,
                    open.and_then(|log| tables.open_pause(log)).is_some(),
                    tables
                        .shift_logs()
                        .filter(|log| log.member_id == member && log.is_open())
                        .count(),
                )
            })
            .unwrap();

        assert!(open_logs <= 1);
        assert_eq!(state.on_duty, open_log.is_some());
        assert_eq!(state.on_pause, open_pause);
    }
}

// =============================================================================
// SECTION 4: Suspension gating
// =============================================================================

#[test]
fn test_suspension_blocks_start_and_creates_no_log() {
    let (_, engine) = create_engine("2026-01-14 09:00:00");
    let member = MemberId(5);
    engine
        .sanctions()
        .apply(member, SanctionKind::Suspension, None)
        .unwrap();

    match engine.shifts().start(member, None) {
        Err(EngineError::Suspended { member_id }) => assert_eq!(member_id, member),
        other => panic!("Expected Suspended error, got {:?}", other),
    }
    assert!(engine.shifts().on_duty_members().unwrap().is_empty());

    engine.sanctions().clear(member).unwrap();
    assert!(engine.shifts().start(member, None).is_ok());
}

#[test]
fn test_suspension_does_not_stop_shift_in_progress() {
    let (clock, engine) = create_engine("2026-01-14 09:00:00");
    let member = MemberId(5);
    engine.shifts().start(member, None).unwrap();
    engine
        .sanctions()
        .apply(member, SanctionKind::Suspension, None)
        .unwrap();

    clock.advance(Duration::minutes(30));
    assert!(engine.shifts().pause(member).unwrap());
    let completed = engine.shifts().end(member).unwrap().unwrap();
    assert_eq!(completed.net_minutes, 30);

    // Worked minutes do not touch a suspension.
    let active = engine.sanctions().active_sanction(member).unwrap().unwrap();
    assert_eq!(active.kind, SanctionKind::Suspension);
    assert_eq!(active.worked_minutes, 0);
}

// =============================================================================
// SECTION 5: Mark accrual
// =============================================================================

#[test]
fn test_two_hour_mark_cleared_by_seventy_then_fifty() {
    let (clock, engine) = create_engine("2026-01-14 08:00:00");
    let member = MemberId(3);
    let required = required_minutes_from_hours(SanctionKind::MinorMark, Some(Decimal::from(2)));
    assert_eq!(required, Some(120));
    engine
        .sanctions()
        .apply(member, SanctionKind::MinorMark, required)
        .unwrap();

    work_shift(&clock, &engine, member, 70, 0);
    let active = engine.sanctions().active_sanction(member).unwrap().unwrap();
    assert_eq!(active.worked_minutes, 70);
    assert_eq!(active.remaining_minutes(), Some(50));

    clock.advance(Duration::hours(1));
    work_shift(&clock, &engine, member, 50, 0);
    assert!(engine.sanctions().active_sanction(member).unwrap().is_none());
}

#[test]
fn test_pause_time_does_not_count_toward_mark() {
    let (clock, engine) = create_engine("2026-01-14 08:00:00");
    let member = MemberId(3);
    engine
        .sanctions()
        .apply(member, SanctionKind::MajorMark, Some(60))
        .unwrap();

    work_shift(&clock, &engine, member, 50, 30);

    let active = engine.sanctions().active_sanction(member).unwrap().unwrap();
    assert_eq!(active.worked_minutes, 50);
}

#[test]
fn test_new_sanction_replaces_mark_progress() {
    let (clock, engine) = create_engine("2026-01-14 08:00:00");
    let member = MemberId(3);
    engine
        .sanctions()
        .apply(member, SanctionKind::MinorMark, Some(120))
        .unwrap();
    work_shift(&clock, &engine, member, 60, 0);

    engine
        .sanctions()
        .apply(member, SanctionKind::MajorMark, Some(240))
        .unwrap();

    let active = engine.sanctions().active_sanction(member).unwrap().unwrap();
    assert_eq!(active.kind, SanctionKind::MajorMark);
    assert_eq!(active.worked_minutes, 0);
    assert_eq!(engine.sanctions().history(member).unwrap().len(), 2);
}

// =============================================================================
// SECTION 6: Weekly reports and resets
// =============================================================================

#[test]
fn test_weekly_totals_across_members() {
    let (clock, engine) = create_engine("2026-01-12 08:00:00");
    work_shift(&clock, &engine, MemberId(1), 120, 15);
    work_shift(&clock, &engine, MemberId(2), 60, 0);
    clock.set(make_datetime("2026-01-16 08:00:00"));
    work_shift(&clock, &engine, MemberId(1), 30, 0);

    let totals = engine
        .reports()
        .weekly_totals(make_date("2026-01-18"), |t| t.member_id)
        .unwrap();

    assert_eq!(totals.len(), 2);
    assert_eq!(totals[0].minutes, 150);
    assert_eq!(totals[1].minutes, 60);
}

#[test]
fn test_shift_crossing_week_boundary_excluded() {
    let (clock, engine) = create_engine("2026-01-18 23:58:00");
    engine.shifts().start(MemberId(1), None).unwrap();
    clock.set(make_datetime("2026-01-19 00:05:00"));
    engine.shifts().end(MemberId(1)).unwrap();

    for date in ["2026-01-18", "2026-01-19"] {
        let totals = engine
            .reports()
            .weekly_totals(make_date(date), |t| t.member_id)
            .unwrap();
        assert!(totals.is_empty(), "week of {}", date);
    }
}

#[test]
fn test_reset_window_spares_open_shift() {
    let (clock, engine) = create_engine("2026-01-13 08:00:00");
    work_shift(&clock, &engine, MemberId(1), 60, 10);
    let open = engine.shifts().start(MemberId(2), None).unwrap();

    let summary = engine
        .reports()
        .reset_window(week_window(make_date("2026-01-13")))
        .unwrap();
    assert_eq!(summary.logs, 1);
    assert_eq!(summary.pauses, 1);

    clock.advance(Duration::minutes(15));
    let completed = engine.shifts().end(MemberId(2)).unwrap().unwrap();
    assert_eq!(completed.shift_log_id, open);
    assert_eq!(completed.net_minutes, 15);
}

#[test]
fn test_inverted_reset_window_rejected() {
    let (_, engine) = create_engine("2026-01-13 08:00:00");
    let result = engine.reports().reset_window(WeekWindow {
        start: make_datetime("2026-01-19 00:00:00"),
        end: make_datetime("2026-01-12 00:00:00"),
    });
    assert!(matches!(result, Err(EngineError::InvalidRequest { .. })));
}

#[test]
fn test_reset_all_keeps_duty_state() {
    let (_, engine) = create_engine("2026-01-13 08:00:00");
    engine.shifts().start(MemberId(4), None).unwrap();

    engine.reports().reset_all().unwrap();

    assert!(engine.shifts().duty_state(MemberId(4)).unwrap().on_duty);
    // The next end finds no log and repairs the state.
    assert!(engine.shifts().end(MemberId(4)).unwrap().is_none());
    assert!(!engine.shifts().duty_state(MemberId(4)).unwrap().on_duty);
}

// =============================================================================
// SECTION 7: Persistence
// =============================================================================

#[test]
fn test_shift_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("duty.json");
    let clock = Arc::new(ManualClock::new(make_datetime("2026-01-14 09:00:00")));
    let member = MemberId(6);

    {
        let engine = DutyEngine::new(Arc::new(Store::open(&path).unwrap()), clock.clone());
        engine
            .sanctions()
            .apply(member, SanctionKind::MinorMark, Some(30))
            .unwrap();
        engine.shifts().start(member, None).unwrap();
        clock.advance(Duration::minutes(20));
        engine.shifts().pause(member).unwrap();
    }

    clock.advance(Duration::minutes(10));
    let engine = DutyEngine::new(Arc::new(Store::open(&path).unwrap()), clock.clone());
    assert_eq!(
        engine.shifts().duty_state(member).unwrap().status(),
        DutyStatus::OnPaused
    );
    engine.shifts().resume(member).unwrap();
    clock.advance(Duration::minutes(10));
    let completed = engine.shifts().end(member).unwrap().unwrap();

    assert_eq!(completed.net_minutes, 30);
    assert!(engine.sanctions().active_sanction(member).unwrap().is_none());
}

// =============================================================================
// SECTION 8: HTTP adapter
// =============================================================================

#[tokio::test]
async fn test_http_full_cycle_and_report() {
    let (clock, router) = create_router_for_test();

    let (status, body) = request(
        &router,
        "POST",
        "/members/3/duty/start",
        Some(json!({"mission_type": "escort"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"]["mission_type"], "escort");

    clock.advance(Duration::minutes(90));
    let (status, body) = request(&router, "POST", "/members/3/duty/end", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["completed"]["net_minutes"], 90);

    let (status, body) = request(&router, "GET", "/reports/weekly?date=2026-01-15", None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = body["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["display_name"], "Lina Okafor");
    assert_eq!(rows[0]["formatted"], "1h 30min");
}

#[tokio::test]
async fn test_http_suspension_round_trip() {
    let (_, router) = create_router_for_test();

    let (status, _) = request(
        &router,
        "POST",
        "/members/4/sanction",
        Some(json!({"kind": "suspension"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = request(&router, "POST", "/members/4/duty/start", Some(json!({}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "SUSPENDED");

    let (status, _) = request(&router, "DELETE", "/members/4/sanction", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = request(&router, "POST", "/members/4/duty/start", Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_http_missing_field_returns_400() {
    let (_, router) = create_router_for_test();

    let (status, body) = request(&router, "POST", "/members/1/duty/status", Some(json!({}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_http_reset_all() {
    let (clock, router) = create_router_for_test();
    request(&router, "POST", "/members/1/duty/start", Some(json!({}))).await;
    clock.advance(Duration::minutes(10));
    request(&router, "POST", "/members/1/duty/pause", None).await;

    let (status, body) = request(&router, "POST", "/reports/reset", Some(json!({"scope": "all"}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["logs"], 1);
    assert_eq!(body["pauses"], 1);
}

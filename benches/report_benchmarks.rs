//! Performance benchmarks for the duty engine.
//!
//! Covers the hot paths of reporting and of a duty cycle:
//! - Weekly aggregation over 10k closed shifts
//! - The same report served through the HTTP adapter
//! - A full start/pause/resume/end cycle
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use std::sync::Arc;

use axum::{body::Body, http::Request};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use tower::ServiceExt;

use duty_engine::api::{AppState, create_router};
use duty_engine::calculation::{calculate_weekly_totals, week_window};
use duty_engine::clock::ManualClock;
use duty_engine::config::ConfigLoader;
use duty_engine::engine::DutyEngine;
use duty_engine::models::MemberId;
use duty_engine::store::Store;

const MEMBERS: i64 = 200;

fn week_start() -> NaiveDateTime {
    NaiveDateTime::parse_from_str("2026-01-12 06:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
}

/// Fills a store with `shift_count` closed shifts spread over one week.
fn create_populated_store(shift_count: usize) -> Arc<Store> {
    let store = Arc::new(Store::in_memory());
    store
        .transaction(|tables| {
            for i in 0..shift_count {
                let member = MemberId(i as i64 % MEMBERS);
                let start = week_start() + Duration::minutes((i % 6000) as i64);
                let log = tables.insert_shift_log(member, None, start)?;
                let pause = tables.insert_pause(log, start + Duration::minutes(30))?;
                tables.close_pause(pause, start + Duration::minutes(45))?;
                tables.close_shift_log(log, start + Duration::minutes(120))?;
            }
            Ok(())
        })
        .unwrap();
    store
}

/// Benchmark: weekly aggregation straight over the tables.
fn bench_weekly_totals(c: &mut Criterion) {
    let window = week_window(NaiveDate::from_ymd_opt(2026, 1, 14).unwrap());
    let mut group = c.benchmark_group("weekly_totals");

    for shift_count in [1_000usize, 10_000] {
        let store = create_populated_store(shift_count);
        group.throughput(Throughput::Elements(shift_count as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(shift_count),
            &shift_count,
            |b, _| {
                b.iter(|| {
                    let totals = store
                        .read(|tables| {
                            calculate_weekly_totals(tables.shift_logs(), tables.pauses(), &window)
                        })
                        .unwrap()
                        .unwrap();
                    black_box(totals)
                })
            },
        );
    }
    group.finish();
}

/// Benchmark: weekly report through the HTTP adapter.
fn bench_weekly_report_http(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let clock = Arc::new(ManualClock::new(week_start()));
    let engine = DutyEngine::new(create_populated_store(10_000), clock);
    let config = ConfigLoader::load("./config/duty-engine.yaml").expect("Failed to load config");
    let router = create_router(AppState::new(engine, config));

    c.bench_function("weekly_report_http_10k", |b| {
        b.to_async(&rt).iter(|| async {
            let response = router
                .clone()
                .oneshot(
                    Request::builder()
                        .method("GET")
                        .uri("/reports/weekly?date=2026-01-14")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            black_box(response)
        })
    });
}

/// Benchmark: one full duty cycle for a member.
fn bench_duty_cycle(c: &mut Criterion) {
    let clock = Arc::new(ManualClock::new(week_start()));
    let engine = DutyEngine::new(Arc::new(Store::in_memory()), clock.clone());
    let member = MemberId(1);

    c.bench_function("duty_cycle", |b| {
        b.iter(|| {
            engine.shifts().start(member, None).unwrap();
            clock.advance(Duration::minutes(30));
            engine.shifts().pause(member).unwrap();
            clock.advance(Duration::minutes(5));
            engine.shifts().resume(member).unwrap();
            clock.advance(Duration::minutes(30));
            black_box(engine.shifts().end(member).unwrap())
        })
    });
}

criterion_group!(
    benches,
    bench_weekly_totals,
    bench_weekly_report_http,
    bench_duty_cycle
);
criterion_main!(benches);

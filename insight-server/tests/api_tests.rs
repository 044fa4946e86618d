//! Integration tests for insight-server API endpoints
//!
//! Tests cover:
//! - Health endpoint
//! - Filtered listing with pagination and lenient parameter parsing
//! - The three aggregate endpoints and their memo
//! - Structured 404 and store-failure responses

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chrono::Duration as ChronoDuration;
use http_body_util::BodyExt;
use insight_common::config::{OriginPolicy, ServerSettings};
use insight_common::{ManualClock, Record};
use insight_server::{build_router, db, AppState};
use serde_json::Value;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: throwaway store holding `records`
async fn setup_test_db(records: &[Record]) -> (tempfile::TempDir, SqlitePool) {
    let dir = tempfile::tempdir().expect("temp dir");
    let pool = db::init_store(&dir.path().join("insight.db"))
        .await
        .expect("Should create test store");
    db::replace_all(&pool, records)
        .await
        .expect("Should seed test store");
    (dir, pool)
}

/// Test helper: router over `db` with a hand-driven clock
fn setup_app(db: SqlitePool, clock: ManualClock) -> axum::Router {
    let state = AppState::new(db, &ServerSettings::default(), Arc::new(clock));
    build_router(state)
}

fn test_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = body.collect().await.expect("Should read body").to_bytes();
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

fn sample_records() -> Vec<Record> {
    vec![
        Record::new("r01")
            .with_region("Asia")
            .with_country("India")
            .with_topic("oil")
            .with_years(Some(2016), Some(2020))
            .with_scores(6.0, 3.0, 2.0),
        Record::new("r02")
            .with_region("Asia")
            .with_country("China")
            .with_topic("gas")
            .with_years(None, Some(2020))
            .with_scores(4.0, 4.0, 4.0),
        Record::new("r03")
            .with_region("Europe")
            .with_country("France")
            .with_topic("oil")
            .with_years(None, Some(2025))
            .with_scores(10.0, 2.0, 3.0),
        Record::new("r04")
            .with_region("")
            .with_country("")
            .with_topic("market")
            .with_scores(0.0, 0.0, 0.0),
        Record::new("r05")
            .with_region("Asia")
            .with_country("India")
            .with_topic("oil")
            .with_years(None, Some(2025))
            .with_scores(2.0, 1.0, 5.0),
    ]
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (_dir, db) = setup_test_db(&[]).await;
    let app = setup_app(db, ManualClock::default());

    let response = app.oneshot(test_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Server is running");
}

// =============================================================================
// Listing
// =============================================================================

#[tokio::test]
async fn test_listing_basic() {
    let (_dir, db) = setup_test_db(&sample_records()).await;
    let app = setup_app(db, ManualClock::default());

    let response = app.oneshot(test_request("/api/data")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "public, max-age=30"
    );

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["total"], 5);
    assert_eq!(body["page"], 1);
    assert_eq!(body["limit"], 50);
    assert_eq!(body["pages"], 1);

    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 5);
    assert_eq!(data[0]["_id"], "r01");
    assert!(data[0].get("insight").is_none(), "display fields are projected out");
}

#[tokio::test]
async fn test_listing_filters_and_pagination() {
    let (_dir, db) = setup_test_db(&sample_records()).await;
    let app = setup_app(db, ManualClock::default());

    let response = app
        .oneshot(test_request("/api/data?region=Asia&topic=oil&limit=1&page=2"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["limit"], 1);
    assert_eq!(body["page"], 2);
    assert_eq!(body["pages"], 2);

    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["_id"], "r05");
}

#[tokio::test]
async fn test_listing_end_year_filter() {
    let (_dir, db) = setup_test_db(&sample_records()).await;
    let app = setup_app(db.clone(), ManualClock::default());

    let response = app.oneshot(test_request("/api/data?end_year=2020")).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["total"], 2);

    let app = setup_app(db, ManualClock::default());
    let response = app.oneshot(test_request("/api/data?end_year=someday")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["total"], 0);
    assert_eq!(body["pages"], 0);
}

#[tokio::test]
async fn test_listing_malformed_params_are_coerced() {
    let (_dir, db) = setup_test_db(&sample_records()).await;
    let app = setup_app(db, ManualClock::default());

    let response = app
        .oneshot(test_request("/api/data?page=-3&limit=99999"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["page"], 1);
    assert_eq!(body["limit"], 1000);
}

#[tokio::test]
async fn test_listing_page_past_end_is_empty() {
    let (_dir, db) = setup_test_db(&sample_records()).await;
    let app = setup_app(db, ManualClock::default());

    let response = app.oneshot(test_request("/api/data?page=9&limit=2")).await.unwrap();
    let body = extract_json(response.into_body()).await;

    assert_eq!(body["page"], 9);
    assert_eq!(body["pages"], 3);
    assert_eq!(body["total"], 5);
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_listing_pages_matches_ceil_and_is_repeatable() {
    let records: Vec<Record> = (0..23)
        .map(|i| Record::new(format!("id{:02}", i)).with_region("Asia"))
        .collect();
    let (_dir, db) = setup_test_db(&records).await;

    for limit in [1, 5, 7, 23, 50] {
        let mut totals = Vec::new();
        for _ in 0..2 {
            let app = setup_app(db.clone(), ManualClock::default());
            let uri = format!("/api/data?region=Asia&limit={}", limit);
            let body = extract_json(app.oneshot(test_request(&uri)).await.unwrap().into_body()).await;

            let total = body["total"].as_i64().unwrap();
            let pages = body["pages"].as_i64().unwrap();
            assert_eq!(pages, (total + limit - 1) / limit);
            assert!(body["data"].as_array().unwrap().len() as i64 <= limit);
            totals.push(total);
        }
        assert_eq!(totals[0], totals[1]);
    }
}

// =============================================================================
// Aggregates
// =============================================================================

#[tokio::test]
async fn test_intensity_by_region() {
    let (_dir, db) = setup_test_db(&sample_records()).await;
    let app = setup_app(db, ManualClock::default());

    let response = app
        .oneshot(test_request("/api/analytics/intensity-by-region"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "public, max-age=60"
    );

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], true);
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["region"], "Europe");
    assert_eq!(data[0]["avgIntensity"], 10.0);
    assert_eq!(data[0]["count"], 1);
    assert_eq!(data[1]["region"], "Asia");
    assert_eq!(data[1]["avgIntensity"], 4.0);
    assert_eq!(data[1]["count"], 3);
}

#[tokio::test]
async fn test_single_record_region() {
    let records = vec![Record::new("only").with_region("Asia").with_scores(5.0, 3.0, 1.0)];
    let (_dir, db) = setup_test_db(&records).await;
    let app = setup_app(db, ManualClock::default());

    let response = app
        .oneshot(test_request("/api/analytics/intensity-by-region"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;

    assert_eq!(
        body["data"],
        serde_json::json!([{"region": "Asia", "avgIntensity": 5.0, "count": 1}])
    );
}

#[tokio::test]
async fn test_likelihood_by_country() {
    let (_dir, db) = setup_test_db(&sample_records()).await;
    let app = setup_app(db, ManualClock::default());

    let response = app
        .oneshot(test_request("/api/analytics/likelihood-by-country"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    let data = body["data"].as_array().unwrap();

    let countries: Vec<&str> = data.iter().map(|d| d["country"].as_str().unwrap()).collect();
    assert_eq!(countries, vec!["China", "France", "India"]);
    assert_eq!(data[2]["avgLikelihood"], 2.0);
    assert_eq!(data[2]["count"], 2);
}

#[tokio::test]
async fn test_relevance_by_year() {
    let (_dir, db) = setup_test_db(&sample_records()).await;
    let app = setup_app(db, ManualClock::default());

    let response = app
        .oneshot(test_request("/api/analytics/relevance-by-year"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;

    assert_eq!(
        body["data"],
        serde_json::json!([
            {"year": 2020, "avgRelevance": 3.0, "count": 2},
            {"year": 2025, "avgRelevance": 4.0, "count": 2}
        ])
    );
}

#[tokio::test]
async fn test_aggregate_memo_expires() {
    let (_dir, db) = setup_test_db(&sample_records()).await;
    let clock = ManualClock::default();
    let state = AppState::new(db.clone(), &ServerSettings::default(), Arc::new(clock.clone()));

    let first = extract_json(
        build_router(state.clone())
            .oneshot(test_request("/api/analytics/intensity-by-region"))
            .await
            .unwrap()
            .into_body(),
    )
    .await;
    assert_eq!(first["data"].as_array().unwrap().len(), 2);

    db::replace_all(&db, &[Record::new("x").with_region("Africa").with_scores(3.0, 1.0, 1.0)])
        .await
        .unwrap();

    clock.advance(ChronoDuration::seconds(10));
    let memoized = extract_json(
        build_router(state.clone())
            .oneshot(test_request("/api/analytics/intensity-by-region"))
            .await
            .unwrap()
            .into_body(),
    )
    .await;
    assert_eq!(memoized, first);

    clock.advance(ChronoDuration::seconds(60));
    let refreshed = extract_json(
        build_router(state)
            .oneshot(test_request("/api/analytics/intensity-by-region"))
            .await
            .unwrap()
            .into_body(),
    )
    .await;
    assert_eq!(
        refreshed["data"],
        serde_json::json!([{"region": "Africa", "avgIntensity": 3.0, "count": 1}])
    );
}

// =============================================================================
// Errors
// =============================================================================

#[tokio::test]
async fn test_unknown_route_is_structured_404() {
    let (_dir, db) = setup_test_db(&[]).await;
    let app = setup_app(db, ManualClock::default());

    let response = app.oneshot(test_request("/api/nothing-here")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["status"], 404);
    assert_eq!(body["message"], "Route not found: /api/nothing-here");
}

#[tokio::test]
async fn test_closed_store_is_service_unavailable() {
    let (_dir, db) = setup_test_db(&sample_records()).await;
    let app = setup_app(db.clone(), ManualClock::default());
    db.close().await;

    let response = app.oneshot(test_request("/api/data")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["status"], 503);
}

#[tokio::test]
async fn test_cors_is_permissive_by_default() {
    let (_dir, db) = setup_test_db(&[]).await;
    let app = setup_app(db, ManualClock::default());

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .header(header::ORIGIN, "http://dashboard.example")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_cors_restricted_to_configured_origins() {
    let (_dir, db) = setup_test_db(&[]).await;
    let settings = ServerSettings {
        origins: OriginPolicy::Only(vec!["http://dash.local".to_string()]),
        ..ServerSettings::default()
    };
    let state = AppState::new(db, &settings, Arc::new(ManualClock::default()));

    let request = |origin: &str| {
        Request::builder()
            .method("GET")
            .uri("/health")
            .header(header::ORIGIN, origin)
            .body(Body::empty())
            .unwrap()
    };

    let allowed = build_router(state.clone())
        .oneshot(request("http://dash.local"))
        .await
        .unwrap();
    assert_eq!(
        allowed
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://dash.local"
    );

    let denied = build_router(state)
        .oneshot(request("http://elsewhere.example"))
        .await
        .unwrap();
    assert_eq!(denied.status(), StatusCode::OK);
    assert!(denied
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

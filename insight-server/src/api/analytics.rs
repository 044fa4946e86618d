//! Aggregate endpoints
//!
//! GET /api/analytics/intensity-by-region
//! GET /api/analytics/likelihood-by-country
//! GET /api/analytics/relevance-by-year

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use insight_common::api::AnalyticsEnvelope;
use serde::Serialize;

use crate::{ApiResult, AppState};

fn cached_json<T: Serialize>(data: Vec<T>) -> Response {
    (
        [(header::CACHE_CONTROL, "public, max-age=60")],
        Json(AnalyticsEnvelope::ok(data)),
    )
        .into_response()
}

pub async fn intensity_by_region(State(state): State<AppState>) -> ApiResult<Response> {
    let rows = state.analytics.intensity_by_region().await?;
    Ok(cached_json(rows.as_ref().clone()))
}

pub async fn likelihood_by_country(State(state): State<AppState>) -> ApiResult<Response> {
    let rows = state.analytics.likelihood_by_country().await?;
    Ok(cached_json(rows.as_ref().clone()))
}

pub async fn relevance_by_year(State(state): State<AppState>) -> ApiResult<Response> {
    let rows = state.analytics.relevance_by_year().await?;
    Ok(cached_json(rows.as_ref().clone()))
}

//! Health check endpoint

use axum::Json;
use insight_common::api::HealthResponse;

/// GET /health
///
/// Liveness only; does not touch the record store.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        message: "Server is running".to_string(),
    })
}

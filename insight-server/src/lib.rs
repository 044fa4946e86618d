//! insight-server library - record listing and aggregate analytics
//!
//! Read-only HTTP service over the record store: filtered, paginated
//! listing plus three memoized grouped-average aggregations.

use axum::{
    http::{HeaderValue, Method},
    response::{IntoResponse, Response},
    Router,
};
use insight_common::config::{OriginPolicy, ServerSettings};
use insight_common::Clock;
use sqlx::SqlitePool;
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{self, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

pub mod analytics;
pub mod api;
pub mod cache;
pub mod db;
pub mod error;
pub mod import;
pub mod pagination;

pub use crate::error::{ApiError, ApiResult};
use crate::analytics::AnalyticsService;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Record store connection pool (read-only in production)
    pub db: SqlitePool,
    /// Memoized aggregations
    pub analytics: Arc<AnalyticsService>,
    /// Upper bound for the listing `limit`
    pub max_page_size: i64,
    /// Cross-origin policy
    pub origins: OriginPolicy,
}

impl AppState {
    pub fn new(db: SqlitePool, settings: &ServerSettings, clock: Arc<dyn Clock>) -> Self {
        let analytics = Arc::new(AnalyticsService::new(db.clone(), settings.cache_ttl, clock));
        Self {
            db,
            analytics,
            max_page_size: settings.max_page_size,
            origins: settings.origins.clone(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    let cors = cors_layer(&state.origins);

    Router::new()
        .route("/health", get(api::health_check))
        .route("/api/data", get(api::get_data))
        .route(
            "/api/analytics/intensity-by-region",
            get(api::intensity_by_region),
        )
        .route(
            "/api/analytics/likelihood-by-country",
            get(api::likelihood_by_country),
        )
        .route(
            "/api/analytics/relevance-by-year",
            get(api::relevance_by_year),
        )
        .fallback(api::not_found)
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn cors_layer(policy: &OriginPolicy) -> CorsLayer {
    match policy {
        OriginPolicy::Any => CorsLayer::permissive(),
        OriginPolicy::Only(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        warn!("Ignoring invalid allowed origin: {}", origin);
                        None
                    }
                })
                .collect();

            CorsLayer::new()
                .allow_origin(cors::AllowOrigin::list(origins))
                .allow_methods([Method::GET])
                .allow_headers(cors::Any)
        }
    }
}

/// Catch-all for panics inside handlers
fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    error!("Handler panicked: {}", detail);

    ApiError::Internal("Internal Server Error".to_string()).into_response()
}

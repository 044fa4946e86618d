//! HTTP API handlers for insight-server

pub mod analytics;
pub mod data;
pub mod health;

pub use analytics::{intensity_by_region, likelihood_by_country, relevance_by_year};
pub use data::get_data;
pub use health::health_check;

use crate::ApiError;
use axum::http::Uri;

/// Fallback for unmatched routes
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(uri.to_string())
}

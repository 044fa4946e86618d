//! Error types for insight-server
//!
//! Every handled failure is rendered as `{success: false, status, message}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use insight_common::api::ErrorBody;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Unmatched route (404)
    #[error("Route not found: {0}")]
    NotFound(String),

    /// Record store cannot be reached (503)
    #[error("Record store unavailable: {0}")]
    Unavailable(String),

    /// Any other store failure (500)
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// Internal server error (500)
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                ApiError::Unavailable(err.to_string())
            }
            other => ApiError::Database(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed ({}): {}", status.as_u16(), self);
        }

        let body = Json(ErrorBody::new(status.as_u16(), self.to_string()));
        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

//! Shared HTTP request/response types
//!
//! The server serializes these and the dashboard client deserializes them,
//! so both sides agree on one wire format.

use crate::Record;
use serde::{Deserialize, Serialize};

// ========================================
// Listing
// ========================================

/// `GET /api/data` response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPage {
    pub success: bool,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub pages: i64,
    pub data: Vec<Record>,
}

// ========================================
// Aggregates
// ========================================

/// Mean intensity of one region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntensityByRegion {
    pub region: String,
    pub avg_intensity: f64,
    pub count: i64,
}

/// Mean likelihood of one country
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikelihoodByCountry {
    pub country: String,
    pub avg_likelihood: f64,
    pub count: i64,
}

/// Mean relevance of one end year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelevanceByYear {
    pub year: i64,
    pub avg_relevance: f64,
    pub count: i64,
}

/// `GET /api/analytics/*` response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsEnvelope<T> {
    pub success: bool,
    pub data: Vec<T>,
}

impl<T> AnalyticsEnvelope<T> {
    pub fn ok(data: Vec<T>) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

// ========================================
// Health and errors
// ========================================

/// `GET /health` response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub success: bool,
    pub message: String,
}

/// Body of every handled error response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub status: u16,
    pub message: String,
}

impl ErrorBody {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            success: false,
            status,
            message: message.into(),
        }
    }
}

//! insight-server HTTP client

use insight_common::api::{
    AnalyticsEnvelope, DataPage, ErrorBody, HealthResponse, IntensityByRegion,
    LikelihoodByCountry, RelevanceByYear,
};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::{ClientError, ClientResult};
use crate::filters::Filters;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const USER_AGENT: &str = concat!("insight-dash/", env!("CARGO_PKG_VERSION"));

/// Typed calls for every insight-server endpoint
#[derive(Debug, Clone)]
pub struct DashboardApi {
    http_client: reqwest::Client,
    base_url: String,
}

impl DashboardApi {
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        Self::with_timeout(base_url, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> ClientResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ClientResult<T> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, params = query.len(), "GET");

        let response = self.http_client.get(&url).query(query).send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|body| body.message)
                .unwrap_or(text);
            return Err(ClientError::Api(status.as_u16(), message));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))
    }

    /// One page of the filtered listing; only non-empty server-side filters
    /// are sent
    pub async fn fetch_data(&self, filters: &Filters, page: i64, limit: i64) -> ClientResult<DataPage> {
        let mut query = filters.listing_params();
        query.push(("page", page.to_string()));
        query.push(("limit", limit.to_string()));

        let body: DataPage = self.get_json("/api/data", &query).await?;
        if !body.success {
            return Err(ClientError::Unsuccessful(format!("/api/data page {}", page)));
        }
        Ok(body)
    }

    async fn fetch_analytics<T: DeserializeOwned>(&self, name: &str) -> ClientResult<Vec<T>> {
        let path = format!("/api/analytics/{}", name);
        let body: AnalyticsEnvelope<T> = self.get_json(&path, &[]).await?;
        if !body.success {
            return Err(ClientError::Unsuccessful(path));
        }
        Ok(body.data)
    }

    pub async fn intensity_by_region(&self) -> ClientResult<Vec<IntensityByRegion>> {
        self.fetch_analytics("intensity-by-region").await
    }

    pub async fn likelihood_by_country(&self) -> ClientResult<Vec<LikelihoodByCountry>> {
        self.fetch_analytics("likelihood-by-country").await
    }

    pub async fn relevance_by_year(&self) -> ClientResult<Vec<RelevanceByYear>> {
        self.fetch_analytics("relevance-by-year").await
    }

    pub async fn health(&self) -> ClientResult<HealthResponse> {
        self.get_json("/health", &[]).await
    }
}

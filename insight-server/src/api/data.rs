//! Filtered listing of records with offset pagination
//!
//! GET /api/data?end_year&topic&sector&region&pestle&source&country&city&page&limit

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use insight_common::api::DataPage;
use tracing::debug;

use crate::db::{count_records, list_records, RecordFilter, TextColumn, YearConstraint};
use crate::pagination::Pagination;
use crate::{ApiResult, AppState};

/// Parsed listing request
#[derive(Debug, Clone, PartialEq)]
pub struct ListingQuery {
    pub filter: RecordFilter,
    pub pagination: Pagination,
}

impl ListingQuery {
    /// Build from raw query pairs; the first occurrence of a key wins and
    /// unknown keys are ignored
    pub fn from_pairs(pairs: &[(String, String)], max_limit: i64) -> Self {
        let first = |name: &str| {
            pairs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str())
        };

        let mut filter = RecordFilter::default();
        if let Some(raw) = first("end_year") {
            filter = filter.with_end_year(YearConstraint::parse(raw));
        }
        for column in TextColumn::ALL {
            if let Some(value) = first(column.column()) {
                filter = filter.with_text(column, value);
            }
        }

        Self {
            filter,
            pagination: Pagination::from_params(first("page"), first("limit"), max_limit),
        }
    }
}

/// GET /api/data
pub async fn get_data(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> ApiResult<Response> {
    let query = ListingQuery::from_pairs(&pairs, state.max_page_size);
    let p = query.pagination;

    let (data, total) = tokio::try_join!(
        list_records(&state.db, &query.filter, p.limit, p.offset),
        count_records(&state.db, &query.filter),
    )?;

    debug!(
        "Listing page {} (limit {}): {} of {} records",
        p.page,
        p.limit,
        data.len(),
        total
    );

    let body = DataPage {
        success: true,
        total,
        page: p.page,
        limit: p.limit,
        pages: p.total_pages(total),
        data,
    };

    Ok(([(header::CACHE_CONTROL, "public, max-age=30")], Json(body)).into_response())
}

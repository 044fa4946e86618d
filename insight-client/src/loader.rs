//! Bulk loading of the record set and the server aggregates

use futures::future::try_join_all;
use insight_common::api::{IntensityByRegion, LikelihoodByCountry, RelevanceByYear};
use insight_common::Record;
use tracing::info;

use crate::api::DashboardApi;
use crate::error::ClientResult;
use crate::filters::Filters;

/// Records requested per listing page
pub const PAGE_SIZE: i64 = 500;
/// Pages fetched at most; anything beyond is not loaded
pub const MAX_PAGES: i64 = 20;

/// Load the unfiltered record set: page 1 first, then the remaining pages
/// concurrently, concatenated in page order
pub async fn fetch_all_records(api: &DashboardApi) -> ClientResult<Vec<Record>> {
    let filters = Filters::default();
    let first = api.fetch_data(&filters, 1, PAGE_SIZE).await?;
    if first.pages <= 1 {
        return Ok(first.data);
    }

    let last_page = first.pages.min(MAX_PAGES);
    if first.pages > MAX_PAGES {
        info!(
            "Record set spans {} pages; loading the first {}",
            first.pages, MAX_PAGES
        );
    }

    let rest = try_join_all(
        (2..=last_page).map(|page| api.fetch_data(&filters, page, PAGE_SIZE)),
    )
    .await?;

    let mut records = first.data;
    for page in rest {
        records.extend(page.data);
    }
    info!("Loaded {} of {} records", records.len(), first.total);
    Ok(records)
}

/// Server aggregates; each one succeeds or fails on its own
#[derive(Debug)]
pub struct AnalyticsBundle {
    pub intensity_by_region: ClientResult<Vec<IntensityByRegion>>,
    pub likelihood_by_country: ClientResult<Vec<LikelihoodByCountry>>,
    pub relevance_by_year: ClientResult<Vec<RelevanceByYear>>,
}

impl AnalyticsBundle {
    pub fn all_ok(&self) -> bool {
        self.intensity_by_region.is_ok()
            && self.likelihood_by_country.is_ok()
            && self.relevance_by_year.is_ok()
    }
}

/// Fetch the three aggregate endpoints concurrently
pub async fn load_analytics(api: &DashboardApi) -> AnalyticsBundle {
    let (intensity_by_region, likelihood_by_country, relevance_by_year) = tokio::join!(
        api.intensity_by_region(),
        api.likelihood_by_country(),
        api.relevance_by_year(),
    );

    AnalyticsBundle {
        intensity_by_region,
        likelihood_by_country,
        relevance_by_year,
    }
}

//! Aggregation service: grouped averages over the whole store
//!
//! Each aggregation takes no parameters and is memoized under its route
//! name for one cache TTL.

use crate::cache::TtlCache;
use crate::db::aggregates;
use insight_common::api::{IntensityByRegion, LikelihoodByCountry, RelevanceByYear};
use insight_common::Clock;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub const INTENSITY_BY_REGION: &str = "intensity-by-region";
pub const LIKELIHOOD_BY_COUNTRY: &str = "likelihood-by-country";
pub const RELEVANCE_BY_YEAR: &str = "relevance-by-year";

/// Memoized access to the three fixed aggregations
pub struct AnalyticsService {
    db: SqlitePool,
    intensity: TtlCache<Arc<Vec<IntensityByRegion>>>,
    likelihood: TtlCache<Arc<Vec<LikelihoodByCountry>>>,
    relevance: TtlCache<Arc<Vec<RelevanceByYear>>>,
}

impl AnalyticsService {
    pub fn new(db: SqlitePool, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            db,
            intensity: TtlCache::new(ttl, clock.clone()),
            likelihood: TtlCache::new(ttl, clock.clone()),
            relevance: TtlCache::new(ttl, clock),
        }
    }

    pub async fn intensity_by_region(&self) -> Result<Arc<Vec<IntensityByRegion>>, sqlx::Error> {
        let db = &self.db;
        self.intensity
            .get_or_try_insert_with(INTENSITY_BY_REGION, move || async move {
                let rows = aggregates::intensity_by_region(db).await?;
                info!("Recomputed {} ({} groups)", INTENSITY_BY_REGION, rows.len());
                Ok::<_, sqlx::Error>(Arc::new(rows))
            })
            .await
    }

    pub async fn likelihood_by_country(
        &self,
    ) -> Result<Arc<Vec<LikelihoodByCountry>>, sqlx::Error> {
        let db = &self.db;
        self.likelihood
            .get_or_try_insert_with(LIKELIHOOD_BY_COUNTRY, move || async move {
                let rows = aggregates::likelihood_by_country(db).await?;
                info!("Recomputed {} ({} groups)", LIKELIHOOD_BY_COUNTRY, rows.len());
                Ok::<_, sqlx::Error>(Arc::new(rows))
            })
            .await
    }

    pub async fn relevance_by_year(&self) -> Result<Arc<Vec<RelevanceByYear>>, sqlx::Error> {
        let db = &self.db;
        self.relevance
            .get_or_try_insert_with(RELEVANCE_BY_YEAR, move || async move {
                let rows = aggregates::relevance_by_year(db).await?;
                info!("Recomputed {} ({} groups)", RELEVANCE_BY_YEAR, rows.len());
                Ok::<_, sqlx::Error>(Arc::new(rows))
            })
            .await
    }
}

//! Grouped averages over the whole store
//!
//! Groups are ordered by the unrounded mean (group key as tie-break);
//! means are rounded to 2 decimals afterwards.

use insight_common::api::{IntensityByRegion, LikelihoodByCountry, RelevanceByYear};
use insight_common::stats::round2;
use sqlx::SqlitePool;

/// Mean intensity per non-empty region, intensity > 0, highest mean first
pub async fn intensity_by_region(pool: &SqlitePool) -> Result<Vec<IntensityByRegion>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (String, f64, i64)>(
        r#"
        SELECT region, AVG(intensity) AS avg_intensity, COUNT(*) AS n
        FROM records
        WHERE region <> '' AND intensity > 0
        GROUP BY region
        ORDER BY avg_intensity DESC, region ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(region, avg, count)| IntensityByRegion {
            region,
            avg_intensity: round2(avg),
            count,
        })
        .collect())
}

/// Mean likelihood per non-empty country, likelihood > 0, highest mean first
pub async fn likelihood_by_country(
    pool: &SqlitePool,
) -> Result<Vec<LikelihoodByCountry>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (String, f64, i64)>(
        r#"
        SELECT country, AVG(likelihood) AS avg_likelihood, COUNT(*) AS n
        FROM records
        WHERE country <> '' AND likelihood > 0
        GROUP BY country
        ORDER BY avg_likelihood DESC, country ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(country, avg, count)| LikelihoodByCountry {
            country,
            avg_likelihood: round2(avg),
            count,
        })
        .collect())
}

/// Mean relevance per end year (> 0), relevance > 0, oldest year first
pub async fn relevance_by_year(pool: &SqlitePool) -> Result<Vec<RelevanceByYear>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (i64, f64, i64)>(
        r#"
        SELECT end_year, AVG(relevance) AS avg_relevance, COUNT(*) AS n
        FROM records
        WHERE end_year IS NOT NULL AND end_year > 0 AND relevance > 0
        GROUP BY end_year
        ORDER BY end_year ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(year, avg, count)| RelevanceByYear {
            year,
            avg_relevance: round2(avg),
            count,
        })
        .collect())
}

//! Record listing, counting and bulk replacement
//!
//! Listing order is `rowid` (import order) so that offset pagination is
//! stable across requests.

use insight_common::Record;
use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, Sqlite, SqlitePool};

/// Columns exposed to listing; the display-only text is left out
const LISTING_COLUMNS: &str = "id, end_year, start_year, impact, intensity, likelihood, relevance, \
     sector, topic, region, pestle, source, country, city";

/// String columns that support exact-match filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextColumn {
    Topic,
    Sector,
    Region,
    Pestle,
    Source,
    Country,
    City,
}

impl TextColumn {
    pub const ALL: [TextColumn; 7] = [
        TextColumn::Topic,
        TextColumn::Sector,
        TextColumn::Region,
        TextColumn::Pestle,
        TextColumn::Source,
        TextColumn::Country,
        TextColumn::City,
    ];

    /// Column name, also the query parameter name
    pub fn column(self) -> &'static str {
        match self {
            TextColumn::Topic => "topic",
            TextColumn::Sector => "sector",
            TextColumn::Region => "region",
            TextColumn::Pestle => "pestle",
            TextColumn::Source => "source",
            TextColumn::Country => "country",
            TextColumn::City => "city",
        }
    }
}

/// Constraint on `end_year`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum YearConstraint {
    #[default]
    Any,
    Equals(i64),
    /// Value was not a whole number; nothing can match
    Impossible,
}

impl YearConstraint {
    /// Empty means unconstrained; "2020" and "2020.0" both mean 2020
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return YearConstraint::Any;
        }
        match raw.parse::<f64>() {
            Ok(year) if year.is_finite() && year.fract() == 0.0 => YearConstraint::Equals(year as i64),
            _ => YearConstraint::Impossible,
        }
    }
}

/// Conjunction of equality filters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    pub end_year: YearConstraint,
    pub text: Vec<(TextColumn, String)>,
}

impl RecordFilter {
    pub fn with_end_year(mut self, constraint: YearConstraint) -> Self {
        self.end_year = constraint;
        self
    }

    /// Add an equality constraint; empty values impose nothing
    pub fn with_text(mut self, column: TextColumn, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.text.push((column, value));
        }
        self
    }

    fn push_where<'args>(&'args self, qb: &mut QueryBuilder<'args, Sqlite>) {
        let mut separator = " WHERE ";

        match self.end_year {
            YearConstraint::Any => {}
            YearConstraint::Equals(year) => {
                qb.push(separator).push("end_year = ").push_bind(year);
                separator = " AND ";
            }
            YearConstraint::Impossible => {
                qb.push(separator).push("0 = 1");
                separator = " AND ";
            }
        }

        for (column, value) in &self.text {
            qb.push(separator)
                .push(column.column())
                .push(" = ")
                .push_bind(value.as_str());
            separator = " AND ";
        }
    }
}

/// Number of records matching `filter`
pub async fn count_records(pool: &SqlitePool, filter: &RecordFilter) -> Result<i64, sqlx::Error> {
    let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM records");
    filter.push_where(&mut qb);
    qb.build_query_scalar::<i64>().fetch_one(pool).await
}

/// One page of records matching `filter`
pub async fn list_records(
    pool: &SqlitePool,
    filter: &RecordFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<Record>, sqlx::Error> {
    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM records", LISTING_COLUMNS));
    filter.push_where(&mut qb);
    qb.push(" ORDER BY rowid LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);

    let rows = qb.build().fetch_all(pool).await?;
    rows.iter().map(record_from_row).collect()
}

fn record_from_row(row: &SqliteRow) -> Result<Record, sqlx::Error> {
    Ok(Record {
        id: row.try_get("id")?,
        end_year: row.try_get("end_year")?,
        start_year: row.try_get("start_year")?,
        impact: row.try_get("impact")?,
        intensity: row.try_get("intensity")?,
        likelihood: row.try_get("likelihood")?,
        relevance: row.try_get("relevance")?,
        sector: row.try_get("sector")?,
        topic: row.try_get("topic")?,
        region: row.try_get("region")?,
        pestle: row.try_get("pestle")?,
        source: row.try_get("source")?,
        country: row.try_get("country")?,
        city: row.try_get("city")?,
        insight: None,
        url: None,
        title: None,
        added: None,
        published: None,
    })
}

/// Clear the store and insert `records` in one transaction
///
/// Used by the bulk import only.
pub async fn replace_all(pool: &SqlitePool, records: &[Record]) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM records").execute(&mut *tx).await?;

    for record in records {
        sqlx::query(
            r#"
            INSERT INTO records (
                id, end_year, start_year, impact, intensity, likelihood, relevance,
                sector, topic, region, pestle, source, country, city,
                insight, url, title, added, published
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(record.end_year)
        .bind(record.start_year)
        .bind(record.impact)
        .bind(record.intensity)
        .bind(record.likelihood)
        .bind(record.relevance)
        .bind(&record.sector)
        .bind(&record.topic)
        .bind(&record.region)
        .bind(&record.pestle)
        .bind(&record.source)
        .bind(&record.country)
        .bind(&record.city)
        .bind(record.insight.as_deref().unwrap_or(""))
        .bind(record.url.as_deref().unwrap_or(""))
        .bind(record.title.as_deref().unwrap_or(""))
        .bind(record.added.as_deref().unwrap_or(""))
        .bind(record.published.as_deref().unwrap_or(""))
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(records.len() as u64)
}

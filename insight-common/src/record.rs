//! The analytics record model
//!
//! One flat observation with its topic/sector/region/country labels and the
//! three scores every aggregation works on. Records are written only by the
//! bulk import and are immutable afterwards.

use serde::{Deserialize, Serialize};

/// One analytics observation as served by `GET /api/data`
///
/// The display-only text fields (`insight`, `url`, `title`, `added`,
/// `published`) are left out of listing projections and are `None` there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Opaque, stable identifier
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub end_year: Option<i64>,
    #[serde(default)]
    pub start_year: Option<i64>,
    #[serde(default)]
    pub impact: Option<i64>,
    #[serde(default)]
    pub intensity: f64,
    #[serde(default)]
    pub likelihood: f64,
    #[serde(default)]
    pub relevance: f64,
    #[serde(default)]
    pub sector: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub pestle: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub city: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,
}

impl Record {
    /// Blank record with the given id; builder-style setters fill the rest
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            end_year: None,
            start_year: None,
            impact: None,
            intensity: 0.0,
            likelihood: 0.0,
            relevance: 0.0,
            sector: String::new(),
            topic: String::new(),
            region: String::new(),
            pestle: String::new(),
            source: String::new(),
            country: String::new(),
            city: String::new(),
            insight: None,
            url: None,
            title: None,
            added: None,
            published: None,
        }
    }

    pub fn with_scores(mut self, intensity: f64, likelihood: f64, relevance: f64) -> Self {
        self.intensity = intensity;
        self.likelihood = likelihood;
        self.relevance = relevance;
        self
    }

    pub fn with_years(mut self, start_year: Option<i64>, end_year: Option<i64>) -> Self {
        self.start_year = start_year;
        self.end_year = end_year;
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = city.into();
        self
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = sector.into();
        self
    }

    pub fn with_pestle(mut self, pestle: impl Into<String>) -> Self {
        self.pestle = pestle.into();
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// City if present, otherwise the country (may still be empty)
    pub fn effective_city(&self) -> &str {
        if self.city.is_empty() {
            &self.country
        } else {
            &self.city
        }
    }

    /// `end_year`, falling back to `start_year`
    pub fn trend_year(&self) -> Option<i64> {
        self.end_year.or(self.start_year)
    }
}

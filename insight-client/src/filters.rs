//! Dashboard filter set and the local filtering predicate
//!
//! Every key holds a string; the empty string means "no constraint".
//! `swot`, `intensity_min` and `likelihood_min` are client-side only and
//! never sent to the listing endpoint.

use insight_common::Record;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::swot::{derive_swot, SwotLabel};

/// One filter dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKey {
    EndYear,
    Topic,
    Sector,
    Region,
    Pestle,
    Source,
    Swot,
    Country,
    City,
    IntensityMin,
    LikelihoodMin,
}

impl FilterKey {
    pub const ALL: [FilterKey; 11] = [
        FilterKey::EndYear,
        FilterKey::Topic,
        FilterKey::Sector,
        FilterKey::Region,
        FilterKey::Pestle,
        FilterKey::Source,
        FilterKey::Swot,
        FilterKey::Country,
        FilterKey::City,
        FilterKey::IntensityMin,
        FilterKey::LikelihoodMin,
    ];

    /// Wire/query name of the key
    pub fn as_str(self) -> &'static str {
        match self {
            FilterKey::EndYear => "end_year",
            FilterKey::Topic => "topic",
            FilterKey::Sector => "sector",
            FilterKey::Region => "region",
            FilterKey::Pestle => "pestle",
            FilterKey::Source => "source",
            FilterKey::Swot => "swot",
            FilterKey::Country => "country",
            FilterKey::City => "city",
            FilterKey::IntensityMin => "intensity_min",
            FilterKey::LikelihoodMin => "likelihood_min",
        }
    }

    /// Whether the listing endpoint understands this key
    pub fn is_server_side(self) -> bool {
        !matches!(
            self,
            FilterKey::Swot | FilterKey::IntensityMin | FilterKey::LikelihoodMin
        )
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| format!("Unknown filter key: {}", s))
    }
}

/// Complete filter selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Filters {
    pub end_year: String,
    pub topic: String,
    pub sector: String,
    pub region: String,
    pub pestle: String,
    pub source: String,
    pub swot: String,
    pub country: String,
    pub city: String,
    pub intensity_min: String,
    pub likelihood_min: String,
}

impl Filters {
    pub fn get(&self, key: FilterKey) -> &str {
        match key {
            FilterKey::EndYear => &self.end_year,
            FilterKey::Topic => &self.topic,
            FilterKey::Sector => &self.sector,
            FilterKey::Region => &self.region,
            FilterKey::Pestle => &self.pestle,
            FilterKey::Source => &self.source,
            FilterKey::Swot => &self.swot,
            FilterKey::Country => &self.country,
            FilterKey::City => &self.city,
            FilterKey::IntensityMin => &self.intensity_min,
            FilterKey::LikelihoodMin => &self.likelihood_min,
        }
    }

    fn slot(&mut self, key: FilterKey) -> &mut String {
        match key {
            FilterKey::EndYear => &mut self.end_year,
            FilterKey::Topic => &mut self.topic,
            FilterKey::Sector => &mut self.sector,
            FilterKey::Region => &mut self.region,
            FilterKey::Pestle => &mut self.pestle,
            FilterKey::Source => &mut self.source,
            FilterKey::Swot => &mut self.swot,
            FilterKey::Country => &mut self.country,
            FilterKey::City => &mut self.city,
            FilterKey::IntensityMin => &mut self.intensity_min,
            FilterKey::LikelihoodMin => &mut self.likelihood_min,
        }
    }

    pub fn set(&mut self, key: FilterKey, value: impl Into<String>) {
        *self.slot(key) = value.into();
    }

    /// Builder-style [`Filters::set`]
    pub fn with(mut self, key: FilterKey, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Number of keys holding a non-empty value
    pub fn active_count(&self) -> usize {
        FilterKey::ALL
            .into_iter()
            .filter(|key| !self.get(*key).is_empty())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }

    /// Non-empty filters the listing endpoint accepts, as query pairs
    pub fn listing_params(&self) -> Vec<(&'static str, String)> {
        FilterKey::ALL
            .into_iter()
            .filter(|key| key.is_server_side())
            .filter_map(|key| {
                let value = self.get(key);
                (!value.is_empty()).then(|| (key.as_str(), value.to_string()))
            })
            .collect()
    }

    /// AND of every populated constraint
    pub fn matches(&self, record: &Record) -> bool {
        if !self.end_year.is_empty() {
            let year = record.end_year.map(|y| y.to_string()).unwrap_or_default();
            if year != self.end_year {
                return false;
            }
        }

        let text_checks = [
            (&self.topic, record.topic.as_str()),
            (&self.sector, record.sector.as_str()),
            (&self.region, record.region.as_str()),
            (&self.pestle, record.pestle.as_str()),
            (&self.source, record.source.as_str()),
            (&self.country, record.country.as_str()),
            (&self.city, record.effective_city()),
        ];
        if text_checks
            .iter()
            .any(|(wanted, actual)| !wanted.is_empty() && wanted.as_str() != *actual)
        {
            return false;
        }

        if !self.swot.is_empty() && derive_swot(record).as_str() != self.swot {
            return false;
        }

        meets_threshold(record.intensity, &self.intensity_min)
            && meets_threshold(record.likelihood, &self.likelihood_min)
    }

    /// Records passing [`Filters::matches`], in their original order
    pub fn apply(&self, records: &[Record]) -> Vec<Record> {
        records
            .iter()
            .filter(|record| self.matches(record))
            .cloned()
            .collect()
    }
}

/// `value >= threshold`; an empty, unparsable or non-finite threshold passes everything
fn meets_threshold(value: f64, threshold: &str) -> bool {
    match threshold.trim().parse::<f64>() {
        Ok(min) if min.is_finite() => value >= min,
        _ => true,
    }
}

/// Selectable values per filter key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub end_year: Vec<String>,
    pub topic: Vec<String>,
    pub sector: Vec<String>,
    pub region: Vec<String>,
    pub pestle: Vec<String>,
    pub source: Vec<String>,
    pub swot: Vec<String>,
    pub country: Vec<String>,
    pub city: Vec<String>,
    pub intensity_min: Vec<String>,
    pub likelihood_min: Vec<String>,
}

impl FilterOptions {
    /// Sorted distinct non-empty values seen in the unfiltered set; the
    /// derived/bucketed keys get fixed lists
    pub fn derive(records: &[Record]) -> Self {
        Self {
            end_year: unique_sorted(
                records
                    .iter()
                    .filter_map(|r| r.end_year.map(|y| y.to_string())),
            ),
            topic: unique_sorted(records.iter().map(|r| r.topic.clone())),
            sector: unique_sorted(records.iter().map(|r| r.sector.clone())),
            region: unique_sorted(records.iter().map(|r| r.region.clone())),
            pestle: unique_sorted(records.iter().map(|r| r.pestle.clone())),
            source: unique_sorted(records.iter().map(|r| r.source.clone())),
            swot: SwotLabel::ALL
                .iter()
                .map(|label| label.as_str().to_string())
                .collect(),
            country: unique_sorted(records.iter().map(|r| r.country.clone())),
            city: unique_sorted(records.iter().map(|r| r.effective_city().to_string())),
            intensity_min: (1..=10).map(|n| n.to_string()).collect(),
            likelihood_min: (1..=5).map(|n| n.to_string()).collect(),
        }
    }

    pub fn get(&self, key: FilterKey) -> &[String] {
        match key {
            FilterKey::EndYear => &self.end_year,
            FilterKey::Topic => &self.topic,
            FilterKey::Sector => &self.sector,
            FilterKey::Region => &self.region,
            FilterKey::Pestle => &self.pestle,
            FilterKey::Source => &self.source,
            FilterKey::Swot => &self.swot,
            FilterKey::Country => &self.country,
            FilterKey::City => &self.city,
            FilterKey::IntensityMin => &self.intensity_min,
            FilterKey::LikelihoodMin => &self.likelihood_min,
        }
    }
}

fn unique_sorted(values: impl Iterator<Item = String>) -> Vec<String> {
    values
        .filter(|value| !value.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

//! Derived metrics over the filtered working set
//!
//! Every view is a pure function of the records slice. Grouping keeps
//! first-seen order and every sort is stable, so ties stay in first-seen
//! order and truncation drops the last-seen of the lowest groups.

use insight_common::stats::MeanAccumulator;
use insight_common::Record;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::swot::{derive_swot, SwotLabel};

pub const TOP_COUNTRIES: usize = 15;
pub const TOP_TOPICS: usize = 10;
pub const TOP_SECTORS: usize = 10;
pub const TOP_CATEGORIES: usize = 8;
pub const TOP_CITIES: usize = 30;
pub const TOP_SOURCES: usize = 12;
pub const SCATTER_SAMPLE_SIZE: usize = 250;

/// Shown where a label would be empty
pub const PLACEHOLDER: &str = "—";
/// Group key for records with no pestle / no city and no country
pub const UNKNOWN_LABEL: &str = "Unknown";

const CRITICAL_INTENSITY: f64 = 7.0;
const CRITICAL_LIKELIHOOD: f64 = 3.0;

// ========================================
// Output types
// ========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiSummary {
    pub total_records: usize,
    pub avg_intensity: f64,
    pub avg_likelihood: f64,
    pub avg_relevance: f64,
    pub top_region: String,
    pub unique_topics: usize,
    pub unique_countries: usize,
    /// Records meeting the critical predicate (intensity >= 7, likelihood >= 3)
    pub high_impact_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendDatum {
    pub year: i64,
    pub avg_intensity: f64,
    pub avg_relevance: f64,
    pub avg_likelihood: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionDatum {
    pub region: String,
    pub avg_intensity: f64,
    pub avg_likelihood: f64,
    pub avg_relevance: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryDatum {
    pub country: String,
    pub avg_likelihood: f64,
    pub avg_relevance: f64,
    pub avg_intensity: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicDatum {
    pub topic: String,
    pub value: usize,
}

/// SWOT tally of one pestle category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDatum {
    pub category: String,
    #[serde(rename = "Strength")]
    pub strength: usize,
    #[serde(rename = "Weakness")]
    pub weakness: usize,
    #[serde(rename = "Opportunity")]
    pub opportunity: usize,
    #[serde(rename = "Threat")]
    pub threat: usize,
}

impl CategoryDatum {
    fn new(category: String) -> Self {
        Self {
            category,
            strength: 0,
            weakness: 0,
            opportunity: 0,
            threat: 0,
        }
    }

    fn tally(&mut self, label: SwotLabel) {
        match label {
            SwotLabel::Strength => self.strength += 1,
            SwotLabel::Weakness => self.weakness += 1,
            SwotLabel::Opportunity => self.opportunity += 1,
            SwotLabel::Threat => self.threat += 1,
        }
    }

    /// Sort key of the matrix
    pub fn favourable(&self) -> usize {
        self.strength + self.opportunity
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityDatum {
    pub city: String,
    pub records: usize,
    pub avg_intensity: f64,
    pub avg_likelihood: f64,
    pub avg_relevance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorDatum {
    pub sector: String,
    pub avg_intensity: f64,
    pub avg_likelihood: f64,
    pub avg_relevance: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceDatum {
    pub source: String,
    pub count: usize,
    pub avg_intensity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterDatum {
    pub intensity: f64,
    pub likelihood: f64,
    pub relevance: f64,
    pub topic: String,
    pub country: String,
}

/// Every derived view of one working set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub summary: KpiSummary,
    pub trend: Vec<TrendDatum>,
    pub regions: Vec<RegionDatum>,
    pub countries: Vec<CountryDatum>,
    pub topics: Vec<TopicDatum>,
    pub categories: Vec<CategoryDatum>,
    pub cities: Vec<CityDatum>,
    pub sectors: Vec<SectorDatum>,
    pub sources: Vec<SourceDatum>,
    pub scatter: Vec<ScatterDatum>,
}

impl DashboardMetrics {
    pub fn compute(records: &[Record]) -> Self {
        Self {
            summary: summary(records),
            trend: trend_by_year(records),
            regions: by_region(records),
            countries: by_country(records),
            topics: by_topic(records),
            categories: category_matrix(records),
            cities: by_city(records),
            sectors: by_sector(records),
            sources: by_source(records),
            scatter: scatter_sample(records),
        }
    }
}

// ========================================
// Grouping
// ========================================

/// Key -> accumulator map that remembers first-seen key order
struct OrderedGroups<T> {
    index: HashMap<String, usize>,
    groups: Vec<(String, T)>,
}

impl<T> OrderedGroups<T> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            groups: Vec::new(),
        }
    }

    fn entry_with(&mut self, key: &str, init: impl FnOnce(&str) -> T) -> &mut T {
        let slot = match self.index.get(key) {
            Some(&slot) => slot,
            None => {
                self.groups.push((key.to_string(), init(key)));
                self.index.insert(key.to_string(), self.groups.len() - 1);
                self.groups.len() - 1
            }
        };
        &mut self.groups[slot].1
    }

    fn into_vec(self) -> Vec<(String, T)> {
        self.groups
    }
}

impl<T: Default> OrderedGroups<T> {
    fn entry(&mut self, key: &str) -> &mut T {
        self.entry_with(key, |_| T::default())
    }
}

/// Running means of the three scores for one group
#[derive(Debug, Clone, Copy, Default)]
struct ScoreMeans {
    intensity: MeanAccumulator,
    likelihood: MeanAccumulator,
    relevance: MeanAccumulator,
}

impl ScoreMeans {
    fn push(&mut self, record: &Record) {
        self.intensity.push(record.intensity);
        self.likelihood.push(record.likelihood);
        self.relevance.push(record.relevance);
    }

    fn count(&self) -> usize {
        self.intensity.count()
    }
}

/// Group by a non-empty string field, dropping records where it is empty
fn group_scores<'a>(
    records: &'a [Record],
    key: impl Fn(&'a Record) -> &'a str,
) -> Vec<(String, ScoreMeans)> {
    let mut groups = OrderedGroups::<ScoreMeans>::new();
    for record in records {
        let value = key(record);
        if !value.is_empty() {
            groups.entry(value).push(record);
        }
    }
    groups.into_vec()
}

fn by_count_desc<T>(items: &mut [T], count: impl Fn(&T) -> usize) {
    items.sort_by(|a, b| count(b).cmp(&count(a)));
}

fn by_value_desc<T>(items: &mut [T], value: impl Fn(&T) -> f64) {
    items.sort_by(|a, b| value(b).partial_cmp(&value(a)).unwrap_or(Ordering::Equal));
}

// ========================================
// Views
// ========================================

pub fn summary(records: &[Record]) -> KpiSummary {
    let mut scores = ScoreMeans::default();
    let mut region_counts = OrderedGroups::<usize>::new();
    let mut topics = HashSet::new();
    let mut countries = HashSet::new();
    let mut high_impact_count = 0;

    for record in records {
        scores.push(record);
        if !record.region.is_empty() {
            *region_counts.entry(&record.region) += 1;
        }
        if !record.topic.is_empty() {
            topics.insert(record.topic.as_str());
        }
        if !record.country.is_empty() {
            countries.insert(record.country.as_str());
        }
        if is_critical(record) {
            high_impact_count += 1;
        }
    }

    // Strictly greater keeps the first-seen region among ties
    let mut top: Option<(String, usize)> = None;
    for (region, count) in region_counts.into_vec() {
        if top.as_ref().map_or(true, |(_, best)| count > *best) {
            top = Some((region, count));
        }
    }

    KpiSummary {
        total_records: records.len(),
        avg_intensity: scores.intensity.rounded(),
        avg_likelihood: scores.likelihood.rounded(),
        avg_relevance: scores.relevance.rounded(),
        top_region: top.map_or_else(|| PLACEHOLDER.to_string(), |(region, _)| region),
        unique_topics: topics.len(),
        unique_countries: countries.len(),
        high_impact_count,
    }
}

pub fn is_critical(record: &Record) -> bool {
    record.intensity >= CRITICAL_INTENSITY && record.likelihood >= CRITICAL_LIKELIHOOD
}

/// Per-year means keyed by end_year, else start_year; records with neither
/// (or year 0) are left out
pub fn trend_by_year(records: &[Record]) -> Vec<TrendDatum> {
    let mut years: BTreeMap<i64, ScoreMeans> = BTreeMap::new();
    for record in records {
        match record.trend_year() {
            Some(year) if year != 0 => years.entry(year).or_default().push(record),
            _ => {}
        }
    }

    years
        .into_iter()
        .map(|(year, scores)| TrendDatum {
            year,
            avg_intensity: scores.intensity.rounded(),
            avg_relevance: scores.relevance.rounded(),
            avg_likelihood: scores.likelihood.rounded(),
            count: scores.count(),
        })
        .collect()
}

pub fn by_region(records: &[Record]) -> Vec<RegionDatum> {
    let mut regions: Vec<RegionDatum> = group_scores(records, |r| r.region.as_str())
        .into_iter()
        .map(|(region, scores)| RegionDatum {
            region,
            avg_intensity: scores.intensity.rounded(),
            avg_likelihood: scores.likelihood.rounded(),
            avg_relevance: scores.relevance.rounded(),
            count: scores.count(),
        })
        .collect();
    by_value_desc(&mut regions, |d| d.avg_intensity);
    regions
}

pub fn by_country(records: &[Record]) -> Vec<CountryDatum> {
    let mut countries: Vec<CountryDatum> = group_scores(records, |r| r.country.as_str())
        .into_iter()
        .map(|(country, scores)| CountryDatum {
            country,
            avg_likelihood: scores.likelihood.rounded(),
            avg_relevance: scores.relevance.rounded(),
            avg_intensity: scores.intensity.rounded(),
            count: scores.count(),
        })
        .collect();
    by_count_desc(&mut countries, |d| d.count);
    countries.truncate(TOP_COUNTRIES);
    countries
}

pub fn by_topic(records: &[Record]) -> Vec<TopicDatum> {
    let mut counts = OrderedGroups::<usize>::new();
    for record in records.iter().filter(|r| !r.topic.is_empty()) {
        *counts.entry(&record.topic) += 1;
    }

    let mut topics: Vec<TopicDatum> = counts
        .into_vec()
        .into_iter()
        .map(|(topic, value)| TopicDatum { topic, value })
        .collect();
    by_count_desc(&mut topics, |d| d.value);
    topics.truncate(TOP_TOPICS);
    topics
}

/// Pestle x SWOT tally, most Strength+Opportunity first
pub fn category_matrix(records: &[Record]) -> Vec<CategoryDatum> {
    let mut matrix = OrderedGroups::<CategoryDatum>::new();
    for record in records {
        let category = if record.pestle.is_empty() {
            UNKNOWN_LABEL
        } else {
            record.pestle.as_str()
        };
        matrix
            .entry_with(category, |key| CategoryDatum::new(key.to_string()))
            .tally(derive_swot(record));
    }

    let mut categories: Vec<CategoryDatum> =
        matrix.into_vec().into_iter().map(|(_, datum)| datum).collect();
    by_count_desc(&mut categories, CategoryDatum::favourable);
    categories.truncate(TOP_CATEGORIES);
    categories
}

/// City, else country, else "Unknown"
pub fn by_city(records: &[Record]) -> Vec<CityDatum> {
    let mut groups = OrderedGroups::<ScoreMeans>::new();
    for record in records {
        let city = match record.effective_city() {
            "" => UNKNOWN_LABEL,
            city => city,
        };
        groups.entry(city).push(record);
    }

    let mut cities: Vec<CityDatum> = groups
        .into_vec()
        .into_iter()
        .map(|(city, scores)| CityDatum {
            city,
            records: scores.count(),
            avg_intensity: scores.intensity.rounded(),
            avg_likelihood: scores.likelihood.rounded(),
            avg_relevance: scores.relevance.rounded(),
        })
        .collect();
    by_count_desc(&mut cities, |d| d.records);
    cities.truncate(TOP_CITIES);
    cities
}

pub fn by_sector(records: &[Record]) -> Vec<SectorDatum> {
    let mut sectors: Vec<SectorDatum> = group_scores(records, |r| r.sector.as_str())
        .into_iter()
        .map(|(sector, scores)| SectorDatum {
            sector,
            avg_intensity: scores.intensity.rounded(),
            avg_likelihood: scores.likelihood.rounded(),
            avg_relevance: scores.relevance.rounded(),
            count: scores.count(),
        })
        .collect();
    by_count_desc(&mut sectors, |d| d.count);
    sectors.truncate(TOP_SECTORS);
    sectors
}

pub fn by_source(records: &[Record]) -> Vec<SourceDatum> {
    let mut sources: Vec<SourceDatum> = group_scores(records, |r| r.source.as_str())
        .into_iter()
        .map(|(source, scores)| SourceDatum {
            source,
            count: scores.count(),
            avg_intensity: scores.intensity.rounded(),
        })
        .collect();
    by_count_desc(&mut sources, |d| d.count);
    sources.truncate(TOP_SOURCES);
    sources
}

/// First qualifying records in working-set order, not a random sample
pub fn scatter_sample(records: &[Record]) -> Vec<ScatterDatum> {
    records
        .iter()
        .filter(|r| r.intensity > 0.0 && r.likelihood > 0.0)
        .take(SCATTER_SAMPLE_SIZE)
        .map(|r| ScatterDatum {
            intensity: r.intensity,
            likelihood: r.likelihood,
            relevance: r.relevance,
            topic: or_placeholder(&r.topic),
            country: or_placeholder(&r.country),
        })
        .collect()
}

fn or_placeholder(value: &str) -> String {
    if value.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn country_record(id: usize, country: &str) -> Record {
        Record::new(format!("r{}", id))
            .with_country(country)
            .with_scores(5.0, 3.0, 2.0)
    }

    #[test]
    fn test_empty_working_set() {
        let metrics = DashboardMetrics::compute(&[]);

        assert_eq!(metrics.summary.total_records, 0);
        assert_eq!(metrics.summary.avg_intensity, 0.0);
        assert_eq!(metrics.summary.avg_likelihood, 0.0);
        assert_eq!(metrics.summary.avg_relevance, 0.0);
        assert_eq!(metrics.summary.top_region, "—");
        assert_eq!(metrics.summary.unique_topics, 0);
        assert_eq!(metrics.summary.high_impact_count, 0);
        assert!(metrics.trend.is_empty());
        assert!(metrics.regions.is_empty());
        assert!(metrics.countries.is_empty());
        assert!(metrics.topics.is_empty());
        assert!(metrics.categories.is_empty());
        assert!(metrics.cities.is_empty());
        assert!(metrics.sectors.is_empty());
        assert!(metrics.sources.is_empty());
        assert!(metrics.scatter.is_empty());
    }

    #[test]
    fn test_single_record_region() {
        let records = vec![Record::new("a").with_region("Asia").with_scores(5.0, 3.0, 1.0)];
        assert_eq!(
            by_region(&records),
            vec![RegionDatum {
                region: "Asia".to_string(),
                avg_intensity: 5.0,
                avg_likelihood: 3.0,
                avg_relevance: 1.0,
                count: 1,
            }]
        );
    }

    #[test]
    fn test_summary() {
        let records = vec![
            Record::new("a").with_region("Europe").with_topic("oil").with_country("France").with_scores(8.0, 3.0, 1.0),
            Record::new("b").with_region("Asia").with_topic("gas").with_country("India").with_scores(7.0, 2.0, 2.0),
            Record::new("c").with_region("Asia").with_topic("oil").with_scores(1.0, 4.0, 3.0),
            Record::new("d").with_region("Europe").with_scores(9.0, 5.0, 4.0),
        ];
        let summary = summary(&records);

        assert_eq!(summary.total_records, 4);
        assert_eq!(summary.avg_intensity, 6.25);
        assert_eq!(summary.avg_likelihood, 3.5);
        assert_eq!(summary.avg_relevance, 2.5);
        // Two-way tie; Europe was seen first
        assert_eq!(summary.top_region, "Europe");
        assert_eq!(summary.unique_topics, 2);
        assert_eq!(summary.unique_countries, 2);
        assert_eq!(summary.high_impact_count, 2);
    }

    #[test]
    fn test_trend_falls_back_to_start_year() {
        let records = vec![
            Record::new("a").with_years(Some(2016), Some(2020)).with_scores(4.0, 2.0, 2.0),
            Record::new("b").with_years(Some(2018), None).with_scores(6.0, 4.0, 3.0),
            Record::new("c").with_years(None, Some(2020)).with_scores(2.0, 1.0, 1.0),
            Record::new("d").with_scores(9.0, 9.0, 9.0),
        ];
        let trend = trend_by_year(&records);

        let years: Vec<i64> = trend.iter().map(|d| d.year).collect();
        assert_eq!(years, vec![2018, 2020]);
        assert_eq!(trend[1].count, 2);
        assert_eq!(trend[1].avg_intensity, 3.0);
        assert_eq!(trend[1].avg_relevance, 1.5);
        assert_eq!(trend[1].avg_likelihood, 1.5);
    }

    #[test]
    fn test_region_means_are_within_bounds() {
        let records = vec![
            Record::new("a").with_region("Asia").with_scores(1.0, 1.0, 1.0),
            Record::new("b").with_region("Asia").with_scores(2.0, 2.0, 2.0),
            Record::new("c").with_region("Asia").with_scores(2.0, 5.0, 3.0),
            Record::new("d").with_region("Africa").with_scores(9.0, 1.0, 1.0),
        ];
        let regions = by_region(&records);

        assert_eq!(regions[0].region, "Africa");
        let asia = &regions[1];
        assert_eq!(asia.count, 3);
        assert_eq!(asia.avg_intensity, 1.67);
        assert!(asia.avg_intensity >= 1.0 && asia.avg_intensity <= 2.0);
        assert!(asia.avg_likelihood >= 1.0 && asia.avg_likelihood <= 5.0);
    }

    #[test]
    fn test_fifteen_countries_are_kept() {
        let records: Vec<Record> = (0..15)
            .map(|i| country_record(i, &format!("Country{:02}", i)))
            .collect();
        assert_eq!(by_country(&records).len(), 15);
    }

    #[test]
    fn test_sixteenth_country_drops_last_seen_lowest() {
        let mut records: Vec<Record> = (0..16)
            .map(|i| country_record(i, &format!("Country{:02}", i)))
            .collect();
        // Country03 gets a second record and moves to the front
        records.push(country_record(99, "Country03"));

        let countries = by_country(&records);
        assert_eq!(countries.len(), 15);
        assert_eq!(countries[0].country, "Country03");
        assert_eq!(countries[0].count, 2);
        assert!(countries.iter().all(|c| c.country != "Country15"));
        assert!(countries.iter().any(|c| c.country == "Country14"));
    }

    #[test]
    fn test_topics_count_and_truncate() {
        let mut records = Vec::new();
        for i in 0..12 {
            records.push(Record::new(format!("t{}", i)).with_topic(format!("topic{}", i)));
        }
        records.push(Record::new("x").with_topic("topic5"));
        records.push(Record::new("y"));

        let topics = by_topic(&records);
        assert_eq!(topics.len(), 10);
        assert_eq!(topics[0], TopicDatum { topic: "topic5".to_string(), value: 2 });
        assert_eq!(topics[1].topic, "topic0");
    }

    #[test]
    fn test_category_matrix() {
        let records = vec![
            Record::new("a").with_pestle("Economic").with_scores(2.0, 1.0, 1.0),
            Record::new("b").with_scores(10.0, 4.0, 4.0),
            Record::new("c").with_scores(20.0, 0.0, 0.0),
            Record::new("d").with_pestle("Economic").with_scores(5.0, 2.0, 2.0),
        ];
        let matrix = category_matrix(&records);

        assert_eq!(matrix.len(), 2);
        assert_eq!(matrix[0].category, "Unknown");
        assert_eq!(matrix[0].strength, 1);
        assert_eq!(matrix[0].opportunity, 1);
        assert_eq!(matrix[1].category, "Economic");
        assert_eq!(matrix[1].threat, 1);
        assert_eq!(matrix[1].weakness, 1);

        let json = serde_json::to_value(&matrix[0]).unwrap();
        assert_eq!(json["Strength"], 1);
        assert_eq!(json["category"], "Unknown");
    }

    #[test]
    fn test_city_fallbacks() {
        let records = vec![
            Record::new("a").with_city("Cairo").with_country("Egypt"),
            Record::new("b").with_country("Egypt"),
            Record::new("c").with_country("Egypt"),
            Record::new("d"),
        ];
        let cities = by_city(&records);

        let names: Vec<&str> = cities.iter().map(|c| c.city.as_str()).collect();
        assert_eq!(names, vec!["Egypt", "Cairo", "Unknown"]);
        assert_eq!(cities[0].records, 2);
    }

    #[test]
    fn test_sector_and_source_drop_empty_keys() {
        let records = vec![
            Record::new("a").with_sector("Energy").with_source("EIA").with_scores(4.0, 1.0, 1.0),
            Record::new("b").with_sector("Energy").with_source("EIA").with_scores(6.0, 1.0, 1.0),
            Record::new("c").with_scores(9.0, 1.0, 1.0),
        ];

        let sectors = by_sector(&records);
        assert_eq!(sectors.len(), 1);
        assert_eq!(sectors[0].count, 2);
        assert_eq!(sectors[0].avg_intensity, 5.0);

        assert_eq!(
            by_source(&records),
            vec![SourceDatum {
                source: "EIA".to_string(),
                count: 2,
                avg_intensity: 5.0
            }]
        );
    }

    /// `count` records with distinct keys `key0`, `key1`, ... in order, plus one
    /// extra record for `key3` so that it outranks the rest
    fn keyed(count: usize, with_key: impl Fn(Record, String) -> Record) -> Vec<Record> {
        let mut records: Vec<Record> = (0..count)
            .map(|i| with_key(Record::new(format!("k{}", i)), format!("key{}", i)))
            .collect();
        records.push(with_key(
            Record::new("extra").with_scores(10.0, 10.0, 10.0),
            "key3".to_string(),
        ));
        records
    }

    /// At the cap everything survives; one over drops the last-seen lowest
    fn assert_cap<T>(
        cap: usize,
        view: impl Fn(&[Record]) -> Vec<T>,
        name: impl Fn(&T) -> &str,
        with_key: impl Fn(Record, String) -> Record + Copy,
    ) {
        let at_cap = view(keyed(cap, with_key).as_slice());
        assert_eq!(at_cap.len(), cap);
        assert_eq!(name(&at_cap[0]), "key3");

        let over = view(keyed(cap + 1, with_key).as_slice());
        let names: Vec<&str> = over.iter().map(&name).collect();
        assert_eq!(names.len(), cap);
        assert_eq!(names[0], "key3");
        assert_eq!(names[1], "key0");
        let last_kept = format!("key{}", cap - 1);
        let dropped = format!("key{}", cap);
        assert!(names.contains(&last_kept.as_str()));
        assert!(!names.contains(&dropped.as_str()));
    }

    #[test]
    fn test_sector_cap() {
        assert_cap(TOP_SECTORS, by_sector, |d| d.sector.as_str(), |r, key| r.with_sector(key));
    }

    #[test]
    fn test_source_cap() {
        assert_cap(TOP_SOURCES, by_source, |d| d.source.as_str(), |r, key| r.with_source(key));
    }

    #[test]
    fn test_city_cap() {
        assert_cap(TOP_CITIES, by_city, |d| d.city.as_str(), |r, key| r.with_city(key));
    }

    #[test]
    fn test_category_cap() {
        // Zero scores are all Threat; only the extra Strength record is favourable
        assert_cap(
            TOP_CATEGORIES,
            category_matrix,
            |d| d.category.as_str(),
            |r, key| r.with_pestle(key),
        );
    }

    #[test]
    fn test_scatter_is_a_prefix_sample() {
        let mut records = vec![Record::new("zero").with_scores(0.0, 3.0, 1.0)];
        records.extend((0..300).map(|i| {
            Record::new(format!("s{}", i))
                .with_topic(if i == 0 { "" } else { "oil" })
                .with_scores(1.0 + i as f64, 2.0, 1.0)
        }));

        let scatter = scatter_sample(&records);
        assert_eq!(scatter.len(), 250);
        assert_eq!(scatter[0].intensity, 1.0);
        assert_eq!(scatter[0].topic, "—");
        assert_eq!(scatter[0].country, "—");
        assert_eq!(scatter[249].intensity, 250.0);
    }

    #[test]
    fn test_compute_is_pure() {
        let records: Vec<Record> = (0..40)
            .map(|i| {
                Record::new(format!("p{}", i))
                    .with_region(if i % 3 == 0 { "Asia" } else { "Europe" })
                    .with_country(format!("C{}", i % 17))
                    .with_topic(format!("T{}", i % 11))
                    .with_years(None, Some(2015 + (i % 5) as i64))
                    .with_scores((i % 10) as f64, (i % 5) as f64, (i % 4) as f64)
            })
            .collect();

        let first = serde_json::to_string(&DashboardMetrics::compute(&records)).unwrap();
        let second = serde_json::to_string(&DashboardMetrics::compute(&records)).unwrap();
        assert_eq!(first, second);
    }
}

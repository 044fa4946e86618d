//! insight-dash - command-line dashboard over insight-server
//!
//! Loads the full record set and the server aggregates, applies the given
//! filters locally and prints the derived dashboard as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use insight_client::api::DEFAULT_API_URL;
use insight_client::filters::{FilterKey, FilterOptions, Filters};
use insight_client::loader::{fetch_all_records, load_analytics, AnalyticsBundle};
use insight_client::metrics::DashboardMetrics;
use insight_client::{ClientResult, DashboardApi, FilterState};
use insight_common::api::{IntensityByRegion, LikelihoodByCountry, RelevanceByYear};
use serde::Serialize;
use tracing::{info, warn};

/// Command-line arguments for insight-dash
#[derive(Parser, Debug)]
#[command(name = "insight-dash")]
#[command(about = "Print the analytics dashboard for a filter selection")]
#[command(version)]
struct Args {
    /// Base URL of insight-server
    #[arg(long, env = "INSIGHT_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Filter as key=value (repeatable), e.g. --filter region=Asia
    #[arg(short, long = "filter", value_parser = parse_filter)]
    filters: Vec<(FilterKey, String)>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

fn parse_filter(raw: &str) -> std::result::Result<(FilterKey, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    Ok((key.trim().parse()?, value.trim().to_string()))
}

/// Server aggregates as printed; failed ones are null with an error entry
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ServerAnalytics {
    intensity_by_region: Option<Vec<IntensityByRegion>>,
    likelihood_by_country: Option<Vec<LikelihoodByCountry>>,
    relevance_by_year: Option<Vec<RelevanceByYear>>,
    errors: Vec<String>,
}

impl ServerAnalytics {
    fn from_bundle(bundle: AnalyticsBundle) -> Self {
        let mut errors = Vec::new();
        Self {
            intensity_by_region: split(bundle.intensity_by_region, "intensity-by-region", &mut errors),
            likelihood_by_country: split(
                bundle.likelihood_by_country,
                "likelihood-by-country",
                &mut errors,
            ),
            relevance_by_year: split(bundle.relevance_by_year, "relevance-by-year", &mut errors),
            errors,
        }
    }
}

fn split<T>(result: ClientResult<T>, name: &str, errors: &mut Vec<String>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            errors.push(format!("{}: {}", name, e));
            None
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DashboardReport<'a> {
    /// User-visible banner when the record set could not be loaded
    error: Option<String>,
    filters: &'a Filters,
    active_filter_count: usize,
    total_loaded: usize,
    options: &'a FilterOptions,
    metrics: DashboardMetrics,
    analytics: ServerAnalytics,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the JSON report
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let api = DashboardApi::new(&args.api_url).context("Failed to build HTTP client")?;
    info!("Loading dashboard from {}", api.base_url());

    let mut filters = Filters::default();
    for (key, value) in args.filters {
        filters.set(key, value);
    }

    let mut state = FilterState::new();
    state.set_filters(filters);

    let ticket = state.begin_load();
    let (records, bundle) = tokio::join!(fetch_all_records(&api), load_analytics(&api));

    let banner = match records {
        Ok(records) => {
            state.finish_load(ticket, records);
            None
        }
        Err(e) => {
            let banner = if e.is_unreachable() {
                format!(
                    "Cannot reach backend at {}. Ensure the server is running.",
                    api.base_url()
                )
            } else {
                format!("Failed to load records: {}", e)
            };
            state.fail_load(ticket, banner.clone());
            Some(banner)
        }
    };

    let analytics = ServerAnalytics::from_bundle(bundle);
    for error in &analytics.errors {
        warn!("Aggregate unavailable: {}", error);
    }

    let report = DashboardReport {
        error: banner,
        filters: state.filters(),
        active_filter_count: state.active_filter_count(),
        total_loaded: state.all_records().len(),
        options: state.options(),
        metrics: state.metrics(),
        analytics,
    };

    let json = if args.pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
    .context("Failed to serialize report")?;
    println!("{}", json);

    Ok(())
}

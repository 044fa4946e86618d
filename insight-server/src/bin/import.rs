//! insight-import - bulk load a JSON dataset into the record store
//!
//! Clears the store and repopulates it from the dataset file. This is the
//! only writer of the store; the HTTP service never writes.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use insight_common::config::default_database_path;
use insight_server::{db, import};
use tracing::info;

/// Command-line arguments for insight-import
#[derive(Parser, Debug)]
#[command(name = "insight-import")]
#[command(about = "Replace the record store contents with a JSON dataset")]
#[command(version)]
struct Args {
    /// Dataset file (JSON array of records)
    #[arg(short, long, default_value = "jsondata.json", env = "INSIGHT_DATASET")]
    file: PathBuf,

    /// Path to the sqlite record store (created if missing)
    #[arg(short, long, env = "INSIGHT_DATABASE_PATH")]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let db_path = args.database.unwrap_or_else(default_database_path);

    let content = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read dataset {}", args.file.display()))?;
    let records = import::parse_dataset(&content).context("Failed to parse dataset")?;
    info!("Parsed {} records from {}", records.len(), args.file.display());

    let pool = db::init_store(&db_path).await?;
    let inserted = db::replace_all(&pool, &records)
        .await
        .context("Failed to replace store contents")?;
    info!("Cleared existing records and inserted {}", inserted);

    pool.close().await;
    info!("Import complete: {}", db_path.display());
    Ok(())
}

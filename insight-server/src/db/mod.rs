//! Record store access layer
//!
//! The store is a single sqlite table of analytics records. The HTTP service
//! opens it read-only; only the bulk import writes to it.

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use tracing::info;

pub mod aggregates;
pub mod records;

pub use records::{count_records, list_records, replace_all, RecordFilter, TextColumn, YearConstraint};

/// Connect to an existing store in read-only mode
pub async fn connect_readonly(db_path: &Path) -> Result<SqlitePool> {
    if !db_path.exists() {
        anyhow::bail!(
            "Record store not found: {}\nRun insight-import first to populate it.",
            db_path.display()
        );
    }

    let options = SqliteConnectOptions::new().filename(db_path).read_only(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await
        .context("Failed to connect to record store in read-only mode")?;

    // Fail at startup rather than on the first request when the file is not a record store
    sqlx::query("SELECT COUNT(*) FROM records")
        .fetch_one(&pool)
        .await
        .context("Record store has no records table")?;

    Ok(pool)
}

/// Open (creating if needed) a writable store and ensure the schema exists
pub async fn init_store(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .context("Failed to open record store")?;

    if newly_created {
        info!("Initialized new record store: {}", db_path.display());
    } else {
        info!("Opened existing record store: {}", db_path.display());
    }

    create_records_table(&pool).await?;

    Ok(pool)
}

async fn create_records_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS records (
            id TEXT PRIMARY KEY,
            end_year INTEGER,
            start_year INTEGER,
            impact INTEGER,
            intensity REAL NOT NULL DEFAULT 0,
            likelihood REAL NOT NULL DEFAULT 0,
            relevance REAL NOT NULL DEFAULT 0,
            sector TEXT NOT NULL DEFAULT '',
            topic TEXT NOT NULL DEFAULT '',
            region TEXT NOT NULL DEFAULT '',
            pestle TEXT NOT NULL DEFAULT '',
            source TEXT NOT NULL DEFAULT '',
            country TEXT NOT NULL DEFAULT '',
            city TEXT NOT NULL DEFAULT '',
            insight TEXT NOT NULL DEFAULT '',
            url TEXT NOT NULL DEFAULT '',
            title TEXT NOT NULL DEFAULT '',
            added TEXT NOT NULL DEFAULT '',
            published TEXT NOT NULL DEFAULT ''
        )
        "#,
    )
    .execute(pool)
    .await?;

    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_records_sector ON records(sector)",
        "CREATE INDEX IF NOT EXISTS idx_records_topic ON records(topic)",
        "CREATE INDEX IF NOT EXISTS idx_records_country ON records(country)",
        "CREATE INDEX IF NOT EXISTS idx_records_region ON records(region)",
        "CREATE INDEX IF NOT EXISTS idx_records_city ON records(city)",
        "CREATE INDEX IF NOT EXISTS idx_records_end_year ON records(end_year)",
        "CREATE INDEX IF NOT EXISTS idx_records_pestle_source ON records(pestle, source)",
    ];
    for sql in indexes {
        sqlx::query(sql).execute(pool).await?;
    }

    Ok(())
}

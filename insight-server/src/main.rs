//! insight-server - read-only analytics API over the record store
//!
//! Serves the filtered record listing, the three aggregate endpoints and a
//! health check. The store must already exist (see insight-import).

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use insight_common::config::{load_toml_config, ServerOverrides, ServerSettings};
use insight_common::SystemClock;
use insight_server::{build_router, db, AppState};
use tokio::signal;
use tracing::{error, info};

/// Command-line arguments for insight-server
#[derive(Parser, Debug)]
#[command(name = "insight-server")]
#[command(about = "Analytics API for the insight dashboard")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "INSIGHT_PORT")]
    port: Option<u16>,

    /// Path to the sqlite record store
    #[arg(short, long, env = "INSIGHT_DATABASE_PATH")]
    database: Option<PathBuf>,

    /// Comma-separated allowed origins ("*" or empty = any)
    #[arg(long, env = "INSIGHT_ALLOWED_ORIGINS", value_delimiter = ',')]
    allowed_origins: Option<Vec<String>>,

    /// Aggregate memo lifetime in seconds
    #[arg(long, env = "INSIGHT_CACHE_TTL_SECS")]
    cache_ttl_secs: Option<u64>,

    /// Largest page size a listing request may ask for
    #[arg(long, env = "INSIGHT_MAX_PAGE_SIZE")]
    max_page_size: Option<i64>,

    /// Config file (defaults to the platform config dir)
    #[arg(short, long, env = "INSIGHT_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .init();

    let args = Args::parse();

    info!(
        "Starting insight-server v{}",
        env!("CARGO_PKG_VERSION")
    );

    let file = load_toml_config(args.config.as_deref()).context("Failed to load config file")?;
    let settings = ServerSettings::resolve(
        ServerOverrides {
            database_path: args.database,
            port: args.port,
            allowed_origins: args.allowed_origins,
            cache_ttl_secs: args.cache_ttl_secs,
            max_page_size: args.max_page_size,
        },
        file,
    )
    .context("Invalid configuration")?;

    info!("Record store: {}", settings.database_path.display());

    // An unreachable store is fatal at startup
    let pool = match db::connect_readonly(&settings.database_path).await {
        Ok(pool) => {
            info!("✓ Connected to record store (read-only)");
            pool
        }
        Err(e) => {
            error!("Failed to connect to record store: {:#}", e);
            return Err(e);
        }
    };

    let total = db::count_records(&pool, &db::RecordFilter::default())
        .await
        .context("Failed to count records")?;
    info!("Record store holds {} records", total);

    let state = AppState::new(pool, &settings, Arc::new(SystemClock));
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("insight-server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}

//! mrd-server - Market Research Dashboard backend service
//!
//! Accepts research-pipeline webhook deliveries, assembles them into market
//! reports, and serves the report CRUD API on port 5840.

use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info};

use mrd_common::config;
use mrd_common::db::{init_database, SqliteReportStore};
use mrd_server::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting MRD server (mrd-server) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    // Root folder: CLI arg, then MRD_ROOT_FOLDER, then config file, then default
    let cli_root = std::env::args().nth(1);
    let root_folder = config::resolve_root_folder(cli_root.as_deref());
    config::ensure_root_folder(&root_folder)?;

    let db_path = config::database_path(&root_folder);
    info!("Database path: {}", db_path.display());

    let pool = match init_database(&db_path).await {
        Ok(pool) => {
            info!("✓ Connected to database");
            pool
        }
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return Err(e.into());
        }
    };

    // Create application state and router
    let state = AppState::new(Arc::new(SqliteReportStore::new(pool)));
    let app = build_router(state);

    // Start server on port 5840
    let listener = tokio::net::TcpListener::bind("127.0.0.1:5840").await?;
    info!("mrd-server listening on http://127.0.0.1:5840");
    info!("Health check: http://127.0.0.1:5840/health");

    axum::serve(listener, app).await?;

    Ok(())
}

//! Database initialization
//!
//! Creates the report database on first run and opens it with the pragmas
//! required for concurrent webhook deliveries (WAL, busy timeout).

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // rwc mode creates the database file when missing
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;

    // WAL allows concurrent readers while one webhook batch writes
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_market_reports_table(&pool).await?;

    Ok(pool)
}

/// Open an in-memory database with the full schema (test harnesses)
pub async fn init_memory_database() -> Result<SqlitePool> {
    // A single connection keeps every query on the same in-memory database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    create_market_reports_table(&pool).await?;

    Ok(pool)
}

/// Create the market_reports table (idempotent)
///
/// Section slots are JSON text columns; basic-info fields are plain columns
/// so industry/region listings can filter without unpacking JSON.
pub async fn create_market_reports_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS market_reports (
            id TEXT PRIMARY KEY,
            industry_name TEXT NOT NULL,
            company_type TEXT NOT NULL,
            report_scope TEXT NOT NULL,
            region TEXT,
            submitted_at TEXT NOT NULL,
            form_mode TEXT,
            executive_summary TEXT,
            market_introduction TEXT,
            market_dynamics TEXT,
            market_growth_trends TEXT,
            market_segmentation TEXT,
            competitor_analysis TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_market_reports_industry ON market_reports(industry_name)",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_market_reports_region ON market_reports(region)")
        .execute(pool)
        .await?;

    Ok(())
}

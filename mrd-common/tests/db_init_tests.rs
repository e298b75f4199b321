//! Unit tests for database initialization
//!
//! Covers automatic database creation on first run, reopening an existing
//! database, and schema idempotency.

use mrd_common::db::init_database;

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = tempfile::tempdir().expect("Should create temp dir");
    let db_path = dir.path().join("mrd.db");

    assert!(!db_path.exists());

    let result = init_database(&db_path).await;
    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());

    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing() {
    let dir = tempfile::tempdir().expect("Should create temp dir");
    let db_path = dir.path().join("mrd.db");

    let pool1 = init_database(&db_path).await.expect("First open should succeed");
    pool1.close().await;

    // Second open must succeed and keep existing data structures intact
    let pool2 = init_database(&db_path).await;
    assert!(pool2.is_ok(), "Failed to open existing database: {:?}", pool2.err());
}

#[tokio::test]
async fn test_creates_missing_parent_directory() {
    let dir = tempfile::tempdir().expect("Should create temp dir");
    let db_path = dir.path().join("nested").join("deeper").join("mrd.db");

    let result = init_database(&db_path).await;
    assert!(result.is_ok(), "Initialization failed: {:?}", result.err());
    assert!(db_path.exists());
}

#[tokio::test]
async fn test_market_reports_table_exists_after_init() {
    let dir = tempfile::tempdir().expect("Should create temp dir");
    let db_path = dir.path().join("mrd.db");

    let pool = init_database(&db_path).await.expect("Should initialize");

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'market_reports'",
    )
    .fetch_one(&pool)
    .await
    .expect("Should query sqlite_master");

    assert_eq!(count, 1);
}

//! # MRD Common Library
//!
//! Shared code for the Market Research Dashboard services including:
//! - Report entity and typed section payloads
//! - Report store trait and SQLite backend
//! - Database initialization
//! - Configuration loading
//! - Common error types

pub mod config;
pub mod db;
pub mod error;
pub mod report;

pub use error::{Error, Result};
pub use report::MarketReport;

//! HTTP API handlers

pub mod health;
pub mod reports;
pub mod webhook;

pub use health::{health_check, health_routes};
pub use reports::{
    create_report, delete_report, get_report, list_reports, reports_by_industry,
    reports_by_region, update_report,
};
pub use webhook::{market_research_webhook, n8n_webhook};

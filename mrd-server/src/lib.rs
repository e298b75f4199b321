//! mrd-server library - Market Research Dashboard backend
//!
//! Receives AI-pipeline webhook deliveries, assembles them into market
//! reports, and exposes a CRUD surface over the report store.

use axum::Router;
use std::sync::Arc;

use mrd_common::db::ReportStore;

pub mod api;
pub mod assembly;
pub mod error;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Report persistence backend
    pub store: Arc<dyn ReportStore>,
}

impl AppState {
    /// Create new application state
    pub fn new(store: Arc<dyn ReportStore>) -> Self {
        Self { store }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/api/webhook/market-research", post(api::market_research_webhook))
        .route("/api/webhook/n8n", post(api::n8n_webhook))
        .route("/api/reports", get(api::list_reports).post(api::create_report))
        .route(
            "/api/reports/:id",
            get(api::get_report)
                .patch(api::update_report)
                .delete(api::delete_report),
        )
        .route("/api/reports/industry/:industry", get(api::reports_by_industry))
        .route("/api/reports/region/:region", get(api::reports_by_region))
        .merge(api::health_routes())
        .with_state(state)
}

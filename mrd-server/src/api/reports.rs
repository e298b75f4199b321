//! Report CRUD surface
//!
//! Direct passthrough to the report store; single-entity operations with
//! standard 4xx semantics (no batch nuance here).

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::error::ApiError;
use crate::AppState;
use mrd_common::report::{MarketReport, NewMarketReport, ReportPatch};

/// Response for DELETE /api/reports/{id}
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}

/// GET /api/reports
pub async fn list_reports(
    State(state): State<AppState>,
) -> Result<Json<Vec<MarketReport>>, ApiError> {
    Ok(Json(state.store.list_all().await?))
}

/// GET /api/reports/{id}
pub async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MarketReport>, ApiError> {
    state
        .store
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Market report {id} not found")))
}

/// GET /api/reports/industry/{industry}
pub async fn reports_by_industry(
    State(state): State<AppState>,
    Path(industry): Path<String>,
) -> Result<Json<Vec<MarketReport>>, ApiError> {
    Ok(Json(state.store.list_by_industry(&industry).await?))
}

/// GET /api/reports/region/{region}
pub async fn reports_by_region(
    State(state): State<AppState>,
    Path(region): Path<String>,
) -> Result<Json<Vec<MarketReport>>, ApiError> {
    Ok(Json(state.store.list_by_region(&region).await?))
}

/// POST /api/reports
///
/// Validated create; 400 with details on schema mismatch, 201 on success.
pub async fn create_report(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<MarketReport>), ApiError> {
    let new: NewMarketReport = serde_json::from_value(body)
        .map_err(|e| ApiError::BadRequest(format!("invalid market report data: {e}")))?;

    let report = state.store.create(new).await?;
    Ok((StatusCode::CREATED, Json(report)))
}

/// PATCH /api/reports/{id}
///
/// Partial update; fields absent from the body are left untouched.
pub async fn update_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<Value>,
) -> Result<Json<MarketReport>, ApiError> {
    let patch: ReportPatch = serde_json::from_value(body)
        .map_err(|e| ApiError::BadRequest(format!("invalid market report update: {e}")))?;

    state
        .store
        .update(id, patch)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Market report {id} not found")))
}

/// DELETE /api/reports/{id}
pub async fn delete_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, ApiError> {
    if state.store.delete(id).await? {
        Ok(Json(DeleteResponse { success: true }))
    } else {
        Err(ApiError::NotFound(format!("Market report {id} not found")))
    }
}

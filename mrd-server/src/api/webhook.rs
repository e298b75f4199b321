//! Webhook intake endpoints
//!
//! `POST /api/webhook/market-research` is the incremental assembly path: the
//! research pipeline delivers a batch of section fragments and the assembler
//! merges them into one report.
//!
//! `POST /api/webhook/n8n` is the flat, non-incremental creation path: a
//! single fixed-key form payload that always produces exactly one report with
//! no section bodies.

use axum::{body::Bytes, extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::assembly::{normalize_batch, process_batch, FragmentOutcome};
use crate::error::ApiError;
use crate::AppState;
use mrd_common::report::NewMarketReport;

/// Batch response for the market-research webhook
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    pub success: bool,
    pub report_id: Option<Uuid>,
    pub outcomes: Vec<FragmentOutcome>,
}

/// Creation response for the n8n webhook
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct N8nResponse {
    pub success: bool,
    pub report_id: Uuid,
}

/// Fixed-key form payload delivered by the n8n automation
#[derive(Debug, Deserialize)]
pub struct N8nWebhookPayload {
    #[serde(rename = "Industry Name")]
    pub industry_name: String,
    #[serde(rename = "Your Company Type")]
    pub company_type: String,
    #[serde(rename = "Report Study Scope")]
    pub report_scope: String,
    #[serde(rename = "Region name (if Regional report)", default)]
    pub region: Option<String>,
    #[serde(rename = "submittedAt")]
    pub submitted_at: String,
    #[serde(rename = "formMode", default)]
    pub form_mode: Option<String>,
}

/// POST /api/webhook/market-research
///
/// Accepts a single fragment object or an ordered array of fragments.
/// Best-effort batch semantics: per-fragment failures are reported in the
/// outcome list without changing the 200 status; only a malformed founding
/// fragment fails the request (400), since no report exists to attach its
/// error to. An empty body processes zero fragments and is a no-op success.
pub async fn market_research_webhook(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<WebhookResponse>, ApiError> {
    let body = parse_optional_body(&body)?;
    let fragments = normalize_batch(body);
    info!(fragments = fragments.len(), "received market research delivery");

    let result = process_batch(state.store.as_ref(), &fragments)
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    Ok(Json(WebhookResponse {
        success: true,
        report_id: result.report_id,
        outcomes: result.outcomes,
    }))
}

/// POST /api/webhook/n8n
///
/// Single flat object (array bodies use their first element); creates one
/// report with empty section slots. Schema mismatch is a 400 with details.
pub async fn n8n_webhook(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<N8nResponse>, ApiError> {
    let body = parse_optional_body(&body)?
        .ok_or_else(|| ApiError::BadRequest("empty webhook body".to_string()))?;

    // The automation sometimes wraps the form payload in a one-element array
    let payload = match body {
        Value::Array(items) => items
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::BadRequest("empty webhook array".to_string()))?,
        other => other,
    };

    let payload: N8nWebhookPayload = serde_json::from_value(payload)
        .map_err(|e| ApiError::BadRequest(format!("invalid webhook data: {e}")))?;

    let submitted_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&payload.submitted_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            ApiError::BadRequest(format!(
                "invalid submittedAt '{}': {e}",
                payload.submitted_at
            ))
        })?;

    let report = state
        .store
        .create(NewMarketReport {
            industry_name: payload.industry_name,
            company_type: payload.company_type,
            report_scope: payload.report_scope,
            region: payload.region,
            submitted_at,
            form_mode: payload.form_mode,
            executive_summary: None,
            market_introduction: None,
            market_dynamics: None,
            market_growth_trends: None,
            market_segmentation: None,
            competitor_analysis: None,
        })
        .await?;

    info!(report_id = %report.id, "created report from n8n webhook");

    Ok(Json(N8nResponse {
        success: true,
        report_id: report.id,
    }))
}

/// Parse a request body that may legitimately be empty
fn parse_optional_body(body: &Bytes) -> Result<Option<Value>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    serde_json::from_slice(body.as_ref())
        .map(Some)
        .map_err(|e| ApiError::BadRequest(format!("malformed JSON body: {e}")))
}

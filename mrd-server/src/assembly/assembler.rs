//! Report assembler
//!
//! Stateful core of the assembly pipeline: walks a batch in delivery order,
//! creates a report from the founding fragment, and applies section updates
//! against the batch-local current report id.
//!
//! Failure policy is best-effort and partial-success-tolerant: a pipeline
//! that delivers six fragments must not lose five merged sections because the
//! sixth was malformed. Only a founding fragment that fails validation aborts
//! the whole batch, since nothing useful can be persisted without it.

use chrono::Utc;
use mrd_common::db::ReportStore;
use mrd_common::report::{
    ExecutiveSummary, NewMarketReport, ReportSection, DEFAULT_COMPANY_TYPE, DEFAULT_FORM_MODE,
    DEFAULT_INDUSTRY_NAME, DEFAULT_REGION, DEFAULT_REPORT_SCOPE,
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use super::classifier::{classify, FragmentKind};
use super::validate::{validate, BasicInfoOverrides, Fragment, ValidationError};

/// Batch-level failure: the founding fragment itself was malformed
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("founding fragment rejected: {0}")]
    FoundingFragmentInvalid(#[from] ValidationError),
}

/// Per-fragment processing outcome, reported back to the webhook caller
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FragmentOutcome {
    /// Fragment merged into the report
    Applied { section: &'static str },
    /// Fragment dropped without touching storage
    Skipped { reason: String },
    /// Fragment failed validation or persistence
    Rejected { reason: String },
}

/// Result of processing one webhook batch
#[derive(Debug)]
pub struct BatchResult {
    /// Id of the report created by this batch, if any
    pub report_id: Option<Uuid>,
    /// One outcome per fragment, in delivery order
    pub outcomes: Vec<FragmentOutcome>,
}

/// Process one normalized batch of fragments, in delivery order
///
/// The current report id is local to this call; it is set by the founding
/// fragment and targeted by every subsequent update fragment in the same
/// batch. Update fragments arriving before any founding fragment have no
/// target and are skipped.
pub async fn process_batch(
    store: &dyn ReportStore,
    fragments: &[Value],
) -> Result<BatchResult, BatchError> {
    let mut report_id: Option<Uuid> = None;
    let mut outcomes = Vec::with_capacity(fragments.len());

    for (index, raw) in fragments.iter().enumerate() {
        let kind = classify(raw);
        let outcome = match kind {
            FragmentKind::Unrecognized => {
                warn!(fragment = index, "dropping fragment matching no recognized kind");
                FragmentOutcome::Skipped {
                    reason: "fragment matched no recognized kind".to_string(),
                }
            }
            // Founding fragment: validation failure here fails the whole
            // request, since no report id exists to attach the error to
            FragmentKind::NewReport => {
                let fragment = validate(kind, raw)?;
                let Fragment::NewReport {
                    basic_info,
                    executive_summary,
                } = fragment
                else {
                    unreachable!("NewReport kind validates to NewReport fragment");
                };

                let new = founding_report(basic_info, executive_summary);
                match store.create(new).await {
                    Ok(report) => {
                        info!(report_id = %report.id, fragment = index, "created report");
                        report_id = Some(report.id);
                        FragmentOutcome::Applied {
                            section: ReportSection::ExecutiveSummary.field_name(),
                        }
                    }
                    Err(e) => {
                        warn!(fragment = index, error = %e, "failed to persist new report");
                        FragmentOutcome::Rejected {
                            reason: format!("storage error: {e}"),
                        }
                    }
                }
            }
            _ => apply_update(store, report_id, kind, raw, index).await,
        };

        outcomes.push(outcome);
    }

    Ok(BatchResult {
        report_id,
        outcomes,
    })
}

/// Validate and persist a single section update
async fn apply_update(
    store: &dyn ReportStore,
    report_id: Option<Uuid>,
    kind: FragmentKind,
    raw: &Value,
    index: usize,
) -> FragmentOutcome {
    let fragment = match validate(kind, raw) {
        Ok(fragment) => fragment,
        // Update validation failures skip this fragment only; prior merges
        // and sibling fragments are unaffected
        Err(e) => {
            warn!(fragment = index, error = %e, "rejecting malformed update fragment");
            return FragmentOutcome::Rejected {
                reason: e.to_string(),
            };
        }
    };

    let Some(id) = report_id else {
        warn!(
            fragment = index,
            kind = %kind,
            "skipping update fragment with no target report in this batch"
        );
        return FragmentOutcome::Skipped {
            reason: format!("no target report in batch for {kind} update"),
        };
    };

    let (section, body) = match section_body(&fragment) {
        Ok(pair) => pair,
        Err(e) => {
            return FragmentOutcome::Rejected {
                reason: format!("serialization error: {e}"),
            };
        }
    };

    match store.update_section(id, section, &body).await {
        Ok(Some(_)) => {
            info!(report_id = %id, fragment = index, section = %section, "applied section update");
            FragmentOutcome::Applied {
                section: section.field_name(),
            }
        }
        // Report vanished between fragments (concurrent delete)
        Ok(None) => {
            warn!(report_id = %id, fragment = index, "target report no longer exists");
            FragmentOutcome::Rejected {
                reason: format!("report {id} no longer exists"),
            }
        }
        Err(e) => {
            warn!(report_id = %id, fragment = index, error = %e, "section update failed");
            FragmentOutcome::Rejected {
                reason: format!("storage error: {e}"),
            }
        }
    }
}

/// Build the insert payload for a founding fragment, filling defaults for
/// absent basic-info fields
fn founding_report(
    basic_info: BasicInfoOverrides,
    executive_summary: ExecutiveSummary,
) -> NewMarketReport {
    NewMarketReport {
        industry_name: basic_info
            .industry_name
            .unwrap_or_else(|| DEFAULT_INDUSTRY_NAME.to_string()),
        company_type: basic_info
            .company_type
            .unwrap_or_else(|| DEFAULT_COMPANY_TYPE.to_string()),
        report_scope: basic_info
            .report_scope
            .unwrap_or_else(|| DEFAULT_REPORT_SCOPE.to_string()),
        region: Some(basic_info.region.unwrap_or_else(|| DEFAULT_REGION.to_string())),
        submitted_at: Utc::now(),
        form_mode: Some(
            basic_info
                .form_mode
                .unwrap_or_else(|| DEFAULT_FORM_MODE.to_string()),
        ),
        executive_summary: Some(executive_summary),
        market_introduction: None,
        market_dynamics: None,
        market_growth_trends: None,
        market_segmentation: None,
        competitor_analysis: None,
    }
}

/// Section slot and JSON body for a validated update fragment
fn section_body(fragment: &Fragment) -> serde_json::Result<(ReportSection, Value)> {
    match fragment {
        Fragment::UpdateIntroduction(payload) => Ok((
            ReportSection::MarketIntroduction,
            serde_json::to_value(payload)?,
        )),
        Fragment::UpdateDynamics(payload) => {
            Ok((ReportSection::MarketDynamics, serde_json::to_value(payload)?))
        }
        Fragment::UpdateGrowthTrends(payload) => Ok((
            ReportSection::MarketGrowthTrends,
            serde_json::to_value(payload)?,
        )),
        Fragment::UpdateSegmentation(payload) => Ok((
            ReportSection::MarketSegmentation,
            serde_json::to_value(payload)?,
        )),
        Fragment::UpdateCompetitors(payload) => Ok((
            ReportSection::CompetitorAnalysis,
            serde_json::to_value(payload)?,
        )),
        Fragment::NewReport { .. } => {
            unreachable!("founding fragments are handled by process_batch")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrd_common::db::{init_memory_database, SqliteReportStore};
    use serde_json::json;

    async fn store() -> SqliteReportStore {
        SqliteReportStore::new(init_memory_database().await.unwrap())
    }

    fn founding_fragment() -> Value {
        json!({
            "executiveSummary": {
                "marketAttractiveness": "High",
                "futureProjections": "Growing",
                "keyFindings": ["finding"],
            },
            "industryName": "Coffee Shops",
        })
    }

    fn dynamics_fragment() -> Value {
        json!({
            "marketDynamics": {
                "drivers": ["urbanization"],
                "restraints": [],
                "opportunities": [],
                "challenges": [],
            }
        })
    }

    #[tokio::test]
    async fn founding_fragment_creates_report_with_defaults() {
        let store = store().await;
        let result = process_batch(&store, &[founding_fragment()]).await.unwrap();

        let id = result.report_id.expect("report created");
        assert_eq!(result.outcomes.len(), 1);
        assert_eq!(
            result.outcomes[0],
            FragmentOutcome::Applied { section: "executiveSummary" }
        );

        let report = store.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(report.industry_name, "Coffee Shops");
        // Unset basic-info fields fall back to the fixed defaults
        assert_eq!(report.company_type, DEFAULT_COMPANY_TYPE);
        assert_eq!(report.report_scope, DEFAULT_REPORT_SCOPE);
        assert_eq!(report.region.as_deref(), Some(DEFAULT_REGION));
        assert_eq!(report.form_mode.as_deref(), Some(DEFAULT_FORM_MODE));
        assert!(report.executive_summary.is_some());
        assert!(report.market_dynamics.is_none());
    }

    #[tokio::test]
    async fn updates_attach_to_batch_local_report() {
        let store = store().await;
        let result = process_batch(&store, &[founding_fragment(), dynamics_fragment()])
            .await
            .unwrap();

        let id = result.report_id.unwrap();
        assert_eq!(
            result.outcomes[1],
            FragmentOutcome::Applied { section: "marketDynamics" }
        );

        let report = store.get_by_id(id).await.unwrap().unwrap();
        assert!(report.market_dynamics.is_some());
    }

    #[tokio::test]
    async fn update_without_target_is_skipped() {
        let store = store().await;
        let result = process_batch(&store, &[dynamics_fragment()]).await.unwrap();

        assert!(result.report_id.is_none());
        assert!(matches!(result.outcomes[0], FragmentOutcome::Skipped { .. }));
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_update_rejected_without_corrupting_batch() {
        let store = store().await;
        let malformed = json!({ "marketIntroduction": { "definition": 42 } });

        let result = process_batch(
            &store,
            &[founding_fragment(), malformed, dynamics_fragment()],
        )
        .await
        .unwrap();

        assert!(matches!(result.outcomes[1], FragmentOutcome::Rejected { .. }));
        assert!(matches!(result.outcomes[2], FragmentOutcome::Applied { .. }));

        let report = store
            .get_by_id(result.report_id.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert!(report.market_introduction.is_none());
        assert!(report.market_dynamics.is_some());
    }

    #[tokio::test]
    async fn malformed_founding_fragment_fails_batch() {
        let store = store().await;
        let malformed = json!({ "executiveSummary": { "marketAttractiveness": "High" } });

        let err = process_batch(&store, &[malformed, dynamics_fragment()]).await;
        assert!(err.is_err());
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn distinct_section_updates_commute() {
        let store = store().await;
        let intro = json!({
            "marketIntroduction": {
                "definition": "d",
                "scope": "s",
                "marketStructure": "m",
                "macroFactors": ["f"],
            }
        });

        let forward = process_batch(
            &store,
            &[founding_fragment(), intro.clone(), dynamics_fragment()],
        )
        .await
        .unwrap();
        let reversed = process_batch(
            &store,
            &[founding_fragment(), dynamics_fragment(), intro],
        )
        .await
        .unwrap();

        let a = store.get_by_id(forward.report_id.unwrap()).await.unwrap().unwrap();
        let b = store.get_by_id(reversed.report_id.unwrap()).await.unwrap().unwrap();
        assert_eq!(a.market_introduction, b.market_introduction);
        assert_eq!(a.market_dynamics, b.market_dynamics);
    }

    #[tokio::test]
    async fn reapplying_same_update_is_idempotent() {
        let store = store().await;
        let result = process_batch(
            &store,
            &[founding_fragment(), dynamics_fragment(), dynamics_fragment()],
        )
        .await
        .unwrap();

        assert!(matches!(result.outcomes[2], FragmentOutcome::Applied { .. }));
        let report = store
            .get_by_id(result.report_id.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(report.market_dynamics.unwrap().drivers, vec!["urbanization"]);
    }

    #[tokio::test]
    async fn update_after_concurrent_delete_is_rejected_and_batch_continues() {
        let store = store().await;

        // Founding fragment creates the report, then it vanishes before the
        // update lands
        let result = process_batch(&store, &[founding_fragment()]).await.unwrap();
        let id = result.report_id.unwrap();
        store.delete(id).await.unwrap();

        // Second batch: new report plus an update; simulate by deleting
        // mid-batch is not possible through the public API, so assert the
        // store-level contract instead
        let outcome = apply_update(&store, Some(id), FragmentKind::UpdateDynamics, &dynamics_fragment(), 0).await;
        assert!(matches!(outcome, FragmentOutcome::Rejected { .. }));
    }
}

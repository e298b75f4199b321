//! Fragment validation
//!
//! A classified fragment is only merged after its body deserializes into the
//! typed payload for its kind. The result is the `Fragment` union: every
//! variant carries data that already passed schema validation, so the
//! assembler never touches raw JSON.

use mrd_common::report::{
    Competitor, ExecutiveSummary, MarketDynamics, MarketGrowthTrends, MarketIntroduction,
    MarketSegmentation,
};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::classifier::FragmentKind;

/// Fragment whose body failed schema validation for its classified kind
#[derive(Debug, Error)]
#[error("invalid {marker} fragment: {detail}")]
pub struct ValidationError {
    /// Marker key of the classified kind
    pub marker: &'static str,
    /// Deserialization failure detail
    pub detail: String,
}

/// Basic-info fields a founding fragment may carry alongside its summary
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicInfoOverrides {
    #[serde(default)]
    pub industry_name: Option<String>,
    #[serde(default)]
    pub company_type: Option<String>,
    #[serde(default)]
    pub report_scope: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub form_mode: Option<String>,
}

/// A validated fragment, ready to merge
#[derive(Debug, Clone)]
pub enum Fragment {
    NewReport {
        basic_info: BasicInfoOverrides,
        executive_summary: ExecutiveSummary,
    },
    UpdateIntroduction(MarketIntroduction),
    UpdateDynamics(MarketDynamics),
    UpdateGrowthTrends(MarketGrowthTrends),
    UpdateSegmentation(MarketSegmentation),
    UpdateCompetitors(Vec<Competitor>),
}

fn parse<T: serde::de::DeserializeOwned>(
    marker: &'static str,
    value: Value,
) -> Result<T, ValidationError> {
    serde_json::from_value(value).map_err(|e| ValidationError {
        marker,
        detail: e.to_string(),
    })
}

fn marker_body(
    fragment: &Value,
    marker: &'static str,
) -> Result<Value, ValidationError> {
    fragment
        .get(marker)
        .cloned()
        .ok_or_else(|| ValidationError {
            marker,
            detail: "marker key missing".to_string(),
        })
}

/// Validate a classified fragment's body into its typed payload
///
/// `Unrecognized` fragments never reach validation; passing one is an error.
pub fn validate(kind: FragmentKind, fragment: &Value) -> Result<Fragment, ValidationError> {
    match kind {
        FragmentKind::NewReport => {
            let executive_summary =
                parse("executiveSummary", marker_body(fragment, "executiveSummary")?)?;
            let basic_info = parse("executiveSummary", fragment.clone())?;
            Ok(Fragment::NewReport {
                basic_info,
                executive_summary,
            })
        }
        FragmentKind::UpdateIntroduction => Ok(Fragment::UpdateIntroduction(parse(
            "marketIntroduction",
            marker_body(fragment, "marketIntroduction")?,
        )?)),
        FragmentKind::UpdateDynamics => Ok(Fragment::UpdateDynamics(parse(
            "marketDynamics",
            marker_body(fragment, "marketDynamics")?,
        )?)),
        FragmentKind::UpdateGrowthTrends => Ok(Fragment::UpdateGrowthTrends(parse(
            "marketGrowthTrends",
            marker_body(fragment, "marketGrowthTrends")?,
        )?)),
        FragmentKind::UpdateSegmentation => Ok(Fragment::UpdateSegmentation(parse(
            "marketSegmentation",
            marker_body(fragment, "marketSegmentation")?,
        )?)),
        FragmentKind::UpdateCompetitors => Ok(Fragment::UpdateCompetitors(parse(
            "competitor array",
            fragment.clone(),
        )?)),
        FragmentKind::Unrecognized => Err(ValidationError {
            marker: "unrecognized",
            detail: "fragment matched no recognized kind".to_string(),
        }),
    }
}

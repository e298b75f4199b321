//! Report entity and typed section payloads
//!
//! A `MarketReport` is assembled incrementally from webhook fragments: the
//! basic-info fields are fixed at creation, and each of the six section slots
//! is independently nullable and populated by exactly one fragment kind.
//!
//! Serde renames produce the upstream pipeline's camelCase field names, so a
//! section body read back from storage matches the delivered fragment
//! (modulo key ordering).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Placeholder industry name used when a founding fragment omits basic info
pub const DEFAULT_INDUSTRY_NAME: &str = "Unspecified Industry";
/// Default company type for founding fragments without basic info
pub const DEFAULT_COMPANY_TYPE: &str = "Individual";
/// Default report scope for founding fragments without basic info
pub const DEFAULT_REPORT_SCOPE: &str = "Locality Specific";
/// Placeholder region used when a founding fragment omits basic info
pub const DEFAULT_REGION: &str = "Unspecified";
/// Default form mode for founding fragments without basic info
pub const DEFAULT_FORM_MODE: &str = "production";

/// Executive summary section (founding fragment payload)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutiveSummary {
    pub market_attractiveness: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub historical_analysis: Option<String>,
    pub future_projections: String,
    pub key_findings: Vec<String>,
}

/// Market introduction section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketIntroduction {
    pub definition: String,
    pub scope: String,
    pub market_structure: String,
    pub macro_factors: Vec<String>,
}

/// Market dynamics section (drivers/restraints/opportunities/challenges)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketDynamics {
    pub drivers: Vec<String>,
    pub restraints: Vec<String>,
    pub opportunities: Vec<String>,
    pub challenges: Vec<String>,
}

/// SWOT quadrants, shared by growth trends and competitor entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwotAnalysis {
    pub strengths: String,
    pub weaknesses: String,
    pub opportunities: String,
    pub threats: String,
}

/// PESTEL factor analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PestelAnalysis {
    pub political: String,
    pub economic: String,
    pub social: String,
    pub technological: String,
    pub environmental: String,
    pub legal: String,
}

/// Porter's five forces analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PorterAnalysis {
    pub competitive_rivalry: String,
    pub supplier_power: String,
    pub buyer_power: String,
    pub threat_of_substitution: String,
    pub threat_of_new_entrants: String,
}

/// Growth trends section: SWOT + PESTEL + Porter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketGrowthTrends {
    pub swot_analysis: SwotAnalysis,
    pub pestel_analysis: PestelAnalysis,
    pub porter_analysis: PorterAnalysis,
}

/// Segmentation section: labelled breakdowns plus market-size figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSegmentation {
    pub by_product_type: BTreeMap<String, String>,
    pub by_application: BTreeMap<String, String>,
    pub by_region: BTreeMap<String, String>,
    pub market_size: BTreeMap<String, f64>,
}

/// One competitor entry; the competitor slot holds a list of these
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    pub name: String,
    pub overview: String,
    pub products: Vec<String>,
    pub financials: String,
    pub swot: SwotAnalysis,
    pub strategies: Vec<String>,
}

/// The six section slots of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportSection {
    ExecutiveSummary,
    MarketIntroduction,
    MarketDynamics,
    MarketGrowthTrends,
    MarketSegmentation,
    CompetitorAnalysis,
}

impl ReportSection {
    /// Database column holding this slot
    pub fn column(&self) -> &'static str {
        match self {
            ReportSection::ExecutiveSummary => "executive_summary",
            ReportSection::MarketIntroduction => "market_introduction",
            ReportSection::MarketDynamics => "market_dynamics",
            ReportSection::MarketGrowthTrends => "market_growth_trends",
            ReportSection::MarketSegmentation => "market_segmentation",
            ReportSection::CompetitorAnalysis => "competitor_analysis",
        }
    }

    /// JSON field name delivered by the pipeline and returned by the API
    pub fn field_name(&self) -> &'static str {
        match self {
            ReportSection::ExecutiveSummary => "executiveSummary",
            ReportSection::MarketIntroduction => "marketIntroduction",
            ReportSection::MarketDynamics => "marketDynamics",
            ReportSection::MarketGrowthTrends => "marketGrowthTrends",
            ReportSection::MarketSegmentation => "marketSegmentation",
            ReportSection::CompetitorAnalysis => "competitorAnalysis",
        }
    }
}

impl std::fmt::Display for ReportSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.field_name())
    }
}

/// Fully assembled (or partially assembled) market report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketReport {
    pub id: Uuid,
    pub industry_name: String,
    pub company_type: String,
    pub report_scope: String,
    pub region: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub form_mode: Option<String>,
    pub executive_summary: Option<ExecutiveSummary>,
    pub market_introduction: Option<MarketIntroduction>,
    pub market_dynamics: Option<MarketDynamics>,
    pub market_growth_trends: Option<MarketGrowthTrends>,
    pub market_segmentation: Option<MarketSegmentation>,
    pub competitor_analysis: Option<Vec<Competitor>>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a new report; id and created_at are generated at create
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMarketReport {
    pub industry_name: String,
    pub company_type: String,
    pub report_scope: String,
    #[serde(default)]
    pub region: Option<String>,
    pub submitted_at: DateTime<Utc>,
    #[serde(default)]
    pub form_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executive_summary: Option<ExecutiveSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_introduction: Option<MarketIntroduction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_dynamics: Option<MarketDynamics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_growth_trends: Option<MarketGrowthTrends>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_segmentation: Option<MarketSegmentation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competitor_analysis: Option<Vec<Competitor>>,
}

/// Partial update for the CRUD surface; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPatch {
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
    #[serde(default)]
    pub executive_summary: Option<ExecutiveSummary>,
    #[serde(default)]
    pub market_introduction: Option<MarketIntroduction>,
    #[serde(default)]
    pub market_dynamics: Option<MarketDynamics>,
    #[serde(default)]
    pub market_growth_trends: Option<MarketGrowthTrends>,
    #[serde(default)]
    pub market_segmentation: Option<MarketSegmentation>,
    #[serde(default)]
    pub competitor_analysis: Option<Vec<Competitor>>,
}

impl ReportPatch {
    /// True when the patch carries no changes at all
    pub fn is_empty(&self) -> bool {
        self.industry_name.is_none()
            && self.company_type.is_none()
            && self.report_scope.is_none()
            && self.region.is_none()
            && self.form_mode.is_none()
            && self.executive_summary.is_none()
            && self.market_introduction.is_none()
            && self.market_dynamics.is_none()
            && self.market_growth_trends.is_none()
            && self.market_segmentation.is_none()
            && self.competitor_analysis.is_none()
    }
}

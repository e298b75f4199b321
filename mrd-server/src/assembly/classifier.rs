//! Fragment classification
//!
//! The upstream pipeline emits one concern per message, identified only by
//! which top-level key happens to be present. Classification turns that
//! duck-typed dispatch into a closed tagged union with explicit precedence:
//! marker keys are checked in a fixed order, first match wins, so the rare
//! fragment carrying two markers resolves deterministically.

use serde_json::Value;

/// The closed set of fragment kinds a webhook delivery can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    /// Founding fragment: executive summary plus optional basic-info overrides
    NewReport,
    UpdateIntroduction,
    UpdateDynamics,
    UpdateGrowthTrends,
    UpdateSegmentation,
    /// Array-shaped fragment whose first element carries a `name` field
    UpdateCompetitors,
    /// No marker matched; dropped without aborting the batch
    Unrecognized,
}

impl FragmentKind {
    /// Marker key (or shape) that identifies this kind, for logging
    pub fn marker(&self) -> &'static str {
        match self {
            FragmentKind::NewReport => "executiveSummary",
            FragmentKind::UpdateIntroduction => "marketIntroduction",
            FragmentKind::UpdateDynamics => "marketDynamics",
            FragmentKind::UpdateGrowthTrends => "marketGrowthTrends",
            FragmentKind::UpdateSegmentation => "marketSegmentation",
            FragmentKind::UpdateCompetitors => "competitor array",
            FragmentKind::Unrecognized => "unrecognized",
        }
    }
}

impl std::fmt::Display for FragmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.marker())
    }
}

/// Tag a fragment with exactly one kind
///
/// Precedence when a fragment could match multiple markers:
/// executiveSummary, marketIntroduction, marketDynamics, marketGrowthTrends,
/// marketSegmentation, then the competitor-array shape.
pub fn classify(fragment: &Value) -> FragmentKind {
    if let Some(obj) = fragment.as_object() {
        if obj.contains_key("executiveSummary") {
            return FragmentKind::NewReport;
        }
        if obj.contains_key("marketIntroduction") {
            return FragmentKind::UpdateIntroduction;
        }
        if obj.contains_key("marketDynamics") {
            return FragmentKind::UpdateDynamics;
        }
        if obj.contains_key("marketGrowthTrends") {
            return FragmentKind::UpdateGrowthTrends;
        }
        if obj.contains_key("marketSegmentation") {
            return FragmentKind::UpdateSegmentation;
        }
        return FragmentKind::Unrecognized;
    }

    if let Some(array) = fragment.as_array() {
        let first_has_name = array
            .first()
            .and_then(Value::as_object)
            .is_some_and(|o| o.contains_key("name"));
        if first_has_name {
            return FragmentKind::UpdateCompetitors;
        }
    }

    FragmentKind::Unrecognized
}

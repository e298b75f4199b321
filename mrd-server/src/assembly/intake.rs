//! Intake normalization
//!
//! A webhook body is either a single fragment object or an ordered array of
//! fragments. One shape is ambiguous: a competitor-list fragment is itself a
//! JSON array, so an array body whose first element carries a `name` key is
//! one fragment, not a batch.

use serde_json::Value;

use super::classifier::{classify, FragmentKind};

/// Normalize a webhook body into an ordered fragment sequence
///
/// `None` (empty body) yields zero fragments, which the caller reports as a
/// processed-nothing success rather than an error.
pub fn normalize_batch(body: Option<Value>) -> Vec<Value> {
    let Some(body) = body else {
        return Vec::new();
    };

    match body {
        // A competitor array is a single fragment despite being array-shaped
        Value::Array(_) if classify(&body) == FragmentKind::UpdateCompetitors => vec![body],
        Value::Array(fragments) => fragments,
        Value::Null => Vec::new(),
        single => vec![single],
    }
}

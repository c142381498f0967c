// src/report.rs
// =============================================================================
// Result types and the contract builder.
//
// Every check produces exactly one CheckResult. The contract builder
// flattens the list into the externally published shape:
//
//   { checkId: { ...evidence, status, recommendation } }
//
// keyed by stable check identifier, with no extra business logic.
// BTreeMap keeps the serialized output deterministic, so byte-identical
// input markup produces byte-identical JSON.
// =============================================================================

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::fetcher::FetchedPage;
use crate::score::Score;

// The three-way outcome of a single check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// The property is in good shape
    Pass,
    /// The property works but should be improved
    Warn,
    /// The property is broken or missing
    Fail,
}

/// Check-specific facts supporting the status.
/// Shapes differ per check, so this is a plain JSON object.
pub type Evidence = serde_json::Map<String, Value>;

// One evaluated rule: identifier, human label, outcome, supporting facts,
// remediation advice, and the weight it carries in the score.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    /// Stable identifier, unique across the registry, key into the weight table
    pub id: &'static str,
    /// Human-readable name of the rule
    pub label: &'static str,
    pub status: Status,
    pub evidence: Evidence,
    pub recommendation: String,
    /// Filled in by the runner from the weight table
    pub weight: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpInfo {
    /// Terminal HTTP status code of the fetch
    pub status: u16,
    /// How many redirect hops were followed to reach the final URL
    pub redirects: usize,
}

// The complete analysis result returned to the caller. Created once per
// analysis, serialized, and discarded - the engine persists nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnPageAnalysisResult {
    /// The URL the caller asked about
    pub url: String,
    /// Where the page actually lives after redirects
    pub final_url: String,
    pub http: HttpInfo,
    /// Check id -> evidence merged with status and recommendation
    pub on_page: BTreeMap<String, Value>,
    pub score: Score,
    /// Ruleset revision; callers may cache keyed by (url, version)
    pub version: String,
}

// Flattens the check list into the published nested object.
//
// Each entry is the check's evidence with `status` and `recommendation`
// merged in. Evidence keys never collide with those two names because
// no check emits them.
pub fn build_on_page(results: &[CheckResult]) -> BTreeMap<String, Value> {
    let mut on_page = BTreeMap::new();

    for result in results {
        let mut entry = result.evidence.clone();
        entry.insert("status".to_string(), json!(result.status));
        entry.insert(
            "recommendation".to_string(),
            json!(result.recommendation),
        );
        on_page.insert(result.id.to_string(), Value::Object(entry));
    }

    on_page
}

/// Assembles the full result object from the fetch metadata, the evaluated
/// checks, and the computed score.
pub fn build_result(
    page: &FetchedPage,
    results: &[CheckResult],
    score: Score,
) -> OnPageAnalysisResult {
    OnPageAnalysisResult {
        url: page.requested_url.clone(),
        final_url: page.final_url.clone(),
        http: HttpInfo {
            status: page.status,
            redirects: page.redirects,
        },
        on_page: build_on_page(results),
        score,
        version: crate::config::RULESET_VERSION.to_string(),
    }
}

// src/score.rs
// =============================================================================
// The weight table and the score aggregator.
//
// Scoring rule:
//   score = round(100 * gained / total_weight)
// where each check contributes its full weight on pass, 60% on warn,
// and nothing on fail. The denominator is the fixed sum of ALL weights
// in the table, independent of which checks actually ran, so the score
// is monotonic in status improvements and stable for identical inputs.
//
// The table is an explicit value handed to the aggregator rather than a
// module-level singleton, so versioned rulesets can coexist (tests use
// small custom tables).
// =============================================================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::checks::ids;
use crate::report::{CheckResult, Status};

/// Fraction of the weight a warn still earns.
const WARN_CREDIT: f64 = 0.6;

// Static map of check id -> point value. Built once, never mutated.
#[derive(Debug, Clone)]
pub struct WeightTable {
    weights: BTreeMap<&'static str, u32>,
}

impl WeightTable {
    /// The standard ruleset. Weights sum to 100.
    pub fn standard() -> Self {
        let weights = BTreeMap::from([
            (ids::TITLE, 10),
            (ids::META_DESCRIPTION, 10),
            (ids::META_ROBOTS, 10),
            (ids::CANONICAL, 8),
            (ids::H1, 8),
            (ids::HEADINGS, 6),
            (ids::OPEN_GRAPH, 6),
            (ids::TWITTER, 4),
            (ids::IMAGES, 8),
            (ids::LINKS, 10),
            (ids::HREFLANG, 4),
            (ids::STRUCTURED_DATA, 8),
            (ids::FAVICON, 2),
            (ids::LANGUAGE, 3),
            (ids::CHARSET, 3),
        ]);
        WeightTable { weights }
    }

    /// Builds a custom table. Intended for tests and versioned rulesets.
    pub fn from_entries(entries: &[(&'static str, u32)]) -> Self {
        WeightTable {
            weights: entries.iter().copied().collect(),
        }
    }

    pub fn weight_of(&self, id: &str) -> u32 {
        self.weights.get(id).copied().unwrap_or(0)
    }

    /// The scoring denominator: sum of every weight in the table.
    pub fn total(&self) -> u32 {
        self.weights.values().sum()
    }

    /// Owned copy for embedding in the serialized result.
    pub fn as_map(&self) -> BTreeMap<String, u32> {
        self.weights
            .iter()
            .map(|(id, w)| (id.to_string(), *w))
            .collect()
    }
}

// The score block of the published result: the 0-100 value plus the
// weight table it was computed against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub value: u8,
    pub weights: BTreeMap<String, u32>,
}

// Combines all check results into the single 0-100 value.
//
// Checks whose id is not in the table contribute nothing in either
// direction; the denominator is always the full table sum.
pub fn compute_score(results: &[CheckResult], table: &WeightTable) -> Score {
    let total = table.total();

    let gained: f64 = results
        .iter()
        .map(|result| {
            let weight = f64::from(table.weight_of(result.id));
            match result.status {
                Status::Pass => weight,
                Status::Warn => weight * WARN_CREDIT,
                Status::Fail => 0.0,
            }
        })
        .sum();

    let value = if total == 0 {
        0
    } else {
        (100.0 * gained / f64::from(total)).round() as u8
    };

    Score {
        value,
        weights: table.as_map(),
    }
}

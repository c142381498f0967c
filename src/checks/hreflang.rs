// src/checks/hreflang.rs
// =============================================================================
// Hreflang annotation check.
//
//   pass  every entry is x-default or BCP-47-shaped, no conflicts
//   warn  invalid language codes present (but no conflicts)
//   fail  one language code maps to two different URLs
//
// BCP-47 shape accepted here: a 2-3 letter primary subtag, optionally
// followed by a 4-letter script subtag and/or a region subtag (2 letters
// or 3 digits). That covers what hreflang actually allows without
// dragging in a full language-tag parser.
// =============================================================================

use serde_json::json;
use std::collections::BTreeMap;

use super::{ids, Check};
use crate::context::DocumentContext;
use crate::report::{CheckResult, Evidence, Status};

pub fn evaluate(ctx: &DocumentContext) -> anyhow::Result<CheckResult> {
    // (lang, href) pairs from <link rel="alternate" hreflang="..">
    let entries: Vec<(String, String)> = ctx
        .select_all("link")
        .into_iter()
        .filter(|el| {
            el.value()
                .attr("rel")
                .map(|rel| rel.trim().eq_ignore_ascii_case("alternate"))
                .unwrap_or(false)
        })
        .filter_map(|el| {
            let lang = el.value().attr("hreflang")?.trim().to_string();
            let href = el.value().attr("href")?.trim().to_string();
            if lang.is_empty() || href.is_empty() {
                None
            } else {
                Some((lang, href))
            }
        })
        .collect();

    let invalid: Vec<String> = entries
        .iter()
        .filter(|(lang, _)| !is_valid_hreflang(lang))
        .map(|(lang, _)| lang.clone())
        .collect();

    // lang (lowercased) -> distinct URLs it maps to
    let mut targets: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (lang, href) in &entries {
        let urls = targets.entry(lang.to_ascii_lowercase()).or_default();
        if !urls.contains(href) {
            urls.push(href.clone());
        }
    }
    let conflicts: Vec<String> = targets
        .iter()
        .filter(|(_, urls)| urls.len() > 1)
        .map(|(lang, _)| lang.clone())
        .collect();

    let mut evidence = Evidence::new();
    evidence.insert("entries".to_string(), json!(entries.len()));
    evidence.insert("invalid".to_string(), json!(invalid));
    evidence.insert("conflicts".to_string(), json!(conflicts));

    let (status, recommendation) = if !conflicts.is_empty() {
        (
            Status::Fail,
            format!(
                "These languages map to more than one URL: {}. Each language needs exactly one alternate.",
                conflicts.join(", ")
            ),
        )
    } else if !invalid.is_empty() {
        (
            Status::Warn,
            format!(
                "Invalid hreflang codes: {}. Use BCP-47 codes like \"en\", \"en-US\" or \"x-default\".",
                invalid.join(", ")
            ),
        )
    } else {
        (
            Status::Pass,
            "Hreflang annotations are consistent.".to_string(),
        )
    };

    Ok(CheckResult {
        id: ids::HREFLANG,
        label: Check::Hreflang.label(),
        status,
        evidence,
        recommendation,
        weight: 0,
    })
}

// Shape check only; it does not consult a language registry.
fn is_valid_hreflang(code: &str) -> bool {
    if code.eq_ignore_ascii_case("x-default") {
        return true;
    }

    let mut parts = code.split('-');

    let primary = parts.next().unwrap_or("");
    if !(2..=3).contains(&primary.len()) || !primary.chars().all(|c| c.is_ascii_alphabetic()) {
        return false;
    }

    for part in parts {
        let is_script = part.len() == 4 && part.chars().all(|c| c.is_ascii_alphabetic());
        let is_region_alpha = part.len() == 2 && part.chars().all(|c| c.is_ascii_alphabetic());
        let is_region_digit = part.len() == 3 && part.chars().all(|c| c.is_ascii_digit());
        if !(is_script || is_region_alpha || is_region_digit) {
            return false;
        }
    }

    true
}

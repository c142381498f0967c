// src/checks/mod.rs
// =============================================================================
// The check registry.
//
// Every rule is one variant of the closed Check enum, so the set of checks
// is known at compile time, each check's evidence shape stays precise, and
// there is no run-time reflection. Check::registry() returns the fixed,
// explicit list the engine runs.
//
// Checks are independent: none mutates the DocumentContext (they only hold
// a shared borrow) and none depends on another's result. run_all polls
// them all concurrently and converts any check-local failure - an Err or
// even a panic - into a `fail` result with an error evidence entry, so a
// single misbehaving rule can never abort the others or the aggregation.
//
// Submodules, one per area:
// - title:      title tag length banding
// - meta:       meta description, robots directives, charset declaration
// - canonical:  canonical URL self-reference
// - headings:   H1 count and heading-level gaps
// - social:     Open Graph and Twitter Card tags
// - links:      anchor health with sampled probes and mixed content
// - images:     alt coverage with sampled existence/size probes
// - hreflang:   hreflang validity and conflicts
// - structured: JSON-LD structured data
// - misc:       favicon and root language attribute
// =============================================================================

mod canonical;
mod headings;
mod hreflang;
mod images;
mod links;
mod meta;
mod misc;
mod social;
mod structured;
mod title;

use futures::future::join_all;
use futures::FutureExt;
use serde_json::json;
use std::panic::AssertUnwindSafe;

use crate::context::DocumentContext;
use crate::probe::ProbeClient;
use crate::report::{CheckResult, Evidence, Status};
use crate::score::WeightTable;

/// Stable check identifiers. These are the keys of the weight table and
/// of the published onPage object; they never change meaning.
pub mod ids {
    pub const TITLE: &str = "title";
    pub const META_DESCRIPTION: &str = "metaDescription";
    pub const META_ROBOTS: &str = "metaRobots";
    pub const CANONICAL: &str = "canonical";
    pub const H1: &str = "h1";
    pub const HEADINGS: &str = "headings";
    pub const OPEN_GRAPH: &str = "openGraph";
    pub const TWITTER: &str = "twitter";
    pub const IMAGES: &str = "images";
    pub const LINKS: &str = "links";
    pub const HREFLANG: &str = "hreflang";
    pub const STRUCTURED_DATA: &str = "structuredData";
    pub const FAVICON: &str = "favicon";
    pub const LANGUAGE: &str = "language";
    pub const CHARSET: &str = "charset";
}

// One variant per rule. The enum is the registry's vocabulary; the
// explicit list in registry() is its order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    Title,
    MetaDescription,
    MetaRobots,
    Canonical,
    H1,
    Headings,
    OpenGraph,
    Twitter,
    Images,
    Links,
    Hreflang,
    StructuredData,
    Favicon,
    Language,
    Charset,
}

impl Check {
    /// The fixed, ordered list of all registered checks.
    pub fn registry() -> Vec<Check> {
        vec![
            Check::Title,
            Check::MetaDescription,
            Check::MetaRobots,
            Check::Canonical,
            Check::H1,
            Check::Headings,
            Check::OpenGraph,
            Check::Twitter,
            Check::Images,
            Check::Links,
            Check::Hreflang,
            Check::StructuredData,
            Check::Favicon,
            Check::Language,
            Check::Charset,
        ]
    }

    pub fn id(&self) -> &'static str {
        match self {
            Check::Title => ids::TITLE,
            Check::MetaDescription => ids::META_DESCRIPTION,
            Check::MetaRobots => ids::META_ROBOTS,
            Check::Canonical => ids::CANONICAL,
            Check::H1 => ids::H1,
            Check::Headings => ids::HEADINGS,
            Check::OpenGraph => ids::OPEN_GRAPH,
            Check::Twitter => ids::TWITTER,
            Check::Images => ids::IMAGES,
            Check::Links => ids::LINKS,
            Check::Hreflang => ids::HREFLANG,
            Check::StructuredData => ids::STRUCTURED_DATA,
            Check::Favicon => ids::FAVICON,
            Check::Language => ids::LANGUAGE,
            Check::Charset => ids::CHARSET,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Check::Title => "Title Tag",
            Check::MetaDescription => "Meta Description",
            Check::MetaRobots => "Robots Directives",
            Check::Canonical => "Canonical URL",
            Check::H1 => "H1 Heading",
            Check::Headings => "Heading Structure",
            Check::OpenGraph => "Open Graph Tags",
            Check::Twitter => "Twitter Card",
            Check::Images => "Image Health",
            Check::Links => "Link Health",
            Check::Hreflang => "Hreflang Annotations",
            Check::StructuredData => "Structured Data",
            Check::Favicon => "Favicon",
            Check::Language => "Page Language",
            Check::Charset => "Character Encoding",
        }
    }

    // Runs this one check. Only the links and images checks ever await
    // anything (their sampled probes); the rest are pure DOM reads.
    pub async fn evaluate(
        &self,
        ctx: &DocumentContext,
        probes: &ProbeClient,
    ) -> anyhow::Result<CheckResult> {
        match self {
            Check::Title => title::evaluate(ctx),
            Check::MetaDescription => meta::evaluate_description(ctx),
            Check::MetaRobots => meta::evaluate_robots(ctx),
            Check::Canonical => canonical::evaluate(ctx),
            Check::H1 => headings::evaluate_h1(ctx),
            Check::Headings => headings::evaluate_outline(ctx),
            Check::OpenGraph => social::evaluate_open_graph(ctx),
            Check::Twitter => social::evaluate_twitter(ctx),
            Check::Images => images::evaluate(ctx, probes).await,
            Check::Links => links::evaluate(ctx, probes).await,
            Check::Hreflang => hreflang::evaluate(ctx),
            Check::StructuredData => structured::evaluate(ctx),
            Check::Favicon => misc::evaluate_favicon(ctx),
            Check::Language => misc::evaluate_language(ctx),
            Check::Charset => meta::evaluate_charset(ctx),
        }
    }

    // The result a check gets when its own logic broke. The failure is
    // recorded as evidence; the other checks are unaffected.
    fn error_result(&self, reason: String) -> CheckResult {
        let mut evidence = Evidence::new();
        evidence.insert("error".to_string(), json!(reason));
        CheckResult {
            id: self.id(),
            label: self.label(),
            status: Status::Fail,
            evidence,
            recommendation: "This rule could not be evaluated for the page.".to_string(),
            weight: 0,
        }
    }
}

// Runs every registered check against the context, concurrently, and
// returns results in registry order with weights stamped from the table.
//
// Each check future is wrapped so that both an Err and a panic settle
// into a recorded `fail` value before the join - the join-all-settled
// shape the whole engine's error model is built on.
pub async fn run_all(
    ctx: &DocumentContext,
    probes: &ProbeClient,
    weights: &WeightTable,
) -> Vec<CheckResult> {
    let settled = Check::registry().into_iter().map(|check| async move {
        match AssertUnwindSafe(check.evaluate(ctx, probes))
            .catch_unwind()
            .await
        {
            Ok(Ok(result)) => result,
            Ok(Err(error)) => check.error_result(error.to_string()),
            Err(_) => check.error_result("check panicked".to_string()),
        }
    });

    let mut results = join_all(settled).await;

    for result in &mut results {
        result.weight = weights.weight_of(result.id);
    }

    results
}

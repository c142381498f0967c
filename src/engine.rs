// src/engine.rs
// =============================================================================
// The analysis pipeline, end to end:
//
//   fetch -> document context -> checks (concurrent) -> score -> contract
//
// One analyze() call owns every piece of state it creates; nothing is
// shared across concurrent analyses and nothing survives the returned
// result. The fetch boundary is crossable directly via analyze_page(),
// which is how the engine is tested without a network.
// =============================================================================

use log::debug;
use reqwest::Client;

use crate::checks;
use crate::context::DocumentContext;
use crate::error::EngineResult;
use crate::fetcher::{self, FetchedPage};
use crate::probe::ProbeClient;
use crate::report::{build_result, OnPageAnalysisResult};
use crate::score::{compute_score, WeightTable};

pub struct AuditEngine {
    page_client: Client,
    probes: ProbeClient,
    weights: WeightTable,
}

impl AuditEngine {
    /// An engine with the standard ruleset and live resource probes.
    pub fn new() -> EngineResult<Self> {
        Ok(AuditEngine {
            page_client: fetcher::build_page_client()?,
            probes: ProbeClient::http()?,
            weights: WeightTable::standard(),
        })
    }

    /// An engine that skips link/image probing. Document analysis is then
    /// fully deterministic, which is what the tests rely on.
    pub fn without_probes() -> EngineResult<Self> {
        Ok(AuditEngine {
            page_client: fetcher::build_page_client()?,
            probes: ProbeClient::disabled(),
            weights: WeightTable::standard(),
        })
    }

    /// Swaps in a custom weight table (versioned rulesets, tests).
    pub fn with_weights(mut self, weights: WeightTable) -> Self {
        self.weights = weights;
        self
    }

    // The single inbound operation: fetch the page and analyze it.
    //
    // The caller is expected to hand us an absolute http(s) URL; anything
    // else fails at the fetch and surfaces as FetchFailed.
    pub async fn analyze(&self, url: &str) -> EngineResult<OnPageAnalysisResult> {
        let page = fetcher::fetch_page(&self.page_client, url).await?;
        self.analyze_page(page).await
    }

    // Everything after the fetch. Public so the fetch boundary can be
    // mocked: hand-built FetchedPage in, full result out.
    pub async fn analyze_page(&self, page: FetchedPage) -> EngineResult<OnPageAnalysisResult> {
        debug!(
            "analyzing {} ({} bytes, {} redirects)",
            page.final_url,
            page.raw_markup.len(),
            page.redirects
        );

        let ctx = DocumentContext::from_page(&page)?;
        let results = checks::run_all(&ctx, &self.probes, &self.weights).await;
        let score = compute_score(&results, &self.weights);

        Ok(build_result(&page, results.as_slice(), score))
    }
}

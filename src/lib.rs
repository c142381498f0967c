// src/lib.rs
// =============================================================================
// page-pulse: the on-page audit engine.
//
// Given one absolute HTTP(S) URL, the engine fetches the page, parses its
// markup, runs a fixed registry of independent rule checks against it,
// and returns a weighted 0-100 health score with per-rule evidence and
// remediation advice.
//
// Pipeline:
//   Fetcher -> DocumentContext -> Check registry (concurrent)
//           -> Aggregator -> Result contract
//
// The crate is a library: the surrounding API layer calls
// AuditEngine::analyze() and serializes the result. There is no CLI, no
// persistence, and no cross-request state.
//
//   let engine = AuditEngine::new()?;
//   let result = engine.analyze("https://example.com/").await?;
//   println!("{}", serde_json::to_string_pretty(&result)?);
// =============================================================================

mod config;     // timeouts, sampling bounds, ruleset version
mod context;    // read-only parsed-document view handed to checks
mod engine;     // the pipeline orchestration
mod error;      // public error type
mod fetcher;    // whole-page fetch with redirect tracking
mod probe;      // bounded sub-fetches for links/images
mod report;     // result types and contract builder
mod score;      // weight table and aggregation
mod checks;     // the rule registry

pub use checks::{ids, Check};
pub use config::RULESET_VERSION;
pub use context::DocumentContext;
pub use engine::AuditEngine;
pub use error::{EngineError, EngineResult};
pub use fetcher::FetchedPage;
pub use probe::{ProbeClient, ProbeOutcome, ProbeResult};
pub use report::{CheckResult, HttpInfo, OnPageAnalysisResult, Status};
pub use score::{compute_score, Score, WeightTable};

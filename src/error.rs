// src/error.rs
// =============================================================================
// The public error type of the engine.
//
// Callers only ever see two failure categories:
// - FetchFailed: we could not retrieve the page at all (network error,
//   timeout, redirect loop, invalid URL). No partial result exists.
// - Internal: the page was fetched but the analysis itself broke in a way
//   the per-check isolation could not absorb.
//
// Everything inside the engine uses anyhow::Result; conversion to
// EngineError happens once, at the analyze() boundary.
// =============================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The page could not be fetched; nothing was analyzed.
    #[error("could not fetch page: {0}")]
    FetchFailed(String),

    /// The page was fetched but analysis failed unexpectedly.
    #[error("internal analysis error: {0}")]
    Internal(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

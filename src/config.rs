// src/config.rs
// =============================================================================
// Engine-wide constants.
//
// The engine has exactly two timeout knobs (whole-page fetch and per-probe),
// the sampling bounds for the resource-probing checks, and the ruleset
// version string. There is no runtime configuration beyond these - the
// weight table lives in score.rs as an explicit value.
// =============================================================================

use std::time::Duration;

/// Hard ceiling for the whole-page fetch, redirects and body included.
/// After this the fetch is abandoned and reported as a failure.
pub const PAGE_TIMEOUT: Duration = Duration::from_secs(15);

/// Per-resource-probe ceiling. Each sampled link/image probe gets its own
/// timeout; one slow probe never stalls the batch.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Maximum redirect hops the fetcher will follow before giving up.
pub const MAX_REDIRECT_HOPS: usize = 10;

/// How many probes run at once within one batch.
pub const PROBE_CONCURRENCY: usize = 8;

/// Sampling bounds: the checks probe a bounded prefix of the candidate
/// set so cost stays flat no matter how large the page is.
pub const MAX_SAMPLED_IMAGES: usize = 10;
pub const MAX_SAMPLED_LINKS: usize = 20;

/// An image heavier than this (per Content-Length) is flagged as large.
pub const LARGE_IMAGE_KB: u64 = 300;

/// External links exceeding this multiple of internal links trigger a warn.
pub const EXTERNAL_LINK_RATIO: usize = 5;

/// Identifies the ruleset revision. Callers may cache results keyed by
/// (url, version); bump this whenever thresholds or weights change.
pub const RULESET_VERSION: &str = "2025.1";

/// Descriptive client identifier sent with every request.
pub const USER_AGENT: &str = concat!(
    "page-pulse/",
    env!("CARGO_PKG_VERSION"),
    " (on-page audit engine)"
);

// src/probe.rs
// =============================================================================
// Bounded sub-fetches for the links and images checks.
//
// Key functionality:
// - Makes HTTP HEAD requests (lightweight, no body download)
// - Each probe runs under its own short timeout
// - A single probe's failure becomes a recorded value, never an error -
//   one dead resource can't abort the batch or the analysis
// - Probes run concurrently with a small cap, results come back aligned
//   with the input order so evidence is deterministic
//
// ProbeClient::disabled() yields a Skipped outcome for every URL. Tests
// use it to keep document-level analysis fully offline; hosts can use it
// for structure-only audits.
// =============================================================================

use futures::stream::{self, StreamExt};
use log::{debug, warn};
use reqwest::Client;

use crate::config::{PROBE_CONCURRENCY, PROBE_TIMEOUT, USER_AGENT};
use crate::error::{EngineError, EngineResult};

// What happened when we probed one resource URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The resource answered with a non-error status
    Alive {
        status: u16,
        /// Content-Length, when the server reported one
        content_length: Option<u64>,
    },
    /// The resource is unreachable or answered 4xx/5xx
    Broken(String),
    /// Probing was disabled; nothing is known about the resource
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub url: String,
    pub outcome: ProbeOutcome,
}

impl ProbeResult {
    pub fn is_broken(&self) -> bool {
        matches!(self.outcome, ProbeOutcome::Broken(_))
    }

    /// Reported size in whole KB, when known.
    pub fn size_kb(&self) -> Option<u64> {
        match self.outcome {
            ProbeOutcome::Alive {
                content_length: Some(bytes),
                ..
            } => Some(bytes / 1024),
            _ => None,
        }
    }
}

// Issues the bounded probe batches. One ProbeClient lives inside the
// engine and is shared by the links and images checks.
pub struct ProbeClient {
    mode: ProbeMode,
}

enum ProbeMode {
    Http(Client),
    Disabled,
}

impl ProbeClient {
    /// A live client. Probes follow redirects on their own (default
    /// policy); we only care whether the resource exists.
    pub fn http() -> EngineResult<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| EngineError::Internal(format!("could not build probe client: {}", e)))?;
        Ok(ProbeClient {
            mode: ProbeMode::Http(client),
        })
    }

    /// A client that skips every probe. Deterministic and offline.
    pub fn disabled() -> Self {
        ProbeClient {
            mode: ProbeMode::Disabled,
        }
    }

    // Probes every URL in the slice, concurrently, failures isolated
    // per item. Results are returned in input order.
    pub async fn probe_many(&self, urls: &[String]) -> Vec<ProbeResult> {
        let client = match &self.mode {
            ProbeMode::Disabled => {
                return urls
                    .iter()
                    .map(|url| ProbeResult {
                        url: url.clone(),
                        outcome: ProbeOutcome::Skipped,
                    })
                    .collect();
            }
            ProbeMode::Http(client) => client,
        };

        debug!("probing {} sampled resources", urls.len());

        // buffered (not buffer_unordered) keeps results in input order,
        // which keeps evidence lists stable across runs
        stream::iter(urls.iter().map(|url| probe_one(client, url)))
            .buffered(PROBE_CONCURRENCY)
            .collect()
            .await
    }
}

// One HEAD probe under its own timeout. Every failure mode collapses
// into ProbeOutcome::Broken with a reason string.
async fn probe_one(client: &Client, url: &str) -> ProbeResult {
    let outcome = match tokio::time::timeout(PROBE_TIMEOUT, client.head(url).send()).await {
        Err(_) => ProbeOutcome::Broken(format!(
            "timed out after {} seconds",
            PROBE_TIMEOUT.as_secs()
        )),
        Ok(Err(error)) => ProbeOutcome::Broken(describe_probe_error(&error)),
        Ok(Ok(response)) => {
            let status = response.status();
            if status.is_client_error() || status.is_server_error() {
                ProbeOutcome::Broken(format!("HTTP {}", status.as_u16()))
            } else {
                ProbeOutcome::Alive {
                    status: status.as_u16(),
                    content_length: response.content_length(),
                }
            }
        }
    };

    if let ProbeOutcome::Broken(reason) = &outcome {
        warn!("probe failed for {}: {}", url, reason);
    }

    ProbeResult {
        url: url.to_string(),
        outcome,
    }
}

fn describe_probe_error(error: &reqwest::Error) -> String {
    let text = error.to_string();

    if error.is_timeout() {
        "request timed out".to_string()
    } else if error.is_redirect() {
        "too many redirects".to_string()
    } else if error.is_connect() {
        if text.contains("dns") {
            "could not resolve hostname".to_string()
        } else {
            "connection failed".to_string()
        }
    } else if text.contains("certificate") || text.contains("ssl") {
        "TLS certificate error".to_string()
    } else {
        text
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why buffered() instead of buffer_unordered()?
//    - buffer_unordered(N) returns results as they complete, so the order
//      depends on network timing
//    - buffered(N) runs the same N futures at once but yields results in
//      input order, so the broken/large evidence lists are stable
//
// 2. Why are failures values instead of errors?
//    - A dead image on someone's page is a FINDING, not a fault in the
//      engine - it belongs in the evidence, and the batch must keep going
//    - This is the same settle-then-join shape the check runner uses
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_client_skips_everything() {
        let probes = ProbeClient::disabled();
        let urls = vec![
            "https://example.com/a".to_string(),
            "https://example.com/b".to_string(),
        ];
        let results = probes.probe_many(&urls).await;

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.outcome == ProbeOutcome::Skipped));
        // input order preserved
        assert_eq!(results[0].url, urls[0]);
        assert_eq!(results[1].url, urls[1]);
    }

    #[test]
    fn test_broken_detection() {
        let broken = ProbeResult {
            url: "https://example.com/x".to_string(),
            outcome: ProbeOutcome::Broken("HTTP 404".to_string()),
        };
        assert!(broken.is_broken());

        let alive = ProbeResult {
            url: "https://example.com/y".to_string(),
            outcome: ProbeOutcome::Alive {
                status: 200,
                content_length: Some(2048),
            },
        };
        assert!(!alive.is_broken());
        assert_eq!(alive.size_kb(), Some(2));
    }

    #[test]
    fn test_size_unknown_without_content_length() {
        let alive = ProbeResult {
            url: "https://example.com/y".to_string(),
            outcome: ProbeOutcome::Alive {
                status: 200,
                content_length: None,
            },
        };
        assert_eq!(alive.size_kb(), None);
    }
}

// src/fetcher.rs
// =============================================================================
// This module retrieves the raw markup for one URL.
//
// How it works:
// 1. Build a GET request with browser-like negotiation headers
// 2. Follow redirects manually (the client has auto-redirects disabled)
//    so we can report the final URL AND the hop count
// 3. Read the body and capture the response headers
// 4. The whole thing runs under one hard timeout; a slow server produces
//    a FetchFailed, never a hung analysis
//
// Failure conditions - network error, timeout, redirect loop, bad URL -
// all surface as a single EngineError::FetchFailed. No partial or garbled
// markup is ever passed downstream.
// =============================================================================

use log::debug;
use reqwest::header::{self, HeaderMap};
use reqwest::{Client, StatusCode};
use std::collections::HashMap;
use url::Url;

use crate::config::{MAX_REDIRECT_HOPS, PAGE_TIMEOUT, USER_AGENT};
use crate::error::{EngineError, EngineResult};

// Everything the rest of the pipeline needs to know about the fetch.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// The URL the caller asked about
    pub requested_url: String,
    /// Where the page actually lives after redirects
    pub final_url: String,
    /// Terminal HTTP status code
    pub status: u16,
    /// Redirect hops followed to get there
    pub redirects: usize,
    /// Response headers, lower-cased keys, first value wins
    pub headers: HashMap<String, String>,
    /// The raw HTML body
    pub raw_markup: String,
}

/// Builds the client used for the whole-page fetch.
///
/// Auto-redirects are disabled: the fetcher follows Location headers
/// itself so it can count the hops.
pub fn build_page_client() -> EngineResult<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(|e| EngineError::Internal(format!("could not build HTTP client: {}", e)))
}

// Fetches one page, following redirects, under the hard page timeout.
pub async fn fetch_page(client: &Client, url: &str) -> EngineResult<FetchedPage> {
    match tokio::time::timeout(PAGE_TIMEOUT, follow_and_fetch(client, url)).await {
        Ok(result) => result,
        Err(_) => Err(EngineError::FetchFailed(format!(
            "timed out after {} seconds",
            PAGE_TIMEOUT.as_secs()
        ))),
    }
}

// The redirect-following loop. Each hop issues a fresh GET; 3xx responses
// with a Location header move us along, anything else is terminal.
async fn follow_and_fetch(client: &Client, url: &str) -> EngineResult<FetchedPage> {
    let mut current = Url::parse(url)
        .map_err(|e| EngineError::FetchFailed(format!("invalid URL '{}': {}", url, e)))?;
    let mut hops = 0;

    loop {
        debug!("fetching {} (hop {})", current, hops);

        let response = client
            .get(current.clone())
            .header(
                header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header(header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| EngineError::FetchFailed(describe_transport_error(&e)))?;

        let status = response.status();

        if is_redirect(status) {
            hops += 1;
            if hops > MAX_REDIRECT_HOPS {
                return Err(EngineError::FetchFailed(format!(
                    "more than {} redirects",
                    MAX_REDIRECT_HOPS
                )));
            }

            let location = response
                .headers()
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| {
                    EngineError::FetchFailed(format!(
                        "redirect ({}) without a Location header",
                        status.as_u16()
                    ))
                })?;

            // Location may be relative; resolve against the current URL
            current = current.join(location).map_err(|e| {
                EngineError::FetchFailed(format!("unresolvable redirect target '{}': {}", location, e))
            })?;
            continue;
        }

        // Terminal response: capture headers before consuming the body
        let headers = flatten_headers(response.headers());
        let final_url = response.url().to_string();
        let raw_markup = response
            .text()
            .await
            .map_err(|e| EngineError::FetchFailed(format!("could not read body: {}", e)))?;

        return Ok(FetchedPage {
            requested_url: url.to_string(),
            final_url,
            status: status.as_u16(),
            redirects: hops,
            headers,
            raw_markup,
        });
    }
}

fn is_redirect(status: StatusCode) -> bool {
    matches!(status.as_u16(), 301 | 302 | 303 | 307 | 308)
}

// Turns a HeaderMap into a plain lower-cased map.
// Later duplicates of the same header are ignored (first value wins).
pub fn flatten_headers(headers: &HeaderMap) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for (name, value) in headers {
        if let Ok(value) = value.to_str() {
            map.entry(name.as_str().to_ascii_lowercase())
                .or_insert_with(|| value.to_string());
        }
    }
    map
}

// Turns a reqwest transport error into a human-readable reason.
fn describe_transport_error(error: &reqwest::Error) -> String {
    let text = error.to_string();

    if error.is_timeout() {
        "request timed out".to_string()
    } else if error.is_connect() {
        if text.contains("dns") {
            "could not resolve hostname".to_string()
        } else {
            "connection failed".to_string()
        }
    } else if text.contains("certificate") || text.contains("ssl") {
        "TLS certificate error".to_string()
    } else if error.is_builder() {
        // Non-HTTP schemes land here (e.g. ftp://)
        "unsupported URL scheme".to_string()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_url_is_fetch_failed() {
        let client = build_page_client().unwrap();
        // Fails at URL parsing, before any network traffic
        let err = fetch_page(&client, "not a url").await.unwrap_err();
        assert!(matches!(err, EngineError::FetchFailed(_)));
    }

    #[test]
    fn test_redirect_statuses() {
        assert!(is_redirect(StatusCode::MOVED_PERMANENTLY));
        assert!(is_redirect(StatusCode::FOUND));
        assert!(is_redirect(StatusCode::PERMANENT_REDIRECT));
        assert!(!is_redirect(StatusCode::OK));
        assert!(!is_redirect(StatusCode::NOT_FOUND));
    }

    #[test]
    fn test_flatten_headers_lowercases_and_keeps_first() {
        let mut headers = HeaderMap::new();
        headers.append("X-Robots-Tag", "noindex".parse().unwrap());
        headers.append("X-Robots-Tag", "nofollow".parse().unwrap());

        let flat = flatten_headers(&headers);
        assert_eq!(flat.get("x-robots-tag"), Some(&"noindex".to_string()));
    }
}

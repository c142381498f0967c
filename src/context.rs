// src/context.rs
// =============================================================================
// The read-only view of a fetched page that every check receives.
//
// DocumentContext wraps the parsed HTML tree (scraper's lenient html5ever
// parser - malformed markup never errors), the final URL, and the response
// headers. Checks take &DocumentContext, so immutability is enforced by
// the borrow checker, not by convention.
//
// Absence of an expected element is always expressed as None / an empty
// Vec, never as an error.
// =============================================================================

use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use url::Url;

use crate::error::{EngineError, EngineResult};
use crate::fetcher::FetchedPage;

pub struct DocumentContext {
    document: Html,
    pub raw_markup: String,
    pub final_url: Url,
    headers: HashMap<String, String>,
}

impl DocumentContext {
    /// Parses the fetched page into a queryable context.
    /// The only way this fails is a final URL that won't parse, which
    /// would mean the fetcher itself is broken.
    pub fn from_page(page: &FetchedPage) -> EngineResult<Self> {
        let final_url = Url::parse(&page.final_url).map_err(|e| {
            EngineError::Internal(format!("unparseable final URL '{}': {}", page.final_url, e))
        })?;

        Ok(DocumentContext::new(
            page.raw_markup.clone(),
            final_url,
            page.headers.clone(),
        ))
    }

    pub fn new(raw_markup: String, final_url: Url, headers: HashMap<String, String>) -> Self {
        let document = Html::parse_document(&raw_markup);
        DocumentContext {
            document,
            raw_markup,
            final_url,
            headers,
        }
    }

    /// All elements matching a CSS selector, in document order.
    /// An invalid selector yields no matches rather than an error.
    pub fn select_all(&self, css: &str) -> Vec<ElementRef<'_>> {
        match Selector::parse(css) {
            Ok(selector) => self.document.select(&selector).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// First element matching a CSS selector, if any.
    pub fn select_first(&self, css: &str) -> Option<ElementRef<'_>> {
        match Selector::parse(css) {
            Ok(selector) => self.document.select(&selector).next(),
            Err(_) => None,
        }
    }

    /// Content of `<meta name="...">`, matched case-insensitively.
    ///
    /// Real pages write name="Description" often enough that we compare
    /// attribute values ourselves instead of relying on selector matching.
    pub fn meta_content(&self, name: &str) -> Option<String> {
        self.select_all("meta").into_iter().find_map(|el| {
            let matches = el
                .value()
                .attr("name")
                .map(|n| n.trim().eq_ignore_ascii_case(name))
                .unwrap_or(false);
            if matches {
                el.value().attr("content").map(|c| c.trim().to_string())
            } else {
                None
            }
        })
    }

    /// Content of `<meta property="...">` (Open Graph style), matched
    /// case-insensitively.
    pub fn meta_property(&self, property: &str) -> Option<String> {
        self.select_all("meta").into_iter().find_map(|el| {
            let matches = el
                .value()
                .attr("property")
                .map(|p| p.trim().eq_ignore_ascii_case(property))
                .unwrap_or(false);
            if matches {
                el.value().attr("content").map(|c| c.trim().to_string())
            } else {
                None
            }
        })
    }

    /// A response header by name, case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(|s| s.as_str())
    }

    /// Resolves a possibly-relative href against the final URL.
    /// Returns None for unresolvable values.
    pub fn resolve(&self, href: &str) -> Option<Url> {
        match Url::parse(href) {
            Ok(url) => Some(url),
            Err(_) => self.final_url.join(href).ok(),
        }
    }
}

/// Collects the visible text of an element, trimmed.
pub fn text_of(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

// src/checks/links.rs
// =============================================================================
// Link health check.
//
// Collects every anchor, resolves to absolute HTTP(S) URLs, dedupes, then
// probes a bounded prefix of the candidates (existence only). On top of
// that it scans for mixed content: http:// sub-resources referenced from
// an https:// page.
//
//   fail  any sampled link is unreachable or answers 4xx/5xx
//   warn  mixed-content resources on an HTTPS page, or external links
//         outnumber internal ones more than 5:1
//   pass  zero broken sampled links
// =============================================================================

use serde_json::json;
use std::collections::HashSet;

use super::{ids, Check};
use crate::config::{EXTERNAL_LINK_RATIO, MAX_SAMPLED_LINKS};
use crate::context::DocumentContext;
use crate::probe::ProbeClient;
use crate::report::{CheckResult, Evidence, Status};

pub async fn evaluate(ctx: &DocumentContext, probes: &ProbeClient) -> anyhow::Result<CheckResult> {
    let candidates = collect_links(ctx);

    let page_host = ctx.final_url.host_str().map(|h| h.to_string());
    let internal = candidates
        .iter()
        .filter(|url| url::Url::parse(url).ok().and_then(|u| u.host_str().map(String::from)) == page_host)
        .count();
    let external = candidates.len() - internal;

    let sampled: Vec<String> = candidates.iter().take(MAX_SAMPLED_LINKS).cloned().collect();
    let probe_results = probes.probe_many(&sampled).await;
    let broken: Vec<String> = probe_results
        .iter()
        .filter(|result| result.is_broken())
        .map(|result| result.url.clone())
        .collect();

    let https_page = ctx.final_url.scheme() == "https";
    let mixed_content = if https_page {
        collect_mixed_content(ctx)
    } else {
        Vec::new()
    };

    let status = resolve_status(&broken, &mixed_content, internal, external);

    let mut evidence = Evidence::new();
    evidence.insert("total".to_string(), json!(candidates.len()));
    evidence.insert("internal".to_string(), json!(internal));
    evidence.insert("external".to_string(), json!(external));
    evidence.insert("sampled".to_string(), json!(sampled.len()));
    evidence.insert("broken".to_string(), json!(broken));
    evidence.insert("mixedContent".to_string(), json!(mixed_content));

    let recommendation = match status {
        Status::Fail => format!(
            "Fix or remove the {} broken link(s) found in the sample.",
            broken.len()
        ),
        Status::Warn if !mixed_content.is_empty() => {
            "Serve all sub-resources over HTTPS to avoid mixed-content blocking.".to_string()
        }
        Status::Warn => {
            "External links heavily outnumber internal ones; strengthen internal linking."
                .to_string()
        }
        Status::Pass => "No broken links in the sample.".to_string(),
    };

    Ok(CheckResult {
        id: ids::LINKS,
        label: Check::Links.label(),
        status,
        evidence,
        recommendation,
        weight: 0,
    })
}

fn resolve_status(
    broken: &[String],
    mixed_content: &[String],
    internal: usize,
    external: usize,
) -> Status {
    if !broken.is_empty() {
        Status::Fail
    } else if !mixed_content.is_empty() || external > EXTERNAL_LINK_RATIO * internal {
        Status::Warn
    } else {
        Status::Pass
    }
}

// All anchor targets as absolute http(s) URLs, deduped, document order.
fn collect_links(ctx: &DocumentContext) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in ctx.select_all("a[href]") {
        let href = match element.value().attr("href") {
            Some(href) => href.trim(),
            None => continue,
        };

        // Skip anchors and non-web protocols before resolving
        if href.is_empty()
            || href.starts_with('#')
            || href.starts_with("mailto:")
            || href.starts_with("tel:")
            || href.starts_with("javascript:")
        {
            continue;
        }

        let resolved = match ctx.resolve(href) {
            Some(url) => url,
            None => continue,
        };

        if resolved.scheme() != "http" && resolved.scheme() != "https" {
            continue;
        }

        let url = resolved.to_string();
        if seen.insert(url.clone()) {
            links.push(url);
        }
    }

    links
}

// Sub-resources a browser would block on an HTTPS page: anything loaded
// over plain http://.
fn collect_mixed_content(ctx: &DocumentContext) -> Vec<String> {
    let sources = [
        ("img[src]", "src"),
        ("script[src]", "src"),
        ("iframe[src]", "src"),
        ("link[rel=\"stylesheet\"][href]", "href"),
    ];

    let mut seen = HashSet::new();
    let mut insecure = Vec::new();

    for (selector, attr) in sources {
        for element in ctx.select_all(selector) {
            if let Some(value) = element.value().attr(attr) {
                let value = value.trim();
                if value.starts_with("http://") && seen.insert(value.to_string()) {
                    insecure.push(value.to_string());
                }
            }
        }
    }

    insecure
}

// src/checks/images.rs
// =============================================================================
// Image health check.
//
// Samples the first 10 <img> elements, records which lack alt text, and
// probes the sampled sources for existence and reported size.
//
//   fail  more than 10% of a full sample (>=10 images) lack alt text
//   warn  any missing alt, or an oversized image (>300 KB) in the sample
//   pass  alt coverage fine and nothing oversized
//
// Unreachable images are recorded as `broken` evidence; per the ruleset
// they inform the caller but only alt coverage and size drive the status.
// =============================================================================

use serde_json::json;

use super::{ids, Check};
use crate::config::{LARGE_IMAGE_KB, MAX_SAMPLED_IMAGES};
use crate::context::DocumentContext;
use crate::probe::ProbeClient;
use crate::report::{CheckResult, Evidence, Status};

pub async fn evaluate(ctx: &DocumentContext, probes: &ProbeClient) -> anyhow::Result<CheckResult> {
    let images = ctx.select_all("img");
    let total = images.len();

    // Bounded prefix of the full candidate set
    let mut missing_alt: Vec<String> = Vec::new();
    let mut probe_urls: Vec<String> = Vec::new();
    let mut sampled = 0usize;

    for element in images.into_iter().take(MAX_SAMPLED_IMAGES) {
        sampled += 1;

        let src = element.value().attr("src").unwrap_or("").trim().to_string();

        let has_alt = element
            .value()
            .attr("alt")
            .map(|alt| !alt.trim().is_empty())
            .unwrap_or(false);
        if !has_alt {
            missing_alt.push(src.clone());
        }

        // Only probe sources that resolve to a web URL
        if let Some(resolved) = ctx.resolve(&src).filter(|u| {
            !src.is_empty() && (u.scheme() == "http" || u.scheme() == "https")
        }) {
            probe_urls.push(resolved.to_string());
        }
    }

    let probe_results = probes.probe_many(&probe_urls).await;

    let broken: Vec<String> = probe_results
        .iter()
        .filter(|result| result.is_broken())
        .map(|result| result.url.clone())
        .collect();

    let large: Vec<serde_json::Value> = probe_results
        .iter()
        .filter_map(|result| {
            result.size_kb().filter(|kb| *kb > LARGE_IMAGE_KB).map(|kb| {
                json!({ "src": result.url, "sizeKB": kb })
            })
        })
        .collect();

    let status = resolve_status(sampled, missing_alt.len(), large.len());

    let ratio = if sampled == 0 {
        0.0
    } else {
        missing_alt.len() as f64 / sampled as f64
    };

    let mut evidence = Evidence::new();
    evidence.insert("total".to_string(), json!(total));
    evidence.insert("sampled".to_string(), json!(sampled));
    evidence.insert("missingAlt".to_string(), json!(missing_alt));
    evidence.insert("missingAltRatio".to_string(), json!(ratio));
    evidence.insert("broken".to_string(), json!(broken));
    evidence.insert("large".to_string(), json!(large));

    let recommendation = match status {
        Status::Fail => "Most images lack alt text; describe each image for accessibility and indexing.".to_string(),
        Status::Warn if !large.is_empty() => format!(
            "Compress the {} image(s) over {} KB in the sample.",
            large.len(),
            LARGE_IMAGE_KB
        ),
        Status::Warn => "Add alt text to the images that are missing it.".to_string(),
        Status::Pass => "Sampled images have alt text and reasonable sizes.".to_string(),
    };

    Ok(CheckResult {
        id: ids::IMAGES,
        label: Check::Images.label(),
        status,
        evidence,
        recommendation,
        weight: 0,
    })
}

fn resolve_status(sampled: usize, missing_alt: usize, large: usize) -> Status {
    // ratio > 10% only fails on a full sample
    if sampled >= MAX_SAMPLED_IMAGES && missing_alt * 10 > sampled {
        Status::Fail
    } else if missing_alt > 0 || large > 0 {
        Status::Warn
    } else {
        Status::Pass
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use url::Url;

    fn context(html: &str) -> DocumentContext {
        DocumentContext::new(
            html.to_string(),
            Url::parse("https://example.com/").unwrap(),
            HashMap::new(),
        )
    }

    fn imgs(with_alt: usize, without_alt: usize) -> String {
        let mut html = String::new();
        for i in 0..with_alt {
            html.push_str(&format!(r#"<img src="/img{}.png" alt="picture {}">"#, i, i));
        }
        for i in 0..without_alt {
            html.push_str(&format!(r#"<img src="/bare{}.png">"#, i));
        }
        html
    }

    #[test]
    fn test_status_thresholds() {
        // full sample, 30% missing -> fail
        assert_eq!(resolve_status(10, 3, 0), Status::Fail);
        // full sample, exactly 10% missing -> warn, not fail
        assert_eq!(resolve_status(10, 1, 0), Status::Warn);
        // small sample with a missing alt -> warn
        assert_eq!(resolve_status(4, 1, 0), Status::Warn);
        // oversized image alone -> warn
        assert_eq!(resolve_status(10, 0, 2), Status::Warn);
        // clean -> pass
        assert_eq!(resolve_status(10, 0, 0), Status::Pass);
        assert_eq!(resolve_status(0, 0, 0), Status::Pass);
    }

    #[tokio::test]
    async fn test_full_sample_with_poor_alt_coverage_fails() {
        let result = evaluate(&context(&imgs(7, 3)), &ProbeClient::disabled())
            .await
            .unwrap();
        assert_eq!(result.status, Status::Fail);
        assert_eq!(result.evidence["sampled"], json!(10));
    }

    #[tokio::test]
    async fn test_some_missing_alt_warns() {
        let result = evaluate(&context(&imgs(4, 1)), &ProbeClient::disabled())
            .await
            .unwrap();
        assert_eq!(result.status, Status::Warn);
        assert_eq!(result.evidence["missingAlt"], json!(["/bare0.png"]));
    }

    #[tokio::test]
    async fn test_all_alt_passes() {
        let result = evaluate(&context(&imgs(5, 0)), &ProbeClient::disabled())
            .await
            .unwrap();
        assert_eq!(result.status, Status::Pass);
    }

    #[tokio::test]
    async fn test_sampling_is_bounded() {
        let result = evaluate(&context(&imgs(25, 0)), &ProbeClient::disabled())
            .await
            .unwrap();
        assert_eq!(result.evidence["total"], json!(25));
        assert_eq!(result.evidence["sampled"], json!(10));
    }

    #[tokio::test]
    async fn test_empty_alt_counts_as_missing() {
        let html = r#"<img src="/a.png" alt="">"#;
        let result = evaluate(&context(html), &ProbeClient::disabled())
            .await
            .unwrap();
        assert_eq!(result.status, Status::Warn);
    }

    #[tokio::test]
    async fn test_no_images_passes() {
        let result = evaluate(&context("<p>No pictures</p>"), &ProbeClient::disabled())
            .await
            .unwrap();
        assert_eq!(result.status, Status::Pass);
        assert_eq!(result.evidence["total"], json!(0));
    }
}

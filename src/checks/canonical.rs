// src/checks/canonical.rs
// =============================================================================
// Canonical URL check.
//
//   pass  exactly one absolute canonical, self-referential to the final URL
//   warn  exactly one absolute canonical pointing somewhere else
//   fail  zero canonicals, multiple canonicals, or a relative one
//
// Self-reference is judged on normalized URLs: utm_* query parameters and
// the trailing slash are ignored, as are fragments.
// =============================================================================

use serde_json::json;
use url::Url;

use super::{ids, Check};
use crate::context::DocumentContext;
use crate::report::{CheckResult, Evidence, Status};

pub fn evaluate(ctx: &DocumentContext) -> anyhow::Result<CheckResult> {
    let hrefs: Vec<String> = ctx
        .select_all("link")
        .into_iter()
        .filter(|el| {
            el.value()
                .attr("rel")
                .map(|rel| rel.trim().eq_ignore_ascii_case("canonical"))
                .unwrap_or(false)
        })
        .filter_map(|el| el.value().attr("href").map(|h| h.trim().to_string()))
        .collect();

    let mut evidence = Evidence::new();
    evidence.insert("count".to_string(), json!(hrefs.len()));

    let (status, recommendation) = match hrefs.as_slice() {
        [] => (
            Status::Fail,
            "Add a single <link rel=\"canonical\"> with the page's absolute URL.".to_string(),
        ),
        [href] => {
            evidence.insert("href".to_string(), json!(href));

            match Url::parse(href) {
                Err(_) => {
                    // Relative (or otherwise unparseable) canonical
                    evidence.insert("selfReferential".to_string(), json!(false));
                    (
                        Status::Fail,
                        "The canonical URL is relative; use an absolute URL.".to_string(),
                    )
                }
                Ok(canonical) => {
                    let self_referential =
                        normalize_for_comparison(&canonical) == normalize_for_comparison(&ctx.final_url);
                    evidence.insert("selfReferential".to_string(), json!(self_referential));

                    if self_referential {
                        (
                            Status::Pass,
                            "The canonical URL points at this page.".to_string(),
                        )
                    } else {
                        (
                            Status::Warn,
                            format!(
                                "The canonical points at {} instead of this page; make sure that is intentional.",
                                canonical
                            ),
                        )
                    }
                }
            }
        }
        _ => (
            Status::Fail,
            format!(
                "Found {} canonical tags; keep exactly one.",
                hrefs.len()
            ),
        ),
    };

    Ok(CheckResult {
        id: ids::CANONICAL,
        label: Check::Canonical.label(),
        status,
        evidence,
        recommendation,
        weight: 0,
    })
}

// Normalized form used only for the self-reference comparison:
// scheme://host[:port]/path with the trailing slash trimmed, plus any
// query parameters that are not utm_* tracking params. Fragments drop.
fn normalize_for_comparison(url: &Url) -> String {
    let mut normalized = format!(
        "{}://{}",
        url.scheme(),
        url.host_str().unwrap_or("")
    );
    if let Some(port) = url.port() {
        normalized.push(':');
        normalized.push_str(&port.to_string());
    }

    normalized.push_str(url.path().trim_end_matches('/'));

    let kept: Vec<String> = url
        .query_pairs()
        .filter(|(key, _)| !key.starts_with("utm_"))
        .map(|(key, value)| {
            if value.is_empty() {
                key.into_owned()
            } else {
                format!("{}={}", key, value)
            }
        })
        .collect();
    if !kept.is_empty() {
        normalized.push('?');
        normalized.push_str(&kept.join("&"));
    }

    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn context_at(html: &str, final_url: &str) -> DocumentContext {
        DocumentContext::new(
            html.to_string(),
            Url::parse(final_url).unwrap(),
            HashMap::new(),
        )
    }

    #[test]
    fn test_self_referential_canonical_passes() {
        let html = r#"<link rel="canonical" href="https://example.com/page">"#;
        let result = evaluate(&context_at(html, "https://example.com/page")).unwrap();
        assert_eq!(result.status, Status::Pass);
        assert_eq!(result.evidence["selfReferential"], json!(true));
    }

    #[test]
    fn test_utm_params_are_ignored() {
        let html = r#"<link rel="canonical" href="https://example.com/page">"#;
        let result = evaluate(&context_at(
            html,
            "https://example.com/page?utm_source=newsletter&utm_medium=email",
        ))
        .unwrap();
        assert_eq!(result.status, Status::Pass);
    }

    #[test]
    fn test_trailing_slash_is_ignored() {
        let html = r#"<link rel="canonical" href="https://example.com/page/">"#;
        let result = evaluate(&context_at(html, "https://example.com/page")).unwrap();
        assert_eq!(result.status, Status::Pass);
    }

    #[test]
    fn test_non_utm_query_params_still_count() {
        let html = r#"<link rel="canonical" href="https://example.com/page">"#;
        let result = evaluate(&context_at(html, "https://example.com/page?id=7")).unwrap();
        assert_eq!(result.status, Status::Warn);
    }

    #[test]
    fn test_other_target_warns() {
        let html = r#"<link rel="canonical" href="https://example.com/other">"#;
        let result = evaluate(&context_at(html, "https://example.com/page")).unwrap();
        assert_eq!(result.status, Status::Warn);
        assert_eq!(result.evidence["selfReferential"], json!(false));
    }

    #[test]
    fn test_missing_canonical_fails() {
        let result = evaluate(&context_at("<head></head>", "https://example.com/page")).unwrap();
        assert_eq!(result.status, Status::Fail);
        assert_eq!(result.evidence["count"], json!(0));
    }

    #[test]
    fn test_multiple_canonicals_fail() {
        let html = r#"
            <link rel="canonical" href="https://example.com/a">
            <link rel="canonical" href="https://example.com/b">
        "#;
        let result = evaluate(&context_at(html, "https://example.com/a")).unwrap();
        assert_eq!(result.status, Status::Fail);
        assert_eq!(result.evidence["count"], json!(2));
    }

    #[test]
    fn test_relative_canonical_fails() {
        let html = r#"<link rel="canonical" href="/page">"#;
        let result = evaluate(&context_at(html, "https://example.com/page")).unwrap();
        assert_eq!(result.status, Status::Fail);
    }
}

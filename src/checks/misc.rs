// src/checks/misc.rs
// =============================================================================
// Favicon and root language checks.
//
// favicon: a declared PNG icon passes. Anything else - an icon in another
// format, or no icon link at all - warns, and the evidence records that
// we ASSUME the /favicon.ico fallback without verifying it exists
// (`assumed: true`). Browsers do request that path, but the engine does
// not probe it, so the assumption is stated rather than asserted.
//
// language: pass when the root element carries a lang attribute.
// =============================================================================

use serde_json::json;

use super::{ids, Check};
use crate::context::DocumentContext;
use crate::report::{CheckResult, Evidence, Status};

pub fn evaluate_favicon(ctx: &DocumentContext) -> anyhow::Result<CheckResult> {
    // First <link> whose rel tokens include "icon" (covers "icon" and
    // "shortcut icon")
    let icon = ctx.select_all("link").into_iter().find(|el| {
        el.value()
            .attr("rel")
            .map(|rel| {
                rel.split_ascii_whitespace()
                    .any(|token| token.eq_ignore_ascii_case("icon"))
            })
            .unwrap_or(false)
    });

    let href = icon
        .as_ref()
        .and_then(|el| el.value().attr("href"))
        .map(|h| h.trim().to_string());

    let is_png = icon
        .as_ref()
        .map(|el| {
            let typed_png = el
                .value()
                .attr("type")
                .map(|t| t.trim().eq_ignore_ascii_case("image/png"))
                .unwrap_or(false);
            let png_href = href
                .as_deref()
                .map(|h| h.to_ascii_lowercase().ends_with(".png"))
                .unwrap_or(false);
            typed_png || png_href
        })
        .unwrap_or(false);

    let mut evidence = Evidence::new();
    evidence.insert("declared".to_string(), json!(icon.is_some()));
    evidence.insert("href".to_string(), json!(href));
    evidence.insert("assumed".to_string(), json!(!is_png));

    let (status, recommendation) = if is_png {
        (Status::Pass, "A PNG favicon is declared.".to_string())
    } else if icon.is_some() {
        (
            Status::Warn,
            "Declare a PNG favicon; other formats render inconsistently.".to_string(),
        )
    } else {
        (
            Status::Warn,
            "No icon link found; browsers will fall back to /favicon.ico. Declare a PNG icon explicitly.".to_string(),
        )
    };

    Ok(CheckResult {
        id: ids::FAVICON,
        label: Check::Favicon.label(),
        status,
        evidence,
        recommendation,
        weight: 0,
    })
}

pub fn evaluate_language(ctx: &DocumentContext) -> anyhow::Result<CheckResult> {
    let lang = ctx
        .select_first("html")
        .and_then(|el| el.value().attr("lang").map(|l| l.trim().to_string()))
        .filter(|l| !l.is_empty());

    let mut evidence = Evidence::new();
    evidence.insert("lang".to_string(), json!(lang));

    let (status, recommendation) = if lang.is_some() {
        (
            Status::Pass,
            "The root element declares its language.".to_string(),
        )
    } else {
        (
            Status::Warn,
            "Add a lang attribute to <html> (e.g. <html lang=\"en\">).".to_string(),
        )
    };

    Ok(CheckResult {
        id: ids::LANGUAGE,
        label: Check::Language.label(),
        status,
        evidence,
        recommendation,
        weight: 0,
    })
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

    #[test]
    fn test_png_favicon_passes() {
        let html = r#"<link rel="icon" type="image/png" href="/favicon.png">"#;
        let result = evaluate_favicon(&context(html)).unwrap();
        assert_eq!(result.status, Status::Pass);
        assert_eq!(result.evidence["assumed"], json!(false));
    }

    #[test]
    fn test_png_by_extension_passes() {
        let html = r#"<link rel="icon" href="/icons/fav.PNG">"#;
        let result = evaluate_favicon(&context(html)).unwrap();
        assert_eq!(result.status, Status::Pass);
    }

    #[test]
    fn test_ico_favicon_warns() {
        let html = r#"<link rel="shortcut icon" href="/favicon.ico">"#;
        let result = evaluate_favicon(&context(html)).unwrap();
        assert_eq!(result.status, Status::Warn);
        assert_eq!(result.evidence["declared"], json!(true));
    }

    #[test]
    fn test_missing_favicon_warns_with_assumption_recorded() {
        let result = evaluate_favicon(&context("<head></head>")).unwrap();
        assert_eq!(result.status, Status::Warn);
        assert_eq!(result.evidence["declared"], json!(false));
        assert_eq!(result.evidence["assumed"], json!(true));
    }

    #[test]
    fn test_lang_attribute_passes() {
        let result = evaluate_language(&context(r#"<html lang="en"><body></body></html>"#)).unwrap();
        assert_eq!(result.status, Status::Pass);
        assert_eq!(result.evidence["lang"], json!("en"));
    }

    #[test]
    fn test_missing_lang_warns() {
        let result = evaluate_language(&context("<html><body></body></html>")).unwrap();
        assert_eq!(result.status, Status::Warn);
        assert_eq!(result.evidence["lang"], json!(null));
    }
}

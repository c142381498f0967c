// src/checks/social.rs
// =============================================================================
// Social markup checks: Open Graph and Twitter Card.
//
// openGraph:
//   pass  og:* tags present, none of the required four missing, image absolute
//   warn  tags present but a required tag missing, or og:image is relative
//   fail  zero og:* tags
//
// Required tags: og:title, og:description, og:image, og:url.
//
// twitter: pass when twitter:card is present, warn otherwise.
// =============================================================================

use serde_json::json;
use url::Url;

use super::{ids, Check};
use crate::context::DocumentContext;
use crate::report::{CheckResult, Evidence, Status};

const REQUIRED_OG_TAGS: [&str; 4] = ["og:title", "og:description", "og:image", "og:url"];

pub fn evaluate_open_graph(ctx: &DocumentContext) -> anyhow::Result<CheckResult> {
    // Every meta with an og:* property, in document order
    let tags: Vec<String> = ctx
        .select_all("meta")
        .into_iter()
        .filter_map(|el| el.value().attr("property"))
        .map(|p| p.trim().to_ascii_lowercase())
        .filter(|p| p.starts_with("og:"))
        .collect();

    let missing: Vec<&str> = REQUIRED_OG_TAGS
        .iter()
        .filter(|required| {
            ctx.meta_property(required)
                .filter(|content| !content.is_empty())
                .is_none()
        })
        .copied()
        .collect();

    let image = ctx.meta_property("og:image").filter(|c| !c.is_empty());
    let image_absolute = image
        .as_deref()
        .map(|href| Url::parse(href).is_ok())
        .unwrap_or(false);

    let mut evidence = Evidence::new();
    evidence.insert("tags".to_string(), json!(tags));
    evidence.insert("missing".to_string(), json!(missing));
    evidence.insert("imageAbsolute".to_string(), json!(image_absolute));

    let (status, recommendation) = if tags.is_empty() {
        (
            Status::Fail,
            "Add Open Graph tags (og:title, og:description, og:image, og:url) for link previews."
                .to_string(),
        )
    } else if !missing.is_empty() {
        (
            Status::Warn,
            format!("Add the missing Open Graph tags: {}.", missing.join(", ")),
        )
    } else if !image_absolute {
        (
            Status::Warn,
            "og:image must be an absolute URL so preview scrapers can fetch it.".to_string(),
        )
    } else {
        (
            Status::Pass,
            "All required Open Graph tags are present.".to_string(),
        )
    };

    Ok(CheckResult {
        id: ids::OPEN_GRAPH,
        label: Check::OpenGraph.label(),
        status,
        evidence,
        recommendation,
        weight: 0,
    })
}

pub fn evaluate_twitter(ctx: &DocumentContext) -> anyhow::Result<CheckResult> {
    let card = ctx.meta_content("twitter:card").filter(|c| !c.is_empty());

    let mut evidence = Evidence::new();
    evidence.insert("card".to_string(), json!(card));

    let (status, recommendation) = if card.is_some() {
        (
            Status::Pass,
            "A twitter:card type is declared.".to_string(),
        )
    } else {
        (
            Status::Warn,
            "Add <meta name=\"twitter:card\" content=\"summary_large_image\"> for rich shares."
                .to_string(),
        )
    };

    Ok(CheckResult {
        id: ids::TWITTER,
        label: Check::Twitter.label(),
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

    fn context(html: &str) -> DocumentContext {
        DocumentContext::new(
            html.to_string(),
            Url::parse("https://example.com/").unwrap(),
            HashMap::new(),
        )
    }

    fn full_og() -> String {
        r#"
            <meta property="og:title" content="My Page">
            <meta property="og:description" content="What the page is about">
            <meta property="og:image" content="https://example.com/hero.png">
            <meta property="og:url" content="https://example.com/">
        "#
        .to_string()
    }

    #[test]
    fn test_complete_open_graph_passes() {
        let result = evaluate_open_graph(&context(&full_og())).unwrap();
        assert_eq!(result.status, Status::Pass);
        assert_eq!(result.evidence["missing"], json!([]));
    }

    #[test]
    fn test_no_open_graph_fails() {
        let result = evaluate_open_graph(&context("<head></head>")).unwrap();
        assert_eq!(result.status, Status::Fail);
    }

    #[test]
    fn test_missing_required_tag_warns() {
        let html = r#"
            <meta property="og:title" content="My Page">
            <meta property="og:url" content="https://example.com/">
        "#;
        let result = evaluate_open_graph(&context(html)).unwrap();
        assert_eq!(result.status, Status::Warn);
        assert_eq!(
            result.evidence["missing"],
            json!(["og:description", "og:image"])
        );
    }

    #[test]
    fn test_relative_image_warns() {
        let html = full_og().replace("https://example.com/hero.png", "/hero.png");
        let result = evaluate_open_graph(&context(&html)).unwrap();
        assert_eq!(result.status, Status::Warn);
        assert_eq!(result.evidence["imageAbsolute"], json!(false));
    }

    #[test]
    fn test_twitter_card_passes() {
        let html = r#"<meta name="twitter:card" content="summary">"#;
        let result = evaluate_twitter(&context(html)).unwrap();
        assert_eq!(result.status, Status::Pass);
        assert_eq!(result.evidence["card"], json!("summary"));
    }

    #[test]
    fn test_missing_twitter_card_warns() {
        let result = evaluate_twitter(&context("<head></head>")).unwrap();
        assert_eq!(result.status, Status::Warn);
        assert_eq!(result.evidence["card"], json!(null));
    }
}

// src/checks/meta.rs
// =============================================================================
// Meta tag checks: description, robots directives, charset declaration.
//
// metaDescription banding (character count, trimmed):
//   pass  70-160 and the text differs from the title
//   warn  40-69 or 161-180
//   fail  absent, equal to the title (any length), or outside all ranges
//
// metaRobots: the meta tag takes precedence over the X-Robots-Tag header;
// either source carrying noindex or nofollow fails the check.
//
// charset: pass only when UTF-8 is declared, via <meta charset> or the
// http-equiv content-type form.
// =============================================================================

use serde_json::json;

use super::{ids, Check};
use crate::context::{text_of, DocumentContext};
use crate::report::{CheckResult, Evidence, Status};

pub fn evaluate_description(ctx: &DocumentContext) -> anyhow::Result<CheckResult> {
    let description = ctx.meta_content("description").filter(|d| !d.is_empty());
    let title = ctx
        .select_first("title")
        .map(|el| text_of(&el))
        .filter(|t| !t.is_empty());

    let mut evidence = Evidence::new();

    let (status, recommendation) = match &description {
        None => {
            evidence.insert("present".to_string(), json!(false));
            (
                Status::Fail,
                "Add a meta description of 70-160 characters summarizing the page.".to_string(),
            )
        }
        Some(description) => {
            let length = description.chars().count();
            let duplicates_title = title.as_deref() == Some(description.as_str());

            evidence.insert("present".to_string(), json!(true));
            evidence.insert("length".to_string(), json!(length));
            evidence.insert("text".to_string(), json!(description));
            evidence.insert("duplicatesTitle".to_string(), json!(duplicates_title));

            if duplicates_title {
                (
                    Status::Fail,
                    "The meta description repeats the title; write a distinct summary.".to_string(),
                )
            } else {
                match length {
                    70..=160 => (
                        Status::Pass,
                        "Meta description length is in the recommended 70-160 character range."
                            .to_string(),
                    ),
                    40..=69 | 161..=180 => (
                        Status::Warn,
                        format!(
                            "Meta description is {} characters; aim for 70-160.",
                            length
                        ),
                    ),
                    _ => (
                        Status::Fail,
                        format!(
                            "Meta description is {} characters, far outside the 70-160 range.",
                            length
                        ),
                    ),
                }
            }
        }
    };

    Ok(CheckResult {
        id: ids::META_DESCRIPTION,
        label: Check::MetaDescription.label(),
        status,
        evidence,
        recommendation,
        weight: 0,
    })
}

pub fn evaluate_robots(ctx: &DocumentContext) -> anyhow::Result<CheckResult> {
    // Meta tag wins; the header only counts when no tag is present.
    let (directives, source) = match ctx.meta_content("robots") {
        Some(content) => (Some(content), "meta"),
        None => match ctx.header("x-robots-tag") {
            Some(value) => (Some(value.to_string()), "header"),
            None => (None, "none"),
        },
    };

    let lowered = directives.as_deref().unwrap_or("").to_ascii_lowercase();
    let indexable = !lowered.contains("noindex");
    let followable = !lowered.contains("nofollow");

    let mut evidence = Evidence::new();
    evidence.insert("indexable".to_string(), json!(indexable));
    evidence.insert("followable".to_string(), json!(followable));
    evidence.insert("source".to_string(), json!(source));

    let (status, recommendation) = if indexable && followable {
        (
            Status::Pass,
            "No noindex or nofollow directive is blocking this page.".to_string(),
        )
    } else {
        let mut blocked = Vec::new();
        if !indexable {
            blocked.push("noindex");
        }
        if !followable {
            blocked.push("nofollow");
        }
        (
            Status::Fail,
            format!(
                "Remove the {} directive ({} source) if this page should rank.",
                blocked.join(" and "),
                source
            ),
        )
    };

    Ok(CheckResult {
        id: ids::META_ROBOTS,
        label: Check::MetaRobots.label(),
        status,
        evidence,
        recommendation,
        weight: 0,
    })
}

pub fn evaluate_charset(ctx: &DocumentContext) -> anyhow::Result<CheckResult> {
    let declared = declared_charset(ctx);
    let is_utf8 = declared
        .as_deref()
        .map(|c| c.eq_ignore_ascii_case("utf-8"))
        .unwrap_or(false);

    let mut evidence = Evidence::new();
    evidence.insert("declared".to_string(), json!(declared.is_some()));
    evidence.insert("charset".to_string(), json!(declared));

    let (status, recommendation) = if is_utf8 {
        (
            Status::Pass,
            "UTF-8 character encoding is declared.".to_string(),
        )
    } else {
        (
            Status::Warn,
            "Declare UTF-8 with <meta charset=\"utf-8\"> near the top of <head>.".to_string(),
        )
    };

    Ok(CheckResult {
        id: ids::CHARSET,
        label: Check::Charset.label(),
        status,
        evidence,
        recommendation,
        weight: 0,
    })
}

// Finds a charset declaration in either meta form.
fn declared_charset(ctx: &DocumentContext) -> Option<String> {
    for el in ctx.select_all("meta") {
        if let Some(charset) = el.value().attr("charset") {
            let charset = charset.trim();
            if !charset.is_empty() {
                return Some(charset.to_string());
            }
        }

        // <meta http-equiv="Content-Type" content="text/html; charset=utf-8">
        let is_content_type = el
            .value()
            .attr("http-equiv")
            .map(|h| h.trim().eq_ignore_ascii_case("content-type"))
            .unwrap_or(false);
        if is_content_type {
            if let Some(content) = el.value().attr("content") {
                if let Some(charset) = extract_charset_param(content) {
                    return Some(charset);
                }
            }
        }
    }
    None
}

fn extract_charset_param(content: &str) -> Option<String> {
    content.split(';').find_map(|part| {
        let part = part.trim();
        part.to_ascii_lowercase()
            .strip_prefix("charset=")
            .map(|_| part["charset=".len()..].trim().to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use url::Url;

    fn context(html: &str) -> DocumentContext {
        context_with_headers(html, HashMap::new())
    }

    fn context_with_headers(html: &str, headers: HashMap<String, String>) -> DocumentContext {
        DocumentContext::new(
            html.to_string(),
            Url::parse("https://example.com/").unwrap(),
            headers,
        )
    }

    #[test]
    fn test_absent_description_fails() {
        let ctx = context("<head><title>Some Page</title></head>");
        let result = evaluate_description(&ctx).unwrap();
        assert_eq!(result.status, Status::Fail);
        assert_eq!(result.evidence["present"], json!(false));
    }

    #[test]
    fn test_description_equal_to_title_fails_regardless_of_length() {
        let text = "A perfectly reasonable page summary that is long enough to pass the length band";
        let html = format!(
            "<head><title>{}</title><meta name=\"description\" content=\"{}\"></head>",
            text, text
        );
        let result = evaluate_description(&context(&html)).unwrap();
        assert_eq!(result.status, Status::Fail);
        assert_eq!(result.evidence["duplicatesTitle"], json!(true));
    }

    #[test]
    fn test_good_description_passes() {
        let description = "d".repeat(120);
        let html = format!(
            "<head><title>Different Title</title><meta name=\"description\" content=\"{}\"></head>",
            description
        );
        let result = evaluate_description(&context(&html)).unwrap();
        assert_eq!(result.status, Status::Pass);
        assert_eq!(result.evidence["length"], json!(120));
    }

    #[test]
    fn test_shortish_description_warns() {
        let description = "d".repeat(50);
        let html = format!("<meta name=\"description\" content=\"{}\">", description);
        let result = evaluate_description(&context(&html)).unwrap();
        assert_eq!(result.status, Status::Warn);
    }

    #[test]
    fn test_tiny_description_fails() {
        let html = "<meta name=\"description\" content=\"too short\">";
        let result = evaluate_description(&context(html)).unwrap();
        assert_eq!(result.status, Status::Fail);
    }

    #[test]
    fn test_no_robots_tag_passes() {
        let result = evaluate_robots(&context("<head></head>")).unwrap();
        assert_eq!(result.status, Status::Pass);
        assert_eq!(result.evidence["indexable"], json!(true));
        assert_eq!(result.evidence["followable"], json!(true));
        assert_eq!(result.evidence["source"], json!("none"));
    }

    #[test]
    fn test_noindex_tag_fails() {
        let html = "<meta name=\"robots\" content=\"noindex,follow\">";
        let result = evaluate_robots(&context(html)).unwrap();
        assert_eq!(result.status, Status::Fail);
        assert_eq!(result.evidence["indexable"], json!(false));
        assert_eq!(result.evidence["followable"], json!(true));
    }

    #[test]
    fn test_nofollow_tag_fails() {
        let html = "<meta name=\"robots\" content=\"index,nofollow\">";
        let result = evaluate_robots(&context(html)).unwrap();
        assert_eq!(result.status, Status::Fail);
        assert_eq!(result.evidence["followable"], json!(false));
    }

    #[test]
    fn test_robots_header_applies_without_tag() {
        let mut headers = HashMap::new();
        headers.insert("x-robots-tag".to_string(), "noindex".to_string());
        let result = evaluate_robots(&context_with_headers("<head></head>", headers)).unwrap();
        assert_eq!(result.status, Status::Fail);
        assert_eq!(result.evidence["indexable"], json!(false));
        assert_eq!(result.evidence["source"], json!("header"));
    }

    #[test]
    fn test_meta_tag_takes_precedence_over_header() {
        let mut headers = HashMap::new();
        headers.insert("x-robots-tag".to_string(), "noindex".to_string());
        let html = "<meta name=\"robots\" content=\"index,follow\">";
        let result = evaluate_robots(&context_with_headers(html, headers)).unwrap();
        assert_eq!(result.status, Status::Pass);
        assert_eq!(result.evidence["source"], json!("meta"));
    }

    #[test]
    fn test_meta_charset_passes() {
        let result = evaluate_charset(&context("<meta charset=\"UTF-8\">")).unwrap();
        assert_eq!(result.status, Status::Pass);
    }

    #[test]
    fn test_http_equiv_charset_passes() {
        let html = "<meta http-equiv=\"Content-Type\" content=\"text/html; charset=utf-8\">";
        let result = evaluate_charset(&context(html)).unwrap();
        assert_eq!(result.status, Status::Pass);
    }

    #[test]
    fn test_missing_charset_warns() {
        let result = evaluate_charset(&context("<head></head>")).unwrap();
        assert_eq!(result.status, Status::Warn);
        assert_eq!(result.evidence["declared"], json!(false));
    }

    #[test]
    fn test_non_utf8_charset_warns() {
        let result = evaluate_charset(&context("<meta charset=\"iso-8859-1\">")).unwrap();
        assert_eq!(result.status, Status::Warn);
        assert_eq!(result.evidence["charset"], json!("iso-8859-1"));
    }
}

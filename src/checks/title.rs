// src/checks/title.rs
// =============================================================================
// Title tag check.
//
// Banding (character count of the trimmed title text):
//   pass  30-65
//   warn  1-29 or 66-70
//   fail  absent (or empty) or over 70
// =============================================================================

use serde_json::json;

use super::{ids, Check};
use crate::context::{text_of, DocumentContext};
use crate::report::{CheckResult, Evidence, Status};

pub fn evaluate(ctx: &DocumentContext) -> anyhow::Result<CheckResult> {
    let text = ctx
        .select_first("title")
        .map(|el| text_of(&el))
        .filter(|t| !t.is_empty());

    let mut evidence = Evidence::new();

    let (status, recommendation) = match &text {
        None => {
            evidence.insert("present".to_string(), json!(false));
            (
                Status::Fail,
                "Add a <title> tag of 30-65 characters describing the page.".to_string(),
            )
        }
        Some(text) => {
            let length = text.chars().count();
            evidence.insert("present".to_string(), json!(true));
            evidence.insert("length".to_string(), json!(length));
            evidence.insert("text".to_string(), json!(text));

            match length {
                30..=65 => (
                    Status::Pass,
                    "Title length is in the recommended 30-65 character range.".to_string(),
                ),
                1..=29 => (
                    Status::Warn,
                    format!(
                        "Title is only {} characters; aim for 30-65 to use the available space.",
                        length
                    ),
                ),
                66..=70 => (
                    Status::Warn,
                    format!("Title is {} characters; trim it to 65 or fewer.", length),
                ),
                _ => (
                    Status::Fail,
                    format!(
                        "Title is {} characters and will be truncated in results; shorten it to 30-65.",
                        length
                    ),
                ),
            }
        }
    };

    Ok(CheckResult {
        id: ids::TITLE,
        label: Check::Title.label(),
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
    fn test_good_length_passes() {
        let ctx = context("<title>Perfect Title Length for SEO Optimization</title>");
        let result = evaluate(&ctx).unwrap();
        assert_eq!(result.status, Status::Pass);
        assert_eq!(result.evidence["present"], json!(true));
    }

    #[test]
    fn test_short_title_warns() {
        let ctx = context("<title>Short</title>");
        let result = evaluate(&ctx).unwrap();
        assert_eq!(result.status, Status::Warn);
        assert_eq!(result.evidence["length"], json!(5));
    }

    #[test]
    fn test_absent_title_fails() {
        let ctx = context("<html><head></head><body></body></html>");
        let result = evaluate(&ctx).unwrap();
        assert_eq!(result.status, Status::Fail);
        assert_eq!(result.evidence["present"], json!(false));
    }

    #[test]
    fn test_empty_title_counts_as_absent() {
        let ctx = context("<title>   </title>");
        let result = evaluate(&ctx).unwrap();
        assert_eq!(result.status, Status::Fail);
        assert_eq!(result.evidence["present"], json!(false));
    }

    #[test]
    fn test_overlong_title_fails() {
        let long = "x".repeat(80);
        let ctx = context(&format!("<title>{}</title>", long));
        let result = evaluate(&ctx).unwrap();
        assert_eq!(result.status, Status::Fail);
        assert_eq!(result.evidence["length"], json!(80));
    }

    #[test]
    fn test_slightly_long_title_warns() {
        let text = "y".repeat(68);
        let ctx = context(&format!("<title>{}</title>", text));
        let result = evaluate(&ctx).unwrap();
        assert_eq!(result.status, Status::Warn);
    }
}

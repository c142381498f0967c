// src/checks/headings.rs
// =============================================================================
// Heading checks.
//
// h1: exactly one H1 passes; zero or several fail.
//
// headings: the outline is read in document order; a heading that sits
// more than one level below its predecessor (e.g. an H2 followed directly
// by an H4) is a gap and fails the check. Starting below H1 is not
// flagged - only downward jumps between consecutive headings are.
// =============================================================================

use serde_json::json;

use super::{ids, Check};
use crate::context::{text_of, DocumentContext};
use crate::report::{CheckResult, Evidence, Status};

pub fn evaluate_h1(ctx: &DocumentContext) -> anyhow::Result<CheckResult> {
    let texts: Vec<String> = ctx
        .select_all("h1")
        .iter()
        .map(text_of)
        .collect();

    let mut evidence = Evidence::new();
    evidence.insert("count".to_string(), json!(texts.len()));
    evidence.insert("texts".to_string(), json!(texts));

    let (status, recommendation) = match texts.len() {
        1 => (
            Status::Pass,
            "The page has exactly one H1.".to_string(),
        ),
        0 => (
            Status::Fail,
            "Add one H1 heading describing the page's main topic.".to_string(),
        ),
        n => (
            Status::Fail,
            format!("The page has {} H1 headings; keep exactly one.", n),
        ),
    };

    Ok(CheckResult {
        id: ids::H1,
        label: Check::H1.label(),
        status,
        evidence,
        recommendation,
        weight: 0,
    })
}

pub fn evaluate_outline(ctx: &DocumentContext) -> anyhow::Result<CheckResult> {
    // select() walks the tree in document order, so the multi-selector
    // gives us the outline as a reader would encounter it
    let levels: Vec<u8> = ctx
        .select_all("h1, h2, h3, h4, h5, h6")
        .iter()
        .filter_map(|el| heading_level(el.value().name()))
        .collect();

    let outline: Vec<String> = levels.iter().map(|l| format!("h{}", l)).collect();
    let gaps = find_gaps(&levels);

    let mut evidence = Evidence::new();
    evidence.insert("outline".to_string(), json!(outline));
    evidence.insert("gaps".to_string(), json!(gaps));

    let (status, recommendation) = if gaps.is_empty() {
        (
            Status::Pass,
            "Heading levels descend without gaps.".to_string(),
        )
    } else {
        (
            Status::Fail,
            format!(
                "Heading levels skip: {}. Use the next level down instead of jumping.",
                gaps.join(", ")
            ),
        )
    };

    Ok(CheckResult {
        id: ids::HEADINGS,
        label: Check::Headings.label(),
        status,
        evidence,
        recommendation,
        weight: 0,
    })
}

fn heading_level(tag: &str) -> Option<u8> {
    match tag {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

// A gap is a consecutive pair where the level drops more than one step,
// e.g. h2 -> h4.
fn find_gaps(levels: &[u8]) -> Vec<String> {
    levels
        .windows(2)
        .filter(|pair| pair[1] > pair[0] + 1)
        .map(|pair| format!("h{}->h{}", pair[0], pair[1]))
        .collect()
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
    fn test_single_h1_passes() {
        let result = evaluate_h1(&context("<h1>Main Topic</h1>")).unwrap();
        assert_eq!(result.status, Status::Pass);
        assert_eq!(result.evidence["count"], json!(1));
    }

    #[test]
    fn test_missing_h1_fails() {
        let result = evaluate_h1(&context("<h2>Not a main heading</h2>")).unwrap();
        assert_eq!(result.status, Status::Fail);
        assert_eq!(result.evidence["count"], json!(0));
    }

    #[test]
    fn test_multiple_h1_fails() {
        let result = evaluate_h1(&context("<h1>One</h1><h1>Two</h1>")).unwrap();
        assert_eq!(result.status, Status::Fail);
        assert_eq!(result.evidence["count"], json!(2));
    }

    #[test]
    fn test_clean_outline_passes() {
        let html = "<h1>A</h1><h2>B</h2><h3>C</h3><h2>D</h2>";
        let result = evaluate_outline(&context(html)).unwrap();
        assert_eq!(result.status, Status::Pass);
    }

    #[test]
    fn test_skipped_level_fails() {
        let html = "<h1>A</h1><h2>B</h2><h4>C</h4>";
        let result = evaluate_outline(&context(html)).unwrap();
        assert_eq!(result.status, Status::Fail);
        assert_eq!(result.evidence["gaps"], json!(["h2->h4"]));
    }

    #[test]
    fn test_moving_back_up_is_not_a_gap() {
        let html = "<h1>A</h1><h2>B</h2><h3>C</h3><h1>D</h1>";
        let result = evaluate_outline(&context(html)).unwrap();
        assert_eq!(result.status, Status::Pass);
    }

    #[test]
    fn test_no_headings_passes() {
        let result = evaluate_outline(&context("<p>Just text</p>")).unwrap();
        assert_eq!(result.status, Status::Pass);
        assert_eq!(result.evidence["outline"], json!([]));
    }
}

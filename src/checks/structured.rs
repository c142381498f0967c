// src/checks/structured.rs
// =============================================================================
// Structured data (JSON-LD) check.
//
// Parses every <script type="application/ld+json"> block and validates
// the required field for the entity types we know:
//   Organization, WebSite -> name
//   Article              -> headline
//   Product              -> name
//
//   fail  a required field is missing on a known type
//   warn  a block failed to parse (and no required-field errors)
//   pass  everything parsed and required fields are present
//
// Blocks may hold a single entity, an array of entities, or an @graph.
// =============================================================================

use serde_json::{json, Value};

use super::{ids, Check};
use crate::context::DocumentContext;
use crate::report::{CheckResult, Evidence, Status};

pub fn evaluate(ctx: &DocumentContext) -> anyhow::Result<CheckResult> {
    let blocks: Vec<String> = ctx
        .select_all("script")
        .into_iter()
        .filter(|el| {
            el.value()
                .attr("type")
                .map(|t| t.trim().eq_ignore_ascii_case("application/ld+json"))
                .unwrap_or(false)
        })
        .map(|el| el.text().collect::<String>())
        .collect();

    let mut types: Vec<String> = Vec::new();
    let mut parse_errors: Vec<String> = Vec::new();
    let mut field_errors: Vec<String> = Vec::new();

    for (index, block) in blocks.iter().enumerate() {
        match serde_json::from_str::<Value>(block) {
            Err(error) => {
                parse_errors.push(format!("block {}: {}", index + 1, error));
            }
            Ok(value) => {
                for entity in entities_of(&value) {
                    for entity_type in types_of(entity) {
                        types.push(entity_type.clone());
                        if let Some(field) = required_field(&entity_type) {
                            let present = entity
                                .get(field)
                                .and_then(Value::as_str)
                                .map(|v| !v.trim().is_empty())
                                .unwrap_or(false);
                            if !present {
                                field_errors.push(format!(
                                    "{} is missing required field '{}'",
                                    entity_type, field
                                ));
                            }
                        }
                    }
                }
            }
        }
    }

    let mut evidence = Evidence::new();
    evidence.insert("blocks".to_string(), json!(blocks.len()));
    evidence.insert("types".to_string(), json!(types));
    let errors: Vec<&String> = field_errors.iter().chain(parse_errors.iter()).collect();
    evidence.insert("errors".to_string(), json!(errors));

    let (status, recommendation) = if !field_errors.is_empty() {
        (
            Status::Fail,
            format!("Fix the structured data: {}.", field_errors.join("; ")),
        )
    } else if !parse_errors.is_empty() {
        (
            Status::Warn,
            "A JSON-LD block does not parse; validate it with a structured-data tester."
                .to_string(),
        )
    } else {
        (
            Status::Pass,
            "Structured data parses and required fields are present.".to_string(),
        )
    };

    Ok(CheckResult {
        id: ids::STRUCTURED_DATA,
        label: Check::StructuredData.label(),
        status,
        evidence,
        recommendation,
        weight: 0,
    })
}

// Flattens a JSON-LD value into the entities it describes.
fn entities_of(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().flat_map(entities_of).collect(),
        Value::Object(map) => {
            let mut entities = vec![value];
            if let Some(Value::Array(graph)) = map.get("@graph") {
                entities.extend(graph.iter().filter(|v| v.is_object()));
            }
            entities
        }
        _ => Vec::new(),
    }
}

// @type may be a string or an array of strings.
fn types_of(entity: &Value) -> Vec<String> {
    match entity.get("@type") {
        Some(Value::String(t)) => vec![t.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    }
}

fn required_field(entity_type: &str) -> Option<&'static str> {
    match entity_type {
        "Organization" | "WebSite" => Some("name"),
        "Article" => Some("headline"),
        "Product" => Some("name"),
        _ => None,
    }
}

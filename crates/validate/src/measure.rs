//! Checks for measure definition documents.

use serde_json::Value;

use factorbase_core::FactorGroup;

pub const REQUIRED_FIELDS: &[&str] = &[
    "measure_id",
    "measure_name",
    "display_name",
    "factor",
    "description",
];

/// Fields owned by the retrieval layer. A conceptual measure must not carry them.
pub const RETRIEVAL_FIELDS: &[&str] = &["data_source", "frequency"];

/// Field-level checks that need nothing but the document itself.
pub fn check_measure(doc: &Value) -> Vec<String> {
    let Some(obj) = doc.as_object() else {
        return vec!["document must be a JSON object".to_string()];
    };
    let mut errors = Vec::new();

    for field in REQUIRED_FIELDS {
        if !obj.contains_key(*field) {
            errors.push(format!("Missing required field '{field}'"));
        }
    }

    for field in RETRIEVAL_FIELDS {
        if obj.contains_key(*field) {
            errors.push(format!(
                "Field '{field}' belongs to the retrieval layer and is not allowed here"
            ));
        }
    }

    match obj.get("formula") {
        None => {}
        Some(Value::Object(formula)) => {
            if !formula.contains_key("type") {
                errors.push("formula is missing 'type'".to_string());
            }
        }
        Some(_) => errors.push("formula must be an object".to_string()),
    }

    errors
}

/// Cross-check a measure against the index entry that points at its file.
pub fn check_measure_filing(doc: &Value, group: &FactorGroup, listed_id: &str) -> Vec<String> {
    let mut errors = Vec::new();

    if let Some(factor) = doc.get("factor").and_then(Value::as_str) {
        if !factor.eq_ignore_ascii_case(&group.factor) {
            errors.push(format!(
                "factor '{}' does not match index group '{}'",
                factor, group.factor
            ));
        }
    }

    if let Some(id) = doc.get("measure_id").and_then(Value::as_str) {
        if id != listed_id {
            errors.push(format!(
                "measure_id '{id}' does not match index entry '{listed_id}'"
            ));
        }
    }

    errors
}

/// `original_paper_id` must point at an existing paper when set.
pub fn check_measure_references(doc: &Value, paper_exists: impl Fn(&str) -> bool) -> Vec<String> {
    match doc.get("original_paper_id") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::String(id)) if id.is_empty() => Vec::new(),
        Some(Value::String(id)) => {
            if paper_exists(id) {
                Vec::new()
            } else {
                vec![format!("Referenced paper does not exist: {id}")]
            }
        }
        Some(_) => vec!["'original_paper_id' must be a string".to_string()],
    }
}

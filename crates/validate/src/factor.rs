//! Factor taxonomy (`factors.json`) checks.

use std::collections::HashSet;

use serde_json::Value;

use factorbase_core::utils::{is_blank, parse_date};
use factorbase_core::Style;

use crate::report::Findings;

const REQUIRED_FIELDS: &[&str] = &["factor_id", "factor_name", "style", "description"];
const METADATA_FIELDS: &[&str] = &["version", "last_updated", "description"];
const LANGUAGES: &[&str] = &["en", "zh"];

/// Check the whole taxonomy document. Every factor is inspected even after
/// earlier ones fail.
pub fn check_taxonomy(doc: &Value) -> Findings {
    let mut findings = Findings::default();

    let Some(obj) = doc.as_object() else {
        findings.errors.push("document must be a JSON object".to_string());
        return findings;
    };

    match obj.get("metadata") {
        None => findings.errors.push("Missing 'metadata' key".to_string()),
        Some(meta) => check_metadata(meta, &mut findings),
    }

    let factors = match obj.get("factors") {
        None => {
            findings.errors.push("Missing 'factors' key".to_string());
            return findings;
        }
        Some(Value::Array(list)) => list,
        Some(_) => {
            findings.errors.push("'factors' should be a list".to_string());
            return findings;
        }
    };

    if factors.is_empty() {
        findings.errors.push("'factors' list is empty".to_string());
        return findings;
    }

    let mut seen_ids = HashSet::new();
    let mut seen_names = HashSet::new();

    for (idx, factor) in factors.iter().enumerate() {
        let idx = idx + 1;
        let Some(entry) = factor.as_object() else {
            findings.errors.push(format!("Factor {idx}: must be an object"));
            continue;
        };

        let missing: Vec<&str> = REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|f| !entry.contains_key(*f))
            .collect();
        if !missing.is_empty() {
            findings.errors.push(format!(
                "Factor {idx}: missing required fields: {}",
                missing.join(", ")
            ));
            continue;
        }

        match entry["factor_id"].as_i64() {
            Some(id) => {
                if !seen_ids.insert(id) {
                    findings.errors.push(format!("Factor {idx}: duplicate factor_id {id}"));
                }
            }
            None => findings
                .errors
                .push(format!("Factor {idx}: factor_id should be an integer")),
        }

        let name = match entry["factor_name"].as_str() {
            Some(n) if !n.is_empty() => {
                if !seen_names.insert(n.to_string()) {
                    findings
                        .errors
                        .push(format!("Factor {idx}: duplicate factor_name '{n}'"));
                }
                n
            }
            _ => {
                findings
                    .errors
                    .push(format!("Factor {idx}: factor_name should be a non-empty string"));
                "?"
            }
        };

        let style = &entry["style"];
        if style.as_str().and_then(|s| s.parse::<Style>().ok()).is_none() {
            let shown = style
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| style.to_string());
            findings.errors.push(format!(
                "Factor {idx} ({name}): invalid style '{shown}', must be one of [{}]",
                Style::ALL.join(", ")
            ));
        }

        match entry["description"].as_object() {
            None => findings
                .errors
                .push(format!("Factor {idx} ({name}): description should be an object")),
            Some(desc) => {
                let missing: Vec<&str> = LANGUAGES
                    .iter()
                    .copied()
                    .filter(|lang| desc.get(*lang).map_or(true, is_blank))
                    .collect();
                if !missing.is_empty() {
                    findings.errors.push(format!(
                        "Factor {idx} ({name}): description needs non-empty {}",
                        missing.join(" and ")
                    ));
                }
            }
        }
    }

    findings
}

fn check_metadata(meta: &Value, findings: &mut Findings) {
    let Some(meta) = meta.as_object() else {
        findings.errors.push("'metadata' should be an object".to_string());
        return;
    };
    let missing: Vec<&str> = METADATA_FIELDS
        .iter()
        .copied()
        .filter(|f| !meta.contains_key(*f))
        .collect();
    if !missing.is_empty() {
        findings
            .warnings
            .push(format!("metadata missing optional fields: {}", missing.join(", ")));
    }
    if let Some(updated) = meta.get("last_updated").and_then(Value::as_str) {
        if parse_date(updated).is_none() {
            findings
                .warnings
                .push(format!("metadata last_updated '{updated}' is not a YYYY-MM-DD date"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn taxonomy() -> Value {
        json!({
            "metadata": {
                "version": "1.0",
                "last_updated": "2024-06-01",
                "description": "FactorBase taxonomy"
            },
            "factors": [
                {"factor_id": 1, "factor_name": "Value", "style": "Style",
                 "description": {"en": "Cheap vs expensive", "zh": "價值"}},
                {"factor_id": 2, "factor_name": "Profitability", "style": "Quality",
                 "description": {"en": "Profitable firms", "zh": "獲利能力"}}
            ]
        })
    }

    #[test]
    fn valid_taxonomy_passes() {
        let findings = check_taxonomy(&taxonomy());
        assert!(findings.errors.is_empty());
        assert!(findings.warnings.is_empty());
    }

    #[test]
    fn invalid_style_names_the_factor() {
        let mut doc = taxonomy();
        doc["factors"][0]["style"] = json!("Growth");
        let findings = check_taxonomy(&doc);
        assert_eq!(findings.errors.len(), 1);
        assert!(findings.errors[0].contains("(Value)"));
        assert!(findings.errors[0].contains("invalid style 'Growth'"));
    }

    #[test]
    fn all_factor_problems_are_collected() {
        let mut doc = taxonomy();
        doc["factors"][0]["factor_id"] = json!("one");
        doc["factors"][1]["description"] = json!({"en": "Profitable firms", "zh": ""});
        doc["factors"].as_array_mut().unwrap().push(json!({"factor_id": 3}));
        let findings = check_taxonomy(&doc);
        assert_eq!(findings.errors.len(), 3);
        assert!(findings.errors[0].starts_with("Factor 1: factor_id"));
        assert!(findings.errors[1].contains("non-empty zh"));
        assert!(findings.errors[2].contains("factor_name, style, description"));
    }

    #[test]
    fn duplicates_are_errors() {
        let mut doc = taxonomy();
        doc["factors"][1]["factor_id"] = json!(1);
        doc["factors"][1]["factor_name"] = json!("Value");
        let findings = check_taxonomy(&doc);
        assert_eq!(findings.errors.len(), 2);
    }

    #[test]
    fn empty_or_missing_factor_list() {
        let mut doc = taxonomy();
        doc["factors"] = json!([]);
        assert_eq!(check_taxonomy(&doc).errors, vec!["'factors' list is empty".to_string()]);

        doc.as_object_mut().unwrap().remove("factors");
        assert_eq!(check_taxonomy(&doc).errors, vec!["Missing 'factors' key".to_string()]);
    }

    #[test]
    fn metadata_gaps_only_warn() {
        let mut doc = taxonomy();
        doc["metadata"] = json!({"last_updated": "June 2024"});
        let findings = check_taxonomy(&doc);
        assert!(findings.errors.is_empty());
        assert_eq!(findings.warnings.len(), 2);
    }
}

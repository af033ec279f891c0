//! Field-level checks for paper metadata documents.

use serde_json::Value;

use factorbase_config::PaperIdRule;
use factorbase_core::utils::is_blank;
use factorbase_core::{ConclusionSign, Replicable};

pub const REQUIRED_FIELDS: &[&str] = &[
    "paper_id",
    "title",
    "authors",
    "year",
    "journal",
    "market",
    "asset_class",
    "abstract",
    "conclusion_sign",
    "replicable",
    "notes",
];

/// Fields that may be present but empty.
const MAY_BE_EMPTY: &[&str] = &["notes"];

const PAPER_ID_PREFIX: &str = "paper_";

/// Check one paper document, returning every problem found.
pub fn check_paper(doc: &Value, id_rule: PaperIdRule) -> Vec<String> {
    let Some(obj) = doc.as_object() else {
        return vec!["document must be a JSON object".to_string()];
    };
    let mut errors = Vec::new();

    for field in REQUIRED_FIELDS {
        match obj.get(*field) {
            None => errors.push(format!("Missing required field '{field}'")),
            Some(v) if is_blank(v) && !MAY_BE_EMPTY.contains(field) => {
                errors.push(format!("Field '{field}' is empty"));
            }
            _ => {}
        }
    }

    if let Some(id) = obj.get("paper_id").filter(|v| !is_blank(v)) {
        match id_rule {
            PaperIdRule::Integer => {
                if !id.is_i64() {
                    errors.push("'paper_id' must be an integer".to_string());
                }
            }
            PaperIdRule::Prefixed => match id.as_str() {
                Some(s) if s.starts_with(PAPER_ID_PREFIX) => {}
                _ => errors.push(format!("'paper_id' must start with '{PAPER_ID_PREFIX}'")),
            },
        }
    }

    if let Some(year) = obj.get("year").filter(|v| !is_blank(v)) {
        if !year.is_i64() {
            errors.push("'year' must be an integer".to_string());
        }
    }

    if let Some(sign) = obj.get("conclusion_sign").filter(|v| !is_blank(v)) {
        let ok = sign
            .as_str()
            .map_or(false, |s| s.parse::<ConclusionSign>().is_ok());
        if !ok {
            errors.push(format!(
                "'conclusion_sign' must be one of [{}]",
                ConclusionSign::ALL.join(", ")
            ));
        }
    }

    if let Some(rep) = obj.get("replicable").filter(|v| !is_blank(v)) {
        let ok = rep.as_str().map_or(false, |s| s.parse::<Replicable>().is_ok());
        if !ok {
            errors.push(format!(
                "'replicable' must be one of [{}]",
                Replicable::ALL.join(", ")
            ));
        }
    }

    errors
}

//! Paper–measure relation file checks, including referential integrity.

use std::collections::BTreeSet;

use serde_json::Value;

use factorbase_core::{MeasureIndex, LINKS_KEY};

use crate::report::Findings;

/// Check the relation document.
///
/// Ids are gathered from every link first and only then resolved, so each
/// dangling reference is reported once regardless of how many links use it.
/// Without a measure index the measure side of the cross-check is skipped.
pub fn check_relations(
    doc: &Value,
    paper_exists: impl Fn(&str) -> bool,
    measure_index: Option<&MeasureIndex>,
) -> Findings {
    let mut findings = Findings::default();

    let links = match doc.get(LINKS_KEY) {
        Some(Value::Array(links)) => links,
        Some(_) => {
            findings.errors.push(format!("'{LINKS_KEY}' must be an array"));
            return findings;
        }
        None => {
            findings.errors.push(format!("Missing '{LINKS_KEY}' array"));
            return findings;
        }
    };

    let mut paper_ids = BTreeSet::new();
    let mut measure_ids = BTreeSet::new();

    for (i, link) in links.iter().enumerate() {
        if !link.is_object() {
            findings.errors.push(format!("link[{i}] must be an object"));
            continue;
        }
        for (key, bucket) in [("paper_id", &mut paper_ids), ("measure_id", &mut measure_ids)] {
            match link.get(key) {
                None => findings.errors.push(format!("link[{i}] is missing {key}")),
                Some(Value::String(id)) => {
                    bucket.insert(id.clone());
                }
                Some(_) => findings.errors.push(format!("link[{i}] {key} must be a string")),
            }
        }
    }

    for paper_id in &paper_ids {
        if !paper_exists(paper_id) {
            findings
                .errors
                .push(format!("Referenced paper does not exist: {paper_id}"));
        }
    }

    match measure_index {
        Some(index) => {
            let known: BTreeSet<&str> = index.measure_ids().collect();
            for measure_id in &measure_ids {
                if !known.contains(measure_id.as_str()) {
                    findings
                        .errors
                        .push(format!("Referenced measure does not exist: {measure_id}"));
                }
            }
        }
        None => findings
            .warnings
            .push("measure index not found; measure references were not checked".to_string()),
    }

    findings
}

//! Whole-store validation runs.
//!
//! A file that fails to load becomes a failed result; the run always goes on
//! to the next file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};

use factorbase_config::PaperIdRule;
use factorbase_core::{FactorGroup, KbError, MeasureIndex, Result};
use factorbase_store::{load_value, DocumentStore};

use crate::factor::check_taxonomy;
use crate::measure::{check_measure, check_measure_filing, check_measure_references};
use crate::paper::check_paper;
use crate::relation::check_relations;
use crate::report::ValidationResult;
use crate::schema::SchemaSet;

pub struct Validator<'a> {
    store: &'a DocumentStore,
    id_rule: PaperIdRule,
    schemas: SchemaSet,
}

impl<'a> Validator<'a> {
    pub fn new(store: &'a DocumentStore, id_rule: PaperIdRule, schemas: SchemaSet) -> Self {
        Self {
            store,
            id_rule,
            schemas,
        }
    }

    /// Load a document, turning load failures into a failed result.
    fn load(path: &Path) -> std::result::Result<Value, ValidationResult> {
        load_value(path).map_err(|e| ValidationResult::with_errors(path, vec![load_failure(e)]))
    }

    // ── Papers ──────────────────────────────────────────────────────

    pub fn validate_paper_file(&self, path: &Path) -> ValidationResult {
        let doc = match Self::load(path) {
            Ok(doc) => doc,
            Err(failed) => return failed,
        };
        let mut errors = check_paper(&doc, self.id_rule);
        if let Some(schema) = &self.schemas.paper {
            errors.extend(schema.check(&doc));
        }
        ValidationResult::with_errors(path, errors)
    }

    pub fn validate_all_papers(&self) -> Result<Vec<ValidationResult>> {
        let files = self.store.paper_files()?;
        info!(count = files.len(), "validating papers");
        Ok(files.iter().map(|p| self.validate_paper_file(p)).collect())
    }

    // ── Measures ────────────────────────────────────────────────────

    /// `group` and `listed_id` come from the measure index entry pointing at
    /// this file, when there is one.
    pub fn validate_measure_file(
        &self,
        path: &Path,
        listing: Option<(&FactorGroup, &str)>,
    ) -> ValidationResult {
        let doc = match Self::load(path) {
            Ok(doc) => doc,
            Err(failed) => return failed,
        };
        let mut result = ValidationResult::new(path);
        result.errors.extend(check_measure(&doc));
        match listing {
            Some((group, listed_id)) => {
                result.errors.extend(check_measure_filing(&doc, group, listed_id));
            }
            None => result
                .warnings
                .push("not listed in the measure index".to_string()),
        }
        result
            .errors
            .extend(check_measure_references(&doc, |id| self.store.paper_exists(id)));
        if let Some(schema) = &self.schemas.measure {
            result.errors.extend(schema.check(&doc));
        }
        result
    }

    /// An unreadable measure index is reported as a failed result of its own;
    /// the measure files are then checked without filing information.
    pub fn validate_all_measures(&self) -> Result<Vec<ValidationResult>> {
        let files = self.store.measure_files()?;
        info!(count = files.len(), "validating measures");

        let mut results = Vec::with_capacity(files.len() + 1);
        let index = match self.store.measure_index() {
            Ok(index) => index.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "measure index unreadable, skipping filing checks");
                let path = self.store.measure_index_path();
                results.push(ValidationResult::with_errors(path, vec![load_failure(e)]));
                MeasureIndex::default()
            }
        };
        let listings = listings_by_path(self.store, &index);

        results.extend(files.iter().map(|(factor_dir, path)| {
            debug!(factor_dir = %factor_dir, path = %path.display(), "checking measure");
            let listing = listings
                .get(path)
                .map(|(group_idx, id)| (&index.factors[*group_idx], id.as_str()));
            self.validate_measure_file(path, listing)
        }));
        Ok(results)
    }

    // ── Relations ───────────────────────────────────────────────────

    /// Empty when the relation file does not exist yet.
    pub fn validate_relations(&self) -> Result<Vec<ValidationResult>> {
        let path = self.store.relations_path();
        if !path.exists() {
            warn!(path = %path.display(), "relation file does not exist");
            return Ok(Vec::new());
        }
        let doc = match Self::load(path) {
            Ok(doc) => doc,
            Err(failed) => return Ok(vec![failed]),
        };
        let index = match self.store.measure_index() {
            Ok(index) => index,
            Err(e) => {
                warn!(error = %e, "measure index unreadable, skipping measure references");
                None
            }
        };
        let mut result = ValidationResult::new(path);
        result.absorb(check_relations(
            &doc,
            |id| self.store.paper_exists(id),
            index.as_ref(),
        ));
        if let Some(schema) = &self.schemas.relation {
            result.errors.extend(schema.check(&doc));
        }
        Ok(vec![result])
    }

    // ── Factor taxonomy ─────────────────────────────────────────────

    pub fn validate_factors(&self) -> ValidationResult {
        let path = self.store.factors_path();
        let doc = match Self::load(path) {
            Ok(doc) => doc,
            Err(failed) => return failed,
        };
        let mut result = ValidationResult::new(path);
        result.absorb(check_taxonomy(&doc));
        result
    }
}

fn load_failure(err: KbError) -> String {
    match err {
        KbError::Malformed { message, .. } => format!("Invalid JSON - {message}"),
        KbError::NotFound(_) => "File not found".to_string(),
        other => format!("Error loading file - {other}"),
    }
}

/// Measure file path -> (group position, listed measure id).
fn listings_by_path(store: &DocumentStore, index: &MeasureIndex) -> HashMap<PathBuf, (usize, String)> {
    let mut map = HashMap::new();
    for (group_idx, group) in index.factors.iter().enumerate() {
        for summary in &group.measures {
            map.insert(
                store.measure_file(&summary.file),
                (group_idx, summary.measure_id.clone()),
            );
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ValidationSummary;
    use serde_json::json;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, value: &Value) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    }

    fn paper(id: &str) -> Value {
        json!({
            "paper_id": id, "title": "T", "authors": "A", "year": 2001,
            "journal": "J", "market": "US", "asset_class": "Equity",
            "abstract": "x", "conclusion_sign": "none", "replicable": "unknown", "notes": ""
        })
    }

    fn make_store() -> (TempDir, DocumentStore) {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "papers/metadata/paper_001.json", &paper("paper_001"));
        write(root, "papers/metadata/paper_002.json", &json!({"paper_id": "paper_002"}));
        std::fs::write(root.join("papers/metadata/paper_003.json"), "{ broken").unwrap();
        write(root, "papers/metadata/paper_004.json", &paper("paper_004"));

        write(root, "measures/index.json", &json!({"factors": [
            {"factor": "Value", "count": 2, "measures": [
                {"measure_id": "BM", "file": "value/BM.json", "original_paper_id": "paper_001"},
                {"measure_id": "EP", "file": "value/EP.json"}
            ]}
        ]}));
        write(root, "measures/value/BM.json", &json!({
            "measure_id": "BM", "measure_name": "bm", "display_name": "B/M",
            "factor": "Value", "description": "d", "formula": {"type": "ratio"},
            "original_paper_id": "paper_001"
        }));
        write(root, "measures/value/EP.json", &json!({
            "measure_id": "EP", "measure_name": "ep", "display_name": "E/P",
            "factor": "Value", "description": "d", "data_source": "compustat"
        }));
        write(root, "measures/value/ORPHAN.json", &json!({
            "measure_id": "ORPHAN", "measure_name": "o", "display_name": "O",
            "factor": "Value", "description": "d"
        }));

        let store = DocumentStore::at(root).unwrap();
        (temp, store)
    }

    #[test]
    fn all_papers_are_checked_despite_failures() {
        let (_temp, store) = make_store();
        let validator = Validator::new(&store, PaperIdRule::Prefixed, SchemaSet::none());
        let results = validator.validate_all_papers().unwrap();
        assert_eq!(results.len(), 4);
        assert!(results[0].is_valid());
        assert!(!results[1].is_valid());
        assert!(results[2].errors[0].starts_with("Invalid JSON"));
        assert!(results[3].is_valid());
        assert_eq!(
            ValidationSummary::from_results(&results),
            ValidationSummary { total: 4, passed: 2, failed: 2 }
        );
    }

    #[test]
    fn measures_are_checked_against_index() {
        let (_temp, store) = make_store();
        let validator = Validator::new(&store, PaperIdRule::Prefixed, SchemaSet::none());
        let results = validator.validate_all_measures().unwrap();
        let labels: Vec<_> = results.iter().map(|r| r.label()).collect();
        assert_eq!(labels, vec!["BM.json", "EP.json", "ORPHAN.json"]);
        assert!(results[0].is_valid());
        assert!(!results[1].is_valid());
        assert!(results[1].errors[0].contains("data_source"));
        assert!(results[2].is_valid());
        assert_eq!(results[2].warnings, vec!["not listed in the measure index".to_string()]);
    }

    #[test]
    fn broken_measure_index_does_not_stop_the_batch() {
        let (temp, store) = make_store();
        std::fs::write(temp.path().join("measures/index.json"), "{ broken").unwrap();
        let validator = Validator::new(&store, PaperIdRule::Prefixed, SchemaSet::none());

        let results = validator.validate_all_measures().unwrap();
        let labels: Vec<_> = results.iter().map(|r| r.label()).collect();
        assert_eq!(labels, vec!["index.json", "BM.json", "EP.json", "ORPHAN.json"]);
        assert!(results[0].errors[0].starts_with("Invalid JSON"));
        assert!(results[1].is_valid());
        assert!(results[2].errors[0].contains("data_source"));
        assert_eq!(
            ValidationSummary::from_results(&results),
            ValidationSummary { total: 4, passed: 2, failed: 2 }
        );
    }

    #[test]
    fn every_kind_is_tallied_after_a_loader_failure() {
        let (temp, store) = make_store();
        std::fs::write(temp.path().join("measures/index.json"), "{ broken").unwrap();
        write(temp.path(), "relations/paper_measures.json", &json!({"paper_measure_links": [
            {"paper_id": "paper_001", "measure_id": "BM"}
        ]}));
        let validator = Validator::new(&store, PaperIdRule::Prefixed, SchemaSet::none());

        let mut all = validator.validate_all_papers().unwrap();
        all.extend(validator.validate_all_measures().unwrap());
        all.extend(validator.validate_relations().unwrap());
        all.push(validator.validate_factors());

        let summary = ValidationSummary::from_results(&all);
        assert_eq!(summary.total, 10);
        assert!(!summary.all_passed());
        let relations = &all[8];
        assert_eq!(relations.label(), "paper_measures.json");
        assert!(relations.is_valid());
        assert!(relations.warnings.iter().any(|w| w.contains("measure")));
    }

    #[test]
    fn relations_cross_check_store() {
        let (temp, store) = make_store();
        write(temp.path(), "relations/paper_measures.json", &json!({"paper_measure_links": [
            {"paper_id": "paper_001", "measure_id": "BM"},
            {"paper_id": "paper_777", "measure_id": "BM"},
            {"paper_id": "paper_004", "measure_id": "MOM"}
        ]}));
        let validator = Validator::new(&store, PaperIdRule::Prefixed, SchemaSet::none());
        let results = validator.validate_relations().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].errors,
            vec![
                "Referenced paper does not exist: paper_777".to_string(),
                "Referenced measure does not exist: MOM".to_string(),
            ]
        );
    }

    #[test]
    fn absent_relation_file_yields_no_results() {
        let (_temp, store) = make_store();
        let validator = Validator::new(&store, PaperIdRule::Prefixed, SchemaSet::none());
        assert!(validator.validate_relations().unwrap().is_empty());
    }

    #[cfg(feature = "json-schema")]
    #[test]
    fn schema_layer_adds_errors() {
        let (temp, store) = make_store();
        write(temp.path(), "docs/schemas/paper_schema.json", &json!({
            "properties": {"market": {"enum": ["CN", "TW"]}}
        }));
        let validator = Validator::new(&store, PaperIdRule::Prefixed, SchemaSet::load(&store));
        let result = validator.validate_paper_file(&store.paper_path("paper_001"));
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("market"));
    }

    #[test]
    fn missing_factor_file_fails() {
        let (_temp, store) = make_store();
        let validator = Validator::new(&store, PaperIdRule::Prefixed, SchemaSet::none());
        let result = validator.validate_factors();
        assert_eq!(result.errors, vec!["File not found".to_string()]);
    }
}

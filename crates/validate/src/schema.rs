//! Optional schema layer.
//!
//! Schema files are picked up from the store when present. A missing or
//! unusable schema disables the layer for that document kind and the
//! field-level checks carry on alone. Builds without the `json-schema`
//! feature never load schemas.

use tracing::debug;

use factorbase_core::SchemaCheck;
use factorbase_store::DocumentStore;

#[cfg(feature = "json-schema")]
pub use compiled::JsonSchema;

#[cfg(feature = "json-schema")]
mod compiled {
    use serde_json::Value;

    use factorbase_core::{KbError, Result, SchemaCheck};

    /// A schema file compiled with `jsonschema`, full draft support.
    pub struct JsonSchema {
        name: String,
        validator: jsonschema::Validator,
    }

    impl JsonSchema {
        /// Fails with `Malformed` when `schema` is not itself a valid schema.
        pub fn compile(name: impl Into<String>, schema: &Value) -> Result<Self> {
            let name = name.into();
            let validator = jsonschema::validator_for(schema).map_err(|e| KbError::Malformed {
                path: name.clone(),
                message: e.to_string(),
            })?;
            Ok(Self { name, validator })
        }
    }

    impl SchemaCheck for JsonSchema {
        fn name(&self) -> &str {
            &self.name
        }

        fn check(&self, document: &Value) -> Vec<String> {
            self.validator
                .iter_errors(document)
                .map(|e| {
                    let at = e.instance_path.to_string();
                    let at = if at.is_empty() { "document".to_string() } else { at };
                    format!("schema {}: {at}: {e}", self.name)
                })
                .collect()
        }
    }
}

/// Schemas available for each document kind.
#[derive(Default)]
pub struct SchemaSet {
    pub paper: Option<Box<dyn SchemaCheck>>,
    pub measure: Option<Box<dyn SchemaCheck>>,
    pub relation: Option<Box<dyn SchemaCheck>>,
}

impl SchemaSet {
    /// No schema layer at all.
    pub fn none() -> Self {
        Self::default()
    }

    /// Load `paper_schema`, `measure_schema` and `paper_measure_schema` from the
    /// store's schema directory. Never fails.
    pub fn load(store: &DocumentStore) -> Self {
        Self {
            paper: load_one(store, "paper_schema"),
            measure: load_one(store, "measure_schema"),
            relation: load_one(store, "paper_measure_schema"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.paper.is_none() && self.measure.is_none() && self.relation.is_none()
    }
}

#[cfg(feature = "json-schema")]
fn load_one(store: &DocumentStore, name: &str) -> Option<Box<dyn SchemaCheck>> {
    use factorbase_core::KbError;
    use factorbase_store::load_value;
    use tracing::warn;

    let path = store.schema_path(name);
    let schema = match load_value(&path) {
        Ok(schema) => schema,
        Err(KbError::NotFound(_)) => {
            debug!(schema = name, "no schema file, skipping schema layer");
            return None;
        }
        Err(e) => {
            warn!(schema = name, error = %e, "schema unreadable, skipping schema layer");
            return None;
        }
    };
    match JsonSchema::compile(name, &schema) {
        Ok(compiled) => {
            debug!(schema = name, "schema loaded");
            Some(Box::new(compiled))
        }
        Err(e) => {
            warn!(schema = name, error = %e, "invalid schema, skipping schema layer");
            None
        }
    }
}

#[cfg(not(feature = "json-schema"))]
fn load_one(_store: &DocumentStore, name: &str) -> Option<Box<dyn SchemaCheck>> {
    debug!(schema = name, "built without json-schema support");
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_schema_files_degrade_to_none() {
        let temp = tempfile::TempDir::new().unwrap();
        let store = DocumentStore::at(temp.path()).unwrap();
        assert!(SchemaSet::load(&store).is_empty());
    }

    #[cfg(feature = "json-schema")]
    mod with_jsonschema {
        use super::*;
        use serde_json::{json, Value};

        fn paper_schema() -> JsonSchema {
            JsonSchema::compile(
                "paper_schema",
                &json!({
                    "type": "object",
                    "required": ["paper_id", "year"],
                    "additionalProperties": false,
                    "properties": {
                        "paper_id": {"type": "string", "pattern": "^paper_[0-9]{3}$"},
                        "title": {"type": "string", "minLength": 1},
                        "year": {"type": "integer", "minimum": 1900},
                        "replicable": {"enum": ["yes", "no", "unknown"]}
                    }
                }),
            )
            .unwrap()
        }

        #[test]
        fn conforming_document() {
            let doc = json!({"paper_id": "paper_001", "title": "T", "year": 2020,
                             "replicable": "no"});
            assert!(paper_schema().check(&doc).is_empty());
        }

        #[test]
        fn enforces_pattern_length_range_and_closed_objects() {
            let doc = json!({"paper_id": "paper_x", "title": "", "year": 12, "bogus": 1});
            let errors = paper_schema().check(&doc);
            assert_eq!(errors.len(), 4, "{errors:?}");
            assert!(errors.iter().all(|e| e.starts_with("schema paper_schema: ")));
            assert!(errors.iter().any(|e| e.contains("/paper_id")));
            assert!(errors.iter().any(|e| e.contains("/title")));
            assert!(errors.iter().any(|e| e.contains("/year")));
            assert!(errors.iter().any(|e| e.contains("bogus")));
        }

        #[test]
        fn missing_required_is_reported_at_document() {
            let errors = paper_schema().check(&json!({"paper_id": "paper_001"}));
            assert_eq!(errors.len(), 1);
            assert!(errors[0].starts_with("schema paper_schema: document: "));
            assert!(errors[0].contains("year"));
        }

        #[test]
        fn invalid_schema_does_not_compile() {
            let err = JsonSchema::compile("bad", &json!({"type": 5})).err().unwrap();
            assert!(matches!(err, factorbase_core::KbError::Malformed { .. }));
        }

        fn write_schema(root: &std::path::Path, name: &str, content: &str) {
            let dir = root.join("docs/schemas");
            std::fs::create_dir_all(&dir).unwrap();
            std::fs::write(dir.join(format!("{name}.json")), content).unwrap();
        }

        #[test]
        fn unusable_schema_files_are_skipped() {
            let temp = tempfile::TempDir::new().unwrap();
            write_schema(temp.path(), "paper_schema", "{not json");
            write_schema(temp.path(), "measure_schema", r#"{"required": ["measure_id"]}"#);
            write_schema(temp.path(), "paper_measure_schema", r#"{"type": 5}"#);

            let store = DocumentStore::at(temp.path()).unwrap();
            let set = SchemaSet::load(&store);
            assert!(set.paper.is_none());
            assert!(set.relation.is_none());
            let measure = set.measure.unwrap();
            assert_eq!(measure.name(), "measure_schema");
            assert_eq!(measure.check(&Value::Object(Default::default())).len(), 1);
        }
    }
}

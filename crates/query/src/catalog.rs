//! Read-only view of the factor taxonomy.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;

use factorbase_core::{Factor, FactorTaxonomy, Result};
use factorbase_store::{load_json, DocumentStore};

pub struct FactorCatalog {
    taxonomy: FactorTaxonomy,
}

impl FactorCatalog {
    pub fn new(taxonomy: FactorTaxonomy) -> Self {
        Self { taxonomy }
    }

    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self::new(load_json(path)?))
    }

    pub fn from_store(store: &DocumentStore) -> Result<Self> {
        Self::load(store.factors_path())
    }

    pub fn list_all(&self) -> &[Factor] {
        &self.taxonomy.factors
    }

    /// Case-insensitive match on `factor_name`.
    pub fn by_name(&self, name: &str) -> Option<&Factor> {
        self.taxonomy
            .factors
            .iter()
            .find(|f| f.factor_name.eq_ignore_ascii_case(name))
    }

    pub fn by_id(&self, factor_id: i64) -> Option<&Factor> {
        self.taxonomy.factors.iter().find(|f| f.factor_id == factor_id)
    }

    /// Case-insensitive match on the style as written in the taxonomy.
    pub fn by_style(&self, style: &str) -> Vec<&Factor> {
        self.taxonomy
            .factors
            .iter()
            .filter(|f| f.style.eq_ignore_ascii_case(style))
            .collect()
    }

    pub fn metadata(&self) -> &BTreeMap<String, Value> {
        &self.taxonomy.metadata
    }

    pub fn version(&self) -> &str {
        self.taxonomy.metadata_str("version").unwrap_or("N/A")
    }

    pub fn last_updated(&self) -> &str {
        self.taxonomy.metadata_str("last_updated").unwrap_or("N/A")
    }
}

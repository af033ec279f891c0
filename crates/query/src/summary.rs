//! Collection-level counts for the paper summary report.

use std::collections::BTreeMap;

use serde::Serialize;

use factorbase_index::PaperIndex;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CollectionSummary {
    pub total: usize,
    pub by_market: BTreeMap<String, usize>,
    pub by_asset_class: BTreeMap<String, usize>,
}

impl CollectionSummary {
    pub fn from_index(index: &PaperIndex) -> Self {
        let count = |view: &BTreeMap<String, Vec<String>>| -> BTreeMap<String, usize> {
            view.iter().map(|(k, ids)| (k.clone(), ids.len())).collect()
        };
        Self {
            total: index.by_id.len(),
            by_market: count(&index.by_market),
            by_asset_class: count(&index.by_asset_class),
        }
    }
}

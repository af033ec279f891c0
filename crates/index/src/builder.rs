//! Derived lookup tables over the paper collection.
//!
//! The index is a pure function of the papers handed to [`rebuild`]. Map keys
//! are kept sorted and bucket contents follow input order, so the same input
//! always serialises to the same bytes.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

use factorbase_core::Paper;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaperIndex {
    pub by_id: BTreeMap<String, Paper>,
    pub by_market: BTreeMap<String, Vec<String>>,
    pub by_asset_class: BTreeMap<String, Vec<String>>,
    /// Serialised with the year as a string key, as JSON requires.
    pub by_year: BTreeMap<i64, Vec<String>>,
    pub by_author: BTreeMap<String, Vec<String>>,
}

/// Build every view in a single pass over `papers`.
///
/// A repeated `paper_id` keeps its first occurrence; later ones are skipped
/// with a warning so each id lands in each bucket at most once.
pub fn rebuild(papers: &[Paper]) -> PaperIndex {
    let mut index = PaperIndex::default();

    for paper in papers {
        let id = &paper.paper_id;
        if index.by_id.contains_key(id) {
            warn!(paper_id = %id, "duplicate paper_id, keeping first occurrence");
            continue;
        }

        push(&mut index.by_market, paper.market.clone(), id);
        push(&mut index.by_asset_class, paper.asset_class.clone(), id);
        push(&mut index.by_year, paper.year, id);

        let mut seen = HashSet::new();
        for author in paper.author_list() {
            if seen.insert(author) {
                push(&mut index.by_author, author.to_string(), id);
            }
        }

        index.by_id.insert(id.clone(), paper.clone());
    }

    index
}

fn push<K: Ord>(view: &mut BTreeMap<K, Vec<String>>, key: K, id: &str) {
    view.entry(key).or_default().push(id.to_string());
}

impl PaperIndex {
    pub fn paper(&self, paper_id: &str) -> Option<&Paper> {
        self.by_id.get(paper_id)
    }

    pub fn by_market(&self, market: &str) -> &[String] {
        self.by_market.get(market).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn by_asset_class(&self, asset_class: &str) -> &[String] {
        self.by_asset_class.get(asset_class).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn by_year(&self, year: i64) -> &[String] {
        self.by_year.get(&year).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn by_author(&self, author: &str) -> &[String] {
        self.by_author.get(author.trim()).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            papers: self.by_id.len(),
            markets: self.by_market.len(),
            asset_classes: self.by_asset_class.len(),
            years: self.by_year.len(),
            authors: self.by_author.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub papers: usize,
    pub markets: usize,
    pub asset_classes: usize,
    pub years: usize,
    pub authors: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn paper(id: &str, market: &str, asset_class: &str, year: i64, authors: &str) -> Paper {
        serde_json::from_value(json!({
            "paper_id": id,
            "title": format!("Title of {id}"),
            "authors": authors,
            "year": year,
            "journal": "JF",
            "market": market,
            "asset_class": asset_class,
            "abstract": "",
            "conclusion_sign": "mixed",
            "replicable": "unknown",
            "notes": ""
        }))
        .unwrap()
    }

    fn collection() -> Vec<Paper> {
        vec![
            paper("paper_001", "US", "Equity", 1993, "Fama, E.; French, K."),
            paper("paper_002", "TW", "Equity", 2015, "Chen, L.;French, K.  ;  Wang, Y."),
            paper("paper_003", "US", "Bond", 1993, "Jegadeesh, N."),
        ]
    }

    #[test]
    fn single_paper_example() {
        let index = rebuild(&[paper("paper_001", "US", "Equity", 2020, "Fama, E.; French, K.")]);
        let authors: Vec<_> = index.by_author.keys().cloned().collect();
        assert_eq!(authors, vec!["Fama, E.", "French, K."]);
        assert_eq!(index.by_author["Fama, E."], vec!["paper_001"]);
        assert_eq!(index.by_author["French, K."], vec!["paper_001"]);
        assert_eq!(index.by_year[&2020], vec!["paper_001"]);

        let v = serde_json::to_value(&index).unwrap();
        assert_eq!(v["by_year"], json!({"2020": ["paper_001"]}));
    }

    #[test]
    fn every_paper_lands_once_in_each_view() {
        let papers = collection();
        let index = rebuild(&papers);
        for p in &papers {
            assert!(index.by_id.contains_key(&p.paper_id));
            for bucket in [
                index.by_market(&p.market),
                index.by_asset_class(&p.asset_class),
                index.by_year(p.year),
            ] {
                assert_eq!(bucket.iter().filter(|id| **id == p.paper_id).count(), 1);
            }
        }
    }

    #[test]
    fn buckets_keep_scan_order() {
        let index = rebuild(&collection());
        assert_eq!(index.by_market("US"), ["paper_001", "paper_003"]);
        assert_eq!(index.by_year(1993), ["paper_001", "paper_003"]);
        assert_eq!(index.by_author("French, K."), ["paper_001", "paper_002"]);
    }

    #[test]
    fn irregular_author_whitespace_is_trimmed() {
        let index = rebuild(&collection());
        assert_eq!(index.by_author("Wang, Y."), ["paper_002"]);
        assert_eq!(index.by_author("Chen, L."), ["paper_002"]);
        assert!(index.by_author.keys().all(|k| k.trim() == k && !k.is_empty()));
    }

    #[test]
    fn rebuild_is_idempotent() {
        let papers = collection();
        let a = serde_json::to_string_pretty(&rebuild(&papers)).unwrap();
        let b = serde_json::to_string_pretty(&rebuild(&papers)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn duplicate_ids_and_authors_are_not_double_counted() {
        let papers = vec![
            paper("paper_001", "US", "Equity", 1993, "Fama, E.; Fama, E."),
            paper("paper_001", "CN", "Equity", 1993, "Someone"),
        ];
        let index = rebuild(&papers);
        assert_eq!(index.by_author("Fama, E."), ["paper_001"]);
        assert!(index.by_market("CN").is_empty());
        assert_eq!(index.paper("paper_001").unwrap().market, "US");
    }

    #[test]
    fn stats_count_distinct_keys() {
        let stats = rebuild(&collection()).stats();
        assert_eq!(
            stats,
            IndexStats { papers: 3, markets: 2, asset_classes: 2, years: 2, authors: 5 }
        );
    }

    #[test]
    fn empty_collection_gives_empty_views() {
        let index = rebuild(&[]);
        assert_eq!(index, PaperIndex::default());
        assert!(index.by_market("US").is_empty());
    }
}

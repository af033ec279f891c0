//! Lookups and listings over the document store.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use factorbase_core::models::de_paper_id;
use factorbase_core::{KbError, Measure, MeasureIndex, Paper, PaperMeasureLink, Result, LINKS_KEY};
use factorbase_index::{build_from_store, load_index, PaperIndex};
use factorbase_store::{load_json, load_optional, DocumentStore};

// ── Projections ─────────────────────────────────────────────────────

/// Summary row for paper listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperSummary {
    #[serde(deserialize_with = "de_paper_id")]
    pub paper_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub authors: Option<String>,
    #[serde(default)]
    pub year: Option<i64>,
    #[serde(default)]
    pub journal: Option<String>,
}

impl From<&Paper> for PaperSummary {
    fn from(paper: &Paper) -> Self {
        Self {
            paper_id: paper.paper_id.clone(),
            title: Some(paper.title.clone()),
            authors: Some(paper.authors.clone()),
            year: Some(paper.year),
            journal: Some(paper.journal.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasureListing {
    pub measure_id: String,
    pub display_name: String,
    pub factor: String,
    pub original_paper_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorListing {
    pub factor: String,
    pub count: usize,
    pub measures: Vec<String>,
}

/// Result of looking up the measures of one factor.
///
/// Keeps "no such factor" apart from "factor exists but lists nothing".
#[derive(Debug, Clone, PartialEq)]
pub enum FactorLookup {
    UnknownFactor,
    Empty { factor: String },
    /// Measures whose documents loaded; unreadable ones are logged and left out.
    Found { factor: String, measures: Vec<Measure> },
}

/// Which view of the paper index to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexKey {
    Market(String),
    AssetClass(String),
    Year(i64),
    Author(String),
}

/// `paper_id` may be stored as a string or a bare integer.
fn link_paper_id_is(link: &Value, paper_id: &str) -> bool {
    match link.get("paper_id") {
        Some(Value::String(id)) => id == paper_id,
        Some(Value::Number(n)) => n.to_string() == paper_id,
        _ => false,
    }
}

// ── Engine ──────────────────────────────────────────────────────────

pub struct QueryEngine<'a> {
    store: &'a DocumentStore,
}

impl<'a> QueryEngine<'a> {
    pub fn new(store: &'a DocumentStore) -> Self {
        Self { store }
    }

    fn require_measure_index(&self) -> Result<MeasureIndex> {
        self.store.measure_index()?.ok_or_else(|| {
            KbError::NotFound(format!(
                "measure index {}",
                self.store.measure_index_path().display()
            ))
        })
    }

    /// Full measure document for `measure_id`, located through the index.
    pub fn measure(&self, measure_id: &str) -> Result<Measure> {
        let index = self.require_measure_index()?;
        let (_, summary) = index
            .find(measure_id)
            .ok_or_else(|| KbError::NotFound(format!("measure {measure_id}")))?;
        load_json(&self.store.measure_file(&summary.file))
    }

    pub fn paper(&self, paper_id: &str) -> Result<Paper> {
        match load_json::<Paper>(&self.store.paper_path(paper_id)) {
            Err(KbError::NotFound(_)) => Err(KbError::NotFound(format!("paper {paper_id}"))),
            other => other,
        }
    }

    /// Case-insensitive exact match on the factor group name.
    pub fn measures_by_factor(&self, factor: &str) -> Result<FactorLookup> {
        let index = self.require_measure_index()?;
        let Some(group) = index.group(factor) else {
            return Ok(FactorLookup::UnknownFactor);
        };
        if group.measures.is_empty() {
            return Ok(FactorLookup::Empty {
                factor: group.factor.clone(),
            });
        }

        let mut measures = Vec::with_capacity(group.measures.len());
        for summary in &group.measures {
            let path = self.store.measure_file(&summary.file);
            match load_json::<Measure>(&path) {
                Ok(m) => measures.push(m),
                Err(e) => warn!(measure_id = %summary.measure_id, error = %e, "skipping measure"),
            }
        }
        Ok(FactorLookup::Found {
            factor: group.factor.clone(),
            measures,
        })
    }

    /// Links whose `paper_id` equals `paper_id`. No relation file means no links.
    ///
    /// Links are matched on the raw document, so a malformed link elsewhere in
    /// the file does not hide the good ones; a matching link that cannot be
    /// read is skipped with a warning.
    pub fn paper_measures(&self, paper_id: &str) -> Result<Vec<PaperMeasureLink>> {
        let path = self.store.relations_path();
        let Some(doc) = load_optional::<Value>(path)? else {
            return Ok(Vec::new());
        };
        let Some(links) = doc.get(LINKS_KEY).and_then(Value::as_array) else {
            warn!(path = %path.display(), "relation file has no '{LINKS_KEY}' array");
            return Ok(Vec::new());
        };

        let mut out = Vec::new();
        for (i, link) in links.iter().enumerate() {
            if !link_paper_id_is(link, paper_id) {
                continue;
            }
            match serde_json::from_value::<PaperMeasureLink>(link.clone()) {
                Ok(link) => out.push(link),
                Err(e) => warn!(link = i, error = %e, "skipping unreadable link"),
            }
        }
        Ok(out)
    }

    /// Summaries of every paper file, in scan order. Unreadable files are skipped.
    pub fn list_papers(&self) -> Result<Vec<PaperSummary>> {
        let mut out = Vec::new();
        for path in self.store.paper_files()? {
            match load_json::<PaperSummary>(&path) {
                Ok(summary) => out.push(summary),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping paper"),
            }
        }
        Ok(out)
    }

    pub fn list_measures(&self) -> Result<Vec<MeasureListing>> {
        let index = self.store.measure_index()?.unwrap_or_default();
        Ok(index
            .factors
            .iter()
            .flat_map(|group| {
                group.measures.iter().map(move |m| MeasureListing {
                    measure_id: m.measure_id.clone(),
                    display_name: m.display_name.clone(),
                    factor: group.factor.clone(),
                    original_paper_id: m.original_paper_id.clone(),
                })
            })
            .collect())
    }

    pub fn list_factors(&self) -> Result<Vec<FactorListing>> {
        let index = self.store.measure_index()?.unwrap_or_default();
        Ok(index
            .factors
            .iter()
            .map(|group| FactorListing {
                factor: group.factor.clone(),
                count: group.count,
                measures: group.measures.iter().map(|m| m.measure_id.clone()).collect(),
            })
            .collect())
    }

    /// The generated paper index, rebuilt in memory when the file is missing
    /// or cannot be read.
    pub fn paper_index(&self) -> Result<PaperIndex> {
        match load_index(self.store) {
            Ok(Some(index)) => return Ok(index),
            Ok(None) => debug!("no generated index on disk, rebuilding in memory"),
            Err(e) => warn!(error = %e, "generated index unreadable, rebuilding in memory"),
        }
        Ok(build_from_store(self.store)?.index)
    }

    /// Papers filed under one key of the index, in bucket order.
    pub fn papers_by(&self, key: &IndexKey) -> Result<Vec<PaperSummary>> {
        let index = self.paper_index()?;
        let ids = match key {
            IndexKey::Market(m) => index.by_market(m),
            IndexKey::AssetClass(a) => index.by_asset_class(a),
            IndexKey::Year(y) => index.by_year(*y),
            IndexKey::Author(a) => index.by_author(a),
        };
        Ok(ids
            .iter()
            .filter_map(|id| index.paper(id))
            .map(PaperSummary::from)
            .collect())
    }
}

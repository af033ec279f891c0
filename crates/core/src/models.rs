use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::types::{ConclusionSign, Replicable, Style};

/// Accepts either `"paper_001"` or a bare integer id and normalises to a string.
pub fn de_paper_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

// ── Papers ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    #[serde(deserialize_with = "de_paper_id")]
    pub paper_id: String,
    pub title: String,
    /// Semicolon-separated, e.g. `"Fama, E.; French, K."`.
    pub authors: String,
    pub year: i64,
    pub journal: String,
    pub market: String,
    pub asset_class: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub conclusion_sign: ConclusionSign,
    pub replicable: Replicable,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Paper {
    /// Individual author names in their original order, trimmed.
    pub fn author_list(&self) -> Vec<&str> {
        self.authors
            .split(';')
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .collect()
    }
}

// ── Measures ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub measure_id: String,
    pub measure_name: String,
    pub display_name: String,
    pub factor: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_paper_id: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Entry of a factor group in `measures/index.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureSummary {
    pub measure_id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub original_paper_id: Option<String>,
    /// Path of the full measure document, relative to the measures root.
    pub file: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorGroup {
    pub factor: String,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub measures: Vec<MeasureSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasureIndex {
    #[serde(default)]
    pub factors: Vec<FactorGroup>,
}

impl MeasureIndex {
    /// Finds the summary for `measure_id` along with the name of its group.
    pub fn find(&self, measure_id: &str) -> Option<(&FactorGroup, &MeasureSummary)> {
        self.factors.iter().find_map(|group| {
            group
                .measures
                .iter()
                .find(|m| m.measure_id == measure_id)
                .map(|m| (group, m))
        })
    }

    /// Case-insensitive exact match on the group name.
    pub fn group(&self, factor: &str) -> Option<&FactorGroup> {
        self.factors
            .iter()
            .find(|g| g.factor.eq_ignore_ascii_case(factor))
    }

    pub fn measure_ids(&self) -> impl Iterator<Item = &str> {
        self.factors
            .iter()
            .flat_map(|g| g.measures.iter().map(|m| m.measure_id.as_str()))
    }
}

// ── Relations ────────────────────────────────────────────────

/// Top-level key of the relation file holding the link array.
pub const LINKS_KEY: &str = "paper_measure_links";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperMeasureLink {
    #[serde(deserialize_with = "de_paper_id")]
    pub paper_id: String,
    pub measure_id: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

// ── Factor taxonomy ──────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorDescription {
    pub en: String,
    pub zh: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Factor {
    pub factor_id: i64,
    pub factor_name: String,
    /// Kept as written so one unrecognised style does not make the taxonomy
    /// unreadable; the validator reports it.
    pub style: String,
    pub description: FactorDescription,
}

impl Factor {
    /// The recognised style, matched case-insensitively.
    pub fn style_kind(&self) -> Option<Style> {
        Style::parse_loose(&self.style)
    }

    /// Description in the requested language; anything other than `zh` is English.
    pub fn description_in(&self, language: &str) -> &str {
        if language.eq_ignore_ascii_case("zh") {
            &self.description.zh
        } else {
            &self.description.en
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactorTaxonomy {
    /// Free-form: `version`, `last_updated`, `description` and anything else.
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
    pub factors: Vec<Factor>,
}

impl FactorTaxonomy {
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }
}

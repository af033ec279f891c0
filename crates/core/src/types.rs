use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Direction of a paper's headline finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConclusionSign {
    Positive,
    Negative,
    Mixed,
    None,
}

impl ConclusionSign {
    pub const ALL: &'static [&'static str] = &["positive", "negative", "mixed", "none"];
}

impl fmt::Display for ConclusionSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConclusionSign::Positive => write!(f, "positive"),
            ConclusionSign::Negative => write!(f, "negative"),
            ConclusionSign::Mixed => write!(f, "mixed"),
            ConclusionSign::None => write!(f, "none"),
        }
    }
}

impl FromStr for ConclusionSign {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positive" => Ok(Self::Positive),
            "negative" => Ok(Self::Negative),
            "mixed" => Ok(Self::Mixed),
            "none" => Ok(Self::None),
            other => Err(format!(
                "'{}' is not one of [{}]",
                other,
                Self::ALL.join(", ")
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Replicable {
    Yes,
    No,
    Unknown,
}

impl Replicable {
    pub const ALL: &'static [&'static str] = &["yes", "no", "unknown"];
}

impl fmt::Display for Replicable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Replicable::Yes => write!(f, "yes"),
            Replicable::No => write!(f, "no"),
            Replicable::Unknown => write!(f, "unknown"),
        }
    }
}

impl FromStr for Replicable {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yes" => Ok(Self::Yes),
            "no" => Ok(Self::No),
            "unknown" => Ok(Self::Unknown),
            other => Err(format!(
                "'{}' is not one of [{}]",
                other,
                Self::ALL.join(", ")
            )),
        }
    }
}

/// Taxonomy bucket a factor belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Style {
    Style,
    Quality,
    Risk,
    Sentiment,
}

impl Style {
    pub const ALL: &'static [&'static str] = &["Style", "Quality", "Risk", "Sentiment"];

    /// Case-insensitive lookup of a style as written in the taxonomy.
    pub fn parse_loose(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "style" => Some(Self::Style),
            "quality" => Some(Self::Quality),
            "risk" => Some(Self::Risk),
            "sentiment" => Some(Self::Sentiment),
            _ => None,
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Style::Style => write!(f, "Style"),
            Style::Quality => write!(f, "Quality"),
            Style::Risk => write!(f, "Risk"),
            Style::Sentiment => write!(f, "Sentiment"),
        }
    }
}

impl FromStr for Style {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Style" => Ok(Self::Style),
            "Quality" => Ok(Self::Quality),
            "Risk" => Ok(Self::Risk),
            "Sentiment" => Ok(Self::Sentiment),
            other => Err(format!(
                "'{}' is not one of [{}]",
                other,
                Self::ALL.join(", ")
            )),
        }
    }
}

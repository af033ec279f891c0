use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub layout: LayoutConfig,
    pub validation: ValidationConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Root of the document store; every layout path is relative to it.
    pub root: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { root: PathBuf::from(".") }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub papers_dir: PathBuf,
    pub papers_index: PathBuf,
    pub measures_dir: PathBuf,
    pub measure_index: PathBuf,
    pub relations_file: PathBuf,
    pub factors_file: PathBuf,
    pub schemas_dir: PathBuf,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            papers_dir: PathBuf::from("papers/metadata"),
            papers_index: PathBuf::from("papers/papers_index.json"),
            measures_dir: PathBuf::from("measures"),
            measure_index: PathBuf::from("measures/index.json"),
            relations_file: PathBuf::from("relations/paper_measures.json"),
            factors_file: PathBuf::from("factors/factors.json"),
            schemas_dir: PathBuf::from("docs/schemas"),
        }
    }
}

/// How `paper_id` is expected to look.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperIdRule {
    /// A string starting with `paper_`.
    #[default]
    Prefixed,
    /// A JSON integer.
    Integer,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub paper_id_rule: PaperIdRule,
    /// Layer schema files from `schemas_dir` on top of the field checks.
    pub use_schemas: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            paper_id_rule: PaperIdRule::Prefixed,
            use_schemas: true,
        }
    }
}

impl AppConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Loads `path` when it exists, otherwise falls back to built-in defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let cfg = AppConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.store.root, PathBuf::from("."));
        assert_eq!(cfg.layout.measure_index, PathBuf::from("measures/index.json"));
        assert_eq!(cfg.validation.paper_id_rule, PaperIdRule::Prefixed);
        assert!(cfg.validation.use_schemas);
    }

    #[test]
    fn partial_sections_override_only_given_keys() {
        let cfg = AppConfig::from_toml_str(
            r#"
            [store]
            root = "/data/factorbase"

            [validation]
            paper_id_rule = "integer"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.store.root, PathBuf::from("/data/factorbase"));
        assert_eq!(cfg.validation.paper_id_rule, PaperIdRule::Integer);
        assert_eq!(cfg.layout.papers_dir, PathBuf::from("papers/metadata"));
    }

    #[test]
    fn bad_toml_is_parse_error() {
        let err = AppConfig::from_toml_str("[store\nroot=").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn missing_file_falls_back_to_default() {
        let cfg = AppConfig::load_or_default("does/not/exist.toml").unwrap();
        assert_eq!(cfg.layout.factors_file, PathBuf::from("factors/factors.json"));
    }
}

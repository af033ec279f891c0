//! Document Store layout: where each collection lives under the root.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use factorbase_config::AppConfig;
use factorbase_core::{KbError, MeasureIndex, Result};

use crate::loader::load_optional;

const PAPER_PREFIX: &str = "paper_";

/// Resolved paths of one document store.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
    papers_dir: PathBuf,
    papers_index: PathBuf,
    measures_dir: PathBuf,
    measure_index: PathBuf,
    relations_file: PathBuf,
    factors_file: PathBuf,
    schemas_dir: PathBuf,
}

impl DocumentStore {
    /// Open the store described by `config`. Fails only when the root itself
    /// is missing; absent collections are reported by the operations that
    /// need them.
    pub fn open(config: &AppConfig) -> Result<Self> {
        let root = config.store.root.clone();
        if !root.is_dir() {
            return Err(KbError::NotFound(format!(
                "document store root {}",
                root.display()
            )));
        }
        let layout = &config.layout;
        let store = Self {
            papers_dir: root.join(&layout.papers_dir),
            papers_index: root.join(&layout.papers_index),
            measures_dir: root.join(&layout.measures_dir),
            measure_index: root.join(&layout.measure_index),
            relations_file: root.join(&layout.relations_file),
            factors_file: root.join(&layout.factors_file),
            schemas_dir: root.join(&layout.schemas_dir),
            root,
        };
        debug!(root = %store.root.display(), "document store opened");
        Ok(store)
    }

    /// Open a store at `root` with the default layout.
    pub fn at(root: impl Into<PathBuf>) -> Result<Self> {
        let mut config = AppConfig::default();
        config.store.root = root.into();
        Self::open(&config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn papers_dir(&self) -> &Path {
        &self.papers_dir
    }

    pub fn papers_index_path(&self) -> &Path {
        &self.papers_index
    }

    pub fn measures_dir(&self) -> &Path {
        &self.measures_dir
    }

    pub fn measure_index_path(&self) -> &Path {
        &self.measure_index
    }

    pub fn relations_path(&self) -> &Path {
        &self.relations_file
    }

    pub fn factors_path(&self) -> &Path {
        &self.factors_file
    }

    /// `docs/schemas/<name>.json`, e.g. `paper_schema`.
    pub fn schema_path(&self, name: &str) -> PathBuf {
        self.schemas_dir.join(format!("{name}.json"))
    }

    /// Conventional location of a paper document: `<papers_dir>/<id>.json`.
    pub fn paper_path(&self, paper_id: &str) -> PathBuf {
        self.papers_dir.join(format!("{paper_id}.json"))
    }

    pub fn paper_exists(&self, paper_id: &str) -> bool {
        self.paper_path(paper_id).is_file()
    }

    /// Path of a measure document listed in the measure index.
    pub fn measure_file(&self, relative: &str) -> PathBuf {
        self.measures_dir.join(relative)
    }

    /// `paper_*.json` files in lexicographic order.
    pub fn paper_files(&self) -> Result<Vec<PathBuf>> {
        if !self.papers_dir.is_dir() {
            return Err(KbError::NotFound(format!(
                "papers directory {}",
                self.papers_dir.display()
            )));
        }
        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.papers_dir)? {
            let path = entry?.path();
            let is_paper = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with(PAPER_PREFIX) && n.ends_with(".json"))
                .unwrap_or(false);
            if is_paper && path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Every `*.json` inside a factor sub-directory of the measures root,
    /// paired with that directory's name. Directories and files are both
    /// visited in sorted order.
    pub fn measure_files(&self) -> Result<Vec<(String, PathBuf)>> {
        if !self.measures_dir.is_dir() {
            return Err(KbError::NotFound(format!(
                "measures directory {}",
                self.measures_dir.display()
            )));
        }
        let mut factor_dirs = Vec::new();
        for entry in std::fs::read_dir(&self.measures_dir)? {
            let path = entry?.path();
            if path.is_dir() && path.file_name().map_or(false, |n| n != "__pycache__") {
                factor_dirs.push(path);
            }
        }
        factor_dirs.sort();

        let mut files = Vec::new();
        for dir in factor_dirs {
            let factor = dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let mut in_dir = Vec::new();
            for entry in std::fs::read_dir(&dir)? {
                let path = entry?.path();
                if path.is_file() && path.extension().map_or(false, |e| e == "json") {
                    in_dir.push(path);
                }
            }
            in_dir.sort();
            files.extend(in_dir.into_iter().map(|p| (factor.clone(), p)));
        }
        Ok(files)
    }

    /// The measure taxonomy index, or `None` when it has not been written yet.
    pub fn measure_index(&self) -> Result<Option<MeasureIndex>> {
        let index = load_optional::<MeasureIndex>(&self.measure_index)?;
        if index.is_none() {
            warn!(path = %self.measure_index.display(), "measure index not found");
        }
        Ok(index)
    }
}

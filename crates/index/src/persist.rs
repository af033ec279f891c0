//! Loading papers from the store and writing the generated index back.

use std::path::PathBuf;

use tracing::{info, warn};

use factorbase_core::{Paper, Result};
use factorbase_store::{load_json, load_optional, write_json_atomic, DocumentStore};

use crate::builder::{rebuild, PaperIndex};

/// An index together with the paper files that could not be used.
#[derive(Debug)]
pub struct IndexBuild {
    pub index: PaperIndex,
    pub loaded: usize,
    pub skipped: Vec<(PathBuf, String)>,
}

/// Load every paper file in scan order and rebuild the index from them.
///
/// Files that fail to load are recorded in `skipped`; only a missing papers
/// directory aborts the build.
pub fn build_from_store(store: &DocumentStore) -> Result<IndexBuild> {
    let files = store.paper_files()?;
    let mut papers = Vec::with_capacity(files.len());
    let mut skipped = Vec::new();

    for path in files {
        match load_json::<Paper>(&path) {
            Ok(paper) => papers.push(paper),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping paper");
                skipped.push((path, e.to_string()));
            }
        }
    }

    info!(loaded = papers.len(), skipped = skipped.len(), "papers loaded");
    Ok(IndexBuild {
        index: rebuild(&papers),
        loaded: papers.len(),
        skipped,
    })
}

/// Persist the index to the store's configured location.
pub fn write_index(store: &DocumentStore, index: &PaperIndex) -> Result<PathBuf> {
    let path = store.papers_index_path().to_path_buf();
    write_json_atomic(&path, index)?;
    info!(path = %path.display(), papers = index.by_id.len(), "index written");
    Ok(path)
}

/// The generated index file, if one has been written.
pub fn load_index(store: &DocumentStore) -> Result<Option<PaperIndex>> {
    load_optional(store.papers_index_path())
}

//! Atomic persistence of derived documents.

use std::path::Path;

use serde::Serialize;
use tracing::debug;

use factorbase_core::{KbError, Result};

/// Serialise `value` with two-space indentation and write it to `path`.
///
/// The bytes go to a sibling temp file first and are renamed over the target,
/// so readers never observe a half-written document. Non-ASCII text is kept
/// as-is.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut body = serde_json::to_string_pretty(value)?;
    body.push('\n');

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| KbError::Io(format!("invalid output path {}", path.display())))?;
    let tmp = path.with_file_name(format!(".{}.{}.tmp", file_name, std::process::id()));

    std::fs::write(&tmp, body.as_bytes())?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(KbError::Io(format!(
            "failed to move {} into place: {}",
            path.display(),
            e
        )));
    }
    debug!(path = %path.display(), bytes = body.len(), "wrote document");
    Ok(())
}

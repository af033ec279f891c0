//! Reading single JSON documents from disk.

use std::io::ErrorKind;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;

use factorbase_core::{KbError, Result};

/// Read and parse one document.
///
/// A missing file is `NotFound`; unreadable JSON or a shape that does not fit
/// `T` is `Malformed` with the parser message.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(KbError::NotFound(path.display().to_string()));
        }
        Err(e) => return Err(KbError::Io(format!("{}: {}", path.display(), e))),
    };
    serde_json::from_str(&content).map_err(|e| KbError::Malformed {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Untyped variant used by the validators, which must see documents that
/// would not deserialize into a record.
pub fn load_value(path: &Path) -> Result<Value> {
    load_json(path)
}

/// Like [`load_json`] but treats a missing file as "no data yet".
pub fn load_optional<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match load_json(path) {
        Ok(doc) => Ok(Some(doc)),
        Err(KbError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use factorbase_core::MeasureIndex;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = load_value(&dir.path().join("nope.json")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn bad_json_is_malformed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ \"factors\": [ ").unwrap();
        match load_value(&path).unwrap_err() {
            KbError::Malformed { path: p, message } => {
                assert!(p.ends_with("bad.json"));
                assert!(!message.is_empty());
            }
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn optional_maps_missing_to_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.json");
        assert!(load_optional::<MeasureIndex>(&path).unwrap().is_none());

        std::fs::write(&path, r#"{"factors": []}"#).unwrap();
        let index = load_optional::<MeasureIndex>(&path).unwrap().unwrap();
        assert!(index.factors.is_empty());
    }

    #[test]
    fn wrong_shape_is_malformed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.json");
        std::fs::write(&path, r#"{"factors": "Value"}"#).unwrap();
        let err = load_json::<MeasureIndex>(&path).unwrap_err();
        assert!(matches!(err, KbError::Malformed { .. }));
    }
}

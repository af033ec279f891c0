use thiserror::Error;

#[derive(Debug, Error)]
pub enum KbError {
    /// Missing file or unresolved id. Callers decide whether this is fatal.
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Malformed document {path}: {message}")]
    Malformed { path: String, message: String },
    #[error("IO error: {0}")]
    Io(String),
}

pub type Result<T> = std::result::Result<T, KbError>;

impl KbError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, KbError::NotFound(_))
    }
}

impl From<std::io::Error> for KbError {
    fn from(err: std::io::Error) -> Self {
        KbError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for KbError {
    fn from(err: serde_json::Error) -> Self {
        KbError::Malformed {
            path: String::new(),
            message: err.to_string(),
        }
    }
}

use std::path::PathBuf;

/// Errors raised while building or serializing export rows.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No data to generate CSV")]
    NoRows,

    #[error("Invalid rows document: {0}")]
    InvalidDocument(String),

    #[error("Unexpected CSV header: {0}")]
    Header(String),
}

impl ExportError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_document(msg: impl Into<String>) -> Self {
        Self::InvalidDocument(msg.into())
    }

    pub fn header(msg: impl Into<String>) -> Self {
        Self::Header(msg.into())
    }
}

use std::path::PathBuf;

pub use watch_porter_core::CatalogEntry;

/// Errors raised while reading or writing the catalog file.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Catalog is not a JSON object: {0}")]
    NotAnObject(PathBuf),

    #[error("Could not determine data directory")]
    NoDataDir,
}

impl CatalogError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// A catalog lookup result: the entry and the key it is stored under.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogHit {
    pub key: String,
    pub entry: CatalogEntry,
}

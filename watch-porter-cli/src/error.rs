use thiserror::Error;

use watch_porter_catalog::CatalogError;
use watch_porter_export::ExportError;
use watch_porter_scraper::SourceError;

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Catalog could not be located or read
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// HTTP client setup failed
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Row building or CSV writing failed
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Malformed JSON input
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Bad or empty input
    #[error("Input error: {0}")]
    Input(String),
}

impl CliError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub(crate) fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }
}

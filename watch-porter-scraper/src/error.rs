/// Why a source produced nothing usable.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("HTTP request failed: {0}")]
    Transport(String),

    #[error("Server error (HTTP {status}) for {url}")]
    Status { status: u16, url: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing credential: {0}")]
    MissingCredentials(&'static str),

    #[error("Nothing found: {0}")]
    NotFound(String),

    #[error("Low quality result: {0}")]
    LowQuality(String),
}

impl SourceError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn low_quality(msg: impl Into<String>) -> Self {
        Self::LowQuality(msg.into())
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self {
        let url = e.url().map(|u| u.to_string()).unwrap_or_default();
        if e.is_timeout() {
            Self::Timeout(url)
        } else if let Some(status) = e.status() {
            Self::Status {
                status: status.as_u16(),
                url,
            }
        } else {
            Self::Transport(e.to_string())
        }
    }
}

/// Errors reading the credentials file.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid credentials file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Could not determine config directory")]
    NoConfigDir,
}

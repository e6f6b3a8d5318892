use std::path::{Path, PathBuf};

use crate::error::CredentialError;

const GOOGLE_CSE_KEY_VARS: &[&str] = &["GOOGLE_CSE_API_KEY", "WIXAPIKEY"];
const GOOGLE_CSE_CX_VARS: &[&str] = &["GOOGLE_CSE_CX", "WIXCX", "WIX_CSE_CX"];
const SERPAPI_KEY_VARS: &[&str] = &["SERPAPI_KEY"];
const CLASSIFIER_KEY_VARS: &[&str] = &["WIXWATCHSEARCH", "GEMINI_API_KEY"];
const CLASSIFIER_MODEL_VARS: &[&str] = &["GEMINI_MODEL"];
const CLASSIFIER_PROVIDER_VARS: &[&str] = &["WATCH_CLASSIFIER_PROVIDER"];

/// Which language-model API the classifier talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProviderKind {
    /// OpenRouter chat completions.
    OpenRouter,
    /// Google AI Studio `generateContent`.
    #[default]
    Google,
}

impl ProviderKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "openrouter" => Some(Self::OpenRouter),
            "google" | "gemini" => Some(Self::Google),
            _ => None,
        }
    }

    /// Model used when none is configured.
    pub fn default_model(self) -> &'static str {
        match self {
            Self::OpenRouter => "google/gemini-2.5-pro",
            Self::Google => "gemini-1.5-pro",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenRouter => write!(f, "openrouter"),
            Self::Google => write!(f, "google"),
        }
    }
}

/// API keys and settings for the optional credentialed services.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub google_cse_key: Option<String>,
    pub google_cse_cx: Option<String>,
    pub serpapi_key: Option<String>,
    pub classifier_key: Option<String>,
    pub classifier_model: Option<String>,
    pub provider: ProviderKind,
}

/// Where a credential's value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Loaded from an environment variable.
    EnvVar(&'static str),
    /// Loaded from the config file.
    ConfigFile,
    /// Built-in default value.
    Default,
    /// Not set anywhere.
    Missing,
}

impl std::fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EnvVar(var) => write!(f, "env ${}", var),
            Self::ConfigFile => write!(f, "config file"),
            Self::Default => write!(f, "default"),
            Self::Missing => write!(f, "not set"),
        }
    }
}

/// Provenance of each credential.
#[derive(Debug)]
pub struct CredentialSources {
    pub google_cse_key: CredentialSource,
    pub google_cse_cx: CredentialSource,
    pub serpapi_key: CredentialSource,
    pub classifier_key: CredentialSource,
    pub classifier_model: CredentialSource,
    pub classifier_provider: CredentialSource,
}

/// TOML config file format.
#[derive(Debug, Default, serde::Deserialize)]
pub struct CredentialsFile {
    #[serde(default)]
    search: SearchConfig,
    #[serde(default)]
    classifier: ClassifierConfig,
}

#[derive(Debug, Default, serde::Deserialize)]
struct SearchConfig {
    google_cse_api_key: Option<String>,
    google_cse_cx: Option<String>,
    serpapi_key: Option<String>,
}

#[derive(Debug, Default, serde::Deserialize)]
struct ClassifierConfig {
    api_key: Option<String>,
    model: Option<String>,
    provider: Option<String>,
}

impl CredentialsFile {
    pub fn parse(contents: &str) -> Result<Self, CredentialError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn read(path: &Path) -> Result<Self, CredentialError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }
}

/// First non-blank value among the aliases, then the file value.
fn pick(
    env: &dyn Fn(&str) -> Option<String>,
    names: &'static [&'static str],
    file_value: Option<&String>,
) -> (Option<String>, CredentialSource) {
    for name in names {
        let value = env(name).map(|v| v.trim().to_string()).unwrap_or_default();
        if !value.is_empty() {
            return (Some(value), CredentialSource::EnvVar(*name));
        }
    }
    match file_value.map(|v| v.trim()).filter(|v| !v.is_empty()) {
        Some(value) => (Some(value.to_string()), CredentialSource::ConfigFile),
        None => (None, CredentialSource::Missing),
    }
}

fn resolve(
    env: &dyn Fn(&str) -> Option<String>,
    file: &CredentialsFile,
) -> (Credentials, CredentialSources) {
    let (google_cse_key, google_cse_key_src) =
        pick(env, GOOGLE_CSE_KEY_VARS, file.search.google_cse_api_key.as_ref());
    let (google_cse_cx, google_cse_cx_src) =
        pick(env, GOOGLE_CSE_CX_VARS, file.search.google_cse_cx.as_ref());
    let (serpapi_key, serpapi_src) = pick(env, SERPAPI_KEY_VARS, file.search.serpapi_key.as_ref());
    let (classifier_key, classifier_key_src) =
        pick(env, CLASSIFIER_KEY_VARS, file.classifier.api_key.as_ref());
    let (classifier_model, mut classifier_model_src) =
        pick(env, CLASSIFIER_MODEL_VARS, file.classifier.model.as_ref());
    let (provider_name, mut provider_src) =
        pick(env, CLASSIFIER_PROVIDER_VARS, file.classifier.provider.as_ref());

    let provider = match provider_name.as_deref().map(|p| (p, ProviderKind::parse(p))) {
        Some((_, Some(kind))) => kind,
        Some((raw, None)) => {
            log::warn!("Unknown classifier provider '{raw}', using {}", ProviderKind::default());
            provider_src = CredentialSource::Default;
            ProviderKind::default()
        }
        None => {
            provider_src = CredentialSource::Default;
            ProviderKind::default()
        }
    };
    if classifier_model.is_none() {
        classifier_model_src = CredentialSource::Default;
    }

    let creds = Credentials {
        google_cse_key,
        google_cse_cx,
        serpapi_key,
        classifier_key,
        classifier_model,
        provider,
    };
    let sources = CredentialSources {
        google_cse_key: google_cse_key_src,
        google_cse_cx: google_cse_cx_src,
        serpapi_key: serpapi_src,
        classifier_key: classifier_key_src,
        classifier_model: classifier_model_src,
        classifier_provider: provider_src,
    };
    (creds, sources)
}

impl Credentials {
    /// Load from environment variables and the config file.
    ///
    /// Priority: env vars > config file. Every credential is optional; the
    /// features that need a missing one are skipped.
    pub fn load() -> Self {
        let file = load_config_file();
        Self::from_lookup(|name| std::env::var(name).ok(), &file)
    }

    /// Resolve credentials from an arbitrary variable lookup.
    pub fn from_lookup(env: impl Fn(&str) -> Option<String>, file: &CredentialsFile) -> Self {
        resolve(&env, file).0
    }

    /// Model name for the configured provider.
    pub fn classifier_model(&self) -> &str {
        self.classifier_model
            .as_deref()
            .unwrap_or(self.provider.default_model())
    }

    pub fn has_google_cse(&self) -> bool {
        self.google_cse_key.is_some() && self.google_cse_cx.is_some()
    }
}

/// Return the path to the credentials config file.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("watch-porter").join("credentials.toml"))
}

/// Determine where each credential is coming from.
pub fn credential_sources() -> CredentialSources {
    let file = load_config_file();
    sources_from_lookup(|name| std::env::var(name).ok(), &file)
}

pub fn sources_from_lookup(
    env: impl Fn(&str) -> Option<String>,
    file: &CredentialsFile,
) -> CredentialSources {
    resolve(&env, file).1
}

fn load_config_file() -> CredentialsFile {
    let Some(path) = config_path() else {
        return CredentialsFile::default();
    };
    if !path.exists() {
        return CredentialsFile::default();
    }
    CredentialsFile::read(&path).unwrap_or_else(|e| {
        log::warn!("Ignoring credentials file {}: {e}", path.display());
        CredentialsFile::default()
    })
}

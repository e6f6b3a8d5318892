pub mod classify;
pub mod client;
pub mod credentials;
pub mod enrich;
pub mod error;
pub mod images;
pub mod log;
pub mod resolve;
pub mod search;
pub mod series;
pub mod sources;

pub use classify::{Classification, Classifier, ClassifierProvider};
pub use client::{HttpClient, WebClient};
pub use credentials::{
    CredentialSource, CredentialSources, Credentials, ProviderKind, config_path,
    credential_sources,
};
pub use error::{CredentialError, SourceError};
pub use images::{ImageCandidate, ImageFinder, ImageProvider};
pub use log::{LogEntry, ResolveLog};
pub use resolve::{Resolution, ResolveEvent, Resolver, STEPS, Step};
pub use sources::AttributeSource;

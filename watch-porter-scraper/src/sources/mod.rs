//! Per-site attribute fetchers.
//!
//! Every fetcher implements [`AttributeSource`] and talks to the network only
//! through an [`HttpClient`](crate::client::HttpClient).

mod chrono24;
mod ebay;
mod google;
mod priority;

pub use chrono24::Chrono24;
pub use ebay::Ebay;
pub use google::GoogleSearch;
pub use priority::{PRIORITY_SOURCE_DOMAINS, PrioritySources, official_domains};

use watch_porter_core::RawFetchResult;

use crate::error::SourceError;

/// A site that can describe a watch model.
pub trait AttributeSource {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    /// Look the model up. `brand_hint` is a normalized brand or empty.
    fn fetch(&self, model: &str, brand_hint: &str) -> Result<RawFetchResult, SourceError>;
}

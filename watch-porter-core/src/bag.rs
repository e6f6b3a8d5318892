//! Records that carry attribute data through resolution.
//!
//! A fetcher produces a [`RawFetchResult`], the resolver turns it into an
//! [`AttributeBag`] and fills it in place, and the catalog persists the
//! outcome as a [`CatalogEntry`].

use serde::{Deserialize, Serialize};

use crate::UNIVERSAL_COLLECTION;
use crate::brand::{infer_brand_from_model, normalize_brand};
use crate::category::CategorySet;
use crate::text::{first_non_empty, truncate_chars};

/// Upper bound on joined feature text, in characters.
pub const FEATURE_TEXT_LIMIT: usize = 30_000;

/// Descriptions shorter than this are treated as placeholders.
const GENERIC_DESCRIPTION_MIN_CHARS: usize = 24;

/// The templated description used when nothing better is known.
pub fn template_description(model: &str) -> String {
    format!("Watch Model: {model}")
}

/// Whether a description carries no real product information: empty, the
/// templated `Watch Model: X` text, or too short to be useful.
pub fn is_generic_description(description: &str, model: &str) -> bool {
    let desc = description.trim().to_lowercase();
    let model = model.trim().to_lowercase();
    if desc.is_empty() {
        return true;
    }
    if desc == format!("watch model: {model}") || desc == format!("watch model {model}") {
        return true;
    }
    desc.chars().count() < GENERIC_DESCRIPTION_MIN_CHARS
}

/// What a single source fetcher found. Every field may be empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFetchResult {
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub brand: String,
    pub price: String,
    pub specs: Vec<String>,
    pub feature_text: String,
}

/// Which step of the fallback chain produced a bag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionOrigin {
    Catalog,
    PrioritySource,
    Chrono24,
    Ebay,
    GeneralSearch,
    Synthetic,
}

impl std::fmt::Display for ResolutionOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Catalog => write!(f, "catalog"),
            Self::PrioritySource => write!(f, "priority source"),
            Self::Chrono24 => write!(f, "Chrono24"),
            Self::Ebay => write!(f, "eBay"),
            Self::GeneralSearch => write!(f, "web search"),
            Self::Synthetic => write!(f, "synthetic fallback"),
        }
    }
}

/// A persisted catalog record, keyed by normalized model key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: String,
    /// The price is a brand-range estimate rather than a scraped value.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub price_estimated: bool,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub specs: Vec<String>,
    #[serde(flatten)]
    pub groups: CategorySet,
}

impl CatalogEntry {
    pub fn unknown_count(&self) -> usize {
        self.groups.unknown_count()
    }

    pub fn filled_count(&self) -> usize {
        self.groups.filled_count()
    }
}

/// The record built up while resolving one model number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeBag {
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub brand: String,
    pub price: String,
    pub specs: Vec<String>,
    pub feature_text: String,
    pub groups: CategorySet,
    /// The catalog entry backing this bag, once one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog: Option<CatalogEntry>,
    pub origin: ResolutionOrigin,
}

impl AttributeBag {
    pub fn from_raw(raw: RawFetchResult, origin: ResolutionOrigin) -> Self {
        Self {
            name: raw.name,
            description: raw.description,
            image_url: raw.image_url,
            brand: raw.brand,
            price: raw.price,
            specs: raw.specs,
            feature_text: truncate_chars(&raw.feature_text, FEATURE_TEXT_LIMIT),
            groups: CategorySet::new(),
            catalog: None,
            origin,
        }
    }

    /// Bag used when every source failed: the model as name, a templated
    /// description, and an inferred brand or the universal collection.
    pub fn synthetic(model: &str) -> Self {
        let brand = first_non_empty(&[
            &infer_brand_from_model(model),
            &normalize_brand(model),
            UNIVERSAL_COLLECTION,
        ]);
        Self {
            name: model.to_string(),
            description: template_description(model),
            image_url: String::new(),
            brand,
            price: String::new(),
            specs: Vec::new(),
            feature_text: String::new(),
            groups: CategorySet::new(),
            catalog: None,
            origin: ResolutionOrigin::Synthetic,
        }
    }

    /// Bag view of a catalog entry. Empty fields fall back the same way the
    /// synthetic bag does.
    pub fn from_catalog(entry: CatalogEntry, model: &str) -> Self {
        let brand = first_non_empty(&[
            &entry.brand,
            &infer_brand_from_model(model),
            UNIVERSAL_COLLECTION,
        ]);
        Self {
            name: first_non_empty(&[&entry.name, model]),
            description: first_non_empty(&[&entry.description, &template_description(model)]),
            image_url: entry.image_url.trim().to_string(),
            brand,
            price: entry.price.clone(),
            specs: entry.specs.clone(),
            feature_text: String::new(),
            groups: entry.groups.clone(),
            catalog: Some(entry),
            origin: ResolutionOrigin::Catalog,
        }
    }

    /// Normalized brand for lookups: the bag's brand, then its name, then
    /// the model number's prefix, then any brand word in the model.
    pub fn brand_hint(&self, model: &str) -> String {
        first_non_empty(&[
            &normalize_brand(&self.brand),
            &normalize_brand(&self.name),
            &infer_brand_from_model(model),
            &normalize_brand(model),
        ])
    }

    /// Name, description, specs and feature text, space-joined.
    pub fn combined_text(&self) -> String {
        [
            self.name.as_str(),
            self.description.as_str(),
            &self.specs.join(" "),
            self.feature_text.as_str(),
        ]
        .join(" ")
    }

    pub fn set_feature_text(&mut self, text: &str) {
        self.feature_text = truncate_chars(text.trim(), FEATURE_TEXT_LIMIT);
    }
}

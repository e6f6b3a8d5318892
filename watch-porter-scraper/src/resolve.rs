//! The resolution chain: catalog, priority sources, marketplaces, general
//! search, and finally a synthetic record.
//!
//! Each step either resolves the model or fails with a [`SourceError`];
//! failures are recorded and the next step runs. [`Resolver::resolve`]
//! always returns a bag.

use watch_porter_catalog::{CatalogEntry, CatalogStore, generate_entry};
use watch_porter_core::brand::brand_hint_for;
use watch_porter_core::image_url::prepare_image_url;
use watch_porter_core::text::first_non_empty;
use watch_porter_core::{
    AttributeBag, IMAGE_PLACEHOLDER_URL, ImageLookup, MappingConfig, ModelNumber,
    PlaceholderImages, RawFetchResult, ResolutionOrigin, has_supported_image_extension,
    infer_brand_from_model, is_generic_description, is_valid_image_url, normalize_brand,
};

use crate::classify::Classifier;
use crate::client::HttpClient;
use crate::credentials::Credentials;
use crate::enrich::{apply_classification, enrich};
use crate::error::SourceError;
use crate::images::ImageFinder;
use crate::search::{gather_external_features, is_low_quality};
use crate::sources::{AttributeSource, Chrono24, Ebay, GoogleSearch, PrioritySources};

/// One step of the resolution chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Catalog,
    PrioritySources,
    Chrono24,
    Ebay,
    GeneralSearch,
}

/// Steps in the order they are tried.
pub const STEPS: [Step; 5] = [
    Step::Catalog,
    Step::PrioritySources,
    Step::Chrono24,
    Step::Ebay,
    Step::GeneralSearch,
];

impl Step {
    pub fn origin(self) -> ResolutionOrigin {
        match self {
            Self::Catalog => ResolutionOrigin::Catalog,
            Self::PrioritySources => ResolutionOrigin::PrioritySource,
            Self::Chrono24 => ResolutionOrigin::Chrono24,
            Self::Ebay => ResolutionOrigin::Ebay,
            Self::GeneralSearch => ResolutionOrigin::GeneralSearch,
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.origin())
    }
}

/// What a single step produced.
enum StepOutcome {
    Resolved(Box<AttributeBag>),
    Failed(SourceError),
}

/// Outcome of resolving one model number.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The model number as entered.
    pub model: String,
    pub bag: AttributeBag,
    /// Why earlier steps were passed over.
    pub warnings: Vec<String>,
}

/// Progress events emitted by [`Resolver::resolve_batch`].
#[derive(Debug, Clone)]
pub enum ResolveEvent {
    Started { index: usize, model: String },
    Completed {
        index: usize,
        model: String,
        origin: ResolutionOrigin,
    },
    Done,
}

/// Resolves model numbers into attribute bags, reading and extending the
/// catalog as it goes.
pub struct Resolver<'a> {
    http: &'a dyn HttpClient,
    config: &'a MappingConfig,
    catalog: &'a mut CatalogStore,
    classifier: Classifier,
    images: ImageFinder<'a>,
}

impl<'a> Resolver<'a> {
    pub fn new(
        http: &'a dyn HttpClient,
        config: &'a MappingConfig,
        catalog: &'a mut CatalogStore,
        creds: &Credentials,
    ) -> Self {
        Self::with_parts(
            http,
            config,
            catalog,
            Classifier::from_credentials(creds),
            ImageFinder::new(http, creds),
        )
    }

    pub fn with_parts(
        http: &'a dyn HttpClient,
        config: &'a MappingConfig,
        catalog: &'a mut CatalogStore,
        classifier: Classifier,
        images: ImageFinder<'a>,
    ) -> Self {
        Self {
            http,
            config,
            catalog,
            classifier,
            images,
        }
    }

    /// Image search used for catalog and classification backfills. Row
    /// builders can share it.
    pub fn images(&self) -> &ImageFinder<'a> {
        &self.images
    }

    pub fn catalog(&self) -> &CatalogStore {
        self.catalog
    }

    pub fn resolve(&mut self, model: &str) -> AttributeBag {
        self.resolve_traced(model).bag
    }

    /// Resolve and report which steps were passed over.
    pub fn resolve_traced(&mut self, model: &str) -> Resolution {
        let number = ModelNumber::new(model);
        let mut warnings = Vec::new();
        if number.is_empty() {
            warnings.push("empty model number".to_string());
            return Resolution {
                model: String::new(),
                bag: AttributeBag::synthetic(""),
                warnings,
            };
        }

        log::info!("Resolving {}", number.raw());
        for step in STEPS {
            match self.run_step(step, &number) {
                StepOutcome::Resolved(bag) => {
                    log::info!("Resolved {} from {step}", number.raw());
                    return Resolution {
                        model: number.raw().to_string(),
                        bag: *bag,
                        warnings,
                    };
                }
                StepOutcome::Failed(e) => {
                    log::debug!("{step} failed for {}: {e}", number.raw());
                    warnings.push(format!("{step}: {e}"));
                }
            }
        }

        log::warn!("No data found for {}, using fallback", number.raw());
        let mut synthetic = AttributeBag::synthetic(number.canonical());
        synthetic.name = number.raw().to_string();
        let bag = self.finish(synthetic, &number);
        Resolution {
            model: number.raw().to_string(),
            bag,
            warnings,
        }
    }

    /// Resolve models one after another.
    pub fn resolve_batch(
        &mut self,
        models: &[String],
        on_event: &dyn Fn(ResolveEvent),
    ) -> Vec<Resolution> {
        let mut out = Vec::with_capacity(models.len());
        for (index, model) in models.iter().enumerate() {
            on_event(ResolveEvent::Started {
                index,
                model: model.clone(),
            });
            let resolution = self.resolve_traced(model);
            on_event(ResolveEvent::Completed {
                index,
                model: model.clone(),
                origin: resolution.bag.origin,
            });
            out.push(resolution);
        }
        on_event(ResolveEvent::Done);
        out
    }

    fn run_step(&mut self, step: Step, number: &ModelNumber) -> StepOutcome {
        let model = number.canonical();
        let fetched = match step {
            Step::Catalog => return self.from_catalog(number),
            Step::PrioritySources => {
                PrioritySources::new(self.http).fetch(model, &brand_hint_for(model, ""))
            }
            Step::Chrono24 => {
                Chrono24::new(self.http).fetch(model, "").and_then(|raw| require_image(raw, step))
            }
            Step::Ebay => {
                Ebay::new(self.http).fetch(model, "").and_then(|raw| require_image(raw, step))
            }
            Step::GeneralSearch => GoogleSearch::new(self.http).fetch(model, "").and_then(|raw| {
                if is_low_quality(&raw, model) {
                    Err(SourceError::low_quality(format!("generic search result for {model}")))
                } else {
                    Ok(raw)
                }
            }),
        };
        match fetched {
            Ok(raw) => {
                let bag = AttributeBag::from_raw(raw, step.origin());
                StepOutcome::Resolved(Box::new(self.finish(bag, number)))
            }
            Err(e) => StepOutcome::Failed(e),
        }
    }

    /// Enrich, classify, and record a freshly fetched bag in the catalog.
    fn finish(&mut self, mut bag: AttributeBag, number: &ModelNumber) -> AttributeBag {
        let model = number.canonical();
        enrich(&mut bag, model, self.http);
        let hint = bag.brand_hint(model);
        let classification = self.classifier.classify(self.http, model, &hint);
        apply_classification(&mut bag, model, &classification, &self.images);

        let entry = generate_entry(model, &bag, self.config);
        let stored = self.catalog.insert_if_missing(&number.key(), entry);
        bag.catalog = Some(stored);
        bag
    }

    fn from_catalog(&mut self, number: &ModelNumber) -> StepOutcome {
        let Some(hit) = self.catalog.lookup(number) else {
            return StepOutcome::Failed(SourceError::not_found("no catalog entry"));
        };
        let model = number.canonical();
        let mut entry = hit.entry;

        if entry.unknown_count() > 0 || is_generic_description(&entry.description, model) {
            if let Some(improved) = self.reclassify(&entry, model) {
                entry = improved;
                let stored = entry.clone();
                self.catalog.update(&hit.key, |e| *e = stored);
            }
        }

        let mut image_url = entry.image_url.trim().to_string();
        if image_url.is_empty() || !has_supported_image_extension(&image_url) {
            let found = prepare_image_url(&self.find_catalog_image(&entry, model));
            if is_valid_image_url(&found) {
                if found != IMAGE_PLACEHOLDER_URL {
                    let persisted = found.clone();
                    self.catalog.update(&hit.key, |e| e.image_url = persisted);
                    entry.image_url = found.clone();
                }
                image_url = found;
            }
        }

        log::info!("Found catalog entry {} for {model}", hit.key);
        let mut bag = AttributeBag::from_catalog(entry, model);
        bag.image_url = image_url;
        StepOutcome::Resolved(Box::new(bag))
    }

    /// Classify a weak catalog entry again. The result is kept only if it
    /// has no more unknown groups than the stored entry.
    fn reclassify(&self, entry: &CatalogEntry, model: &str) -> Option<CatalogEntry> {
        let mut bag = AttributeBag::from_catalog(entry.clone(), model);
        let hint = bag.brand_hint(model);
        let classification = self.classifier.classify(self.http, model, &hint);
        apply_classification(&mut bag, model, &classification, &PlaceholderImages);
        if bag.image_url == IMAGE_PLACEHOLDER_URL {
            bag.image_url = entry.image_url.clone();
        }

        let improved = generate_entry(model, &bag, self.config);
        accept_reclassification(entry, improved, model)
    }

    /// Image for a catalog entry: a priority-source page image, then the
    /// feature-gathering image, then image search.
    fn find_catalog_image(&self, entry: &CatalogEntry, model: &str) -> String {
        let brand = first_non_empty(&[
            &normalize_brand(&entry.brand),
            &infer_brand_from_model(model),
            &normalize_brand(model),
        ]);

        match PrioritySources::new(self.http).fetch(model, &brand) {
            Ok(raw) => {
                let mut bag = AttributeBag::from_raw(raw, ResolutionOrigin::PrioritySource);
                enrich(&mut bag, model, self.http);
                if !bag.image_url.is_empty() {
                    return bag.image_url;
                }
            }
            Err(e) => log::debug!("Priority image lookup failed for {model}: {e}"),
        }

        let external = gather_external_features(self.http, model, &brand);
        if !external.image_url.is_empty() {
            return external.image_url;
        }
        self.images.find_image(model)
    }
}

/// A reclassified entry replaces the stored one only if it has no more
/// unknown groups.
fn accept_reclassification(
    stored: &CatalogEntry,
    candidate: CatalogEntry,
    model: &str,
) -> Option<CatalogEntry> {
    if candidate.unknown_count() <= stored.unknown_count() {
        Some(candidate)
    } else {
        log::debug!(
            "Keeping catalog entry for {model}: reclassification has {} unknown groups",
            candidate.unknown_count()
        );
        None
    }
}

fn require_image(raw: RawFetchResult, step: Step) -> Result<RawFetchResult, SourceError> {
    if raw.image_url.trim().is_empty() {
        Err(SourceError::not_found(format!("{step} listing has no image")))
    } else {
        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use watch_porter_core::{CategoryGroup, GroupValue};

    use super::*;

    fn entry_with(groups: &[(CategoryGroup, GroupValue)]) -> CatalogEntry {
        let mut entry = CatalogEntry::default();
        for (group, value) in groups {
            entry.groups.set(*group, Some(value.clone()));
        }
        entry
    }

    #[test]
    fn reclassification_may_not_add_unknowns() {
        let stored = entry_with(&[
            (CategoryGroup::DialColor, GroupValue::label("SR - Göy")),
            (CategoryGroup::Gender, GroupValue::Unknown),
        ]);
        let worse = entry_with(&[
            (CategoryGroup::DialColor, GroupValue::Unknown),
            (CategoryGroup::Gender, GroupValue::Unknown),
        ]);
        assert_eq!(accept_reclassification(&stored, worse, "SKX007"), None);
    }

    #[test]
    fn reclassification_with_equal_or_fewer_unknowns_is_kept() {
        let stored = entry_with(&[(CategoryGroup::Gender, GroupValue::Unknown)]);
        let same = entry_with(&[(CategoryGroup::Movement, GroupValue::Unknown)]);
        let better = entry_with(&[(CategoryGroup::Gender, GroupValue::label("Cinsi - Kişi"))]);

        assert_eq!(
            accept_reclassification(&stored, same.clone(), "SKX007"),
            Some(same)
        );
        assert_eq!(
            accept_reclassification(&stored, better.clone(), "SKX007"),
            Some(better)
        );
    }
}

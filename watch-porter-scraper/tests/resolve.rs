use std::cell::{Cell, RefCell};

use serde_json::Value;
use tempfile::TempDir;
use watch_porter_catalog::{CatalogEntry, CatalogStore};
use watch_porter_core::{
    CategoryGroup, GroupValue, IMAGE_PLACEHOLDER_URL, MappingConfig, ResolutionOrigin,
};
use watch_porter_scraper::images::Wikimedia;
use watch_porter_scraper::{
    Classifier, HttpClient, ImageCandidate, ImageFinder, ImageProvider, ResolveEvent, Resolver,
    SourceError,
};

/// Answers requests whose URL starts with a known prefix; everything else
/// fails like a dead network. Counts every request.
struct FakeWeb {
    pages: Vec<(&'static str, &'static str)>,
    calls: Cell<usize>,
}

impl FakeWeb {
    fn offline() -> Self {
        Self::with_pages(Vec::new())
    }

    fn with_pages(pages: Vec<(&'static str, &'static str)>) -> Self {
        Self {
            pages,
            calls: Cell::new(0),
        }
    }
}

impl HttpClient for FakeWeb {
    fn get(&self, url: &str, _query: &[(&str, String)]) -> Result<String, SourceError> {
        self.calls.set(self.calls.get() + 1);
        self.pages
            .iter()
            .find(|(prefix, _)| url.starts_with(prefix))
            .map(|(_, body)| body.to_string())
            .ok_or_else(|| SourceError::transport(format!("offline: {url}")))
    }

    fn post_json(
        &self,
        url: &str,
        _query: &[(&str, String)],
        _headers: &[(&str, String)],
        _body: &Value,
    ) -> Result<String, SourceError> {
        self.calls.set(self.calls.get() + 1);
        Err(SourceError::transport(format!("offline: {url}")))
    }
}

/// Image provider returning one fixed picture.
struct OnePicture(&'static str);

impl ImageProvider for OnePicture {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn search(
        &self,
        _http: &dyn HttpClient,
        _query: &str,
        _limit: usize,
    ) -> Result<Vec<ImageCandidate>, SourceError> {
        Ok(vec![ImageCandidate {
            url: self.0.to_string(),
            width: 1200,
            height: 1200,
            source: "fixed",
        }])
    }
}

fn resolver<'a>(
    http: &'a FakeWeb,
    config: &'a MappingConfig,
    catalog: &'a mut CatalogStore,
) -> Resolver<'a> {
    Resolver::with_parts(
        http,
        config,
        catalog,
        Classifier::disabled(),
        ImageFinder::with_providers(http, vec![Box::new(Wikimedia)]),
    )
}

fn complete_entry() -> CatalogEntry {
    let mut entry = CatalogEntry {
        name: "Seiko SKX007".into(),
        brand: "SEIKO".into(),
        description: "Automatic 200m diver with black dial and steel bracelet".into(),
        price: "289.00".into(),
        image_url: "https://img.test/skx007.jpg".into(),
        ..Default::default()
    };
    for (group, label) in [
        (CategoryGroup::DialColor, "SR - Qara"),
        (CategoryGroup::Bracelet, "Bilərzik - Polad"),
        (CategoryGroup::Gender, "Cinsi - Kişi"),
        (CategoryGroup::Movement, "Mexanika"),
        (CategoryGroup::CaseSize, "Ölçü - 42 x 42 mm"),
        (CategoryGroup::StrapColor, "KR - Boz"),
        (CategoryGroup::CaseMaterial, "Polad"),
    ] {
        entry.groups.set(group, Some(GroupValue::label(label)));
    }
    entry
}

#[test]
fn offline_resolution_falls_back_to_synthetic() {
    let http = FakeWeb::offline();
    let config = MappingConfig::defaults();
    let mut catalog = CatalogStore::in_memory();

    let resolution = resolver(&http, &config, &mut catalog).resolve_traced("SKX007");
    let bag = &resolution.bag;

    assert_eq!(bag.origin, ResolutionOrigin::Synthetic);
    assert_eq!(bag.brand, "SEIKO");
    assert_eq!(bag.description, "Watch Model: SKX007");
    assert_eq!(bag.image_url, IMAGE_PLACEHOLDER_URL);
    assert_eq!(bag.groups.text(CategoryGroup::CaseSize), "Ölçü - 42 x 42 mm");
    for group in CategoryGroup::ALL {
        assert!(!bag.groups.text(group).is_empty(), "{group:?} is empty");
    }
    // One warning per failed step.
    assert_eq!(resolution.warnings.len(), 5);
    assert!(resolution.warnings[0].starts_with("catalog:"));

    let stored = catalog.get("SKX007").expect("synthetic entry persisted");
    assert_eq!(stored.brand, "SEIKO");
    assert_eq!(stored.filled_count(), 7);
}

#[test]
fn synthetic_bag_keeps_the_entered_name() {
    let http = FakeWeb::offline();
    let config = MappingConfig::defaults();
    let mut catalog = CatalogStore::in_memory();

    let resolution = resolver(&http, &config, &mut catalog).resolve_traced("Seiko SKX007");

    assert_eq!(resolution.model, "Seiko SKX007");
    assert_eq!(resolution.bag.origin, ResolutionOrigin::Synthetic);
    assert_eq!(resolution.bag.name, "Seiko SKX007");
    assert_eq!(resolution.bag.description, "Watch Model: SKX007");
    let seiko = config.brand_collection("SEIKO").unwrap();
    assert_eq!(catalog.get("SKX007").unwrap().name, format!("{seiko} SKX007"));
}

#[test]
fn complete_catalog_entry_needs_no_network() {
    let http = FakeWeb::offline();
    let config = MappingConfig::defaults();
    let mut catalog = CatalogStore::in_memory();
    catalog.upsert("SKX007", complete_entry());

    let mut r = resolver(&http, &config, &mut catalog);
    let first = r.resolve("SKX007");
    let second = r.resolve("SKX007");
    let respelled = r.resolve("skx-007");

    assert_eq!(http.calls.get(), 0);
    assert_eq!(first.origin, ResolutionOrigin::Catalog);
    assert_eq!(first.image_url, "https://img.test/skx007.jpg");
    assert_eq!(first.groups.text(CategoryGroup::Movement), "Mexanika");
    assert_eq!(first, second);
    assert_eq!(first.groups, respelled.groups);
    assert_eq!(first.name, respelled.name);
    drop(r);
    assert_eq!(catalog.get("SKX007"), Some(&complete_entry()));
}

/// Stored entry with a known dial, an unknown gender and the templated
/// description, so a catalog hit reclassifies it.
fn weak_entry() -> CatalogEntry {
    let mut entry = CatalogEntry {
        name: "Seiko SKX007".into(),
        brand: "SEIKO".into(),
        description: "Watch Model: SKX007".into(),
        price: "289.00".into(),
        image_url: "https://img.test/skx007.jpg".into(),
        ..Default::default()
    };
    entry
        .groups
        .set(CategoryGroup::DialColor, Some(GroupValue::label("SR - Göy")));
    entry.groups.set(CategoryGroup::Gender, Some(GroupValue::Unknown));
    entry
}

#[test]
fn weak_catalog_entry_is_improved_and_persisted() {
    let http = FakeWeb::offline();
    let config = MappingConfig::defaults();
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("catalog.json");
    let mut catalog = CatalogStore::open(&path);
    catalog.upsert("SKX007", weak_entry());

    let bag = resolver(&http, &config, &mut catalog).resolve("SKX007");

    assert_eq!(http.calls.get(), 0);
    assert_eq!(bag.origin, ResolutionOrigin::Catalog);
    assert_eq!(bag.groups.text(CategoryGroup::DialColor), "SR - Göy");
    assert_eq!(bag.groups.text(CategoryGroup::Gender), "Cinsi - Kişi");

    let reloaded = CatalogStore::load(&path).unwrap();
    let stored = reloaded.get("SKX007").unwrap();
    assert_eq!(stored.unknown_count(), 0);
    assert_eq!(stored.groups.text(CategoryGroup::DialColor), "SR - Göy");
    assert_eq!(stored.groups.text(CategoryGroup::Gender), "Cinsi - Kişi");
    assert_eq!(stored.image_url, "https://img.test/skx007.jpg");
}

#[test]
fn known_labels_survive_reclassification() {
    let http = FakeWeb::offline();
    let config = MappingConfig::defaults();
    let mut catalog = CatalogStore::in_memory();
    let mut entry = complete_entry();
    entry.description = "Watch Model: SKX007".into();
    catalog.upsert("SKX007", entry.clone());

    let bag = resolver(&http, &config, &mut catalog).resolve("SKX007");

    assert_eq!(bag.groups, entry.groups);
    assert_eq!(catalog.get("SKX007").unwrap().groups, entry.groups);
    assert_eq!(catalog.get("SKX007").unwrap().unknown_count(), 0);
}

#[test]
fn catalog_image_is_backfilled_and_persisted() {
    let http = FakeWeb::offline();
    let config = MappingConfig::defaults();
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("catalog.json");
    let mut catalog = CatalogStore::open(&path);
    let mut entry = complete_entry();
    entry.image_url = String::new();
    catalog.upsert("SKX007", entry);

    let bag = {
        let mut r = Resolver::with_parts(
            &http,
            &config,
            &mut catalog,
            Classifier::disabled(),
            ImageFinder::with_providers(&http, vec![Box::new(OnePicture(
                "https://img.test/found.png",
            ))]),
        );
        r.resolve("SKX007")
    };

    assert_eq!(bag.image_url, "https://img.test/found.png");
    let reloaded = CatalogStore::load(&path).unwrap();
    assert_eq!(
        reloaded.get("SKX007").unwrap().image_url,
        "https://img.test/found.png"
    );
}

#[test]
fn placeholder_image_is_not_persisted() {
    let http = FakeWeb::offline();
    let config = MappingConfig::defaults();
    let mut catalog = CatalogStore::in_memory();
    let mut entry = complete_entry();
    entry.image_url = String::new();
    catalog.upsert("SKX007", entry);

    let bag = resolver(&http, &config, &mut catalog).resolve("SKX007");
    assert_eq!(bag.image_url, IMAGE_PLACEHOLDER_URL);
    assert_eq!(catalog.get("SKX007").unwrap().image_url, "");
}

#[test]
fn marketplace_listing_resolves_and_is_stored() {
    let http = FakeWeb::with_pages(vec![(
        "https://www.chrono24.com/search",
        r#"<html><body>
            <div class="js-article-item-container">
              <img src="https://img.chrono24.test/skx007.jpg">
              <h3>Seiko Prospex SKX007 Diver</h3>
              <p>Automatic, stainless steel, 42mm, $ 315</p>
            </div>
        </body></html>"#,
    )]);
    let config = MappingConfig::defaults();
    let mut catalog = CatalogStore::in_memory();

    let resolution = resolver(&http, &config, &mut catalog).resolve_traced("SKX007");

    assert_eq!(resolution.bag.origin, ResolutionOrigin::Chrono24);
    assert_eq!(resolution.bag.name, "Seiko Prospex SKX007 Diver");
    assert_eq!(resolution.bag.image_url, "https://img.chrono24.test/skx007.jpg");
    assert_eq!(resolution.warnings.len(), 2);
    let stored = catalog.get("SKX007").unwrap();
    assert_eq!(stored.price, "315.00");
    assert!(!stored.price_estimated);
}

#[test]
fn empty_model_makes_no_requests() {
    let http = FakeWeb::offline();
    let config = MappingConfig::defaults();
    let mut catalog = CatalogStore::in_memory();

    let bag = resolver(&http, &config, &mut catalog).resolve("   ");
    assert_eq!(bag.origin, ResolutionOrigin::Synthetic);
    assert_eq!(http.calls.get(), 0);
    assert!(catalog.is_empty());
}

#[test]
fn batch_reports_progress() {
    let http = FakeWeb::offline();
    let config = MappingConfig::defaults();
    let mut catalog = CatalogStore::in_memory();
    catalog.upsert("SKX007", complete_entry());

    let events = RefCell::new(Vec::new());
    let models = vec!["SKX007".to_string(), "ZZ1234".to_string()];
    let results = resolver(&http, &config, &mut catalog).resolve_batch(&models, &|event| {
        events.borrow_mut().push(event)
    });

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].bag.origin, ResolutionOrigin::Catalog);
    assert_eq!(results[1].bag.origin, ResolutionOrigin::Synthetic);

    let events = events.into_inner();
    assert_eq!(events.len(), 5);
    assert!(matches!(events[0], ResolveEvent::Started { index: 0, .. }));
    assert!(matches!(
        events[3],
        ResolveEvent::Completed {
            index: 1,
            origin: ResolutionOrigin::Synthetic,
            ..
        }
    ));
    assert!(matches!(events[4], ResolveEvent::Done));
}

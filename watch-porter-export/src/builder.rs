//! Projecting resolved bags onto the import schema.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use watch_porter_catalog::collections_for_entry;
use watch_porter_core::text::{first_non_empty, truncate_chars};
use watch_porter_core::{
    AttributeBag, CatalogEntry, CategoryDetector, ImageLookup, MappingConfig, RawFetchResult,
    ResolutionOrigin, UNIVERSAL_COLLECTION, estimate_price, infer_brand_from_model,
    is_usable_image_url, normalize_brand, prepare_image_url, product_name, template_description,
};

use crate::batch::make_unique_handle;
use crate::row::{FieldType, OutputRow, PriceOrigin};

static SLUG_JUNK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9\s-]").unwrap());
static SLUG_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static SLUG_DASHES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-+").unwrap());

/// Lowercase, keep `[a-z0-9]`, whitespace and dashes, turn whitespace runs
/// into single dashes and trim dashes from both ends. May be empty.
pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    let kept = SLUG_JUNK.replace_all(&lower, "");
    let dashed = SLUG_SPACE.replace_all(kept.trim(), "-");
    SLUG_DASHES
        .replace_all(&dashed, "-")
        .trim_matches('-')
        .to_string()
}

/// Handle for a model: its slug, else the name's slug, else a digest of the
/// model text.
fn handle_for(model: &str, name: &str) -> String {
    let from_model = slugify(model);
    if !from_model.is_empty() {
        return from_model;
    }
    let from_name = slugify(name);
    if !from_name.is_empty() {
        return from_name;
    }
    let digest = format!("{:x}", md5::compute(model.as_bytes()));
    format!("product-{}", &digest[..8])
}

/// `<p>` description followed by a `<ul>` of specs when there are any.
fn description_html(description: &str, specs: &[String]) -> String {
    let mut html = format!("<p>{description}</p>");
    if !specs.is_empty() {
        html.push_str("<ul>");
        for spec in specs {
            html.push_str(&format!("<li>{spec}</li>"));
        }
        html.push_str("</ul>");
    }
    html
}

/// Builds import rows from resolved bags.
pub struct RowBuilder<'a> {
    config: &'a MappingConfig,
    images: &'a dyn ImageLookup,
}

impl<'a> RowBuilder<'a> {
    pub fn new(config: &'a MappingConfig, images: &'a dyn ImageLookup) -> Self {
        Self { config, images }
    }

    /// Project one bag onto the schema. Catalog values take precedence over
    /// the bag's own where both exist.
    pub fn build_row(&self, bag: &AttributeBag, model: &str) -> OutputRow {
        let model = model.trim();
        let catalog = bag.catalog.as_ref();
        let empty = CatalogEntry::default();
        let stored = catalog.unwrap_or(&empty);

        let brand = first_non_empty(&[
            &normalize_brand(stored.brand.trim()),
            &normalize_brand(&bag.brand),
            &normalize_brand(&bag.name),
            &infer_brand_from_model(model),
            &normalize_brand(model),
        ]);
        let brand_column = self
            .config
            .brand_collection(&brand)
            .unwrap_or(UNIVERSAL_COLLECTION)
            .to_string();

        let name = truncate_chars(
            &first_non_empty(&[
                stored.name.trim(),
                &product_name(&self.config.brand_label(&brand, &bag.name), model),
            ]),
            255,
        );

        let mut row = OutputRow::new();
        row.set_handle(handle_for(model, &name));
        row.set_field_type(FieldType::Product);

        let description = first_non_empty(&[
            stored.description.trim(),
            &bag.description,
            &template_description(model),
        ]);
        row.set("description", description_html(&description, &bag.specs));

        let mut image = prepare_image_url(&first_non_empty(&[
            stored.image_url.trim(),
            bag.image_url.trim(),
        ]));
        if !is_usable_image_url(&image) {
            image = self.images.find_image(model);
        }
        row.set("productImageUrl", image);

        let collections = match catalog {
            Some(entry) => collections_for_entry(entry, self.config),
            None => CategoryDetector::new(self.config).map_collections(
                &name,
                &bag.description,
                &brand,
                model,
                &bag.feature_text,
            ),
        };
        row.set("collection", collections.join(";"));
        row.set("sku", model);

        let scraped = first_non_empty(&[stored.price.trim(), bag.price.trim()]);
        if scraped.is_empty() {
            let seed_brand = first_non_empty(&[&brand, &brand_column]);
            row.set("price", estimate_price(model, &seed_brand));
            row.price_origin = PriceOrigin::Estimated;
        } else {
            let from_estimate =
                catalog.is_some_and(|c| c.price_estimated && c.price.trim() == scraped);
            row.set("price", scraped);
            if from_estimate {
                row.price_origin = PriceOrigin::Estimated;
            }
        }

        row.set("visible", "true");
        row.set("inventory", "10");
        row.set("name", name);
        row.set("brand", brand_column);
        row.trim_values();
        row
    }

    /// Build rows for a batch, suffixing repeated handles with `-2`, `-3`...
    pub fn build_rows<'m, 'b>(
        &self,
        items: impl IntoIterator<Item = (&'m str, &'b AttributeBag)>,
    ) -> Vec<OutputRow> {
        let mut used = HashSet::new();
        items
            .into_iter()
            .map(|(model, bag)| {
                let mut row = self.build_row(bag, model);
                let handle = make_unique_handle(row.handle(), &mut used);
                row.set_handle(handle);
                row
            })
            .collect()
    }

    /// The example row shipped with the template download.
    pub fn template_row(&self) -> OutputRow {
        let bag = AttributeBag::from_raw(
            RawFetchResult {
                name: "Example Watch".into(),
                description: "This is an example watch product".into(),
                image_url: "https://example.com/watch.jpg".into(),
                brand: "Seiko".into(),
                specs: vec![
                    "Quartz Movement".into(),
                    "Stainless Steel".into(),
                    "100m Water Resistant".into(),
                ],
                ..Default::default()
            },
            ResolutionOrigin::Synthetic,
        );
        self.build_row(&bag, "EXAMPLE001")
    }
}

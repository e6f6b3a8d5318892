use std::sync::LazyLock;

use scraper::{Html, Selector};
use watch_porter_core::image_url::{is_valid_image_url, prepare_image_url};
use watch_porter_core::text::{first_non_empty, truncate_chars};
use watch_porter_core::{
    RawFetchResult, UNIVERSAL_COLLECTION, extract_price, normalize_brand, template_description,
};

use super::AttributeSource;
use crate::client::{HttpClient, get_with_retry};
use crate::error::SourceError;
use crate::search::{element_text, extract_specs, image_from_element};

const SEARCH_URL: &str = "https://www.chrono24.com/search/index.htm";
const SITE_ROOT: &str = "https://www.chrono24.com";

static CARD: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("article, a.productList, div.js-article-item-container").unwrap()
});
static CARD_TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h2, h3, .article-title").unwrap());
static CARD_IMAGE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());

/// Chrono24 marketplace search, first listing only.
pub struct Chrono24<'a> {
    http: &'a dyn HttpClient,
}

impl<'a> Chrono24<'a> {
    pub fn new(http: &'a dyn HttpClient) -> Self {
        Self { http }
    }
}

impl AttributeSource for Chrono24<'_> {
    fn name(&self) -> &'static str {
        "Chrono24"
    }

    fn fetch(&self, model: &str, _brand_hint: &str) -> Result<RawFetchResult, SourceError> {
        let html = get_with_retry(
            self.http,
            SEARCH_URL,
            &[("query", model.to_string())],
            &format!("Chrono24 for {model}"),
        )?;
        parse_listing(&html, model)
    }
}

fn parse_listing(html: &str, model: &str) -> Result<RawFetchResult, SourceError> {
    let doc = Html::parse_document(html);
    let card = doc
        .select(&CARD)
        .next()
        .ok_or_else(|| SourceError::not_found(format!("no Chrono24 listing for {model}")))?;

    let name = first_non_empty(&[
        &card.select(&CARD_TITLE).next().map(element_text).unwrap_or_default(),
        model,
    ]);
    let mut image = card
        .select(&CARD_IMAGE)
        .next()
        .map(image_from_element)
        .unwrap_or_default();
    if image.starts_with('/') && !image.starts_with("//") {
        image = format!("{SITE_ROOT}{image}");
    }
    let image = prepare_image_url(&image);
    let product_text = element_text(card);

    Ok(RawFetchResult {
        brand: first_non_empty(&[
            &normalize_brand(&name),
            &normalize_brand(model),
            UNIVERSAL_COLLECTION,
        ]),
        description: first_non_empty(&[
            &truncate_chars(&product_text, 500),
            &template_description(model),
        ]),
        image_url: if is_valid_image_url(&image) {
            image
        } else {
            String::new()
        },
        price: extract_price(&product_text),
        specs: extract_specs(&format!("{name} {product_text}")),
        name: truncate_chars(&name, 255),
        feature_text: product_text,
    })
}

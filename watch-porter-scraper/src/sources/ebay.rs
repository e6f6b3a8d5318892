use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use watch_porter_core::image_url::{is_valid_image_url, prepare_image_url};
use watch_porter_core::text::{first_non_empty, truncate_chars};
use watch_porter_core::{
    RawFetchResult, UNIVERSAL_COLLECTION, extract_price, normalize_brand, template_description,
};

use super::AttributeSource;
use crate::client::{HttpClient, get_with_retry};
use crate::error::SourceError;
use crate::search::{element_text, extract_specs};

const SEARCH_URL: &str = "https://www.ebay.com/sch/i.html";

static ITEM: LazyLock<Selector> = LazyLock::new(|| Selector::parse("li.s-item").unwrap());
static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".s-item__title").unwrap());
static IMAGE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".s-item__image-img").unwrap());
static PRICE: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".s-item__price").unwrap());
static SUBTITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".s-item__subtitle").unwrap());

/// eBay listing search.
pub struct Ebay<'a> {
    http: &'a dyn HttpClient,
}

impl<'a> Ebay<'a> {
    pub fn new(http: &'a dyn HttpClient) -> Self {
        Self { http }
    }
}

impl AttributeSource for Ebay<'_> {
    fn name(&self) -> &'static str {
        "eBay"
    }

    fn fetch(&self, model: &str, _brand_hint: &str) -> Result<RawFetchResult, SourceError> {
        let html = get_with_retry(
            self.http,
            SEARCH_URL,
            &[("_nkw", format!("{model} watch"))],
            &format!("eBay for {model}"),
        )?;
        parse_listing(&html, model)
    }
}

fn child_text(item: ElementRef<'_>, selector: &Selector) -> String {
    item.select(selector).next().map(element_text).unwrap_or_default()
}

fn parse_listing(html: &str, model: &str) -> Result<RawFetchResult, SourceError> {
    let doc = Html::parse_document(html);
    let mut items = doc.select(&ITEM);
    let mut item = items
        .next()
        .ok_or_else(|| SourceError::not_found(format!("no eBay listing for {model}")))?;

    // The first card is sometimes a "Shop on eBay" banner.
    if child_text(item, &TITLE).to_lowercase().contains("shop on ebay") {
        item = items
            .next()
            .ok_or_else(|| SourceError::not_found(format!("no eBay listing for {model}")))?;
    }

    let title = child_text(item, &TITLE);
    let subtitle = child_text(item, &SUBTITLE);
    let price_text = child_text(item, &PRICE);
    let image = item
        .select(&IMAGE)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(prepare_image_url)
        .unwrap_or_default();
    let full_text = format!("{title} {subtitle}").trim().to_string();

    Ok(RawFetchResult {
        name: first_non_empty(&[&truncate_chars(&title, 255), model]),
        description: first_non_empty(&[&full_text, &template_description(model)]),
        image_url: if is_valid_image_url(&image) {
            image
        } else {
            String::new()
        },
        brand: first_non_empty(&[
            &normalize_brand(&title),
            &normalize_brand(model),
            UNIVERSAL_COLLECTION,
        ]),
        price: first_non_empty(&[&extract_price(&price_text), &extract_price(&full_text)]),
        specs: extract_specs(&full_text),
        feature_text: full_text,
    })
}

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use watch_porter_core::image_url::{is_valid_image_url, prepare_image_url};
use watch_porter_core::text::{first_non_empty, truncate_chars};
use watch_porter_core::{
    RawFetchResult, UNIVERSAL_COLLECTION, extract_price, normalize_brand, normalize_price,
    template_description,
};

use super::AttributeSource;
use crate::client::{HttpClient, get_with_retry};
use crate::error::SourceError;
use crate::search::{element_text, extract_specs, meta_image, page_title, visible_text};

const SEARCH_URL: &str = "https://www.google.com/search";

static LD_JSON: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).unwrap());
static RESULT_HEADING: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h3").unwrap());
static SNIPPET: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.VwiC3b").unwrap());
static SEARCH_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*-\s*Google\s+Search\s*$").unwrap());

/// General web search through the Google results page.
pub struct GoogleSearch<'a> {
    http: &'a dyn HttpClient,
}

impl<'a> GoogleSearch<'a> {
    pub fn new(http: &'a dyn HttpClient) -> Self {
        Self { http }
    }
}

impl AttributeSource for GoogleSearch<'_> {
    fn name(&self) -> &'static str {
        "Google search"
    }

    fn fetch(&self, model: &str, _brand_hint: &str) -> Result<RawFetchResult, SourceError> {
        let html = get_with_retry(
            self.http,
            SEARCH_URL,
            &[("q", format!("{model} watch"))],
            &format!("Google for {model}"),
        )?;
        Ok(parse_results(&html, model))
    }
}

/// Product fields found in `application/ld+json` blocks.
#[derive(Debug, Default)]
struct StructuredProduct {
    name: String,
    description: String,
    image: String,
    brand: String,
    price: String,
}

impl StructuredProduct {
    fn absorb(&mut self, product: &serde_json::Map<String, Value>) {
        fill(&mut self.name, text_of(product.get("name")));
        fill(&mut self.description, text_of(product.get("description")));
        fill(&mut self.image, image_of(product.get("image")));
        fill(&mut self.brand, named_text(product.get("brand")));
        fill(&mut self.price, offer_price(product.get("offers")));
    }

    fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.image.is_empty()
    }
}

fn fill(slot: &mut String, value: String) {
    if slot.is_empty() {
        *slot = value.trim().to_string();
    }
}

fn text_of(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn named_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::Object(obj)) => text_of(obj.get("name")),
        other => text_of(other),
    }
}

fn image_of(value: Option<&Value>) -> String {
    match value {
        Some(Value::Array(items)) => image_of(items.first()),
        Some(Value::Object(obj)) => text_of(obj.get("url")),
        other => text_of(other),
    }
}

fn offer_price(value: Option<&Value>) -> String {
    let offer = match value {
        Some(Value::Array(items)) => items.first(),
        other => other,
    };
    let Some(Value::Object(offer)) = offer else {
        return String::new();
    };
    ["price", "lowPrice", "highPrice"]
        .iter()
        .map(|key| normalize_price(&text_of(offer.get(*key))))
        .find(|p| !p.is_empty())
        .unwrap_or_default()
}

/// Flatten a JSON-LD document into its objects, descending into arrays and
/// `@graph` lists.
fn collect_objects<'v>(value: &'v Value, out: &mut Vec<&'v serde_json::Map<String, Value>>) {
    match value {
        Value::Array(items) => items.iter().for_each(|item| collect_objects(item, out)),
        Value::Object(obj) => {
            out.push(obj);
            if let Some(graph) = obj.get("@graph") {
                collect_objects(graph, out);
            }
        }
        _ => {}
    }
}

fn is_product(obj: &serde_json::Map<String, Value>) -> bool {
    let kind = match obj.get("@type") {
        Some(Value::Array(kinds)) => kinds.iter().map(|k| text_of(Some(k))).collect::<Vec<_>>().join(" "),
        other => text_of(other),
    };
    kind.to_lowercase().contains("product")
}

fn structured_product(doc: &Html) -> StructuredProduct {
    let mut product = StructuredProduct::default();
    for script in doc.select(&LD_JSON) {
        let raw = script.text().collect::<String>();
        let Ok(value) = serde_json::from_str::<Value>(raw.trim()) else {
            log::debug!("Skipping unparseable ld+json block");
            continue;
        };
        let mut objects = Vec::new();
        collect_objects(&value, &mut objects);
        for obj in objects.into_iter().filter(|o| is_product(o)) {
            product.absorb(obj);
            if product.is_complete() {
                return product;
            }
        }
    }
    product
}

fn parse_results(html: &str, model: &str) -> RawFetchResult {
    let doc = Html::parse_document(html);
    let ld = structured_product(&doc);

    let heading = doc.select(&RESULT_HEADING).next().map(element_text).unwrap_or_default();
    let title = SEARCH_SUFFIX.replace(&page_title(&doc), "").trim().to_string();
    let title = if title.eq_ignore_ascii_case("google") {
        String::new()
    } else {
        title
    };
    let name = truncate_chars(&first_non_empty(&[&ld.name, &heading, &title, model]), 255);

    let image = prepare_image_url(&first_non_empty(&[&ld.image, &meta_image(&doc)]));
    let snippet = doc.select(&SNIPPET).next().map(element_text).unwrap_or_default();
    let description = first_non_empty(&[&ld.description, &snippet, &template_description(model)]);
    let page_text = truncate_chars(&visible_text(&doc), 5000);

    RawFetchResult {
        brand: first_non_empty(&[
            &normalize_brand(&ld.brand),
            &normalize_brand(&name),
            &normalize_brand(&description),
            &normalize_brand(model),
            UNIVERSAL_COLLECTION,
        ]),
        price: first_non_empty(&[
            &ld.price,
            &extract_price(&description),
            &extract_price(&page_text),
        ]),
        specs: extract_specs(&format!("{name} {description}")),
        image_url: if is_valid_image_url(&image) {
            image
        } else {
            String::new()
        },
        feature_text: String::new(),
        name,
        description,
    }
}

//! Web search and page parsing shared by the fetchers.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use watch_porter_core::bag::FEATURE_TEXT_LIMIT;
use watch_porter_core::image_url::{is_valid_image_url, normalize_image_url, prepare_image_url};
use watch_porter_core::text::{collapse_whitespace, first_non_empty, truncate_chars};
use watch_porter_core::{RawFetchResult, extract_price, normalize_brand};

use crate::client::HttpClient;
use crate::error::SourceError;

const DUCKDUCKGO_URL: &str = "https://html.duckduckgo.com/html/";

/// Visible text kept per fetched page, in characters.
pub const PAGE_TEXT_LIMIT: usize = 12_000;

/// Words whose presence suggests a page actually describes a watch.
const SPEC_TOKENS: [&str; 8] = [
    "dial", "strap", "bracelet", "movement", "automatic", "quartz", "case", "mm",
];

static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());
static META_DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[name="description"]"#).unwrap());
static OG_IMAGE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[property="og:image"]"#).unwrap());
static TWITTER_IMAGE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[name="twitter:image"]"#).unwrap());
static IMG: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());
static DDG_RESULT: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"a.result__a, a[data-testid="result-title-a"]"#).unwrap()
});

static TITLE_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+[-|–—]\s+").unwrap());
static SPEC_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("Water Resistance", r"(?i)(\d+[mft]+)\s*(water|resistant)"),
        ("Movement", r"(?i)(automatic|quartz|manual|mechanical)"),
        ("Case Material", r"(?i)(stainless steel|titanium|gold|silver|ceramic)"),
    ]
    .into_iter()
    .map(|(name, pattern)| (name, Regex::new(pattern).unwrap()))
    .collect()
});

/// Whitespace-collapsed text content of an element.
pub fn element_text(el: ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<Vec<_>>().join(" "))
}

/// Image URL of an `<img>`, checking lazy-loading attributes and `srcset`.
pub fn image_from_element(el: ElementRef<'_>) -> String {
    let attrs = el.value();
    for name in ["src", "data-src", "data-original", "data-image"] {
        if let Some(value) = attrs.attr(name).filter(|v| !v.trim().is_empty()) {
            return value.trim().to_string();
        }
    }
    attrs
        .attr("srcset")
        .and_then(|srcset| {
            srcset
                .split(',')
                .filter_map(|part| part.split_whitespace().next())
                .next()
        })
        .unwrap_or_default()
        .to_string()
}

fn meta_content(doc: &Html, selector: &Selector) -> String {
    doc.select(selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(normalize_image_url)
        .unwrap_or_default()
}

/// `og:image`, then `twitter:image`.
pub fn meta_image(doc: &Html) -> String {
    first_non_empty(&[
        &meta_content(doc, &OG_IMAGE),
        &meta_content(doc, &TWITTER_IMAGE),
    ])
}

/// Text of the document outside `script`, `style` and `noscript`.
pub fn visible_text(doc: &Html) -> String {
    let mut parts = Vec::new();
    for node in doc.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|e| matches!(e.name(), "script" | "style" | "noscript"))
        });
        let text = text.trim();
        if !hidden && !text.is_empty() {
            parts.push(text);
        }
    }
    collapse_whitespace(&parts.join(" "))
}

pub fn page_title(doc: &Html) -> String {
    doc.select(&TITLE).next().map(element_text).unwrap_or_default()
}

/// The parts of a fetched page used for scoring and feature text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageData {
    pub title: String,
    pub description: String,
    pub text: String,
    pub image_url: String,
}

impl PageData {
    /// Title, description and text, space-joined and trimmed.
    pub fn combined_text(&self) -> String {
        [self.title.as_str(), &self.description, &self.text]
            .join(" ")
            .trim()
            .to_string()
    }
}

pub fn parse_page(html: &str) -> PageData {
    let doc = Html::parse_document(html);
    let description = doc
        .select(&META_DESCRIPTION)
        .next()
        .and_then(|el| el.value().attr("content"))
        .unwrap_or_default()
        .to_string();
    let first_img = doc
        .select(&IMG)
        .next()
        .map(|el| normalize_image_url(&image_from_element(el)))
        .unwrap_or_default();

    let image = prepare_image_url(&first_non_empty(&[&meta_image(&doc), &first_img]));
    PageData {
        title: page_title(&doc),
        description,
        text: truncate_chars(&visible_text(&doc), PAGE_TEXT_LIMIT),
        image_url: if is_valid_image_url(&image) {
            image
        } else {
            String::new()
        },
    }
}

pub fn fetch_page(http: &dyn HttpClient, url: &str) -> Result<PageData, SourceError> {
    let html = http.get(url, &[])?;
    Ok(parse_page(&html))
}

/// Result links from a DuckDuckGo HTML results page, unwrapping its
/// redirect links. At most `max_results`, deduplicated.
pub fn parse_duckduckgo_results(html: &str, max_results: usize) -> Vec<String> {
    let doc = Html::parse_document(html);
    let mut urls: Vec<String> = Vec::new();
    for a in doc.select(&DDG_RESULT) {
        let Some(href) = a.value().attr("href").filter(|h| !h.is_empty()) else {
            continue;
        };
        let href = match href.rsplit_once("uddg=") {
            Some((_, target)) => {
                let target = target.split('&').next().unwrap_or_default();
                urlencoding::decode(target)
                    .map(|t| t.into_owned())
                    .unwrap_or_else(|_| href.to_string())
            }
            None => href.to_string(),
        };
        if (href.starts_with("http://") || href.starts_with("https://")) && !urls.contains(&href) {
            urls.push(href);
        }
        if urls.len() >= max_results {
            break;
        }
    }
    urls
}

/// Search DuckDuckGo. Failures are logged and yield no results.
pub fn duckduckgo_urls(http: &dyn HttpClient, query: &str, max_results: usize) -> Vec<String> {
    match http.get(DUCKDUCKGO_URL, &[("q", query.to_string())]) {
        Ok(html) => parse_duckduckgo_results(&html, max_results),
        Err(e) => {
            log::debug!("DuckDuckGo search failed for '{query}': {e}");
            Vec::new()
        }
    }
}

/// Short spec lines (`"Movement: automatic"`) found in product text.
pub fn extract_specs(text: &str) -> Vec<String> {
    SPEC_PATTERNS
        .iter()
        .filter_map(|(name, re)| re.captures(text).map(|c| format!("{name}: {}", &c[1])))
        .collect()
}

/// Turn a page title into a product name by dropping site suffixes such as
/// `" | Shop"` or `" - Brand"`.
pub fn clean_product_title(title: &str) -> String {
    let title = title.trim();
    let first = TITLE_SEPARATOR.split(title).next().unwrap_or(title).trim();
    truncate_chars(first, 255)
}

/// Evidence score for a page: image +3, price +2, model number +3, brand +2,
/// and +1 per spec keyword.
pub fn score_page(page: &PageData, model: &str, brand_hint: &str) -> u32 {
    let blob = [page.title.as_str(), &page.description, &page.text]
        .join(" ")
        .to_lowercase();

    let mut score = 0;
    if !page.image_url.is_empty() {
        score += 3;
    }
    if !extract_price(&blob).is_empty() {
        score += 2;
    }
    if blob.contains(&model.to_lowercase()) {
        score += 3;
    }
    let brand = normalize_brand(brand_hint).to_lowercase();
    if !brand.is_empty() && blob.contains(&brand) {
        score += 2;
    }
    score
        + SPEC_TOKENS
            .iter()
            .chain(&["water resistance"])
            .filter(|t| blob.contains(*t))
            .count() as u32
}

/// Whether a search payload is generic filler: a search-page title, the
/// templated description, or no watch vocabulary at all.
pub fn is_low_quality(raw: &RawFetchResult, model: &str) -> bool {
    let name = raw.name.trim().to_lowercase();
    let description = raw.description.trim().to_lowercase();
    let feature_text = raw.feature_text.trim().to_lowercase();
    let model = model.to_lowercase();

    if ["google search", "search results", "watch model"]
        .iter()
        .any(|g| name.contains(g))
    {
        return true;
    }
    if description == format!("watch model: {model}") || description == format!("watch model {model}")
    {
        return true;
    }
    let blob = [name, description, feature_text].join(" ");
    !SPEC_TOKENS.iter().any(|t| blob.contains(t))
}

/// Text and image collected from general web results about a model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExternalFeatures {
    pub feature_text: String,
    pub image_url: String,
}

/// Search the web for pages describing the model and join what they say.
/// Reads up to 4 result pages.
pub fn gather_external_features(http: &dyn HttpClient, model: &str, brand: &str) -> ExternalFeatures {
    let query = format!("{brand} {model} watch dial color strap bracelet movement case size");
    let urls = duckduckgo_urls(http, query.trim(), 6);

    let mut chunks = Vec::new();
    let mut image_url = String::new();
    for url in urls.iter().take(4) {
        match fetch_page(http, url) {
            Ok(page) => {
                let combined = page.combined_text();
                if !combined.is_empty() {
                    chunks.push(combined);
                }
                if image_url.is_empty() && !page.image_url.is_empty() {
                    image_url = page.image_url;
                }
            }
            Err(e) => log::debug!("Feature page {url} failed: {e}"),
        }
    }

    ExternalFeatures {
        feature_text: truncate_chars(&chunks.join(" "), FEATURE_TEXT_LIMIT),
        image_url,
    }
}

//! Product photo search across image providers.
//!
//! Providers are tried in a fixed order and the first one that yields a
//! usable candidate wins. Credentialed providers are skipped when their
//! keys are not configured.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use watch_porter_core::image_url::prepare_image_url;
use watch_porter_core::text::first_non_empty;
use watch_porter_core::{
    IMAGE_PLACEHOLDER_URL, ImageLookup, infer_brand_from_model, is_usable_image_url,
    normalize_brand,
};

use crate::client::HttpClient;
use crate::credentials::Credentials;
use crate::error::SourceError;

/// Candidates requested from each provider.
const RESULTS_PER_PROVIDER: usize = 10;
/// Shortest side, in pixels, that counts as high resolution.
const HIGH_RES_MIN: u32 = 1000;

static FLICKR_SMALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)_m\.(jpg|jpeg|png|webp)$").unwrap());

/// One image returned by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCandidate {
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub source: &'static str,
}

impl ImageCandidate {
    fn new(url: &str, width: Option<u64>, height: Option<u64>, source: &'static str) -> Self {
        let dim = |v: Option<u64>| v.and_then(|n| u32::try_from(n).ok()).unwrap_or(0);
        Self {
            url: prepare_image_url(url),
            width: dim(width),
            height: dim(height),
            source,
        }
    }

    pub fn is_high_res(&self) -> bool {
        self.width >= HIGH_RES_MIN || self.height >= HIGH_RES_MIN
    }
}

/// An image search backend.
pub trait ImageProvider {
    fn name(&self) -> &'static str;

    fn search(
        &self,
        http: &dyn HttpClient,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ImageCandidate>, SourceError>;
}

/// First high-resolution candidate, else the first candidate.
pub fn pick_image(candidates: &[ImageCandidate]) -> Option<&ImageCandidate> {
    candidates
        .iter()
        .find(|c| c.is_high_res())
        .or_else(|| candidates.first())
}

// -- Google Custom Search --

pub struct GoogleCse {
    key: Option<String>,
    cx: Option<String>,
}

impl GoogleCse {
    pub fn new(key: Option<String>, cx: Option<String>) -> Self {
        Self { key, cx }
    }
}

#[derive(Deserialize)]
struct CseResponse {
    #[serde(default)]
    items: Vec<CseItem>,
}

#[derive(Deserialize)]
struct CseItem {
    #[serde(default)]
    link: String,
    #[serde(default)]
    image: CseImage,
}

#[derive(Deserialize, Default)]
struct CseImage {
    width: Option<u64>,
    height: Option<u64>,
}

impl ImageProvider for GoogleCse {
    fn name(&self) -> &'static str {
        "google_cse"
    }

    fn search(
        &self,
        http: &dyn HttpClient,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ImageCandidate>, SourceError> {
        let (Some(key), Some(cx)) = (&self.key, &self.cx) else {
            return Err(SourceError::MissingCredentials("Google CSE key and engine id"));
        };
        let body = http.get(
            "https://www.googleapis.com/customsearch/v1",
            &[
                ("key", key.clone()),
                ("cx", cx.clone()),
                ("q", query.to_string()),
                ("searchType", "image".into()),
                ("num", limit.min(10).to_string()),
                ("safe", "off".into()),
                ("imgType", "photo".into()),
            ],
        )?;
        let resp: CseResponse = serde_json::from_str(&body)?;
        Ok(resp
            .items
            .iter()
            .filter(|item| !item.link.is_empty())
            .map(|item| ImageCandidate::new(&item.link, item.image.width, item.image.height, self.name()))
            .collect())
    }
}

// -- SerpApi Google Images --

pub struct SerpApi {
    key: Option<String>,
}

impl SerpApi {
    pub fn new(key: Option<String>) -> Self {
        Self { key }
    }
}

#[derive(Deserialize)]
struct SerpResponse {
    #[serde(default)]
    images_results: Vec<SerpImage>,
}

#[derive(Deserialize)]
struct SerpImage {
    #[serde(default)]
    original: String,
    #[serde(default)]
    thumbnail: String,
    original_width: Option<u64>,
    width: Option<u64>,
    original_height: Option<u64>,
    height: Option<u64>,
}

impl ImageProvider for SerpApi {
    fn name(&self) -> &'static str {
        "serpapi"
    }

    fn search(
        &self,
        http: &dyn HttpClient,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ImageCandidate>, SourceError> {
        let Some(key) = &self.key else {
            return Err(SourceError::MissingCredentials("SerpApi key"));
        };
        let body = http.get(
            "https://serpapi.com/search.json",
            &[
                ("engine", "google_images".into()),
                ("q", query.to_string()),
                ("api_key", key.clone()),
                ("ijn", "0".into()),
                ("num", limit.to_string()),
            ],
        )?;
        let resp: SerpResponse = serde_json::from_str(&body)?;
        Ok(resp
            .images_results
            .iter()
            .take(limit)
            .filter_map(|img| {
                let url = first_non_empty(&[&img.original, &img.thumbnail]);
                (!url.is_empty()).then(|| {
                    ImageCandidate::new(
                        &url,
                        img.original_width.or(img.width),
                        img.original_height.or(img.height),
                        self.name(),
                    )
                })
            })
            .collect())
    }
}

// -- Flickr public feed --

pub struct Flickr;

#[derive(Deserialize)]
struct FlickrFeed {
    #[serde(default)]
    items: Vec<FlickrItem>,
}

#[derive(Deserialize)]
struct FlickrItem {
    #[serde(default)]
    media: FlickrMedia,
}

#[derive(Deserialize, Default)]
struct FlickrMedia {
    #[serde(default)]
    m: String,
}

/// Feed tags for a query: lowercase words stripped to `[a-z0-9-]`, at most
/// six, plus `watch`.
pub fn flickr_tags(query: &str) -> String {
    let mut tags: Vec<String> = query
        .to_lowercase()
        .split_whitespace()
        .map(|w| {
            w.chars()
                .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
                .collect::<String>()
        })
        .filter(|w| !w.is_empty())
        .take(6)
        .collect();
    if !tags.iter().any(|t| t == "watch") {
        tags.push("watch".into());
    }
    tags.join(",")
}

impl ImageProvider for Flickr {
    fn name(&self) -> &'static str {
        "flickr"
    }

    fn search(
        &self,
        http: &dyn HttpClient,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ImageCandidate>, SourceError> {
        let body = http.get(
            "https://www.flickr.com/services/feeds/photos_public.gne",
            &[
                ("format", "json".into()),
                ("nojsoncallback", "1".into()),
                ("tags", flickr_tags(query)),
            ],
        )?;
        let feed: FlickrFeed = serde_json::from_str(&body)?;
        Ok(feed
            .items
            .iter()
            .filter(|item| !item.media.m.is_empty())
            .take(limit)
            .map(|item| {
                let large = FLICKR_SMALL.replace(item.media.m.trim(), "_b.$1");
                ImageCandidate::new(&large, None, None, self.name())
            })
            .collect())
    }
}

// -- Wikimedia Commons --

pub struct Wikimedia;

#[derive(Deserialize)]
struct WikiResponse {
    #[serde(default)]
    query: WikiQuery,
}

#[derive(Deserialize, Default)]
struct WikiQuery {
    #[serde(default)]
    pages: BTreeMap<String, WikiPage>,
}

#[derive(Deserialize)]
struct WikiPage {
    /// Search rank when the pages come from a search generator.
    #[serde(default)]
    index: u32,
    #[serde(default)]
    imageinfo: Vec<WikiImageInfo>,
}

#[derive(Deserialize)]
struct WikiImageInfo {
    #[serde(default)]
    url: String,
    #[serde(default)]
    thumburl: String,
    width: Option<u64>,
    height: Option<u64>,
    thumbwidth: Option<u64>,
    thumbheight: Option<u64>,
}

impl ImageProvider for Wikimedia {
    fn name(&self) -> &'static str {
        "wikimedia"
    }

    fn search(
        &self,
        http: &dyn HttpClient,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ImageCandidate>, SourceError> {
        let body = http.get(
            "https://commons.wikimedia.org/w/api.php",
            &[
                ("action", "query".into()),
                ("format", "json".into()),
                ("generator", "search".into()),
                ("gsrsearch", query.to_string()),
                ("gsrnamespace", "6".into()),
                ("gsrlimit", limit.to_string()),
                ("prop", "imageinfo".into()),
                ("iiprop", "url|size".into()),
                ("iiurlwidth", "1600".into()),
            ],
        )?;
        let resp: WikiResponse = serde_json::from_str(&body)?;
        let mut pages: Vec<WikiPage> = resp.query.pages.into_values().collect();
        pages.sort_by_key(|p| p.index);
        Ok(pages
            .iter()
            .filter_map(|page| page.imageinfo.first())
            .filter_map(|info| {
                let url = first_non_empty(&[&info.thumburl, &info.url]);
                (!url.is_empty()).then(|| {
                    ImageCandidate::new(
                        &url,
                        info.thumbwidth.or(info.width),
                        info.thumbheight.or(info.height),
                        self.name(),
                    )
                })
            })
            .take(limit)
            .collect())
    }
}

/// Runs the provider chain for a model number.
pub struct ImageFinder<'a> {
    http: &'a dyn HttpClient,
    providers: Vec<Box<dyn ImageProvider + 'a>>,
}

impl<'a> ImageFinder<'a> {
    /// The standard chain: Google CSE, SerpApi, Flickr, Wikimedia.
    pub fn new(http: &'a dyn HttpClient, creds: &Credentials) -> Self {
        Self::with_providers(
            http,
            vec![
                Box::new(GoogleCse::new(
                    creds.google_cse_key.clone(),
                    creds.google_cse_cx.clone(),
                )),
                Box::new(SerpApi::new(creds.serpapi_key.clone())),
                Box::new(Flickr),
                Box::new(Wikimedia),
            ],
        )
    }

    pub fn with_providers(
        http: &'a dyn HttpClient,
        providers: Vec<Box<dyn ImageProvider + 'a>>,
    ) -> Self {
        Self { http, providers }
    }

    /// Usable candidates from the first provider that has any.
    pub fn search(&self, query: &str) -> Vec<ImageCandidate> {
        for provider in &self.providers {
            match provider.search(self.http, query, RESULTS_PER_PROVIDER) {
                Ok(found) => {
                    let usable: Vec<ImageCandidate> = found
                        .into_iter()
                        .filter(|c| is_usable_image_url(&c.url))
                        .collect();
                    if !usable.is_empty() {
                        log::debug!(
                            "{} found {} image(s) for '{query}'",
                            provider.name(),
                            usable.len()
                        );
                        return usable;
                    }
                }
                Err(SourceError::MissingCredentials(_)) => {}
                Err(e) => log::debug!("{} image search failed for '{query}': {e}", provider.name()),
            }
        }
        Vec::new()
    }
}

impl ImageLookup for ImageFinder<'_> {
    fn find_image(&self, model: &str) -> String {
        let model = model.trim();
        if model.is_empty() {
            return IMAGE_PLACEHOLDER_URL.to_string();
        }
        let brand = first_non_empty(&[&infer_brand_from_model(model), &normalize_brand(model)]);

        let mut candidates = self.search(format!("{brand} {model} watch").trim());
        if candidates.is_empty() && !brand.is_empty() {
            candidates = self.search(&format!("{model} watch"));
        }

        match pick_image(&candidates) {
            Some(best) if is_usable_image_url(&best.url) => best.url.clone(),
            _ => {
                log::debug!("No image found for {model}, using placeholder");
                IMAGE_PLACEHOLDER_URL.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use serde_json::Value;

    use super::*;

    /// Serves canned bodies keyed by URL and records every query.
    struct Canned {
        bodies: Vec<(&'static str, &'static str)>,
        queries: RefCell<Vec<String>>,
    }

    impl HttpClient for Canned {
        fn get(&self, url: &str, query: &[(&str, String)]) -> Result<String, SourceError> {
            self.queries.borrow_mut().push(
                query
                    .iter()
                    .find(|(k, _)| matches!(*k, "q" | "tags" | "gsrsearch"))
                    .map(|(_, v)| v.clone())
                    .unwrap_or_default(),
            );
            self.bodies
                .iter()
                .find(|(prefix, _)| url.starts_with(prefix))
                .map(|(_, body)| body.to_string())
                .ok_or_else(|| SourceError::transport("offline"))
        }

        fn post_json(
            &self,
            _url: &str,
            _query: &[(&str, String)],
            _headers: &[(&str, String)],
            _body: &Value,
        ) -> Result<String, SourceError> {
            Err(SourceError::transport("offline"))
        }
    }

    fn canned(bodies: Vec<(&'static str, &'static str)>) -> Canned {
        Canned {
            bodies,
            queries: RefCell::new(Vec::new()),
        }
    }

    #[test]
    fn prefers_high_resolution() {
        let small = ImageCandidate::new("https://a.test/1.jpg", Some(400), Some(400), "t");
        let large = ImageCandidate::new("https://a.test/2.jpg", Some(300), Some(1200), "t");
        assert_eq!(pick_image(&[small.clone(), large.clone()]), Some(&large));
        assert_eq!(pick_image(&[small.clone()]), Some(&small));
        assert_eq!(pick_image(&[]), None);
    }

    #[test]
    fn flickr_tags_are_cleaned() {
        assert_eq!(flickr_tags("SEIKO SKX007 watch"), "seiko,skx007,watch");
        assert_eq!(flickr_tags("Casio GA-2100!"), "casio,ga-2100,watch");
    }

    #[test]
    fn keyless_chain_uses_flickr_and_upgrades() {
        let http = canned(vec![(
            "https://www.flickr.com/",
            r#"{"items": [
                {"media": {"m": "https://live.staticflickr.com/1/logo_m.jpg"}},
                {"media": {"m": "https://live.staticflickr.com/1/skx_m.jpg"}}
            ]}"#,
        )]);
        let finder = ImageFinder::new(&http, &Credentials::default());
        assert_eq!(
            finder.find_image("SKX007"),
            "https://live.staticflickr.com/1/skx_b.jpg"
        );
        assert_eq!(http.queries.borrow()[0], "seiko,skx007,watch");
    }

    #[test]
    fn wikimedia_pages_follow_search_rank() {
        let http = canned(vec![(
            "https://commons.wikimedia.org/",
            r#"{"query": {"pages": {
                "9": {"index": 2, "imageinfo": [{"url": "https://upload.test/b.jpg", "width": 2000, "height": 1500}]},
                "10": {"index": 1, "imageinfo": [{"url": "https://upload.test/a.jpg", "thumburl": "https://upload.test/a-1600.jpg", "thumbwidth": 800, "thumbheight": 600}]}
            }}}"#,
        )]);
        let found = Wikimedia.search(&http, "seiko skx007 watch", 10).unwrap();
        assert_eq!(found[0].url, "https://upload.test/a-1600.jpg");
        assert_eq!(found[1].width, 2000);
        assert!(found[1].is_high_res());
    }

    #[test]
    fn credentialed_providers_run_first() {
        let http = canned(vec![(
            "https://serpapi.com/",
            r#"{"images_results": [{"original": "https://img.test/skx.webp", "original_width": 1600, "original_height": 1600}]}"#,
        )]);
        let creds = Credentials {
            serpapi_key: Some("k".into()),
            ..Default::default()
        };
        let finder = ImageFinder::new(&http, &creds);
        assert_eq!(finder.find_image("SKX007"), "https://img.test/skx.webp");
        // Google CSE has no keys and never reaches the network.
        assert_eq!(http.queries.borrow().len(), 1);
    }

    #[test]
    fn nothing_found_retries_without_brand_then_placeholder() {
        let http = canned(Vec::new());
        let finder = ImageFinder::new(&http, &Credentials::default());
        assert_eq!(finder.find_image("SKX007"), IMAGE_PLACEHOLDER_URL);
        let queries = http.queries.borrow();
        assert!(queries.contains(&"seiko,skx007,watch".to_string()));
        assert!(queries.contains(&"SKX007 watch".to_string()));
        assert_eq!(finder.find_image("  "), IMAGE_PLACEHOLDER_URL);
    }
}

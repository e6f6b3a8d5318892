use watch_porter_core::text::{first_non_empty, truncate_chars};
use watch_porter_core::{
    RawFetchResult, UNIVERSAL_COLLECTION, extract_price, infer_brand_from_model, normalize_brand,
    template_description,
};

use super::AttributeSource;
use crate::client::HttpClient;
use crate::error::SourceError;
use crate::search::{
    PageData, clean_product_title, duckduckgo_urls, extract_specs, fetch_page, score_page,
};

/// Trusted marketplaces searched after the brand's own site.
pub const PRIORITY_SOURCE_DOMAINS: [&str; 6] = [
    "watchbase.com",
    "chrono24.com",
    "sakurawatches.com",
    "watchcharts.com",
    "jomashop.com",
    "ashford.com",
];

const RESULTS_PER_DOMAIN: usize = 2;
const MAX_URLS: usize = 10;
const MIN_SCORE: u32 = 4;

/// Official web domains of a normalized brand.
pub fn official_domains(brand: &str) -> &'static [&'static str] {
    match brand {
        "SEIKO" => &["seikowatches.com", "seikowatches.eu"],
        "CASIO" | "EDIFICE" => &["casio.com"],
        "CITIZEN" => &["citizenwatch.com"],
        "ORIENT" => &["orient-watch.com"],
        "INGERSOLL" => &["ingersoll1892.com"],
        "TISSOT" => &["tissotwatches.com"],
        "OMEGA" => &["omegawatches.com"],
        "ROLEX" => &["rolex.com"],
        _ => &[],
    }
}

/// Official brand sites, then trusted marketplaces, searched with
/// `site:` queries. The best-evidenced page wins.
pub struct PrioritySources<'a> {
    http: &'a dyn HttpClient,
}

impl<'a> PrioritySources<'a> {
    pub fn new(http: &'a dyn HttpClient) -> Self {
        Self { http }
    }

    fn candidate_urls(&self, model: &str, brand: &str) -> Vec<String> {
        let mut urls: Vec<String> = Vec::new();
        let domains = official_domains(brand)
            .iter()
            .chain(PRIORITY_SOURCE_DOMAINS.iter());
        for domain in domains {
            let query = format!("site:{domain} {model} watch specifications");
            for url in duckduckgo_urls(self.http, &query, RESULTS_PER_DOMAIN) {
                if !urls.contains(&url) {
                    urls.push(url);
                }
            }
            if urls.len() >= MAX_URLS {
                break;
            }
        }
        urls.truncate(MAX_URLS);
        urls
    }
}

impl AttributeSource for PrioritySources<'_> {
    fn name(&self) -> &'static str {
        "priority sources"
    }

    fn fetch(&self, model: &str, brand_hint: &str) -> Result<RawFetchResult, SourceError> {
        let brand = normalize_brand(brand_hint);
        let urls = self.candidate_urls(model, &brand);
        if urls.is_empty() {
            return Err(SourceError::not_found(format!(
                "no priority-domain results for {model}"
            )));
        }

        let mut best: Option<(u32, PageData)> = None;
        for url in &urls {
            let page = match fetch_page(self.http, url) {
                Ok(page) => page,
                Err(e) => {
                    log::debug!("Priority page {url} failed: {e}");
                    continue;
                }
            };
            let score = score_page(&page, model, &brand);
            log::debug!("Priority page {url} scored {score}");
            if best.as_ref().is_none_or(|(top, _)| score > *top) {
                best = Some((score, page));
            }
        }

        let Some((score, page)) = best else {
            return Err(SourceError::not_found(format!(
                "no priority-domain page loaded for {model}"
            )));
        };
        if score < MIN_SCORE {
            return Err(SourceError::not_found(format!(
                "best priority page for {model} scored {score}"
            )));
        }
        Ok(page_to_result(page, model, brand_hint))
    }
}

fn page_to_result(page: PageData, model: &str, brand_hint: &str) -> RawFetchResult {
    let combined = page.combined_text();
    RawFetchResult {
        name: first_non_empty(&[&clean_product_title(&page.title), model]),
        description: first_non_empty(&[
            &page.description,
            &truncate_chars(&combined, 1200),
            &template_description(model),
        ]),
        image_url: page.image_url,
        brand: first_non_empty(&[
            &normalize_brand(brand_hint),
            &normalize_brand(&combined),
            &infer_brand_from_model(model),
            UNIVERSAL_COLLECTION,
        ]),
        price: extract_price(&combined),
        specs: extract_specs(&combined),
        feature_text: combined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn official_domains_come_first() {
        assert_eq!(official_domains("SEIKO"), &["seikowatches.com", "seikowatches.eu"]);
        assert_eq!(official_domains("EDIFICE"), official_domains("CASIO"));
        assert!(official_domains("").is_empty());
    }

    #[test]
    fn page_becomes_result() {
        let page = PageData {
            title: "Seiko SKX007K2 | Watchbase".into(),
            description: String::new(),
            text: "Automatic diver, 200m water resistant, stainless steel. $289.00".into(),
            image_url: "https://img.test/skx.jpg".into(),
        };
        let raw = page_to_result(page, "SKX007", "");
        assert_eq!(raw.name, "Seiko SKX007K2");
        assert_eq!(raw.brand, "SEIKO");
        assert_eq!(raw.price, "289.00");
        assert!(raw.description.starts_with("Seiko SKX007K2 | Watchbase"));
        assert!(raw.specs.contains(&"Movement: Automatic".to_string()));
    }
}

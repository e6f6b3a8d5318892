use std::sync::LazyLock;

use regex::Regex;

pub const SUPPORTED_IMAGE_EXTENSIONS: [&str; 4] = [".jpg", ".jpeg", ".png", ".webp"];

const BAD_TOKENS: [&str; 8] = [
    "sprite",
    "logo",
    "icon",
    "placeholder",
    "1x1",
    "blank.gif",
    "example.com",
    "localhost",
];

static SIZE_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([?&])(w|width|h|height)=\d+").unwrap());
static EBAY_THUMB: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"s-l\d{2,4}").unwrap());

/// Give protocol-relative URLs an https scheme.
pub fn normalize_image_url(url: &str) -> String {
    let url = url.trim();
    if let Some(rest) = url.strip_prefix("//") {
        format!("https://{rest}")
    } else {
        url.to_string()
    }
}

/// Rewrite thumbnail URLs toward their full-size variant.
///
/// Drops width/height query parameters and bumps eBay `s-lNNN` sizes to
/// `s-l1600`.
pub fn upgrade_image_quality(url: &str) -> String {
    let cleaned = url.trim();
    if cleaned.is_empty() {
        return String::new();
    }
    let cleaned = SIZE_PARAM.replace_all(cleaned, "");
    EBAY_THUMB.replace_all(&cleaned, "s-l1600").into_owned()
}

/// Normalize then upgrade in one step.
pub fn prepare_image_url(url: &str) -> String {
    upgrade_image_quality(&normalize_image_url(url))
}

/// An absolute http(s) URL that does not look like a logo, sprite or
/// placeholder.
pub fn is_valid_image_url(url: &str) -> bool {
    let lower = url.trim().to_lowercase();
    if lower.is_empty() || BAD_TOKENS.iter().any(|t| lower.contains(t)) {
        return false;
    }
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Whether the URL path ends in an extension the storefront import accepts.
pub fn has_supported_image_extension(url: &str) -> bool {
    let Ok(parsed) = url::Url::parse(url.trim()) else {
        return false;
    };
    let path = parsed.path().to_lowercase();
    SUPPORTED_IMAGE_EXTENSIONS
        .iter()
        .any(|ext| path.ends_with(ext))
}

/// Valid and of a supported file type.
pub fn is_usable_image_url(url: &str) -> bool {
    is_valid_image_url(url) && has_supported_image_extension(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_relative_gets_https() {
        assert_eq!(
            normalize_image_url("//img.example.org/a.jpg"),
            "https://img.example.org/a.jpg"
        );
        assert_eq!(normalize_image_url("/local.jpg"), "/local.jpg");
    }

    #[test]
    fn upgrade_strips_size_params_and_bumps_ebay() {
        assert_eq!(
            upgrade_image_quality("https://i.ebayimg.com/images/g/x/s-l225.jpg"),
            "https://i.ebayimg.com/images/g/x/s-l1600.jpg"
        );
        assert_eq!(
            upgrade_image_quality("https://cdn.shop.test/w.jpg?v=1&width=300"),
            "https://cdn.shop.test/w.jpg?v=1"
        );
    }

    #[test]
    fn validity_rejects_bad_tokens_and_schemes() {
        assert!(is_valid_image_url("https://cdn.shop.test/skx007.jpg"));
        assert!(!is_valid_image_url("https://cdn.shop.test/logo.png"));
        assert!(!is_valid_image_url("ftp://cdn.shop.test/a.jpg"));
        assert!(!is_valid_image_url(""));
    }

    #[test]
    fn extension_checks_path_not_query() {
        assert!(has_supported_image_extension("https://a.test/x.JPG?x=1"));
        assert!(has_supported_image_extension(
            "https://dummyimage.com/1200x1200/e9ecef/212529.jpg?text=No+Image"
        ));
        assert!(!has_supported_image_extension("https://a.test/x.gif"));
        assert!(!has_supported_image_extension("https://a.test/img?f=x.jpg"));
        assert!(!has_supported_image_extension("not a url"));
    }
}

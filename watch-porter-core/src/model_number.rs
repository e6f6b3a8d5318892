use std::sync::LazyLock;

use regex::Regex;

use crate::brand::normalize_brand;

static MODEL_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(watch\s*)?model\s*[:#-]*\s*").unwrap());
static REFERENCE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(ref\.?|reference|sku)\s*[:#-]*\s*").unwrap());

/// Uppercase alphanumeric-only form of a model number, used as catalog key.
pub fn normalize_model_key(text: &str) -> String {
    text.to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        .collect()
}

/// Pull the distinguishing model token out of mixed input such as
/// `"Model: Seiko SNXS77"`.
///
/// Leading "model"/"ref"/"sku" labels and a leading brand word are dropped.
/// The last token with a digit and at least four key characters wins,
/// otherwise the last token.
pub fn canonicalize_model_number(text: &str) -> String {
    let raw = text.trim();
    if raw.is_empty() {
        return String::new();
    }

    let cleaned = MODEL_PREFIX.replace(raw, "");
    let cleaned = cleaned.trim();
    let cleaned = REFERENCE_PREFIX.replace(cleaned, "");
    let cleaned = cleaned.trim();

    let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();
    if tokens.is_empty() {
        return cleaned.to_string();
    }
    if tokens.len() > 1 && !normalize_brand(tokens[0]).is_empty() {
        tokens.remove(0);
    }

    tokens
        .iter()
        .rev()
        .find(|token| {
            let key = normalize_model_key(token);
            key.len() >= 4 && key.chars().any(|c| c.is_ascii_digit())
        })
        .or(tokens.last())
        .map(|token| token.to_string())
        .unwrap_or_default()
}

/// A watch model number in its three forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelNumber {
    raw: String,
    canonical: String,
}

impl ModelNumber {
    pub fn new(raw: &str) -> Self {
        let raw = raw.trim().to_string();
        let canonical = canonicalize_model_number(&raw);
        Self { raw, canonical }
    }

    /// The model number exactly as entered (trimmed).
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The extracted model token, falling back to the raw text.
    pub fn canonical(&self) -> &str {
        if self.canonical.is_empty() {
            &self.raw
        } else {
            &self.canonical
        }
    }

    /// Catalog key of the canonical form.
    pub fn key(&self) -> String {
        normalize_model_key(self.canonical())
    }

    /// Catalog key of the raw form.
    pub fn raw_key(&self) -> String {
        normalize_model_key(&self.raw)
    }

    /// Candidate catalog keys: raw key first, then canonical, deduplicated.
    pub fn lookup_keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        for key in [self.raw_key(), self.key()] {
            if !key.is_empty() && !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

impl std::fmt::Display for ModelNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_keeps_only_alphanumerics() {
        assert_eq!(normalize_model_key("srpd55-k1"), "SRPD55K1");
        assert_eq!(normalize_model_key("T137.407.11.041.00"), "T1374071104100");
        assert_eq!(normalize_model_key(" - "), "");
    }

    #[test]
    fn canonical_strips_labels_and_brand() {
        assert_eq!(canonicalize_model_number("Model: Seiko SNXS77"), "SNXS77");
        assert_eq!(canonicalize_model_number("watch model # SKX007"), "SKX007");
        assert_eq!(canonicalize_model_number("Ref. GA-2100-1A"), "GA-2100-1A");
        assert_eq!(canonicalize_model_number("SKU: NY0040-09E"), "NY0040-09E");
        assert_eq!(canonicalize_model_number("SKX007"), "SKX007");
    }

    #[test]
    fn canonical_prefers_last_numeric_token() {
        assert_eq!(canonicalize_model_number("Orient Bambino FAC00009N0"), "FAC00009N0");
        assert_eq!(canonicalize_model_number("SRPD55 diver"), "SRPD55");
        assert_eq!(canonicalize_model_number("Bambino classic"), "classic");
    }

    #[test]
    fn lookup_keys_deduplicate() {
        let model = ModelNumber::new("SKX007");
        assert_eq!(model.lookup_keys(), vec!["SKX007".to_string()]);

        let model = ModelNumber::new("Seiko SKX007");
        assert_eq!(
            model.lookup_keys(),
            vec!["SEIKOSKX007".to_string(), "SKX007".to_string()]
        );
        assert_eq!(model.key(), "SKX007");
    }
}

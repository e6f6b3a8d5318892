use std::sync::LazyLock;

use regex::Regex;

use crate::brand::normalize_brand;

static PRICE_PATTERNS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        // $1,234.56 / € 1.234,56
        Regex::new(r"(?i)(?:\$|€|£|₼)\s*([0-9]{1,3}(?:[.,\s][0-9]{3})*(?:[.,][0-9]{2})?)")
            .unwrap(),
        // 1 234 USD / 1.234,56 EUR
        Regex::new(r"(?i)([0-9]{1,3}(?:[.,\s][0-9]{3})*(?:[.,][0-9]{2})?)\s*(?:USD|EUR|GBP|AZN)")
            .unwrap(),
    ]
});

/// Extract the first currency-marked price in `text` as a two-decimal string.
///
/// Returns an empty string when no price is found.
pub fn extract_price(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    for pattern in PRICE_PATTERNS.iter() {
        let Some(caps) = pattern.captures(text) else {
            continue;
        };
        let value: String = caps[1].chars().filter(|c| !c.is_whitespace()).collect();
        if let Ok(parsed) = resolve_separators(&value).parse::<f64>() {
            return format!("{parsed:.2}");
        }
    }
    String::new()
}

/// Normalize a bare price value such as `"1,234.56"`, `"USD 289"` or `289`
/// to a two-decimal string. Returns an empty string when there is no number.
pub fn normalize_price(text: &str) -> String {
    let kept: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    let number = kept.trim_matches(|c| c == '.' || c == ',');
    if number.is_empty() {
        return String::new();
    }
    resolve_separators(number)
        .parse::<f64>()
        .map(|parsed| format!("{parsed:.2}"))
        .unwrap_or_default()
}

/// Turn a number with mixed thousands/decimal separators into plain
/// dot-decimal form.
fn resolve_separators(value: &str) -> String {
    let has_comma = value.contains(',');
    let has_dot = value.contains('.');

    if has_comma && has_dot {
        let last_comma = value.rfind(',').unwrap_or(0);
        let last_dot = value.rfind('.').unwrap_or(0);
        if last_comma > last_dot {
            value.replace('.', "").replace(',', ".")
        } else {
            value.replace(',', "")
        }
    } else if has_comma {
        let parts: Vec<&str> = value.split(',').collect();
        match parts.split_last() {
            Some((last, head)) if last.len() == 2 => {
                format!("{}.{}", head.concat().replace('.', ""), last)
            }
            _ => value.replace(',', ""),
        }
    } else {
        let parts: Vec<&str> = value.split('.').collect();
        if parts.len() > 2 {
            parts.concat()
        } else {
            value.to_string()
        }
    }
}

fn brand_price_range(brand: &str) -> (f64, f64) {
    let normalized = normalize_brand(brand);
    let key = if normalized.is_empty() {
        brand.trim().to_uppercase()
    } else {
        normalized
    };
    match key.as_str() {
        "ROLEX" => (4500.0, 18000.0),
        "OMEGA" => (2500.0, 12000.0),
        "TAG HEUER" => (1200.0, 5000.0),
        "TISSOT" => (250.0, 1800.0),
        "HAMILTON" => (350.0, 2200.0),
        "CITIZEN" => (120.0, 1200.0),
        "SEIKO" | "SEİKO" => (100.0, 2500.0),
        "ORIENT" => (120.0, 900.0),
        "CASIO" => (40.0, 900.0),
        "TIMEX" => (35.0, 500.0),
        "BULOVA" => (120.0, 1500.0),
        "LONGINES" => (800.0, 4500.0),
        "TUDOR" => (1800.0, 7000.0),
        _ => (150.0, 3000.0),
    }
}

/// A value in `[0, 1)` derived from an MD5 digest of `seed`.
///
/// Identical seeds give identical values across runs and machines.
pub fn stable_fraction(seed: &str) -> f64 {
    let digest = md5::compute(seed.as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest.0[..8]);
    (u64::from_be_bytes(head) % 1000) as f64 / 1000.0
}

/// Deterministic price inside the brand's typical range.
///
/// Used only when no source yielded a price.
pub fn estimate_price(model: &str, brand: &str) -> String {
    let (low, high) = brand_price_range(brand);
    let fraction = stable_fraction(&format!("{model}-{brand}"));
    format!("{:.2}", low + (high - low) * fraction)
}

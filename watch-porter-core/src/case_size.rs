use std::sync::LazyLock;

use regex::Regex;

use crate::brand::brand_hint_for;
use crate::category::is_unknown_text;

static PAIR_SIZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{2}(?:[.,]\d{1,2})?)\s*[x×]\s*(\d{2}(?:[.,]\d{1,2})?)\s*mm\b").unwrap()
});
static SINGLE_SIZE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{2}(?:[.,]\d{1,2})?)\s*mm\b").unwrap());

static MODEL_SIZES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"^(GA-B\d|GAB\d|GA-\d|G-\d|DW-\d)", "45"),
        (r"^(F-91W|AE-1200)", "36"),
        (r"^SPB", "40.5"),
        (r"^(SRPD|SRPE|SRPG|SNZH|SKX)", "42"),
        (r"^SNXS", "37"),
        (r"^(NY\d|BN\d)", "42"),
        (r"^(RA-AA|RA-AC|RAAA|RAAC)", "42"),
        (r"^T137", "40"),
        (r"^T127", "40"),
    ]
    .into_iter()
    .map(|(pattern, size)| (Regex::new(pattern).unwrap(), size))
    .collect()
});

/// Render a millimetre value without trailing zeros (`40.50` -> `40.5`,
/// `42.0` -> `42`). Accepts a comma as decimal separator.
fn format_mm(value: &str) -> String {
    let raw = value.trim().replace(',', ".");
    if raw.is_empty() {
        return raw;
    }
    match raw.parse::<f64>() {
        Ok(num) if num.fract() == 0.0 => format!("{}", num as i64),
        Ok(num) => {
            let text = format!("{num:.1}");
            text.trim_end_matches('0').trim_end_matches('.').to_string()
        }
        Err(_) => raw.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect(),
    }
}

fn size_label(a: &str, b: &str) -> String {
    format!("Ölçü - {a} x {b} mm")
}

/// Extract a case size from free text as `"Ölçü - A x B mm"`.
///
/// An explicit `A x B mm` pair wins over a single `N mm`, which is
/// repeated on both axes. Returns an empty string when no size is present.
pub fn extract_case_size(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    if let Some(caps) = PAIR_SIZE.captures(text) {
        let a = format_mm(&caps[1]);
        let b = format_mm(&caps[2]);
        if !a.is_empty() && !b.is_empty() {
            return size_label(&a, &b);
        }
    }
    if let Some(caps) = SINGLE_SIZE.captures(text) {
        let s = format_mm(&caps[1]);
        if !s.is_empty() {
            return size_label(&s, &s);
        }
    }
    String::new()
}

/// Bring a stored case-size value into canonical label form when possible.
/// Unknown markers and unparseable values are returned unchanged.
pub fn normalize_case_size_label(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() || is_unknown_text(value) {
        return value.to_string();
    }
    let extracted = extract_case_size(value);
    if extracted.is_empty() {
        value.to_string()
    } else {
        extracted
    }
}

/// Typical case size for a model, from its prefix or the brand default.
pub fn estimate_case_size(model: &str, brand_hint: &str) -> String {
    let upper = model.trim().to_uppercase();
    if let Some((_, size)) = MODEL_SIZES.iter().find(|(re, _)| re.is_match(&upper)) {
        return size_label(size, size);
    }

    let brand = brand_hint_for(&upper, brand_hint);
    let size = match brand.as_str() {
        "CASIO" | "CITIZEN" | "ORIENT" | "OMEGA" => "42",
        "TISSOT" => "40",
        _ => "41",
    };
    size_label(size, size)
}

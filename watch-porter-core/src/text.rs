//! Small string helpers shared by the normalizers and fetchers.

use std::sync::LazyLock;

use regex::Regex;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static LABEL_JUNK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s\-/&]+").unwrap());

/// Return the first value that is non-empty after trimming, trimmed.
pub fn first_non_empty(values: &[&str]) -> String {
    values
        .iter()
        .map(|v| v.trim())
        .find(|v| !v.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// Truncate to at most `max` characters (not bytes).
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// Replace every whitespace run with a single space and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE.replace_all(s, " ").trim().to_string()
}

/// Uppercase the first letter of each alphabetic run, lowercase the rest.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// Tidy a phrase captured from free text so it can be used as a label.
///
/// Collapses whitespace, trims punctuation from the ends, drops symbols and
/// cuts at a word boundary when longer than `max_len` characters.
pub fn clean_extracted_label(value: &str, max_len: usize) -> String {
    let collapsed = collapse_whitespace(value);
    let trimmed = collapsed.trim_matches(|c: char| " .,:;|-_".contains(c));
    let cleaned = LABEL_JUNK.replace_all(trimmed, "").trim().to_string();
    if cleaned.is_empty() {
        return cleaned;
    }
    if cleaned.chars().count() > max_len {
        let cut = truncate_chars(&cleaned, max_len);
        let head = match cut.rfind(' ') {
            Some(pos) => &cut[..pos],
            None => cut.as_str(),
        };
        return head.trim().to_string();
    }
    cleaned
}

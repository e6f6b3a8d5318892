//! Category detection over free text.
//!
//! For each group the detector answers with a label, an unknown marker, or
//! nothing:
//!
//! 1. case size only: a size extracted straight from the text
//! 2. the first configured label whose keyword list matches
//! 3. a freeform phrase such as "<color> dial", cleaned and title-cased
//! 4. [`GroupValue::Unknown`] when a broad trigger word is present
//! 5. `None` when the text never mentions the attribute

use std::sync::LazyLock;

use regex::Regex;

use crate::UNIVERSAL_COLLECTION;
use crate::brand::normalize_brand;
use crate::case_size::extract_case_size;
use crate::category::{CategoryGroup, CategorySet, GroupValue};
use crate::config::MappingConfig;
use crate::text::{clean_extracted_label, title_case};

const COLOR_WORDS: &str = "black|white|blue|green|red|yellow|orange|purple|pink|brown|grey|gray|\
silver|gold|beige|cream|ivory|turquoise|teal|navy|burgundy|champagne|salmon|anthracite";

const STRAP_MATERIALS: &str =
    "stainless steel|steel|titanium|ceramic|bronze|rubber|resin|silicone|leather|nylon|fabric|canvas|mesh";

static DIAL_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)(({COLOR_WORDS})(?:\s+[a-zA-Z]+)?)\s+(?:dial|siferblat|face)\b"
    ))
    .unwrap()
});
static BRACELET_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)({STRAP_MATERIALS})\s+(?:strap|band|bracelet|kəmər|bilərzik)\b"
    ))
    .unwrap()
});
static GENDER_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(unisex|men|mens|men's|male|women|womens|women's|female|lady|ladies)\b")
        .unwrap()
});
static SIZE_PHRASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{2}(?:\.\d{1,2})?)\s?mm\b").unwrap());
static MOVEMENT_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(quartz|automatic|mechanical|manual\s*winding|manual\s*wind|solar|eco-drive|kinetic|spring\s*drive|meca[-\s]?quartz)\b",
    )
    .unwrap()
});
static STRAP_COLOR_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)(({COLOR_WORDS})(?:\s+[a-zA-Z]+)?)\s+(?:strap|band|kəmər)\b"
    ))
    .unwrap()
});
static STRAP_MATERIAL_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)({STRAP_MATERIALS})\s+(?:strap|band|kəmər)\b")).unwrap()
});
static CASE_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(stainless steel|steel|titanium|ceramic|bronze|gold|silver|carbon|resin|plastic)\s+(?:case|korpus)\b",
    )
    .unwrap()
});

fn is_plain_keyword(keyword: &str) -> bool {
    keyword
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || c == '\'' || c == '-')
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit()
}

/// Keyword test against text that is already lowercase.
fn lowered_has_keyword(lowered: &str, keyword: &str) -> bool {
    let key = keyword.trim().to_lowercase();
    if lowered.is_empty() || key.is_empty() {
        return false;
    }
    if !is_plain_keyword(&key) {
        return lowered.contains(&key);
    }

    // Plain ASCII keywords must not sit inside a longer alphanumeric run,
    // so "men" does not match "women".
    let mut from = 0;
    while let Some(offset) = lowered[from..].find(&key) {
        let start = from + offset;
        let end = start + key.len();
        let before = lowered[..start].chars().next_back();
        let after = lowered[end..].chars().next();
        if !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char) {
            return true;
        }
        from = start + lowered[start..].chars().next().map_or(1, char::len_utf8);
    }
    false
}

/// Case-insensitive keyword test with word boundaries for plain keywords.
pub fn text_has_keyword(text: &str, keyword: &str) -> bool {
    lowered_has_keyword(&text.to_lowercase(), keyword)
}

fn first_capture(re: &Regex, text: &str, group: usize, max_len: usize) -> Option<String> {
    let caps = re.captures(text)?;
    let cleaned = clean_extracted_label(caps.get(group)?.as_str(), max_len);
    if cleaned.is_empty() { None } else { Some(cleaned) }
}

/// Label built from a descriptive phrase when no configured keyword matched.
pub fn extract_freeform_label(group: CategoryGroup, text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    match group {
        CategoryGroup::DialColor => {
            first_capture(&DIAL_PHRASE, text, 1, 40).map(|c| format!("SR - {}", title_case(&c)))
        }
        CategoryGroup::Bracelet => first_capture(&BRACELET_PHRASE, text, 1, 40)
            .map(|m| format!("Bilərzik - {}", title_case(&m))),
        CategoryGroup::Gender => first_capture(&GENDER_WORD, text, 1, 40)
            .map(|g| format!("Cinsi - {}", title_case(&g))),
        CategoryGroup::CaseSize => {
            first_capture(&SIZE_PHRASE, text, 1, 10).map(|s| format!("Ölçü - {s} mm"))
        }
        CategoryGroup::Movement => {
            first_capture(&MOVEMENT_WORD, text, 1, 40).map(|m| title_case(&m))
        }
        CategoryGroup::StrapColor => first_capture(&STRAP_COLOR_PHRASE, text, 1, 40)
            .or_else(|| first_capture(&STRAP_MATERIAL_PHRASE, text, 1, 40))
            .map(|c| format!("KR - {}", title_case(&c))),
        CategoryGroup::CaseMaterial => {
            first_capture(&CASE_PHRASE, text, 1, 40).map(|m| title_case(&m))
        }
    }
}

/// Loosely-typed attribute values, as an external classifier or an editor
/// might supply them (`"blue"`, `"42"`, `"leather"`).
#[derive(Debug, Clone, Default)]
pub struct AttributeHints {
    pub dial_color: String,
    pub bracelet: String,
    pub gender: String,
    pub size_mm: String,
    pub movement: String,
    pub strap_color: String,
    pub case_material: String,
}

/// Maps text to category labels using a [`MappingConfig`].
#[derive(Debug, Clone, Copy)]
pub struct CategoryDetector<'a> {
    config: &'a MappingConfig,
}

impl<'a> CategoryDetector<'a> {
    pub fn new(config: &'a MappingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &'a MappingConfig {
        self.config
    }

    /// Detect one group's value in `text`.
    pub fn detect(&self, group: CategoryGroup, text: &str) -> Option<GroupValue> {
        if text.trim().is_empty() {
            return None;
        }
        if group == CategoryGroup::CaseSize {
            let size = extract_case_size(text);
            if !size.is_empty() {
                return Some(GroupValue::Label(size));
            }
        }

        let lowered = text.to_lowercase();
        let configured = self.config.rules(group).iter().find(|rule| {
            rule.keywords
                .iter()
                .any(|k| lowered_has_keyword(&lowered, k))
        });
        if let Some(rule) = configured {
            return Some(GroupValue::Label(rule.label.clone()));
        }

        if let Some(label) = extract_freeform_label(group, text) {
            return Some(GroupValue::Label(label));
        }

        if group
            .triggers()
            .iter()
            .any(|t| lowered_has_keyword(&lowered, t))
        {
            return Some(GroupValue::Unknown);
        }
        None
    }

    /// Run detection for every group over the same text.
    pub fn detect_all(&self, text: &str) -> CategorySet {
        let mut set = CategorySet::new();
        for group in CategoryGroup::ALL {
            set.set(group, self.detect(group, text));
        }
        set
    }

    /// Collection list for a product described only by text: the universal
    /// collection, the brand collection, then each detected group value.
    pub fn map_collections(
        &self,
        title: &str,
        description: &str,
        brand: &str,
        model: &str,
        feature_text: &str,
    ) -> Vec<String> {
        let combined = [title, description, brand, model, feature_text].join(" ");
        let mut collections = vec![UNIVERSAL_COLLECTION.to_string()];

        if let Some(label) = self.config.brand_collection(&normalize_brand(brand)) {
            collections.push(label.to_string());
        }
        for group in CategoryGroup::ALL {
            if let Some(value) = self.detect(group, &combined) {
                collections.push(value.to_text(group));
            }
        }

        let lowered = combined.to_lowercase();
        let steel_bracelet = "Bilərzik - Polad";
        if lowered.contains("bracelet")
            && ["steel", "metal", "polad"].iter().any(|w| lowered.contains(w))
        {
            collections.push(steel_bracelet.to_string());
        }

        dedup_preserving_order(collections)
    }

    /// Map loose attribute values to group labels. Values that only resolve
    /// to an unknown marker are dropped.
    pub fn map_classified_attributes(&self, hints: &AttributeHints) -> CategorySet {
        let candidates = [
            (CategoryGroup::DialColor, format!("{} dial", hints.dial_color)),
            (CategoryGroup::Bracelet, format!("{} bracelet", hints.bracelet)),
            (CategoryGroup::Gender, hints.gender.clone()),
            (CategoryGroup::CaseSize, format!("{} mm", hints.size_mm)),
            (CategoryGroup::Movement, hints.movement.clone()),
            (CategoryGroup::StrapColor, format!("{} strap", hints.strap_color)),
            (CategoryGroup::CaseMaterial, format!("{} case", hints.case_material)),
        ];

        let mut set = CategorySet::new();
        for (group, text) in candidates {
            let text = text.trim();
            if text.is_empty() {
                continue;
            }
            let value = match self.detect(group, text) {
                Some(GroupValue::Label(label)) => Some(label),
                _ => extract_freeform_label(group, text),
            };
            if let Some(label) = value {
                set.set(group, Some(GroupValue::Label(label)));
            }
        }
        set
    }
}

/// Remove repeated entries, keeping the first occurrence.
pub fn dedup_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

//! Model-series rules applied on top of a classification.
//!
//! Some families are so uniform that the model number alone settles the
//! movement, strap or case. These rules win over whatever the classifier
//! returned, and only ever write values from the allowed vocabulary.

use std::sync::LazyLock;

use regex::Regex;
use watch_porter_core::brand::brand_hint_for;

use crate::classify::Classification;

/// Series codes checked in order against the compact model number.
const SERIES_PRIORITY: [&str; 15] = [
    "EFB", "ECB", "EFV", "GMA", "GA", "GM", "DW", "NY", "BN", "SSA", "SPB", "SBDC", "FAC", "RA",
    "AC",
];

/// Series code when none can be identified.
pub const GENERIC_SERIES: &str = "GEN";

static FILLER_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(watch|product|name|model|ref(?:erence)?|sku)\b[:\-\s]*").unwrap()
});
static MODEL_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z0-9]+(?:[-.][A-Z0-9]+)*").unwrap());
static LEADING_LETTERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z]{1,5})\d").unwrap());

/// Suffix colour hints, checked in order.
static SUFFIX_COLORS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"(^|[-.])(M|L|BL|BLUE)[A-Z0-9]*$", "Göy"),
        (r"(^|[-.])(G|GR|GREEN)[A-Z0-9]*$", "Yaşıl"),
        (r"(^|[-.])(W|WH|WHITE)[A-Z0-9]*$", "Ağ"),
        (r"(^|[-.])(B|BK|BLACK)[A-Z0-9]*$", "Qara"),
        (r"-1[A-Z0-9]*$", "Qara"),
        (r"-2[A-Z0-9]*$", "Mavi"),
        (r"-3[A-Z0-9]*$", "Yaşıl"),
        (r"-4[A-Z0-9]*$", "Qırmızı"),
        (r"-7[A-Z0-9]*$", "Ağ"),
        (r"-8[A-Z0-9]*$", "Boz"),
        (r"BL|BLUE|NAVY", "Mavi"),
        (r"BK|BLACK", "Qara"),
        (r"GR|GREEN", "Yaşıl"),
        (r"WH|WHITE", "Ağ"),
    ]
    .into_iter()
    .map(|(pattern, color)| (Regex::new(pattern).unwrap(), color))
    .collect()
});

static G_SHOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(GA-|GMA-|GBD-|DW-|G-\d)").unwrap());
static CASIO_SPORT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(GA|GMA|GBD|DW|G)").unwrap());
static NY_DIVER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^NY\d").unwrap());
static BN_TOOL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^BN\d").unwrap());
static SRPD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^SRPD\d").unwrap());
static PROSPEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(SPB|SBDC)\d").unwrap());
static PRX_AUTO: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^T137[.-]?407").unwrap());
static SEASTAR_AUTO: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^T120[.-]?407").unwrap());
static BAMBINO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(FAC|FAC0|RA-AC|FER|BAMBINO)").unwrap());
static WOMENS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(GMA-|LTP|SHEEN|LA670|BA-|BGD)").unwrap());
static HAND_WOUND: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(NJ\d|NH\d)").unwrap());
static DIVER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(DIVER|PROSPEX|AQUALAND|SEASTAR|MARIN(E|ER)|NY\d|BN\d|SPB\d|SBDC\d|SKX)").unwrap()
});

fn compact(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

/// The model code inside free input: the first token holding both a letter
/// and a digit, uppercased.
pub fn extract_model_code(input: &str) -> Option<String> {
    let scrubbed = FILLER_WORDS.replace_all(input.trim(), " ");
    let scrubbed = scrubbed.replace(['(', ')', '[', ']', '{', '}'], " ");
    let upper = scrubbed.to_uppercase();
    let tokens: Vec<&str> = MODEL_TOKEN.find_iter(&upper).map(|m| m.as_str()).collect();

    let code = tokens.iter().find(|t| {
        t.chars().any(|c| c.is_ascii_uppercase()) && t.chars().any(|c| c.is_ascii_digit())
    });
    match (code, tokens.as_slice()) {
        (Some(code), _) => Some(code.to_string()),
        (None, [only]) if (2..=5).contains(&only.len())
            && only.chars().all(|c| c.is_ascii_uppercase()) =>
        {
            Some(only.to_string())
        }
        _ => None,
    }
}

/// Series code of a model: a known family prefix, else its leading letters,
/// else [`GENERIC_SERIES`]. Empty when no model code can be found.
pub fn extract_series(model: &str) -> String {
    let Some(code) = extract_model_code(model) else {
        return String::new();
    };
    let compact = compact(&code);
    if let Some(series) = SERIES_PRIORITY.iter().find(|s| compact.starts_with(*s)) {
        return series.to_string();
    }
    LEADING_LETTERS
        .captures(&compact)
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| GENERIC_SERIES.to_string())
}

/// Dial colour implied by a model's variant suffix, if any.
pub fn dial_color_from_model(model: &str) -> Option<&'static str> {
    let upper = model.trim().to_uppercase();
    let compact = compact(&upper);
    if compact.contains("SPB121") {
        return Some("Yaşıl");
    }
    if compact.contains("T1204071104103") || compact.contains("NJ018080M") {
        return Some("Göy");
    }
    SUFFIX_COLORS
        .iter()
        .find(|(re, _)| re.is_match(&upper))
        .map(|(_, color)| *color)
}

fn set(slot: &mut String, value: &str) {
    *slot = value.to_string();
}

fn is_one_of(value: &str, allowed: &[&str]) -> bool {
    allowed.contains(&value)
}

/// Rewrite `c` with the fixed rules for well-known model families.
pub fn apply_series_overrides(c: &mut Classification, model: &str, brand_hint: &str) {
    let m = model.trim().to_uppercase();
    let brand = brand_hint_for(&m, brand_hint);
    let series = extract_series(&m);
    let series = series.as_str();
    let detected = dial_color_from_model(&m);
    let squeezed: String = m.split_whitespace().collect();

    // G-Shock
    if G_SHOCK.is_match(&m)
        || matches!(series, "GA" | "GMA" | "GM" | "DW")
        || (brand.starts_with("CASIO") && CASIO_SPORT.is_match(&m))
    {
        set(&mut c.movement, "Kvarts");
        set(&mut c.case_material, "Plastik");
        set(&mut c.bracelet_type, "Kauçuk");
        if c.bracelet_color.is_empty() {
            set(&mut c.bracelet_color, "Qara");
        }
        let dial = detected
            .map(str::to_string)
            .unwrap_or_else(|| c.dial_color.clone());
        c.dial_color = if dial.is_empty() { "Boz".into() } else { dial };
    }

    // Edifice
    if matches!(series, "EFB" | "ECB" | "EFV") {
        set(&mut c.movement, "Kvarts");
        set(&mut c.case_material, "Polad");
        set(&mut c.bracelet_type, "Polad");
        set(&mut c.bracelet_color, "Boz");
        if !is_one_of(&c.dial_color, &["Göy", "Qara"]) {
            let dial = detected.filter(|d| is_one_of(d, &["Göy", "Qara"]));
            set(&mut c.dial_color, dial.unwrap_or("Göy"));
        }
    }

    // Citizen NY automatic divers
    if NY_DIVER.is_match(&m) || series == "NY" || (brand == "CITIZEN" && m.starts_with("NY")) {
        set(&mut c.movement, "Mexanika");
        set(&mut c.case_material, "Polad");
        set(&mut c.bracelet_type, "Kauçuk");
        set(&mut c.bracelet_color, "Qara");
        if !is_one_of(&c.dial_color, &["Göy", "Qara", "Sarı"]) {
            set(&mut c.dial_color, "Sarı");
        }
    }

    // Citizen BN Eco-Drive tool watches
    if BN_TOOL.is_match(&m) || series == "BN" || (brand == "CITIZEN" && m.contains("BN")) {
        set(&mut c.movement, "Kvarts");
        set(&mut c.bracelet_type, "Kauçuk");
        set(&mut c.case_material, "Polad");
        let color = if c.bracelet_color == "Sarı" { "Sarı" } else { "Qara" };
        set(&mut c.bracelet_color, color);
        if c.dial_color.is_empty() || is_one_of(&c.dial_color, &["Boz", "Krem"]) {
            set(&mut c.dial_color, detected.unwrap_or("Göy"));
        }
    }

    // Seiko SSA open-heart
    if series == "SSA" {
        set(&mut c.movement, "Mexanika");
        set(&mut c.bracelet_type, "Dəri");
        set(&mut c.bracelet_color, "Gəhvəyi");
        set(&mut c.case_material, "Polad");
        set(&mut c.dial_color, detected.unwrap_or("Krem"));
    }

    // Seiko Prospex
    if PROSPEX.is_match(&m) || matches!(series, "SPB" | "SBDC") {
        set(&mut c.movement, "Mexanika");
        set(&mut c.bracelet_type, "Polad");
        set(&mut c.bracelet_color, "Boz");
        set(&mut c.case_material, "Polad");
        if c.dial_color.is_empty() || c.dial_color == "Qara" {
            set(&mut c.dial_color, "Boz");
        }
    }

    // Seiko SRPD and Tissot PRX automatic ship on steel bracelets.
    if SRPD.is_match(&m) || PRX_AUTO.is_match(&squeezed)
    {
        set(&mut c.bracelet_type, "Polad");
        set(&mut c.bracelet_color, "Boz");
        set(&mut c.case_material, "Polad");
        set(&mut c.movement, "Mexanika");
    }

    // Tissot Seastar Powermatic 80
    if SEASTAR_AUTO.is_match(&squeezed) {
        set(&mut c.movement, "Mexanika");
        set(&mut c.case_material, "Polad");
        if !is_one_of(&c.dial_color, &["Göy", "Qara", "Sarı"]) {
            set(&mut c.dial_color, "Göy");
        }
    }
    if compact(&m).contains("T1204071104103") {
        set(&mut c.dial_color, "Göy");
    }

    // Orient Bambino and classics
    if BAMBINO.is_match(&m)
        || matches!(series, "RA" | "FAC" | "AC")
        || (brand == "ORIENT" && (m.contains("BAMBINO") || m.contains("CLASSIC")))
    {
        const DRESS_DIALS: [&str; 3] = ["Krem", "Boz", "Ağ"];
        set(&mut c.movement, "Mexanika");
        set(&mut c.bracelet_type, "Dəri");
        set(&mut c.bracelet_color, "Gəhvəyi");
        set(&mut c.case_material, "Polad");
        if !is_one_of(&c.dial_color, &DRESS_DIALS) {
            let dial = detected.filter(|d| is_one_of(d, &DRESS_DIALS));
            set(&mut c.dial_color, dial.unwrap_or("Krem"));
        }
    }

    if WOMENS.is_match(&m) {
        set(&mut c.gender, "Qadın");
    }
    if m.contains("BN") {
        set(&mut c.movement, "Kvarts");
    }
    if HAND_WOUND.is_match(&m) {
        set(&mut c.movement, "Mexanika");
    }

    // Rubber straps are never brown.
    if c.bracelet_type == "Kauçuk" && c.bracelet_color == "Gəhvəyi" {
        set(&mut c.bracelet_color, "Qara");
    }

    // Divers keep a dark dial.
    if DIVER.is_match(&m) && !compact(&m).contains("SPB121") {
        const DIVE_DIALS: [&str; 3] = ["Göy", "Qara", "Sarı"];
        if !is_one_of(&c.dial_color, &DIVE_DIALS) {
            let dial = if NY_DIVER.is_match(&m) {
                "Sarı"
            } else {
                detected.filter(|d| is_one_of(d, &DIVE_DIALS)).unwrap_or("Göy")
            };
            set(&mut c.dial_color, dial);
        }
    }
}

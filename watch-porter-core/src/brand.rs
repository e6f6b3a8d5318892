use std::sync::LazyLock;

use regex::Regex;

/// Known brands in match priority order. The first one contained in the
/// input wins.
pub const KNOWN_BRANDS: [&str; 15] = [
    "CASIO",
    "CITIZEN",
    "EDIFICE",
    "INGERSOLL",
    "ORIENT",
    "SEIKO",
    "ROLEX",
    "OMEGA",
    "TISSOT",
    "TAG HEUER",
    "HAMILTON",
    "BULOVA",
    "TIMEX",
    "LONGINES",
    "TUDOR",
];

static MODEL_PREFIXES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"^(SKX|SNZH|SRP|SRPE|SNK|SSA|SSK|SNXS|SPB)", "SEIKO"),
        (r"^(RA-|RA\d|F[A-Z]{2}\d|AC\d)", "ORIENT"),
        (r"^(BN\d|NJ\d|NY\d)", "CITIZEN"),
        (r"^(F-\d|AE-\d|GA-\d|GA-B\d|GAB\d|G-\d|DW-\d|A\d{3})", "CASIO"),
        (r"^M\d{2,}", "INGERSOLL"),
        (r"^(T\d|PRX|LE\s?LOCLE|SEASTAR)", "TISSOT"),
        (r"^(EFB|ECB|EFV|GMA-|GBD-)", "CASIO"),
        (r"^(L2\.|L3\.|L4\.)", "LONGINES"),
        (r"^(H32|H40|H7)", "HAMILTON"),
        (r"^(210\.|220\.)", "OMEGA"),
    ]
    .into_iter()
    .map(|(pattern, brand)| (Regex::new(pattern).unwrap(), brand))
    .collect()
});

/// Map free text to a known brand, or an empty string.
///
/// Matching is a plain substring test on the uppercased text with the
/// dotted capital `İ` folded to `I`.
pub fn normalize_brand(text: &str) -> String {
    let folded = text.trim().to_uppercase().replace('İ', "I");
    if folded.is_empty() {
        return String::new();
    }
    KNOWN_BRANDS
        .iter()
        .find(|brand| folded.contains(*brand))
        .map(|brand| brand.to_string())
        .unwrap_or_default()
}

/// Guess the brand from well-known model number prefixes.
pub fn infer_brand_from_model(model: &str) -> String {
    let model = model.trim().to_uppercase();
    if model.is_empty() {
        return String::new();
    }
    MODEL_PREFIXES
        .iter()
        .find(|(re, _)| re.is_match(&model))
        .map(|(_, brand)| brand.to_string())
        .unwrap_or_default()
}

/// Best brand guess for a model with an optional hint: the hint if it names a
/// known brand, then the prefix table, then any brand spelled in the model.
pub fn brand_hint_for(model: &str, hint: &str) -> String {
    crate::text::first_non_empty(&[
        &normalize_brand(hint),
        &infer_brand_from_model(model),
        &normalize_brand(model),
    ])
}

/// Product display name: `"{brand} {model}"`, or whichever part exists,
/// cut to 255 characters.
pub fn product_name(brand_label: &str, model: &str) -> String {
    let brand = brand_label.trim();
    let model = model.trim();
    let name = match (brand.is_empty(), model.is_empty()) {
        (false, false) => format!("{brand} {model}"),
        (true, false) => model.to_string(),
        (false, true) => brand.to_string(),
        (true, true) => "Watch Product".to_string(),
    };
    crate::text::truncate_chars(&name, 255)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_finds_brand_in_text() {
        assert_eq!(normalize_brand("Rolex Submariner"), "ROLEX");
        assert_eq!(normalize_brand("  seiko 5 sports"), "SEIKO");
        assert_eq!(normalize_brand("SEİKO"), "SEIKO");
        assert_eq!(normalize_brand("Tag Heuer Carrera"), "TAG HEUER");
    }

    #[test]
    fn normalize_rejects_unknown_brands() {
        assert_eq!(normalize_brand("unknown watch co"), "");
        assert_eq!(normalize_brand(""), "");
    }

    #[test]
    fn normalize_uses_declaration_order() {
        // Both brands appear; CASIO is declared first.
        assert_eq!(normalize_brand("Edifice by Casio"), "CASIO");
    }

    #[test]
    fn infer_from_model_prefixes() {
        assert_eq!(infer_brand_from_model("SKX007"), "SEIKO");
        assert_eq!(infer_brand_from_model("srpd55k1"), "SEIKO");
        assert_eq!(infer_brand_from_model("RA-AA0001B"), "ORIENT");
        assert_eq!(infer_brand_from_model("FAC00009N0"), "ORIENT");
        assert_eq!(infer_brand_from_model("NY0040-09E"), "CITIZEN");
        assert_eq!(infer_brand_from_model("GA-2100-1A"), "CASIO");
        assert_eq!(infer_brand_from_model("A168WA-1"), "CASIO");
        assert_eq!(infer_brand_from_model("M12345"), "INGERSOLL");
        assert_eq!(infer_brand_from_model("T137.407.11.041.00"), "TISSOT");
        assert_eq!(infer_brand_from_model("EFV-540D"), "CASIO");
        assert_eq!(infer_brand_from_model("L3.781.4.96.9"), "LONGINES");
        assert_eq!(infer_brand_from_model("H32451581"), "HAMILTON");
        assert_eq!(infer_brand_from_model("210.30.42.20.01.001"), "OMEGA");
        assert_eq!(infer_brand_from_model("XYZ"), "");
    }

    #[test]
    fn hint_takes_priority_over_prefix() {
        assert_eq!(brand_hint_for("SKX007", "Orient"), "ORIENT");
        assert_eq!(brand_hint_for("SKX007", ""), "SEIKO");
        assert_eq!(brand_hint_for("Rolex 116610", ""), "ROLEX");
    }

    #[test]
    fn product_name_joins_available_parts() {
        assert_eq!(product_name("Seiko", "SKX007"), "Seiko SKX007");
        assert_eq!(product_name("", "SKX007"), "SKX007");
        assert_eq!(product_name("Seiko", " "), "Seiko");
        assert_eq!(product_name("", ""), "Watch Product");
        assert_eq!(product_name("B", &"9".repeat(300)).chars().count(), 255);
    }
}

//! Building catalog entries from resolved bags.

use watch_porter_core::detect::dedup_preserving_order;
use watch_porter_core::text::first_non_empty;
use watch_porter_core::{
    AttributeBag, CatalogEntry, CategoryDetector, CategoryGroup, GroupValue, MappingConfig,
    UNIVERSAL_COLLECTION, estimate_case_size, estimate_price, infer_brand_from_model,
    normalize_brand, normalize_case_size_label, product_name, template_description,
};

/// Build a complete catalog entry for `model` from a resolved bag.
///
/// Every group is filled: the bag's own value, then detection over the
/// bag's text, then (case size only) the model/brand estimate, then the
/// group's unknown marker.
pub fn generate_entry(model: &str, bag: &AttributeBag, config: &MappingConfig) -> CatalogEntry {
    let brand = first_non_empty(&[
        &normalize_brand(&bag.brand),
        &normalize_brand(&bag.name),
        &infer_brand_from_model(model),
        &normalize_brand(model),
    ]);

    let name = product_name(&config.brand_label(&brand, &bag.name), model);
    let combined = [bag.combined_text().as_str(), model].join(" ");
    let detector = CategoryDetector::new(config);

    let mut entry = CatalogEntry {
        name,
        brand: first_non_empty(&[&brand, UNIVERSAL_COLLECTION]),
        description: first_non_empty(&[&bag.description, &template_description(model)]),
        price: bag.price.trim().to_string(),
        price_estimated: carries_estimated_price(bag),
        image_url: bag.image_url.trim().to_string(),
        specs: bag.specs.clone(),
        ..Default::default()
    };
    if entry.price.is_empty() {
        entry.price = estimate_price(model, &brand);
        entry.price_estimated = true;
    }

    for group in CategoryGroup::ALL {
        let value = match bag.groups.get(group) {
            Some(explicit) => explicit.clone(),
            None => match detector.detect(group, &combined) {
                Some(detected) => detected,
                None if group == CategoryGroup::CaseSize => {
                    GroupValue::Label(estimate_case_size(model, &brand))
                }
                None => GroupValue::Unknown,
            },
        };
        entry.groups.set(group, Some(value));
    }
    entry
}

/// The bag's price was copied from a catalog entry whose price was itself
/// estimated.
fn carries_estimated_price(bag: &AttributeBag) -> bool {
    bag.catalog
        .as_ref()
        .is_some_and(|c| c.price_estimated && c.price.trim() == bag.price.trim())
}

/// Collection list for a stored entry: the universal collection, the brand
/// collection, then every non-empty group value. Case sizes are normalized.
pub fn collections_for_entry(entry: &CatalogEntry, config: &MappingConfig) -> Vec<String> {
    let mut collections = vec![UNIVERSAL_COLLECTION.to_string()];
    if let Some(label) = config.brand_collection(&entry.brand.to_uppercase()) {
        collections.push(label.to_string());
    }
    for group in CategoryGroup::ALL {
        let mut text = entry.groups.text(group);
        if group == CategoryGroup::CaseSize {
            text = normalize_case_size_label(&text);
        }
        if !text.trim().is_empty() {
            collections.push(text.trim().to_string());
        }
    }
    dedup_preserving_order(collections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use watch_porter_core::{RawFetchResult, ResolutionOrigin};

    fn bag(name: &str, description: &str) -> AttributeBag {
        AttributeBag::from_raw(
            RawFetchResult {
                name: name.into(),
                description: description.into(),
                ..Default::default()
            },
            ResolutionOrigin::GeneralSearch,
        )
    }

    #[test]
    fn explicit_values_win_over_detection() {
        let config = MappingConfig::defaults();
        let mut b = bag("Seiko SKX007", "Automatic diver with black dial");
        b.groups
            .set(CategoryGroup::DialColor, Some(GroupValue::label("SR - Mavi")));
        let entry = generate_entry("SKX007", &b, &config);
        assert_eq!(entry.groups.text(CategoryGroup::DialColor), "SR - Mavi");
        assert_eq!(entry.brand, "SEIKO");
    }

    #[test]
    fn every_group_is_filled() {
        let config = MappingConfig::defaults();
        let entry = generate_entry("ZZ1234", &bag("", ""), &config);
        assert_eq!(entry.filled_count(), 7);
        assert_eq!(
            entry.groups.text(CategoryGroup::CaseSize),
            "Ölçü - 41 x 41 mm"
        );
        assert_eq!(
            entry.groups.get(CategoryGroup::DialColor),
            Some(&GroupValue::Unknown)
        );
        assert_eq!(entry.brand, UNIVERSAL_COLLECTION);
        assert_eq!(entry.description, "Watch Model: ZZ1234");
    }

    #[test]
    fn missing_price_is_estimated_and_flagged() {
        let config = MappingConfig::defaults();
        let entry = generate_entry("SKX007", &bag("", ""), &config);
        assert!(entry.price_estimated);
        assert_eq!(entry.price, estimate_price("SKX007", "SEIKO"));

        let mut priced = bag("", "");
        priced.price = "289.00".into();
        let entry = generate_entry("SKX007", &priced, &config);
        assert!(!entry.price_estimated);
        assert_eq!(entry.price, "289.00");
    }

    #[test]
    fn collections_start_universal_and_dedupe() {
        let config = MappingConfig::defaults();
        let mut entry = CatalogEntry {
            brand: "SEIKO".into(),
            ..Default::default()
        };
        entry
            .groups
            .set(CategoryGroup::CaseSize, Some(GroupValue::label("Ölçü - 42 mm")));
        entry
            .groups
            .set(CategoryGroup::Bracelet, Some(GroupValue::label("Bilərzik - Polad")));
        entry
            .groups
            .set(CategoryGroup::CaseMaterial, Some(GroupValue::label("Bilərzik - Polad")));

        let collections = collections_for_entry(&entry, &config);
        assert_eq!(collections[0], UNIVERSAL_COLLECTION);
        assert_eq!(
            collections[1],
            config.brand_collection("SEIKO").unwrap().to_string()
        );
        assert!(collections.contains(&"Ölçü - 42 x 42 mm".to_string()));
        assert_eq!(
            collections.iter().filter(|c| *c == "Bilərzik - Polad").count(),
            1
        );
    }
}

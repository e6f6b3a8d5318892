//! Filling in a fetched bag: extra web text, then the classifier's groups.

use watch_porter_core::text::first_non_empty;
use watch_porter_core::{
    AttributeBag, CategoryGroup, GroupValue, ImageLookup, UNIVERSAL_COLLECTION,
    estimate_case_size, extract_case_size, extract_price, normalize_brand,
};

use crate::classify::Classification;
use crate::client::HttpClient;
use crate::search::gather_external_features;

/// Merge web text about the model into the bag and backfill the image,
/// price and brand from it.
pub fn enrich(bag: &mut AttributeBag, model: &str, http: &dyn HttpClient) {
    let hint = bag.brand_hint(model);
    let external = gather_external_features(http, model, &hint);

    let merged = [
        bag.name.as_str(),
        &bag.description,
        &bag.specs.join(" "),
        &external.feature_text,
    ]
    .join(" ");
    bag.set_feature_text(&merged);

    if bag.image_url.trim().is_empty() && !external.image_url.is_empty() {
        bag.image_url = external.image_url;
    }
    if bag.price.trim().is_empty() {
        bag.price = extract_price(&bag.feature_text);
    }
    if normalize_brand(&bag.brand).is_empty() {
        bag.brand = first_non_empty(&[&normalize_brand(&bag.feature_text), UNIVERSAL_COLLECTION]);
    }
}

/// Merge a classification into the bag.
///
/// Each label only fills a group that is absent or unknown. The case size
/// comes from the bag's text, else from the model/brand estimate. A bag
/// without an image gets one from `images`.
pub fn apply_classification(
    bag: &mut AttributeBag,
    model: &str,
    classification: &Classification,
    images: &dyn ImageLookup,
) {
    let hint = bag.brand_hint(model);

    for (group, value) in classification.group_values() {
        bag.groups.offer(group, value);
    }

    let size_context = [
        bag.name.as_str(),
        &bag.description,
        &bag.feature_text,
        model,
    ]
    .join(" ");
    let size = first_non_empty(&[
        &extract_case_size(&size_context),
        &estimate_case_size(model, &hint),
    ]);
    bag.groups.offer(CategoryGroup::CaseSize, GroupValue::Label(size));

    if normalize_brand(&bag.brand).is_empty() {
        bag.brand = first_non_empty(&[&hint, UNIVERSAL_COLLECTION]);
    }
    if bag.image_url.trim().is_empty() {
        bag.image_url = images.find_image(model);
    }
}

pub mod bag;
pub mod brand;
pub mod case_size;
pub mod category;
pub mod config;
pub mod detect;
pub mod error;
pub mod image_url;
pub mod model_number;
pub mod price;
pub mod text;

pub use bag::{
    AttributeBag, CatalogEntry, RawFetchResult, ResolutionOrigin, is_generic_description,
    template_description,
};
pub use brand::{infer_brand_from_model, normalize_brand, product_name};
pub use case_size::{estimate_case_size, extract_case_size, normalize_case_size_label};
pub use category::{CategoryGroup, CategorySet, GroupValue};
pub use config::{KeywordRule, MappingConfig};
pub use detect::{AttributeHints, CategoryDetector};
pub use error::ConfigError;
pub use image_url::{
    has_supported_image_extension, is_usable_image_url, is_valid_image_url, prepare_image_url,
};
pub use model_number::{ModelNumber, canonicalize_model_number, normalize_model_key};
pub use price::{estimate_price, extract_price, normalize_price};

/// Collection every exported product belongs to. Also used as the brand
/// label when no known brand could be determined.
pub const UNIVERSAL_COLLECTION: &str = "Bütün Məhsullar";

/// Image used when no product photo could be found anywhere.
pub const IMAGE_PLACEHOLDER_URL: &str =
    "https://dummyimage.com/1200x1200/e9ecef/212529.jpg?text=No+Image";

/// Something that can find a product image for a model number.
///
/// The row builder only depends on this trait, so export stays usable
/// without network access (tests plug in a fixed lookup).
pub trait ImageLookup {
    /// Return the best image URL for the model, or [`IMAGE_PLACEHOLDER_URL`]
    /// when nothing usable was found.
    fn find_image(&self, model: &str) -> String;
}

/// An [`ImageLookup`] that never searches and always yields the placeholder.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderImages;

impl ImageLookup for PlaceholderImages {
    fn find_image(&self, _model: &str) -> String {
        IMAGE_PLACEHOLDER_URL.to_string()
    }
}

//! The storefront import schema.

pub const COLUMN_COUNT: usize = 51;

/// Column names in the order the importer requires.
pub const WIX_COLUMNS: [&str; COLUMN_COUNT] = [
    "handleId",
    "fieldType",
    "name",
    "description",
    "productImageUrl",
    "collection",
    "sku",
    "ribbon",
    "price",
    "surcharge",
    "visible",
    "discountMode",
    "discountValue",
    "inventory",
    "weight",
    "cost",
    "productOptionName1",
    "productOptionType1",
    "productOptionDescription1",
    "productOptionName2",
    "productOptionType2",
    "productOptionDescription2",
    "productOptionName3",
    "productOptionType3",
    "productOptionDescription3",
    "productOptionName4",
    "productOptionType4",
    "productOptionDescription4",
    "productOptionName5",
    "productOptionType5",
    "productOptionDescription5",
    "productOptionName6",
    "productOptionType6",
    "productOptionDescription6",
    "productVariantName1",
    "productVariantOptionValue1_1",
    "productVariantOptionValue1_2",
    "productVariantOptionValue1_3",
    "productVariantOptionValue1_4",
    "productVariantOptionValue1_5",
    "productVariantOptionValue1_6",
    "productVariantPrice1",
    "productVariantInventory1",
    "productVariantVisible1",
    "productVariantSku1",
    "productVariantWeight1",
    "productVariantCost1",
    "productVariantWholesalePrice1",
    "productVariantMetaData1",
    "brand",
];

pub fn column_index(name: &str) -> Option<usize> {
    WIX_COLUMNS.iter().position(|c| *c == name)
}

use serde_json::{Map, Value};

use crate::columns::{COLUMN_COUNT, WIX_COLUMNS, column_index};

/// The importer's row type. Anything else is read as `Product`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FieldType {
    #[default]
    Product,
    Variant,
}

impl FieldType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Product => "Product",
            Self::Variant => "Variant",
        }
    }

    /// Exact match only, as the importer expects.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "Product" => Some(Self::Product),
            "Variant" => Some(Self::Variant),
            _ => None,
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a row's price came from. Not written to the CSV.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PriceOrigin {
    /// Found on a source page, or stored in the catalog from one.
    #[default]
    Scraped,
    /// The brand-range estimate.
    Estimated,
}

/// One CSV row: every schema column as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRow {
    values: [String; COLUMN_COUNT],
    pub price_origin: PriceOrigin,
}

impl Default for OutputRow {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputRow {
    /// A row with every column empty except `fieldType`.
    pub fn new() -> Self {
        let mut row = Self {
            values: std::array::from_fn(|_| String::new()),
            price_origin: PriceOrigin::default(),
        };
        row.set_field_type(FieldType::Product);
        row
    }

    /// Build a row from already-ordered values.
    pub fn from_values(values: [String; COLUMN_COUNT]) -> Self {
        Self {
            values,
            price_origin: PriceOrigin::default(),
        }
    }

    /// Copy the schema columns out of a loose JSON object. Missing and null
    /// columns become empty; other scalars and nested values are rendered
    /// as text.
    pub fn from_json_map(map: &Map<String, Value>) -> Self {
        Self::from_values(std::array::from_fn(|i| {
            map.get(WIX_COLUMNS[i]).map(value_text).unwrap_or_default()
        }))
    }

    /// Value of a column; empty for names outside the schema.
    pub fn get(&self, column: &str) -> &str {
        column_index(column).map_or("", |i| self.values[i].as_str())
    }

    /// Set a column. Returns `false` for names outside the schema.
    pub fn set(&mut self, column: &str, value: impl Into<String>) -> bool {
        match column_index(column) {
            Some(i) => {
                self.values[i] = value.into();
                true
            }
            None => false,
        }
    }

    pub fn values(&self) -> &[String; COLUMN_COUNT] {
        &self.values
    }

    pub fn handle(&self) -> &str {
        self.get("handleId")
    }

    pub fn set_handle(&mut self, handle: impl Into<String>) {
        self.set("handleId", handle);
    }

    /// The row's type, if the column holds one of the two valid values.
    pub fn field_type(&self) -> Option<FieldType> {
        FieldType::parse(self.get("fieldType"))
    }

    pub fn set_field_type(&mut self, field_type: FieldType) {
        self.set("fieldType", field_type.as_str());
    }

    /// Trim every value.
    pub fn trim_values(&mut self) {
        for value in &mut self.values {
            let trimmed = value.trim();
            if trimmed.len() != value.len() {
                *value = trimmed.to_string();
            }
        }
    }

    /// Column name and value pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        WIX_COLUMNS
            .iter()
            .copied()
            .zip(self.values.iter().map(String::as_str))
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn new_row_is_an_empty_product() {
        let row = OutputRow::new();
        assert_eq!(row.field_type(), Some(FieldType::Product));
        assert_eq!(row.handle(), "");
        assert_eq!(row.iter().count(), COLUMN_COUNT);
    }

    #[test]
    fn unknown_columns_are_ignored() {
        let mut row = OutputRow::new();
        assert!(!row.set("color", "red"));
        assert_eq!(row.get("color"), "");
        assert!(row.set("sku", "SKX007"));
        assert_eq!(row.get("sku"), "SKX007");
    }

    #[test]
    fn json_values_become_text() {
        let map = json!({
            "handleId": "skx007",
            "price": 289.5,
            "visible": true,
            "ribbon": null,
            "extra": "dropped"
        });
        let row = OutputRow::from_json_map(map.as_object().unwrap());
        assert_eq!(row.handle(), "skx007");
        assert_eq!(row.get("price"), "289.5");
        assert_eq!(row.get("visible"), "true");
        assert_eq!(row.get("ribbon"), "");
        assert_eq!(row.field_type(), None);
    }

    #[test]
    fn field_type_is_exact() {
        assert_eq!(FieldType::parse("Variant"), Some(FieldType::Variant));
        assert_eq!(FieldType::parse("product"), None);
        assert_eq!(FieldType::parse(""), None);
    }
}

//! Repairing rows that arrive from outside, such as hand-edited JSON.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::builder::slugify;
use crate::error::ExportError;
use crate::row::{FieldType, OutputRow};

/// Return `handle`, or `handle-2`, `handle-3`... if already taken, and
/// record the result in `used`.
pub fn make_unique_handle(handle: &str, used: &mut HashSet<String>) -> String {
    let mut candidate = handle.to_string();
    let mut suffix = 1;
    while used.contains(&candidate) {
        suffix += 1;
        candidate = format!("{handle}-{suffix}");
    }
    used.insert(candidate.clone());
    candidate
}

/// Pull the row list out of a document: either a bare array or an object
/// with a `results` array.
fn row_values(document: &Value) -> Result<&[Value], ExportError> {
    match document {
        Value::Array(rows) => Ok(rows),
        Value::Object(map) => match map.get("results") {
            Some(Value::Array(rows)) => Ok(rows),
            Some(_) => Err(ExportError::invalid_document("`results` is not an array")),
            None => Err(ExportError::NoRows),
        },
        _ => Err(ExportError::invalid_document(
            "expected an array of rows or an object with `results`",
        )),
    }
}

/// Turn loosely-shaped row objects into valid export rows.
///
/// Empty handles are rebuilt from the name, then the sku, then
/// `product-{n}` (1-based); handles are made unique; a `fieldType` other
/// than `Product`/`Variant` becomes `Product`. Entries that are not objects
/// are treated as empty rows.
pub fn normalize_rows(document: &Value) -> Result<Vec<OutputRow>, ExportError> {
    let rows = row_values(document)?;
    if rows.is_empty() {
        return Err(ExportError::NoRows);
    }

    let empty = Map::new();
    let mut used = HashSet::new();
    let mut out = Vec::with_capacity(rows.len());
    for (idx, value) in rows.iter().enumerate() {
        let idx = idx + 1;
        let mut row = OutputRow::from_json_map(value.as_object().unwrap_or(&empty));

        let mut handle = row.handle().trim().to_string();
        if handle.is_empty() {
            let source = [row.get("name"), row.get("sku")]
                .into_iter()
                .find(|s| !s.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| format!("product-{idx}"));
            handle = slugify(&source);
        }
        if handle.is_empty() {
            handle = format!("product-{idx}");
        }
        let handle = make_unique_handle(&handle, &mut used);
        row.set_handle(handle);

        let field_type = row.field_type().unwrap_or_default();
        row.set_field_type(field_type);

        log::info!(
            "Row {idx}: handleId='{}', fieldType='{}'",
            row.handle(),
            field_type
        );
        out.push(row);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn unique_suffixes() {
        let mut used = HashSet::new();
        assert_eq!(make_unique_handle("a", &mut used), "a");
        assert_eq!(make_unique_handle("a", &mut used), "a-2");
        assert_eq!(make_unique_handle("a", &mut used), "a-3");
        assert_eq!(make_unique_handle("a-2", &mut used), "a-2-2");
    }

    #[test]
    fn repairs_handles_and_types() {
        let doc = json!({"results": [
            {"handleId": "", "name": "Seiko SKX007", "fieldType": "product"},
            {"handleId": "seiko-skx007", "fieldType": "Variant"},
            {"sku": "!!!"},
            {},
            "not an object"
        ]});
        let rows = normalize_rows(&doc).unwrap();
        let handles: Vec<&str> = rows.iter().map(OutputRow::handle).collect();
        assert_eq!(
            handles,
            ["seiko-skx007", "seiko-skx007-2", "product-3", "product-4", "product-5"]
        );
        assert_eq!(rows[0].field_type(), Some(FieldType::Product));
        assert_eq!(rows[1].field_type(), Some(FieldType::Variant));
        assert!(rows.iter().all(|r| r.get("price").is_empty()));
    }

    #[test]
    fn accepts_bare_arrays() {
        let rows = normalize_rows(&json!([{"handleId": "x"}])).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].handle(), "x");
    }

    #[test]
    fn empty_and_malformed_documents() {
        assert!(matches!(normalize_rows(&json!([])), Err(ExportError::NoRows)));
        assert!(matches!(
            normalize_rows(&json!({"results": []})),
            Err(ExportError::NoRows)
        ));
        assert!(matches!(normalize_rows(&json!({})), Err(ExportError::NoRows)));
        assert!(matches!(
            normalize_rows(&json!({"results": "rows"})),
            Err(ExportError::InvalidDocument(_))
        ));
        assert!(matches!(
            normalize_rows(&json!("rows")),
            Err(ExportError::InvalidDocument(_))
        ));
    }
}

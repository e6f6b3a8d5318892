use std::collections::HashSet;

use serde_json::json;
use tempfile::TempDir;
use watch_porter_core::{
    AttributeBag, MappingConfig, PlaceholderImages, RawFetchResult, ResolutionOrigin,
};
use watch_porter_export::{
    COLUMN_COUNT, FieldType, RowBuilder, normalize_rows, read_csv, write_csv_file,
};

fn scraped(name: &str, description: &str) -> AttributeBag {
    AttributeBag::from_raw(
        RawFetchResult {
            name: name.into(),
            description: description.into(),
            image_url: "https://img.test/watch.jpg".into(),
            price: "199.00".into(),
            specs: vec!["Case Size: 42mm".into(), "Water Resistance: 200m".into()],
            ..Default::default()
        },
        ResolutionOrigin::Ebay,
    )
}

#[test]
fn rows_survive_a_file_round_trip() {
    let config = MappingConfig::defaults();
    let builder = RowBuilder::new(&config, &PlaceholderImages);

    let first = scraped("Seiko \"Turtle\" SRP777", "Diver, automatic\nwith day/date");
    let second = AttributeBag::synthetic("GA-2100-1A");
    let rows = builder.build_rows([("SRP777", &first), ("GA-2100-1A", &second)]);

    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("out").join("watches.csv");
    write_csv_file(&path, &rows).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert!(!bytes.starts_with(&[0xEF, 0xBB, 0xBF]));
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.contains("\r\n"));

    let back = read_csv(&text).unwrap();
    assert_eq!(back.len(), 2);
    for (a, b) in rows.iter().zip(&back) {
        assert_eq!(a.values().len(), COLUMN_COUNT);
        assert_eq!(a.values(), b.values());
    }
    assert_eq!(back[0].get("price"), "199.00");
    assert!(back[0].get("description").contains("<li>Water Resistance: 200m</li>"));
}

#[test]
fn handles_are_unique_for_any_batch_size() {
    let config = MappingConfig::defaults();
    let builder = RowBuilder::new(&config, &PlaceholderImages);
    let models = ["SKX007", "skx007", "SKX-007", "", "!!!", "SKX007", "Seiko SKX007"];
    let bags: Vec<AttributeBag> = models.iter().map(|m| AttributeBag::synthetic(m)).collect();

    for size in 1..=models.len() {
        let rows = builder.build_rows(models[..size].iter().copied().zip(&bags));
        let mut seen = HashSet::new();
        for row in &rows {
            assert!(!row.handle().is_empty());
            assert!(seen.insert(row.handle().to_string()), "duplicate {}", row.handle());
            assert!(matches!(
                row.field_type(),
                Some(FieldType::Product | FieldType::Variant)
            ));
        }
    }
}

#[test]
fn edited_rows_are_repaired_and_exported() {
    let doc = json!({"results": [
        {"handleId": "", "name": "Casio GA-2100", "fieldType": "Simple", "price": 99},
        {"handleId": "casio-ga-2100", "fieldType": "Product"}
    ]});
    let rows = normalize_rows(&doc).unwrap();
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("edited.csv");
    write_csv_file(&path, &rows).unwrap();

    let back = read_csv(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(back[0].handle(), "casio-ga-2100");
    assert_eq!(back[0].get("fieldType"), "Product");
    assert_eq!(back[0].get("price"), "99");
    assert_eq!(back[1].handle(), "casio-ga-2100-2");
}

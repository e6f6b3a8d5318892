//! Brand collection and category keyword mapping.
//!
//! Ships with built-in defaults and can be overridden by a JSON file with two
//! top-level objects: `brand_collections` (brand -> collection label) and
//! `category_keywords` (group key -> label -> keyword list). Keyword order
//! follows the order in the file, and the first matching label wins.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::brand::normalize_brand;
use crate::category::CategoryGroup;
use crate::error::ConfigError;
use crate::text::title_case;

/// One label and the keywords that select it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordRule {
    pub label: String,
    pub keywords: Vec<String>,
}

impl KeywordRule {
    pub fn new(label: &str, keywords: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Loaded mapping configuration.
#[derive(Debug, Clone)]
pub struct MappingConfig {
    brand_collections: BTreeMap<String, String>,
    category_keywords: HashMap<CategoryGroup, Vec<KeywordRule>>,
}

#[derive(Debug, Deserialize)]
struct MappingFile {
    brand_collections: Option<BTreeMap<String, String>>,
    category_keywords: Option<Map<String, Value>>,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self::defaults()
    }
}

impl MappingConfig {
    /// Built-in mapping.
    pub fn defaults() -> Self {
        Self {
            brand_collections: default_brand_collections(),
            category_keywords: default_category_keywords(),
        }
    }

    /// Parse a mapping document. A missing top-level object falls back to the
    /// built-in value for that object.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let file: MappingFile = serde_json::from_str(json)?;
        let brand_collections = file
            .brand_collections
            .unwrap_or_else(default_brand_collections);
        let category_keywords = match file.category_keywords {
            Some(map) => parse_category_keywords(&map)?,
            None => default_category_keywords(),
        };
        Ok(Self {
            brand_collections,
            category_keywords,
        })
    }

    /// Read and parse a mapping file.
    pub fn try_load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Load the mapping file, using defaults when it is missing or invalid.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("No mapping file at {}, using defaults", path.display());
            return Self::defaults();
        }
        match Self::try_load(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!(
                    "Could not load mapping file {}, using defaults: {}",
                    path.display(),
                    e
                );
                Self::defaults()
            }
        }
    }

    /// Keyword rules for a group, in match order.
    pub fn rules(&self, group: CategoryGroup) -> &[KeywordRule] {
        self.category_keywords
            .get(&group)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Collection label for a normalized brand, if the brand has one.
    pub fn brand_collection(&self, brand: &str) -> Option<&str> {
        let brand = brand.trim();
        if brand.is_empty() {
            return None;
        }
        self.brand_collections
            .get(brand)
            .or_else(|| self.brand_collections.get(&brand.to_uppercase()))
            .map(String::as_str)
    }

    /// Display label for a brand: its collection label, else the title-cased
    /// brand. Falls back to brand words in `fallback_text`.
    pub fn brand_label(&self, brand: &str, fallback_text: &str) -> String {
        let mut normalized = normalize_brand(brand);
        if normalized.is_empty() {
            normalized = normalize_brand(fallback_text);
        }
        if let Some(label) = self.brand_collection(&normalized) {
            return label.to_string();
        }
        title_case(&normalized)
    }

    /// The mapping as a JSON document in the on-disk format.
    pub fn to_json(&self) -> Value {
        let brands: Map<String, Value> = self
            .brand_collections
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();

        let mut groups = Map::new();
        for group in CategoryGroup::ALL {
            let labels: Map<String, Value> = self
                .rules(group)
                .iter()
                .map(|rule| {
                    let keywords = rule.keywords.iter().cloned().map(Value::String).collect();
                    (rule.label.clone(), Value::Array(keywords))
                })
                .collect();
            groups.insert(group.key().to_string(), Value::Object(labels));
        }

        let mut doc = Map::new();
        doc.insert("brand_collections".to_string(), Value::Object(brands));
        doc.insert("category_keywords".to_string(), Value::Object(groups));
        Value::Object(doc)
    }
}

fn parse_category_keywords(
    map: &Map<String, Value>,
) -> Result<HashMap<CategoryGroup, Vec<KeywordRule>>, ConfigError> {
    let mut parsed = HashMap::new();
    for (key, labels) in map {
        let Some(group) = CategoryGroup::from_key(key) else {
            log::warn!("Ignoring unknown category group '{}' in mapping", key);
            continue;
        };
        let labels = labels.as_object().ok_or_else(|| {
            ConfigError::invalid_mapping(format!("category '{key}' must be an object"))
        })?;

        let mut rules = Vec::with_capacity(labels.len());
        for (label, keywords) in labels {
            let keywords = keywords.as_array().ok_or_else(|| {
                ConfigError::invalid_mapping(format!("keywords for '{label}' must be a list"))
            })?;
            let keywords = keywords
                .iter()
                .map(|k| {
                    k.as_str().map(str::to_string).ok_or_else(|| {
                        ConfigError::invalid_mapping(format!(
                            "keywords for '{label}' must be strings"
                        ))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            rules.push(KeywordRule {
                label: label.clone(),
                keywords,
            });
        }
        parsed.insert(group, rules);
    }
    Ok(parsed)
}

fn default_brand_collections() -> BTreeMap<String, String> {
    [
        ("CASIO", "CASIO"),
        ("CITIZEN", "CITIZEN"),
        ("EDIFICE", "EDIFICE"),
        ("INGERSOLL", "INGERSOLL"),
        ("ORIENT", "ORIENT"),
        ("SEIKO", "SEİKO"),
        ("SEİKO", "SEİKO"),
        ("HAMILTON", "HAMILTON"),
        ("LONGINES", "LONGINES"),
        ("OMEGA", "OMEGA"),
        ("ROLEX", "ROLEX"),
        ("TISSOT", "TISSOT"),
        ("TUDOR", "TUDOR"),
        ("TIMEX", "TIMEX"),
        ("BULOVA", "BULOVA"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn default_category_keywords() -> HashMap<CategoryGroup, Vec<KeywordRule>> {
    use CategoryGroup::*;

    let mut map = HashMap::new();
    map.insert(
        DialColor,
        vec![
            KeywordRule::new("SR - Ağ", &["white dial", "ağ siferblat", "ağ dial"]),
            KeywordRule::new(
                "SR - Boz",
                &["gray dial", "grey dial", "boz siferblat", "boz dial"],
            ),
            KeywordRule::new(
                "SR - Firuzə",
                &["turquoise dial", "teal dial", "firuzə siferblat"],
            ),
            KeywordRule::new(
                "SR - Gəhvəyi",
                &["brown dial", "qəhvəyi siferblat", "qəhvəyi dial"],
            ),
            KeywordRule::new(
                "SR - Göy",
                &["navy dial", "cobalt dial", "göy siferblat", "göy dial"],
            ),
            KeywordRule::new("SR - Krem", &["cream dial", "ivory dial", "krem siferblat"]),
            KeywordRule::new("SR - Mavi", &["blue dial", "mavi siferblat", "mavi dial"]),
            KeywordRule::new("SR - Qara", &["black dial", "qara siferblat", "qara dial"]),
            KeywordRule::new(
                "SR - Qırmızı",
                &["red dial", "qırmızı siferblat", "qırmızı dial"],
            ),
            KeywordRule::new("SR - Sarı", &["yellow dial", "sarı siferblat", "sarı dial"]),
            KeywordRule::new("SR - Yaşıl", &["green dial", "yaşıl siferblat", "yaşıl dial"]),
        ],
    );
    map.insert(
        Bracelet,
        vec![
            KeywordRule::new("Bilərzik - Dəri", &["leather", "dəri", "genuine leather"]),
            KeywordRule::new(
                "Bilərzik - Kauçuk",
                &["rubber", "silicone", "resin", "kauçuk"],
            ),
            KeywordRule::new(
                "Bilərzik - Polad",
                &[
                    "steel bracelet",
                    "stainless steel bracelet",
                    "metal bracelet",
                    "polad bilərzik",
                    "mesh bracelet",
                    "milanese",
                ],
            ),
        ],
    );
    map.insert(
        Gender,
        vec![
            KeywordRule::new("Cinsi - Kişi", &["men", "mens", "men's", "kişi", "male"]),
            KeywordRule::new(
                "Cinsi - Qadın",
                &["women", "womens", "women's", "lady", "ladies", "qadın", "female"],
            ),
        ],
    );
    map.insert(
        CaseSize,
        vec![
            KeywordRule::new("Ölçü - 30 x 30 mm", &["30 x 30 mm", "30x30 mm", "30x30", "30 mm"]),
            KeywordRule::new("Ölçü - 41 x 41 mm", &["41 x 41 mm", "41x41 mm", "41x41", "41 mm"]),
        ],
    );
    map.insert(
        Movement,
        vec![
            KeywordRule::new("Kvarts", &["quartz", "kvarts"]),
            KeywordRule::new(
                "Mexanika",
                &[
                    "automatic",
                    "mechanical",
                    "self-winding",
                    "manual wind",
                    "mexanik",
                    "mexanika",
                ],
            ),
        ],
    );
    map.insert(
        StrapColor,
        vec![
            KeywordRule::new(
                "KR - Gəhvəyi",
                &["brown strap", "brown leather", "qəhvəyi kəmər", "qəhvəyi dəri"],
            ),
            KeywordRule::new(
                "KR - Qara",
                &["black strap", "black leather", "qara kəmər", "qara dəri"],
            ),
            KeywordRule::new("KR - Göy", &["blue strap", "mavi kəmər", "göy kəmər"]),
            KeywordRule::new("KR - Boz", &["gray strap", "grey strap", "boz kəmər"]),
            KeywordRule::new(
                "KR - Boz/Sarı",
                &[
                    "gray and yellow strap",
                    "grey and yellow strap",
                    "boz sarı kəmər",
                    "boz/sarı kəmər",
                ],
            ),
            KeywordRule::new("KR - Ağ", &["white strap", "ağ kəmər"]),
            KeywordRule::new("KR - Krem", &["cream strap", "ivory strap", "krem kəmər"]),
            KeywordRule::new("KR - Sarı", &["yellow strap", "sarı kəmər"]),
        ],
    );
    map.insert(
        CaseMaterial,
        vec![KeywordRule::new(
            "Polad",
            &[
                "stainless steel",
                "steel case",
                "metal case",
                "polad korpus",
                "steel",
                "polad",
            ],
        )],
    );
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_cover_every_group() {
        let config = MappingConfig::defaults();
        for group in CategoryGroup::ALL {
            assert!(!config.rules(group).is_empty(), "{group} has no rules");
        }
        assert_eq!(config.rules(CategoryGroup::DialColor)[0].label, "SR - Ağ");
    }

    #[test]
    fn file_keyword_order_is_preserved() {
        let json = r#"{
            "category_keywords": {
                "mexanizm": {
                    "Mexanika": ["automatic"],
                    "Kvarts": ["quartz"]
                }
            }
        }"#;
        let config = MappingConfig::from_json_str(json).unwrap();
        let labels: Vec<&str> = config
            .rules(CategoryGroup::Movement)
            .iter()
            .map(|r| r.label.as_str())
            .collect();
        assert_eq!(labels, vec!["Mexanika", "Kvarts"]);
        // Groups absent from an explicit category_keywords object have no rules.
        assert!(config.rules(CategoryGroup::DialColor).is_empty());
        // brand_collections was missing, so defaults apply.
        assert_eq!(config.brand_collection("SEIKO"), Some("SEİKO"));
    }

    #[test]
    fn invalid_shapes_are_rejected() {
        let err = MappingConfig::from_json_str(r#"{"category_keywords": {"olcu": []}}"#);
        assert!(matches!(err, Err(ConfigError::InvalidMapping(_))));
        let err = MappingConfig::from_json_str("not json");
        assert!(matches!(err, Err(ConfigError::Json(_))));
    }

    #[test]
    fn load_falls_back_on_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("category_mapping.json");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"{ broken").unwrap();

        let config = MappingConfig::load(&path);
        assert_eq!(config.rules(CategoryGroup::Gender).len(), 2);

        let missing = MappingConfig::load(&dir.path().join("absent.json"));
        assert_eq!(missing.rules(CategoryGroup::Gender).len(), 2);
    }

    #[test]
    fn brand_label_prefers_collection() {
        let config = MappingConfig::defaults();
        assert_eq!(config.brand_label("seiko", ""), "SEİKO");
        assert_eq!(config.brand_label("", "a Tag Heuer piece"), "Tag Heuer");
        assert_eq!(config.brand_label("", ""), "");
    }

    #[test]
    fn to_json_round_trips() {
        let config = MappingConfig::defaults();
        let text = serde_json::to_string(&config.to_json()).unwrap();
        let back = MappingConfig::from_json_str(&text).unwrap();
        for group in CategoryGroup::ALL {
            assert_eq!(back.rules(group), config.rules(group));
        }
    }
}

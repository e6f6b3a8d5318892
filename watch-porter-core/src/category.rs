//! The seven attribute groups tracked per model and the three-way value
//! each group can hold.

use serde::{Deserialize, Serialize};

/// Substring that marks a stored value as "present but unclassifiable".
const UNKNOWN_MARKER: &str = "uyğun deyil";

/// Whether a stored group value is an unknown marker.
pub fn is_unknown_text(value: &str) -> bool {
    value.to_lowercase().contains(UNKNOWN_MARKER)
}

/// One of the fixed watch attribute groups.
///
/// Serialized with the catalog's JSON keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CategoryGroup {
    #[serde(rename = "siferblat_rengi")]
    DialColor,
    #[serde(rename = "bilerzik")]
    Bracelet,
    #[serde(rename = "cinsi")]
    Gender,
    #[serde(rename = "olcu")]
    CaseSize,
    #[serde(rename = "mexanizm")]
    Movement,
    #[serde(rename = "kemer_rengi")]
    StrapColor,
    #[serde(rename = "korpus")]
    CaseMaterial,
}

impl CategoryGroup {
    /// All groups in output order.
    pub const ALL: [CategoryGroup; 7] = [
        CategoryGroup::DialColor,
        CategoryGroup::Bracelet,
        CategoryGroup::Gender,
        CategoryGroup::CaseSize,
        CategoryGroup::Movement,
        CategoryGroup::StrapColor,
        CategoryGroup::CaseMaterial,
    ];

    /// Key used in the catalog and mapping JSON files.
    pub fn key(self) -> &'static str {
        match self {
            Self::DialColor => "siferblat_rengi",
            Self::Bracelet => "bilerzik",
            Self::Gender => "cinsi",
            Self::CaseSize => "olcu",
            Self::Movement => "mexanizm",
            Self::StrapColor => "kemer_rengi",
            Self::CaseMaterial => "korpus",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.key() == key)
    }

    /// Marker stored when the attribute is mentioned but cannot be mapped.
    pub fn unknown_label(self) -> &'static str {
        match self {
            Self::DialColor => "SR - Uyğun deyil",
            Self::Bracelet => "Bilərzik - Uyğun deyil",
            Self::Gender => "Cinsi - Uyğun deyil",
            Self::CaseSize => "Ölçü - Uyğun deyil",
            Self::Movement => "Mexanizm - Uyğun deyil",
            Self::StrapColor => "KR - Uyğun deyil",
            Self::CaseMaterial => "Korpus - Uyğun deyil",
        }
    }

    /// Prefix put in front of a bare vocabulary value to form a label.
    pub fn label_prefix(self) -> &'static str {
        match self {
            Self::DialColor => "SR - ",
            Self::Bracelet => "Bilərzik - ",
            Self::Gender => "Cinsi - ",
            Self::CaseSize => "Ölçü - ",
            Self::Movement | Self::CaseMaterial => "",
            Self::StrapColor => "KR - ",
        }
    }

    /// Broad words showing the attribute is being talked about at all.
    pub fn triggers(self) -> &'static [&'static str] {
        match self {
            Self::DialColor => &["dial", "siferblat", "face"],
            Self::Bracelet => &["bracelet", "strap", "band", "bilezik", "bilərzik", "kəmər"],
            Self::Gender => &["men", "women", "lady", "male", "female", "unisex", "kişi", "qadın"],
            Self::CaseSize => &["mm", "diameter", "case size", "ölçü"],
            Self::Movement => &["quartz", "automatic", "mechanical", "movement", "kvarts", "mexanika"],
            Self::StrapColor => &["strap", "band", "kəmər", "bracelet"],
            Self::CaseMaterial => &["case", "korpus", "stainless", "steel", "material"],
        }
    }

    fn index(self) -> usize {
        match self {
            Self::DialColor => 0,
            Self::Bracelet => 1,
            Self::Gender => 2,
            Self::CaseSize => 3,
            Self::Movement => 4,
            Self::StrapColor => 5,
            Self::CaseMaterial => 6,
        }
    }
}

impl std::fmt::Display for CategoryGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::DialColor => "dial color",
            Self::Bracelet => "bracelet",
            Self::Gender => "gender",
            Self::CaseSize => "case size",
            Self::Movement => "movement",
            Self::StrapColor => "strap color",
            Self::CaseMaterial => "case material",
        };
        write!(f, "{name}")
    }
}

/// A resolved group value. Absence is modelled as `Option::None` around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupValue {
    /// A label from the controlled vocabulary (or a cleaned freeform label).
    Label(String),
    /// The attribute is mentioned but could not be mapped.
    Unknown,
}

impl GroupValue {
    pub fn label(text: impl Into<String>) -> Self {
        Self::Label(text.into())
    }

    /// Parse stored text. Blank text is no value at all.
    pub fn from_text(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            None
        } else if is_unknown_text(text) {
            Some(Self::Unknown)
        } else {
            Some(Self::Label(text.to_string()))
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Self::Label(_))
    }

    /// Text form for storage and export.
    pub fn to_text(&self, group: CategoryGroup) -> String {
        match self {
            Self::Label(label) => label.clone(),
            Self::Unknown => group.unknown_label().to_string(),
        }
    }

    fn rank(value: Option<&GroupValue>) -> u8 {
        match value {
            None => 0,
            Some(Self::Unknown) => 1,
            Some(Self::Label(_)) => 2,
        }
    }
}

/// Values for all seven groups.
///
/// Merging is upgrade-only: absent < unknown < label, and a label is never
/// replaced once set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CategoryFields", into = "CategoryFields")]
pub struct CategorySet {
    values: [Option<GroupValue>; 7],
}

impl CategorySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, group: CategoryGroup) -> Option<&GroupValue> {
        self.values[group.index()].as_ref()
    }

    /// Overwrite a group unconditionally.
    pub fn set(&mut self, group: CategoryGroup, value: Option<GroupValue>) {
        self.values[group.index()] = value;
    }

    /// Store `value` only if it ranks strictly above the current value.
    /// Returns whether the set changed.
    pub fn offer(&mut self, group: CategoryGroup, value: GroupValue) -> bool {
        let slot = &mut self.values[group.index()];
        if GroupValue::rank(Some(&value)) > GroupValue::rank(slot.as_ref()) {
            *slot = Some(value);
            true
        } else {
            false
        }
    }

    /// Offer every value of `other`; returns how many groups changed.
    pub fn upgrade_from(&mut self, other: &CategorySet) -> usize {
        CategoryGroup::ALL
            .into_iter()
            .filter(|g| match other.get(*g) {
                Some(value) => self.offer(*g, value.clone()),
                None => false,
            })
            .count()
    }

    pub fn unknown_count(&self) -> usize {
        self.values
            .iter()
            .filter(|v| matches!(v, Some(GroupValue::Unknown)))
            .count()
    }

    pub fn filled_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Every group holds a known label.
    pub fn is_fully_known(&self) -> bool {
        self.values.iter().all(|v| matches!(v, Some(GroupValue::Label(_))))
    }

    /// Stored text for a group, empty when absent.
    pub fn text(&self, group: CategoryGroup) -> String {
        self.get(group).map(|v| v.to_text(group)).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CategoryGroup, Option<&GroupValue>)> {
        CategoryGroup::ALL.into_iter().map(|g| (g, self.get(g)))
    }
}

/// Flat JSON shape of a [`CategorySet`]: one string per group key, empty when
/// absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CategoryFields {
    #[serde(default)]
    siferblat_rengi: String,
    #[serde(default)]
    bilerzik: String,
    #[serde(default)]
    cinsi: String,
    #[serde(default)]
    olcu: String,
    #[serde(default)]
    mexanizm: String,
    #[serde(default)]
    kemer_rengi: String,
    #[serde(default)]
    korpus: String,
}

impl From<CategoryFields> for CategorySet {
    fn from(fields: CategoryFields) -> Self {
        let mut set = CategorySet::new();
        let texts = [
            fields.siferblat_rengi,
            fields.bilerzik,
            fields.cinsi,
            fields.olcu,
            fields.mexanizm,
            fields.kemer_rengi,
            fields.korpus,
        ];
        for (group, text) in CategoryGroup::ALL.into_iter().zip(texts) {
            set.set(group, GroupValue::from_text(&text));
        }
        set
    }
}

impl From<CategorySet> for CategoryFields {
    fn from(set: CategorySet) -> Self {
        Self {
            siferblat_rengi: set.text(CategoryGroup::DialColor),
            bilerzik: set.text(CategoryGroup::Bracelet),
            cinsi: set.text(CategoryGroup::Gender),
            olcu: set.text(CategoryGroup::CaseSize),
            mexanizm: set.text(CategoryGroup::Movement),
            kemer_rengi: set.text(CategoryGroup::StrapColor),
            korpus: set.text(CategoryGroup::CaseMaterial),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip() {
        for group in CategoryGroup::ALL {
            assert_eq!(CategoryGroup::from_key(group.key()), Some(group));
        }
        assert_eq!(CategoryGroup::from_key("nope"), None);
    }

    #[test]
    fn from_text_recognizes_three_states() {
        assert_eq!(GroupValue::from_text("  "), None);
        assert_eq!(GroupValue::from_text("KR - Uyğun deyil"), Some(GroupValue::Unknown));
        assert_eq!(
            GroupValue::from_text("SR - Qara"),
            Some(GroupValue::label("SR - Qara"))
        );
    }

    #[test]
    fn offer_never_downgrades() {
        let mut set = CategorySet::new();
        assert!(set.offer(CategoryGroup::DialColor, GroupValue::Unknown));
        assert!(set.offer(CategoryGroup::DialColor, GroupValue::label("SR - Qara")));
        assert!(!set.offer(CategoryGroup::DialColor, GroupValue::Unknown));
        assert!(!set.offer(CategoryGroup::DialColor, GroupValue::label("SR - Ağ")));
        assert_eq!(
            set.get(CategoryGroup::DialColor),
            Some(&GroupValue::label("SR - Qara"))
        );
    }

    #[test]
    fn upgrade_from_fills_gaps_only() {
        let mut base = CategorySet::new();
        base.set(CategoryGroup::Movement, Some(GroupValue::label("Kvarts")));
        base.set(CategoryGroup::Gender, Some(GroupValue::Unknown));

        let mut other = CategorySet::new();
        other.set(CategoryGroup::Movement, Some(GroupValue::label("Mexanika")));
        other.set(CategoryGroup::Gender, Some(GroupValue::label("Cinsi - Kişi")));
        other.set(CategoryGroup::CaseMaterial, Some(GroupValue::Unknown));

        assert_eq!(base.upgrade_from(&other), 2);
        assert_eq!(base.text(CategoryGroup::Movement), "Kvarts");
        assert_eq!(base.text(CategoryGroup::Gender), "Cinsi - Kişi");
        assert_eq!(base.text(CategoryGroup::CaseMaterial), "Korpus - Uyğun deyil");
        assert_eq!(base.unknown_count(), 1);
        assert_eq!(base.filled_count(), 3);
    }

    #[test]
    fn serializes_as_flat_strings() {
        let mut set = CategorySet::new();
        set.set(CategoryGroup::DialColor, Some(GroupValue::label("SR - Qara")));
        set.set(CategoryGroup::CaseSize, Some(GroupValue::Unknown));

        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json["siferblat_rengi"], "SR - Qara");
        assert_eq!(json["olcu"], "Ölçü - Uyğun deyil");
        assert_eq!(json["korpus"], "");

        let back: CategorySet = serde_json::from_value(json).unwrap();
        assert_eq!(back, set);
    }
}

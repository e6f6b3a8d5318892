//! Language-model classification of a model number into the six fixed
//! attribute fields.
//!
//! The model is only ever asked to pick from closed lists. Anything it
//! answers outside those lists is replaced with a rule-based default, and
//! the series rules in [`crate::series`] are applied last.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use watch_porter_core::brand::brand_hint_for;
use watch_porter_core::{CategoryGroup, GroupValue};

use crate::client::HttpClient;
use crate::credentials::{Credentials, ProviderKind};
use crate::error::SourceError;
use crate::series::apply_series_overrides;

pub const DIAL_COLORS: [&str; 11] = [
    "Ağ", "Boz", "Firuzə", "Gəhvəyi", "Göy", "Krem", "Mavi", "Qara", "Qırmızı", "Sarı", "Yaşıl",
];
pub const BRACELET_TYPES: [&str; 3] = ["Dəri", "Kauçuk", "Polad"];
pub const GENDERS: [&str; 2] = ["Kişi", "Qadın"];
pub const MOVEMENTS: [&str; 2] = ["Kvarts", "Mexanika"];
pub const BRACELET_COLORS: [&str; 8] = ["Ağ", "Boz", "Boz/Sarı", "Gəhvəyi", "Göy", "Krem", "Qara", "Sarı"];
pub const CASE_MATERIALS: [&str; 2] = ["Polad", "Plastik"];

const MECHANICAL_BRANDS: [&str; 8] = [
    "SEIKO", "ORIENT", "TISSOT", "ROLEX", "OMEGA", "LONGINES", "TUDOR", "HAMILTON",
];

static SPORT_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(GA-|GAB|GA-B|G-|DW-|AE-|F-)").unwrap());
static DIVER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(SKX|SPB|SRP|SRPD|NY\d|BN\d)").unwrap());
static JSON_OBJECT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{[\s\S]*\}").unwrap());

/// Six attribute values, each drawn from its allowed list.
///
/// Field names match the keys the model is asked to return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    #[serde(rename = "sr_dial_color")]
    pub dial_color: String,
    pub bracelet_type: String,
    pub gender: String,
    pub movement: String,
    pub bracelet_color: String,
    pub case_material: String,
}

impl Classification {
    /// Rule-based values used whenever the model cannot be asked or its
    /// answer is unusable.
    pub fn defaults(model: &str, brand_hint: &str) -> Self {
        let model = model.trim().to_uppercase();
        let brand = brand_hint_for(&model, brand_hint);

        let mut c = Self {
            dial_color: "Qara".into(),
            bracelet_type: "Polad".into(),
            gender: "Kişi".into(),
            movement: "Kvarts".into(),
            bracelet_color: "Boz".into(),
            case_material: "Polad".into(),
        };
        if MECHANICAL_BRANDS.contains(&brand.as_str()) {
            c.movement = "Mexanika".into();
        }
        if SPORT_PREFIX.is_match(&model) {
            c.bracelet_type = "Kauçuk".into();
            c.bracelet_color = "Qara".into();
            c.case_material = "Plastik".into();
            c.movement = "Kvarts".into();
        }
        if DIVER_PREFIX.is_match(&model) {
            c.case_material = "Polad".into();
        }
        c
    }

    /// Read a model answer, keeping only in-vocabulary values. Missing or
    /// unknown fields take the value from `defaults`.
    pub fn validated(answer: &Map<String, Value>, defaults: &Self) -> Self {
        let pick = |key: &str, allowed: &[&str], default: &str| {
            allowed_value(answer.get(key), allowed).unwrap_or_else(|| default.to_string())
        };
        Self {
            dial_color: pick("sr_dial_color", &DIAL_COLORS, &defaults.dial_color),
            bracelet_type: pick("bracelet_type", &BRACELET_TYPES, &defaults.bracelet_type),
            gender: pick("gender", &GENDERS, &defaults.gender),
            movement: pick("movement", &MOVEMENTS, &defaults.movement),
            bracelet_color: pick("bracelet_color", &BRACELET_COLORS, &defaults.bracelet_color),
            case_material: pick("case_material", &CASE_MATERIALS, &defaults.case_material),
        }
    }

    /// Group labels for the six classified groups (case size is not one of
    /// them).
    pub fn group_values(&self) -> [(CategoryGroup, GroupValue); 6] {
        let labeled = |group: CategoryGroup, value: &str| {
            (group, GroupValue::label(format!("{}{value}", group.label_prefix())))
        };
        [
            labeled(CategoryGroup::DialColor, &self.dial_color),
            labeled(CategoryGroup::Bracelet, &self.bracelet_type),
            labeled(CategoryGroup::Gender, &self.gender),
            labeled(CategoryGroup::Movement, &self.movement),
            labeled(CategoryGroup::StrapColor, &self.bracelet_color),
            labeled(CategoryGroup::CaseMaterial, &self.case_material),
        ]
    }
}

/// Exact match, then case-insensitive match, against `allowed`.
fn allowed_value(value: Option<&Value>, allowed: &[&str]) -> Option<String> {
    let raw = match value {
        Some(Value::String(s)) => s.trim(),
        _ => return None,
    };
    if raw.is_empty() {
        return None;
    }
    allowed
        .iter()
        .find(|a| **a == raw)
        .or_else(|| {
            let lower = raw.to_lowercase();
            allowed.iter().find(|a| a.to_lowercase() == lower)
        })
        .map(|a| a.to_string())
}

fn json_list(values: &[&str]) -> String {
    serde_json::to_string(values).unwrap_or_default()
}

/// The fixed classification prompt.
pub fn build_prompt(model: &str, brand_hint: &str) -> String {
    format!(
        "You are an expert WATCH CATALOG CLASSIFIER. \
Your task is NOT to search the internet. \
Classify the watch model number into fixed categories using known brand conventions and most common configuration. \
Return STRICT JSON only. No explanation.

MODEL_NUMBER: {model}
BRAND_HINT: {brand_hint}

ALLOWED VALUES ONLY:
Dial color (SR): {}
Bracelet type: {}
Gender: {}
Movement: {}
Bracelet color (KR): {}
Case material: {}

RULES:
- NEVER invent values outside allowed lists.
- If unsure, choose most common configuration for that model series.
- Assume adults. Default gender is Kişi unless clearly women's model.
- Sports/G-Shock/digital models => Kvarts.
- Mechanical Japanese/Swiss watches => Mexanika.
- G-Shock/resin cases => Plastik.
- Diver/Prospex/PRX/Bambino => Polad case.

OUTPUT FORMAT EXACTLY:
{{
  \"sr_dial_color\": \"\",
  \"bracelet_type\": \"\",
  \"gender\": \"\",
  \"movement\": \"\",
  \"bracelet_color\": \"\",
  \"case_material\": \"\"
}}",
        json_list(&DIAL_COLORS),
        json_list(&BRACELET_TYPES),
        json_list(&GENDERS),
        json_list(&MOVEMENTS),
        json_list(&BRACELET_COLORS),
        json_list(&CASE_MATERIALS),
    )
}

/// Pull a JSON object out of a model reply: plain JSON, a fenced block, or
/// prose around a `{...}` span.
pub fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix("```") {
        body = rest.strip_prefix("json").unwrap_or(rest);
    }
    if let Some(rest) = body.strip_suffix("```") {
        body = rest;
    }
    let body = body.trim();

    if let Ok(Value::Object(obj)) = serde_json::from_str(body) {
        return Some(obj);
    }
    match JSON_OBJECT.find(body).map(|m| serde_json::from_str(m.as_str())) {
        Some(Ok(Value::Object(obj))) => Some(obj),
        _ => None,
    }
}

/// A language-model API that turns a prompt into reply text.
pub trait ClassifierProvider {
    fn name(&self) -> &'static str;

    fn complete(&self, http: &dyn HttpClient, prompt: &str) -> Result<String, SourceError>;
}

/// OpenRouter chat completions.
pub struct OpenRouterProvider {
    key: String,
    model: String,
}

impl OpenRouterProvider {
    pub fn new(key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            model: model.into(),
        }
    }
}

impl ClassifierProvider for OpenRouterProvider {
    fn name(&self) -> &'static str {
        "openrouter"
    }

    fn complete(&self, http: &dyn HttpClient, prompt: &str) -> Result<String, SourceError> {
        let body = json!({
            "model": self.model,
            "temperature": 0,
            "messages": [{"role": "user", "content": prompt}],
            "response_format": {"type": "json_object"},
        });
        let reply = http.post_json(
            "https://openrouter.ai/api/v1/chat/completions",
            &[],
            &[("Authorization", format!("Bearer {}", self.key))],
            &body,
        )?;
        let reply: Value = serde_json::from_str(&reply)?;
        reply
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| SourceError::parse("OpenRouter reply has no message content"))
    }
}

/// Google AI Studio `generateContent`.
pub struct GoogleAiProvider {
    key: String,
    model: String,
}

impl GoogleAiProvider {
    pub fn new(key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            model: model.into(),
        }
    }
}

impl ClassifierProvider for GoogleAiProvider {
    fn name(&self) -> &'static str {
        "google"
    }

    fn complete(&self, http: &dyn HttpClient, prompt: &str) -> Result<String, SourceError> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
            self.model
        );
        let body = json!({
            "contents": [{"parts": [{"text": prompt}]}],
            "generationConfig": {"temperature": 0, "responseMimeType": "application/json"},
        });
        let reply = http.post_json(&url, &[("key", self.key.clone())], &[], &body)?;
        let reply: Value = serde_json::from_str(&reply)?;
        reply
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| SourceError::parse("Google AI reply has no candidate text"))
    }
}

/// Classifies model numbers, falling back to rules when no provider is
/// configured or the provider fails.
pub struct Classifier {
    provider: Option<Box<dyn ClassifierProvider>>,
}

impl Classifier {
    /// Provider chosen by configuration. No key means rules only.
    pub fn from_credentials(creds: &Credentials) -> Self {
        let Some(key) = creds.classifier_key.clone() else {
            return Self::disabled();
        };
        let model = creds.classifier_model().to_string();
        let provider: Box<dyn ClassifierProvider> = match creds.provider {
            ProviderKind::OpenRouter => Box::new(OpenRouterProvider::new(key, model)),
            ProviderKind::Google => Box::new(GoogleAiProvider::new(key, model)),
        };
        Self::with_provider(provider)
    }

    pub fn with_provider(provider: Box<dyn ClassifierProvider>) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    pub fn disabled() -> Self {
        Self { provider: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.provider.is_some()
    }

    /// Classify a model. Never fails: every error path yields the rule-based
    /// defaults, and series rules are applied to whatever came back.
    pub fn classify(&self, http: &dyn HttpClient, model: &str, brand_hint: &str) -> Classification {
        let defaults = Classification::defaults(model, brand_hint);
        let mut result = match &self.provider {
            None => defaults,
            Some(provider) => match provider.complete(http, &build_prompt(model, brand_hint)) {
                Ok(reply) => match extract_json_object(&reply) {
                    Some(answer) => Classification::validated(&answer, &defaults),
                    None => {
                        log::debug!("{} reply for {model} held no JSON object", provider.name());
                        defaults
                    }
                },
                Err(e) => {
                    log::debug!("{} classification failed for {model}: {e}", provider.name());
                    defaults
                }
            },
        };
        apply_series_overrides(&mut result, model, brand_hint);
        result
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    struct Replies {
        reply: Result<String, ()>,
        sent: RefCell<Vec<(String, Value)>>,
    }

    impl HttpClient for Replies {
        fn get(&self, _url: &str, _query: &[(&str, String)]) -> Result<String, SourceError> {
            Err(SourceError::transport("unused"))
        }

        fn post_json(
            &self,
            url: &str,
            _query: &[(&str, String)],
            _headers: &[(&str, String)],
            body: &Value,
        ) -> Result<String, SourceError> {
            self.sent.borrow_mut().push((url.to_string(), body.clone()));
            self.reply
                .clone()
                .map_err(|_| SourceError::Timeout(url.to_string()))
        }
    }

    fn replies(reply: Result<&str, ()>) -> Replies {
        Replies {
            reply: reply.map(str::to_string),
            sent: RefCell::new(Vec::new()),
        }
    }

    #[test]
    fn defaults_follow_brand_and_prefix() {
        let seiko = Classification::defaults("SKX007", "");
        assert_eq!(seiko.movement, "Mexanika");
        assert_eq!(seiko.case_material, "Polad");

        let gshock = Classification::defaults("GA-2100-1A1", "");
        assert_eq!(gshock.movement, "Kvarts");
        assert_eq!(gshock.case_material, "Plastik");
        assert_eq!(gshock.bracelet_type, "Kauçuk");

        let unknown = Classification::defaults("ZZ1", "");
        assert_eq!(unknown.movement, "Kvarts");
        assert_eq!(unknown.gender, "Kişi");
    }

    #[test]
    fn answers_are_clamped_to_vocabulary() {
        let answer = extract_json_object(
            r#"{"sr_dial_color": "mavi", "bracelet_type": "Titanium", "gender": "Qadın", "movement": 3}"#,
        )
        .unwrap();
        let c = Classification::validated(&answer, &Classification::defaults("ZZ1", ""));
        assert_eq!(c.dial_color, "Mavi");
        assert_eq!(c.bracelet_type, "Polad");
        assert_eq!(c.gender, "Qadın");
        assert_eq!(c.movement, "Kvarts");
    }

    #[test]
    fn json_is_found_in_fences_and_prose() {
        assert!(extract_json_object("```json\n{\"gender\": \"Kişi\"}\n```").is_some());
        assert!(extract_json_object("Sure! Here: {\"gender\": \"Kişi\"} hope it helps").is_some());
        assert!(extract_json_object("[1, 2]").is_none());
        assert!(extract_json_object("no json").is_none());
    }

    #[test]
    fn group_labels_carry_prefixes() {
        let values = Classification::defaults("ZZ1", "").group_values();
        assert_eq!(values[0], (CategoryGroup::DialColor, GroupValue::label("SR - Qara")));
        assert_eq!(values[3], (CategoryGroup::Movement, GroupValue::label("Kvarts")));
        assert_eq!(values[4], (CategoryGroup::StrapColor, GroupValue::label("KR - Boz")));
    }

    #[test]
    fn openrouter_reply_is_used() {
        let http = replies(Ok(
            r#"{"choices": [{"message": {"content": "{\"sr_dial_color\": \"Göy\", \"gender\": \"Kişi\"}"}}]}"#,
        ));
        let classifier =
            Classifier::with_provider(Box::new(OpenRouterProvider::new("k", "some/model")));
        let c = classifier.classify(&http, "ZZ1", "");
        assert_eq!(c.dial_color, "Göy");

        let sent = http.sent.borrow();
        assert_eq!(sent[0].0, "https://openrouter.ai/api/v1/chat/completions");
        assert_eq!(sent[0].1["model"], "some/model");
        assert!(sent[0].1["messages"][0]["content"]
            .as_str()
            .unwrap()
            .contains("MODEL_NUMBER: ZZ1"));
    }

    #[test]
    fn google_reply_is_used() {
        let http = replies(Ok(
            r#"{"candidates": [{"content": {"parts": [{"text": "{\"movement\": \"Mexanika\"}"}]}}]}"#,
        ));
        let classifier = Classifier::with_provider(Box::new(GoogleAiProvider::new("k", "gemini-x")));
        assert_eq!(classifier.classify(&http, "ZZ1", "").movement, "Mexanika");
        assert!(http.sent.borrow()[0].0.ends_with("/models/gemini-x:generateContent"));
    }

    #[test]
    fn failures_fall_back_to_defaults_with_series_rules() {
        let http = replies(Err(()));
        let classifier = Classifier::with_provider(Box::new(GoogleAiProvider::new("k", "m")));
        let c = classifier.classify(&http, "GA-2100-1A1", "");
        assert_eq!(c.movement, "Kvarts");
        assert_eq!(c.dial_color, "Qara");

        assert!(!Classifier::from_credentials(&Credentials::default()).is_enabled());
    }
}

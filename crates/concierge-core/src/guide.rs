//! Guide document model
//!
//! The guide is supplied in full with every request. Parsing never fails:
//! any part that does not have the expected shape is treated as absent, and
//! section entries keep only non-empty strings (trimmed).

use crate::ConciergeError;
use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Language used when the requested one is missing from the guide
pub const DEFAULT_LANG: &str = "he";

// ============================================================================
// Suites
// ============================================================================

/// Room identifiers known to the guide
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Suite {
    S313,
    S413,
}

impl Suite {
    /// All suites in room-identifier order
    pub const ALL: [Suite; 2] = [Suite::S313, Suite::S413];

    /// Room identifier as it appears in requests and snippet tags
    pub fn id(self) -> &'static str {
        match self {
            Self::S313 => "313",
            Self::S413 => "413",
        }
    }

    /// Interpret an arbitrary JSON value as a suite. Anything other than a
    /// known identifier string yields `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        value.as_str().and_then(|s| s.parse().ok())
    }
}

impl fmt::Display for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Suite {
    type Err = ConciergeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "313" => Ok(Self::S313),
            "413" => Ok(Self::S413),
            other => Err(ConciergeError::ValidationError(format!(
                "Unknown suite: {other}"
            ))),
        }
    }
}

// ============================================================================
// Sections
// ============================================================================

/// A flat section: `{ "content": [..] }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SectionContent {
    #[serde(default, deserialize_with = "lenient_entries")]
    pub content: Vec<String>,
}

/// A section split by room: `{ "suite313": [..], "suite413": [..] }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SuiteContent {
    #[serde(default, deserialize_with = "lenient_entries")]
    pub suite313: Vec<String>,

    #[serde(default, deserialize_with = "lenient_entries")]
    pub suite413: Vec<String>,
}

impl SuiteContent {
    /// Entries for one room
    pub fn for_suite(&self, suite: Suite) -> &[String] {
        match suite {
            Suite::S313 => &self.suite313,
            Suite::S413 => &self.suite413,
        }
    }
}

/// Named sections of a localized guide
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Sections {
    #[serde(default, deserialize_with = "lenient")]
    pub rules: SectionContent,

    #[serde(default, deserialize_with = "lenient")]
    pub info: SectionContent,

    #[serde(default, deserialize_with = "lenient")]
    pub useful: SectionContent,

    #[serde(default, deserialize_with = "lenient")]
    pub arrival: SuiteContent,

    #[serde(default, deserialize_with = "lenient")]
    pub appliances: SuiteContent,
}

/// Guide content for one language
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LocalizedGuide {
    #[serde(default, deserialize_with = "lenient_option")]
    pub sections: Option<Sections>,
}

// ============================================================================
// Guide Document
// ============================================================================

/// Multilingual guide, keyed by language code
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Value")]
pub struct GuideDocument {
    languages: BTreeMap<String, LocalizedGuide>,
}

impl GuideDocument {
    /// Guide for an exact language code
    pub fn localized(&self, lang: &str) -> Option<&LocalizedGuide> {
        self.languages.get(lang)
    }

    /// Sections for `lang`, falling back to `default_lang` when the requested
    /// language is missing or has no `sections` structure.
    pub fn sections_for(&self, lang: &str, default_lang: &str) -> Option<&Sections> {
        self.localized(lang)
            .and_then(|guide| guide.sections.as_ref())
            .or_else(|| {
                self.localized(default_lang)
                    .and_then(|guide| guide.sections.as_ref())
            })
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }
}

impl From<Value> for GuideDocument {
    fn from(value: Value) -> Self {
        let languages = match value {
            Value::Object(map) => map
                .into_iter()
                .map(|(lang, guide)| (lang, serde_json::from_value(guide).unwrap_or_default()))
                .collect(),
            _ => BTreeMap::new(),
        };
        Self { languages }
    }
}

// ============================================================================
// Lenient deserializers
// ============================================================================

fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

fn lenient_option<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn lenient_entries<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let entries = match value {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    };
    Ok(entries)
}

/// Deserialize a `suite` field of any JSON type; unknown values become `None`
pub fn lenient_suite<'de, D>(deserializer: D) -> Result<Option<Suite>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(Suite::from_value(&value))
}

/// Deserialize a `lang` field of any JSON type. Non-string values are kept
/// as their JSON text, so they act as an unknown language; `null` means
/// absent.
pub fn lenient_lang<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let lang = match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    };
    Ok(lang)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_suite_parse() {
        assert_eq!("313".parse::<Suite>().unwrap(), Suite::S313);
        assert_eq!("413".parse::<Suite>().unwrap(), Suite::S413);
        assert!("513".parse::<Suite>().is_err());
        assert!(" 313".parse::<Suite>().is_err());
        assert_eq!(Suite::from_value(&json!(313)), None);
        assert!(Suite::S313 < Suite::S413);
    }

    #[test]
    fn test_entries_are_trimmed_and_filtered() {
        let guide = GuideDocument::from(json!({
            "en": { "sections": { "rules": { "content": [
                "  No smoking.  ", "", "   ", 42, null, { "x": 1 }, "Quiet after 22:00"
            ] } } }
        }));

        let sections = guide.sections_for("en", DEFAULT_LANG).unwrap();
        assert_eq!(
            sections.rules.content,
            vec!["No smoking.".to_string(), "Quiet after 22:00".to_string()]
        );
    }

    #[test]
    fn test_malformed_parts_become_empty() {
        let guide = GuideDocument::from(json!({
            "en": { "sections": {
                "rules": "not an object",
                "info": { "content": "not an array" },
                "arrival": { "suite313": ["Door code 1234"], "suite413": 7 }
            } },
            "fr": "garbage"
        }));

        let sections = guide.sections_for("en", DEFAULT_LANG).unwrap();
        assert!(sections.rules.content.is_empty());
        assert!(sections.info.content.is_empty());
        assert_eq!(sections.arrival.for_suite(Suite::S313), ["Door code 1234"]);
        assert!(sections.arrival.for_suite(Suite::S413).is_empty());
        assert_eq!(guide.localized("fr"), Some(&LocalizedGuide::default()));
    }

    #[test]
    fn test_language_fallback() {
        let guide = GuideDocument::from(json!({
            "he": { "sections": { "info": { "content": ["צ'ק-אין אחרי 15:00"] } } },
            "en": { "title": "no sections here" }
        }));

        // Missing language falls back to the default
        let de = guide.sections_for("de", DEFAULT_LANG).unwrap();
        assert_eq!(de.info.content.len(), 1);

        // Present language without sections falls back too
        let en = guide.sections_for("en", DEFAULT_LANG).unwrap();
        assert_eq!(en.info.content, de.info.content);
    }

    #[test]
    fn test_no_usable_language() {
        let guide = GuideDocument::from(json!({ "en": { "sections": null } }));
        assert!(guide.sections_for("en", DEFAULT_LANG).is_none());

        let guide = GuideDocument::from(json!(["not", "a", "map"]));
        assert!(guide.is_empty());
        assert!(guide.sections_for("he", DEFAULT_LANG).is_none());
    }

    #[test]
    fn test_deserialize_from_json_text() {
        let guide: GuideDocument =
            serde_json::from_str(r#"{"en":{"sections":{"useful":{"content":["Pharmacy on the corner"]}}}}"#)
                .unwrap();
        let en = guide.sections_for("en", DEFAULT_LANG).unwrap();
        assert_eq!(en.useful.content, vec!["Pharmacy on the corner"]);
    }
}

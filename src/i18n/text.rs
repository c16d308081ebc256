//! Multilingual content values and their offline resolution.
//!
//! Content fields coming from the REST backend (plant names, site
//! descriptions, ...) are either a plain string or an object keyed by
//! language code. [`resolve`] picks the best string for a language without
//! any I/O, so it is safe to call on every render.

use crate::i18n::{registry::FALLBACK_CHAIN, Language};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// The same semantic text in one or more languages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MultilingualText {
    /// Legacy single-language field, shown as-is in every language
    Plain(String),

    /// Language code -> text. Codes outside the registry are kept.
    Localized(#[serde(deserialize_with = "skip_null_entries")] BTreeMap<String, String>),
}

/// The backend sends `null` for languages it has no text for.
fn skip_null_entries<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, Option<String>>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|(code, text)| text.map(|text| (code, text)))
        .collect())
}

impl MultilingualText {
    /// Build a full mapping with one entry per supported language.
    pub fn from_parts(ar: impl Into<String>, en: impl Into<String>, bn: impl Into<String>) -> Self {
        [
            (Language::ARABIC, ar.into()),
            (Language::ENGLISH, en.into()),
            (Language::BENGALI, bn.into()),
        ]
        .into_iter()
        .collect()
    }

    /// Text stored for exactly this language, empty strings included.
    ///
    /// A plain value has no per-language entries and always returns `None`.
    pub fn get(&self, language: Language) -> Option<&str> {
        match self {
            MultilingualText::Plain(_) => None,
            MultilingualText::Localized(map) => map.get(language.code()).map(String::as_str),
        }
    }

    /// True when no language carries any non-empty text.
    pub fn is_empty(&self) -> bool {
        match self {
            MultilingualText::Plain(text) => text.is_empty(),
            MultilingualText::Localized(map) => map.values().all(|text| text.is_empty()),
        }
    }

    /// Shorthand for [`resolve`] on a value that is known to be present.
    pub fn resolve(&self, language: Language) -> &str {
        resolve(Some(self), language)
    }
}

impl From<&str> for MultilingualText {
    fn from(text: &str) -> Self {
        MultilingualText::Plain(text.to_string())
    }
}

impl From<String> for MultilingualText {
    fn from(text: String) -> Self {
        MultilingualText::Plain(text)
    }
}

impl FromIterator<(Language, String)> for MultilingualText {
    fn from_iter<I: IntoIterator<Item = (Language, String)>>(iter: I) -> Self {
        MultilingualText::Localized(
            iter.into_iter()
                .map(|(language, text)| (language.code().to_string(), text))
                .collect(),
        )
    }
}

/// Pick the best available string for `language`.
///
/// Order: the requested language, then English, Arabic, Bengali, then the
/// first non-empty entry in code order, then `""`. Empty strings count as
/// missing. A plain value is returned unchanged.
pub fn resolve(value: Option<&MultilingualText>, language: Language) -> &str {
    let map = match value {
        None => return "",
        Some(MultilingualText::Plain(text)) => return text,
        Some(MultilingualText::Localized(map)) => map,
    };

    let non_empty = |code: &str| map.get(code).filter(|text| !text.is_empty());

    std::iter::once(language.code())
        .chain(FALLBACK_CHAIN)
        .find_map(non_empty)
        .or_else(|| map.values().find(|text| !text.is_empty()))
        .map(String::as_str)
        .unwrap_or("")
}

//! Small value types shared by blocks and headers.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A string value tagged with the name of its type.
///
/// Used for primary IDs (`("url", "http://host/rest/M")`), payloads
/// (`("base64", "aGVsbG8=")`) and links.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypedValue {
    #[serde(rename = "type")]
    pub value_type: String,
    pub value: String,
}

impl TypedValue {
    pub fn new(value_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            value_type: value_type.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.value, self.value_type)
    }
}

/// Text keyed by locale tag (`"en"`, `"de_DE"`, ...).
///
/// Iteration order is the sorted locale order, so encoders produce the same
/// bytes for the same content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MultiLangText(BTreeMap<String, String>);

impl MultiLangText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text with a single locale entry.
    pub fn single(locale: impl Into<String>, text: impl Into<String>) -> Self {
        let mut t = Self::new();
        t.insert(locale, text);
        t
    }

    pub fn get(&self, locale: &str) -> Option<&str> {
        self.0.get(locale).map(String::as_str)
    }

    /// Insert or replace the text for a locale, returning the previous text.
    pub fn insert(&mut self, locale: impl Into<String>, text: impl Into<String>) -> Option<String> {
        self.0.insert(locale.into(), text.into())
    }

    pub fn remove(&mut self, locale: &str) -> Option<String> {
        self.0.remove(locale)
    }

    pub fn contains_locale(&self, locale: &str) -> bool {
        self.0.contains_key(locale)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MultiLangText {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

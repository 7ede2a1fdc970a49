use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    hash::BuildHasher,
};

use serde_json::{Map, Value as JsonValue};

/// A raw value fetched from a [`Source`], before coercion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Raw<'a> {
    /// A textual value, as found in form data.
    Text(&'a str),
    /// A decoded JSON value.
    Json(&'a JsonValue),
}

impl Raw<'_> {
    /// Returns `true` if the value counts as absent: empty text or JSON `null`.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Json(JsonValue::Null) => true,
            Self::Json(JsonValue::String(text)) => text.is_empty(),
            Self::Json(_) => false,
        }
    }
}

impl fmt::Display for Raw<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Text(text) => write!(f, "'{text}'"),
            Self::Json(value) => write!(f, "{value}"),
        }
    }
}

/// A read-only key/value mapping that field values are pulled from.
pub trait Source {
    /// Looks up the value stored under `key`.
    fn get(&self, key: &str) -> Option<Raw<'_>>;
}

impl<T: Source + ?Sized> Source for &T {
    fn get(&self, key: &str) -> Option<Raw<'_>> {
        (**self).get(key)
    }
}

impl<S: BuildHasher> Source for HashMap<String, String, S> {
    fn get(&self, key: &str) -> Option<Raw<'_>> {
        Self::get(self, key).map(|value| Raw::Text(value))
    }
}

impl Source for BTreeMap<String, String> {
    fn get(&self, key: &str) -> Option<Raw<'_>> {
        Self::get(self, key).map(|value| Raw::Text(value))
    }
}

impl Source for Map<String, JsonValue> {
    fn get(&self, key: &str) -> Option<Raw<'_>> {
        Self::get(self, key).map(Raw::Json)
    }
}

/// Decoded `application/x-www-form-urlencoded` data.
///
/// When a key is repeated, the first value wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSource {
    pairs: Vec<(String, String)>,
}

impl FormSource {
    /// Decodes a URL-encoded form body.
    ///
    /// ```
    /// use fieldbind::binding::{FormSource, Raw, Source};
    ///
    /// let form = FormSource::parse("name=Ada+Lovelace&year=1815").unwrap();
    /// assert_eq!(form.get("name"), Some(Raw::Text("Ada Lovelace")));
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid URL-encoded data.
    pub fn parse(body: &str) -> Result<Self, SourceError> {
        let pairs = serde_urlencoded::from_str(body)?;
        Ok(Self { pairs })
    }

    /// The number of key/value pairs, including repeated keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns `true` if the form has no pairs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormSource {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl Source for FormSource {
    fn get(&self, key: &str) -> Option<Raw<'_>> {
        self.pairs
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, value)| Raw::Text(value))
    }
}

/// A decoded JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonSource {
    object: Map<String, JsonValue>,
}

impl JsonSource {
    /// Decodes a JSON body, which must be an object.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid JSON or is not an object.
    pub fn parse(body: &[u8]) -> Result<Self, SourceError> {
        let value: JsonValue = serde_json::from_slice(body)?;
        Self::try_from(value)
    }
}

impl TryFrom<JsonValue> for JsonSource {
    type Error = SourceError;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        match value {
            JsonValue::Object(object) => Ok(Self { object }),
            other => Err(SourceError::NotAnObject(json_kind(&other))),
        }
    }
}

impl From<Map<String, JsonValue>> for JsonSource {
    fn from(object: Map<String, JsonValue>) -> Self {
        Self { object }
    }
}

impl Source for JsonSource {
    fn get(&self, key: &str) -> Option<Raw<'_>> {
        self.object.get(key).map(Raw::Json)
    }
}

const fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

/// Errors that can occur while decoding a source body.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The form body is not valid URL-encoded data.
    #[error("malformed form body")]
    Form(#[from] serde_urlencoded::de::Error),

    /// The JSON body could not be decoded.
    #[error("malformed JSON body")]
    Json(#[from] serde_json::Error),

    /// The JSON body decoded to something other than an object.
    #[error("JSON body must be an object, found {0}")]
    NotAnObject(&'static str),
}

use std::fmt;

/// A candidate value presented to validation rules.
///
/// Rules inspect both the kind of the value and its content. Textual
/// candidates are also accepted by the numeric rules when their content
/// parses as the expected number.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Textual input.
    Text(String),
    /// A signed integer.
    Integer(i64),
    /// A double-precision float, including NaN and the infinities.
    Float(f64),
}

impl Value {
    /// Returns the text if this is a textual value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Integer(_) | Self::Float(_) => None,
        }
    }

    /// Returns the value as an integer, parsing textual values.
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            Self::Text(text) => text.parse().ok(),
            Self::Float(_) => None,
        }
    }

    /// Returns the value as a float, parsing textual values.
    ///
    /// `"NaN"`, `"inf"` and `"-inf"` parse successfully.
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            Self::Text(text) => text.parse().ok(),
            Self::Integer(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Text(text) => write!(f, "'{text}'"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Value of a variant attribute.
///
/// Serialized untagged, so JSON `true`, `42`, `9.5` and `"red"` all deserialize.
/// `null` is kept as [`AttributeValue::Null`]; lists and objects are carried
/// through unchanged as [`AttributeValue::Other`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Other(serde_json::Value),
}

impl AttributeValue {
    /// Value equality as the store compares attribute values.
    ///
    /// Numbers compare numerically, so `Integer(40)` equals `Float(40.0)`.
    /// Text never equals a number. `Other` values never match anything.
    pub fn same_value(&self, other: &AttributeValue) -> bool {
        match (self, other) {
            (Self::Integer(i), Self::Float(x)) | (Self::Float(x), Self::Integer(i)) => {
                float_equals_integer(*x, *i)
            }
            (Self::Other(_), _) | (_, Self::Other(_)) => false,
            _ => self == other,
        }
    }
}

fn float_equals_integer(x: f64, i: i64) -> bool {
    // i64::MAX as f64 rounds up to 2^63, which is already out of range.
    x.fract() == 0.0 && x >= i64::MIN as f64 && x < i64::MAX as f64 && x as i64 == i
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl Display for AttributeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
            Self::Other(value) => write!(f, "{value}"),
        }
    }
}

//! Raw scalar values and the entity trait shared by the normalized tables.
//!
//! Source cells arrive as text with a handful of spellings for "no value".
//! [`FieldValue`] keeps that distinction explicit: a cell is either a value
//! or [`FieldValue::Null`], which is never confused with zero or an empty
//! string once parsing is done.

use serde::Serialize;
use std::fmt;

/// Tokens treated as a missing value when parsing source cells.
///
/// Mirrors the NA spellings understood by common dataframe CSV readers, so
/// exports that went through one of them keep their absent values absent.
pub const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// A raw scalar read from the source, before coercion.
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Int(i64),
    Float(f64),
    #[default]
    Null,
}

impl FieldValue {
    /// Build a value from a raw source cell, mapping NA tokens to `Null`.
    pub fn from_raw(raw: &str) -> Self {
        if NA_TOKENS.contains(&raw) {
            FieldValue::Null
        } else {
            FieldValue::Text(raw.to_string())
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Float(fl) => write!(f, "{}", fl),
            FieldValue::Null => write!(f, "null"),
        }
    }
}

/// A record persisted into one of the normalized tables.
///
/// `NAME` is used in progress and skip logging; `TABLE` is the destination
/// table the sink writes to.
pub trait Entity {
    /// The name of this entity type
    const NAME: &'static str;

    /// Destination table
    const TABLE: &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_maps_na_tokens_to_null() {
        for token in ["", "nan", "NaN", "NULL", "N/A", "<NA>"] {
            assert_eq!(FieldValue::from_raw(token), FieldValue::Null, "token {:?}", token);
        }
    }

    #[test]
    fn test_from_raw_keeps_zero_and_whitespace() {
        assert_eq!(FieldValue::from_raw("0"), FieldValue::Text("0".to_string()));
        assert_eq!(FieldValue::from_raw(" "), FieldValue::Text(" ".to_string()));
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(FieldValue::from(None::<i64>), FieldValue::Null);
        assert_eq!(FieldValue::from(Some(3.5)), FieldValue::Float(3.5));
    }

    #[test]
    fn test_display() {
        assert_eq!(FieldValue::Int(7).to_string(), "7");
        assert_eq!(FieldValue::Null.to_string(), "null");
    }
}

//! Message tag segment parsing.
//!
//! A tag segment is the text between the leading `@` and the first space:
//! a `;`-separated list of `key[=value]` pairs. A key with no value, or with
//! an empty value, is a flag.

use std::collections::HashMap;

/// Parsed tag map. Keys are unique; a repeated key keeps its last value.
pub type Tags = HashMap<String, TagValue>;

/// The value of a single message tag.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum TagValue {
    /// Key present without a value.
    Flag(bool),
    /// Key present with a non-empty value.
    Value(String),
}

impl TagValue {
    /// The string value, if the tag carries one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TagValue::Value(value) => Some(value),
            TagValue::Flag(_) => None,
        }
    }

    /// Whether this tag is a bare flag.
    #[must_use]
    pub fn is_flag(&self) -> bool {
        matches!(self, TagValue::Flag(_))
    }
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        TagValue::Value(value.to_owned())
    }
}

/// Parse the body of a tag segment (without the leading `@`).
pub fn parse_tags(segment: &str) -> Tags {
    segment
        .split(';')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) if !value.is_empty() => (key.to_owned(), TagValue::from(value)),
            Some((key, _)) => (key.to_owned(), TagValue::Flag(true)),
            None => (pair.to_owned(), TagValue::Flag(true)),
        })
        .collect()
}

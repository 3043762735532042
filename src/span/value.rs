//! Tag values and the tag set accumulated during span start.

use std::collections::HashMap;

use crate::span::SpanLink;

/// A value that can be attached to a span as a tag.
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    /// A string value.
    String(String),
    /// An integer value.
    Int(i64),
    /// A float value.
    Float(f64),
    /// A list of span links.
    Links(Vec<SpanLink>),
}

impl TagValue {
    /// Returns the value as a string, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TagValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as an integer, if it is one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            TagValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as a float, if it is one.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            TagValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the span links, if this is a link list.
    pub fn as_links(&self) -> Option<&[SpanLink]> {
        match self {
            TagValue::Links(links) => Some(links),
            _ => None,
        }
    }
}

impl std::fmt::Display for TagValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TagValue::String(s) => write!(f, "{}", s),
            TagValue::Int(i) => write!(f, "{}", i),
            TagValue::Float(fl) => write!(f, "{}", fl),
            TagValue::Links(links) => {
                let json = serde_json::to_string(links).map_err(|_| std::fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

impl From<&str> for TagValue {
    fn from(s: &str) -> Self {
        TagValue::String(s.to_string())
    }
}

impl From<String> for TagValue {
    fn from(s: String) -> Self {
        TagValue::String(s)
    }
}

impl From<i64> for TagValue {
    fn from(i: i64) -> Self {
        TagValue::Int(i)
    }
}

impl From<i32> for TagValue {
    fn from(i: i32) -> Self {
        TagValue::Int(i as i64)
    }
}

impl From<u16> for TagValue {
    fn from(i: u16) -> Self {
        TagValue::Int(i as i64)
    }
}

impl From<f64> for TagValue {
    fn from(f: f64) -> Self {
        TagValue::Float(f)
    }
}

impl From<Vec<SpanLink>> for TagValue {
    fn from(links: Vec<SpanLink>) -> Self {
        TagValue::Links(links)
    }
}

/// Tags accumulated for a span before it starts.
///
/// Last write for a key wins, so anything inserted later overrides earlier
/// defaults.
///
/// ```rust
/// use httptrace::span::{SpanTagSet, TagValue};
///
/// let mut tags = SpanTagSet::new();
/// tags.insert("http.method", "GET");
/// tags.insert("http.method", "POST");
/// assert_eq!(tags.get_str("http.method"), Some("POST"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpanTagSet {
    tags: HashMap<String, TagValue>,
}

impl SpanTagSet {
    /// Creates an empty tag set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a tag, replacing any previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<TagValue>) {
        self.tags.insert(key.into(), value.into());
    }

    /// Returns the value for a key.
    pub fn get(&self, key: &str) -> Option<&TagValue> {
        self.tags.get(key)
    }

    /// Returns the value for a key if it is a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(TagValue::as_str)
    }

    /// Returns `true` if the key is set.
    pub fn contains_key(&self, key: &str) -> bool {
        self.tags.contains_key(key)
    }

    /// Number of tags.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Returns `true` if no tags are set.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Iterates over all tags in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TagValue)> {
        self.tags.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<TagValue>> Extend<(K, V)> for SpanTagSet {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K: Into<String>, V: Into<TagValue>> FromIterator<(K, V)> for SpanTagSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tags = Self::new();
        tags.extend(iter);
        tags
    }
}

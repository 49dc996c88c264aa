//! Source attribute records
//!
//! One `AttributeRecord` holds the descriptive fields of a single source
//! feature exactly as the dataset reader produced them.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

/// Raw value of a source attribute
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Text(String),
    Integer(i64),
    Real(f64),
}

impl AttrValue {
    /// Render the value as the text a tag would carry.
    ///
    /// Integers print without a decimal part, reals in their shortest
    /// round-trip form (`1200.0` renders as `1200`).
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            AttrValue::Text(s) => Cow::Borrowed(s.as_str()),
            AttrValue::Integer(i) => Cow::Owned(i.to_string()),
            AttrValue::Real(r) => Cow::Owned(r.to_string()),
        }
    }

    /// Integer conversion used by coded fields.
    ///
    /// Text is trimmed and parsed base-10; finite reals truncate toward zero.
    /// Anything else yields `None`.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            AttrValue::Integer(i) => Some(*i),
            AttrValue::Real(r) if r.is_finite() => Some(r.trunc() as i64),
            AttrValue::Real(_) => None,
            AttrValue::Text(s) => s.trim().parse::<i64>().ok(),
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Text(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Text(s)
    }
}

impl From<i64> for AttrValue {
    fn from(i: i64) -> Self {
        AttrValue::Integer(i)
    }
}

impl From<i32> for AttrValue {
    fn from(i: i32) -> Self {
        AttrValue::Integer(i64::from(i))
    }
}

impl From<f64> for AttrValue {
    fn from(r: f64) -> Self {
        AttrValue::Real(r)
    }
}

/// Attribute name → raw value mapping for one source feature.
///
/// Absent attributes are simply missing from the map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeRecord {
    fields: BTreeMap<String, AttrValue>,
}

impl AttributeRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, used by readers and tests
    pub fn with(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.fields.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Rendered value of `key`, or `None` when absent or empty
    pub fn text(&self, key: &str) -> Option<Cow<'_, str>> {
        self.get(key).map(AttrValue::as_text).filter(|s| !s.is_empty())
    }

    /// Integer value of `key`; unparseable values count as absent
    pub fn integer(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(AttrValue::as_integer)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K, V> FromIterator<(K, V)> for AttributeRecord
where
    K: Into<String>,
    V: Into<AttrValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

//! The tagged value tree shared by the encoder and the decoder.

use crate::{TEXT_KEY, TYPE_KEY};

/// A node of a SOAP payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlValue {
    /// An element marked `xsi:nil="true"`.
    Null,
    /// An element holding only character data.
    Scalar(String),
    /// An element with child elements.
    Complex(XmlMap),
}

impl XmlValue {
    /// Returns true for [`XmlValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, XmlValue::Null)
    }

    /// Get the text of a scalar node.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            XmlValue::Scalar(text) => Some(text),
            _ => None,
        }
    }

    /// Get the map of a complex node.
    pub fn as_map(&self) -> Option<&XmlMap> {
        match self {
            XmlValue::Complex(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a child field of a complex node.
    pub fn get(&self, key: &str) -> Option<&XmlField> {
        self.as_map()?.get(key)
    }

    /// The `xsi:type` discriminator of a complex node, if any.
    pub fn type_tag(&self) -> Option<&str> {
        self.as_map()?.get(TYPE_KEY)?.as_value()?.as_str()
    }
}

impl From<&str> for XmlValue {
    fn from(text: &str) -> Self {
        XmlValue::Scalar(text.to_string())
    }
}

impl From<String> for XmlValue {
    fn from(text: String) -> Self {
        XmlValue::Scalar(text)
    }
}

impl From<XmlMap> for XmlValue {
    fn from(map: XmlMap) -> Self {
        XmlValue::Complex(map)
    }
}

impl<T: Into<XmlValue>> From<Option<T>> for XmlValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(XmlValue::Null)
    }
}

/// The value stored under one key of an [`XmlMap`]: a single child or a run
/// of same-named siblings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlField {
    One(XmlValue),
    Many(Vec<XmlValue>),
}

impl XmlField {
    /// The single value, or `None` for a repeated field.
    pub fn as_value(&self) -> Option<&XmlValue> {
        match self {
            XmlField::One(value) => Some(value),
            XmlField::Many(_) => None,
        }
    }

    /// All values as a slice, regardless of cardinality.
    pub fn values(&self) -> &[XmlValue] {
        match self {
            XmlField::One(value) => std::slice::from_ref(value),
            XmlField::Many(values) => values,
        }
    }

    /// Consume the field into its values.
    pub fn into_values(self) -> Vec<XmlValue> {
        match self {
            XmlField::One(value) => vec![value],
            XmlField::Many(values) => values,
        }
    }

    /// Number of sibling elements this field encodes to.
    pub fn len(&self) -> usize {
        self.values().len()
    }

    /// Returns true for an empty repeated field (encodes to nothing).
    pub fn is_empty(&self) -> bool {
        self.values().is_empty()
    }

    /// Add a same-named sibling, coalescing `One` into `Many` on the second
    /// occurrence.
    pub(crate) fn push(&mut self, value: XmlValue) {
        match self {
            XmlField::Many(values) => values.push(value),
            XmlField::One(first) => {
                let first = std::mem::replace(first, XmlValue::Null);
                *self = XmlField::Many(vec![first, value]);
            }
        }
    }
}

impl From<XmlValue> for XmlField {
    fn from(value: XmlValue) -> Self {
        XmlField::One(value)
    }
}

impl From<&str> for XmlField {
    fn from(text: &str) -> Self {
        XmlField::One(text.into())
    }
}

impl From<String> for XmlField {
    fn from(text: String) -> Self {
        XmlField::One(text.into())
    }
}

impl From<XmlMap> for XmlField {
    fn from(map: XmlMap) -> Self {
        XmlField::One(map.into())
    }
}

impl From<Vec<XmlValue>> for XmlField {
    fn from(values: Vec<XmlValue>) -> Self {
        XmlField::Many(values)
    }
}

/// Insertion-ordered map of child fields.
///
/// Serialization follows insertion order (SOAP sequences are ordered), while
/// equality ignores it.
#[derive(Debug, Clone, Default)]
pub struct XmlMap {
    entries: Vec<(String, XmlField)>,
}

impl XmlMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`XmlMap::insert`].
    pub fn with(mut self, key: impl Into<String>, field: impl Into<XmlField>) -> Self {
        self.insert(key, field);
        self
    }

    /// Builder that skips the entry entirely when `field` is `None`.
    ///
    /// This is the "absent" counterpart of an explicit [`XmlValue::Null`]:
    /// an absent entry produces no element at all.
    pub fn with_opt<F: Into<XmlField>>(self, key: impl Into<String>, field: Option<F>) -> Self {
        match field {
            Some(field) => self.with(key, field),
            None => self,
        }
    }

    /// Tag the map with an `xsi:type` discriminator.
    pub fn with_type(self, type_name: impl Into<String>) -> Self {
        self.with(TYPE_KEY, XmlValue::Scalar(type_name.into()))
    }

    /// Set the inline text of the owning element.
    pub fn with_text(self, text: impl Into<XmlValue>) -> Self {
        self.with(TEXT_KEY, text.into())
    }

    /// Insert or replace a field, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, field: impl Into<XmlField>) -> Option<XmlField> {
        let key = key.into();
        let field = field.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, field)),
            None => {
                self.entries.push((key, field));
                None
            }
        }
    }

    /// Append a value under `key` using the repeated-tag rule: first
    /// occurrence stored bare, second turns it into `[first, second]`,
    /// later ones are appended.
    pub fn push(&mut self, key: impl Into<String>, value: XmlValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, field)) => field.push(value),
            None => self.entries.push((key, XmlField::One(value))),
        }
    }

    /// Look up a field.
    pub fn get(&self, key: &str) -> Option<&XmlField> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, field)| field)
    }

    /// Look up a single-valued field.
    pub fn value(&self, key: &str) -> Option<&XmlValue> {
        self.get(key)?.as_value()
    }

    /// Remove a field.
    pub fn remove(&mut self, key: &str) -> Option<XmlField> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Returns true if the map holds `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterate fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &XmlField)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the map has no fields.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merge `other` into this map, later keys replacing earlier ones.
    pub fn extend(&mut self, other: XmlMap) {
        for (key, field) in other.entries {
            self.insert(key, field);
        }
    }
}

impl PartialEq for XmlMap {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, field)| other.get(key) == Some(field))
    }
}

impl Eq for XmlMap {}

impl<K: Into<String>, F: Into<XmlField>> FromIterator<(K, F)> for XmlMap {
    fn from_iter<I: IntoIterator<Item = (K, F)>>(iter: I) -> Self {
        let mut map = XmlMap::new();
        for (key, field) in iter {
            map.insert(key, field);
        }
        map
    }
}

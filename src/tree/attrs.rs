//! Attribute storage.
//!
//! [`Attributes`] is an insertion-ordered map from attribute key to
//! [`AttrValue`]. Keys are kept verbatim, so a namespaced attribute is stored
//! under its full `prefix:local` key and an `xmlns:prefix` declaration is just
//! another attribute.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Number;

use super::node::{number_from_f64, Text};

/// An attribute value.
///
/// `Null` and `Undefined` are both accepted and stored, and both are left
/// out of serialized markup. They differ from a missing key: a lookup for a
/// key stored as `Null` finds `Null`, a lookup for a missing key finds nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    /// A string value.
    Str(String),
    /// A numeric value, rendered in decimal form.
    Number(Number),
    /// An explicit null.
    Null,
    /// A key that is present but has no value.
    Undefined,
}

impl AttrValue {
    /// Returns the string value, or `None` for non-string values.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns `true` for `Null` and `Undefined`.
    #[must_use]
    pub fn is_nullish(&self) -> bool {
        matches!(self, Self::Null | Self::Undefined)
    }

    /// Returns the text that goes between the quotes in markup, or `None`
    /// when the attribute is omitted from output.
    #[must_use]
    pub fn to_markup_text(&self) -> Option<String> {
        match self {
            Self::Str(s) => Some(s.clone()),
            Self::Number(n) => Some(n.to_string()),
            Self::Null | Self::Undefined => None,
        }
    }
}

impl PartialEq<str> for AttrValue {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Some(other)
    }
}

impl PartialEq<&str> for AttrValue {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Number> for AttrValue {
    fn from(value: Number) -> Self {
        Self::Number(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        number_from_f64(value).map_or_else(|| Self::Str(value.to_string()), Self::Number)
    }
}

impl From<Text> for AttrValue {
    fn from(text: Text) -> Self {
        match text {
            Text::Str(s) => Self::Str(s),
            Text::Number(n) => Self::Number(n),
        }
    }
}

impl<T: Into<AttrValue>> From<Option<T>> for AttrValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

macro_rules! attr_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for AttrValue {
                fn from(value: $ty) -> Self {
                    Self::Number(Number::from(value))
                }
            }
        )*
    };
}

attr_from_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Serialize for AttrValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Str(s) => serializer.serialize_str(s),
            Self::Number(n) => n.serialize(serializer),
            Self::Null | Self::Undefined => serializer.serialize_unit(),
        }
    }
}

impl<'de> Deserialize<'de> for AttrValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Option::<Text>::deserialize(deserializer)?.map_or(Self::Null, Self::from))
    }
}

/// An insertion-ordered attribute map.
///
/// Converting a string into `Attributes` yields a single `xmlns` attribute,
/// so `tree.element_with("e", "urn:x")` declares the default namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(IndexMap<String, AttrValue>);

impl Attributes {
    /// Creates an empty attribute map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored keys, including null-valued ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no keys are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the value stored under exactly `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.0.get(key)
    }

    /// Returns a mutable reference to the value stored under `key`.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut AttrValue> {
        self.0.get_mut(key)
    }

    /// Returns `true` if `key` is stored, whatever its value.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Sets `key` to `value`, returning the previous value.
    ///
    /// Replacing an existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Option<AttrValue> {
        self.0.insert(key.into(), value.into())
    }

    /// Removes `key`, preserving the order of the remaining keys.
    pub fn remove(&mut self, key: &str) -> Option<AttrValue> {
        self.0.shift_remove(key)
    }

    /// Iterates over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Iterates over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl From<&str> for Attributes {
    fn from(xmlns: &str) -> Self {
        Self::from([("xmlns", xmlns)])
    }
}

impl From<String> for Attributes {
    fn from(xmlns: String) -> Self {
        Self::from([("xmlns", xmlns)])
    }
}

impl From<&Attributes> for Attributes {
    fn from(attrs: &Attributes) -> Self {
        attrs.clone()
    }
}

impl From<IndexMap<String, AttrValue>> for Attributes {
    fn from(map: IndexMap<String, AttrValue>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<AttrValue>, const N: usize> From<[(K, V); N]> for Attributes {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<AttrValue>> From<Vec<(K, V)>> for Attributes {
    fn from(pairs: Vec<(K, V)>) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<AttrValue>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<AttrValue>> Extend<(K, V)> for Attributes {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.0.extend(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into())),
        );
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = (&'a String, &'a AttrValue);
    type IntoIter = indexmap::map::Iter<'a, String, AttrValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

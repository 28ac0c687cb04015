//! Node payload types.
//!
//! A [`Child`] is one entry of an element's ordered children list. Text runs
//! are plain values, not arena nodes: there is nothing to navigate to from a
//! text run, so only elements get an [`ElementId`].

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Number;

use super::attrs::Attributes;
use super::ElementId;

/// A text run: either a string or a number.
///
/// Numbers keep their numeric type through serialization and the structural
/// form, so `t(1000)` renders as `1000` and converts back to the JSON number
/// `1000`, not the string `"1000"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Text {
    /// A string run.
    Str(String),
    /// A numeric run.
    Number(Number),
}

impl Text {
    /// Returns the string run, or `None` for numeric runs.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            Self::Number(_) => None,
        }
    }

    /// Returns the numeric run, or `None` for string runs.
    #[must_use]
    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Self::Str(_) => None,
            Self::Number(n) => Some(n),
        }
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for Text {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Text {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Number> for Text {
    fn from(value: Number) -> Self {
        Self::Number(value)
    }
}

impl From<f64> for Text {
    fn from(value: f64) -> Self {
        number_from_f64(value).map_or_else(|| Self::Str(value.to_string()), Self::Number)
    }
}

macro_rules! text_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Text {
                fn from(value: $ty) -> Self {
                    Self::Number(Number::from(value))
                }
            }
        )*
    };
}

text_from_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

/// Converts a float to a JSON number, storing integral values as integers so
/// that `23.0` renders as `23`.
///
/// Returns `None` for NaN and infinities.
#[must_use]
#[allow(clippy::float_cmp, clippy::cast_possible_truncation)]
pub(crate) fn number_from_f64(value: f64) -> Option<Number> {
    // Integers up to 2^53 survive the round trip through f64 exactly.
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
    if value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER {
        return Some(Number::from(value as i64));
    }
    Number::from_f64(value)
}

/// One entry of an element's children list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Child {
    /// A nested element.
    Element(ElementId),
    /// A text run.
    Text(Text),
    /// An empty entry. Skipped when serializing, but it still counts as
    /// content: `<e></e>` rather than `<e/>`.
    Null,
}

impl Child {
    /// Returns the element id if this entry is an element.
    #[must_use]
    pub fn as_element(&self) -> Option<ElementId> {
        match self {
            Self::Element(id) => Some(*id),
            _ => None,
        }
    }

    /// Returns the text run if this entry is text.
    #[must_use]
    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<ElementId> for Child {
    fn from(id: ElementId) -> Self {
        Self::Element(id)
    }
}

impl From<Text> for Child {
    fn from(text: Text) -> Self {
        Self::Text(text)
    }
}

macro_rules! child_from_text {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Child {
                fn from(value: $ty) -> Self {
                    Self::Text(Text::from(value))
                }
            }
        )*
    };
}

child_from_text!(&str, String, Number, f64, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

/// Storage for a single element in the tree arena.
#[derive(Debug, Clone)]
pub struct ElementData {
    /// The element name, possibly prefixed (`"x:foo"`).
    pub(crate) name: String,
    /// Attributes in insertion order.
    pub(crate) attrs: Attributes,
    /// Ordered, mixed children.
    pub(crate) children: Vec<Child>,
    /// Enclosing element. Navigation only; never owns.
    pub(crate) parent: Option<ElementId>,
}

impl ElementData {
    pub(crate) fn new(name: String, attrs: Attributes) -> Self {
        Self {
            name,
            attrs,
            children: Vec::new(),
            parent: None,
        }
    }

    /// Returns the element name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the attributes.
    #[must_use]
    pub fn attrs(&self) -> &Attributes {
        &self.attrs
    }

    /// Returns the children list.
    #[must_use]
    pub fn children(&self) -> &[Child] {
        &self.children
    }

    /// Returns the parent, if this element was attached through the tree API.
    #[must_use]
    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }
}

//! Structural interchange form.
//!
//! An element converts to the plain nested shape `{name, attrs, children}`,
//! where each child is either another such object, a string, a number, or
//! `null`. This is the form used to move trees through JSON or any other
//! `serde` format, and it converts back into a tree.
//!
//! ```
//! use elemtree::Tree;
//! use serde_json::json;
//!
//! let mut tree = Tree::new();
//! let e = tree.element_with("e", [("foo", 23)]);
//! tree.build(e).c("f").t(1000);
//!
//! let value = tree.to_json(e);
//! assert_eq!(
//!     value,
//!     json!({"name": "e", "attrs": {"foo": 23}, "children": [
//!         {"name": "f", "attrs": {}, "children": [1000]}
//!     ]})
//! );
//!
//! let copy = tree.from_json(&value).unwrap();
//! assert_eq!(tree.to_xml(copy), tree.to_xml(e));
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::StructuralError;
use crate::tree::{AttrValue, Attributes, Child, ElementId, Text, Tree};

/// An element in structural form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralElement {
    /// The element name, prefix included.
    pub name: String,
    /// Attributes in insertion order. `Undefined` values are never present.
    #[serde(default)]
    pub attrs: Attributes,
    /// Ordered children.
    #[serde(default)]
    pub children: Vec<StructuralChild>,
}

/// A child entry in structural form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StructuralChild {
    /// A nested element.
    Element(StructuralElement),
    /// A text run; numbers stay numbers.
    Text(Text),
    /// An empty entry.
    Null,
}

/// Converts an element and its subtree to structural form.
#[must_use]
pub fn to_structural(tree: &Tree, id: ElementId) -> StructuralElement {
    let node = tree.node(id);
    StructuralElement {
        name: node.name().to_string(),
        attrs: node
            .attrs()
            .iter()
            .filter(|(_, value)| **value != AttrValue::Undefined)
            .map(|(key, value)| (key, value.clone()))
            .collect(),
        children: node
            .children()
            .iter()
            .map(|child| match child {
                Child::Element(child_id) => {
                    StructuralChild::Element(to_structural(tree, *child_id))
                }
                Child::Text(text) => StructuralChild::Text(text.clone()),
                Child::Null => StructuralChild::Null,
            })
            .collect(),
    }
}

/// Converts an element and its subtree to a JSON value.
///
/// Attribute and child order are preserved. `Undefined` attributes are
/// dropped; `null` attributes and children are kept as JSON `null`.
#[must_use]
pub fn to_json(tree: &Tree, id: ElementId) -> Value {
    let node = tree.node(id);
    let mut attrs = Map::new();
    for (key, value) in node.attrs().iter() {
        let value = match value {
            AttrValue::Str(s) => Value::String(s.clone()),
            AttrValue::Number(n) => Value::Number(n.clone()),
            AttrValue::Null => Value::Null,
            AttrValue::Undefined => continue,
        };
        attrs.insert(key.to_string(), value);
    }
    let children: Vec<Value> = node
        .children()
        .iter()
        .map(|child| match child {
            Child::Element(child_id) => to_json(tree, *child_id),
            Child::Text(Text::Str(s)) => Value::String(s.clone()),
            Child::Text(Text::Number(n)) => Value::Number(n.clone()),
            Child::Null => Value::Null,
        })
        .collect();
    json!({
        "name": node.name(),
        "attrs": attrs,
        "children": children,
    })
}

/// Rebuilds a structural element as a new root in `tree`.
///
/// Nested elements are attached with parent links, so the result navigates
/// like a tree built with [`Tree::c`].
///
/// # Errors
///
/// Returns [`StructuralError::EmptyName`] if any element has an empty name.
/// Nothing is added to `tree` in that case.
pub fn from_structural(
    tree: &mut Tree,
    element: &StructuralElement,
) -> Result<ElementId, StructuralError> {
    check_names(element)?;
    Ok(build(tree, element, None))
}

/// Rebuilds a JSON value of the `{name, attrs, children}` shape as a new
/// root in `tree`.
///
/// Missing `attrs` and `children` fields are treated as empty.
///
/// # Errors
///
/// Returns [`StructuralError::Json`] if the value does not have the expected
/// shape, or [`StructuralError::EmptyName`] for an empty element name.
pub fn from_json(tree: &mut Tree, value: &Value) -> Result<ElementId, StructuralError> {
    let element = StructuralElement::deserialize(value)?;
    from_structural(tree, &element)
}

fn check_names(element: &StructuralElement) -> Result<(), StructuralError> {
    if element.name.is_empty() {
        return Err(StructuralError::EmptyName);
    }
    element.children.iter().try_for_each(|child| match child {
        StructuralChild::Element(child) => check_names(child),
        StructuralChild::Text(_) | StructuralChild::Null => Ok(()),
    })
}

fn build(tree: &mut Tree, element: &StructuralElement, parent: Option<ElementId>) -> ElementId {
    let id = match parent {
        Some(parent) => tree.c_with(parent, element.name.as_str(), &element.attrs),
        None => tree.element_with(element.name.as_str(), &element.attrs),
    };
    for child in &element.children {
        match child {
            StructuralChild::Element(child) => {
                build(tree, child, Some(id));
            }
            StructuralChild::Text(text) => {
                tree.t(id, text.clone());
            }
            StructuralChild::Null => tree.children_mut(id).push(Child::Null),
        }
    }
    id
}

impl Tree {
    /// Converts an element to its JSON structural form. See [`to_json`].
    #[must_use]
    pub fn to_json(&self, id: ElementId) -> Value {
        to_json(self, id)
    }

    /// Rebuilds an element from its JSON structural form. See [`from_json`].
    ///
    /// # Errors
    ///
    /// Fails when `value` does not describe an element.
    pub fn from_json(&mut self, value: &Value) -> Result<ElementId, StructuralError> {
        from_json(self, value)
    }
}

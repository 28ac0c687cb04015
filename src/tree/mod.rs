//! Arena-based element tree.
//!
//! All elements live in a contiguous `Vec<ElementData>` owned by a [`Tree`]
//! and are referenced by [`ElementId`], a newtype over `NonZeroU32`. A tree
//! may hold any number of roots: every freshly constructed element is a root
//! until it is attached somewhere.
//!
//! # Ownership
//!
//! Each element owns its children list top-down. The parent link is a plain
//! `Option<ElementId>` used for navigation (`up`, `root`, namespace lookup)
//! and never for ownership, so there are no reference cycles and nothing to
//! tear down: dropping the `Tree` frees everything. Detached elements stay in
//! the arena but are unreachable from their former parent.
//!
//! The raw children list ([`Tree::children_mut`]) can be edited freely.
//! Entries pushed that way do not get a parent link; use [`Tree::c`] or
//! [`Tree::append`] when `up` navigation matters. [`Tree::append`] refuses to
//! move an element into its own subtree; inserting an ancestor through the
//! raw list creates a cycle that recursive operations will not terminate on.
//!
//! # Arena growth
//!
//! Nothing is reclaimed before the `Tree` is dropped: removed elements,
//! clones, structural imports and parses all allocate new slots. A
//! long-lived tree that handles a stream of stanzas only grows. Parse each
//! stanza into a fresh `Tree`, or [`Tree::extract`] the part worth keeping
//! and drop the rest.

mod attrs;
mod builder;
mod node;
mod query;

pub use attrs::{AttrValue, Attributes};
pub use builder::Builder;
pub use node::{Child, ElementData, Text};

use std::num::NonZeroU32;

/// A typed index into a [`Tree`]'s element arena.
///
/// Ids are only meaningful for the tree that issued them. `Option<ElementId>`
/// has the same size as `ElementId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ElementId(NonZeroU32);

impl ElementId {
    /// # Panics
    ///
    /// Panics if the arena outgrows `u32`.
    #[allow(clippy::expect_used)]
    fn from_index(index: usize) -> Self {
        u32::try_from(index + 1)
            .ok()
            .and_then(NonZeroU32::new)
            .map(Self)
            .expect("element arena exceeds u32::MAX entries")
    }

    fn as_index(self) -> usize {
        self.0.get() as usize - 1
    }
}

/// An arena of elements.
///
/// # Examples
///
/// ```
/// use elemtree::Tree;
///
/// let mut tree = Tree::new();
/// let msg = tree.element_with("message", [("type", "chat")]);
/// tree.build(msg).c("body").t("hello");
/// assert_eq!(tree.to_xml(msg), r#"<message type="chat"><body>hello</body></message>"#);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Tree {
    nodes: Vec<ElementData>,
}

impl Tree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty tree with room for `capacity` elements.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    /// Creates a root element with no attributes.
    ///
    /// Names are not validated; they are expected to be non-empty.
    pub fn element(&mut self, name: impl Into<String>) -> ElementId {
        self.element_with(name, Attributes::new())
    }

    /// Creates a root element.
    ///
    /// `attrs` is copied into storage owned by the element. A string argument
    /// declares the default namespace:
    ///
    /// ```
    /// use elemtree::Tree;
    ///
    /// let mut tree = Tree::new();
    /// let e = tree.element_with("e", "urn:x");
    /// assert_eq!(tree.get_attr(e, "xmlns", None).and_then(|v| v.as_str()), Some("urn:x"));
    /// ```
    pub fn element_with(&mut self, name: impl Into<String>, attrs: impl Into<Attributes>) -> ElementId {
        self.alloc(ElementData::new(name.into(), attrs.into()))
    }

    fn alloc(&mut self, data: ElementData) -> ElementId {
        let id = ElementId::from_index(self.nodes.len());
        self.nodes.push(data);
        id
    }

    /// Returns the total number of elements allocated, detached ones included.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.nodes.len()
    }

    /// Drops every element allocated at or after index `len`.
    ///
    /// Only valid when no element below `len` refers to one above it.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.nodes.truncate(len);
    }

    /// Returns the stored data for an element.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this tree.
    #[must_use]
    pub fn node(&self, id: ElementId) -> &ElementData {
        &self.nodes[id.as_index()]
    }

    pub(crate) fn node_mut(&mut self, id: ElementId) -> &mut ElementData {
        &mut self.nodes[id.as_index()]
    }

    /// Returns the element name, prefix included.
    #[must_use]
    pub fn name(&self, id: ElementId) -> &str {
        &self.node(id).name
    }

    /// Renames an element.
    pub fn set_name(&mut self, id: ElementId, name: impl Into<String>) {
        self.node_mut(id).name = name.into();
    }

    /// Returns the attributes of an element.
    #[must_use]
    pub fn attrs(&self, id: ElementId) -> &Attributes {
        &self.node(id).attrs
    }

    /// Returns the attributes of an element for in-place editing.
    pub fn attrs_mut(&mut self, id: ElementId) -> &mut Attributes {
        &mut self.node_mut(id).attrs
    }

    /// Sets an attribute, returning the previous value.
    pub fn set_attr(
        &mut self,
        id: ElementId,
        key: impl Into<String>,
        value: impl Into<AttrValue>,
    ) -> Option<AttrValue> {
        self.attrs_mut(id).insert(key, value)
    }

    /// Deletes an attribute, returning its value.
    pub fn remove_attr(&mut self, id: ElementId, key: &str) -> Option<AttrValue> {
        self.attrs_mut(id).remove(key)
    }

    /// Returns the children list.
    #[must_use]
    pub fn children(&self, id: ElementId) -> &[Child] {
        &self.node(id).children
    }

    /// Returns the raw children list.
    ///
    /// Elements pushed here get no parent link.
    pub fn children_mut(&mut self, id: ElementId) -> &mut Vec<Child> {
        &mut self.node_mut(id).children
    }

    // --- Navigation ---

    /// Returns the enclosing element, or `None` for a root.
    #[must_use]
    pub fn up(&self, id: ElementId) -> Option<ElementId> {
        self.node(id).parent
    }

    /// Returns the outermost ancestor, or `id` itself for a root.
    #[must_use]
    pub fn root(&self, id: ElementId) -> ElementId {
        self.ancestors(id).last().unwrap_or(id)
    }

    /// Returns an iterator over an element and its ancestors.
    pub fn ancestors(&self, id: ElementId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: Some(id),
        }
    }

    /// Returns an iterator over the elements below `id`, in document order.
    pub fn descendants(&self, id: ElementId) -> Descendants<'_> {
        let mut stack = Vec::new();
        push_element_children(self, id, &mut stack);
        Descendants { tree: self, stack }
    }

    // --- Mutation ---

    /// Appends an element to the end of `parent`'s children and links it.
    ///
    /// If `child` already has a parent it is detached from it first. Does
    /// nothing when `child` is `parent` or one of its ancestors.
    pub fn append(&mut self, parent: ElementId, child: ElementId) {
        if self.ancestors(parent).any(|a| a == child) {
            log::trace!("append: {child:?} is {parent:?} or one of its ancestors");
            return;
        }
        self.detach(child);
        self.node_mut(parent).children.push(Child::Element(child));
        self.node_mut(child).parent = Some(parent);
    }

    /// Detaches an element from its parent, leaving it as a root.
    ///
    /// Does nothing for an element without a parent link.
    pub fn detach(&mut self, id: ElementId) {
        if let Some(parent) = self.node(id).parent {
            self.remove(parent, id);
        }
    }

    // --- Cloning ---

    /// Deep-copies an element into a new root in this tree.
    ///
    /// The copy has its own attribute storage and recursively copied
    /// children, whose parent links point into the copy.
    pub fn clone_element(&mut self, id: ElementId) -> ElementId {
        self.clone_subtree(id, None)
    }

    fn clone_subtree(&mut self, id: ElementId, parent: Option<ElementId>) -> ElementId {
        let source = self.node(id);
        let children = source.children.clone();
        let mut data = ElementData::new(source.name.clone(), source.attrs.clone());
        data.parent = parent;
        data.children.reserve(children.len());
        let copy = self.alloc(data);
        for child in children {
            let child = match child {
                Child::Element(child_id) => Child::Element(self.clone_subtree(child_id, Some(copy))),
                other => other,
            };
            self.node_mut(copy).children.push(child);
        }
        copy
    }

    /// Deep-copies an element into `dest`, returning the new root there.
    pub fn copy_into(&self, id: ElementId, dest: &mut Self) -> ElementId {
        copy_across(self, id, dest, None)
    }

    /// Deep-copies an element into a fresh tree holding only that subtree.
    ///
    /// Useful for handing an element to another owner or thread.
    #[must_use]
    pub fn extract(&self, id: ElementId) -> (Self, ElementId) {
        let mut dest = Self::new();
        let root = self.copy_into(id, &mut dest);
        (dest, root)
    }
}

fn copy_across(src: &Tree, id: ElementId, dest: &mut Tree, parent: Option<ElementId>) -> ElementId {
    let source = src.node(id);
    let mut data = ElementData::new(source.name.clone(), source.attrs.clone());
    data.parent = parent;
    let copy = dest.alloc(data);
    for child in &source.children {
        let child = match child {
            Child::Element(child_id) => Child::Element(copy_across(src, *child_id, dest, Some(copy))),
            other => other.clone(),
        };
        dest.node_mut(copy).children.push(child);
    }
    copy
}

fn push_element_children(tree: &Tree, id: ElementId, stack: &mut Vec<ElementId>) {
    stack.extend(tree.children(id).iter().rev().filter_map(Child::as_element));
}

// --- Iterators ---

/// Iterator over an element and its ancestors.
pub struct Ancestors<'a> {
    tree: &'a Tree,
    next: Option<ElementId>,
}

impl Iterator for Ancestors<'_> {
    type Item = ElementId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.tree.node(current).parent;
        Some(current)
    }
}

/// Pre-order iterator over the elements below a starting element.
pub struct Descendants<'a> {
    tree: &'a Tree,
    stack: Vec<ElementId>,
}

impl Iterator for Descendants<'_> {
    type Item = ElementId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        push_element_children(self.tree, current, &mut self.stack);
        Some(current)
    }
}

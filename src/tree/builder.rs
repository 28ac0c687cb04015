//! Construction and chained building.
//!
//! The tree-level primitives ([`Tree::c`], [`Tree::t`], [`Tree::up`],
//! [`Tree::root`]) are what a markup parser drives. [`Builder`] wraps the
//! same primitives in a by-value chain, where each call hands back the
//! position to continue from:
//!
//! ```
//! use elemtree::Tree;
//!
//! let mut tree = Tree::new();
//! let iq = tree.element_with("iq", [("type", "get")]);
//! tree.build(iq)
//!     .c_with("query", "jabber:iq:roster")
//!     .c("item").t("alice").up()
//!     .c("item").t("bob");
//!
//! assert_eq!(
//!     tree.to_xml(iq),
//!     r#"<iq type="get"><query xmlns="jabber:iq:roster"><item>alice</item><item>bob</item></query></iq>"#
//! );
//! ```

use super::{AttrValue, Attributes, Child, ElementId, Text, Tree};

impl Tree {
    /// Creates an element with `attrs` and the given children.
    ///
    /// Text children are appended as text runs; element children are
    /// attached with a parent link (and detached from any previous parent).
    /// An element holds one place in the tree, so passing the same id twice
    /// leaves a single entry at the later position.
    pub fn create_element<I>(
        &mut self,
        name: impl Into<String>,
        attrs: impl Into<Attributes>,
        children: I,
    ) -> ElementId
    where
        I: IntoIterator,
        I::Item: Into<Child>,
    {
        let id = self.element_with(name, attrs);
        for child in children {
            match child.into() {
                Child::Element(child) => self.append(id, child),
                other => self.node_mut(id).children.push(other),
            }
        }
        id
    }

    /// Creates a child element without attributes and returns the child.
    pub fn c(&mut self, parent: ElementId, name: impl Into<String>) -> ElementId {
        self.c_with(parent, name, Attributes::new())
    }

    /// Creates a child element and returns the child, not `parent`.
    pub fn c_with(
        &mut self,
        parent: ElementId,
        name: impl Into<String>,
        attrs: impl Into<Attributes>,
    ) -> ElementId {
        let child = self.element_with(name, attrs);
        self.append(parent, child);
        child
    }

    /// Appends a text run and returns `id` unchanged.
    pub fn t(&mut self, id: ElementId, text: impl Into<Text>) -> ElementId {
        self.node_mut(id).children.push(Child::Text(text.into()));
        id
    }

    /// Replaces all children with a single text run.
    ///
    /// Element children lose their parent link.
    pub fn set_text(&mut self, id: ElementId, text: impl Into<Text>) -> ElementId {
        let old = std::mem::take(&mut self.node_mut(id).children);
        for child in old.iter().filter_map(Child::as_element) {
            if self.node(child).parent == Some(id) {
                self.node_mut(child).parent = None;
            }
        }
        self.t(id, text)
    }

    /// Starts a builder chain at `id`.
    pub fn build(&mut self, id: ElementId) -> Builder<'_> {
        Builder { tree: self, current: id }
    }
}

/// A chained builder positioned at one element of a [`Tree`].
///
/// `c` descends into the new child, `t` stays, `up` ascends one level and
/// `root` ascends to the top. Unlike [`Tree::up`], [`Builder::up`] on a root
/// stays on the root so the chain can continue; use [`Builder::parent`] to
/// observe the missing parent.
#[derive(Debug)]
pub struct Builder<'t> {
    tree: &'t mut Tree,
    current: ElementId,
}

#[allow(clippy::return_self_not_must_use)]
impl Builder<'_> {
    /// Creates a child without attributes and moves to it.
    pub fn c(self, name: impl Into<String>) -> Self {
        self.c_with(name, Attributes::new())
    }

    /// Creates a child and moves to it.
    pub fn c_with(self, name: impl Into<String>, attrs: impl Into<Attributes>) -> Self {
        let child = self.tree.c_with(self.current, name, attrs);
        Self {
            tree: self.tree,
            current: child,
        }
    }

    /// Appends a text run to the current element.
    pub fn t(self, text: impl Into<Text>) -> Self {
        self.tree.t(self.current, text);
        self
    }

    /// Sets an attribute on the current element.
    pub fn attr(self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.tree.set_attr(self.current, key, value);
        self
    }

    /// Moves to the parent, staying put on a root.
    pub fn up(self) -> Self {
        match self.tree.up(self.current) {
            Some(parent) => Self {
                tree: self.tree,
                current: parent,
            },
            None => {
                log::trace!("builder up() at a root; staying on {:?}", self.current);
                self
            }
        }
    }

    /// Moves to the parent, or returns `None` at a root.
    #[must_use]
    pub fn parent(self) -> Option<Self> {
        let parent = self.tree.up(self.current)?;
        Some(Self {
            tree: self.tree,
            current: parent,
        })
    }

    /// Moves to the outermost ancestor.
    pub fn root(self) -> Self {
        let root = self.tree.root(self.current);
        Self {
            tree: self.tree,
            current: root,
        }
    }

    /// Returns the element the builder is positioned at.
    #[must_use]
    pub fn id(&self) -> ElementId {
        self.current
    }

    /// Returns the underlying tree.
    #[must_use]
    pub fn tree(&self) -> &Tree {
        self.tree
    }
}

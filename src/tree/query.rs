//! Name matching, namespace lookup, and child queries.
//!
//! Name queries use exact-name semantics. Without a namespace, `"foo"` only
//! matches an element literally named `foo`; a prefixed element such as
//! `<x:foo>` is invisible to it, and a prefixed query such as `"x:foo"`
//! matches nothing. Prefixed elements are reached by local name plus the
//! namespace URI their prefix is bound to.

use super::{AttrValue, Child, ElementId, Text, Tree};

/// Splits `prefix:local` into its parts.
///
/// Only the first colon separates; a name without one has no prefix.
fn split_qname(qname: &str) -> (Option<&str>, &str) {
    match qname.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, qname),
    }
}

impl Tree {
    /// Returns the element name without its prefix.
    #[must_use]
    pub fn local_name(&self, id: ElementId) -> &str {
        split_qname(self.name(id)).1
    }

    /// Returns the element's namespace prefix, if its name has one.
    #[must_use]
    pub fn prefix(&self, id: ElementId) -> Option<&str> {
        split_qname(self.name(id)).0
    }

    /// Resolves the namespace URI bound to `prefix` (or the default namespace
    /// for `None`) at `id`, searching the element and then its ancestors.
    #[must_use]
    pub fn find_ns(&self, id: ElementId, prefix: Option<&str>) -> Option<&str> {
        let declaration = match prefix {
            Some(prefix) => format!("xmlns:{prefix}"),
            None => "xmlns".to_string(),
        };
        self.ancestors(id)
            .find_map(|ancestor| self.attrs(ancestor).get(&declaration))
            .and_then(AttrValue::as_str)
    }

    /// Returns the namespace URI of the element itself.
    #[must_use]
    pub fn get_ns(&self, id: ElementId) -> Option<&str> {
        self.find_ns(id, self.prefix(id))
    }

    /// Tests an element's name.
    ///
    /// Without `ns`, the element must be unprefixed and named exactly `name`.
    /// With `ns`, its local name must be `name` and its resolved namespace
    /// must be `ns`.
    #[must_use]
    pub fn is(&self, id: ElementId, name: &str, ns: Option<&str>) -> bool {
        match ns {
            None => self.prefix(id).is_none() && self.name(id) == name,
            Some(ns) => self.local_name(id) == name && self.get_ns(id) == Some(ns),
        }
    }

    /// Returns an attribute value.
    ///
    /// Without `ns` the key is matched exactly. With `ns`, the lookup finds a
    /// `prefix:key` attribute whose prefix is declared as `ns` through an
    /// `xmlns:prefix` attribute on the element or an ancestor. A key stored
    /// with a null value is found; a missing key is not.
    #[must_use]
    pub fn get_attr(&self, id: ElementId, key: &str, ns: Option<&str>) -> Option<&AttrValue> {
        let attrs = self.attrs(id);
        let Some(ns) = ns else {
            return attrs.get(key);
        };
        attrs.iter().find_map(|(name, value)| match split_qname(name) {
            (Some(prefix), local)
                if prefix != "xmlns"
                    && local == key
                    && self.find_ns(id, Some(prefix)) == Some(ns) =>
            {
                Some(value)
            }
            _ => None,
        })
    }

    /// Iterates over the element children of `id`, skipping text and nulls.
    pub fn child_elements(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        self.children(id).iter().filter_map(Child::as_element)
    }

    /// Returns all element children of `id`, in order.
    #[must_use]
    pub fn get_child_elements(&self, id: ElementId) -> Vec<ElementId> {
        self.child_elements(id).collect()
    }

    /// Returns the first element child matching `name` (see [`Tree::is`]).
    #[must_use]
    pub fn get_child(&self, id: ElementId, name: &str, ns: Option<&str>) -> Option<ElementId> {
        self.child_elements(id)
            .find(|&child| self.is(child, name, ns))
    }

    /// Returns every element child matching `name`; empty if none do.
    #[must_use]
    pub fn get_children(&self, id: ElementId, name: &str, ns: Option<&str>) -> Vec<ElementId> {
        self.child_elements(id)
            .filter(|&child| self.is(child, name, ns))
            .collect()
    }

    /// Iterates over the direct text runs of `id`.
    pub fn texts(&self, id: ElementId) -> impl Iterator<Item = &Text> + '_ {
        self.children(id).iter().filter_map(Child::as_text)
    }

    /// Returns the direct text of `id`: all text runs concatenated in order,
    /// numbers in decimal form. `None` when there are no text runs.
    #[must_use]
    pub fn get_text(&self, id: ElementId) -> Option<String> {
        let mut texts = self.texts(id).peekable();
        texts.peek()?;
        Some(texts.map(ToString::to_string).collect())
    }

    /// Returns the text of the first child matching `name`, or `None` if
    /// there is no such child or it has no text.
    #[must_use]
    pub fn get_child_text(&self, id: ElementId, name: &str, ns: Option<&str>) -> Option<String> {
        self.get_child(id, name, ns)
            .and_then(|child| self.get_text(child))
    }

    /// Returns the first element whose attribute `key` equals `value`.
    ///
    /// Searches direct children, or the whole subtree in document order when
    /// `recursive` is set.
    #[must_use]
    pub fn get_child_by_attr(
        &self,
        id: ElementId,
        key: &str,
        value: impl Into<AttrValue>,
        ns: Option<&str>,
        recursive: bool,
    ) -> Option<ElementId> {
        let value = value.into();
        self.attr_candidates(id, recursive)
            .into_iter()
            .find(|&candidate| self.get_attr(candidate, key, ns) == Some(&value))
    }

    /// Returns every element whose attribute `key` equals `value`, in
    /// document order.
    #[must_use]
    pub fn get_children_by_attr(
        &self,
        id: ElementId,
        key: &str,
        value: impl Into<AttrValue>,
        ns: Option<&str>,
        recursive: bool,
    ) -> Vec<ElementId> {
        let value = value.into();
        self.attr_candidates(id, recursive)
            .into_iter()
            .filter(|&candidate| self.get_attr(candidate, key, ns) == Some(&value))
            .collect()
    }

    fn attr_candidates(&self, id: ElementId, recursive: bool) -> Vec<ElementId> {
        if recursive {
            self.descendants(id).collect()
        } else {
            self.get_child_elements(id)
        }
    }

    /// Removes the entry for `child` from `parent`'s children and clears its
    /// parent link. Matches by identity; siblings with the same name stay.
    ///
    /// Returns `false` (and changes nothing) if `child` is not a child.
    pub fn remove(&mut self, parent: ElementId, child: ElementId) -> bool {
        let children = &mut self.node_mut(parent).children;
        let Some(position) = children
            .iter()
            .position(|entry| *entry == Child::Element(child))
        else {
            log::trace!("remove: {child:?} is not a child of {parent:?}");
            return false;
        };
        children.remove(position);
        if self.node(child).parent == Some(parent) {
            self.node_mut(child).parent = None;
        }
        true
    }

    /// Removes every element child matching `name` (see [`Tree::is`]).
    ///
    /// Returns how many entries were removed.
    pub fn remove_named(&mut self, parent: ElementId, name: &str, ns: Option<&str>) -> usize {
        let doomed = self.get_children(parent, name, ns);
        if doomed.is_empty() {
            log::trace!("remove_named: no {name:?} children under {parent:?}");
            return 0;
        }
        let children = &mut self.node_mut(parent).children;
        let before = children.len();
        children.retain(|entry| !matches!(entry, Child::Element(id) if doomed.contains(id)));
        let removed = before - children.len();
        for id in doomed {
            if self.node(id).parent == Some(parent) {
                self.node_mut(id).parent = None;
            }
        }
        removed
    }
}

//! Markup serializer.
//!
//! Serializes an element and its subtree into markup text. With default
//! options the output is compact: `<name attr="v"/>` for an element with an
//! empty children list, `<name attr="v">...</name>` otherwise.

use std::fmt;

use crate::tree::{Child, ElementId, Tree};

/// Options controlling markup output.
///
/// # Examples
///
/// ```
/// use elemtree::Tree;
/// use elemtree::serial::{serialize_with_options, SerializeOptions};
///
/// let mut tree = Tree::new();
/// let root = tree.element("root");
/// tree.build(root).c("child").t("Hello");
/// let xml = serialize_with_options(&tree, root, &SerializeOptions::default().indent(true));
/// assert_eq!(xml, "<root>\n  <child>Hello</child>\n</root>");
/// ```
#[derive(Debug, Clone)]
pub struct SerializeOptions {
    /// Whether to put element-only content on indented lines.
    /// Defaults to `false`.
    pub indent: bool,
    /// The indentation string used for each level when `indent` is `true`.
    /// Defaults to two spaces.
    pub indent_str: String,
    /// Whether to start the output with `<?xml version="1.0"?>`.
    /// Defaults to `false`.
    pub declaration: bool,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            indent: false,
            indent_str: "  ".to_string(),
            declaration: false,
        }
    }
}

impl SerializeOptions {
    /// Enables or disables indented output.
    ///
    /// Only elements whose children are all elements (ignoring
    /// whitespace-only text) are broken across lines; mixed content is
    /// written as-is so that its text is not altered.
    #[must_use]
    pub fn indent(mut self, indent: bool) -> Self {
        self.indent = indent;
        self
    }

    /// Sets the indentation string used for each nesting level.
    #[must_use]
    pub fn indent_str(mut self, s: &str) -> Self {
        self.indent_str = s.to_string();
        self
    }

    /// Enables or disables the leading XML declaration.
    #[must_use]
    pub fn declaration(mut self, declaration: bool) -> Self {
        self.declaration = declaration;
        self
    }
}

/// Serializes an element to markup.
///
/// # Examples
///
/// ```
/// use elemtree::Tree;
/// use elemtree::serial::serialize;
///
/// let mut tree = Tree::new();
/// let e = tree.element_with("e", [("a1", "\"well\"")]);
/// assert_eq!(serialize(&tree, e), r#"<e a1="&quot;well&quot;"/>"#);
/// ```
#[must_use]
pub fn serialize(tree: &Tree, id: ElementId) -> String {
    serialize_with_options(tree, id, &SerializeOptions::default())
}

/// Serializes an element to markup with the given options.
#[must_use]
pub fn serialize_with_options(tree: &Tree, id: ElementId, options: &SerializeOptions) -> String {
    let mut output = String::new();
    if options.declaration {
        output.push_str("<?xml version=\"1.0\"?>");
        if options.indent {
            output.push('\n');
        }
    }
    serialize_element(tree, id, &mut output, options, 0);
    output
}

/// Returns `true` if the element has element children and no text other than
/// whitespace, meaning it is safe to add indentation.
fn is_element_only(tree: &Tree, id: ElementId) -> bool {
    let mut has_element_child = false;
    for child in tree.children(id) {
        match child {
            Child::Element(_) => has_element_child = true,
            Child::Text(text) => {
                if text.as_str().map_or(true, |s| !s.trim().is_empty()) {
                    return false;
                }
            }
            Child::Null => {}
        }
    }
    has_element_child
}

fn push_indent(out: &mut String, options: &SerializeOptions, depth: usize) {
    for _ in 0..depth {
        out.push_str(&options.indent_str);
    }
}

fn serialize_element(
    tree: &Tree,
    id: ElementId,
    out: &mut String,
    options: &SerializeOptions,
    depth: usize,
) {
    let node = tree.node(id);
    out.push('<');
    out.push_str(node.name());

    for (key, value) in node.attrs().iter() {
        let Some(text) = value.to_markup_text() else {
            continue;
        };
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        write_escaped_attr(out, &text);
        out.push('"');
    }

    if node.children().is_empty() {
        out.push_str("/>");
        return;
    }

    out.push('>');
    let element_only = options.indent && is_element_only(tree, id);
    for child in node.children() {
        match child {
            Child::Element(child_id) => {
                if element_only {
                    out.push('\n');
                    push_indent(out, options, depth + 1);
                }
                serialize_element(tree, *child_id, out, options, depth + 1);
            }
            Child::Text(text) => {
                if !element_only {
                    write_escaped_text(out, &text.to_string());
                }
            }
            Child::Null => {
                log::trace!("skipping null child of <{}>", node.name());
            }
        }
    }
    if element_only {
        out.push('\n');
        push_indent(out, options, depth);
    }
    out.push_str("</");
    out.push_str(node.name());
    out.push('>');
}

/// Escapes text content: `&`, `<` and `>`.
pub(crate) fn write_escaped_text(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

/// Escapes an attribute value for a double-quoted slot: `&`, `<`, `>`, `"`
/// and `'`.
pub(crate) fn write_escaped_attr(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
}

/// A [`fmt::Display`] adapter for an element, returned by [`Tree::display`].
#[derive(Debug, Clone, Copy)]
pub struct DisplayElement<'a> {
    tree: &'a Tree,
    id: ElementId,
}

impl fmt::Display for DisplayElement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&serialize(self.tree, self.id))
    }
}

impl Tree {
    /// Serializes an element to compact markup.
    #[must_use]
    pub fn to_xml(&self, id: ElementId) -> String {
        serialize(self, id)
    }

    /// Returns a value that formats an element as compact markup.
    #[must_use]
    pub fn display(&self, id: ElementId) -> DisplayElement<'_> {
        DisplayElement { tree: self, id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::AttrValue;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_element() {
        let mut tree = Tree::new();
        let e = tree.element("e");
        assert_eq!(serialize(&tree, e), "<e/>");
    }

    #[test]
    fn test_attributes() {
        let mut tree = Tree::new();
        let e = tree.element_with("e", [("a1", "foo")]);
        assert_eq!(serialize(&tree, e), r#"<e a1="foo"/>"#);
    }

    #[test]
    fn test_attribute_escaping() {
        let mut tree = Tree::new();
        let e = tree.element_with("e", [("a1", "\"well\"")]);
        assert_eq!(serialize(&tree, e), r#"<e a1="&quot;well&quot;"/>"#);
        let e = tree.element_with("e", [("a", "<a & 'b'>")]);
        assert_eq!(
            serialize(&tree, e),
            r#"<e a="&lt;a &amp; &apos;b&apos;&gt;"/>"#
        );
    }

    #[test]
    fn test_text() {
        let mut tree = Tree::new();
        let e = tree.element("e");
        tree.t(e, "bar");
        assert_eq!(serialize(&tree, e), "<e>bar</e>");
    }

    #[test]
    fn test_text_escaping() {
        let mut tree = Tree::new();
        let e = tree.element("e");
        tree.t(e, "1 < 2");
        assert_eq!(serialize(&tree, e), "<e>1 &lt; 2</e>");
        let e = tree.element("e");
        tree.t(e, "a & b > \"c\"");
        assert_eq!(serialize(&tree, e), "<e>a &amp; b &gt; \"c\"</e>");
    }

    #[test]
    fn test_number_attributes() {
        let mut tree = Tree::new();
        let e = tree.element_with("e", [("a", 23)]);
        assert_eq!(serialize(&tree, e), r#"<e a="23"/>"#);
        let e = tree.element_with("e", [("foo", 23), ("bar", 0)]);
        assert_eq!(serialize(&tree, e), r#"<e foo="23" bar="0"/>"#);
    }

    #[test]
    fn test_number_contents() {
        let mut tree = Tree::new();
        let e = tree.element("e");
        tree.build(e).c("foo").t(23).up().c("bar").t(0);
        assert_eq!(serialize(&tree, e), "<e><foo>23</foo><bar>0</bar></e>");
    }

    #[test]
    fn test_null_and_undefined_attributes_are_omitted() {
        let mut tree = Tree::new();
        let e = tree.element_with("e", [("foo", AttrValue::Null)]);
        assert_eq!(serialize(&tree, e), "<e/>");
        let e = tree.element_with("e", [("foo", AttrValue::Undefined)]);
        assert_eq!(serialize(&tree, e), "<e/>");
        let e = tree.element_with("e", [("a", AttrValue::Null), ("b", AttrValue::from("x"))]);
        assert_eq!(serialize(&tree, e), r#"<e b="x"/>"#);
    }

    #[test]
    fn test_null_child_forces_long_form() {
        let mut tree = Tree::new();
        let e = tree.element("e");
        *tree.children_mut(e) = vec![Child::Null];
        assert_eq!(serialize(&tree, e), "<e></e>");
    }

    #[test]
    fn test_prefixed_names_are_written_verbatim() {
        let mut tree = Tree::new();
        let e = tree.element_with("x:foo", [("xmlns:x", "urn:x")]);
        tree.t(e, "bar");
        assert_eq!(serialize(&tree, e), r#"<x:foo xmlns:x="urn:x">bar</x:foo>"#);
    }

    #[test]
    fn test_subtree_only() {
        let mut tree = Tree::new();
        let a = tree.element("a");
        let c = tree.build(a).c("b").c_with("c", [("myProperty", "x")]).t("bar").id();
        assert_eq!(serialize(&tree, c), r#"<c myProperty="x">bar</c>"#);
    }

    #[test]
    fn test_indent() {
        let mut tree = Tree::new();
        let root = tree.element("root");
        tree.build(root).c("a").c("b").up().up().c("mixed").t("x").c("i").t("y");
        let options = SerializeOptions::default().indent(true);
        assert_eq!(
            serialize_with_options(&tree, root, &options),
            "<root>\n  <a>\n    <b/>\n  </a>\n  <mixed>x<i>y</i></mixed>\n</root>"
        );
    }

    #[test]
    fn test_indent_str_and_declaration() {
        let mut tree = Tree::new();
        let root = tree.element("root");
        tree.c(root, "a");
        let options = SerializeOptions::default()
            .indent(true)
            .indent_str("\t")
            .declaration(true);
        assert_eq!(
            serialize_with_options(&tree, root, &options),
            "<?xml version=\"1.0\"?>\n<root>\n\t<a/>\n</root>"
        );
        let compact = SerializeOptions::default().declaration(true);
        assert_eq!(
            serialize_with_options(&tree, root, &compact),
            "<?xml version=\"1.0\"?><root><a/></root>"
        );
    }

    #[test]
    fn test_display_matches_to_xml() {
        let mut tree = Tree::new();
        let e = tree.element_with("e", "urn:x");
        tree.t(e, 5);
        assert_eq!(tree.display(e).to_string(), tree.to_xml(e));
        assert_eq!(format!("{}", tree.display(e)), r#"<e xmlns="urn:x">5</e>"#);
    }
}

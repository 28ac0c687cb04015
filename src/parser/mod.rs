//! Markup parser.
//!
//! A small hand-rolled parser that reads one element (with its subtree) and
//! builds it through the same primitives a caller would use:
//! [`Tree::element_with`] for the root, [`Tree::c_with`] for each start tag,
//! [`Tree::t`] for character data and [`Tree::up`] for each end tag.
//!
//! The parser is permissive about everything the tree does not model. The
//! XML declaration, comments, processing instructions and a DOCTYPE are
//! skipped. CDATA sections become ordinary text. Only the five predefined
//! entities and numeric character references are resolved.

pub(crate) mod input;
mod xml;

use crate::error::ParseError;
use crate::tree::{ElementId, Tree};

use input::DEFAULT_MAX_DEPTH;

/// Parse options.
///
/// Use the builder pattern to configure options:
///
/// ```
/// use elemtree::parser::ParseOptions;
///
/// let opts = ParseOptions::default()
///     .no_blanks(true)
///     .max_depth(128);
/// ```
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// If true, drop text runs that consist only of whitespace.
    pub no_blanks: bool,
    /// Maximum element nesting depth (default: 256).
    pub max_depth: u32,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            no_blanks: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseOptions {
    /// Enables or disables stripping of blank text runs.
    #[must_use]
    pub fn no_blanks(mut self, yes: bool) -> Self {
        self.no_blanks = yes;
        self
    }

    /// Sets the maximum element nesting depth.
    #[must_use]
    pub fn max_depth(mut self, max: u32) -> Self {
        self.max_depth = max;
        self
    }
}

/// Parses markup into a new tree with default options.
///
/// # Errors
///
/// Returns `ParseError` if the input is not a single well-formed element.
///
/// # Examples
///
/// ```
/// use elemtree::parser::parse_str;
///
/// let (tree, root) = parse_str("<a b='c'><d>e</d></a>").unwrap();
/// assert_eq!(tree.get_child_text(root, "d", None).as_deref(), Some("e"));
/// ```
pub fn parse_str(input: &str) -> Result<(Tree, ElementId), ParseError> {
    parse_str_with_options(input, &ParseOptions::default())
}

/// Parses markup into a new tree with the given options.
///
/// # Errors
///
/// Returns `ParseError` if the input is not a single well-formed element.
pub fn parse_str_with_options(
    input: &str,
    options: &ParseOptions,
) -> Result<(Tree, ElementId), ParseError> {
    let mut tree = Tree::new();
    let root = parse_into(&mut tree, input, options)?;
    Ok((tree, root))
}

/// Parses markup as a new root element of an existing tree.
///
/// On error `tree` is left exactly as it was.
///
/// # Errors
///
/// Returns `ParseError` if the input is not a single well-formed element.
pub fn parse_into(
    tree: &mut Tree,
    input: &str,
    options: &ParseOptions,
) -> Result<ElementId, ParseError> {
    let mark = tree.element_count();
    match xml::MarkupParser::new(input, tree, options).parse() {
        Ok(root) => {
            log::debug!(
                "parsed <{}> ({} elements, {} bytes)",
                tree.name(root),
                tree.element_count() - mark,
                input.len()
            );
            Ok(root)
        }
        Err(err) => {
            tree.truncate(mark);
            Err(err)
        }
    }
}

impl Tree {
    /// Parses markup as a new root element of this tree, with default options.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the input is not a single well-formed element;
    /// the tree is left unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use elemtree::Tree;
    ///
    /// let mut tree = Tree::new();
    /// let root = tree.parse_str("<message><body>hi</body></message>").unwrap();
    /// assert_eq!(tree.to_xml(root), "<message><body>hi</body></message>");
    /// ```
    pub fn parse_str(&mut self, input: &str) -> Result<ElementId, ParseError> {
        parse_into(self, input, &ParseOptions::default())
    }
}

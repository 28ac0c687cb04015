//! # elemtree
//!
//! A lightweight XML element tree: named elements with ordered attributes and
//! mixed content (child elements and text runs), with chainable construction,
//! name and namespace aware queries, in-place mutation, deep cloning, markup
//! serialization, and a JSON structural form.
//!
//! Elements live in a [`Tree`] arena and are addressed by [`ElementId`].
//! Each element knows its parent, so a builder chain can descend with `c`,
//! append text with `t`, and come back with `up`.
//!
//! ## Quick Start
//!
//! ```
//! use elemtree::Tree;
//!
//! let mut tree = Tree::new();
//! let msg = tree.element_with("message", [("to", "juliet@example.com"), ("type", "chat")]);
//! tree.build(msg).c("body").t("Art thou not Romeo?");
//!
//! assert_eq!(tree.get_child_text(msg, "body", None).as_deref(), Some("Art thou not Romeo?"));
//! assert_eq!(
//!     tree.to_xml(msg),
//!     r#"<message to="juliet@example.com" type="chat"><body>Art thou not Romeo?</body></message>"#
//! );
//!
//! let parsed = tree.parse_str(&tree.to_xml(msg)).unwrap();
//! assert_eq!(tree.to_json(parsed), tree.to_json(msg));
//! ```

pub mod error;
pub mod parser;
pub mod serial;
pub mod tree;

// Re-export primary types at the crate root for convenience.
pub use error::{ParseError, SourceLocation, StructuralError};
pub use parser::{parse_str, ParseOptions};
pub use serial::{SerializeOptions, StructuralChild, StructuralElement};
pub use tree::{AttrValue, Attributes, Builder, Child, ElementData, ElementId, Text, Tree};

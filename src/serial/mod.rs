//! Serialization.
//!
//! Two output forms are supported: markup text ([`xml`]) and the
//! `{name, attrs, children}` structural form used for JSON interchange
//! ([`structural`]). The structural form also converts back into a tree.

pub mod structural;
pub mod xml;

pub use structural::{StructuralChild, StructuralElement};
pub use xml::{serialize, serialize_with_options, DisplayElement, SerializeOptions};

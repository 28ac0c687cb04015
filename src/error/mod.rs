//! Error types.
//!
//! Tree operations themselves never fail: lookups return `Option`, and
//! removing something that is not there is a no-op. Errors only arise at the
//! two boundaries where outside input is turned into a tree: markup parsing
//! ([`ParseError`]) and structural reconstruction ([`StructuralError`]).

use std::fmt;

/// Source location within a markup string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number (in characters, not bytes).
    pub column: u32,
    /// 0-based byte offset from the start of the input.
    pub byte_offset: usize,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The error returned when markup cannot be turned into a tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("parse error at {location}: {message}")]
pub struct ParseError {
    /// Human-readable description of the problem.
    pub message: String,
    /// Where in the input the problem was detected.
    pub location: SourceLocation,
}

/// The error returned when a structural value does not describe an element.
#[derive(Debug, thiserror::Error)]
pub enum StructuralError {
    /// The value does not have the `{name, attrs, children}` shape.
    #[error("invalid structural element: {0}")]
    Json(#[from] serde_json::Error),
    /// An element (at any depth) has an empty name.
    #[error("structural element has an empty name")]
    EmptyName,
}

//! Low-level input handling for the markup parser.
//!
//! [`ParserInput`] encapsulates the input string, position tracking (line,
//! column, byte offset), the nesting depth, and the parsing primitives the
//! parser is written in: peeking, advancing, names, quoted values and
//! references.
//!
//! Only the five predefined entities (`amp`, `lt`, `gt`, `apos`, `quot`) and
//! numeric character references are recognized. No external entity is ever
//! loaded.

use crate::error::{ParseError, SourceLocation};

/// Default maximum element nesting depth.
pub(crate) const DEFAULT_MAX_DEPTH: u32 = 256;

/// Returns `true` if `c` is a valid XML 1.0 `Char`.
///
/// `#x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD] | [#x10000-#x10FFFF]`
pub(crate) fn is_xml_char(c: char) -> bool {
    matches!(c as u32,
        0x09 | 0x0A | 0x0D | 0x20..=0xD7FF | 0xE000..=0xFFFD | 0x0001_0000..=0x0010_FFFF
    )
}

/// Returns `true` if `c` may start a name.
pub(crate) fn is_name_start_char(c: char) -> bool {
    matches!(c,
        ':' | 'A'..='Z' | '_' | 'a'..='z' |
        '\u{C0}'..='\u{D6}' | '\u{D8}'..='\u{F6}' | '\u{F8}'..='\u{2FF}' |
        '\u{370}'..='\u{37D}' | '\u{37F}'..='\u{1FFF}' |
        '\u{200C}'..='\u{200D}' | '\u{2070}'..='\u{218F}' |
        '\u{2C00}'..='\u{2FEF}' | '\u{3001}'..='\u{D7FF}' |
        '\u{F900}'..='\u{FDCF}' | '\u{FDF0}'..='\u{FFFD}' |
        '\u{10000}'..='\u{EFFFF}'
    )
}

/// Returns `true` if `c` may appear in a name after the first character.
pub(crate) fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-' | '.' | '0'..='9' | '\u{B7}' |
            '\u{300}'..='\u{36F}' | '\u{203F}'..='\u{2040}'
        )
}

/// Input state for one parse.
pub(crate) struct ParserInput<'a> {
    /// The whole input.
    input: &'a str,

    /// Current byte offset in `input`. Always on a character boundary.
    pos: usize,

    /// Current line number (1-based).
    line: u32,

    /// Current column number (1-based, in characters).
    column: u32,

    /// Current element nesting depth.
    depth: u32,

    /// Maximum allowed nesting depth.
    max_depth: u32,
}

impl<'a> ParserInput<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            column: 1,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Sets the maximum nesting depth.
    pub fn set_max_depth(&mut self, max: u32) {
        self.max_depth = max;
    }

    // -- Depth tracking --

    /// Increments the nesting depth. Returns an error if the limit is exceeded.
    pub fn increment_depth(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(self.fatal(format!(
                "maximum nesting depth exceeded ({})",
                self.max_depth
            )));
        }
        Ok(())
    }

    /// Decrements the nesting depth (saturating at 0).
    pub fn decrement_depth(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    // -- Position queries --

    /// Returns the current source location.
    pub fn location(&self) -> SourceLocation {
        SourceLocation {
            line: self.line,
            column: self.column,
            byte_offset: self.pos,
        }
    }

    /// Returns `true` if all input has been consumed.
    pub fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    // -- Peek operations --

    /// Returns the byte at the current position without consuming it.
    pub fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    /// Returns the byte at `current_position + offset` without consuming.
    pub fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.as_bytes().get(self.pos + offset).copied()
    }

    /// Returns the character at the current position without consuming it.
    pub fn peek_char(&self) -> Option<char> {
        self.input.get(self.pos..).and_then(|rest| rest.chars().next())
    }

    /// Returns `true` if the remaining input starts with `s`.
    pub fn looking_at(&self, s: &[u8]) -> bool {
        self.input.as_bytes()[self.pos..].starts_with(s)
    }

    // -- Advance operations --

    /// Advances the position by `count` bytes, updating line/column.
    ///
    /// UTF-8 continuation bytes do not count as columns, so the column stays
    /// in characters.
    pub fn advance(&mut self, count: usize) {
        let end = (self.pos + count).min(self.input.len());
        for &b in &self.input.as_bytes()[self.pos..end] {
            if b == b'\n' {
                self.line += 1;
                self.column = 1;
            } else if b & 0xC0 != 0x80 {
                self.column += 1;
            }
        }
        self.pos = end;
    }

    /// Advances by one character, updating line/column.
    pub fn advance_char(&mut self, ch: char) {
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        self.pos += ch.len_utf8();
    }

    /// Consumes and returns the next byte, or returns an error at EOF.
    pub fn next_byte(&mut self) -> Result<u8, ParseError> {
        let b = self
            .peek()
            .ok_or_else(|| self.fatal("unexpected end of input"))?;
        self.advance(1);
        Ok(b)
    }

    // -- Expect operations --

    /// Consumes the next byte and asserts it matches `expected`.
    pub fn expect_byte(&mut self, expected: u8) -> Result<(), ParseError> {
        let b = self.next_byte()?;
        if b != expected {
            return Err(self.fatal(format!(
                "expected '{}', found '{}'",
                expected as char, b as char
            )));
        }
        Ok(())
    }

    /// Consumes bytes and asserts they match the `expected` sequence.
    pub fn expect_str(&mut self, expected: &[u8]) -> Result<(), ParseError> {
        for &b in expected {
            self.expect_byte(b)?;
        }
        Ok(())
    }

    // -- Whitespace --

    /// Skips whitespace characters. Returns `true` if any were consumed.
    pub fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while let Some(b' ' | b'\t' | b'\r' | b'\n') = self.peek() {
            self.advance(1);
        }
        self.pos > start
    }

    // -- Runs --

    /// Consumes bytes while `pred` returns `true` and returns them.
    pub fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let input = self.input;
        let start = self.pos;
        let len = input.as_bytes()[start..]
            .iter()
            .take_while(|&&b| pred(b))
            .count();
        self.advance(len);
        &input[start..self.pos]
    }

    /// Consumes character data up to the next `<` or `&`.
    pub fn take_char_data(&mut self) -> &'a str {
        self.take_while(|b| b != b'<' && b != b'&')
    }

    /// Consumes input through the next `delim` and returns what preceded it.
    ///
    /// `what` names the construct in the error for a missing delimiter.
    pub fn take_until(&mut self, delim: &str, what: &str) -> Result<&'a str, ParseError> {
        let input = self.input;
        let start = self.pos;
        let Some(len) = input[start..].find(delim) else {
            return Err(self.fatal(format!("unterminated {what}")));
        };
        self.advance(len + delim.len());
        Ok(&input[start..start + len])
    }

    // -- Names --

    /// Parses a name: a name start character followed by name characters.
    pub fn parse_name(&mut self) -> Result<String, ParseError> {
        let first = self
            .peek_char()
            .ok_or_else(|| self.fatal("expected name, found end of input"))?;
        if !is_name_start_char(first) {
            return Err(self.fatal(format!("invalid name start character: '{first}'")));
        }
        let start = self.pos;
        self.advance_char(first);
        while let Some(ch) = self.peek_char() {
            if !is_name_char(ch) {
                break;
            }
            self.advance_char(ch);
        }
        Ok(self.input[start..self.pos].to_string())
    }

    // -- References --

    /// Parses an entity or character reference (`&...;`).
    pub fn parse_reference(&mut self) -> Result<char, ParseError> {
        self.expect_byte(b'&')?;

        if self.peek() == Some(b'#') {
            self.advance(1);
            let value = if self.peek() == Some(b'x') {
                self.advance(1);
                let hex = self.take_while(|b| b.is_ascii_hexdigit());
                if hex.is_empty() {
                    return Err(self.fatal("empty hex character reference"));
                }
                u32::from_str_radix(hex, 16)
                    .map_err(|_| self.fatal("invalid hex character reference"))?
            } else {
                let dec = self.take_while(|b| b.is_ascii_digit());
                if dec.is_empty() {
                    return Err(self.fatal("empty decimal character reference"));
                }
                dec.parse::<u32>()
                    .map_err(|_| self.fatal("invalid decimal character reference"))?
            };
            self.expect_byte(b';')?;

            return char::from_u32(value).filter(|ch| is_xml_char(*ch)).ok_or_else(|| {
                self.fatal(format!(
                    "character reference &#x{value:X}; does not refer to a valid XML character"
                ))
            });
        }

        let name = self.parse_name()?;
        self.expect_byte(b';')?;
        match name.as_str() {
            "amp" => Ok('&'),
            "lt" => Ok('<'),
            "gt" => Ok('>'),
            "apos" => Ok('\''),
            "quot" => Ok('"'),
            _ => Err(self.fatal(format!("unknown entity reference: &{name};"))),
        }
    }

    /// Parses a quoted attribute value, resolving references.
    ///
    /// Tabs, newlines and carriage returns are normalized to spaces, with
    /// `\r\n` counting as one.
    pub fn parse_attribute_value(&mut self) -> Result<String, ParseError> {
        let quote = self.next_byte()?;
        if quote != b'"' && quote != b'\'' {
            return Err(self.fatal("attribute value must be quoted"));
        }

        let mut value = String::new();
        loop {
            let Some(ch) = self.peek_char() else {
                return Err(self.fatal("unexpected end of input in attribute value"));
            };
            match ch {
                _ if ch as u32 == u32::from(quote) => {
                    self.advance(1);
                    return Ok(value);
                }
                '&' => value.push(self.parse_reference()?),
                '<' => return Err(self.fatal("'<' not allowed in attribute values")),
                '\r' => {
                    self.advance(1);
                    if self.peek() == Some(b'\n') {
                        self.advance(1);
                    }
                    value.push(' ');
                }
                '\n' | '\t' => {
                    self.advance_char(ch);
                    value.push(' ');
                }
                _ => {
                    self.advance_char(ch);
                    value.push(ch);
                }
            }
        }
    }

    // -- Error helpers --

    /// Creates a fatal `ParseError` at the current location.
    pub fn fatal(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            message: message.into(),
            location: self.location(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_tracks_lines_and_columns() {
        let mut input = ParserInput::new("ab\ncd");
        input.advance(4);
        let loc = input.location();
        assert_eq!((loc.line, loc.column, loc.byte_offset), (2, 2, 4));
    }

    #[test]
    fn test_columns_count_characters() {
        let mut input = ParserInput::new("é<");
        input.advance(2);
        assert_eq!(input.location().column, 2);
        assert_eq!(input.peek(), Some(b'<'));
    }

    #[test]
    fn test_parse_name() {
        let mut input = ParserInput::new("x:foo-1 rest");
        assert_eq!(input.parse_name().unwrap(), "x:foo-1");
        assert_eq!(input.peek(), Some(b' '));

        let mut input = ParserInput::new("1abc");
        assert!(input.parse_name().is_err());
    }

    #[test]
    fn test_predefined_references() {
        for (src, expected) in [
            ("&amp;", '&'),
            ("&lt;", '<'),
            ("&gt;", '>'),
            ("&apos;", '\''),
            ("&quot;", '"'),
            ("&#65;", 'A'),
            ("&#x263A;", '\u{263A}'),
        ] {
            assert_eq!(ParserInput::new(src).parse_reference().unwrap(), expected);
        }
    }

    #[test]
    fn test_bad_references() {
        assert!(ParserInput::new("&nbsp;").parse_reference().is_err());
        assert!(ParserInput::new("&#x0;").parse_reference().is_err());
        assert!(ParserInput::new("&#xFFFFFFFFF;").parse_reference().is_err());
        assert!(ParserInput::new("&#;").parse_reference().is_err());
        assert!(ParserInput::new("&amp").parse_reference().is_err());
    }

    #[test]
    fn test_attribute_value() {
        let mut input = ParserInput::new("'a \"b\" &lt;c&gt;'");
        assert_eq!(input.parse_attribute_value().unwrap(), "a \"b\" <c>");
        assert!(input.at_end());

        let mut input = ParserInput::new("\"x\r\ny\tz\"");
        assert_eq!(input.parse_attribute_value().unwrap(), "x y z");

        assert!(ParserInput::new("\"a<b\"").parse_attribute_value().is_err());
        assert!(ParserInput::new("\"open").parse_attribute_value().is_err());
        assert!(ParserInput::new("bare").parse_attribute_value().is_err());
    }

    #[test]
    fn test_take_until() {
        let mut input = ParserInput::new("comment text-->after");
        assert_eq!(input.take_until("-->", "comment").unwrap(), "comment text");
        assert!(input.looking_at(b"after"));

        let err = ParserInput::new("no end").take_until("-->", "comment").unwrap_err();
        assert_eq!(err.message, "unterminated comment");
    }

    #[test]
    fn test_depth_limit() {
        let mut input = ParserInput::new("");
        input.set_max_depth(1);
        assert!(input.increment_depth().is_ok());
        assert!(input.increment_depth().is_err());
    }
}

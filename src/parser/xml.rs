//! The element parser proper.
//!
//! Content is read iteratively: a start tag descends with `c_with`, an end
//! tag ascends with `up`, so nesting depth is bounded by `max_depth` rather
//! than by the call stack.

use crate::error::ParseError;
use crate::tree::{Attributes, ElementId, Tree};

use super::input::ParserInput;
use super::ParseOptions;

pub(crate) struct MarkupParser<'a, 't> {
    /// Low-level input state.
    input: ParserInput<'a>,
    /// The tree receiving the parsed element.
    tree: &'t mut Tree,
    /// Whether whitespace-only text runs are dropped.
    no_blanks: bool,
    /// The element whose content is being read; `None` outside the root.
    current: Option<ElementId>,
    /// Character data not yet appended to `current`.
    text: String,
}

impl<'a, 't> MarkupParser<'a, 't> {
    pub fn new(input: &'a str, tree: &'t mut Tree, options: &ParseOptions) -> Self {
        let mut pi = ParserInput::new(input);
        pi.set_max_depth(options.max_depth);
        Self {
            input: pi,
            tree,
            no_blanks: options.no_blanks,
            current: None,
            text: String::new(),
        }
    }

    /// Main parse entry point. Parses the prolog, one element and the
    /// trailing misc content.
    pub fn parse(mut self) -> Result<ElementId, ParseError> {
        if self.input.looking_at("\u{FEFF}".as_bytes()) {
            self.input.advance(3);
        }
        self.skip_misc()?;
        if self.input.looking_at(b"<!DOCTYPE") {
            self.skip_doctype()?;
            self.skip_misc()?;
        }

        if self.input.peek() != Some(b'<')
            || matches!(self.input.peek_at(1), None | Some(b'!' | b'?' | b'/'))
        {
            return Err(self.input.fatal("missing root element"));
        }
        let root = self.parse_start_tag()?;

        while let Some(current) = self.current {
            self.parse_content(current)?;
        }

        self.skip_misc()?;
        if !self.input.at_end() {
            return Err(self.input.fatal("content after root element"));
        }
        Ok(root)
    }

    // --- Misc (comments, PIs, whitespace) ---

    fn skip_misc(&mut self) -> Result<(), ParseError> {
        loop {
            self.input.skip_whitespace();
            if self.input.looking_at(b"<!--") {
                self.input.advance(4);
                self.input.take_until("-->", "comment")?;
            } else if self.input.looking_at(b"<?") {
                self.input.advance(2);
                self.input.take_until("?>", "processing instruction")?;
            } else {
                return Ok(());
            }
        }
    }

    fn skip_doctype(&mut self) -> Result<(), ParseError> {
        self.input.advance(9);
        let mut brackets = 0u32;
        let mut quote = None;
        loop {
            if self.input.at_end() {
                return Err(self.input.fatal("unterminated DOCTYPE declaration"));
            }
            let b = self.input.next_byte()?;
            match (quote, b) {
                (Some(q), _) if q == b => quote = None,
                (Some(_), _) => {}
                (None, b'"' | b'\'') => quote = Some(b),
                (None, b'[') => brackets += 1,
                (None, b']') => brackets = brackets.saturating_sub(1),
                (None, b'>') if brackets == 0 => return Ok(()),
                _ => {}
            }
        }
    }

    // --- Tags ---

    fn parse_start_tag(&mut self) -> Result<ElementId, ParseError> {
        self.input.increment_depth()?;
        self.input.expect_byte(b'<')?;
        let name = self.input.parse_name()?;
        let mut attrs = Attributes::new();

        let self_closing = loop {
            let had_ws = self.input.skip_whitespace();
            if self.input.looking_at(b"/>") {
                self.input.advance(2);
                break true;
            }
            if self.input.peek() == Some(b'>') {
                self.input.advance(1);
                break false;
            }
            if self.input.at_end() {
                return Err(self.input.fatal("unexpected end of input in start tag"));
            }
            if !had_ws {
                return Err(self.input.fatal("whitespace required between attributes"));
            }
            let key = self.input.parse_name()?;
            self.input.skip_whitespace();
            self.input.expect_byte(b'=')?;
            self.input.skip_whitespace();
            let value = self.input.parse_attribute_value()?;
            if attrs.contains_key(&key) {
                return Err(self.input.fatal(format!("duplicate attribute: '{key}'")));
            }
            attrs.insert(key, value);
        };

        let id = match self.current {
            Some(parent) => self.tree.c_with(parent, name, attrs),
            None => self.tree.element_with(name, attrs),
        };
        if self_closing {
            self.input.decrement_depth();
        } else {
            self.current = Some(id);
        }
        Ok(id)
    }

    fn parse_end_tag(&mut self, current: ElementId) -> Result<(), ParseError> {
        self.input.expect_str(b"</")?;
        let name = self.input.parse_name()?;
        self.input.skip_whitespace();
        self.input.expect_byte(b'>')?;

        let open = self.tree.name(current);
        if name != open {
            return Err(self.input.fatal(format!(
                "mismatched end tag: expected </{open}>, found </{name}>"
            )));
        }
        self.input.decrement_depth();
        self.current = self.tree.up(current);
        Ok(())
    }

    // --- Content ---

    /// Reads one content item of `current`.
    fn parse_content(&mut self, current: ElementId) -> Result<(), ParseError> {
        if self.input.at_end() {
            return Err(self
                .input
                .fatal("unexpected end of input in element content"));
        }

        if self.input.looking_at(b"</") {
            self.flush_text(current);
            self.parse_end_tag(current)?;
        } else if self.input.looking_at(b"<![CDATA[") {
            self.input.advance(9);
            let content = self.input.take_until("]]>", "CDATA section")?;
            push_normalized(&mut self.text, content);
        } else if self.input.looking_at(b"<!--") {
            self.input.advance(4);
            self.input.take_until("-->", "comment")?;
        } else if self.input.looking_at(b"<?") {
            self.input.advance(2);
            self.input.take_until("?>", "processing instruction")?;
        } else if self.input.looking_at(b"<!") {
            return Err(self
                .input
                .fatal("markup declaration not allowed in element content"));
        } else if self.input.peek() == Some(b'<') {
            self.flush_text(current);
            self.parse_start_tag()?;
        } else if self.input.peek() == Some(b'&') {
            let ch = self.input.parse_reference()?;
            self.text.push(ch);
        } else {
            let run = self.input.take_char_data();
            push_normalized(&mut self.text, run);
        }
        Ok(())
    }

    /// Appends pending character data to `current` as one text run.
    fn flush_text(&mut self, current: ElementId) {
        if self.text.is_empty() {
            return;
        }
        if self.no_blanks && self.text.bytes().all(|b| matches!(b, b' ' | b'\t' | b'\n')) {
            self.text.clear();
            return;
        }
        self.tree.t(current, std::mem::take(&mut self.text));
    }
}

/// Appends `s` with `\r\n` and lone `\r` normalized to `\n`.
fn push_normalized(out: &mut String, s: &str) {
    if !s.contains('\r') {
        out.push_str(s);
        return;
    }
    let mut chars = s.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\r' {
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            out.push('\n');
        } else {
            out.push(ch);
        }
    }
}

//! Position-tracking reader over template text.

/// A cursor over UTF-8 text.
///
/// All movement happens on character boundaries. Reads past the end return empty slices
/// instead of failing; markup problems are reported as diagnostics by the caller.
#[derive(Debug, Clone)]
pub(crate) struct Cursor<'a> {
    text: &'a str,
    position: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Cursor { text, position: 0 }
    }

    /// Current byte offset
    pub(crate) fn pos(&self) -> usize {
        self.position
    }

    /// Move to `position`, clamped to the text and snapped back to a character boundary
    pub(crate) fn seek(&mut self, position: usize) {
        let mut position = position.min(self.text.len());
        while !self.text.is_char_boundary(position) {
            position -= 1;
        }
        self.position = position;
    }

    /// Text from the cursor to the end
    pub(crate) fn rest(&self) -> &'a str {
        &self.text[self.position..]
    }

    /// Text between two offsets
    pub(crate) fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.text[start..end]
    }

    pub(crate) fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// The character after the current one
    pub(crate) fn peek_second(&self) -> Option<char> {
        let mut chars = self.rest().chars();
        chars.next();
        chars.next()
    }

    pub(crate) fn starts_with(&self, pattern: &str) -> bool {
        self.rest().starts_with(pattern)
    }

    /// Advance past one character
    pub(crate) fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.position += c.len_utf8();
        }
    }

    /// Advance by `step` bytes, clamped
    pub(crate) fn advance_by(&mut self, step: usize) {
        self.seek(self.position + step);
    }

    /// Consume characters while `predicate` holds and return them
    pub(crate) fn read_while<F: Fn(char) -> bool>(&mut self, predicate: F) -> &'a str {
        let start = self.position;
        let length = self
            .rest()
            .find(|c: char| !predicate(c))
            .unwrap_or(self.rest().len());
        self.position += length;
        &self.text[start..self.position]
    }

    pub(crate) fn skip_whitespace(&mut self) {
        self.read_while(char::is_whitespace);
    }

    /// `true` if only whitespace precedes the cursor on the current line
    pub(crate) fn at_line_start(&self) -> bool {
        let before = &self.text[..self.position];
        let line_start = before.rfind('\n').map_or(0, |index| index + 1);
        before[line_start..].trim().is_empty()
    }
}

//! Input cursor for the parsing engines.
//!
//! A `Cursor` owns nothing: it borrows the input text and tracks a read index
//! inside a `[begin, end)` window. Engines save the index before every attempt
//! and seek back to it on a soft failure, so the cursor is the only piece of
//! mutable state a symbol match touches directly.

/// A read position over a borrowed input string.
///
/// All offsets are byte offsets that lie on `char` boundaries. The invariant
/// `begin <= index <= end` holds at every observable point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor<'src> {
    text: &'src str,
    begin: usize,
    end: usize,
    index: usize,
}

impl<'src> Cursor<'src> {
    /// Creates a cursor over the whole of `text`.
    pub fn new(text: &'src str) -> Self {
        Self::with_window(text, 0, None)
    }

    /// Creates a cursor over `text[begin..end)`.
    ///
    /// `end` defaults to the end of the text. Both bounds are clamped to the
    /// text and moved back onto the nearest `char` boundary.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rdparse::Cursor;
    /// let cursor = Cursor::with_window("abcdef", 2, Some(4));
    /// assert_eq!(cursor.remaining(), "cd");
    /// ```
    pub fn with_window(text: &'src str, begin: usize, end: Option<usize>) -> Self {
        let end = floor_boundary(text, end.unwrap_or(text.len()).min(text.len()));
        let begin = floor_boundary(text, begin.min(end));
        Self {
            text,
            begin,
            end,
            index: begin,
        }
    }

    pub fn text(&self) -> &'src str {
        self.text
    }

    pub fn begin(&self) -> usize {
        self.begin
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// The current read offset.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Moves the read offset to `index`, clamped to the window.
    pub fn seek(&mut self, index: usize) {
        debug_assert!(
            self.text.is_char_boundary(index.min(self.text.len())),
            "cursor seek to a non-char boundary"
        );
        self.index = index.clamp(self.begin, self.end);
    }

    /// Advances the read offset by `len` bytes.
    pub fn advance(&mut self, len: usize) {
        self.seek(self.index + len);
    }

    /// Rewinds to the start of the window.
    pub fn reset(&mut self) {
        self.index = self.begin;
    }

    pub fn eof(&self) -> bool {
        self.index >= self.end
    }

    /// The unread part of the window.
    pub fn remaining(&self) -> &'src str {
        &self.text[self.index..self.end]
    }

    /// Up to `count` characters immediately before the read offset.
    pub fn front(&self, count: usize) -> &'src str {
        let head = &self.text[self.begin..self.index];
        if count == 0 {
            return "";
        }
        match head.char_indices().rev().nth(count - 1) {
            Some((offset, _)) => &head[offset..],
            None => head,
        }
    }

    /// Up to `count` characters starting at the read offset.
    pub fn behind(&self, count: usize) -> &'src str {
        let tail = self.remaining();
        match tail.char_indices().nth(count) {
            Some((offset, _)) => &tail[..offset],
            None => tail,
        }
    }
}

impl Iterator for Cursor<'_> {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        let ch = self.remaining().chars().next()?;
        self.index += ch.len_utf8();
        Some(ch)
    }
}

fn floor_boundary(text: &str, mut index: usize) -> usize {
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

//! Character cursor shared by the hand-written parsers.
//!
//! [`Cursor`] walks a `&str` one `char` at a time and tracks a 1-based line
//! and column. Lookahead past the end yields `None` rather than panicking,
//! and every error it builds carries the current position plus the source
//! line it came from.

use crate::{Error, Format};

/// A saved cursor position, used to report errors at the start of a token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Mark {
    pub pos: usize,
    pub line: usize,
    pub column: usize,
}

pub(crate) struct Cursor<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
    column: usize,
    format: Format,
}

impl<'a> Cursor<'a> {
    pub fn new(input: &'a str, format: Format) -> Self {
        Self::with_origin(input, format, 1, 1)
    }

    /// Cursor over a fragment whose first character sits at `line:column` of
    /// a larger document.
    pub fn with_origin(input: &'a str, format: Format, line: usize, column: usize) -> Self {
        Cursor {
            input,
            pos: 0,
            line,
            column,
            format,
        }
    }

    #[inline]
    pub fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// The character `n` positions ahead of the current one.
    pub fn peek_at(&self, n: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(n)
    }

    #[inline]
    pub fn matches(&self, lit: &str) -> bool {
        self.input[self.pos..].starts_with(lit)
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    pub fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    pub fn mark(&self) -> Mark {
        Mark {
            pos: self.pos,
            line: self.line,
            column: self.column,
        }
    }

    pub fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    pub fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            if self.advance().is_none() {
                break;
            }
        }
    }

    /// Consumes `ch` if it is next.
    pub fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consumes `lit` if the input continues with it.
    pub fn eat_str(&mut self, lit: &str) -> bool {
        if self.matches(lit) {
            self.advance_by(lit.chars().count());
            true
        } else {
            false
        }
    }

    pub fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if !pred(ch) {
                break;
            }
            self.advance();
        }
        &self.input[start..self.pos]
    }

    /// Skips spaces and tabs, never line breaks.
    pub fn skip_blanks(&mut self) {
        self.take_while(|c| c == ' ' || c == '\t');
    }

    pub fn error(&self, msg: impl Into<String>) -> Error {
        self.error_at(self.mark(), msg)
    }

    pub fn error_at(&self, mark: Mark, msg: impl Into<String>) -> Error {
        let line_start = self.input[..mark.pos].rfind('\n').map_or(0, |i| i + 1);
        let line_end = self.input[mark.pos..]
            .find('\n')
            .map_or(self.input.len(), |i| mark.pos + i);
        let source_line = self.input[line_start..line_end].trim_end_matches('\r');
        Error::syntax_with_context(self.format, mark.line, mark.column, msg, source_line)
    }
}

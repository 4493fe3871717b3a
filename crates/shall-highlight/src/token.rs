use shall_theme::TokenKind;
use std::ops::Range;

/// A classified slice of the source.
///
/// `offset` is absolute in the text handed to the outermost lexer, even for
/// tokens produced by a secondary lexer on a sub-slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    /// Byte offset where the token starts.
    pub offset: usize,
    pub text: &'a str,
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenKind, offset: usize, text: &'a str) -> Self {
        Self { kind, offset, text }
    }

    /// Length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Byte offset just past the token.
    #[inline]
    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }

    pub fn span(&self) -> Range<usize> {
        self.offset..self.end()
    }
}

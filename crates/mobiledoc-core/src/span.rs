//! Source locations inside a tokenizer input.
//!
//! Tokenizer errors carry a `Span` so callers can point at the offending
//! delimiter or link text in the string they passed in.

use std::fmt;

/// A byte range in a tokenizer input string.
///
/// Offsets are bytes, not characters, and the range is `[start, end)`.
///
/// # Example
///
/// ```rust
/// use mobiledoc_core::span::Span;
///
/// let span = Span::new(3, 10);
/// assert_eq!(span.len(), 7);
/// assert_eq!(span.to_string(), "3..10");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Starting byte offset (inclusive).
    pub start: u32,
    /// Ending byte offset (exclusive).
    pub end: u32,
}

impl Span {
    /// Create a new span from byte offsets.
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Build a span from `usize` offsets as produced by slice indexing.
    #[inline]
    pub fn from_offsets(start: usize, end: usize) -> Self {
        Self::new(start as u32, end as u32)
    }

    /// Length of this span in bytes.
    #[inline]
    pub const fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Slice `source` with this span, if it lies on valid boundaries.
    pub fn slice<'a>(&self, source: &'a str) -> Option<&'a str> {
        source.get(self.start as usize..self.end as usize)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

//! Inline markup tokenizer.
//!
//! Turns a lightweight markup string such as `"**bold** and [a link](url)"`
//! into the flat marker sequence a Mobiledoc markup section needs,
//! registering every markup it meets in the document's [`MarkupRegistry`].
//!
//! Formatting delimiters toggle: a delimiter whose markup is already open
//! closes it, otherwise it opens it. Delimiters are matched longest first,
//! so `**` wins over `*` and `^^` over `^`:
//!
//! | token | tag    |
//! |-------|--------|
//! | `**`  | `b`    |
//! | `*`   | `i`    |
//! | `~~`  | `s`    |
//! | `^^`  | `sup`  |
//! | `^`   | `sub`  |
//! | `__`  | `u`    |
//! | `` ` ``| `code` |
//!
//! `[text](url)` emits one marker carrying an `a` markup with an `href`
//! attribute; the link never stays open past its own text. A stray `]` is
//! dropped.
//!
//! Scanning jumps from one candidate delimiter byte to the next with
//! `memchr`, so long runs of plain text are copied in one go.

use log::{debug, trace};
use memchr::{memchr, memchr3};

use crate::error::{Error, Result};
use crate::model::{Marker, Markup};
use crate::registry::MarkupRegistry;
use crate::span::Span;

/// Delimiters recognized by the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Bold,
    Italic,
    Strikethrough,
    Superscript,
    Subscript,
    Underline,
    Code,
    LinkOpen,
    LinkClose,
}

impl Delimiter {
    /// Source token for this delimiter.
    pub const fn token(self) -> &'static str {
        match self {
            Delimiter::Bold => "**",
            Delimiter::Italic => "*",
            Delimiter::Strikethrough => "~~",
            Delimiter::Superscript => "^^",
            Delimiter::Subscript => "^",
            Delimiter::Underline => "__",
            Delimiter::Code => "`",
            Delimiter::LinkOpen => "[",
            Delimiter::LinkClose => "]",
        }
    }

    /// Markup tag toggled by this delimiter; `None` for link brackets.
    pub const fn tag(self) -> Option<&'static str> {
        match self {
            Delimiter::Bold => Some("b"),
            Delimiter::Italic => Some("i"),
            Delimiter::Strikethrough => Some("s"),
            Delimiter::Superscript => Some("sup"),
            Delimiter::Subscript => Some("sub"),
            Delimiter::Underline => Some("u"),
            Delimiter::Code => Some("code"),
            Delimiter::LinkOpen | Delimiter::LinkClose => None,
        }
    }

    /// Longest delimiter starting at `pos`, if any.
    #[inline]
    fn at(bytes: &[u8], pos: usize) -> Option<Delimiter> {
        let doubled = |b: u8| bytes.get(pos + 1) == Some(&b);
        match bytes[pos] {
            b'*' if doubled(b'*') => Some(Delimiter::Bold),
            b'*' => Some(Delimiter::Italic),
            b'~' if doubled(b'~') => Some(Delimiter::Strikethrough),
            b'^' if doubled(b'^') => Some(Delimiter::Superscript),
            b'^' => Some(Delimiter::Subscript),
            b'_' if doubled(b'_') => Some(Delimiter::Underline),
            b'`' => Some(Delimiter::Code),
            b'[' => Some(Delimiter::LinkOpen),
            b']' => Some(Delimiter::LinkClose),
            _ => None,
        }
    }
}

/// Tokenize `text` into markers, registering markups in `markups`.
///
/// Either the whole string tokenizes and every markup it needs is
/// registered, or an error is returned and `markups` is left as it was.
///
/// # Errors
///
/// - [`Error::MalformedLink`] when `[` is not followed by `](url)`.
/// - [`Error::UnbalancedMarkup`] when a delimiter is still open at the end.
///
/// # Example
///
/// ```rust
/// use mobiledoc_core::inline::tokenize;
/// use mobiledoc_core::registry::MarkupRegistry;
///
/// let mut markups = MarkupRegistry::new();
/// let markers = tokenize("**a*b*c**", &mut markups).unwrap();
///
/// assert_eq!(markers.len(), 3);
/// assert_eq!(markers[1].open_markups, vec![0, 1]);
/// assert_eq!(markers[2].closed, 1);
/// ```
pub fn tokenize(text: &str, markups: &mut MarkupRegistry) -> Result<Vec<Marker>> {
    let checkpoint = markups.checkpoint();
    let result = Tokenizer::new(text, markups).run();
    if result.is_err() {
        markups.rollback(checkpoint);
    }
    result
}

/// Check that `text` tokenizes, without touching any document.
pub fn validate(text: &str) -> Result<()> {
    let mut scratch = MarkupRegistry::new();
    tokenize(text, &mut scratch).map(|_| ())
}

/// A toggle delimiter currently open.
#[derive(Debug, Clone, Copy)]
struct OpenMarkup {
    index: usize,
    delimiter: Delimiter,
    span: Span,
}

struct Tokenizer<'a, 'r> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    markups: &'r mut MarkupRegistry,
    pending: String,
    stack: Vec<OpenMarkup>,
    /// Open set of the last emitted marker.
    previous_open: Vec<usize>,
    markers: Vec<Marker>,
}

impl<'a, 'r> Tokenizer<'a, 'r> {
    fn new(text: &'a str, markups: &'r mut MarkupRegistry) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            markups,
            pending: String::new(),
            stack: Vec::new(),
            previous_open: Vec::new(),
            markers: Vec::with_capacity(8),
        }
    }

    fn run(mut self) -> Result<Vec<Marker>> {
        while self.pos < self.bytes.len() {
            let next = self.find_next_special();
            // Delimiter bytes are ASCII, so `next` is always a char boundary.
            self.pending.push_str(&self.text[self.pos..next]);
            self.pos = next;
            if self.pos >= self.bytes.len() {
                break;
            }

            match Delimiter::at(self.bytes, self.pos) {
                Some(Delimiter::LinkOpen) => self.link()?,
                Some(Delimiter::LinkClose) => self.pos += 1,
                Some(delimiter) => self.toggle(delimiter),
                None => {
                    // Lone `~` or `_`: plain text.
                    self.pending.push(self.bytes[self.pos] as char);
                    self.pos += 1;
                }
            }
        }

        self.flush();

        if let Some(open) = self.stack.last() {
            return Err(Error::unbalanced_markup(open.delimiter.token(), open.span));
        }

        debug!(
            "tokenized {} bytes into {} markers",
            self.bytes.len(),
            self.markers.len()
        );
        Ok(self.markers)
    }

    #[inline(always)]
    fn find_next_special(&self) -> usize {
        let remaining = &self.bytes[self.pos..];

        let emphasis = memchr3(b'*', b'~', b'^', remaining);
        let other = memchr3(b'_', b'`', b'[', remaining);
        let close = memchr(b']', remaining);

        [emphasis, other, close]
            .into_iter()
            .flatten()
            .min()
            .map_or(self.bytes.len(), |offset| self.pos + offset)
    }

    fn open_indices(&self) -> Vec<usize> {
        self.stack.iter().map(|open| open.index).collect()
    }

    /// Emit a marker with the given open set, counting what closed since
    /// the previous marker.
    fn emit(&mut self, text: String, open: Vec<usize>) {
        let closed = self
            .previous_open
            .iter()
            .filter(|index| !open.contains(*index))
            .count();
        self.previous_open = open.clone();
        self.markers.push(Marker::text(text, open, closed));
    }

    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.pending);
        let open = self.open_indices();
        self.emit(text, open);
    }

    fn toggle(&mut self, delimiter: Delimiter) {
        let Some(tag) = delimiter.tag() else {
            return;
        };
        self.flush();

        let start = self.pos;
        self.pos += delimiter.token().len();
        let index = self.markups.register(Markup::new(tag));

        if let Some(depth) = self.stack.iter().position(|open| open.index == index) {
            trace!("close `{}` at {}", delimiter.token(), start);
            self.stack.remove(depth);
        } else {
            trace!("open `{}` at {}", delimiter.token(), start);
            self.stack.push(OpenMarkup {
                index,
                delimiter,
                span: Span::from_offsets(start, self.pos),
            });
        }
    }

    /// Handle `[text](url)` starting at the current `[`.
    fn link(&mut self) -> Result<()> {
        let start = self.pos;
        let len = self.bytes.len();
        let malformed = |end: usize| Error::malformed_link(self.text, Span::from_offsets(start, end));

        let text_end = match memchr(b']', &self.bytes[start + 1..]) {
            Some(offset) => start + 1 + offset,
            None => return Err(malformed(len)),
        };
        if self.bytes.get(text_end + 1) != Some(&b'(') {
            return Err(malformed(text_end + 1));
        }
        let url_start = text_end + 2;
        let url_end = match memchr(b')', &self.bytes[url_start..]) {
            Some(offset) => url_start + offset,
            None => return Err(malformed(len)),
        };

        let label = self.text[start + 1..text_end].to_string();
        let url = &self.text[url_start..url_end];

        self.flush();
        let index = self.markups.register(Markup::link(url));
        trace!("link to `{}` at {}", url, start);

        let mut open = self.open_indices();
        open.push(index);
        self.emit(label, open);

        self.pos = url_end + 1;
        Ok(())
    }
}

use crate::span::Span;

/// Error kinds for categorizing builder and tokenizer failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A builder method received a value of the wrong shape
    InvalidArgument,
    /// `[text](url)` syntax missing its `]`, `(` or `)`
    MalformedLink,
    /// A formatting delimiter was opened and never closed
    UnbalancedMarkup,
}

/// Errors raised by the document builder and the inline tokenizer.
///
/// Every error is reported synchronously by the call that detects it, and a
/// failing call leaves the document exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Wrong value shape passed to a builder method.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Unterminated link syntax.
    #[error("malformed link `{text}` at bytes {span}")]
    MalformedLink { text: String, span: Span },

    /// Delimiter still open at end of input.
    #[error("unclosed `{delimiter}` opened at bytes {span}")]
    UnbalancedMarkup { delimiter: &'static str, span: Span },
}

impl Error {
    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a malformed link error covering `span` of `source`.
    pub fn malformed_link(source: &str, span: Span) -> Self {
        Self::MalformedLink {
            text: span.slice(source).unwrap_or_default().to_string(),
            span,
        }
    }

    /// Create an error for a delimiter left open at end of input.
    pub fn unbalanced_markup(delimiter: &'static str, span: Span) -> Self {
        Self::UnbalancedMarkup { delimiter, span }
    }

    /// Get the error category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::MalformedLink { .. } => ErrorKind::MalformedLink,
            Self::UnbalancedMarkup { .. } => ErrorKind::UnbalancedMarkup,
        }
    }

    /// Location in the tokenizer input, for tokenizer errors.
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::InvalidArgument { .. } => None,
            Self::MalformedLink { span, .. } | Self::UnbalancedMarkup { span, .. } => Some(*span),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

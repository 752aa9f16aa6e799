//! # Mobiledoc Core
//!
//! Builds documents in the [Mobiledoc](https://github.com/bustle/mobiledoc-kit)
//! interchange format: a versioned JSON structure of sections made of
//! markers, markups, atoms and cards.
//!
//! ## Quick Start
//!
//! ```rust
//! use mobiledoc_core::Mobiledoc;
//!
//! let mut doc = Mobiledoc::new();
//! doc.add_paragraph("This is plain text.");
//! doc.add_formatted_paragraph("Using **markdown-like** syntax, you can *format* text.")
//!     .unwrap();
//! doc.add_image("https://placehold.co/600x400", Some("An image"));
//! doc.set_custom("ghostVersion", "4.0").unwrap();
//!
//! let value = doc.to_value();
//! assert_eq!(value["markups"], serde_json::json!([["b"], ["i"]]));
//! assert_eq!(value["ghostVersion"], "4.0");
//! ```
//!
//! ## Inline Markup
//!
//! Formatted paragraphs understand `**bold**`, `*italic*`, `~~strike~~`,
//! `^^sup^^`, `^sub^`, `__underline__`, `` `code` `` and `[text](url)`.
//! Unclosed delimiters and broken links are errors:
//!
//! ```rust
//! use mobiledoc_core::{ErrorKind, Mobiledoc};
//!
//! let mut doc = Mobiledoc::new();
//! let err = doc.add_formatted_paragraph("**unclosed").unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::UnbalancedMarkup);
//! assert!(doc.sections().is_empty());
//! ```

pub mod cards;
pub mod document;
pub mod error;
pub mod html;
pub mod inline;
pub mod model;
pub mod registry;
pub mod serialize;
pub mod span;

pub use cards::FileCard;
pub use document::{Mobiledoc, TextInput, MOBILEDOC_VERSION, RESERVED_KEYS};
pub use error::{Error, ErrorKind, Result};
pub use html::{html_to_markdown, BasicConverter, HtmlToMarkdown};
pub use model::{Atom, Card, Marker, MarkerValue, Markup, Section};
pub use serialize::serialize;

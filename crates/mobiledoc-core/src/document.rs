//! The document being built.
//!
//! [`Mobiledoc`] owns the markup and card registries, the atom list, the
//! section sequence and any custom top-level data. Every builder call
//! appends to it; nothing is ever removed.

use indexmap::IndexMap;
use log::{debug, warn};
use serde_json::{Map, Value};

use crate::cards::{self, FileCard};
use crate::error::{Error, Result};
use crate::html::{BasicConverter, HtmlToMarkdown};
use crate::inline;
use crate::model::{Atom, Card, CardSection, Marker, MarkerValue, MarkupSection, Section};
use crate::registry::{CardRegistry, MarkupRegistry};

/// Mobiledoc format version written by default.
pub const MOBILEDOC_VERSION: &str = "0.3.2";

/// Top-level keys owned by the format; custom data may not use them.
pub const RESERVED_KEYS: [&str; 5] = ["version", "markups", "atoms", "cards", "sections"];

/// Text accepted by the paragraph builders: one string or several.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextInput {
    One(String),
    Many(Vec<String>),
}

impl TextInput {
    fn into_vec(self) -> Vec<String> {
        match self {
            TextInput::One(text) => vec![text],
            TextInput::Many(texts) => texts,
        }
    }
}

impl From<&str> for TextInput {
    fn from(text: &str) -> Self {
        TextInput::One(text.to_string())
    }
}

impl From<String> for TextInput {
    fn from(text: String) -> Self {
        TextInput::One(text)
    }
}

impl From<Vec<String>> for TextInput {
    fn from(texts: Vec<String>) -> Self {
        TextInput::Many(texts)
    }
}

impl From<Vec<&str>> for TextInput {
    fn from(texts: Vec<&str>) -> Self {
        TextInput::Many(texts.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for TextInput {
    fn from(texts: &[&str]) -> Self {
        TextInput::Many(texts.iter().map(|t| t.to_string()).collect())
    }
}

impl TryFrom<Value> for TextInput {
    type Error = Error;

    /// Accepts a JSON string or an array of strings.
    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::String(text) => Ok(TextInput::One(text)),
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| match item {
                    Value::String(text) => Ok(text),
                    other => Err(Error::invalid_argument(format!(
                        "expected text at position {i}, found {}",
                        json_type(&other)
                    ))),
                })
                .collect::<Result<Vec<_>>>()
                .map(TextInput::Many),
            other => Err(Error::invalid_argument(format!(
                "expected text or a list of text, found {}",
                json_type(&other)
            ))),
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "text",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

/// A Mobiledoc document under construction.
///
/// # Example
///
/// ```rust
/// use mobiledoc_core::Mobiledoc;
///
/// let mut doc = Mobiledoc::new();
/// doc.add_paragraph("Plain text.");
/// doc.add_formatted_paragraph("Some **bold** text.").unwrap();
/// doc.add_divider();
///
/// let json = doc.to_json();
/// assert!(json.starts_with(r#"{"version":"0.3.2","markups":[["b"]]"#));
/// ```
#[derive(Debug, Clone)]
pub struct Mobiledoc {
    version: String,
    markups: MarkupRegistry,
    atoms: Vec<Atom>,
    cards: CardRegistry,
    sections: Vec<Section>,
    custom: IndexMap<String, Value>,
}

impl Mobiledoc {
    /// Empty document at the default format version.
    pub fn new() -> Self {
        Self::with_version(MOBILEDOC_VERSION)
    }

    /// Empty document declaring another format version.
    pub fn with_version(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            markups: MarkupRegistry::new(),
            atoms: Vec::new(),
            cards: CardRegistry::new(),
            sections: Vec::new(),
            custom: IndexMap::new(),
        }
    }

    // =========================================================================
    // Paragraphs
    // =========================================================================

    /// Append unformatted paragraphs, one `"p"` section per string.
    pub fn add_paragraph(&mut self, text: impl Into<TextInput>) {
        for text in text.into().into_vec() {
            self.push_section(Section::Markup(MarkupSection::paragraph(vec![
                Marker::plain(text),
            ])));
        }
    }

    /// Append paragraphs whose text uses inline markup syntax.
    ///
    /// All strings are tokenized before anything is appended; if any of them
    /// fails, the document is left exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedLink`] or [`Error::UnbalancedMarkup`] from
    /// the first string that does not tokenize.
    pub fn add_formatted_paragraph(&mut self, text: impl Into<TextInput>) -> Result<()> {
        let checkpoint = self.markups.checkpoint();
        let mut sections = Vec::new();

        for text in text.into().into_vec() {
            match inline::tokenize(&text, &mut self.markups) {
                Ok(markers) => sections.push(Section::Markup(MarkupSection::paragraph(markers))),
                Err(err) => {
                    warn!("rejected formatted paragraph: {}", err);
                    self.markups.rollback(checkpoint);
                    return Err(err);
                }
            }
        }

        for section in sections {
            self.push_section(section);
        }
        Ok(())
    }

    /// Append a markup section built by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when a marker references a markup
    /// or atom that does not exist in this document.
    pub fn add_markup_section(&mut self, tag: impl Into<String>, markers: Vec<Marker>) -> Result<()> {
        for (i, marker) in markers.iter().enumerate() {
            if let Some(bad) = marker
                .open_markups
                .iter()
                .find(|index| !self.markups.contains_index(**index))
            {
                return Err(Error::invalid_argument(format!(
                    "marker {i} opens unknown markup {bad}"
                )));
            }
            if let MarkerValue::Atom(atom) = marker.value {
                if atom >= self.atoms.len() {
                    return Err(Error::invalid_argument(format!(
                        "marker {i} references unknown atom {atom}"
                    )));
                }
            }
        }

        self.push_section(Section::Markup(MarkupSection {
            tag: tag.into(),
            markers,
        }));
        Ok(())
    }

    // =========================================================================
    // Atoms and cards
    // =========================================================================

    /// Append an atom, returning its index for use in atom markers.
    pub fn add_atom(&mut self, atom: Atom) -> usize {
        self.atoms.push(atom);
        self.atoms.len() - 1
    }

    /// Register `card` and append a section pointing at it.
    ///
    /// Returns the card's index; an identical card added earlier is reused.
    pub fn add_card(&mut self, card: Card) -> usize {
        let name = card.name.clone();
        let index = self.cards.register(card);
        debug!("card `{}` at index {}", name, index);
        self.push_section(Section::Card(CardSection { card: index }));
        index
    }

    /// Append a card from a name and a payload object.
    pub fn add_card_with(&mut self, name: &str, payload: Map<String, Value>) -> usize {
        self.add_card(Card::new(name, payload))
    }

    pub fn add_divider(&mut self) -> usize {
        self.add_card(cards::divider())
    }

    pub fn add_image(&mut self, src: &str, caption: Option<&str>) -> usize {
        self.add_card(cards::image(src, caption))
    }

    pub fn add_button(&mut self, text: &str, url: &str, alignment: Option<&str>) -> usize {
        self.add_card(cards::button(text, url, alignment))
    }

    pub fn add_html(&mut self, html: &str) -> usize {
        self.add_card(cards::html(html))
    }

    pub fn add_markdown(&mut self, markdown: &str) -> usize {
        self.add_card(cards::markdown(markdown))
    }

    pub fn add_file(&mut self, file: FileCard) -> usize {
        self.add_card(file.into_card())
    }

    pub fn add_callout(&mut self, text: &str, emoji: Option<&str>, color: Option<&str>) -> usize {
        self.add_card(cards::callout(text, emoji, color))
    }

    /// Convert `html` with the built-in converter and add it as a markdown card.
    pub fn add_markdown_from_html(&mut self, html: &str) -> usize {
        self.add_markdown_from_html_with(&BasicConverter, html)
    }

    /// Convert `html` with `converter` and add it as a markdown card.
    pub fn add_markdown_from_html_with<C>(&mut self, converter: &C, html: &str) -> usize
    where
        C: HtmlToMarkdown + ?Sized,
    {
        let markdown = converter.convert(html);
        self.add_markdown(&markdown)
    }

    // =========================================================================
    // Custom data
    // =========================================================================

    /// Set a custom top-level value, replacing any earlier value for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when `name` is one of
    /// [`RESERVED_KEYS`]; the document is not changed.
    pub fn set_custom(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Result<()> {
        let name = name.into();
        if RESERVED_KEYS.contains(&name.as_str()) {
            warn!("refusing custom key `{}`", name);
            return Err(Error::invalid_argument(format!(
                "`{name}` is a reserved document key"
            )));
        }
        self.custom.insert(name, value.into());
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn markups(&self) -> &MarkupRegistry {
        &self.markups
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn cards(&self) -> &CardRegistry {
        &self.cards
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn custom(&self) -> &IndexMap<String, Value> {
        &self.custom
    }

    fn push_section(&mut self, section: Section) {
        self.sections.push(section);
        debug!("document now has {} sections", self.sections.len());
    }
}

impl Default for Mobiledoc {
    fn default() -> Self {
        Self::new()
    }
}

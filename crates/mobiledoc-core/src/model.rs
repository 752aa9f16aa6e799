//! Document model types.
//!
//! These are the building blocks a [`Mobiledoc`](crate::Mobiledoc) is made of:
//!
//! - [`Markup`]: inline formatting, referenced by index from markers
//! - [`Atom`]: inline embed, referenced by index from atom markers
//! - [`Card`]: block embed, referenced by index from card sections
//! - [`Section`]: either a run of markers under a block tag, or a card
//! - [`Marker`]: one span of text (or one atom) plus its markup bookkeeping
//!
//! The numeric discriminants of the wire format (`1`/`10` for sections,
//! `0`/`1` for markers) never appear here; they are produced by
//! [`serialize`](crate::serialize).

use serde_json::{Map, Value};

use crate::registry::Registrable;

/// Block tag used by paragraph sections.
pub const PARAGRAPH_TAG: &str = "p";

/// Inline formatting descriptor: a tag plus optional attribute pairs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Markup {
    /// Tag name, e.g. `"b"` or `"a"`.
    pub tag: String,
    /// Attribute key/value pairs in declaration order.
    pub attributes: Vec<(String, String)>,
}

impl Markup {
    /// A markup with no attributes.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
        }
    }

    /// A link markup carrying an `href` attribute.
    pub fn link(href: impl Into<String>) -> Self {
        Self::new("a").with_attribute("href", href)
    }

    /// Append an attribute pair.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Look up the first attribute with the given key.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl Registrable for Markup {
    fn registry_key(&self) -> String {
        // Attribute order is significant, so the plain encoding is canonical.
        let mut key = self.tag.clone();
        for (k, v) in &self.attributes {
            key.push('\u{0}');
            key.push_str(k);
            key.push('\u{0}');
            key.push_str(v);
        }
        key
    }
}

/// Inline embed: a type name, its display text and an opaque payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub name: String,
    pub text: String,
    pub payload: Value,
}

impl Atom {
    pub fn new(name: impl Into<String>, text: impl Into<String>, payload: Value) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            payload,
        }
    }
}

/// Block embed: a card name plus its payload object.
///
/// Two cards are equal when their names match and their payloads hold the
/// same entries, regardless of key order.
#[derive(Debug, Clone)]
pub struct Card {
    pub name: String,
    pub payload: Map<String, Value>,
}

impl Card {
    pub fn new(name: impl Into<String>, payload: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }
}

impl PartialEq for Card {
    fn eq(&self, other: &Self) -> bool {
        self.registry_key() == other.registry_key()
    }
}

impl Registrable for Card {
    fn registry_key(&self) -> String {
        let mut key = self.name.clone();
        key.push('\u{0}');
        write_canonical(&mut key, &Value::Object(self.payload.clone()));
        key
    }
}

/// Write `value` as JSON with object keys sorted at every level.
fn write_canonical(out: &mut String, value: &Value) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (k, v)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(k.clone()).to_string());
                out.push(':');
                write_canonical(out, v);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(out, item);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// A top-level section of the document.
#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    /// Block of text markers under a block tag (`"p"`).
    Markup(MarkupSection),
    /// Reference to an entry of the card list.
    Card(CardSection),
}

impl Section {
    /// Markers of a markup section, or an empty slice for cards.
    pub fn markers(&self) -> &[Marker] {
        match self {
            Section::Markup(section) => &section.markers,
            Section::Card(_) => &[],
        }
    }
}

/// Text section: block tag plus its markers in order.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkupSection {
    pub tag: String,
    pub markers: Vec<Marker>,
}

impl MarkupSection {
    /// A `"p"` section.
    pub fn paragraph(markers: Vec<Marker>) -> Self {
        Self {
            tag: PARAGRAPH_TAG.to_string(),
            markers,
        }
    }
}

/// Card section: index into the document's card list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardSection {
    pub card: usize,
}

/// Content carried by a marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerValue {
    /// Literal text.
    Text(String),
    /// Index into the document's atom list.
    Atom(usize),
}

/// One span of a markup section.
///
/// `open_markups` lists the markup indices active over this marker,
/// outermost first. `closed` counts the markups that were active over the
/// previous marker of the same section but are no longer active here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub value: MarkerValue,
    pub open_markups: Vec<usize>,
    pub closed: usize,
}

impl Marker {
    /// Text marker with explicit markup bookkeeping.
    pub fn text(text: impl Into<String>, open_markups: Vec<usize>, closed: usize) -> Self {
        Self {
            value: MarkerValue::Text(text.into()),
            open_markups,
            closed,
        }
    }

    /// Unformatted text marker.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::text(text, Vec::new(), 0)
    }

    /// Atom marker referencing `atom` in the document's atom list.
    pub fn atom(atom: usize, open_markups: Vec<usize>, closed: usize) -> Self {
        Self {
            value: MarkerValue::Atom(atom),
            open_markups,
            closed,
        }
    }

    /// The literal text of a text marker.
    pub fn as_text(&self) -> Option<&str> {
        match &self.value {
            MarkerValue::Text(text) => Some(text),
            MarkerValue::Atom(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_card_equality_ignores_key_order() {
        let a = Card::new("button", payload(json!({"text": "Go", "url": "u"})));
        let b = Card::new("button", payload(json!({"url": "u", "text": "Go"})));
        assert_eq!(a, b);
        assert_eq!(a.registry_key(), b.registry_key());
    }

    #[test]
    fn test_card_nested_payload_is_canonical() {
        let a = Card::new("x", payload(json!({"n": {"b": 1, "a": [1, {"d": 2, "c": 3}]}})));
        let b = Card::new("x", payload(json!({"n": {"a": [1, {"c": 3, "d": 2}], "b": 1}})));
        assert_eq!(a, b);
    }

    #[test]
    fn test_card_name_distinguishes() {
        let a = Card::new("html", Map::new());
        let b = Card::new("hr", Map::new());
        assert_ne!(a, b);
    }

    #[test]
    fn test_markup_attribute_order_is_significant() {
        let a = Markup::new("a").with_attribute("href", "x").with_attribute("rel", "y");
        let b = Markup::new("a").with_attribute("rel", "y").with_attribute("href", "x");
        assert_ne!(a.registry_key(), b.registry_key());
        assert_eq!(a.attribute("rel"), Some("y"));
    }

    #[test]
    fn test_markup_key_does_not_collide_with_tag_text() {
        let plain = Markup::new("ahref");
        let link = Markup::new("a").with_attribute("href", "");
        assert_ne!(plain.registry_key(), link.registry_key());
    }
}

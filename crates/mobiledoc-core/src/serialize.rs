//! Flattening a [`Mobiledoc`] into its JSON wire format.
//!
//! ```text
//! {
//!   "version":  "0.3.2",
//!   "markups":  [[tag], [tag, [key, value, ...]], ...],
//!   "atoms":    [[name, text, payload], ...],
//!   "cards":    [[name, payload], ...],
//!   "sections": [[1, tag, markers] | [10, card], ...],
//!   ...custom keys
//! }
//! ```
//!
//! A marker is `[0, open, closed, text]` for text and
//! `[1, open, closed, atom]` for atoms. These integer tags only exist here.

use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

use crate::document::Mobiledoc;
use crate::model::{Atom, Card, Marker, MarkerValue, Markup, Section};

const MARKUP_SECTION: u8 = 1;
const CARD_SECTION: u8 = 10;
const TEXT_MARKER: u8 = 0;
const ATOM_MARKER: u8 = 1;

/// Serialize `doc` into a JSON object.
///
/// Reads the document without changing it; the same document state always
/// yields the same value, keys in the order `version`, `markups`, `atoms`,
/// `cards`, `sections`, then custom keys in the order they were first set.
pub fn serialize(doc: &Mobiledoc) -> Value {
    let mut out = Map::new();
    out.insert("version".to_string(), Value::from(doc.version()));
    out.insert(
        "markups".to_string(),
        doc.markups().iter().map(markup_value).collect(),
    );
    out.insert("atoms".to_string(), doc.atoms().iter().map(atom_value).collect());
    out.insert("cards".to_string(), doc.cards().iter().map(card_value).collect());
    out.insert(
        "sections".to_string(),
        doc.sections().iter().map(section_value).collect(),
    );
    for (key, value) in doc.custom() {
        out.insert(key.clone(), value.clone());
    }
    Value::Object(out)
}

fn markup_value(markup: &Markup) -> Value {
    if markup.attributes.is_empty() {
        return json!([markup.tag]);
    }
    let attributes: Vec<&str> = markup
        .attributes
        .iter()
        .flat_map(|(k, v)| [k.as_str(), v.as_str()])
        .collect();
    json!([markup.tag, attributes])
}

fn atom_value(atom: &Atom) -> Value {
    json!([atom.name, atom.text, atom.payload])
}

fn card_value(card: &Card) -> Value {
    json!([card.name, card.payload])
}

fn section_value(section: &Section) -> Value {
    match section {
        Section::Markup(section) => json!([
            MARKUP_SECTION,
            section.tag,
            section.markers.iter().map(marker_value).collect::<Vec<_>>()
        ]),
        Section::Card(section) => json!([CARD_SECTION, section.card]),
    }
}

fn marker_value(marker: &Marker) -> Value {
    match &marker.value {
        MarkerValue::Text(text) => json!([TEXT_MARKER, marker.open_markups, marker.closed, text]),
        MarkerValue::Atom(atom) => json!([ATOM_MARKER, marker.open_markups, marker.closed, atom]),
    }
}

impl Mobiledoc {
    /// The serialized document as a JSON value. See [`serialize`].
    pub fn to_value(&self) -> Value {
        serialize(self)
    }

    /// Compact JSON text.
    pub fn to_json(&self) -> String {
        self.to_value().to_string()
    }

    /// Indented JSON text.
    pub fn to_json_pretty(&self) -> String {
        // Writing a `Value` into a `String` cannot fail.
        serde_json::to_string_pretty(&self.to_value()).unwrap_or_default()
    }
}

impl Serialize for Mobiledoc {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize(self).serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Markup;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_markup_encoding() {
        assert_eq!(markup_value(&Markup::new("b")), json!(["b"]));
        assert_eq!(
            markup_value(&Markup::link("https://x.test").with_attribute("rel", "nofollow")),
            json!(["a", ["href", "https://x.test", "rel", "nofollow"]])
        );
    }

    #[test]
    fn test_marker_encoding() {
        assert_eq!(
            marker_value(&Marker::text("hi", vec![0, 2], 1)),
            json!([0, [0, 2], 1, "hi"])
        );
        assert_eq!(marker_value(&Marker::atom(3, vec![], 0)), json!([1, [], 0, 3]));
    }

    #[test]
    fn test_empty_document() {
        let doc = Mobiledoc::new();
        assert_eq!(
            doc.to_json(),
            r#"{"version":"0.3.2","markups":[],"atoms":[],"cards":[],"sections":[]}"#
        );
    }
}

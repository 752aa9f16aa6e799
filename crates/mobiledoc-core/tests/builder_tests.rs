//! Integration tests for the Mobiledoc builder

use mobiledoc_core::model::{CardSection, MarkupSection};
use mobiledoc_core::{
    Atom, ErrorKind, FileCard, Marker, Mobiledoc, Section, TextInput, RESERVED_KEYS,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Map, Value};

fn markers(doc: &Mobiledoc, section: usize) -> &[Marker] {
    doc.sections()[section].markers()
}

// ============================================================================
// Paragraph Tests
// ============================================================================

#[test]
fn test_add_paragraph_single() {
    let mut doc = Mobiledoc::new();
    doc.add_paragraph("This is a basic text, which is not formatted.");

    assert_eq!(
        doc.to_value()["sections"],
        json!([[1, "p", [[0, [], 0, "This is a basic text, which is not formatted."]]]])
    );
}

#[test]
fn test_add_paragraph_list_makes_one_section_each() {
    let mut doc = Mobiledoc::new();
    doc.add_paragraph(vec!["First.", "Second.", "Third."]);

    assert_eq!(doc.sections().len(), 3);
    let texts: Vec<_> = doc
        .sections()
        .iter()
        .map(|s| s.markers()[0].as_text().unwrap())
        .collect();
    assert_eq!(texts, vec!["First.", "Second.", "Third."]);
}

#[test]
fn test_add_paragraph_does_not_interpret_markup() {
    let mut doc = Mobiledoc::new();
    doc.add_paragraph("**not bold** [nor](link");
    assert!(doc.markups().is_empty());
    assert_eq!(markers(&doc, 0), &[Marker::plain("**not bold** [nor](link")]);
}

#[test]
fn test_add_paragraph_from_json_value() {
    let mut doc = Mobiledoc::new();
    doc.add_paragraph(TextInput::try_from(json!(["a", "b"])).unwrap());
    assert_eq!(doc.sections().len(), 2);

    let err = TextInput::try_from(json!(42)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

// ============================================================================
// Formatted Paragraph Tests
// ============================================================================

#[test]
fn test_bold_then_italic() {
    let mut doc = Mobiledoc::new();
    doc.add_formatted_paragraph("**bold** *italic*").unwrap();

    let value = doc.to_value();
    assert_eq!(value["markups"], json!([["b"], ["i"]]));
    assert_eq!(
        value["sections"],
        json!([[1, "p", [
            [0, [0], 0, "bold"],
            [0, [], 1, " "],
            [0, [1], 0, "italic"]
        ]]])
    );
}

#[test]
fn test_nested_bold_italic() {
    let mut doc = Mobiledoc::new();
    doc.add_formatted_paragraph("**a*b*c**").unwrap();

    assert_eq!(
        markers(&doc, 0),
        &[
            Marker::text("a", vec![0], 0),
            Marker::text("b", vec![0, 1], 0),
            Marker::text("c", vec![0], 1),
        ]
    );
}

#[test]
fn test_link_extraction() {
    let mut doc = Mobiledoc::new();
    doc.add_formatted_paragraph("[go](https://x.test)").unwrap();

    let value = doc.to_value();
    assert_eq!(value["markups"], json!([["a", ["href", "https://x.test"]]]));
    assert_eq!(value["sections"], json!([[1, "p", [[0, [0], 0, "go"]]]]));
}

#[test]
fn test_markups_shared_across_paragraphs() {
    let mut doc = Mobiledoc::new();
    doc.add_formatted_paragraph(vec![
        "You may also add a `list of strings`.",
        "To ^add^ ^^multiple^^ paragraphs.",
        "And **`code`** again.",
    ])
    .unwrap();

    let tags: Vec<_> = doc.markups().iter().map(|m| m.tag.as_str()).collect();
    assert_eq!(tags, vec!["code", "sub", "sup", "b"]);
    assert_eq!(doc.sections().len(), 3);
    assert_eq!(markers(&doc, 2)[1], Marker::text("code", vec![3, 0], 0));
}

#[test]
fn test_same_link_reuses_markup() {
    let mut doc = Mobiledoc::new();
    doc.add_formatted_paragraph("[a](u) and [b](u) and [c](v)").unwrap();
    assert_eq!(doc.markups().len(), 2);
    let opens: Vec<_> = markers(&doc, 0)
        .iter()
        .map(|m| m.open_markups.clone())
        .collect();
    assert_eq!(opens, vec![vec![0], vec![], vec![0], vec![], vec![1]]);
}

#[test]
fn test_unbalanced_markup_error() {
    let mut doc = Mobiledoc::new();
    let err = doc.add_formatted_paragraph("**unclosed").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnbalancedMarkup);
}

#[test]
fn test_malformed_link_error() {
    let mut doc = Mobiledoc::new();
    let err = doc.add_formatted_paragraph("[x](y").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedLink);
    assert_eq!(err.to_string(), "malformed link `[x](y` at bytes 0..5");
}

#[test]
fn test_failed_call_leaves_document_untouched() {
    let mut doc = Mobiledoc::new();
    doc.add_formatted_paragraph("**kept**").unwrap();
    let before = doc.to_json();

    // The first string is fine and registers `i` and a link; the second fails.
    let err = doc
        .add_formatted_paragraph(vec!["*fine* [x](u)", "~~broken"])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnbalancedMarkup);
    assert_eq!(doc.to_json(), before);
    assert_eq!(doc.markups().len(), 1);
    assert_eq!(doc.sections().len(), 1);
}

// ============================================================================
// Card Tests
// ============================================================================

#[test]
fn test_two_dividers_share_one_card() {
    let mut doc = Mobiledoc::new();
    assert_eq!(doc.add_divider(), 0);
    assert_eq!(doc.add_divider(), 0);

    let value = doc.to_value();
    assert_eq!(value["cards"], json!([["hr", {}]]));
    assert_eq!(value["sections"], json!([[10, 0], [10, 0]]));
    assert_eq!(
        doc.sections(),
        &[
            Section::Card(CardSection { card: 0 }),
            Section::Card(CardSection { card: 0 })
        ]
    );
}

#[test]
fn test_card_builders_payloads() {
    let mut doc = Mobiledoc::new();
    doc.add_image("https://placehold.co/600x400", Some("You can add images!"));
    doc.add_button("Click", "https://python.org", None);
    doc.add_html("<ul><li>HTML</li></ul>");
    doc.add_markdown("You can add **raw markdown**");
    doc.add_file(FileCard::new("https://x.test/f", "filename", "filetitle", 1000));
    doc.add_callout("You can add callouts!", Some("🔥"), None);

    assert_eq!(
        doc.to_value()["cards"],
        json!([
            ["image", {"src": "https://placehold.co/600x400", "caption": "You can add images!"}],
            ["button", {"text": "Click", "url": "https://python.org", "alignment": "center"}],
            ["html", {"html": "<ul><li>HTML</li></ul>"}],
            ["markdown", {"markdown": "You can add **raw markdown**"}],
            ["file", {
                "src": "https://x.test/f",
                "fileName": "filename",
                "fileTitle": "filetitle",
                "fileCaption": "",
                "fileSize": 1000
            }],
            ["callout", {"calloutEmoji": "🔥", "calloutText": "You can add callouts!", "backgroundColor": "accent"}]
        ])
    );
    assert_eq!(doc.sections().len(), 6);
}

#[test]
fn test_card_dedup_ignores_payload_key_order() {
    let mut doc = Mobiledoc::new();
    let mut first = Map::new();
    first.insert("a".to_string(), json!(1));
    first.insert("b".to_string(), json!(2));
    let mut second = Map::new();
    second.insert("b".to_string(), json!(2));
    second.insert("a".to_string(), json!(1));

    assert_eq!(doc.add_card_with("custom", first), 0);
    assert_eq!(doc.add_card_with("custom", second), 0);
    assert_eq!(doc.cards().len(), 1);
    // The first registration's key order is what gets written.
    assert!(doc.to_json().contains(r#"["custom",{"a":1,"b":2}]"#));
}

#[test]
fn test_different_images_are_distinct_cards() {
    let mut doc = Mobiledoc::new();
    assert_eq!(doc.add_image("a.png", None), 0);
    assert_eq!(doc.add_image("b.png", None), 1);
    assert_eq!(doc.add_image("a.png", Some("captioned")), 2);
    assert_eq!(doc.add_image("a.png", None), 0);
}

#[test]
fn test_markdown_from_html() {
    let mut doc = Mobiledoc::new();
    doc.add_markdown_from_html(r#"<b>Hello</b> <a href="http://github.com">GitHub</a>"#);
    assert_eq!(
        doc.to_value()["cards"],
        json!([["markdown", {"markdown": "**Hello** [GitHub](http://github.com)"}]])
    );
}

#[test]
fn test_markdown_from_html_with_custom_converter() {
    let mut doc = Mobiledoc::new();
    let strip = |html: &str| html.replace("<p>", "").replace("</p>", "");
    doc.add_markdown_from_html_with(&strip, "<p>text</p>");
    assert_eq!(doc.cards().get(0).unwrap().payload["markdown"], "text");
}

// ============================================================================
// Atoms and Raw Sections
// ============================================================================

#[test]
fn test_atom_marker_section() {
    let mut doc = Mobiledoc::new();
    doc.add_formatted_paragraph("**x**").unwrap();
    let atom = doc.add_atom(Atom::new("mention", "@bob", json!({"id": 7})));

    doc.add_markup_section(
        "p",
        vec![
            Marker::text("hi ", vec![], 0),
            Marker::atom(atom, vec![0], 0),
        ],
    )
    .unwrap();

    let value = doc.to_value();
    assert_eq!(value["atoms"], json!([["mention", "@bob", {"id": 7}]]));
    assert_eq!(value["sections"][1], json!([1, "p", [[0, [], 0, "hi "], [1, [0], 0, 0]]]));
}

#[test]
fn test_markup_section_rejects_dangling_indices() {
    let mut doc = Mobiledoc::new();
    let err = doc
        .add_markup_section("p", vec![Marker::text("x", vec![0], 0)])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = doc
        .add_markup_section("p", vec![Marker::atom(0, vec![], 0)])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(doc.sections().is_empty());
}

#[test]
fn test_markup_section_with_custom_tag() {
    let mut doc = Mobiledoc::new();
    doc.add_markup_section("h2", vec![Marker::plain("Title")]).unwrap();
    assert_eq!(
        doc.sections()[0],
        Section::Markup(MarkupSection {
            tag: "h2".to_string(),
            markers: vec![Marker::plain("Title")],
        })
    );
}

// ============================================================================
// Custom Data and Serialization
// ============================================================================

#[test]
fn test_custom_data_merged_at_top_level() {
    let mut doc = Mobiledoc::new();
    doc.set_custom("foo", 1).unwrap();

    let value = doc.to_value();
    let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys, vec!["version", "markups", "atoms", "cards", "sections", "foo"]);
    assert_eq!(value["foo"], json!(1));
}

#[test]
fn test_reserved_custom_keys_rejected() {
    let mut doc = Mobiledoc::new();
    for key in RESERVED_KEYS {
        let err = doc.set_custom(key, "x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }
    assert!(doc.custom().is_empty());
    assert_eq!(doc.to_value()["version"], "0.3.2");
}

#[test]
fn test_serialization_is_deterministic_and_read_only() {
    let mut doc = Mobiledoc::with_version("0.3.1");
    doc.add_paragraph("a");
    doc.add_formatted_paragraph("*b* [c](d)").unwrap();
    doc.add_callout("e", None, Some("grey"));
    doc.set_custom("meta", json!({"z": 1, "a": [1, 2]})).unwrap();

    let first = doc.to_json();
    let second = doc.to_json();
    assert_eq!(first, second);
    assert_eq!(serde_json::to_string(&doc).unwrap(), first);
    assert_eq!(doc.sections().len(), 3);

    let reparsed: Value = serde_json::from_str(&doc.to_json_pretty()).unwrap();
    assert_eq!(reparsed, doc.to_value());
    assert_eq!(reparsed["version"], "0.3.1");
}

#[test]
fn test_independent_documents() {
    let mut a = Mobiledoc::new();
    let mut b = Mobiledoc::new();
    a.add_formatted_paragraph("*x*").unwrap();
    b.add_formatted_paragraph("**y**").unwrap();
    assert_eq!(a.to_value()["markups"], json!([["i"]]));
    assert_eq!(b.to_value()["markups"], json!([["b"]]));
}

#[test]
fn test_full_document() {
    let mut doc = Mobiledoc::new();
    doc.add_paragraph("Plain.");
    doc.add_divider();
    doc.add_formatted_paragraph("Using **markdown-like** syntax, you can *format* the text.")
        .unwrap();
    doc.add_formatted_paragraph("You can also add [hyperlinks](https://python.org).")
        .unwrap();
    doc.add_button("Button", "https://python.org", None);

    let expected = json!({
        "version": "0.3.2",
        "markups": [["b"], ["i"], ["a", ["href", "https://python.org"]]],
        "atoms": [],
        "cards": [["hr", {}], ["button", {"text": "Button", "url": "https://python.org", "alignment": "center"}]],
        "sections": [
            [1, "p", [[0, [], 0, "Plain."]]],
            [10, 0],
            [1, "p", [
                [0, [], 0, "Using "],
                [0, [0], 0, "markdown-like"],
                [0, [], 1, " syntax, you can "],
                [0, [1], 0, "format"],
                [0, [], 1, " the text."]
            ]],
            [1, "p", [
                [0, [], 0, "You can also add "],
                [0, [2], 0, "hyperlinks"],
                [0, [], 1, "."]
            ]],
            [10, 1]
        ]
    });
    assert_eq!(doc.to_value(), expected);
}

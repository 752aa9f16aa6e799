//! Payload builders for the standard card types.
//!
//! Each function returns a [`Card`] ready to be registered; payload keys are
//! written in the order renderers expect to see them.

use serde_json::{json, Map, Value};

use crate::model::Card;

/// Default button alignment.
pub const DEFAULT_ALIGNMENT: &str = "center";

/// Default callout background color.
pub const DEFAULT_CALLOUT_COLOR: &str = "accent";

fn card(name: &str, payload: Value) -> Card {
    let payload = match payload {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    Card::new(name, payload)
}

/// Horizontal rule.
pub fn divider() -> Card {
    Card::new("hr", Map::new())
}

/// Image with an optional caption. An empty caption is left out.
pub fn image(src: &str, caption: Option<&str>) -> Card {
    let mut payload = json!({ "src": src });
    if let Some(caption) = caption.filter(|c| !c.is_empty()) {
        payload["caption"] = Value::from(caption);
    }
    card("image", payload)
}

/// Call-to-action button, centered unless `alignment` says otherwise.
pub fn button(text: &str, url: &str, alignment: Option<&str>) -> Card {
    card(
        "button",
        json!({
            "text": text,
            "url": url,
            "alignment": alignment.unwrap_or(DEFAULT_ALIGNMENT),
        }),
    )
}

/// Raw HTML block.
pub fn html(html: &str) -> Card {
    card("html", json!({ "html": html }))
}

/// Raw markdown block.
pub fn markdown(markdown: &str) -> Card {
    card("markdown", json!({ "markdown": markdown }))
}

/// Callout box. Defaults: no emoji, `"accent"` background.
pub fn callout(text: &str, emoji: Option<&str>, color: Option<&str>) -> Card {
    card(
        "callout",
        json!({
            "calloutEmoji": emoji.unwrap_or(""),
            "calloutText": text,
            "backgroundColor": color.unwrap_or(DEFAULT_CALLOUT_COLOR),
        }),
    )
}

/// Downloadable file attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCard {
    pub src: String,
    pub file_name: String,
    pub file_title: String,
    /// Empty when not given.
    pub file_caption: String,
    /// Size in bytes.
    pub file_size: u64,
}

impl FileCard {
    pub fn new(
        src: impl Into<String>,
        file_name: impl Into<String>,
        file_title: impl Into<String>,
        file_size: u64,
    ) -> Self {
        Self {
            src: src.into(),
            file_name: file_name.into(),
            file_title: file_title.into(),
            file_caption: String::new(),
            file_size,
        }
    }

    /// Set the caption shown under the file.
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.file_caption = caption.into();
        self
    }

    pub fn into_card(self) -> Card {
        card(
            "file",
            json!({
                "src": self.src,
                "fileName": self.file_name,
                "fileTitle": self.file_title,
                "fileCaption": self.file_caption,
                "fileSize": self.file_size,
            }),
        )
    }
}

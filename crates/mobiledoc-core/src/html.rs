//! HTML to Markdown conversion for markdown cards.
//!
//! [`Mobiledoc::add_markdown_from_html`](crate::Mobiledoc::add_markdown_from_html)
//! converts through the [`HtmlToMarkdown`] trait so callers can plug in a
//! full converter. [`BasicConverter`] is the built-in one: a single forward
//! pass over tags that understands the usual inline and block elements and
//! drops everything else, keeping its text.

use log::trace;
use memchr::memchr;

/// Converts an HTML fragment to Markdown.
pub trait HtmlToMarkdown {
    fn convert(&self, html: &str) -> String;
}

impl<F> HtmlToMarkdown for F
where
    F: Fn(&str) -> String,
{
    fn convert(&self, html: &str) -> String {
        self(html)
    }
}

/// Convert `html` with the built-in [`BasicConverter`].
///
/// ```rust
/// use mobiledoc_core::html::html_to_markdown;
///
/// let md = html_to_markdown(r#"<b>Hello</b> <a href="http://github.com">GitHub</a>"#);
/// assert_eq!(md, "**Hello** [GitHub](http://github.com)");
/// ```
pub fn html_to_markdown(html: &str) -> String {
    BasicConverter.convert(html)
}

/// Tag-driven converter covering emphasis, links, headings, paragraphs,
/// lists, block quotes, code and rules.
#[derive(Debug, Default, Clone, Copy)]
pub struct BasicConverter;

impl HtmlToMarkdown for BasicConverter {
    fn convert(&self, html: &str) -> String {
        let mut writer = Writer::default();
        writer.run(html);
        writer.finish()
    }
}

#[derive(Debug)]
struct ListState {
    ordered: bool,
    next: usize,
}

#[derive(Debug, Default)]
struct Writer {
    /// Output buffers; block quotes render into their own buffer.
    buffers: Vec<String>,
    lists: Vec<ListState>,
    /// `href` of each open `<a>`, `None` when it had no target.
    links: Vec<Option<String>>,
    in_pre: bool,
}

struct Tag<'a> {
    name: String,
    closing: bool,
    attrs: &'a str,
}

impl Writer {
    fn out(&mut self) -> &mut String {
        if self.buffers.is_empty() {
            self.buffers.push(String::new());
        }
        let last = self.buffers.len() - 1;
        &mut self.buffers[last]
    }

    fn run(&mut self, html: &str) {
        let bytes = html.as_bytes();
        let mut pos = 0;

        while pos < bytes.len() {
            let lt = memchr(b'<', &bytes[pos..]).map_or(bytes.len(), |o| pos + o);
            if lt > pos {
                self.text(&html[pos..lt]);
            }
            if lt >= bytes.len() {
                break;
            }

            if html[lt..].starts_with("<!--") {
                pos = html[lt..].find("-->").map_or(bytes.len(), |o| lt + o + 3);
                continue;
            }

            let Some(gt) = memchr(b'>', &bytes[lt..]).map(|o| lt + o) else {
                // No closing `>`: the rest is text.
                self.text(&html[lt..]);
                break;
            };

            match parse_tag(&html[lt + 1..gt]) {
                Some(tag) if !tag.closing && matches!(tag.name.as_str(), "script" | "style") => {
                    let end = format!("</{}", tag.name);
                    pos = find_ignore_case(html, gt + 1, &end)
                        .and_then(|start| memchr(b'>', &bytes[start..]).map(|o| start + o + 1))
                        .unwrap_or(bytes.len());
                    continue;
                }
                Some(tag) => self.tag(&tag),
                None => self.text(&html[lt..=gt]),
            }
            pos = gt + 1;
        }
    }

    fn text(&mut self, raw: &str) {
        let decoded = html_escape::decode_html_entities(raw);
        if self.in_pre {
            self.out().push_str(&decoded);
            return;
        }

        let out = self.out();
        let mut last_space = out.is_empty() || out.ends_with(|c: char| c == ' ' || c == '\n');
        for c in decoded.chars() {
            if c.is_whitespace() {
                if !last_space {
                    out.push(' ');
                    last_space = true;
                }
            } else {
                out.push(c);
                last_space = false;
            }
        }
    }

    fn tag(&mut self, tag: &Tag<'_>) {
        trace!("html tag {}{}", if tag.closing { "/" } else { "" }, tag.name);
        match (tag.name.as_str(), tag.closing) {
            ("b" | "strong", _) => self.out().push_str("**"),
            ("i" | "em", _) => self.out().push('*'),
            ("s" | "del" | "strike", _) => self.out().push_str("~~"),
            ("code", _) if !self.in_pre => self.out().push('`'),
            ("a", false) => {
                let href = attribute(tag.attrs, "href");
                if href.is_some() {
                    self.out().push('[');
                }
                self.links.push(href);
            }
            ("a", true) => {
                if let Some(Some(href)) = self.links.pop() {
                    let out = self.out();
                    out.push_str("](");
                    out.push_str(&href);
                    out.push(')');
                }
            }
            ("h1" | "h2" | "h3" | "h4" | "h5" | "h6", false) => {
                let level = tag.name.as_bytes()[1] - b'0';
                self.block_break();
                let out = self.out();
                out.push_str(&"#".repeat(level as usize));
                out.push(' ');
            }
            ("p" | "div" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "table" | "tr", _) => {
                self.block_break()
            }
            ("br", _) => self.out().push_str("  \n"),
            ("hr", _) => {
                self.block_break();
                self.out().push_str("---");
                self.block_break();
            }
            ("ul" | "ol", false) => {
                if self.lists.is_empty() {
                    self.block_break();
                }
                self.lists.push(ListState {
                    ordered: tag.name == "ol",
                    next: 1,
                });
            }
            ("ul" | "ol", true) => {
                self.lists.pop();
                if self.lists.is_empty() {
                    self.block_break();
                }
            }
            ("li", false) => self.list_item(),
            ("blockquote", false) => {
                self.block_break();
                self.buffers.push(String::new());
            }
            ("blockquote", true) if self.buffers.len() > 1 => {
                let inner = self.buffers.pop().unwrap_or_default();
                let quoted = inner
                    .trim()
                    .lines()
                    .map(|line| if line.is_empty() { ">".to_string() } else { format!("> {line}") })
                    .collect::<Vec<_>>()
                    .join("\n");
                self.out().push_str(&quoted);
                self.block_break();
            }
            ("pre", false) => {
                self.block_break();
                self.out().push_str("```\n");
                self.in_pre = true;
            }
            ("pre", true) => {
                self.in_pre = false;
                let out = self.out();
                if !out.ends_with('\n') {
                    out.push('\n');
                }
                out.push_str("```");
                self.block_break();
            }
            _ => {}
        }
    }

    fn list_item(&mut self) {
        let depth = self.lists.len().saturating_sub(1);
        let marker = match self.lists.last_mut() {
            Some(list) if list.ordered => {
                let n = list.next;
                list.next += 1;
                format!("{n}. ")
            }
            _ => "- ".to_string(),
        };
        let out = self.out();
        trim_trailing_spaces(out);
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&"  ".repeat(depth));
        out.push_str(&marker);
    }

    fn block_break(&mut self) {
        let out = self.out();
        trim_trailing_spaces(out);
        if out.is_empty() {
            return;
        }
        while !out.ends_with("\n\n") {
            out.push('\n');
        }
    }

    fn finish(mut self) -> String {
        // Unclosed block quotes fold back into their parent unquoted.
        while self.buffers.len() > 1 {
            let inner = self.buffers.pop().unwrap_or_default();
            self.out().push_str(&inner);
        }
        let out = self.buffers.pop().unwrap_or_default();

        let mut result = String::with_capacity(out.len());
        let mut newlines = 0;
        for c in out.chars() {
            if c == '\n' {
                newlines += 1;
                if newlines > 2 {
                    continue;
                }
            } else {
                newlines = 0;
            }
            result.push(c);
        }
        result.trim().to_string()
    }
}

fn trim_trailing_spaces(out: &mut String) {
    let trimmed = out.trim_end_matches(' ').len();
    out.truncate(trimmed);
}

/// Parse the inside of `<...>`. Returns `None` for things that are not tags.
fn parse_tag(inner: &str) -> Option<Tag<'_>> {
    let (closing, rest) = match inner.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, inner),
    };
    let rest = rest.trim_end_matches('/');
    let name_end = rest
        .find(|c: char| c.is_whitespace() || c == '/')
        .unwrap_or(rest.len());
    let name = &rest[..name_end];
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(Tag {
        name: name.to_ascii_lowercase(),
        closing,
        attrs: &rest[name_end..],
    })
}

/// Value of attribute `name` inside a tag's attribute text.
fn attribute(attrs: &str, name: &str) -> Option<String> {
    let lower = attrs.to_ascii_lowercase();
    let mut search = 0;
    while let Some(offset) = lower[search..].find(name) {
        let start = search + offset;
        let after = lower[start + name.len()..].trim_start();
        let boundary = start == 0 || lower[..start].ends_with(char::is_whitespace);
        if boundary && after.starts_with('=') {
            let value_start = attrs.len() - after.len() + 1;
            let value = attrs[value_start..].trim_start();
            let raw = match value.chars().next() {
                Some(quote @ ('"' | '\'')) => {
                    let body = &value[1..];
                    &body[..body.find(quote).unwrap_or(body.len())]
                }
                _ => {
                    let end = value.find(char::is_whitespace).unwrap_or(value.len());
                    &value[..end]
                }
            };
            return Some(html_escape::decode_html_entities(raw).into_owned());
        }
        search = start + name.len();
    }
    None
}

fn find_ignore_case(haystack: &str, from: usize, needle: &str) -> Option<usize> {
    haystack
        .get(from..)?
        .to_ascii_lowercase()
        .find(needle)
        .map(|offset| from + offset)
}

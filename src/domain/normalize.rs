//! HTML page body → plain text.

use std::sync::OnceLock;

use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};

/// Elements whose text never reaches the output.
const SKIPPED: &[&str] = &["script", "style", "template"];

/// Elements that separate words in rendered text.
const BLOCKS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "caption", "dd", "div", "dl", "dt",
    "figcaption", "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li",
    "main", "nav", "ol", "p", "pre", "section", "table", "tbody", "td", "tfoot", "th", "thead",
    "tr", "ul",
];

const ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    pub content: String,
    pub word_count: usize,
}

impl NormalizedText {
    fn from_clean(content: String) -> Self {
        let word_count = content.split_whitespace().count();
        Self { content, word_count }
    }
}

/// Extracts the visible body text of `html`, collapsed to single spaces.
///
/// Running it again on its own output is a no-op only for markup-free text:
/// escaped markup such as `&lt;b&gt;` decodes to `<b>` and a second pass
/// parses that as a tag.
pub fn normalize(html: &str) -> NormalizedText {
    if html.trim().is_empty() {
        return NormalizedText::from_clean(String::new());
    }
    let content = match body_text(html) {
        Some(text) => collapse_whitespace(&text),
        None => {
            tracing::warn!("html body not found, falling back to tag stripping");
            strip_markup(html)
        }
    };
    NormalizedText::from_clean(content)
}

fn body_text(html: &str) -> Option<String> {
    let selector = Selector::parse("body").ok()?;
    let document = Html::parse_document(html);
    let body = document.select(&selector).next()?;
    let mut out = String::with_capacity(html.len() / 2);
    collect_text(body, &mut out);
    Some(out)
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if SKIPPED.contains(&name) {
                    continue;
                }
                let block = BLOCKS.contains(&name);
                if block {
                    out.push(' ');
                }
                if let Some(nested) = ElementRef::wrap(child) {
                    collect_text(nested, out);
                }
                if block {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}

fn tag_pattern() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"<[^>]*>").expect("tag pattern compiles"))
}

/// Regex-only cleanup used when no document body can be extracted.
pub fn strip_markup(html: &str) -> String {
    let mut text = tag_pattern().replace_all(html, "").into_owned();
    for (entity, replacement) in ENTITIES {
        text = text.replace(entity, replacement);
    }
    collapse_whitespace(&text)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

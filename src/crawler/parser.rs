//! HTML parser for extracting text and links
//!
//! This module is the DOM collaborator. From a raw HTML body it extracts:
//! - Visible text, with boilerplate subtrees removed
//! - Page title
//! - Raw `href` values of every anchor, unresolved

use crate::SieveError;
use scraper::{node::Node, ElementRef, Html, Selector};

/// Elements whose content is never visible page text
const BOILERPLATE_TAGS: &[&str] = &["meta", "script", "style", "noscript", "object", "embed"];

/// What the DOM collaborator extracts from a page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDocument {
    /// Visible text, one space between text nodes
    pub text: String,

    /// The page title (from <title> tag), trimmed
    pub title: Option<String>,

    /// `href` values of `<a>` tags, as written in the page
    pub links: Vec<String>,
}

/// Turns raw page bytes into a [`ParsedDocument`]
pub trait DocumentParser: Send + Sync {
    /// Parses a page body
    ///
    /// An `Err` means the page has no usable document; the caller drops it.
    fn parse(&self, body: &[u8]) -> Result<ParsedDocument, SieveError>;
}

/// [`DocumentParser`] backed by the `scraper` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlParser;

impl DocumentParser for HtmlParser {
    fn parse(&self, body: &[u8]) -> Result<ParsedDocument, SieveError> {
        let html = String::from_utf8_lossy(body);
        if html.trim().is_empty() {
            return Err(SieveError::HtmlParse {
                message: "empty document".to_string(),
            });
        }

        parse_html(&html)
    }
}

/// Parses HTML content and extracts text, title and links
///
/// # Example
///
/// ```
/// use sumi_sieve::crawler::parse_html;
///
/// let html = r#"<html><head><title>Test</title><script>var x;</script></head>
///     <body><p>Hello</p><a href="/page">Link</a></body></html>"#;
/// let parsed = parse_html(html).unwrap();
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.links, vec!["/page"]);
/// assert!(!parsed.text.contains("var x"));
/// ```
pub fn parse_html(html: &str) -> Result<ParsedDocument, SieveError> {
    let document = Html::parse_document(html);

    Ok(ParsedDocument {
        text: extract_text(&document),
        title: extract_title(&document),
        links: extract_links(&document)?,
    })
}

/// Collects text nodes that are not inside a boilerplate element
fn extract_text(document: &Html) -> String {
    let root = document.root_element();
    let mut pieces: Vec<&str> = Vec::new();

    for node in root.descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ElementRef::wrap(ancestor)
                .is_some_and(|element| BOILERPLATE_TAGS.contains(&element.value().name()))
        });
        if hidden {
            continue;
        }

        let text = text.trim();
        if !text.is_empty() {
            pieces.push(text);
        }
    }

    pieces.join(" ")
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extracts every anchor `href`, in document order
fn extract_links(document: &Html) -> Result<Vec<String>, SieveError> {
    let a_selector = Selector::parse("a[href]").map_err(|e| SieveError::HtmlParse {
        message: e.to_string(),
    })?;

    Ok(document
        .select(&a_selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect())
}

//! HTML to plain text for result previews.
//!
//! Extraction works on a small owned tree ([`Element`]/[`Node`]) produced by
//! an [`HtmlParser`], so it can run outside a browser and be tested with
//! hand-built trees. Scripts and styles are never executed; their content,
//! along with permalink markers, is left out of the text.

use scraper::Html;

/// Maximum element nesting converted from parsed HTML. Deeper subtrees are
/// dropped with a warning.
const MAX_NESTING_DEPTH: usize = 256;

/// Elements whose content is never part of the extracted text.
const SKIPPED_TAGS: &[&str] = &["script", "style", "template", "noscript"];

/// Class of the `¶` permalink anchors placed after headings.
const HEADERLINK_CLASS: &str = "headerlink";

/// Elements that start a new line of text, so adjacent words do not run together.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "caption", "dd", "div", "dl", "dt",
    "figcaption", "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li",
    "main", "nav", "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Text with entities already decoded.
    Text(String),
    Comment,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Lowercase tag name.
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.push((name.to_string(), value.to_string()));
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    #[must_use]
    pub fn with_text(self, text: &str) -> Self {
        self.with_child(Node::Text(text.to_string()))
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    /// First element in document order (including `self`) matching `predicate`.
    pub fn find(&self, predicate: &impl Fn(&Self) -> bool) -> Option<&Self> {
        if predicate(self) {
            return Some(self);
        }
        self.children.iter().find_map(|child| match child {
            Node::Element(element) => element.find(predicate),
            _ => None,
        })
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

/// Parses an HTML document into an owned tree rooted at `<html>`.
pub trait HtmlParser {
    fn parse(&self, html: &str) -> Element;
}

/// [`HtmlParser`] backed by the `scraper` crate (html5ever).
#[derive(Debug, Clone, Copy, Default)]
pub struct ScraperParser;

impl HtmlParser for ScraperParser {
    fn parse(&self, html: &str) -> Element {
        let document = Html::parse_document(html);
        convert_element(*document.root_element(), 0)
    }
}

fn convert_element(node: ego_tree::NodeRef<'_, scraper::Node>, depth: usize) -> Element {
    let mut element = match node.value() {
        scraper::Node::Element(el) => Element {
            tag: el.name().to_ascii_lowercase(),
            attrs: el
                .attrs()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            children: vec![],
        },
        _ => Element::default(),
    };

    if depth >= MAX_NESTING_DEPTH {
        tracing::warn!(
            element = element.tag.as_str(),
            depth,
            "HTML nesting too deep, truncating subtree"
        );
        return element;
    }

    element.children = node
        .children()
        .filter_map(|child| match child.value() {
            scraper::Node::Element(_) => Some(Node::Element(convert_element(child, depth + 1))),
            scraper::Node::Text(text) => Some(Node::Text(text.text.to_string())),
            scraper::Node::Comment(_) => Some(Node::Comment),
            _ => None,
        })
        .collect();

    element
}

fn is_main_region(element: &Element) -> bool {
    element.attr("role") == Some("main")
}

fn is_skipped(element: &Element) -> bool {
    SKIPPED_TAGS.contains(&element.tag.as_str()) || element.has_class(HEADERLINK_CLASS)
}

fn push_break(out: &mut String) {
    if !out.is_empty() && !out.ends_with(char::is_whitespace) {
        out.push('\n');
    }
}

fn collect_text(element: &Element, out: &mut String) {
    if is_skipped(element) {
        return;
    }

    let block = BLOCK_TAGS.contains(&element.tag.as_str());
    if block {
        push_break(out);
    }
    for child in &element.children {
        match child {
            Node::Element(child) => collect_text(child, out),
            Node::Text(text) => out.push_str(text),
            Node::Comment => {}
        }
    }
    if block {
        push_break(out);
    }
}

/// Text content of an element, skipping scripts, styles and permalink markers.
pub fn text_content(element: &Element) -> String {
    let mut out = String::new();
    collect_text(element, &mut out);
    out
}

/// Extracts preview text from a parsed page.
///
/// With an `anchor` (with or without the leading `#`) the text starts at the
/// element carrying that id inside the main content region. Without one, or
/// when the anchor is not found, the whole main region (`role="main"`) is
/// used. A page without a main region yields an empty string.
pub fn tree_to_text(root: &Element, anchor: Option<&str>) -> String {
    let main = root.find(&is_main_region);

    let anchor = anchor
        .map(|a| a.strip_prefix('#').unwrap_or(a))
        .filter(|a| !a.is_empty());
    if let Some(anchor) = anchor {
        let anchored = main.and_then(|main| main.find(&|el: &Element| el.attr("id") == Some(anchor)));
        if let Some(element) = anchored {
            return text_content(element);
        }
        tracing::warn!(
            "Anchored content block '#{}' not found in the main region, using the whole main region",
            anchor
        );
    }

    match main {
        Some(main) => text_content(main),
        None => {
            tracing::warn!("Content block not found: page has no element with role=\"main\"");
            String::new()
        }
    }
}

/// Parses HTML with `parser` and extracts preview text. See [`tree_to_text`].
pub fn html_to_text_with(parser: &impl HtmlParser, html: &str, anchor: Option<&str>) -> String {
    tree_to_text(&parser.parse(html), anchor)
}

/// Parses HTML with the default parser and extracts preview text. See [`tree_to_text`].
pub fn html_to_text(html: &str, anchor: Option<&str>) -> String {
    html_to_text_with(&ScraperParser, html, anchor)
}

//! Minimal DOM used by the HTML importer.
//!
//! The importer only needs tag names, text, attributes, a few inline CSS properties and the
//! child list. Callers that already hold a parsed document can implement [`DomBuilder`]
//! themselves; [`HtmlDomBuilder`] is a lenient, non-executing parser for untrusted input.

mod builder;
mod tokenizer;

pub use builder::build_body;
pub use tokenizer::{Token, tokenize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    /// Lowercase tag name.
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_lowercase(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes
            .push((name.into().to_ascii_lowercase(), value.into()));
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    /// Lowercase tag name, or `#text` for text nodes.
    pub fn node_name(&self) -> &str {
        match self {
            Node::Element(element) => &element.name,
            Node::Text(_) => "#text",
        }
    }

    pub fn text_content(&self) -> Option<&str> {
        match self {
            Node::Text(text) => Some(text),
            Node::Element(_) => None,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.as_element()?
            .attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Looks up a declaration in the inline `style` attribute, e.g. `font-weight`.
    ///
    /// Property names compare case-insensitively; the value is returned trimmed.
    pub fn style_property(&self, property: &str) -> Option<&str> {
        let style = self.attribute("style")?;
        style
            .split(';')
            .filter_map(|decl| decl.split_once(':'))
            .filter(|(name, _)| name.trim().eq_ignore_ascii_case(property))
            .map(|(_, value)| value.trim())
            .last()
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Element(element) => &element.children,
            Node::Text(_) => &[],
        }
    }

    pub fn first_child(&self) -> Option<&Node> {
        self.children().first()
    }
}

impl From<Element> for Node {
    fn from(value: Element) -> Self {
        Node::Element(value)
    }
}

/// Turns an HTML string into a tree rooted at a `body` element.
///
/// Returning `None` makes the importer produce an empty document.
pub trait DomBuilder: Send + Sync {
    fn build(&self, html: &str) -> Option<Node>;
}

impl<F> DomBuilder for F
where
    F: Fn(&str) -> Option<Node> + Send + Sync,
{
    fn build(&self, html: &str) -> Option<Node> {
        self(html)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlDomBuilder;

impl DomBuilder for HtmlDomBuilder {
    fn build(&self, html: &str) -> Option<Node> {
        Some(Node::Element(build_body(&tokenize(html))))
    }
}

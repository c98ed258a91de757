//! Markup descriptors and the splitter that turns them into literal start/end tag text.

use crate::error::{Error, Result};

const HOLE: char = '\r';

fn is_void_element(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

/// What a renderer hook returns for a style, block or entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Markup {
    /// Replaces the content entirely.
    Html(String),
    /// Wraps the content.
    Tags { start: String, end: String },
    Element(ElementSpec),
}

impl Markup {
    pub fn html(html: impl Into<String>) -> Self {
        Markup::Html(html.into())
    }

    pub fn tags(start: impl Into<String>, end: impl Into<String>) -> Self {
        Markup::Tags {
            start: start.into(),
            end: end.into(),
        }
    }

    pub fn element(tag: impl Into<String>) -> Self {
        Markup::Element(ElementSpec::new(tag))
    }
}

impl From<ElementSpec> for Markup {
    fn from(value: ElementSpec) -> Self {
        Markup::Element(value)
    }
}

/// A component-like element description: tag name, attributes and optional children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementSpec {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<ElementChild>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementChild {
    Text(String),
    Element(ElementSpec),
}

impl ElementSpec {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(ElementChild::Text(text.into()));
        self
    }

    pub fn child(mut self, child: ElementSpec) -> Self {
        self.children.push(ElementChild::Element(child));
        self
    }

    /// Renders the element as static markup. Void elements render as `<tag .../>`.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out, None);
        out
    }

    fn write_html(&self, out: &mut String, hole: Option<char>) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&htmlize::escape_attribute(value.as_str()));
            out.push('"');
        }
        if is_void_element(&self.tag) {
            out.push_str("/>");
            return;
        }
        out.push('>');
        if let Some(hole) = hole {
            out.push(hole);
        }
        for child in &self.children {
            match child {
                ElementChild::Text(text) => out.push_str(&htmlize::escape_text(text.as_str())),
                ElementChild::Element(element) => element.write_html(out, None),
            }
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}

/// A markup descriptor normalized to literal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Split {
    Pair { start: String, end: String },
    Literal(String),
}

impl Split {
    /// Code-point lengths of the start and end text (zero for literals).
    pub fn tag_lengths(&self) -> (usize, usize) {
        match self {
            Split::Pair { start, end } => (start.chars().count(), end.chars().count()),
            Split::Literal(_) => (0, 0),
        }
    }

    /// The markup applied to `text`.
    pub fn wrap(&self, text: &str) -> String {
        match self {
            Split::Pair { start, end } => format!("{start}{text}{end}"),
            Split::Literal(html) => html.clone(),
        }
    }
}

pub fn split_markup(markup: &Markup) -> Result<Split> {
    match markup {
        Markup::Html(html) => Ok(Split::Literal(html.clone())),
        Markup::Tags { start, end } => Ok(Split::Pair {
            start: start.clone(),
            end: end.clone(),
        }),
        Markup::Element(element) => split_element(element),
    }
}

fn split_element(element: &ElementSpec) -> Result<Split> {
    if is_void_element(&element.tag) || !element.children.is_empty() {
        return Ok(Split::Literal(element.to_html()));
    }

    let mut rendered = String::new();
    let bare = ElementSpec {
        children: Vec::new(),
        ..element.clone()
    };
    bare.write_html(&mut rendered, Some(HOLE));

    let mut parts = rendered.split(HOLE);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(start), Some(end), None) => Ok(Split::Pair {
            start: start.to_string(),
            end: end.to_string(),
        }),
        (_, None, _) => Err(Error::MalformedMarkup {
            tag: element.tag.clone(),
            message: "element must render children".to_string(),
        }),
        _ => Err(Error::MalformedMarkup {
            tag: element.tag.clone(),
            message: "element cannot use the carriage return character".to_string(),
        }),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPair {
    pub start: String,
    pub end: String,
}

impl TagPair {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

/// Block-level markup: the block's own wrapper, the replacement used when the block renders
/// nothing, and the wrapper that groups consecutive nested blocks (list containers).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockMarkup {
    pub markup: Markup,
    pub empty: Option<Markup>,
    pub nest: Option<Markup>,
}

impl BlockMarkup {
    pub fn new(markup: impl Into<Markup>) -> Self {
        Self {
            markup: markup.into(),
            empty: None,
            nest: None,
        }
    }

    pub fn tags(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self::new(Markup::tags(start, end))
    }

    pub fn with_empty(mut self, empty: impl Into<Markup>) -> Self {
        self.empty = Some(empty.into());
        self
    }

    pub fn with_nest(mut self, nest: impl Into<Markup>) -> Self {
        self.nest = Some(nest.into());
        self
    }

    pub fn with_nest_tags(self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.with_nest(Markup::tags(start, end))
    }
}

impl From<Markup> for BlockMarkup {
    fn from(value: Markup) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedBlock {
    /// Replaces the whole block, inner HTML included.
    Literal(String),
    Tags {
        tags: TagPair,
        empty: Option<String>,
        nest: Option<TagPair>,
    },
}

impl ResolvedBlock {
    pub fn nest(&self) -> Option<&TagPair> {
        match self {
            ResolvedBlock::Tags { nest, .. } => nest.as_ref(),
            ResolvedBlock::Literal(_) => None,
        }
    }

    pub fn wrap(&self, inner_html: &str) -> String {
        match self {
            ResolvedBlock::Literal(html) => html.clone(),
            ResolvedBlock::Tags { empty: Some(empty), .. } if inner_html.is_empty() => {
                empty.clone()
            }
            ResolvedBlock::Tags { tags, .. } => format!("{}{inner_html}{}", tags.start, tags.end),
        }
    }
}

pub fn resolve_block_markup(markup: &BlockMarkup) -> Result<ResolvedBlock> {
    let tags = match split_markup(&markup.markup)? {
        Split::Literal(html) => return Ok(ResolvedBlock::Literal(html)),
        Split::Pair { start, end } => TagPair { start, end },
    };

    let nest = match &markup.nest {
        None => None,
        Some(nest) => match split_markup(nest)? {
            Split::Pair { start, end } => Some(TagPair { start, end }),
            Split::Literal(_) => {
                return Err(Error::MalformedMarkup {
                    tag: nest_tag_name(nest),
                    message: "nested block wrapper must not be a void element or literal HTML"
                        .to_string(),
                });
            }
        },
    };

    let empty = match &markup.empty {
        None => None,
        Some(Markup::Element(element)) => Some(element.to_html()),
        Some(Markup::Html(html)) => Some(html.clone()),
        Some(Markup::Tags { start, end }) => Some(format!("{start}{end}")),
    };

    Ok(ResolvedBlock::Tags { tags, empty, nest })
}

fn nest_tag_name(markup: &Markup) -> String {
    match markup {
        Markup::Element(element) => element.tag.clone(),
        Markup::Html(html) => html.clone(),
        Markup::Tags { start, .. } => start.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_elements_around_their_content() {
        let split = split_markup(&Markup::element("strong")).unwrap();
        assert_eq!(
            split,
            Split::Pair {
                start: "<strong>".to_string(),
                end: "</strong>".to_string()
            }
        );

        let link = ElementSpec::new("a").attr("href", "http://a.com/");
        let split = split_markup(&link.into()).unwrap();
        assert_eq!(split.wrap("text"), "<a href=\"http://a.com/\">text</a>");
        assert_eq!(split.tag_lengths(), (24, 4));

        let quoted = ElementSpec::new("a").attr("title", "a \"b\" & c");
        let split = split_markup(&quoted.into()).unwrap();
        assert_eq!(
            split.wrap(""),
            "<a title=\"a &quot;b&quot; &amp; c\"></a>"
        );
    }

    #[test]
    fn void_elements_and_elements_with_children_are_literal() {
        let img = ElementSpec::new("img").attr("src", "test");
        assert_eq!(
            split_markup(&img.into()).unwrap(),
            Split::Literal("<img src=\"test\"/>".to_string())
        );

        let full = ElementSpec::new("p").child(ElementSpec::new("b").text("x < y"));
        assert_eq!(
            split_markup(&full.into()).unwrap(),
            Split::Literal("<p><b>x &lt; y</b></p>".to_string())
        );
    }

    #[test]
    fn rejects_a_second_hole() {
        let bad = ElementSpec::new("span").attr("title", "a\rb");
        let err = split_markup(&bad.into()).unwrap_err();
        assert!(matches!(err, Error::MalformedMarkup { tag, .. } if tag == "span"));
    }

    #[test]
    fn resolves_block_markup_with_nest_and_empty() {
        let markup = BlockMarkup::new(ElementSpec::new("li").attr("data-checked", "true"))
            .with_nest(Markup::element("ul"))
            .with_empty(Markup::element("br"));
        let resolved = resolve_block_markup(&markup).unwrap();
        assert_eq!(resolved.nest(), Some(&TagPair::new("<ul>", "</ul>")));
        assert_eq!(resolved.wrap("x"), "<li data-checked=\"true\">x</li>");
        assert_eq!(resolved.wrap(""), "<br/>");
    }

    #[test]
    fn void_nest_wrappers_are_malformed() {
        let markup = BlockMarkup::tags("<li>", "</li>").with_nest(Markup::element("hr"));
        assert!(matches!(
            resolve_block_markup(&markup),
            Err(Error::MalformedMarkup { tag, .. }) if tag == "hr"
        ));
    }
}

//! Built-in tag tables for both conversion directions.

use crate::dom::Node;
use crate::hooks::StyleSet;
use crate::markup::{BlockMarkup, Markup};
use crate::model::RawBlock;
use rustc_hash::FxHashMap;
use std::sync::OnceLock;

/// Deepest list nesting a block may record.
pub const MAX_DEPTH: usize = 4;

pub const UNSTYLED: &str = "unstyled";
pub const UNORDERED_LIST_ITEM: &str = "unordered-list-item";
pub const ORDERED_LIST_ITEM: &str = "ordered-list-item";
pub const CODE_BLOCK: &str = "code-block";
pub const ATOMIC: &str = "atomic";

pub const BOLD: &str = "BOLD";
pub const ITALIC: &str = "ITALIC";
pub const UNDERLINE: &str = "UNDERLINE";
pub const CODE: &str = "CODE";
pub const STRIKETHROUGH: &str = "STRIKETHROUGH";

/// Block types that always group into nesting wrappers.
pub const NESTED_BLOCK_TYPES: &[&str] = &[UNORDERED_LIST_ITEM, ORDERED_LIST_ITEM];

/// Tags that open a block when the document uses semantic block markup.
pub(crate) const SEMANTIC_BLOCK_TAGS: &[&str] = &[
    "p",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "li",
    "blockquote",
    "pre",
];

pub fn is_list_type(block_type: &str) -> bool {
    NESTED_BLOCK_TYPES.contains(&block_type)
}

pub fn style_markup(style: &str) -> Option<Markup> {
    let tag = match style {
        BOLD => "strong",
        ITALIC => "em",
        UNDERLINE => "u",
        CODE => "code",
        _ => return None,
    };
    Some(Markup::element(tag))
}

fn block_tags() -> &'static FxHashMap<&'static str, (&'static str, Option<&'static str>)> {
    static TABLE: OnceLock<FxHashMap<&'static str, (&'static str, Option<&'static str>)>> =
        OnceLock::new();
    TABLE.get_or_init(|| {
        [
            (UNSTYLED, ("p", None)),
            ("paragraph", ("p", None)),
            ("header-one", ("h1", None)),
            ("header-two", ("h2", None)),
            ("header-three", ("h3", None)),
            ("header-four", ("h4", None)),
            ("header-five", ("h5", None)),
            ("header-six", ("h6", None)),
            (UNORDERED_LIST_ITEM, ("li", Some("ul"))),
            (ORDERED_LIST_ITEM, ("li", Some("ol"))),
            ("media", ("figure", None)),
            ("blockquote", ("blockquote", None)),
        ]
        .into_iter()
        .collect()
    })
}

pub fn block_markup(block: &RawBlock) -> Option<BlockMarkup> {
    let (tag, nest) = block_tags().get(block.block_type.as_str())?;
    let markup = BlockMarkup::new(Markup::element(*tag));
    Some(match nest {
        Some(nest) => markup.with_nest(Markup::element(*nest)),
        None => markup,
    })
}

fn inline_tags() -> &'static FxHashMap<&'static str, &'static str> {
    static TABLE: OnceLock<FxHashMap<&'static str, &'static str>> = OnceLock::new();
    TABLE.get_or_init(|| {
        [
            ("b", BOLD),
            ("strong", BOLD),
            ("i", ITALIC),
            ("em", ITALIC),
            ("u", UNDERLINE),
            ("code", CODE),
            ("s", STRIKETHROUGH),
            ("strike", STRIKETHROUGH),
            ("del", STRIKETHROUGH),
        ]
        .into_iter()
        .collect()
    })
}

fn css_value(node: &Node, property: &str) -> Option<String> {
    node.style_property(property)
        .map(|value| value.trim().to_ascii_lowercase())
}

/// Adds the style implied by `tag` to `current`, or for other elements the styles implied by
/// their inline CSS.
pub fn process_inline_tag(tag: &str, node: &Node, current: &StyleSet) -> StyleSet {
    let mut styles = current.clone();
    if let Some(style) = inline_tags().get(tag) {
        styles.insert((*style).to_string());
        return styles;
    }

    if node.as_element().is_none() {
        return styles;
    }
    if let Some(weight) = css_value(node, "font-weight") {
        if weight == "bold" || weight == "700" {
            styles.insert(BOLD.to_string());
        }
    }
    if css_value(node, "font-style").as_deref() == Some("italic") {
        styles.insert(ITALIC.to_string());
    }
    match css_value(node, "text-decoration").as_deref() {
        Some("underline") => {
            styles.insert(UNDERLINE.to_string());
        }
        Some("line-through") => {
            styles.insert(STRIKETHROUGH.to_string());
        }
        _ => {}
    }
    styles
}

/// Block type of a tag in the built-in table. `li` depends on the enclosing list.
pub fn block_type_for_tag(tag: &str, last_list: Option<&str>) -> Option<&'static str> {
    Some(match tag {
        "h1" => "header-one",
        "h2" => "header-two",
        "h3" => "header-three",
        "h4" => "header-four",
        "h5" => "header-five",
        "h6" => "header-six",
        "li" if last_list == Some("ol") => ORDERED_LIST_ITEM,
        "li" => UNORDERED_LIST_ITEM,
        "blockquote" => "blockquote",
        "pre" => CODE_BLOCK,
        "p" | "div" => UNSTYLED,
        _ => return None,
    })
}

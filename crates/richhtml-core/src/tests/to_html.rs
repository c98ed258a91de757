use crate::*;
use serde_json::json;

fn content(blocks: Vec<RawBlock>) -> RawContentState {
    RawContentState::new(blocks, EntityMap::new())
}

fn link_map() -> EntityMap {
    let mut entity_map = EntityMap::new();
    let data = json!({ "url": "http://google.com" });
    let serde_json::Value::Object(data) = data else {
        unreachable!()
    };
    entity_map.insert("0", RawEntity::new("LINK", Mutability::Mutable, data));
    entity_map
}

fn link_exporter() -> HtmlExporter {
    HtmlExporter::new().with_entity_to_html(EntityToHtml::direct(
        |entity: &RawEntity, _text: &str| {
            if entity.entity_type != "LINK" {
                return None;
            }
            let url = entity.data_str("url")?;
            Some(Markup::from(ElementSpec::new("a").attr("href", url)))
        },
    ))
}

#[test]
fn renders_paragraphs_and_headers() {
    let html = convert_to_html(&content(vec![
        RawBlock::new("header-one", "Title"),
        RawBlock::new("unstyled", "Body"),
        RawBlock::new("unstyled", ""),
    ]))
    .unwrap();
    assert_eq!(html, "<h1>Title</h1><p>Body</p><p></p>");
}

#[test]
fn crossing_styles_reopen_inside_the_block() {
    let html = convert_to_html(&content(vec![
        RawBlock::new("unstyled", "abcde")
            .with_style(0, 3, "BOLD")
            .with_style(2, 3, "ITALIC"),
    ]))
    .unwrap();
    assert_eq!(html, "<p><strong>ab</strong><em><strong>c</strong>de</em></p>");
}

#[test]
fn escapes_text_and_keeps_styles_aligned() {
    let html = convert_to_html(&content(vec![
        RawBlock::new("unstyled", "te<&>st").with_style(1, 5, "BOLD"),
    ]))
    .unwrap();
    assert_eq!(html, "<p>t<strong>e&lt;&amp;&gt;s</strong>t</p>");
}

#[test]
fn newlines_render_as_line_breaks() {
    let html = convert_to_html(&content(vec![RawBlock::new("unstyled", "one\ntwo")])).unwrap();
    assert_eq!(html, "<p>one<br/>two</p>");
}

#[test]
fn list_depth_opens_and_closes_nested_wrappers() {
    let html = convert_to_html(&content(vec![
        RawBlock::new("unordered-list-item", "top level"),
        RawBlock::new("unordered-list-item", "nested one level").with_depth(1),
        RawBlock::new("unordered-list-item", "nested two levels").with_depth(2),
        RawBlock::new("unordered-list-item", "back to top level"),
    ]))
    .unwrap();
    assert_eq!(
        html,
        "<ul><li>top level</li><ul><li>nested one level</li><ul><li>nested two levels</li>\
         </ul></ul><li>back to top level</li></ul>"
    );
}

#[test]
fn list_type_changes_swap_the_wrapper() {
    let html = convert_to_html(&content(vec![
        RawBlock::new("ordered-list-item", "a"),
        RawBlock::new("unordered-list-item", "b"),
        RawBlock::new("unstyled", "c"),
    ]))
    .unwrap();
    assert_eq!(html, "<ol><li>a</li></ol><ul><li>b</li></ul><p>c</p>");
}

#[test]
fn depth_beyond_the_limit_is_clamped() {
    let html = convert_to_html(&content(vec![
        RawBlock::new("unordered-list-item", "deep").with_depth(9),
    ]))
    .unwrap();
    assert_eq!(html, "<ul><ul><ul><ul><ul><li>deep</li></ul></ul></ul></ul></ul>");
}

#[test]
fn custom_blocks_with_nest_markup_group_like_lists() {
    let exporter = HtmlExporter::new().with_block_to_html(BlockToHtml::direct(|block: &RawBlock| {
        if block.block_type != "checkable-list-item" {
            return None;
        }
        let checked = block.data.get("checked").and_then(|v| v.as_bool()) == Some(true);
        Some(
            BlockMarkup::new(ElementSpec::new("li").attr("data-checked", checked.to_string()))
                .with_nest(Markup::element("ul")),
        )
    }));
    let checked = |value: bool| {
        let serde_json::Value::Object(data) = json!({ "checked": value }) else {
            unreachable!()
        };
        data
    };
    let html = exporter
        .convert(&content(vec![
            RawBlock::new("checkable-list-item", "item one").with_data(checked(false)),
            RawBlock::new("checkable-list-item", "item two").with_data(checked(true)),
        ]))
        .unwrap();
    assert_eq!(
        html,
        "<ul><li data-checked=\"false\">item one</li><li data-checked=\"true\">item two</li></ul>"
    );
}

#[test]
fn empty_markup_replaces_blocks_without_content() {
    let exporter = HtmlExporter::new().with_block_to_html(BlockToHtml::direct(|block: &RawBlock| {
        (block.block_type == "unstyled")
            .then(|| BlockMarkup::new(Markup::element("p")).with_empty(Markup::element("br")))
    }));
    let html = exporter
        .convert(&content(vec![
            RawBlock::new("unstyled", ""),
            RawBlock::new("unstyled", "x"),
        ]))
        .unwrap();
    assert_eq!(html, "<br/><p>x</p>");
}

#[test]
fn blocks_without_markup_render_their_content_only() {
    let html = convert_to_html(&content(vec![RawBlock::new("atomic", "caption")])).unwrap();
    assert_eq!(html, "caption");
}

#[test]
fn entity_wrapping_styles_keeps_them_inside() {
    let content = RawContentState::new(
        vec![
            RawBlock::new("unstyled", "overlapping styles in entity")
                .with_style(0, 14, "BOLD")
                .with_style(12, 14, "ITALIC")
                .with_entity(0, 28, "0"),
        ],
        link_map(),
    );
    assert_eq!(
        link_exporter().convert(&content).unwrap(),
        "<p><a href=\"http://google.com\"><strong>overlapping </strong><em><strong>st</strong>\
         yles in enti</em>ty</a></p>"
    );
}

#[test]
fn styles_crossing_an_entity_are_split_around_it() {
    let content = RawContentState::new(
        vec![
            RawBlock::new("unstyled", "overlapping styles in entity")
                .with_style(0, 14, "BOLD")
                .with_entity(12, 6, "0"),
        ],
        link_map(),
    );
    assert_eq!(
        link_exporter().convert(&content).unwrap(),
        "<p><strong>overlapping </strong><a href=\"http://google.com\"><strong>st</strong>\
         yles</a> in entity</p>"
    );
}

#[test]
fn literal_entity_markup_replaces_the_text() {
    let exporter = HtmlExporter::new().with_entity_to_html(EntityToHtml::direct(
        |_: &RawEntity, _: &str| Some(Markup::html("xyz")),
    ));
    let content = RawContentState::new(
        vec![
            RawBlock::new("unstyled", "abcde")
                .with_style(0, 5, "BOLD")
                .with_entity(1, 2, "0"),
        ],
        link_map(),
    );
    assert_eq!(exporter.convert(&content).unwrap(), "<p><strong>axyzde</strong></p>");
}

#[test]
fn empty_literal_entity_markup_keeps_the_text() {
    let exporter = HtmlExporter::new().with_entity_to_html(EntityToHtml::direct(
        |_: &RawEntity, _: &str| Some(Markup::html("")),
    ));
    let content = RawContentState::new(
        vec![
            RawBlock::new("unstyled", "a<cde")
                .with_style(0, 5, "BOLD")
                .with_entity(1, 2, "0"),
        ],
        link_map(),
    );
    assert_eq!(exporter.convert(&content).unwrap(), "<p><strong>a&lt;cde</strong></p>");
}

#[test]
fn entities_without_markup_keep_their_text() {
    let content = RawContentState::new(
        vec![RawBlock::new("unstyled", "a & b").with_entity(0, 5, "0")],
        link_map(),
    );
    assert_eq!(convert_to_html(&content).unwrap(), "<p>a &amp; b</p>");
}

#[test]
fn ranges_past_the_end_of_the_text_are_rejected() {
    let err = convert_to_html(&content(vec![
        RawBlock::new("unstyled", "abc").with_key("k1").with_style(1, 5, "BOLD"),
    ]))
    .unwrap_err();
    assert!(matches!(
        err,
        Error::RangeOutOfBounds { ref block, offset: 1, length: 5, text_length: 3 } if block == "k1"
    ));
}

#[test]
fn ranges_that_overflow_are_rejected() {
    let content = RawContentState::from_json_str(
        r#"{ "blocks": [{ "key": "k2", "type": "unstyled", "text": "abc",
             "inlineStyleRanges": [{ "offset": 18446744073709551615, "length": 2, "style": "BOLD" }] }],
             "entityMap": {} }"#,
    )
    .unwrap();
    let err = convert_to_html(&content).unwrap_err();
    assert!(matches!(
        err,
        Error::RangeOutOfBounds { ref block, offset: usize::MAX, length: 2, text_length: 3 } if block == "k2"
    ));
}

#[test]
fn missing_entities_and_styles_are_errors() {
    let err = convert_to_html(&content(vec![
        RawBlock::new("unstyled", "abc").with_entity(0, 1, "9"),
    ]))
    .unwrap_err();
    assert!(matches!(err, Error::MissingEntity { .. }));

    let err = convert_to_html(&content(vec![
        RawBlock::new("unstyled", "abc").with_style(0, 1, "SPARKLE"),
    ]))
    .unwrap_err();
    assert!(matches!(err, Error::MissingStyleMarkup { .. }));
}

#[test]
fn markup_config_extends_the_built_in_tables() {
    let config = MarkupConfig::from_value(json!({
        "styles": { "HIGHLIGHT": { "start": "<mark>", "end": "</mark>" } },
        "blocks": { "blockquote": { "start": "<blockquote>", "end": "</blockquote>" } },
        "entities": { "LINK": { "element": "a", "attributes": { "href": "url" } } }
    }))
    .unwrap();
    let content = RawContentState::new(
        vec![
            RawBlock::new("blockquote", "quote")
                .with_style(0, 5, "HIGHLIGHT")
                .with_entity(0, 5, "0"),
            RawBlock::new("unstyled", "bold").with_style(0, 4, "BOLD"),
        ],
        link_map(),
    );
    let html = HtmlExporter::new()
        .with_markup_config(&config)
        .convert(&content)
        .unwrap();
    assert_eq!(
        html,
        "<blockquote><mark><a href=\"http://google.com\">quote</a></mark></blockquote>\
         <p><strong>bold</strong></p>"
    );
}

#[test]
fn direct_hooks_layer_over_earlier_ones() {
    let exporter = HtmlExporter::new()
        .with_style_to_html(StyleToHtml::direct(|style: &str| {
            (style == "RED").then(|| Markup::tags("<span class=\"red\">", "</span>"))
        }))
        .with_style_to_html(StyleToHtml::wrapping(|next| {
            move |style: &str| {
                if style == "BOLD" {
                    Some(Markup::element("b"))
                } else {
                    next(style)
                }
            }
        }));
    let html = exporter
        .convert(&content(vec![
            RawBlock::new("unstyled", "abc")
                .with_style(0, 1, "RED")
                .with_style(1, 1, "BOLD")
                .with_style(2, 1, "ITALIC"),
        ]))
        .unwrap();
    assert_eq!(
        html,
        "<p><span class=\"red\">a</span><b>b</b><em>c</em></p>"
    );
}

#[test]
fn entity_offsets_count_code_points() {
    let content = RawContentState::new(
        vec![RawBlock::new("unstyled", "😀 go").with_entity(2, 2, "0")],
        link_map(),
    );
    assert_eq!(
        link_exporter().convert(&content).unwrap(),
        "<p>😀 <a href=\"http://google.com\">go</a></p>"
    );
}

#[test]
fn converters_are_shareable_across_threads() {
    fn assert_shareable<T: Clone + Send + Sync>() {}
    assert_shareable::<HtmlExporter>();
    assert_shareable::<HtmlImporter>();
    assert_shareable::<StyleToHtml>();
}

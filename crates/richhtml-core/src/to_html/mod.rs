//! Raw content to HTML.
//!
//! Each block is escaped, then its entities are rendered, then its inline styles; the block
//! markup wraps the result and consecutive list blocks are grouped into nesting wrappers.

pub mod encode;
pub mod entities;
pub mod styles;

use crate::config::MarkupConfig;
use crate::defaults::{self, MAX_DEPTH};
use crate::error::{Error, Result};
use crate::hooks::{
    BlockToHtml, BlockToHtmlFn, EntityToHtml, EntityToHtmlFn, Hook, StyleToHtml, StyleToHtmlFn,
};
use crate::markup::{Markup, ResolvedBlock, TagPair, resolve_block_markup};
use crate::model::{EntityMap, Mutation, RawBlock, RawContentState, RawEntity};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

pub use encode::encode_block;
pub use entities::render_entities;
pub use styles::render_inline_styles;

#[derive(Clone)]
pub struct HtmlExporter {
    style_to_html: Arc<StyleToHtmlFn>,
    block_to_html: Arc<BlockToHtmlFn>,
    entity_to_html: Arc<EntityToHtmlFn>,
}

impl fmt::Debug for HtmlExporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HtmlExporter").finish_non_exhaustive()
    }
}

impl Default for HtmlExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlExporter {
    pub fn new() -> Self {
        Self {
            style_to_html: Arc::new(defaults::style_markup),
            block_to_html: Arc::new(defaults::block_markup),
            entity_to_html: Arc::new(|_: &RawEntity, _: &str| -> Option<Markup> { None }),
        }
    }

    /// A direct hook is consulted first and falls back to the markup installed so far; a
    /// wrapping hook receives that markup and replaces it.
    pub fn with_style_to_html(mut self, hook: StyleToHtml) -> Self {
        let current = Arc::clone(&self.style_to_html);
        self.style_to_html = Hook::resolve(Some(&hook), current, |custom, base| {
            Arc::new(move |style: &str| custom(style).or_else(|| base(style)))
        });
        self
    }

    pub fn with_block_to_html(mut self, hook: BlockToHtml) -> Self {
        let current = Arc::clone(&self.block_to_html);
        self.block_to_html = Hook::resolve(Some(&hook), current, |custom, base| {
            Arc::new(move |block: &RawBlock| custom(block).or_else(|| base(block)))
        });
        self
    }

    /// Entities without markup render as their original text.
    pub fn with_entity_to_html(mut self, hook: EntityToHtml) -> Self {
        let current = Arc::clone(&self.entity_to_html);
        self.entity_to_html = Hook::resolve(Some(&hook), current, |custom, base| {
            Arc::new(move |entity: &RawEntity, text: &str| {
                custom(entity, text).or_else(|| base(entity, text))
            })
        });
        self
    }

    pub fn with_markup_config(self, config: &MarkupConfig) -> Self {
        self.with_style_to_html(config.style_hook())
            .with_block_to_html(config.block_hook())
            .with_entity_to_html(config.entity_hook())
    }

    pub fn convert(&self, content: &RawContentState) -> Result<String> {
        tracing::debug!(
            blocks = content.blocks.len(),
            entities = content.entity_map.len(),
            "converting content to html"
        );

        let mut html = String::new();
        let mut nesting = NestingStack::default();

        for block in &content.blocks {
            check_ranges(block)?;
            let resolved = match (self.block_to_html)(block) {
                Some(markup) => Some(resolve_block_markup(&markup)?),
                None => None,
            };
            let nest = resolved.as_ref().and_then(ResolvedBlock::nest);

            if defaults::is_list_type(&block.block_type) || nest.is_some() {
                let wrapper = nest.cloned().unwrap_or_else(|| TagPair::new("", ""));
                nesting.reconcile(&mut html, block, wrapper);
            } else {
                nesting.close_all(&mut html);
            }

            let inner = self.render_block_inner(block, &content.entity_map)?;
            tracing::trace!(
                block = %block.key,
                block_type = %block.block_type,
                depth = block.depth,
                "rendered block"
            );
            match resolved {
                Some(resolved) => html.push_str(&resolved.wrap(&inner)),
                None => html.push_str(&inner),
            }
        }

        nesting.close_all(&mut html);
        Ok(html)
    }

    fn render_block_inner(&self, block: &RawBlock, entity_map: &EntityMap) -> Result<String> {
        let encoded = encode_block(block);
        let rendered = render_entities(&encoded, entity_map, &*self.entity_to_html)?;
        render_inline_styles(&rendered, &*self.style_to_html)
    }
}

/// Open nesting wrappers, outermost first, with the block type that opened each level.
#[derive(Default)]
struct NestingStack {
    levels: Vec<(String, TagPair)>,
}

impl NestingStack {
    fn push(&mut self, html: &mut String, block_type: &str, wrapper: &TagPair) {
        html.push_str(&wrapper.start);
        self.levels.push((block_type.to_string(), wrapper.clone()));
    }

    fn pop(&mut self, html: &mut String) {
        if let Some((_, wrapper)) = self.levels.pop() {
            html.push_str(&wrapper.end);
        }
    }

    fn close_all(&mut self, html: &mut String) {
        while !self.levels.is_empty() {
            self.pop(html);
        }
    }

    /// Opens and closes wrappers until exactly `depth + 1` levels are open and the innermost one
    /// matches the block's type.
    fn reconcile(&mut self, html: &mut String, block: &RawBlock, wrapper: TagPair) {
        let depth = block.depth.min(MAX_DEPTH);
        loop {
            let settled = self.levels.len() == depth + 1
                && self.levels[depth].0 == block.block_type;
            if settled {
                return;
            }
            match self.levels.len().cmp(&(depth + 1)) {
                Ordering::Equal => {
                    self.pop(html);
                    self.push(html, &block.block_type, &wrapper);
                }
                Ordering::Greater => self.pop(html),
                Ordering::Less => self.push(html, &block.block_type, &wrapper),
            }
        }
    }
}

fn check_ranges(block: &RawBlock) -> Result<()> {
    let text_length = block.char_len();
    let spans = block
        .inline_style_ranges
        .iter()
        .map(|r| (r.offset(), r.length()))
        .chain(block.entity_ranges.iter().map(|r| (r.offset(), r.length())));
    for (offset, length) in spans {
        if offset.checked_add(length).is_none_or(|end| end > text_length) {
            return Err(Error::RangeOutOfBounds {
                block: block.key.clone(),
                offset,
                length,
                text_length,
            });
        }
    }
    Ok(())
}

/// Renders `content` with the built-in markup tables.
pub fn convert_to_html(content: &RawContentState) -> Result<String> {
    HtmlExporter::new().convert(content)
}

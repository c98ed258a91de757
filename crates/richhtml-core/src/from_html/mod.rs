//! HTML to raw content.
//!
//! The DOM is walked depth first; every subtree yields a [`chunk::Chunk`] and the merged chunk
//! of the whole body is split on block delimiters into blocks.

mod chunk;
mod fragment;

use crate::defaults::{SEMANTIC_BLOCK_TAGS, block_type_for_tag, process_inline_tag};
use crate::dom::{DomBuilder, HtmlDomBuilder, Node};
use crate::error::{Error, Result};
use crate::hooks::{
    BlockInfo, Hook, HtmlToBlock, HtmlToBlockFn, HtmlToEntity, HtmlToEntityFn, HtmlToStyle,
    HtmlToStyleFn, StyleSet, TextEntity, TextToEntity, TextToEntityFn,
};
use crate::model::{
    EntityKey, EntityMap, EntityRange, InlineStyleRange, RawBlock, RawContentState,
};
use chunk::{BLOCK_DELIMITER, BlockBoundary, Chunk};
use fragment::FragmentContext;
use indexmap::{IndexMap, IndexSet};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportOptions {
    /// Treat every `<br>` as a block boundary instead of a newline inside the block.
    pub flat: bool,
}

impl ImportOptions {
    pub fn flat() -> Self {
        Self { flat: true }
    }

    pub fn nested() -> Self {
        Self { flat: false }
    }
}

#[derive(Clone)]
pub struct HtmlImporter {
    html_to_style: Arc<HtmlToStyleFn>,
    html_to_block: Arc<HtmlToBlockFn>,
    html_to_entity: Arc<HtmlToEntityFn>,
    text_to_entity: Arc<TextToEntityFn>,
    dom_builder: Arc<dyn DomBuilder>,
}

impl fmt::Debug for HtmlImporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HtmlImporter").finish_non_exhaustive()
    }
}

impl Default for HtmlImporter {
    fn default() -> Self {
        Self::new()
    }
}

fn base_html_to_style(name: &str, node: &Node, styles: &StyleSet) -> StyleSet {
    process_inline_tag(name, node, styles)
}

fn base_html_to_block(
    name: &str,
    _node: &Node,
    last_list: Option<&str>,
    _in_block: Option<&str>,
) -> Option<BlockInfo> {
    block_type_for_tag(name, last_list).map(BlockInfo::from)
}

fn base_html_to_entity(_name: &str, _node: &Node, _map: &mut EntityMap) -> Option<EntityKey> {
    None
}

fn base_text_to_entity(_text: &str, _map: &mut EntityMap) -> Vec<TextEntity> {
    Vec::new()
}

impl HtmlImporter {
    pub fn new() -> Self {
        Self {
            html_to_style: Arc::new(|_: &str, _: &Node, styles: &StyleSet| styles.clone()),
            html_to_block: Arc::new(
                |_: &str, _: &Node, _: Option<&str>, _: Option<&str>| -> Option<BlockInfo> {
                    None
                },
            ),
            html_to_entity: Arc::new(base_html_to_entity),
            text_to_entity: Arc::new(base_text_to_entity),
            dom_builder: Arc::new(HtmlDomBuilder),
        }
    }

    /// Runs after the built-in inline tag table. A wrapping hook's base applies that table.
    pub fn with_html_to_style(mut self, hook: HtmlToStyle) -> Self {
        self.html_to_style =
            Hook::resolve(Some(&hook), Arc::new(base_html_to_style), |custom, _| custom);
        self
    }

    /// Blocks the hook does not classify fall back to the built-in tag table. A wrapping
    /// hook's base is that table.
    pub fn with_html_to_block(mut self, hook: HtmlToBlock) -> Self {
        self.html_to_block =
            Hook::resolve(Some(&hook), Arc::new(base_html_to_block), |custom, _| custom);
        self
    }

    pub fn with_html_to_entity(mut self, hook: HtmlToEntity) -> Self {
        self.html_to_entity =
            Hook::resolve(Some(&hook), Arc::new(base_html_to_entity), |custom, _| custom);
        self
    }

    pub fn with_text_to_entity(mut self, hook: TextToEntity) -> Self {
        self.text_to_entity =
            Hook::resolve(Some(&hook), Arc::new(base_text_to_entity), |custom, _| custom);
        self
    }

    pub fn with_dom_builder(mut self, builder: impl DomBuilder + 'static) -> Self {
        self.dom_builder = Arc::new(builder);
        self
    }

    pub fn convert(&self, html: &str, options: ImportOptions) -> Result<RawContentState> {
        let mut entity_map = EntityMap::new();
        let Some(chunk) = self.chunk_for_html(html, options, &mut entity_map) else {
            tracing::warn!("dom builder produced no document; returning empty content");
            return Ok(RawContentState::default());
        };
        let content = chunk_to_content(chunk, &entity_map)?;
        tracing::debug!(
            blocks = content.blocks.len(),
            entities = content.entity_map.len(),
            flat = options.flat,
            "converted html to content"
        );
        Ok(content)
    }

    fn chunk_for_html(
        &self,
        html: &str,
        options: ImportOptions,
        entity_map: &mut EntityMap,
    ) -> Option<Chunk> {
        let html = html.trim().replace('\r', "").replace("&nbsp;", " ");
        let body = self.dom_builder.build(&html)?;

        let semantic = SEMANTIC_BLOCK_TAGS
            .iter()
            .any(|tag| html.contains(&format!("<{tag}")));
        let block_tags: Vec<&'static str> = if semantic {
            SEMANTIC_BLOCK_TAGS.iter().copied().chain(["div"]).collect()
        } else {
            vec!["div"]
        };

        let mut context = FragmentContext {
            html_to_style: &*self.html_to_style,
            html_to_block: &*self.html_to_block,
            html_to_entity: &*self.html_to_entity,
            text_to_entity: &*self.text_to_entity,
            flat: options.flat,
            block_tags: &block_tags,
            entity_map,
        };
        let mut chunk =
            context.gen_fragment(&body, &StyleSet::new(), Some("ul"), None, -1, None);

        if chunk.text.first() == Some(&BLOCK_DELIMITER) {
            chunk.text.remove(0);
            if !chunk.inlines.is_empty() {
                chunk.inlines.remove(0);
            }
            if !chunk.entities.is_empty() {
                chunk.entities.remove(0);
            }
        }
        if chunk.text.last() == Some(&BLOCK_DELIMITER) {
            chunk.text.pop();
            chunk.inlines.pop();
            chunk.entities.pop();
            chunk.blocks.pop();
        }
        if chunk.blocks.is_empty() {
            chunk.blocks.push(BlockBoundary::unstyled());
        }
        // text before the first boundary belongs to an implicit unstyled block
        let segments = chunk.text.iter().filter(|c| **c == BLOCK_DELIMITER).count() + 1;
        if segments == chunk.blocks.len() + 1 {
            chunk.blocks.insert(0, BlockBoundary::unstyled());
        }
        Some(chunk)
    }
}

/// Zero-padded base-36 block key.
fn block_key(index: usize) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut n = index;
    let mut key = Vec::new();
    loop {
        key.push(DIGITS[n % 36]);
        n /= 36;
        if n == 0 {
            break;
        }
    }
    while key.len() < 5 {
        key.push(b'0');
    }
    key.iter().rev().map(|b| *b as char).collect()
}

fn style_ranges(inlines: &[StyleSet]) -> Vec<InlineStyleRange> {
    let styles: IndexSet<&str> = inlines
        .iter()
        .flat_map(|set| set.iter().map(String::as_str))
        .collect();

    let mut ranges = Vec::new();
    for style in styles {
        let mut i = 0;
        while i < inlines.len() {
            if !inlines[i].contains(style) {
                i += 1;
                continue;
            }
            let start = i;
            while i < inlines.len() && inlines[i].contains(style) {
                i += 1;
            }
            ranges.push(InlineStyleRange::new(start, i - start, style));
        }
    }
    ranges
}

fn entity_runs(entities: &[Option<EntityKey>]) -> Vec<(usize, usize, &EntityKey)> {
    let mut runs = Vec::new();
    let mut i = 0;
    while i < entities.len() {
        let Some(key) = &entities[i] else {
            i += 1;
            continue;
        };
        let start = i;
        while i < entities.len() && entities[i].as_ref() == Some(key) {
            i += 1;
        }
        runs.push((start, i - start, key));
    }
    runs
}

/// Splits the merged chunk into blocks and renumbers entities by first reference.
fn chunk_to_content(chunk: Chunk, source: &EntityMap) -> Result<RawContentState> {
    let mut renumbered: IndexMap<EntityKey, EntityKey> = IndexMap::new();
    let mut entity_map = EntityMap::new();
    let mut blocks = Vec::new();
    let total = chunk.text.len();
    let mut start = 0;

    for (index, segment) in chunk.text.split(|c| *c == BLOCK_DELIMITER).enumerate() {
        let end = start + segment.len();
        let inlines = &chunk.inlines[start.min(total)..end.min(chunk.inlines.len())];
        let entities = &chunk.entities[start.min(total)..end.min(chunk.entities.len())];
        let boundary = chunk
            .blocks
            .get(index)
            .cloned()
            .unwrap_or_else(BlockBoundary::unstyled);

        let mut block = RawBlock::new(boundary.block_type, segment.iter().collect::<String>())
            .with_key(block_key(index))
            .with_depth(boundary.depth)
            .with_data(boundary.data);
        block.inline_style_ranges = style_ranges(inlines);

        for (offset, length, key) in entity_runs(entities) {
            let next = EntityKey::from(renumbered.len());
            let new_key = renumbered.entry(key.clone()).or_insert(next).clone();
            if entity_map.get(&new_key).is_none() {
                let entity = source
                    .get(key)
                    .ok_or_else(|| Error::MissingEntity { key: key.clone() })?;
                entity_map.insert(new_key.clone(), entity.clone());
            }
            block.entity_ranges.push(EntityRange::new(offset, length, new_key));
        }

        blocks.push(block);
        start = end + 1;
    }

    Ok(RawContentState::new(blocks, entity_map))
}

/// Parses `html` with the built-in tables, treating `<br>` as a newline inside the block.
pub fn convert_from_html(html: &str) -> Result<RawContentState> {
    HtmlImporter::new().convert(html, ImportOptions::nested())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_keys_are_padded_base36() {
        assert_eq!(block_key(0), "00000");
        assert_eq!(block_key(35), "0000z");
        assert_eq!(block_key(36), "00010");
    }

    #[test]
    fn style_runs_follow_first_appearance() {
        let set = |names: &[&str]| names.iter().map(|s| s.to_string()).collect::<StyleSet>();
        let inlines = [
            set(&["ITALIC"]),
            set(&["ITALIC", "BOLD"]),
            set(&[]),
            set(&["BOLD"]),
        ];
        let ranges = style_ranges(&inlines);
        assert_eq!(
            ranges,
            [
                InlineStyleRange::new(0, 2, "ITALIC"),
                InlineStyleRange::new(1, 1, "BOLD"),
                InlineStyleRange::new(3, 1, "BOLD"),
            ]
        );
    }
}

use super::chunk::Chunk;
use crate::defaults::{
    ATOMIC, CODE_BLOCK, ORDERED_LIST_ITEM, UNORDERED_LIST_ITEM, UNSTYLED, block_type_for_tag,
    is_list_type, process_inline_tag,
};
use crate::dom::Node;
use crate::hooks::{
    BlockInfo, HtmlToBlockFn, HtmlToEntityFn, HtmlToStyleFn, StyleSet, TextToEntityFn,
};
use crate::model::{BlockData, EntityKey, EntityMap};
use crate::range::range_sort;

/// Everything that stays fixed while walking one document.
pub(crate) struct FragmentContext<'a> {
    pub html_to_style: &'a HtmlToStyleFn,
    pub html_to_block: &'a HtmlToBlockFn,
    pub html_to_entity: &'a HtmlToEntityFn,
    pub text_to_entity: &'a TextToEntityFn,
    pub flat: bool,
    /// Tags that open a block when no block is open.
    pub block_tags: &'a [&'static str],
    pub entity_map: &'a mut EntityMap,
}

fn split_info(info: Option<BlockInfo>) -> (Option<String>, BlockData) {
    match info {
        Some(info) if !info.block_type.is_empty() => (Some(info.block_type), info.data),
        Some(info) => (None, info.data),
        None => (None, BlockData::new()),
    }
}

impl FragmentContext<'_> {
    fn is_block_tag(&self, name: &str) -> bool {
        self.block_tags.iter().any(|tag| *tag == name)
    }

    /// Converts `node` and its subtree.
    ///
    /// `last_list` is the innermost list tag, `in_block` the type of the open block and `depth`
    /// the list nesting, which starts at -1 for the synthetic root list.
    pub fn gen_fragment(
        &mut self,
        node: &Node,
        style: &StyleSet,
        last_list: Option<&str>,
        in_block: Option<&str>,
        depth: isize,
        in_entity: Option<&EntityKey>,
    ) -> Chunk {
        let name = node.node_name();

        if let Node::Text(text) = node {
            return self.text_fragment(text, style, in_block, in_entity);
        }

        if name == "br" {
            return match in_block {
                None => Chunk::soft_newline(UNSTYLED, depth, true, BlockData::new()),
                Some(block_type) => {
                    Chunk::soft_newline(block_type, depth, self.flat, BlockData::new())
                }
            };
        }

        let style = process_inline_tag(name, node, style);
        let style = (self.html_to_style)(name, node, &style);

        let mut last_list = last_list.map(str::to_string);
        let mut in_block = in_block.map(str::to_string);
        let mut depth = depth;
        if name == "ul" || name == "ol" {
            if last_list.is_some() {
                depth += 1;
            }
            last_list = Some(name.to_string());
            in_block = None;
        }

        let (block_type, block_data) = split_info((self.html_to_block)(
            name,
            node,
            last_list.as_deref(),
            in_block.as_deref(),
        ));

        let mut chunk = Chunk::default();
        let mut new_block = false;
        let mut next_block_type = UNSTYLED;

        if in_block.is_none() && (self.is_block_tag(name) || block_type.is_some()) {
            let opened = block_type
                .clone()
                .or_else(|| block_type_for_tag(name, last_list.as_deref()).map(str::to_string))
                .unwrap_or_else(|| UNSTYLED.to_string());
            chunk = Chunk::divider(&opened, depth, block_data.clone());
            in_block = Some(opened);
            new_block = true;
        } else if last_list.is_some()
            && in_block.as_deref().is_some_and(is_list_type)
            && name == "li"
        {
            let item_type = if last_list.as_deref() == Some("ol") {
                ORDERED_LIST_ITEM
            } else {
                UNORDERED_LIST_ITEM
            };
            chunk = Chunk::divider(item_type, depth, BlockData::new());
            in_block = Some(item_type.to_string());
            new_block = true;
            next_block_type = if last_list.as_deref() == Some("ul") {
                UNORDERED_LIST_ITEM
            } else {
                ORDERED_LIST_ITEM
            };
        } else if in_block.as_deref().is_some_and(|open| open != ATOMIC)
            && block_type.as_deref() == Some(ATOMIC)
        {
            // atomic blocks inside other blocks are always split out
            in_block = Some(ATOMIC.to_string());
            new_block = true;
            chunk = Chunk::soft_newline(ATOMIC, depth, true, block_data.clone());
        }

        // An atomic entity needs a character to attach to.
        let placeholder;
        let children: &[Node] = if node.children().is_empty()
            && in_entity.is_some()
            && (block_type.as_deref() == Some(ATOMIC) || in_block.as_deref() == Some(ATOMIC))
        {
            placeholder = [Node::text("a")];
            &placeholder
        } else {
            node.children()
        };

        for (index, child) in children.iter().enumerate() {
            let child_name = child.node_name();
            let entity = (self.html_to_entity)(child_name, child, &mut *self.entity_map);
            let child_chunk = self.gen_fragment(
                child,
                &style,
                last_list.as_deref(),
                in_block.as_deref(),
                depth,
                entity.as_ref().or(in_entity),
            );
            chunk = chunk.join(child_chunk, self.flat);

            let has_sibling = index + 1 < children.len();
            if has_sibling && self.is_block_tag(child_name) && in_block.is_some() {
                let (sibling_type, sibling_data) = split_info((self.html_to_block)(
                    child_name,
                    child,
                    last_list.as_deref(),
                    in_block.as_deref(),
                ));
                let sibling_type = sibling_type
                    .or_else(|| {
                        block_type_for_tag(child_name, last_list.as_deref()).map(str::to_string)
                    })
                    .unwrap_or_else(|| UNSTYLED.to_string());
                chunk = chunk.join(
                    Chunk::soft_newline(&sibling_type, depth, self.flat, sibling_data),
                    self.flat,
                );
            }
        }

        // A list nested inside an item ends with its own unstyled divider, so closing the item
        // here leaves an empty block behind and the next sibling item opens a fresh list.
        if new_block {
            chunk = chunk.join(
                Chunk::divider(next_block_type, depth, BlockData::new()),
                self.flat,
            );
        }

        chunk
    }

    fn text_fragment(
        &mut self,
        text: &str,
        style: &StyleSet,
        in_block: Option<&str>,
        in_entity: Option<&EntityKey>,
    ) -> Chunk {
        let blank = text.trim().is_empty();
        if blank && in_block.is_none() {
            return Chunk::default();
        }
        let in_code = in_block == Some(CODE_BLOCK);
        if blank && !in_code {
            return Chunk::whitespace(in_entity.cloned());
        }

        let text = if in_code {
            text.to_string()
        } else {
            text.replace('\n', " ")
        };

        let mut found = (self.text_to_entity)(&text, &mut *self.entity_map);
        range_sort(&mut found);

        let mut chars: Vec<char> = text.chars().collect();
        let mut entities = vec![in_entity.cloned(); chars.len()];
        let mut offset_change: isize = 0;
        for found in found {
            let start = found
                .offset
                .saturating_add_signed(offset_change)
                .min(chars.len());
            let end = start.saturating_add(found.length).min(chars.len());
            let replacement: Vec<char> = match &found.result {
                Some(result) => result.chars().collect(),
                None => chars[start..end].to_vec(),
            };
            let replacement_length = replacement.len();
            entities.splice(
                start..end,
                std::iter::repeat_n(Some(found.key.clone()), replacement_length),
            );
            chars.splice(start..end, replacement);
            offset_change += replacement_length as isize - (end - start) as isize;
        }

        Chunk::text(chars, style, entities)
    }
}

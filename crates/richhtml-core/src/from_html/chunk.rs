use crate::defaults::{MAX_DEPTH, UNSTYLED};
use crate::hooks::StyleSet;
use crate::model::{BlockData, EntityKey};

/// Marks a block boundary inside chunk text.
pub(crate) const BLOCK_DELIMITER: char = '\r';
const SPACE: char = ' ';
const SOFT_NEWLINE: char = '\n';

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BlockBoundary {
    pub block_type: String,
    pub data: BlockData,
    pub depth: usize,
}

impl BlockBoundary {
    pub fn new(block_type: &str, depth: isize, data: BlockData) -> Self {
        Self {
            block_type: block_type.to_string(),
            data,
            depth: depth.clamp(0, MAX_DEPTH as isize) as usize,
        }
    }

    pub fn unstyled() -> Self {
        Self::new(UNSTYLED, 0, BlockData::new())
    }
}

/// Text accumulated for one DOM subtree, with one style set and one entity slot per character.
///
/// Each [`BLOCK_DELIMITER`] in `text` owns the next entry of `blocks`.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Chunk {
    pub text: Vec<char>,
    pub inlines: Vec<StyleSet>,
    pub entities: Vec<Option<EntityKey>>,
    pub blocks: Vec<BlockBoundary>,
    pub is_newline: bool,
}

impl Chunk {
    pub fn text(text: Vec<char>, style: &StyleSet, entities: Vec<Option<EntityKey>>) -> Self {
        Self {
            inlines: vec![style.clone(); text.len()],
            text,
            entities,
            blocks: Vec::new(),
            is_newline: false,
        }
    }

    pub fn whitespace(entity: Option<EntityKey>) -> Self {
        Self {
            text: vec![SPACE],
            inlines: vec![StyleSet::new()],
            entities: vec![entity],
            blocks: Vec::new(),
            is_newline: false,
        }
    }

    /// A line break: a block split when `flat`, otherwise a newline inside the current block.
    pub fn soft_newline(block_type: &str, depth: isize, flat: bool, data: BlockData) -> Self {
        if !flat {
            return Self {
                text: vec![SOFT_NEWLINE],
                inlines: vec![StyleSet::new()],
                entities: vec![None],
                blocks: Vec::new(),
                is_newline: false,
            };
        }
        Self {
            is_newline: true,
            ..Self::divider(block_type, depth, data)
        }
    }

    pub fn divider(block_type: &str, depth: isize, data: BlockData) -> Self {
        Self {
            text: vec![BLOCK_DELIMITER],
            inlines: vec![StyleSet::new()],
            entities: vec![None],
            blocks: vec![BlockBoundary::new(block_type, depth, data)],
            is_newline: false,
        }
    }

    fn is_divider(&self) -> bool {
        self.text == [BLOCK_DELIMITER]
    }

    fn pop_last(&mut self) {
        self.text.pop();
        self.inlines.pop();
        self.entities.pop();
        self.blocks.pop();
    }

    fn drop_first_char(&mut self) {
        self.text.remove(0);
        if !self.inlines.is_empty() {
            self.inlines.remove(0);
        }
        if !self.entities.is_empty() {
            self.entities.remove(0);
        }
    }

    /// Appends `next`, collapsing delimiters that would otherwise produce spurious empty blocks.
    pub fn join(mut self, mut next: Chunk, flat: bool) -> Chunk {
        let adjacent_dividers =
            self.text.last() == Some(&BLOCK_DELIMITER) && next.text.first() == Some(&BLOCK_DELIMITER);
        let joining_blocks = !self.is_divider() && !next.is_divider();
        let newline_into_empty_block = self.is_divider() && !self.is_newline && next.is_newline;
        if adjacent_dividers && (joining_blocks || newline_into_empty_block) {
            self.pop_last();
        }

        // whitespace right after a block boundary is decoration in flat mode
        if flat && self.text.last() == Some(&BLOCK_DELIMITER) {
            if next.text == [SPACE] || next.text == [SOFT_NEWLINE] {
                return self;
            }
            if matches!(next.text.first(), Some(&SPACE | &SOFT_NEWLINE)) {
                next.drop_first_char();
            }
        }

        tracing::trace!(
            left = self.text.len(),
            right = next.text.len(),
            blocks = self.blocks.len() + next.blocks.len(),
            "join chunks"
        );

        let is_newline = self.text.is_empty() && next.is_newline;
        self.text.append(&mut next.text);
        self.inlines.append(&mut next.inlines);
        self.entities.append(&mut next.entities);
        self.blocks.append(&mut next.blocks);
        self.is_newline = is_newline;
        self
    }
}

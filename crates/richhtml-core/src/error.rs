use crate::model::EntityKey;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Missing markup for inline style {style}")]
    MissingStyleMarkup { style: String },

    #[error("Entity {key} is referenced by a block but missing from the entity map")]
    MissingEntity { key: EntityKey },

    #[error("Malformed markup for <{tag}>: {message}")]
    MalformedMarkup { tag: String, message: String },

    #[error("Character {index}: style {found} to be closed doesn't match expected {expected}")]
    StyleStackMismatch {
        index: usize,
        found: String,
        expected: String,
    },

    #[error("Character {index}: {extra} styles left on stack that should no longer be there")]
    StyleStackSize { index: usize, extra: isize },

    #[error("Block {block}: entity ranges for {first} and {second} overlap")]
    OverlappingEntityRanges {
        block: String,
        first: EntityKey,
        second: EntityKey,
    },

    #[error(
        "Block {block}: range at offset {offset} with length {length} exceeds text length {text_length}"
    )]
    RangeOutOfBounds {
        block: String,
        offset: usize,
        length: usize,
        text_length: usize,
    },

    #[error("Invalid markup config: {message}")]
    InvalidConfig { message: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

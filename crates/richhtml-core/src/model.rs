//! Raw content model: blocks annotated with style and entity ranges, plus the entity map.
//!
//! All offsets and lengths count Unicode scalar values (`char`s), never UTF-8 bytes.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

pub type BlockData = Map<String, Value>;

/// Anything that covers `[offset, offset + length)` of a block's text.
pub trait Mutation: Clone {
    fn offset(&self) -> usize;
    fn length(&self) -> usize;
    fn with_span(&self, offset: usize, length: usize) -> Self;

    fn end(&self) -> usize {
        self.offset().saturating_add(self.length())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineStyleRange {
    pub offset: usize,
    pub length: usize,
    pub style: String,
}

impl InlineStyleRange {
    pub fn new(offset: usize, length: usize, style: impl Into<String>) -> Self {
        Self {
            offset,
            length,
            style: style.into(),
        }
    }
}

impl Mutation for InlineStyleRange {
    fn offset(&self) -> usize {
        self.offset
    }

    fn length(&self) -> usize {
        self.length
    }

    fn with_span(&self, offset: usize, length: usize) -> Self {
        Self {
            offset,
            length,
            style: self.style.clone(),
        }
    }
}

/// Reference into an [`EntityMap`].
///
/// Raw documents in the wild use both `"key": 0` and `"key": "0"`; both deserialize to the same
/// key. Keys always serialize as strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntityKey(String);

impl EntityKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EntityKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<usize> for EntityKey {
    fn from(value: usize) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for EntityKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Int(u64),
            Str(String),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Int(n) => Self(n.to_string()),
            Repr::Str(s) => Self(s),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRange {
    pub offset: usize,
    pub length: usize,
    pub key: EntityKey,
}

impl EntityRange {
    pub fn new(offset: usize, length: usize, key: impl Into<EntityKey>) -> Self {
        Self {
            offset,
            length,
            key: key.into(),
        }
    }
}

impl Mutation for EntityRange {
    fn offset(&self) -> usize {
        self.offset
    }

    fn length(&self) -> usize {
        self.length
    }

    fn with_span(&self, offset: usize, length: usize) -> Self {
        Self {
            offset,
            length,
            key: self.key.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mutability {
    #[default]
    Mutable,
    Immutable,
    Segmented,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEntity {
    #[serde(rename = "type")]
    pub entity_type: String,
    #[serde(default)]
    pub mutability: Mutability,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl RawEntity {
    pub fn new(entity_type: impl Into<String>, mutability: Mutability, data: BlockData) -> Self {
        Self {
            entity_type: entity_type.into(),
            mutability,
            data,
        }
    }

    pub fn data_str(&self, field: &str) -> Option<&str> {
        self.data.get(field).and_then(Value::as_str)
    }
}

/// Insertion-ordered entity storage keyed by [`EntityKey`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityMap(IndexMap<EntityKey, RawEntity>);

impl EntityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a new entity under the next free sequential key (`"0"`, `"1"`, ...).
    pub fn create(
        &mut self,
        entity_type: impl Into<String>,
        mutability: Mutability,
        data: BlockData,
    ) -> EntityKey {
        let mut n = self.0.len();
        while self.0.contains_key(&EntityKey::from(n)) {
            n += 1;
        }
        let key = EntityKey::from(n);
        self.0
            .insert(key.clone(), RawEntity::new(entity_type, mutability, data));
        key
    }

    pub fn insert(&mut self, key: impl Into<EntityKey>, entity: RawEntity) -> Option<RawEntity> {
        self.0.insert(key.into(), entity)
    }

    pub fn get(&self, key: &EntityKey) -> Option<&RawEntity> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &EntityKey) -> Option<&mut RawEntity> {
        self.0.get_mut(key)
    }

    /// Shallow-merges `data` into the entity's data. Returns `false` for unknown keys.
    pub fn merge_data(&mut self, key: &EntityKey, data: BlockData) -> bool {
        let Some(entity) = self.0.get_mut(key) else {
            return false;
        };
        entity.data.extend(data);
        true
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EntityKey, &RawEntity)> {
        self.0.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBlock {
    #[serde(default)]
    pub key: String,
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: String,
    #[serde(default)]
    pub depth: usize,
    #[serde(default)]
    pub inline_style_ranges: Vec<InlineStyleRange>,
    #[serde(default)]
    pub entity_ranges: Vec<EntityRange>,
    #[serde(default)]
    pub data: BlockData,
}

impl RawBlock {
    pub fn new(block_type: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            key: String::new(),
            block_type: block_type.into(),
            text: text.into(),
            depth: 0,
            inline_style_ranges: Vec::new(),
            entity_ranges: Vec::new(),
            data: BlockData::new(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_style(mut self, offset: usize, length: usize, style: impl Into<String>) -> Self {
        self.inline_style_ranges
            .push(InlineStyleRange::new(offset, length, style));
        self
    }

    pub fn with_entity(mut self, offset: usize, length: usize, key: impl Into<EntityKey>) -> Self {
        self.entity_ranges.push(EntityRange::new(offset, length, key));
        self
    }

    pub fn with_data(mut self, data: BlockData) -> Self {
        self.data = data;
        self
    }

    /// Text length in code points.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawContentState {
    pub blocks: Vec<RawBlock>,
    #[serde(default)]
    pub entity_map: EntityMap,
}

impl RawContentState {
    pub fn new(blocks: Vec<RawBlock>, entity_map: EntityMap) -> Self {
        Self { blocks, entity_map }
    }

    pub fn from_json_str(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_value(&self) -> crate::Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entity_keys_accept_integers_and_strings() {
        let state: RawContentState = serde_json::from_value(json!({
            "blocks": [{
                "type": "unstyled",
                "text": "ab",
                "entityRanges": [
                    { "offset": 0, "length": 1, "key": 0 },
                    { "offset": 1, "length": 1, "key": "1" }
                ]
            }],
            "entityMap": {
                "0": { "type": "LINK", "mutability": "MUTABLE", "data": { "url": "a" } },
                "1": { "type": "LINK", "mutability": "IMMUTABLE", "data": { "url": "b" } }
            }
        }))
        .unwrap();

        let block = &state.blocks[0];
        assert_eq!(block.entity_ranges[0].key, EntityKey::from("0"));
        assert_eq!(block.entity_ranges[1].key, EntityKey::from(1usize));
        assert_eq!(block.depth, 0);
        assert!(block.inline_style_ranges.is_empty());
        assert_eq!(
            state
                .entity_map
                .get(&EntityKey::from("1"))
                .unwrap()
                .mutability,
            Mutability::Immutable
        );

        let out = state.to_json_value().unwrap();
        assert_eq!(out["blocks"][0]["entityRanges"][0]["key"], json!("0"));
        assert_eq!(out["blocks"][0]["inlineStyleRanges"], json!([]));
    }

    #[test]
    fn entity_map_creates_sequential_keys_and_merges_data() {
        let mut map = EntityMap::new();
        let a = map.create("LINK", Mutability::Mutable, BlockData::new());
        let b = map.create("IMAGE", Mutability::Immutable, BlockData::new());
        assert_eq!(a.as_str(), "0");
        assert_eq!(b.as_str(), "1");

        let mut extra = BlockData::new();
        extra.insert("test".to_string(), json!(true));
        assert!(map.merge_data(&a, extra.clone()));
        assert!(!map.merge_data(&EntityKey::from("9"), extra));
        assert_eq!(map.get(&a).unwrap().data["test"], json!(true));
    }
}

//! Declarative markup configuration loaded from JSON.
//!
//! ```json
//! {
//!   "styles": { "HIGHLIGHT": { "start": "<mark>", "end": "</mark>" } },
//!   "blocks": { "blockquote": { "start": "<blockquote>", "end": "</blockquote>" } },
//!   "entities": { "LINK": { "element": "a", "attributes": { "href": "url" } } }
//! }
//! ```
//!
//! Entries override the built-in tables; anything not listed falls back to them.

use crate::error::{Error, Result};
use crate::hooks::{BlockToHtml, EntityToHtml, StyleToHtml};
use crate::markup::{BlockMarkup, ElementSpec, Markup};
use crate::model::{RawBlock, RawEntity};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MarkupConfig {
    #[serde(default)]
    pub styles: IndexMap<String, StyleTemplate>,
    #[serde(default)]
    pub blocks: IndexMap<String, BlockTemplate>,
    #[serde(default)]
    pub entities: IndexMap<String, EntityTemplate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StyleTemplate {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BlockTemplate {
    pub start: String,
    pub end: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nest_start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nest_end: Option<String>,
}

/// Renders an entity as `<element attr="data[field]" ...>text</element>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntityTemplate {
    pub element: String,
    /// Attribute name to entity data field.
    #[serde(default)]
    pub attributes: IndexMap<String, String>,
}

fn invalid(message: impl Into<String>) -> Error {
    Error::InvalidConfig {
        message: message.into(),
    }
}

impl MarkupConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| invalid(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        let config: Self = serde_json::from_value(value).map_err(|e| invalid(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty() && self.blocks.is_empty() && self.entities.is_empty()
    }

    /// Overlays `other` on top of `self`; entries in `other` win.
    pub fn merge(&mut self, other: MarkupConfig) {
        self.styles.extend(other.styles);
        self.blocks.extend(other.blocks);
        self.entities.extend(other.entities);
    }

    pub fn validate(&self) -> Result<()> {
        for (style, template) in &self.styles {
            if template.start.is_empty() || template.end.is_empty() {
                return Err(invalid(format!(
                    "style {style} needs a non-empty start and end"
                )));
            }
        }
        for (block_type, template) in &self.blocks {
            if template.nest_start.is_some() != template.nest_end.is_some() {
                return Err(invalid(format!(
                    "block {block_type} must set both nestStart and nestEnd"
                )));
            }
        }
        for (entity_type, template) in &self.entities {
            let valid_name = !template.element.is_empty()
                && template
                    .element
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'-');
            if !valid_name {
                return Err(invalid(format!(
                    "entity {entity_type} has an invalid element name {:?}",
                    template.element
                )));
            }
        }
        Ok(())
    }

    pub fn style_hook(&self) -> StyleToHtml {
        let styles = Arc::new(self.styles.clone());
        StyleToHtml::direct(move |style: &str| {
            styles
                .get(style)
                .map(|template| Markup::tags(template.start.as_str(), template.end.as_str()))
        })
    }

    pub fn block_hook(&self) -> BlockToHtml {
        let blocks = Arc::new(self.blocks.clone());
        BlockToHtml::direct(move |block: &RawBlock| {
            let template = blocks.get(&block.block_type)?;
            let mut markup = BlockMarkup::tags(template.start.as_str(), template.end.as_str());
            if let Some(empty) = &template.empty {
                markup = markup.with_empty(Markup::html(empty.as_str()));
            }
            if let (Some(start), Some(end)) = (&template.nest_start, &template.nest_end) {
                markup = markup.with_nest_tags(start.as_str(), end.as_str());
            }
            Some(markup)
        })
    }

    pub fn entity_hook(&self) -> EntityToHtml {
        let entities = Arc::new(self.entities.clone());
        EntityToHtml::direct(move |entity: &RawEntity, _text: &str| {
            let template = entities.get(&entity.entity_type)?;
            let mut element = ElementSpec::new(template.element.as_str());
            for (attribute, field) in &template.attributes {
                let value = match entity.data.get(field) {
                    None | Some(Value::Null) => continue,
                    Some(Value::String(s)) => s.clone(),
                    Some(other) => other.to_string(),
                };
                element = element.attr(attribute.as_str(), value);
            }
            Some(Markup::Element(element))
        })
    }
}

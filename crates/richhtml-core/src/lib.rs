#![forbid(unsafe_code)]

//! Rich-text block model <-> HTML conversion (headless).
//!
//! Design goals:
//! - HTML -> raw content -> HTML is stable for documents built from the default tables
//! - all offsets count code points, never UTF-8 bytes
//! - every table can be extended or replaced through hooks, without forking the pipeline

pub mod config;
pub mod defaults;
pub mod dom;
pub mod error;
pub mod from_html;
pub mod hooks;
pub mod markup;
pub mod model;
pub mod range;
pub mod to_html;

pub use config::MarkupConfig;
pub use dom::{DomBuilder, Element, HtmlDomBuilder, Node};
pub use error::{Error, Result};
pub use from_html::{HtmlImporter, ImportOptions, convert_from_html};
pub use hooks::{
    BlockInfo, BlockToHtml, EntityToHtml, Hook, HtmlToBlock, HtmlToEntity, HtmlToStyle,
    StyleSet, StyleToHtml, TextEntity, TextToEntity,
};
pub use markup::{BlockMarkup, ElementSpec, Markup};
pub use model::{
    BlockData, EntityKey, EntityMap, EntityRange, InlineStyleRange, Mutability, Mutation,
    RawBlock, RawContentState, RawEntity,
};
pub use to_html::{HtmlExporter, convert_to_html};

#[cfg(test)]
mod tests;

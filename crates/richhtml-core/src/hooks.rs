//! Caller-supplied renderers and classifiers.
//!
//! Every hook is either [`Hook::Direct`], a plain function, or [`Hook::Wrapping`], a decorator
//! that receives the built-in behavior and returns the function to use. Hooks are resolved once
//! when they are installed on an exporter or importer.

use crate::dom::Node;
use crate::markup::{BlockMarkup, Markup};
use crate::model::{BlockData, EntityKey, EntityMap, Mutation, RawBlock, RawEntity};
use indexmap::IndexSet;
use regex::{Captures, Regex};
use std::fmt;
use std::sync::Arc;

/// Styles applied to one character, in the order they were first seen.
pub type StyleSet = IndexSet<String>;

pub type StyleToHtmlFn = dyn Fn(&str) -> Option<Markup> + Send + Sync;
pub type BlockToHtmlFn = dyn Fn(&RawBlock) -> Option<BlockMarkup> + Send + Sync;
pub type EntityToHtmlFn = dyn Fn(&RawEntity, &str) -> Option<Markup> + Send + Sync;

pub type HtmlToStyleFn = dyn Fn(&str, &Node, &StyleSet) -> StyleSet + Send + Sync;
/// `(tag, node, last_list, in_block)`.
pub type HtmlToBlockFn =
    dyn Fn(&str, &Node, Option<&str>, Option<&str>) -> Option<BlockInfo> + Send + Sync;
pub type HtmlToEntityFn = dyn Fn(&str, &Node, &mut EntityMap) -> Option<EntityKey> + Send + Sync;
pub type TextToEntityFn = dyn Fn(&str, &mut EntityMap) -> Vec<TextEntity> + Send + Sync;

pub type StyleToHtml = Hook<StyleToHtmlFn>;
pub type BlockToHtml = Hook<BlockToHtmlFn>;
pub type EntityToHtml = Hook<EntityToHtmlFn>;
pub type HtmlToStyle = Hook<HtmlToStyleFn>;
pub type HtmlToBlock = Hook<HtmlToBlockFn>;
pub type HtmlToEntity = Hook<HtmlToEntityFn>;
pub type TextToEntity = Hook<TextToEntityFn>;

pub enum Hook<F: ?Sized> {
    Direct(Arc<F>),
    Wrapping(Arc<dyn Fn(Arc<F>) -> Arc<F> + Send + Sync>),
}

impl<F: ?Sized> Clone for Hook<F> {
    fn clone(&self) -> Self {
        match self {
            Hook::Direct(f) => Hook::Direct(Arc::clone(f)),
            Hook::Wrapping(w) => Hook::Wrapping(Arc::clone(w)),
        }
    }
}

impl<F: ?Sized> fmt::Debug for Hook<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hook::Direct(_) => f.write_str("Hook::Direct(..)"),
            Hook::Wrapping(_) => f.write_str("Hook::Wrapping(..)"),
        }
    }
}

impl<F: ?Sized> Hook<F> {
    /// Collapses the hook into the function that will actually run.
    ///
    /// `base` is the built-in behavior; `direct` decides how a direct hook combines with it.
    pub(crate) fn resolve(
        hook: Option<&Self>,
        base: Arc<F>,
        direct: impl FnOnce(Arc<F>, Arc<F>) -> Arc<F>,
    ) -> Arc<F> {
        match hook {
            None => base,
            Some(Hook::Direct(custom)) => direct(Arc::clone(custom), base),
            Some(Hook::Wrapping(wrap)) => wrap(base),
        }
    }
}

macro_rules! hook_constructors {
    ($alias:ident, ($($arg:ty),*) -> $ret:ty) => {
        impl Hook<$alias> {
            pub fn direct<G>(f: G) -> Self
            where
                G: Fn($($arg),*) -> $ret + Send + Sync + 'static,
            {
                Hook::Direct(Arc::new(f))
            }

            /// `wrap` receives the built-in behavior and returns the replacement.
            pub fn wrapping<W, G>(wrap: W) -> Self
            where
                W: Fn(Arc<$alias>) -> G + Send + Sync + 'static,
                G: Fn($($arg),*) -> $ret + Send + Sync + 'static,
            {
                Hook::Wrapping(Arc::new(move |next: Arc<$alias>| -> Arc<$alias> {
                    Arc::new(wrap(next))
                }))
            }
        }
    };
}

hook_constructors!(StyleToHtmlFn, (&str) -> Option<Markup>);
hook_constructors!(BlockToHtmlFn, (&RawBlock) -> Option<BlockMarkup>);
hook_constructors!(EntityToHtmlFn, (&RawEntity, &str) -> Option<Markup>);
hook_constructors!(HtmlToStyleFn, (&str, &Node, &StyleSet) -> StyleSet);
hook_constructors!(
    HtmlToBlockFn,
    (&str, &Node, Option<&str>, Option<&str>) -> Option<BlockInfo>
);
hook_constructors!(HtmlToEntityFn, (&str, &Node, &mut EntityMap) -> Option<EntityKey>);
hook_constructors!(TextToEntityFn, (&str, &mut EntityMap) -> Vec<TextEntity>);

/// Block type (and optional data) chosen by a block classifier.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockInfo {
    pub block_type: String,
    pub data: BlockData,
}

impl BlockInfo {
    pub fn new(block_type: impl Into<String>) -> Self {
        Self {
            block_type: block_type.into(),
            data: BlockData::new(),
        }
    }

    pub fn with_data(mut self, data: BlockData) -> Self {
        self.data = data;
        self
    }
}

impl From<&str> for BlockInfo {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for BlockInfo {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// An entity found by matching text content, in code points of the text it was found in.
///
/// `result` replaces the matched text when set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEntity {
    pub offset: usize,
    pub length: usize,
    pub key: EntityKey,
    pub result: Option<String>,
}

impl TextEntity {
    pub fn new(offset: usize, length: usize, key: impl Into<EntityKey>) -> Self {
        Self {
            offset,
            length,
            key: key.into(),
            result: None,
        }
    }

    pub fn with_result(mut self, result: impl Into<String>) -> Self {
        self.result = Some(result.into());
        self
    }
}

impl Mutation for TextEntity {
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
            ..self.clone()
        }
    }
}

impl Hook<TextToEntityFn> {
    /// A text classifier driven by `regex`.
    ///
    /// `factory` runs once per match and returns the entity key plus optional replacement text;
    /// returning `None` leaves the match alone.
    pub fn pattern<P>(regex: Regex, factory: P) -> Self
    where
        P: Fn(&Captures<'_>, &mut EntityMap) -> Option<(EntityKey, Option<String>)>
            + Send
            + Sync
            + 'static,
    {
        Self::direct(move |text: &str, entity_map: &mut EntityMap| {
            let mut found = Vec::new();
            for captures in regex.captures_iter(text) {
                let Some(whole) = captures.get(0) else {
                    continue;
                };
                let Some((key, result)) = factory(&captures, entity_map) else {
                    continue;
                };
                found.push(TextEntity {
                    offset: text[..whole.start()].chars().count(),
                    length: whole.as_str().chars().count(),
                    key,
                    result,
                });
            }
            found
        })
    }
}

//! String-in, string-out helpers for callers that keep documents as JSON text.

use crate::{HtmlExporter, HtmlImporter, ImportOptions, MarkupConfig, RawContentState, Result};

pub fn content_to_string(content: &RawContentState, pretty: bool) -> Result<String> {
    let value = content.to_json_value()?;
    Ok(if pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    })
}

/// Renders a raw content JSON document, optionally with a markup config layered over the
/// built-in tables.
pub fn html_from_json_str(json: &str, config: Option<&MarkupConfig>) -> Result<String> {
    let content = RawContentState::from_json_str(json)?;
    let exporter = match config {
        Some(config) => HtmlExporter::new().with_markup_config(config),
        None => HtmlExporter::new(),
    };
    exporter.convert(&content)
}

pub fn json_from_html(html: &str, options: ImportOptions, pretty: bool) -> Result<String> {
    let content = HtmlImporter::new().convert(html, options)?;
    content_to_string(&content, pretty)
}

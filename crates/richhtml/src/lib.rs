#![forbid(unsafe_code)]

//! `richhtml` converts rich-text block documents to HTML and HTML back to block documents.
//!
//! The document model is the raw content JSON used by block-based editors: a list of blocks
//! with code-point style and entity ranges, plus an entity map.
//!
//! ```
//! let content = richhtml::convert_from_html("<p><em>Hello</em></p>").unwrap();
//! assert_eq!(richhtml::convert_to_html(&content).unwrap(), "<p><em>Hello</em></p>");
//! ```

pub use richhtml_core::*;

pub mod json;

/// An exporter and importer pair configured once and reused across documents.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    pub exporter: HtmlExporter,
    pub importer: HtmlImporter,
    pub import: ImportOptions,
}

impl Converter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_markup_config(mut self, config: &MarkupConfig) -> Self {
        self.exporter = self.exporter.with_markup_config(config);
        self
    }

    pub fn with_import_options(mut self, import: ImportOptions) -> Self {
        self.import = import;
        self
    }

    pub fn export_html(&self, content: &RawContentState) -> Result<String> {
        self.exporter.convert(content)
    }

    pub fn import_html(&self, html: &str) -> Result<RawContentState> {
        self.importer.convert(html, self.import)
    }

    /// Parses `html` and renders it again. Useful to normalize pasted markup.
    pub fn normalize_html(&self, html: &str) -> Result<String> {
        let content = self.import_html(html)?;
        tracing::debug!(blocks = content.blocks.len(), "normalizing html");
        self.export_html(&content)
    }

    pub fn html_from_json_str(&self, json: &str) -> Result<String> {
        let content = RawContentState::from_json_str(json)?;
        self.export_html(&content)
    }

    pub fn json_from_html(&self, html: &str, pretty: bool) -> Result<String> {
        let content = self.import_html(html)?;
        json::content_to_string(&content, pretty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_presentational_markup() {
        let converter = Converter::new();
        let html = converter
            .normalize_html("<div><b>bold</b> and <i>italic</i></div>")
            .unwrap();
        assert_eq!(html, "<p><strong>bold</strong> and <em>italic</em></p>");
    }

    #[test]
    fn flat_import_option_is_used() {
        let converter = Converter::new().with_import_options(ImportOptions::flat());
        let content = converter.import_html("<p>a<br>b</p>").unwrap();
        assert_eq!(content.blocks.len(), 2);
    }

    #[test]
    fn markup_config_reaches_the_exporter() {
        let config = MarkupConfig::from_json_str(
            r#"{ "styles": { "HIGHLIGHT": { "start": "<mark>", "end": "</mark>" } } }"#,
        )
        .unwrap();
        let converter = Converter::new().with_markup_config(&config);
        let html = converter
            .html_from_json_str(
                r#"{ "blocks": [{ "type": "unstyled", "text": "hi",
                     "inlineStyleRanges": [{ "offset": 0, "length": 2, "style": "HIGHLIGHT" }] }],
                     "entityMap": {} }"#,
            )
            .unwrap();
        assert_eq!(html, "<p><mark>hi</mark></p>");
    }
}

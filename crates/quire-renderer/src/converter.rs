//! Converter trait and the default HTML engine.

use pulldown_cmark::{Options, Parser};

use crate::html::HtmlWriter;

/// Converts document body markup into renderable markup.
///
/// Implementations must be pure (same input, same output), total (never fail)
/// and preserve the document order of content blocks.
pub trait MarkupConverter: Send + Sync {
    /// Convert `markdown` into an HTML fragment.
    fn convert(&self, markdown: &str) -> String;
}

/// Default converter: `CommonMark` plus tables, strikethrough and task lists.
#[derive(Clone, Debug)]
pub struct HtmlConverter {
    gfm: bool,
}

impl HtmlConverter {
    /// Create a converter with GFM extensions enabled.
    #[must_use]
    pub fn new() -> Self {
        Self { gfm: true }
    }

    /// Enable or disable GitHub Flavored Markdown extensions.
    ///
    /// When enabled, the parser supports:
    /// - Tables
    /// - Strikethrough (`~~text~~`)
    /// - Task lists (`- [ ] item`)
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    fn parser_options(&self) -> Options {
        if self.gfm {
            Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
        } else {
            Options::empty()
        }
    }
}

impl Default for HtmlConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkupConverter for HtmlConverter {
    fn convert(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.parser_options());
        HtmlWriter::with_capacity(markdown.len() + markdown.len() / 2).write(parser)
    }
}

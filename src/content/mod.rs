//! Content rendering
//!
//! Read-only event listings pass descriptions through a `ContentRenderer`
//! before they leave the API.

use pulldown_cmark::{html, Options, Parser};

use crate::domain::Event;

/// Per-call rendering options
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// Record the content belongs to
    pub event: &'a Event,
    /// Convert markdown to HTML
    pub markdown: bool,
}

/// Content pipeline applied to stored text
pub trait ContentRenderer: Send + Sync {
    fn apply_plugins(&self, content: &str, context: &RenderContext<'_>) -> String;
}

/// CommonMark renderer
#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    enabled: bool,
}

impl MarkdownRenderer {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ContentRenderer for MarkdownRenderer {
    fn apply_plugins(&self, content: &str, context: &RenderContext<'_>) -> String {
        if !(self.enabled && context.markdown) {
            return content.to_string();
        }

        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);

        let parser = Parser::new_ext(content, options);
        let mut rendered = String::with_capacity(content.len() * 3 / 2);
        html::push_html(&mut rendered, parser);

        tracing::trace!(event_id = context.event.id, "Rendered event description");
        rendered
    }
}

//! Prompt Renderer - substitute caller variables into prompt templates
//!
//! Templates use `{{variable}}` placeholders and are rendered with
//! Handlebars in non-strict mode without HTML escaping.

use handlebars::Handlebars;
use serde_json::{Map, Value};

use super::CompileError;

/// Renders prompt templates using Handlebars templating
pub struct PromptRenderer {
    handlebars: Handlebars<'static>,
}

impl Default for PromptRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptRenderer {
    /// Create a new PromptRenderer with default settings
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();
        // Unknown variables render as empty strings
        handlebars.set_strict_mode(false);
        handlebars.register_escape_fn(handlebars::no_escape);
        Self { handlebars }
    }

    /// Render a template string with the caller's variables
    pub fn render(&self, template: &str, variables: &Map<String, Value>) -> Result<String, CompileError> {
        self.handlebars
            .render_template(template, variables)
            .map_err(|e| CompileError::Render(e.to_string()))
    }
}

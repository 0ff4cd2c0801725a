//! Template engine for rendering embedded scaffolds

use super::filters;
use crate::config::ConfigError;
use minijinja::{AutoEscape, Environment};
use serde::Serialize;

/// Template rendering engine
///
/// Wraps minijinja with custom filters and strict undefined handling.
/// Output is YAML, so auto-escaping is off for every template name.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(minijinja::UndefinedBehavior::Strict);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        filters::register_filters(&mut env);
        Self { env }
    }

    /// Register a template compiled into the binary
    pub fn add_template(&mut self, name: &'static str, source: &'static str) -> Result<(), ConfigError> {
        self.env.add_template(name, source).map_err(template_error)
    }

    /// Render a registered template with the given context
    pub fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<String, ConfigError> {
        let tmpl = self.env.get_template(name).map_err(template_error)?;
        tmpl.render(ctx).map_err(template_error)
    }
}

fn template_error(err: minijinja::Error) -> ConfigError {
    let message = match (err.name(), err.line()) {
        (Some(name), Some(line)) => format!("{} ({}:{})", err, name, line),
        _ => err.to_string(),
    };
    ConfigError::Template { message }
}

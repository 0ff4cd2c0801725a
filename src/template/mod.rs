//! Scaffold templates for first-run setup
//!
//! `init` renders an embedded generator config with the user's model
//! directories and server binary filled in.

mod engine;
mod filters;

use crate::config::ConfigError;
use minijinja::context;
use std::path::{Path, PathBuf};

use engine::TemplateEngine;

const SCAFFOLD_NAME: &str = "config.yaml.j2";
const SCAFFOLD: &str = include_str!("config.yaml.j2");

/// Render the starter generator config
pub fn render_scaffold(models: &[PathBuf], binary: &Path) -> Result<String, ConfigError> {
    let mut engine = TemplateEngine::new();
    engine.add_template(SCAFFOLD_NAME, SCAFFOLD)?;

    let models: Vec<String> = models.iter().map(|p| p.display().to_string()).collect();
    engine.render(
        SCAFFOLD_NAME,
        context! {
            models => models,
            binary => binary.display().to_string(),
        },
    )
}

//! CLI command implementations
//!
//! Each command returns the process exit code; errors that should abort the
//! run propagate as `anyhow::Error`.

use super::output::{OutputEvent, OutputHandler};
use crate::config::GeneratorConfig;
use crate::generate::{self, GenerateOptions};
use crate::template;
use crate::validate;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Scaffold a generator config
pub fn init(
    models: &[PathBuf],
    binary: &Path,
    output: Option<&Path>,
    handler: &dyn OutputHandler,
) -> Result<u8> {
    let text = template::render_scaffold(models, binary)?;
    write_document(&text, output, handler)?;
    Ok(0)
}

/// Load a generator config and emit the proxy config
pub fn generate(
    config_path: Option<&Path>,
    output: Option<&Path>,
    options: GenerateOptions,
    handler: &dyn OutputHandler,
) -> Result<u8> {
    let path = GeneratorConfig::resolve_path(config_path)?;
    let config = GeneratorConfig::load_file(&path)?;
    handler.emit(OutputEvent::ConfigLoaded { path });

    let proxy = generate::generate(&config, options)?;
    handler.emit(OutputEvent::Generated {
        models: proxy.models.len(),
        macros: proxy.macros.len(),
    });

    let yaml = generate::to_yaml(&proxy)?;
    write_document(&yaml, output, handler)?;
    Ok(0)
}

/// Validate a proxy config; exit code 1 iff invalid
pub fn validate(file: &Path, handler: &dyn OutputHandler) -> u8 {
    let report = validate::validate_file(file);
    handler.report(&report);
    if report.is_valid() { 0 } else { 1 }
}

/// Write to `output`, or stdout when absent
fn write_document(text: &str, output: Option<&Path>, handler: &dyn OutputHandler) -> Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            std::fs::write(path, text)
                .with_context(|| format!("writing {}", path.display()))?;
            handler.emit(OutputEvent::Written {
                path: path.to_path_buf(),
            });
        }
        None => print!("{}", text),
    }
    Ok(())
}

/// clap value parser for `--model`: an existing directory
pub fn parse_model_dir(raw: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(raw);
    if !path.exists() {
        return Err(format!("Model path '{}' does not exist.", raw));
    }
    if !path.is_dir() {
        return Err(format!("Model path '{}' is not a directory.", raw));
    }
    Ok(path)
}

/// clap value parser for `--binary`: an existing file
pub fn parse_binary_file(raw: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(raw);
    if !path.exists() {
        return Err(format!("Binary path '{}' does not exist.", raw));
    }
    if !path.is_file() {
        return Err(format!("Binary path '{}' is not a file.", raw));
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tempfile::TempDir;

    struct MockHandler {
        events: RefCell<Vec<OutputEvent>>,
        reports: RefCell<Vec<validate::ValidationReport>>,
    }

    impl MockHandler {
        fn new() -> Self {
            Self {
                events: RefCell::new(Vec::new()),
                reports: RefCell::new(Vec::new()),
            }
        }
    }

    impl OutputHandler for MockHandler {
        fn emit(&self, event: OutputEvent) {
            self.events.borrow_mut().push(event);
        }

        fn render_report(&self, report: &validate::ValidationReport) -> Option<String> {
            self.reports.borrow_mut().push(report.clone());
            None
        }
    }

    fn write_model(dir: &Path, name: &str, url: &str) {
        std::fs::write(
            dir.join(format!("{}.gguf.json", name)),
            format!(r#"{{"url": "{}"}}"#, url),
        )
        .unwrap();
    }

    #[test]
    fn test_parse_model_dir() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("file");
        std::fs::write(&file, "").unwrap();

        assert!(parse_model_dir(dir.path().to_str().unwrap()).is_ok());
        assert!(parse_model_dir(file.to_str().unwrap()).unwrap_err().contains("not a directory"));
        assert!(parse_model_dir("/definitely/missing").unwrap_err().contains("does not exist"));
    }

    #[test]
    fn test_parse_binary_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("llama-server");
        std::fs::write(&file, "").unwrap();

        assert!(parse_binary_file(file.to_str().unwrap()).is_ok());
        assert!(parse_binary_file(dir.path().to_str().unwrap()).unwrap_err().contains("not a file"));
    }

    #[test]
    fn test_init_then_generate_then_validate() {
        let dir = TempDir::new().unwrap();
        let models = dir.path().join("models");
        std::fs::create_dir(&models).unwrap();
        write_model(
            &models,
            "Qwen3-8B-Q4_K_M",
            "https://huggingface.co/unsloth/Qwen3-8B-GGUF/resolve/main/Qwen3-8B-Q4_K_M.gguf",
        );
        let binary = dir.path().join("llama-server");
        std::fs::write(&binary, "").unwrap();

        let handler = MockHandler::new();
        let config_path = dir.path().join("config.yaml");
        let code = init(&[models.clone()], &binary, Some(&config_path), &handler).unwrap();
        assert_eq!(code, 0);

        let proxy_path = dir.path().join("out/proxy.yaml");
        let code = generate(
            Some(&config_path),
            Some(&proxy_path),
            GenerateOptions::default(),
            &handler,
        )
        .unwrap();
        assert_eq!(code, 0);

        let proxy = std::fs::read_to_string(&proxy_path).unwrap();
        assert!(proxy.contains("unsloth/Qwen3-8B:Q4_K_M"));
        assert!(proxy.contains("unsloth/Qwen3-8B:Q4_K_M-thinking"));
        assert!(proxy.contains("qwen3-params"));

        assert_eq!(validate(&proxy_path, &handler), 0);
        let reports = handler.reports.borrow();
        assert!(reports[0].is_valid(), "{:?}", reports[0].errors());

        let events = handler.events.borrow();
        assert!(matches!(events[0], OutputEvent::Written { .. }));
        assert!(matches!(events[1], OutputEvent::ConfigLoaded { .. }));
        assert!(matches!(events[2], OutputEvent::Generated { models: 2, .. }));
    }

    #[test]
    fn test_generate_missing_config() {
        let dir = TempDir::new().unwrap();
        let handler = MockHandler::new();
        let err = generate(
            Some(&dir.path().join("absent.yaml")),
            None,
            GenerateOptions::default(),
            &handler,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_validate_invalid_exit_code() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "models:\n  m:\n    cmd: ''\n").unwrap();

        let handler = MockHandler::new();
        assert_eq!(validate(&path, &handler), 1);
        assert!(!handler.reports.borrow()[0].is_valid());
    }
}

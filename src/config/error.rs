//! Error types for configuration loading and generation

use std::path::PathBuf;
use thiserror::Error;

/// Failures that stop loading or generation outright
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("Empty config file: {}", .path.display())]
    EmptyConfig { path: PathBuf },

    #[error("failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error(
        "No models found. Please check your models directory and ensure .gguf.json files exist."
    )]
    NoModels,

    #[error("No fallback name provided for non-HuggingFace URL: {url}")]
    MissingFallbackName { url: String },

    #[error("Invalid HuggingFace URL {url}: {reason}")]
    InvalidModelUrl { url: String, reason: String },

    #[error("template error: {message}")]
    Template { message: String },
}

impl ConfigError {
    pub fn parse(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidModelUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConfigError::FileNotFound {
            path: PathBuf::from("/tmp/missing.yaml"),
        };
        assert_eq!(err.to_string(), "Config file not found: /tmp/missing.yaml");

        let err = ConfigError::invalid_url("https://huggingface.co/x", "too few path segments");
        let msg = err.to_string();
        assert!(msg.contains("https://huggingface.co/x"));
        assert!(msg.contains("too few path segments"));

        assert!(ConfigError::NoModels.to_string().starts_with("No models found"));
    }
}

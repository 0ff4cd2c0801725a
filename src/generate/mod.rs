//! Proxy configuration generation
//!
//! Pipeline: discover `*.gguf.json` files -> derive ids and names -> assemble
//! launch commands from macros -> keep only the macros those commands use.

mod assembler;
mod discovery;
mod naming;

use crate::config::GeneratorConfig;
use anyhow::{Context, Result};

pub use assembler::{
    DEFAULT_MACRO, GenerateOptions, GeneratedModel, ProxyConfig, assemble_models,
    build_proxy_config,
};
pub use discovery::{DiscoveredModel, discover_models};

/// Run the full generation pipeline for a loaded config
pub fn generate(config: &GeneratorConfig, options: GenerateOptions) -> Result<ProxyConfig> {
    let discovered = discover_models(&config.model_dirs())?;
    let models = assemble_models(config, &discovered)?;
    tracing::info!(models = models.len(), "assembled model entries");
    Ok(build_proxy_config(config, models, options))
}

/// Serialize the generated document as YAML, keys in insertion order
pub fn to_yaml(proxy: &ProxyConfig) -> Result<String> {
    serde_yaml::to_string(proxy).context("serializing generated config")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_generate_end_to_end() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("Qwen3-8B-Q4_K_M.gguf.json"),
            r#"{"url": "https://huggingface.co/unsloth/Qwen3-8B-GGUF/resolve/main/Qwen3-8B-Q4_K_M.gguf"}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("local.gguf.json"), "{}").unwrap();

        let mut config = GeneratorConfig {
            models: vec![dir.path().to_path_buf()],
            ..Default::default()
        };
        config.macros.insert("binary".into(), "/opt/llama-server".into());
        config.macros.insert(DEFAULT_MACRO.into(), "--jinja".into());
        config.macros.insert("spare".into(), "--unused".into());

        let proxy = generate(&config, GenerateOptions::default()).unwrap();
        let ids: Vec<_> = proxy.models.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["unsloth/Qwen3-8B:Q4_K_M", "local"]);
        assert!(!proxy.macros.contains_key("spare"));

        let yaml = to_yaml(&proxy).unwrap();
        let reparsed: ProxyConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(reparsed, proxy);
        assert!(yaml.find("healthCheckTimeout").unwrap() < yaml.find("models").unwrap());
    }

    #[test]
    fn test_generate_no_models() {
        let dir = TempDir::new().unwrap();
        let config = GeneratorConfig {
            models: vec![dir.path().to_path_buf()],
            ..Default::default()
        };
        let err = generate(&config, GenerateOptions::default()).unwrap_err();
        assert!(err.to_string().contains("No models found"));
    }
}

//! Assembling the proxy configuration document

use super::discovery::DiscoveredModel;
use super::naming;
use crate::config::{ConfigError, GeneratorConfig};
use crate::macros::{self, MacroTable};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Macro used when no model pattern matches
pub const DEFAULT_MACRO: &str = "default-params";

/// The generated document, in the proxy's own key style
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProxyConfig {
    pub health_check_timeout: u64,
    pub log_level: String,
    pub start_port: u16,
    pub models: IndexMap<String, GeneratedModel>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub macros: MacroTable,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeneratedModel {
    pub ttl: u64,
    pub cmd: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateOptions {
    /// Write fully expanded commands and omit the `macros` section
    pub inline_macros: bool,
}

/// Build model entries (base models plus variants) in discovery order.
///
/// A model id seen before is skipped, as is a variant id that already exists.
pub fn assemble_models(
    config: &GeneratorConfig,
    discovered: &[DiscoveredModel],
) -> Result<IndexMap<String, GeneratedModel>, ConfigError> {
    let mut models: IndexMap<String, GeneratedModel> = IndexMap::new();

    for found in discovered {
        let display = naming::display_name(&found.url, &found.prefix)?;
        let id = naming::model_id(&found.url, &found.prefix)?;

        if models.contains_key(&id) {
            tracing::debug!(model_id = %id, file = %found.prefix, "skipping duplicate model id");
            continue;
        }

        let path = found.model_path.display().to_string();
        let macro_expr = select_macro(&display, &config.model_patterns);
        models.insert(
            id.clone(),
            GeneratedModel {
                ttl: config.default_ttl,
                cmd: format_command(&path, macro_expr),
                name: display.clone(),
            },
        );

        for variant in &config.variants {
            let matches = display
                .to_lowercase()
                .contains(&variant.base_pattern.to_lowercase());
            if !matches || variant.suffix.is_empty() || variant.macro_name.is_empty() {
                continue;
            }

            let variant_id = format!("{}-{}", id, clean_suffix(&variant.suffix));
            if models.contains_key(&variant_id) {
                continue;
            }
            models.insert(
                variant_id,
                GeneratedModel {
                    ttl: config.default_ttl,
                    cmd: format_command(&path, &variant.macro_name),
                    name: format!("{}{}", display, variant.suffix),
                },
            );
        }
    }

    if models.is_empty() {
        return Err(ConfigError::NoModels);
    }
    Ok(models)
}

/// Wrap assembled models into the output document and attach the macros they use
pub fn build_proxy_config(
    config: &GeneratorConfig,
    mut models: IndexMap<String, GeneratedModel>,
    options: GenerateOptions,
) -> ProxyConfig {
    for (id, model) in models.iter_mut() {
        match macros::expand_text(&model.cmd, &config.macros) {
            Ok(resolved) if options.inline_macros => model.cmd = resolved,
            Ok(resolved) => {
                tracing::debug!(model_id = %id, command = %resolved, "resolved command");
            }
            Err(err) => {
                tracing::warn!(model_id = %id, error = %err, "command left unexpanded");
            }
        }
    }

    let used = if options.inline_macros || config.macros.is_empty() {
        MacroTable::new()
    } else {
        let commands: Vec<&str> = models.values().map(|m| m.cmd.as_str()).collect();
        macros::extract_used(&commands, &config.macros)
    };

    ProxyConfig {
        health_check_timeout: config.health_check_timeout,
        log_level: config.log_level.clone(),
        start_port: config.start_port,
        models,
        macros: used,
    }
}

/// First pattern contained in the display name wins; otherwise the default macro
fn select_macro<'a>(display: &str, patterns: &'a IndexMap<String, String>) -> &'a str {
    patterns
        .iter()
        .find(|(pattern, _)| display.contains(pattern.as_str()))
        .map(|(_, target)| target.as_str())
        .unwrap_or(DEFAULT_MACRO)
}

/// `${binary} -m <path> --port ${PORT} --host 0.0.0.0 ${<macro>}`
///
/// A target that is already a `${...}` expression is inserted as-is.
fn format_command(model_path: &str, target: &str) -> String {
    let params = if target.starts_with("${") && target.ends_with('}') {
        target.to_string()
    } else {
        macros::tokens::token(target)
    };
    format!(
        "${{binary}} -m {} --port ${{PORT}} --host 0.0.0.0 {}",
        model_path, params
    )
}

/// Make a variant suffix usable inside a model id
fn clean_suffix(suffix: &str) -> String {
    suffix
        .replace(' ', "-")
        .replace(['(', ')'], "")
        .replace('+', "plus")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VariantConfig;
    use std::path::PathBuf;

    const QWEN_URL: &str =
        "https://huggingface.co/unsloth/Qwen3-8B-GGUF/resolve/main/Qwen3-8B-Q4_K_M.gguf";

    fn found(prefix: &str, url: &str) -> DiscoveredModel {
        DiscoveredModel {
            prefix: prefix.into(),
            model_path: PathBuf::from(format!("/models/{}.gguf", prefix)),
            url: url.into(),
        }
    }

    fn config() -> GeneratorConfig {
        let mut config = GeneratorConfig::default();
        config.macros.insert("binary".into(), "/opt/llama-server".into());
        config.macros.insert("layers".into(), "--n-gpu-layers 999".into());
        config
            .macros
            .insert(DEFAULT_MACRO.into(), "--jinja ${layers}".into());
        config
            .macros
            .insert("qwen-params".into(), "${default-params} --temp 0.6".into());
        config.macros.insert("unused".into(), "--nope".into());
        config
    }

    #[test]
    fn test_format_command() {
        assert_eq!(
            format_command("/m/a.gguf", "default-params"),
            "${binary} -m /m/a.gguf --port ${PORT} --host 0.0.0.0 ${default-params}"
        );
        assert_eq!(
            format_command("/m/a.gguf", "${a} ${b}"),
            "${binary} -m /m/a.gguf --port ${PORT} --host 0.0.0.0 ${a} ${b}"
        );
    }

    #[test]
    fn test_clean_suffix() {
        assert_eq!(clean_suffix(" (Think+)"), "-thinkplus");
        assert_eq!(clean_suffix("Long Context"), "long-context");
    }

    #[test]
    fn test_select_macro() {
        let mut patterns = IndexMap::new();
        patterns.insert("qwen".to_string(), "qwen-params".to_string());
        patterns.insert("qwen3".to_string(), "never-reached".to_string());
        assert_eq!(select_macro("qwen3-8b", &patterns), "qwen-params");
        assert_eq!(select_macro("llama-3", &patterns), DEFAULT_MACRO);
    }

    #[test]
    fn test_assemble_with_fallback_and_hf_ids() {
        let mut config = config();
        config
            .model_patterns
            .insert("qwen".into(), "qwen-params".into());

        let models = assemble_models(
            &config,
            &[found("Qwen3-8B-Q4_K_M", QWEN_URL), found("local-model", "")],
        )
        .unwrap();

        let ids: Vec<_> = models.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["unsloth/Qwen3-8B:Q4_K_M", "local-model"]);

        let qwen = &models["unsloth/Qwen3-8B:Q4_K_M"];
        assert_eq!(qwen.name, "qwen3-8b");
        assert_eq!(qwen.ttl, 300);
        assert!(qwen.cmd.ends_with("${qwen-params}"));
        assert!(models["local-model"].cmd.ends_with("${default-params}"));
    }

    #[test]
    fn test_duplicate_ids_skipped() {
        let models = assemble_models(
            &config(),
            &[found("first", QWEN_URL), found("second", QWEN_URL)],
        )
        .unwrap();
        assert_eq!(models.len(), 1);
        assert!(models["unsloth/Qwen3-8B:Q4_K_M"].cmd.contains("/models/first.gguf"));
    }

    #[test]
    fn test_variants() {
        let mut config = config();
        config.variants.push(VariantConfig {
            base_pattern: "QWEN".into(),
            suffix: " (Think)".into(),
            macro_name: "qwen-params".into(),
        });
        config.variants.push(VariantConfig {
            base_pattern: "qwen".into(),
            suffix: String::new(),
            macro_name: "ignored".into(),
        });

        let models = assemble_models(&config, &[found("q", QWEN_URL)]).unwrap();
        assert_eq!(models.len(), 2);
        let variant = &models["unsloth/Qwen3-8B:Q4_K_M--think"];
        assert_eq!(variant.name, "qwen3-8b (Think)");
        assert!(variant.cmd.ends_with("${qwen-params}"));
    }

    #[test]
    fn test_no_models() {
        let err = assemble_models(&config(), &[]).unwrap_err();
        assert!(matches!(err, ConfigError::NoModels));
    }

    #[test]
    fn test_missing_fallback_fails() {
        let err = assemble_models(&config(), &[found("", "https://example.com/x.gguf")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingFallbackName { .. }));
    }

    #[test]
    fn test_build_prunes_macros() {
        let config = config();
        let models = assemble_models(&config, &[found("local", "")]).unwrap();
        let output = build_proxy_config(&config, models, GenerateOptions::default());

        assert_eq!(output.health_check_timeout, 240);
        assert_eq!(output.start_port, 9091);
        let names: Vec<_> = output.macros.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["binary", "default-params"]);
        assert_eq!(output.macros["default-params"], "--jinja --n-gpu-layers 999");
        assert!(output.models["local"].cmd.contains("${default-params}"));
    }

    #[test]
    fn test_build_without_macros_omits_section() {
        let config = GeneratorConfig::default();
        let models = assemble_models(&config, &[found("local", "")]).unwrap();
        let output = build_proxy_config(&config, models, GenerateOptions::default());
        assert!(output.macros.is_empty());

        let yaml = serde_yaml::to_string(&output).unwrap();
        assert!(!yaml.contains("macros"));
        assert!(yaml.contains("healthCheckTimeout: 240"));
        assert!(yaml.contains("startPort: 9091"));
    }

    #[test]
    fn test_build_inline() {
        let config = config();
        let models = assemble_models(&config, &[found("local", "")]).unwrap();
        let output = build_proxy_config(
            &config,
            models,
            GenerateOptions {
                inline_macros: true,
            },
        );

        assert!(output.macros.is_empty());
        assert_eq!(
            output.models["local"].cmd,
            "/opt/llama-server -m /models/local.gguf --port ${PORT} --host 0.0.0.0 --jinja --n-gpu-layers 999"
        );
    }

    #[test]
    fn test_build_inline_keeps_cyclic_command() {
        let mut config = config();
        config.macros.insert(DEFAULT_MACRO.into(), "${loop}".into());
        config.macros.insert("loop".into(), "${default-params}".into());

        let models = assemble_models(&config, &[found("local", "")]).unwrap();
        let output = build_proxy_config(
            &config,
            models,
            GenerateOptions {
                inline_macros: true,
            },
        );
        assert!(output.models["local"].cmd.ends_with("${default-params}"));
    }
}

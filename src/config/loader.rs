//! Generator configuration loading

use super::error::ConfigError;
use crate::macros::{MacroTable, NameMap};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level generator configuration (the file `init` scaffolds)
///
/// Unknown keys are ignored with a warning.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneratorConfig {
    /// Directories scanned for `*.gguf.json` metadata files
    pub models: Vec<PathBuf>,

    /// Macro definitions
    #[serde(default)]
    pub macros: MacroTable,

    /// Substring of a model's display name -> macro name or `${...}` expression
    #[serde(default)]
    pub model_patterns: IndexMap<String, String>,

    /// Extra model entries derived from matching base models
    #[serde(default)]
    pub variants: Vec<VariantConfig>,

    /// TTL in seconds written to every model
    #[serde(default = "default_ttl")]
    pub default_ttl: u64,

    #[serde(default = "default_health_check_timeout")]
    pub health_check_timeout: u64,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_start_port")]
    pub start_port: u16,
}

/// A variant model generated alongside every base model it matches
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct VariantConfig {
    /// Case-insensitive substring of the base model's display name
    #[serde(default)]
    pub base_pattern: String,

    /// Appended to the display name, and (cleaned) to the id
    #[serde(default)]
    pub suffix: String,

    /// Macro name or `${...}` expression for the variant command
    #[serde(default, rename = "macro")]
    pub macro_name: String,
}

fn default_ttl() -> u64 {
    300
}

fn default_health_check_timeout() -> u64 {
    240
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_start_port() -> u16 {
    9091
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            models: Vec::new(),
            macros: MacroTable::new(),
            model_patterns: IndexMap::new(),
            variants: Vec::new(),
            default_ttl: default_ttl(),
            health_check_timeout: default_health_check_timeout(),
            log_level: default_log_level(),
            start_port: default_start_port(),
        }
    }
}

impl GeneratorConfig {
    /// Load a configuration file, choosing the parser by extension
    ///
    /// `.toml` files are read as TOML; everything else as YAML.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::parse(path, e))?;
        if contents.trim().is_empty() {
            return Err(ConfigError::EmptyConfig {
                path: path.to_path_buf(),
            });
        }

        let config: Self = if is_toml(path) {
            let table: toml::Table =
                toml::from_str(&contents).map_err(|e| ConfigError::parse(path, e))?;
            warn_unknown_keys(path, table.keys().map(String::as_str));
            toml::Value::Table(table)
                .try_into()
                .map_err(|e| ConfigError::parse(path, e))?
        } else {
            let value: serde_yaml::Value =
                serde_yaml::from_str(&contents).map_err(|e| ConfigError::parse(path, e))?;
            if value.is_null() {
                return Err(ConfigError::EmptyConfig {
                    path: path.to_path_buf(),
                });
            }
            if let Some(mapping) = value.as_mapping() {
                warn_unknown_keys(path, mapping.keys().filter_map(|k| k.as_str()));
            }
            serde_yaml::from_value(value).map_err(|e| ConfigError::parse(path, e))?
        };

        tracing::debug!(
            path = %path.display(),
            macros = config.macros.len(),
            dirs = config.models.len(),
            "loaded generator config"
        );

        Ok(config.normalized())
    }

    /// Default config locations, in lookup order
    ///
    /// 1. ./config.yaml
    /// 2. ~/.config/llama-swap-config/config.yaml
    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.yaml")];
        if let Some(user_dir) = dirs::config_dir() {
            paths.push(user_dir.join("llama-swap-config/config.yaml"));
        }
        paths
    }

    /// Resolve the config path: an explicit path wins, otherwise the first existing default
    pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }
        let candidates = Self::default_paths();
        candidates
            .iter()
            .find(|p| p.exists())
            .cloned()
            .ok_or_else(|| ConfigError::FileNotFound {
                path: candidates[0].clone(),
            })
    }

    /// Model directories with `~` expanded
    pub fn model_dirs(&self) -> Vec<PathBuf> {
        self.models
            .iter()
            .map(|p| {
                let raw = p.display().to_string();
                PathBuf::from(shellexpand::tilde(&raw).as_ref())
            })
            .collect()
    }

    /// Apply legacy `dotted.name` normalization to macro names and every reference to them
    fn normalized(mut self) -> Self {
        let names = NameMap::from_names(self.macros.keys().map(String::as_str));
        if names.is_empty() {
            return self;
        }

        tracing::debug!("normalizing dotted macro names");
        self.macros = names.apply_to_table(std::mem::take(&mut self.macros));
        // Targets are either a bare macro name or a `${...}` expression
        let retarget = |target: &str| names.rewrite(names.name(target));
        for target in self.model_patterns.values_mut() {
            *target = retarget(target.as_str());
        }
        for variant in &mut self.variants {
            variant.macro_name = retarget(variant.macro_name.as_str());
        }
        self
    }
}

const KNOWN_KEYS: [&str; 8] = [
    "models",
    "macros",
    "model_patterns",
    "variants",
    "default_ttl",
    "health_check_timeout",
    "log_level",
    "start_port",
];

/// Top-level keys this version does not understand
fn unknown_keys<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    keys.filter(|k| !KNOWN_KEYS.contains(k)).collect()
}

fn warn_unknown_keys<'a>(path: &Path, keys: impl Iterator<Item = &'a str>) {
    for key in unknown_keys(keys) {
        tracing::warn!(path = %path.display(), key, "ignoring unknown config key");
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension().map(|e| e == "toml").unwrap_or(false)
}

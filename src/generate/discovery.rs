//! Finding `*.gguf.json` metadata files in model directories

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const METADATA_SUFFIX: &str = ".gguf.json";

/// One discovered model artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredModel {
    /// File name without the `.gguf.json` suffix
    pub prefix: String,
    /// The `.gguf` file next to the metadata file
    pub model_path: PathBuf,
    /// Download URL recorded in the metadata (may be empty)
    pub url: String,
}

/// Metadata written next to each downloaded model
#[derive(Debug, Default, Deserialize)]
struct ModelMetadata {
    #[serde(default)]
    url: String,
}

/// Scan directories in the given order; files within a directory are sorted by name.
///
/// Missing directories are skipped.
pub fn discover_models(dirs: &[PathBuf]) -> Result<Vec<DiscoveredModel>> {
    let mut found = Vec::new();

    for dir in dirs {
        if !dir.exists() {
            tracing::debug!(path = %dir.display(), "skipping missing model directory");
            continue;
        }

        let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
            .with_context(|| format!("reading {}", dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && metadata_prefix(path).is_some())
            .collect();
        entries.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        for path in entries {
            found.push(load_metadata(&path)?);
        }
    }

    tracing::debug!(count = found.len(), "discovered model metadata files");
    Ok(found)
}

fn load_metadata(path: &Path) -> Result<DiscoveredModel> {
    let prefix = metadata_prefix(path)
        .with_context(|| format!("not a metadata file: {}", path.display()))?
        .to_string();

    let contents =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let metadata: ModelMetadata = serde_json::from_str(&contents)
        .with_context(|| format!("parsing {}", path.display()))?;

    let model_path = path.with_file_name(format!("{}.gguf", prefix));
    Ok(DiscoveredModel {
        prefix,
        model_path,
        url: metadata.url,
    })
}

fn metadata_prefix(path: &Path) -> Option<&str> {
    path.file_name()?.to_str()?.strip_suffix(METADATA_SUFFIX)
}

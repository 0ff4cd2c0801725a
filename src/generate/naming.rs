//! Deriving model ids and display names from download URLs

use crate::config::ConfigError;
use url::Url;

const HF_PREFIX: &str = "https://huggingface.co/";

/// Model id: `user/repo:format` for HuggingFace URLs, else the fallback name
///
/// The format is the last `-` separated part of the file stem, or the fourth from
/// last for split shards (`...-Q4_K_M-00001-of-00003.gguf`).
pub fn model_id(url: &str, fallback: &str) -> Result<String, ConfigError> {
    let Some(parts) = hf_parts(url)? else {
        return require_fallback(url, fallback).map(str::to_string);
    };

    let stem = parts.file.rsplit_once('.').map(|(s, _)| s).unwrap_or(parts.file);
    let pieces: Vec<&str> = stem.split('-').collect();
    let n = pieces.len();
    let format = if n >= 4 && pieces[n - 2] == "of" {
        pieces[n - 4]
    } else {
        pieces[n - 1]
    };

    if parts.user.is_empty() || parts.repo.is_empty() || format.is_empty() {
        return Err(ConfigError::invalid_url(
            url,
            "unable to extract user, repo, or format",
        ));
    }

    Ok(format!("{}/{}:{}", parts.user, parts.repo, format))
}

/// Short lower-case display name: the cleaned repo, or the fallback
pub fn display_name(url: &str, fallback: &str) -> Result<String, ConfigError> {
    match hf_parts(url)? {
        Some(parts) => Ok(parts.repo.to_lowercase()),
        None => Ok(require_fallback(url, fallback)?.replace(':', "-").to_lowercase()),
    }
}

struct HfParts<'a> {
    user: String,
    repo: String,
    file: &'a str,
}

fn hf_parts(url: &str) -> Result<Option<HfParts<'_>>, ConfigError> {
    if !url.starts_with(HF_PREFIX) {
        return Ok(None);
    }

    let parsed = Url::parse(url).map_err(|e| ConfigError::invalid_url(url, e.to_string()))?;
    let segments: Vec<&str> = parsed
        .path()
        .trim_matches('/')
        .split('/')
        .collect();
    if segments.len() < 2 {
        return Err(ConfigError::invalid_url(url, "expected at least user/repo"));
    }

    let path = url.split(['?', '#']).next().unwrap_or(url);
    // A trailing slash does not empty the file name
    let file = path.rsplit('/').find(|s| !s.is_empty()).unwrap_or(path);

    Ok(Some(HfParts {
        user: segments[0].to_string(),
        repo: segments[1].replace("-gguf", "").replace("-GGUF", ""),
        file,
    }))
}

fn require_fallback<'a>(url: &str, fallback: &'a str) -> Result<&'a str, ConfigError> {
    if fallback.is_empty() {
        return Err(ConfigError::MissingFallbackName {
            url: url.to_string(),
        });
    }
    Ok(fallback)
}

//! `${name}` reference scanning shared by expansion and validation

use regex::Regex;
use std::sync::LazyLock;

/// Names supplied by the proxy at launch time, never defined in a macro table
pub const RESERVED_NAMES: [&str; 3] = ["PORT", "MODEL_ID", "PID"];

/// Any `${...}` token, as the expander sees it
static REFERENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid reference pattern"));

/// `${...}` tokens restricted to the macro name charset
static STRICT_REFERENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([a-zA-Z0-9_-]+)\}").expect("valid reference pattern"));

static MACRO_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("valid name pattern"));

/// Returns true if `name` is one of the runtime-substituted names
pub fn is_reserved(name: &str) -> bool {
    RESERVED_NAMES.contains(&name)
}

/// Returns true if `name` only uses `[a-zA-Z0-9_-]`
pub fn is_valid_macro_name(name: &str) -> bool {
    MACRO_NAME_RE.is_match(name)
}

/// Format a name as a `${name}` token
pub fn token(name: &str) -> String {
    format!("${{{}}}", name)
}

/// All referenced names in `text`, in order of appearance (duplicates kept)
pub fn references(text: &str) -> impl Iterator<Item = &str> {
    REFERENCE_RE
        .captures_iter(text)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
}

/// Referenced names matching the macro name charset
pub fn strict_references(text: &str) -> impl Iterator<Item = &str> {
    STRICT_REFERENCE_RE
        .captures_iter(text)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
}

/// Replace every `${name}` token via `lookup`; tokens it declines are kept verbatim
pub fn substitute<'a, F>(text: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<&'a str>,
{
    REFERENCE_RE
        .replace_all(text, |caps: &regex::Captures<'_>| match lookup(&caps[1]) {
            Some(value) => value.to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Returns true if `text` contains a malformed `${${` double substitution
pub fn has_nested_literal(text: &str) -> bool {
    text.contains("${${")
}

//! Recursive `${name}` expansion over a macro table
//!
//! Each descent carries its own copy of the resolution path. A name may therefore
//! appear on several independent branches (diamond reuse) but never twice on one
//! path. Nothing is memoized across branches.

use super::dedup::dedup_params;
use super::error::MacroError;
use super::tokens;
use super::MacroTable;
use indexmap::IndexMap;

/// Fully expand macro `name`.
///
/// A name missing from the table (including the reserved runtime names) comes back
/// as its literal `${name}` token.
pub fn expand(name: &str, table: &MacroTable) -> Result<String, MacroError> {
    expand_on_path(name, table, &[])
}

/// Expand every macro reference inside free text, e.g. an assembled command line
pub fn expand_text(text: &str, table: &MacroTable) -> Result<String, MacroError> {
    resolve(text, table, &[])
}

fn expand_on_path(name: &str, table: &MacroTable, path: &[String]) -> Result<String, MacroError> {
    if path.iter().any(|seen| seen == name) {
        return Err(MacroError::circular(name, path));
    }

    let Some(raw) = table.get(name) else {
        return Ok(tokens::token(name));
    };

    let mut branch = path.to_vec();
    branch.push(name.to_string());
    resolve(raw, table, &branch)
}

fn resolve(raw: &str, table: &MacroTable, path: &[String]) -> Result<String, MacroError> {
    let mut expanded: IndexMap<&str, String> = IndexMap::new();
    for reference in tokens::references(raw) {
        if expanded.contains_key(reference) || !table.contains_key(reference) {
            continue;
        }
        let value = expand_on_path(reference, table, path)?;
        expanded.insert(reference, value);
    }

    let substituted = tokens::substitute(raw, |name| expanded.get(name).map(String::as_str));
    Ok(dedup_params(&substituted))
}

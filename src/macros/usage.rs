//! Pruning a macro table down to the macros a set of commands actually uses

use super::expander::expand;
use super::tokens;
use super::MacroTable;
use indexmap::IndexSet;

/// Collect the macros referenced by `commands`, each mapped to its expanded value.
///
/// Names are reported in order of first discovery. Names absent from the table
/// (runtime tokens, typos) are left out. A macro caught in a cycle falls back to
/// its raw value, and the names that raw value mentions are pulled in as well so
/// the result stays self-contained.
///
/// A macro that expands cleanly does not pull in the names it references: its
/// expanded value already inlines them. Only the raw fallback keeps `${..}`
/// tokens that need their definitions alongside.
pub fn extract_used<S: AsRef<str>>(commands: &[S], table: &MacroTable) -> MacroTable {
    let mut queue: IndexSet<String> = commands
        .iter()
        .flat_map(|cmd| tokens::references(cmd.as_ref()))
        .map(str::to_string)
        .collect();

    let mut used = MacroTable::new();
    let mut next = 0;
    while next < queue.len() {
        let name = queue[next].clone();
        next += 1;

        let Some(raw) = table.get(&name) else {
            continue;
        };

        let value = match expand(&name, table) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(
                    macro_name = %name,
                    revisited = %err.name(),
                    error = %err,
                    "keeping unexpanded macro value"
                );
                for nested in tokens::references(raw) {
                    if !queue.contains(nested) {
                        queue.insert(nested.to_string());
                    }
                }
                raw.clone()
            }
        };
        used.insert(name, value);
    }

    used
}

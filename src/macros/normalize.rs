//! Legacy macro name normalization (`gpu.layers` -> `gpu-layers`)

use super::tokens;
use super::MacroTable;
use std::collections::HashMap;

/// Mapping from declared macro names to their normalized form
#[derive(Debug, Clone, Default)]
pub struct NameMap {
    renames: HashMap<String, String>,
}

impl NameMap {
    /// Build the map once from the declared names; only names that change are stored
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let renames = names
            .into_iter()
            .filter(|name| name.contains('.'))
            .map(|name| (name.to_string(), normalize_name(name)))
            .collect();
        Self { renames }
    }

    pub fn is_empty(&self) -> bool {
        self.renames.is_empty()
    }

    /// Normalized form of `name` (unchanged if it was never renamed)
    pub fn name<'a>(&'a self, name: &'a str) -> &'a str {
        self.renames.get(name).map(String::as_str).unwrap_or(name)
    }

    /// Rewrite every `${old}` reference in `text` to `${new}`
    pub fn rewrite(&self, text: &str) -> String {
        if self.is_empty() {
            return text.to_string();
        }
        let replacements: HashMap<&str, String> = self
            .renames
            .iter()
            .map(|(old, new)| (old.as_str(), tokens::token(new)))
            .collect();
        tokens::substitute(text, |name| replacements.get(name).map(String::as_str))
    }

    /// Rename the keys of `table` and rewrite references in its values.
    ///
    /// When two names collide after normalization the later definition wins.
    pub fn apply_to_table(&self, table: MacroTable) -> MacroTable {
        let mut out = MacroTable::with_capacity(table.len());
        for (name, value) in table {
            let key = self.name(&name).to_string();
            let value = self.rewrite(&value);
            if out.contains_key(&key) {
                tracing::debug!(macro_name = %key, "later macro definition replaces earlier one");
            }
            out.insert(key, value);
        }
        out
    }
}

/// Normalize a single macro name
pub fn normalize_name(name: &str) -> String {
    name.replace('.', "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_dotted_names_renamed() {
        let map = NameMap::from_names(["gpu.layers", "ctx-size"]);
        assert_eq!(map.name("gpu.layers"), "gpu-layers");
        assert_eq!(map.name("ctx-size"), "ctx-size");
        assert!(!map.is_empty());
    }

    #[test]
    fn test_rewrite_references() {
        let map = NameMap::from_names(["gpu.layers"]);
        assert_eq!(
            map.rewrite("${gpu.layers} ${other} ${PORT}"),
            "${gpu-layers} ${other} ${PORT}"
        );
    }

    #[test]
    fn test_apply_to_table() {
        let table: MacroTable = [
            ("gpu.layers", "--n-gpu-layers 999"),
            ("default-params", "--jinja ${gpu.layers}"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let map = NameMap::from_names(table.keys().map(String::as_str));
        let out = map.apply_to_table(table);

        assert_eq!(out["gpu-layers"], "--n-gpu-layers 999");
        assert_eq!(out["default-params"], "--jinja ${gpu-layers}");
    }

    #[test]
    fn test_collision_later_wins() {
        let table: MacroTable = [("a-b", "first"), ("a.b", "second")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let map = NameMap::from_names(table.keys().map(String::as_str));
        let out = map.apply_to_table(table);
        assert_eq!(out.len(), 1);
        assert_eq!(out["a-b"], "second");
    }
}

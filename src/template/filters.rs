//! Custom template filters

use minijinja::value::Value;
use minijinja::{Error, ErrorKind, State};

/// Register all custom filters with a minijinja Environment
pub fn register_filters(env: &mut minijinja::Environment) {
    env.add_filter("yaml_str", filter_yaml_str);
}

/// Quote a value as a YAML scalar
///
/// JSON strings are valid double-quoted YAML scalars, so paths with spaces,
/// colons or `#` survive the round trip.
/// Example: `/models/my: dir` becomes `"/models/my: dir"`
fn filter_yaml_str(_state: &State, value: Value) -> Result<Value, Error> {
    let text = match value.as_str() {
        Some(s) => s.to_string(),
        None => value.to_string(),
    };
    let quoted = serde_json::to_string(&text).map_err(|e| {
        Error::new(
            ErrorKind::InvalidOperation,
            format!("YAML quoting failed: {}", e),
        )
    })?;
    Ok(Value::from_safe_string(quoted))
}

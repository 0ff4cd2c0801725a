//! Document schema and per-entity field constraints
//!
//! Each entity is deserialized on its own so that a malformed model or group does
//! not hide the findings for the others. Entities that fail here are left out of
//! the cross-entity checks.

use super::ValidationReport;
use crate::macros::{MacroTable, tokens};
use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};
use std::collections::HashSet;
use std::sync::LazyLock;

pub const LOG_LEVELS: [&str; 4] = ["debug", "info", "warn", "error"];
pub const MAX_MACRO_NAME_LEN: usize = 64;
pub const MAX_MACRO_VALUE_LEN: usize = 1024;
pub const MIN_HEALTH_CHECK_TIMEOUT: i64 = 15;

static STRIP_PARAMS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_,\s]+$").expect("valid strip_params pattern"));

/// One model entry
#[allow(dead_code)]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelEntry {
    pub cmd: String,
    #[serde(default)]
    pub cmd_stop: Option<String>,
    #[serde(default = "default_proxy")]
    pub proxy: Option<String>,
    #[serde(default)]
    pub aliases: Option<Vec<String>>,
    #[serde(default)]
    pub env: Option<Vec<String>>,
    #[serde(default = "default_check_endpoint")]
    pub check_endpoint: Option<String>,
    #[serde(default)]
    pub ttl: Option<i64>,
    #[serde(default)]
    pub unlisted: Option<bool>,
    #[serde(default)]
    pub use_model_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub concurrency_limit: Option<i64>,
    #[serde(default)]
    pub filters: Option<ModelFilters>,
}

/// Launch default: the proxy talks to the port handed to `cmd`
pub const DEFAULT_PROXY: &str = "http://localhost:${PORT}";

fn default_proxy() -> Option<String> {
    Some(DEFAULT_PROXY.to_string())
}

fn default_check_endpoint() -> Option<String> {
    Some("/health".to_string())
}

impl ModelEntry {
    /// Proxy URL, falling back to the launch default when unset or null
    pub fn proxy(&self) -> &str {
        self.proxy.as_deref().unwrap_or(DEFAULT_PROXY)
    }

    pub fn aliases(&self) -> &[String] {
        self.aliases.as_deref().unwrap_or_default()
    }

    /// Textual fields that may carry macro references, with their document names
    pub fn macro_fields(&self) -> [(&'static str, &str); 4] {
        [
            ("cmd", self.cmd.as_str()),
            ("cmdStop", self.cmd_stop.as_deref().unwrap_or_default()),
            ("proxy", self.proxy()),
            (
                "checkEndpoint",
                self.check_endpoint.as_deref().unwrap_or_default(),
            ),
        ]
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelFilters {
    #[serde(default)]
    pub strip_params: Option<String>,
}

/// A swap group
#[allow(dead_code)]
#[derive(Debug, Clone, Deserialize)]
pub struct Group {
    #[serde(default)]
    pub swap: Option<bool>,
    #[serde(default)]
    pub exclusive: Option<bool>,
    #[serde(default)]
    pub persistent: Option<bool>,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Hooks {
    #[serde(default)]
    pub on_startup: Option<StartupHook>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StartupHook {
    #[serde(default)]
    pub preload: Option<Vec<String>>,
}

/// Entities that passed their field constraints
#[derive(Debug, Default)]
pub struct CheckedDocument {
    pub models: IndexMap<String, ModelEntry>,
    pub groups: IndexMap<String, Group>,
    pub macros: MacroTable,
    pub profiles: IndexMap<String, Vec<String>>,
    pub preload: Vec<String>,
    /// Ids of every declared model, including ones that failed their checks
    pub declared_models: HashSet<String>,
}

/// Phase one: parse the document and apply per-entity field constraints.
///
/// Every top-level key is parsed on its own, so a type error in one field is
/// reported as `Field '<key>'` without hiding the findings for the rest.
pub fn check_fields(root: &Mapping, report: &mut ValidationReport) -> CheckedDocument {
    check_top_level(root, report);

    let mut checked = CheckedDocument::default();

    match root.get("models") {
        None | Some(Value::Null) => report.add_error("Field 'models': Field required"),
        Some(value) => match parse::<IndexMap<String, Value>>("models", value, report) {
            Some(models) if models.is_empty() => {
                report.add_error("Field 'models': At least one model must be defined")
            }
            Some(models) => {
                for (id, value) in models {
                    checked.declared_models.insert(id.clone());
                    if let Some(model) = check_model(&id, value, report) {
                        checked.models.insert(id, model);
                    }
                }
            }
            None => {}
        },
    }

    let groups: IndexMap<String, Value> = field(root, "groups", report).unwrap_or_default();
    for (id, value) in groups {
        if let Some(group) = check_group(&id, value, report) {
            checked.groups.insert(id, group);
        }
    }

    if let Some(macros) = field::<MacroTable>(root, "macros", report) {
        checked.macros = check_macros(macros, report);
    }

    checked.profiles = field(root, "profiles", report).unwrap_or_default();
    checked.preload = field::<Hooks>(root, "hooks", report)
        .and_then(|h| h.on_startup)
        .and_then(|s| s.preload)
        .unwrap_or_default();

    checked
}

/// Parse one top-level key; absent and null both mean "not set"
fn field<T: DeserializeOwned>(root: &Mapping, key: &str, report: &mut ValidationReport) -> Option<T> {
    match root.get(key) {
        None | Some(Value::Null) => None,
        Some(value) => parse(key, value, report),
    }
}

fn parse<T: DeserializeOwned>(key: &str, value: &Value, report: &mut ValidationReport) -> Option<T> {
    match serde_yaml::from_value(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            report.add_error(format!("Field '{}': {}", key, err));
            None
        }
    }
}

fn check_top_level(root: &Mapping, report: &mut ValidationReport) {
    if let Some(timeout) = field::<i64>(root, "healthCheckTimeout", report) {
        if timeout < MIN_HEALTH_CHECK_TIMEOUT {
            report.add_error(format!(
                "Field 'healthCheckTimeout': must be at least {}, got: {}",
                MIN_HEALTH_CHECK_TIMEOUT, timeout
            ));
        }
    }

    let _log_requests: Option<bool> = field(root, "logRequests", report);

    if let Some(level) = field::<String>(root, "logLevel", report) {
        if !LOG_LEVELS.contains(&level.as_str()) {
            report.add_error(format!(
                "Field 'logLevel': logLevel must be one of {}, got: {}",
                LOG_LEVELS.join(", "),
                level
            ));
        }
    }

    if let Some(max) = field::<i64>(root, "metricsMaxInMemory", report) {
        if max < 0 {
            report.add_error(format!(
                "Field 'metricsMaxInMemory': must be non-negative, got: {}",
                max
            ));
        }
    }

    if let Some(port) = field::<i64>(root, "startPort", report) {
        if !(1..65536).contains(&port) {
            report.add_error(format!(
                "Field 'startPort': startPort must be between 1 and 65535, got: {}",
                port
            ));
        }
    }
}

fn check_model(id: &str, value: Value, report: &mut ValidationReport) -> Option<ModelEntry> {
    let model: ModelEntry = match serde_yaml::from_value(value) {
        Ok(model) => model,
        Err(err) => {
            report.add_error(format!("Field 'models → {}': {}", id, err));
            return None;
        }
    };

    let before = report.errors().len();
    let field = |name: &str| format!("Field 'models → {} → {}'", id, name);

    if model.cmd.trim().is_empty() {
        report.add_error(format!("{}: cmd cannot be empty", field("cmd")));
    }

    for entry in model.env.as_deref().unwrap_or_default() {
        if !is_valid_env(entry) {
            report.add_error(format!(
                "{}: Environment variable must be in format KEY=value, got: {}",
                field("env"),
                entry
            ));
        }
    }

    if let Some(proxy) = &model.proxy {
        if !proxy.starts_with("http://") && !proxy.starts_with("https://") {
            report.add_error(format!(
                "{}: proxy must start with http:// or https://",
                field("proxy")
            ));
        }
    }

    for (name, value) in [("ttl", model.ttl), ("concurrencyLimit", model.concurrency_limit)] {
        if let Some(v) = value {
            if v < 0 {
                report.add_error(format!("{}: must be non-negative, got: {}", field(name), v));
            }
        }
    }

    let strip = model
        .filters
        .as_ref()
        .and_then(|f| f.strip_params.as_deref())
        .unwrap_or_default();
    if !strip.is_empty() && !STRIP_PARAMS_RE.is_match(strip) {
        report.add_error(format!(
            "{}: strip_params must contain only alphanumeric characters, underscores, commas, and spaces",
            field("filters → strip_params")
        ));
    }

    (report.errors().len() == before).then_some(model)
}

/// `KEY=value` with a non-empty key and exactly one `=`
fn is_valid_env(entry: &str) -> bool {
    match entry.split_once('=') {
        Some((key, value)) => !key.is_empty() && !value.contains('='),
        None => false,
    }
}

fn check_group(id: &str, value: Value, report: &mut ValidationReport) -> Option<Group> {
    let group: Group = match serde_yaml::from_value(value) {
        Ok(group) => group,
        Err(err) => {
            report.add_error(format!("Field 'groups → {}': {}", id, err));
            return None;
        }
    };

    let field = format!("Field 'groups → {} → members'", id);
    if group.members.is_empty() {
        report.add_error(format!("{}: Group must have at least one member", field));
        return None;
    }

    let mut seen = HashSet::new();
    if group.members.iter().any(|m| !seen.insert(m.as_str())) {
        report.add_error(format!("{}: Group members must be unique", field));
        return None;
    }

    Some(group)
}

/// Name and value constraints; every declared macro is kept for the cross-entity checks
fn check_macros(macros: MacroTable, report: &mut ValidationReport) -> MacroTable {
    for (name, value) in &macros {
        if name.chars().count() >= MAX_MACRO_NAME_LEN {
            report.add_error(format!(
                "Field 'macros': Macro name '{}' exceeds maximum length of {} characters",
                name,
                MAX_MACRO_NAME_LEN - 1
            ));
        }
        if !tokens::is_valid_macro_name(name) {
            report.add_error(format!(
                "Field 'macros': Macro name '{}' contains invalid characters",
                name
            ));
        }
        if tokens::is_reserved(name) {
            report.add_error(format!("Field 'macros': Macro name '{}' is reserved", name));
        }
        if value.chars().count() >= MAX_MACRO_VALUE_LEN {
            report.add_error(format!(
                "Field 'macros': Macro value for '{}' exceeds maximum length of {} characters",
                name,
                MAX_MACRO_VALUE_LEN - 1
            ));
        }
    }
    macros
}

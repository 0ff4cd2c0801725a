//! Proxy configuration validation
//!
//! Two phases: per-entity field constraints ([`schema`]), then cross-entity
//! consistency ([`rules`]) over whatever survived the first phase.

mod report;
mod rules;
mod schema;
mod suggest;

use serde_yaml::Value;
use std::path::Path;

pub use report::ValidationReport;

const EMPTY_DOCUMENT: &str = "YAML file is empty or contains only null values";

/// Validate an already parsed document
pub fn validate_value(root: Value) -> ValidationReport {
    match root {
        Value::Null => ValidationReport::failed(EMPTY_DOCUMENT),
        Value::Mapping(root) => {
            let mut report = ValidationReport::new();
            let checked = schema::check_fields(&root, &mut report);
            rules::check_consistency(&checked, &mut report);
            tracing::debug!(
                errors = report.errors().len(),
                warnings = report.warnings().len(),
                "validation finished"
            );
            report
        }
        _ => ValidationReport::failed("YAML root must be a dictionary/object"),
    }
}

/// Validate YAML text
pub fn validate_str(text: &str) -> ValidationReport {
    if text.trim().is_empty() {
        return ValidationReport::failed(EMPTY_DOCUMENT);
    }
    match serde_yaml::from_str::<Value>(text) {
        Ok(root) => validate_value(root),
        Err(err) => ValidationReport::failed(format!("YAML syntax error: {}", err)),
    }
}

/// Validate a YAML file on disk
pub fn validate_file(path: &Path) -> ValidationReport {
    if !path.is_file() {
        return ValidationReport::failed(format!("File not found: {}", path.display()));
    }
    match std::fs::read_to_string(path) {
        Ok(text) => validate_str(&text),
        Err(err) => ValidationReport::failed(format!("Error reading file: {}", err)),
    }
}

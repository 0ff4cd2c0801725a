//! Accumulated validation findings

use serde::{Deserialize, Serialize};

/// Outcome of validating one document
///
/// Findings are only ever appended; once an error is added the report stays invalid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    is_valid: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationReport {
    /// An empty, passing report
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// A report holding a single structural error
    pub fn failed(error: impl Into<String>) -> Self {
        let mut report = Self::new();
        report.add_error(error);
        report
    }

    pub fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
        self.is_valid = false;
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Append all findings of `other`
    pub fn merge(&mut self, other: ValidationReport) {
        for error in other.errors {
            self.add_error(error);
        }
        self.warnings.extend(other.warnings);
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Human-readable report with numbered findings
    pub fn format_report(&self) -> String {
        let mut lines = Vec::new();

        if self.is_valid {
            lines.push("✅ YAML validation passed".to_string());
        } else {
            lines.push("❌ YAML validation failed".to_string());
        }

        if !self.errors.is_empty() {
            lines.push(format!("\nErrors ({}):", self.errors.len()));
            for (i, error) in self.errors.iter().enumerate() {
                lines.push(format!("  {}. {}", i + 1, error));
            }
        }

        if !self.warnings.is_empty() {
            lines.push(format!("\nWarnings ({}):", self.warnings.len()));
            for (i, warning) in self.warnings.iter().enumerate() {
                lines.push(format!("  {}. {}", i + 1, warning));
            }
        }

        lines.join("\n")
    }
}

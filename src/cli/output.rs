//! Output handlers for CLI commands
//!
//! Supports console (pretty), JSON, and quiet output modes. Documents and
//! reports go to stdout; progress messages go to stderr.

use crate::validate::ValidationReport;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Output mode for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputMode {
    #[default]
    Console,
    Json,
    Quiet,
}

/// Progress events emitted by commands
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OutputEvent {
    ConfigLoaded { path: PathBuf },
    Generated { models: usize, macros: usize },
    Written { path: PathBuf },
}

/// Output handler trait
pub trait OutputHandler {
    /// Emit a progress event
    fn emit(&self, event: OutputEvent);

    /// Rendered validation report, or `None` when nothing should be printed
    fn render_report(&self, report: &ValidationReport) -> Option<String>;

    fn report(&self, report: &ValidationReport) {
        if let Some(text) = self.render_report(report) {
            println!("{}", text);
        }
    }
}

/// Console output handler
pub struct ConsoleHandler;

impl OutputHandler for ConsoleHandler {
    fn emit(&self, event: OutputEvent) {
        match event {
            OutputEvent::ConfigLoaded { path } => {
                eprintln!("Using config {}", path.display());
            }
            OutputEvent::Generated { models, macros } => {
                eprintln!("Generated {} models ({} macros)", models, macros);
            }
            OutputEvent::Written { path } => {
                eprintln!("✓ Wrote {}", path.display());
            }
        }
    }

    fn render_report(&self, report: &ValidationReport) -> Option<String> {
        Some(report.format_report())
    }
}

/// JSON output handler
pub struct JsonHandler {
    pretty: bool,
}

impl JsonHandler {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn to_json<T: Serialize>(&self, value: &T) -> Option<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        json.ok()
    }
}

impl OutputHandler for JsonHandler {
    fn emit(&self, event: OutputEvent) {
        // stdout is reserved for the document itself
        if let Some(line) = self.to_json(&event) {
            eprintln!("{}", line);
        }
    }

    fn render_report(&self, report: &ValidationReport) -> Option<String> {
        self.to_json(report)
    }
}

/// Quiet handler: no progress, only errors from reports
pub struct QuietHandler;

impl OutputHandler for QuietHandler {
    fn emit(&self, _event: OutputEvent) {}

    fn render_report(&self, report: &ValidationReport) -> Option<String> {
        if report.is_valid() {
            return None;
        }
        let lines: Vec<String> = report
            .errors()
            .iter()
            .map(|e| format!("ERROR: {}", e))
            .collect();
        Some(lines.join("\n"))
    }
}

/// Create an output handler based on mode
pub fn create_handler(mode: OutputMode) -> Box<dyn OutputHandler> {
    match mode {
        OutputMode::Console => Box::new(ConsoleHandler),
        OutputMode::Json => Box::new(JsonHandler::new(true)),
        OutputMode::Quiet => Box::new(QuietHandler),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failing_report() -> ValidationReport {
        let mut report = ValidationReport::failed("first problem");
        report.add_error("second problem");
        report.add_warning("minor thing");
        report
    }

    #[test]
    fn test_console_report() {
        let text = ConsoleHandler.render_report(&failing_report()).unwrap();
        assert!(text.starts_with("❌ YAML validation failed"));
        assert!(text.contains("Warnings (1):"));
    }

    #[test]
    fn test_json_report() {
        let text = JsonHandler::new(true).render_report(&failing_report()).unwrap();
        let parsed: ValidationReport = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, failing_report());
    }

    #[test]
    fn test_quiet_report() {
        let handler = QuietHandler;
        assert_eq!(handler.render_report(&ValidationReport::new()), None);

        let text = handler.render_report(&failing_report()).unwrap();
        assert_eq!(text, "ERROR: first problem\nERROR: second problem");
    }

    #[test]
    fn test_event_serializes_tagged() {
        let json = serde_json::to_value(OutputEvent::Generated {
            models: 2,
            macros: 5,
        })
        .unwrap();
        assert_eq!(json["type"], "Generated");
        assert_eq!(json["models"], 2);
    }

    #[test]
    fn test_create_handler() {
        let report = ValidationReport::new();
        assert!(create_handler(OutputMode::Console).render_report(&report).is_some());
        assert!(create_handler(OutputMode::Json).render_report(&report).is_some());
        assert!(create_handler(OutputMode::Quiet).render_report(&report).is_none());
    }
}

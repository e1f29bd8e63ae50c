//! Machine-readable CLI output.
//!
//! The JSON mode reports the captured program output plus every visible
//! diagnostic, for integration with editors and CI systems.

use brio_lang::diagnostics::{Diagnostics, Severity};
use clap::ValueEnum;
use serde::Serialize;

/// Output mode for CLI execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Human-readable output (default)
    Text,
    /// Single JSON object after execution completes
    Json,
}

/// Diagnostic location and text with 1-indexed line and column.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDiagnostic {
    pub line: u32,
    pub column: u32,
    pub severity: &'static str,
    pub message: String,
}

/// JSON output for a whole run.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRunOutput {
    #[serde(rename = "type")]
    pub output_type: &'static str,
    pub status: &'static str,
    pub stdout: String,
    pub diagnostics: Vec<JsonDiagnostic>,
}

pub fn format_run_json(diagnostics: &Diagnostics, stdout: &str) -> String {
    let entries: Vec<JsonDiagnostic> = diagnostics
        .entries()
        .iter()
        .map(|d| JsonDiagnostic {
            line: d.span.start.line,
            column: d.span.start.column,
            severity: match d.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
            },
            message: d.message.clone(),
        })
        .collect();

    let output = JsonRunOutput {
        output_type: "run",
        status: if diagnostics.had_error() { "error" } else { "complete" },
        stdout: stdout.to_string(),
        diagnostics: entries,
    };

    serde_json::to_string(&output).expect("run report serializes")
}

//! Diagnostics collection and rendering for brio.
//!
//! Every phase of the pipeline reports into a single [`Diagnostics`]
//! sink, passed down by mutable reference. Rendering is deferred until
//! the caller has decided what to do with the run, so the sink itself
//! holds no reference to the source text.

use crate::lexer::token::Span;
use std::fmt;


/// How many diagnostics are kept verbatim before further reports are
/// only counted.
pub const DEFAULT_ERROR_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "Error"),
            Severity::Warning => write!(f, "Warning"),
        }
    }
}

/// A single problem found during lexing, parsing, checking or execution.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub message: String,
    pub span: Span,
    pub severity: Severity,
}

/// Accumulates diagnostics across all phases of a single compile.
#[derive(Debug)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    limit: usize,
    suppressed: usize,
    error_count: usize,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_ERROR_LIMIT)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            limit,
            suppressed: 0,
            error_count: 0,
        }
    }

    /// Record an error. Past the visible limit the report is only
    /// counted, not kept.
    pub fn report(&mut self, message: impl Into<String>, span: Span) {
        self.push(message.into(), span, Severity::Error);
    }

    /// Record a warning. Warnings never make [`Diagnostics::had_error`]
    /// true.
    pub fn warn(&mut self, message: impl Into<String>, span: Span) {
        self.push(message.into(), span, Severity::Warning);
    }

    fn push(&mut self, message: String, span: Span, severity: Severity) {
        if severity == Severity::Error {
            self.error_count += 1;
        }
        if self.entries.len() < self.limit {
            self.entries.push(Diagnostic {
                message,
                span,
                severity,
            });
        } else {
            self.suppressed += 1;
        }
    }

    pub fn had_error(&self) -> bool {
        self.error_count > 0
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// The diagnostics kept verbatim (at most the visible limit).
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.suppressed == 0
    }

    /// Render every visible diagnostic against the source it was
    /// produced from. Each diagnostic renders as a three-line block:
    ///
    /// ```text
    /// [3:9] Error: Expected ';' after declaration
    /// 3 | let x = 5
    ///             ^ <- Error Here
    /// ```
    ///
    /// followed by a blank separator line. When reports were suppressed
    /// a footer states how many were shown.
    pub fn render(&self, source: &str) -> String {
        let mut out = String::new();
        for diagnostic in &self.entries {
            self.render_one(diagnostic, source, &mut out);
            out.push('\n');
        }
        if self.suppressed > 0 {
            let total = self.entries.len() + self.suppressed;
            out.push_str(&format!(
                "Showing {} of {} errors. Fix these and recompile to see the rest.\n",
                self.entries.len(),
                total
            ));
        }
        out
    }

    fn render_one(&self, diagnostic: &Diagnostic, source: &str, out: &mut String) {
        let start = diagnostic.span.start;
        let end = diagnostic.span.end;

        out.push_str(&format!(
            "[{}:{}] {}: {}\n",
            start.line, start.column, diagnostic.severity, diagnostic.message
        ));

        let line_text = source[start.line_start..]
            .lines()
            .next()
            .unwrap_or("")
            .trim_end_matches('\r');
        let prefix = format!("{} | ", start.line);
        out.push_str(&prefix);
        out.push_str(line_text);
        out.push('\n');

        let underline = (end.column as usize + 1).saturating_sub(start.column as usize);
        let indent = prefix.len() + start.column as usize - 1;
        out.push_str(&" ".repeat(indent));
        out.push_str(&"^".repeat(underline));
        out.push_str(" <- Error Here\n");
    }
}

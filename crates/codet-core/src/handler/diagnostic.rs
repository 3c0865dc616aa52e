//! Compiler diagnostics reported by language handlers

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// How serious a diagnostic is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// One issue reported by a compiler backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    /// Line in the generated program, when the backend reports one
    pub line: Option<usize>,
}

impl Diagnostic {
    /// Error diagnostic without a location
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            line: None,
        }
    }

    /// Warning diagnostic without a location
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            line: None,
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{} (line {}): {}", self.severity, line, self.message),
            None => write!(f, "{}: {}", self.severity, self.message),
        }
    }
}

/// Compilation failed. Carries the program text that was handed to the
/// backend together with everything the backend reported.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("errors during compilation of template: {}", summarize(.diagnostics))]
pub struct CompilationError {
    pub program: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl CompilationError {
    pub fn new(program: impl Into<String>, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            program: program.into(),
            diagnostics,
        }
    }

    /// Diagnostics with [`Severity::Error`]
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }
}

fn summarize(diagnostics: &[Diagnostic]) -> String {
    if diagnostics.is_empty() {
        return "no diagnostics reported".to_string();
    }
    diagnostics
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

//! Error handling for the Pitusya compiler
//!
//! This module defines the error taxonomy of the code generator and the
//! diagnostic reporting utilities used by the driver.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Main compiler error type that encompasses all phases of code generation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompilerError {
    /// Native target discovery failed; no session was started
    #[error("Toolchain error: {message}")]
    ToolchainError { message: String },

    /// Invalid lowering request (arity mismatch, unknown name, type mismatch, ...)
    #[error("Construction error in {function}: {message}")]
    ConstructionError { function: String, message: String },

    /// A function or the module failed structural verification
    #[error("Verification failed for {function}: {message}")]
    VerificationError { function: String, message: String },

    /// A previous verification failure poisoned the session
    #[error("Session is unusable after verification of {function} failed")]
    SessionPoisoned { function: String },

    /// A handle was used with a session that did not create it
    #[error("Stale handle: {message}")]
    StaleHandle { message: String },

    /// The evaluator could not execute a function
    #[error("Execution error in {function}: {message}")]
    ExecutionError { function: String, message: String },

    #[error("IO error: {message}")]
    IoError { message: String },

    #[error("Internal compiler error: {message}")]
    InternalError { message: String },
}

impl CompilerError {
    /// Create a construction error
    pub fn construction_error(function: impl Into<String>, message: impl Into<String>) -> Self {
        CompilerError::ConstructionError {
            function: function.into(),
            message: message.into(),
        }
    }

    /// Create a verification error
    pub fn verification_error(function: impl Into<String>, message: impl Into<String>) -> Self {
        CompilerError::VerificationError {
            function: function.into(),
            message: message.into(),
        }
    }

    /// Create an execution error
    pub fn execution_error(function: impl Into<String>, message: impl Into<String>) -> Self {
        CompilerError::ExecutionError {
            function: function.into(),
            message: message.into(),
        }
    }

    /// Create a stale handle error
    pub fn stale_handle(message: impl Into<String>) -> Self {
        CompilerError::StaleHandle {
            message: message.into(),
        }
    }

    /// Errors after which the session must not be used any further
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CompilerError::ToolchainError { .. }
                | CompilerError::VerificationError { .. }
                | CompilerError::SessionPoisoned { .. }
                | CompilerError::InternalError { .. }
        )
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
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

/// A diagnostic message with severity and optional notes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn error(message: String) -> Self {
        Self {
            severity: Severity::Error,
            message,
            notes: Vec::new(),
        }
    }

    pub fn warning(message: String) -> Self {
        Self {
            severity: Severity::Warning,
            message,
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }
}

impl From<&CompilerError> for Diagnostic {
    fn from(err: &CompilerError) -> Self {
        let diagnostic = Diagnostic::error(err.to_string());
        if err.is_fatal() {
            diagnostic.with_note("compilation session aborted".to_string())
        } else {
            diagnostic
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)?;

        for note in &self.notes {
            write!(f, "\n  note: {note}")?;
        }

        Ok(())
    }
}

/// Error reporter for collecting and displaying diagnostics
#[derive(Debug, Default)]
pub struct ErrorReporter {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a compiler error as an error diagnostic
    pub fn report(&mut self, err: &CompilerError) -> &mut Diagnostic {
        self.push(Diagnostic::from(err))
    }

    /// Report a warning diagnostic
    pub fn warning(&mut self, message: String) -> &mut Diagnostic {
        self.push(Diagnostic::warning(message))
    }

    fn push(&mut self, diagnostic: Diagnostic) -> &mut Diagnostic {
        match diagnostic.severity {
            Severity::Error => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
        }
        self.diagnostics.push(diagnostic);
        let last = self.diagnostics.len() - 1;
        &mut self.diagnostics[last]
    }

    /// Check if any errors have been reported
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Print all diagnostics to stderr
    pub fn print_diagnostics(&self) {
        for diagnostic in &self.diagnostics {
            eprintln!("{diagnostic}");
        }
    }

    /// Create a summary string
    pub fn summary(&self) -> String {
        match (self.error_count, self.warning_count) {
            (0, 0) => "No errors or warnings".to_string(),
            (0, w) => format!("{} warning{}", w, if w == 1 { "" } else { "s" }),
            (e, 0) => format!("{} error{}", e, if e == 1 { "" } else { "s" }),
            (e, w) => format!(
                "{} error{} and {} warning{}",
                e,
                if e == 1 { "" } else { "s" },
                w,
                if w == 1 { "" } else { "s" }
            ),
        }
    }
}

/// Convert from std::io::Error
impl From<std::io::Error> for CompilerError {
    fn from(err: std::io::Error) -> Self {
        CompilerError::IoError {
            message: err.to_string(),
        }
    }
}

/// Convert from String (for simple error cases)
impl From<String> for CompilerError {
    fn from(message: String) -> Self {
        CompilerError::InternalError { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CompilerError::construction_error("f", "Expected 2 arguments, but got 1");
        assert_eq!(
            err.to_string(),
            "Construction error in f: Expected 2 arguments, but got 1"
        );

        let err = CompilerError::verification_error("g", "entry block has no terminator");
        assert_eq!(
            err.to_string(),
            "Verification failed for g: entry block has no terminator"
        );
    }

    #[test]
    fn test_fatality() {
        assert!(!CompilerError::construction_error("f", "x").is_fatal());
        assert!(!CompilerError::stale_handle("x").is_fatal());
        assert!(CompilerError::verification_error("f", "x").is_fatal());
        assert!(CompilerError::ToolchainError {
            message: "no target".to_string()
        }
        .is_fatal());
    }

    #[test]
    fn test_diagnostic_from_fatal_error_has_note() {
        let err = CompilerError::verification_error("f", "bad");
        let diag = Diagnostic::from(&err);

        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.notes, vec!["compilation session aborted".to_string()]);
        assert_eq!(
            diag.to_string(),
            "error: Verification failed for f: bad\n  note: compilation session aborted"
        );
    }

    #[test]
    fn test_error_reporter() {
        let mut reporter = ErrorReporter::new();

        assert!(!reporter.has_errors());
        assert_eq!(reporter.error_count(), 0);

        reporter.report(&CompilerError::construction_error("main", "No variable x"));
        assert!(reporter.has_errors());
        assert_eq!(reporter.error_count(), 1);
        assert_eq!(reporter.diagnostics().len(), 1);
    }

    #[test]
    fn test_summary() {
        let mut reporter = ErrorReporter::new();
        assert_eq!(reporter.summary(), "No errors or warnings");

        reporter.report(&CompilerError::construction_error("a", "1"));
        assert_eq!(reporter.summary(), "1 error");

        reporter.report(&CompilerError::construction_error("b", "2"));
        assert_eq!(reporter.summary(), "2 errors");

        reporter.warning("Warning 1".to_string());
        assert_eq!(reporter.summary(), "2 errors and 1 warning");
    }
}

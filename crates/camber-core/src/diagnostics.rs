//! Per-line diagnostics for G-code parsing.
//!
//! Parsing never aborts on a bad line: every problem is recorded as a
//! [`Diagnostic`] attached to its [`crate::program::Statement`] and surfaced
//! in aggregate. Only structurally insufficient inputs (degenerate alignment
//! points, an un-normalized mesh) fail hard, and those use dedicated error
//! types, not diagnostics.
//!
//! Codes are organized by kind:
//! - `E0xx` - syntax errors (malformed words, mismatched parens)
//! - `E1xx` - dialect errors (constructs the controller cannot run)
//! - `W1xx` - unsupported-code warnings (preserved, non-fatal)
//! - `W2xx` - range warnings (advisory machine-limit checks)

use std::fmt;

use serde::{Deserialize, Serialize};

/// The severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// A problem in a statement that makes it unsafe to stream.
    ///
    /// Errors never abort a parse; the remaining file is still processed.
    Error,

    /// An advisory issue; the statement is preserved and passed through.
    Warning,
}

impl Severity {
    /// Returns `true` if this is an error severity.
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Error)
    }

    /// Returns `true` if this is a warning severity.
    pub fn is_warning(&self) -> bool {
        matches!(self, Severity::Warning)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    /// Malformed number.
    ///
    /// A word letter was followed by text that does not parse as a number
    /// (e.g. `X1.2.3`).
    E001,

    /// Mismatched parentheses.
    ///
    /// A `(` comment was opened but never closed on the same line.
    E002,

    /// Unsupported units.
    ///
    /// `G20` (inches) is rejected rather than silently converted; Camber
    /// programs are millimeter-only.
    E100,

    /// Unsupported code.
    ///
    /// A G/M code or word letter outside the supported dialect. The word is
    /// preserved verbatim and passed through.
    W100,

    /// Incremental distance mode.
    ///
    /// `G91` is not supported; coordinates on subsequent lines are resolved
    /// as absolute.
    W101,

    /// Axis value outside configured travel limits.
    W200,

    /// Spindle speed outside configured PWM bounds.
    W201,
}

impl DiagnosticCode {
    /// Returns the code as a string (e.g. "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::E001 => "E001",
            DiagnosticCode::E002 => "E002",
            DiagnosticCode::E100 => "E100",
            DiagnosticCode::W100 => "W100",
            DiagnosticCode::W101 => "W101",
            DiagnosticCode::W200 => "W200",
            DiagnosticCode::W201 => "W201",
        }
    }

    /// Returns a short description of what this code means.
    pub fn description(&self) -> &'static str {
        match self {
            DiagnosticCode::E001 => "malformed number",
            DiagnosticCode::E002 => "mismatched parentheses",
            DiagnosticCode::E100 => "unsupported units",
            DiagnosticCode::W100 => "unsupported code",
            DiagnosticCode::W101 => "incremental mode treated as absolute",
            DiagnosticCode::W200 => "axis value outside travel limits",
            DiagnosticCode::W201 => "spindle speed outside PWM bounds",
        }
    }

    /// Returns the severity implied by this code.
    pub fn severity(&self) -> Severity {
        match self {
            DiagnosticCode::E001 | DiagnosticCode::E002 | DiagnosticCode::E100 => Severity::Error,
            DiagnosticCode::W100
            | DiagnosticCode::W101
            | DiagnosticCode::W200
            | DiagnosticCode::W201 => Severity::Warning,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single diagnosed problem, keyed by source line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    code: DiagnosticCode,
    line_number: usize,
    message: String,
}

impl Diagnostic {
    /// Creates a new diagnostic for the given 1-based source line.
    pub fn new(code: DiagnosticCode, line_number: usize, message: impl Into<String>) -> Self {
        Self {
            code,
            line_number,
            message: message.into(),
        }
    }

    /// Returns the diagnostic code.
    pub fn code(&self) -> DiagnosticCode {
        self.code
    }

    /// Returns the severity (derived from the code).
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the 1-based source line this diagnostic refers to.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Returns the human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}: {}[{}]: {}",
            self.line_number,
            self.severity(),
            self.code,
            self.message
        )
    }
}

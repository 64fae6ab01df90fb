//! Adapters for rendering camber diagnostics and errors through miette.
//!
//! The library reports parse problems as plain per-line [`Diagnostic`]
//! values; this module bridges them to [`miette::Diagnostic`] so the CLI
//! can show source snippets with the offending line underlined. Each
//! diagnostic is rendered independently.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use camber::diagnostics::Diagnostic;

use crate::CliError;

/// Adapter for a single parse diagnostic.
pub struct DiagnosticAdapter<'a> {
    /// The wrapped diagnostic
    diag: &'a Diagnostic,
    /// Source code for displaying snippets
    src: &'a str,
}

impl<'a> DiagnosticAdapter<'a> {
    /// Create a new diagnostic adapter.
    pub fn new(diag: &'a Diagnostic, src: &'a str) -> Self {
        Self { diag, src }
    }
}

impl fmt::Debug for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticAdapter")
            .field("diag", &self.diag)
            .finish()
    }
}

impl fmt::Display for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.diag.message())
    }
}

impl std::error::Error for DiagnosticAdapter<'_> {}

impl MietteDiagnostic for DiagnosticAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.diag.code().as_str()))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(if self.diag.severity().is_error() {
            miette::Severity::Error
        } else {
            miette::Severity::Warning
        })
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.diag.code().description()))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = line_span(self.src, self.diag.line_number())?;
        let label = LabeledSpan::new_primary_with_span(
            Some(self.diag.severity().to_string()),
            span,
        );
        Some(Box::new(std::iter::once(label)))
    }
}

/// Byte span of a 1-based line within `src`.
fn line_span(src: &str, line_number: usize) -> Option<SourceSpan> {
    let mut offset = 0usize;
    for (i, line) in src.lines().enumerate() {
        if i + 1 == line_number {
            return Some(SourceSpan::new(offset.into(), line.len()));
        }
        offset += line.len() + 1;
    }
    None
}

/// Adapter for [`CliError`] variants without per-line information.
pub struct ErrorAdapter<'a>(pub &'a CliError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(self.0)
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        use camber::CamberError;
        let code = match &self.0 {
            CliError::Io(_) => "camber::io",
            CliError::Input { .. } => "camber::input",
            CliError::ProgramErrors { .. } => "camber::check",
            CliError::Camber(err) => match err {
                CamberError::Io(_) => "camber::io",
                CamberError::Align(_) => "camber::align",
                CamberError::Remap(_) => "camber::remap",
                CamberError::Mesh(_) => "camber::mesh",
                CamberError::Config(_) => "camber::config",
            },
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match &self.0 {
            CliError::ProgramErrors { .. } => {
                Some(Box::new("fix the listed errors before streaming this program"))
            }
            _ => None,
        }
    }
}

/// Renders a miette diagnostic to a string.
pub fn render(reportable: &dyn MietteDiagnostic) -> String {
    let reporter = miette::GraphicalReportHandler::new();
    let mut writer = String::new();
    reporter
        .render_report(&mut writer, reportable)
        .expect("Writing to String buffer is infallible");
    writer
}

#[cfg(test)]
mod tests {
    use super::*;
    use camber::diagnostics::DiagnosticCode;

    #[test]
    fn test_line_span_offsets() {
        let src = "G21\nG1 X\nM5";
        assert_eq!(line_span(src, 1), Some(SourceSpan::new(0.into(), 3)));
        assert_eq!(line_span(src, 2), Some(SourceSpan::new(4.into(), 4)));
        assert_eq!(line_span(src, 3), Some(SourceSpan::new(9.into(), 2)));
        assert_eq!(line_span(src, 4), None);
    }

    #[test]
    fn test_diagnostic_adapter_renders_code_and_line() {
        let src = "G21\nG1 X1.2.3";
        let diag = Diagnostic::new(DiagnosticCode::E001, 2, "bad number `1.2.3` after `X`");
        let rendered = render(&DiagnosticAdapter::new(&diag, src));
        assert!(rendered.contains("E001"));
        assert!(rendered.contains("bad number"));
    }
}

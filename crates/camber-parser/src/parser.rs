//! The modal parser: raw text in, [`Program`] out.
//!
//! The public entry points are [`parse`] and [`parse_with_config`]. Parsing
//! never fails as a whole — a malformed line becomes a statement with error
//! diagnostics attached, and every remaining line is still processed. Each
//! source line (including blank and comment-only lines) produces exactly one
//! statement, so `line_number ↔ statement_index` sync with an external
//! editor is total.

use log::debug;

use camber_core::program::{Program, ProgramMetadata, Wcs};

use crate::config::ParserConfig;
use crate::lexer::tokenize_line;
use crate::modal::ModalState;

/// Parses G-code text with default (no-limits) configuration.
pub fn parse(text: &str) -> Program {
    parse_with_config(text, &ParserConfig::default())
}

/// Parses G-code text, attaching range warnings per `config`.
///
/// Single forward pass: each line is tokenized, resolved against the modal
/// state accumulated from all prior lines, and classified. The returned
/// program owns a fresh statement set; nothing is retained between calls.
pub fn parse_with_config(text: &str, config: &ParserConfig) -> Program {
    let mut state = ModalState::new();
    let mut statements = Vec::new();
    let mut metadata = ProgramMetadata::new();

    for (index, line) in text.lines().enumerate() {
        let line_number = index + 1;
        let lexed = tokenize_line(line, line_number);
        let (statement, next) = state.resolve(line_number, index, line, lexed, config);

        match statement.g_code {
            Some(53) => metadata.record_wcs(Wcs::G53),
            Some(54) => metadata.record_wcs(Wcs::G54),
            _ => {}
        }
        if statement.is_body_motion {
            metadata.record_motion();
            metadata.merge_position(statement.position);
        }

        state = next;
        statements.push(statement);
    }

    metadata.set_line_count(statements.len());

    let error_count = statements
        .iter()
        .flat_map(|s| &s.diagnostics)
        .filter(|d| d.severity().is_error())
        .count();
    debug!(
        lines = statements.len(),
        motions = metadata.motion_count(),
        errors = error_count;
        "parsed program"
    );

    Program::from_statements(statements, metadata)
}

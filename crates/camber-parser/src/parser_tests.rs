//! Whole-program parser tests.
//!
//! Per-line resolution is covered in `modal`; these tests exercise the full
//! `parse` entry point: line accounting, diagnostics aggregation, metadata,
//! and the totality/determinism properties.

use camber_core::diagnostics::DiagnosticCode;
use camber_core::geometry::Point3;
use camber_core::program::{MotionKind, Wcs};

use crate::parse;

#[test]
fn test_every_line_becomes_a_statement() {
    let program = parse("G21\n\n; comment only\n(note)\nG1 X5");
    assert_eq!(program.len(), 5);
    assert_eq!(program.metadata().line_count(), 5);
    for (i, stmt) in program.statements().iter().enumerate() {
        assert_eq!(stmt.statement_index, i);
        assert_eq!(stmt.line_number, i + 1);
    }
}

#[test]
fn test_blank_and_comment_lines_are_non_motion() {
    let program = parse("\n; hello\n(note)");
    assert!(program.statements().iter().all(|s| !s.is_body_motion));
    assert_eq!(program.metadata().motion_count(), 0);
}

#[test]
fn test_modal_carry_over() {
    let program = parse("G1 X10 Y5\nY20");
    let second = program.statement(1).unwrap();
    assert_eq!(second.position, Point3::new(10.0, 20.0, 0.0));
    assert!(second.is_body_motion);
    assert_eq!(second.motion, Some(MotionKind::Feed));
}

#[test]
fn test_raw_text_preserved_verbatim() {
    let source = "  G1   X10 ( inline )  Y5  ";
    let program = parse(source);
    assert_eq!(program.statement(0).unwrap().raw, source);
    assert_eq!(program.to_source(), source);
}

#[test]
fn test_error_on_one_line_does_not_block_rest() {
    let program = parse("G1 X\nG1 X5 Y5");
    assert!(program.statement(0).unwrap().has_errors());
    let second = program.statement(1).unwrap();
    assert!(!second.has_errors());
    assert!(second.is_body_motion);
    assert_eq!(second.position, Point3::new(5.0, 5.0, 0.0));
}

#[test]
fn test_diagnostics_aggregate_in_line_order() {
    let program = parse("G20\nG1 X1\nG91");
    let lines: Vec<usize> = program.diagnostics().map(|d| d.line_number()).collect();
    assert_eq!(lines, vec![1, 3]);
    let codes: Vec<DiagnosticCode> = program.diagnostics().map(|d| d.code()).collect();
    assert_eq!(codes, vec![DiagnosticCode::E100, DiagnosticCode::W101]);
}

#[test]
fn test_motion_errors_flag() {
    // The error is on a non-motion line; body motions are clean.
    let program = parse("G20\nG1 X5");
    assert!(!program.has_motion_errors());

    // Error on the motion line itself.
    let program = parse("G1 X5 Y1.2.3");
    assert!(program.has_motion_errors());
}

#[test]
fn test_metadata_bounds_and_counts() {
    let program = parse("G0 X0 Y0 Z5\nG1 Z-1\nG1 X10 Y20\nM5");
    let meta = program.metadata();
    assert_eq!(meta.motion_count(), 3);
    let bounds = meta.bounds();
    assert_eq!(bounds.min().unwrap(), Point3::new(0.0, 0.0, -1.0));
    assert_eq!(bounds.max().unwrap(), Point3::new(10.0, 20.0, 5.0));
}

#[test]
fn test_metadata_wcs_seen() {
    let program = parse("G54\nG53\nG54");
    let seen: Vec<Wcs> = program.metadata().wcs_seen().collect();
    assert_eq!(seen, vec![Wcs::G54, Wcs::G53]);
}

#[test]
fn test_empty_input() {
    let program = parse("");
    assert!(program.is_empty());
    assert_eq!(program.metadata().line_count(), 0);
}

#[test]
fn test_arc_parameters_pass_through() {
    let program = parse("G2 X10 Y0 I5 J0");
    let stmt = program.statement(0).unwrap();
    assert!(stmt.is_body_motion);
    assert_eq!(stmt.motion, Some(MotionKind::ArcCw));
    assert_eq!(stmt.word('I'), Some(5.0));
    assert!(stmt.diagnostics.is_empty());
}

mod properties {
    use proptest::prelude::*;

    use crate::parse;

    proptest! {
        /// Parsing is total: arbitrary text never panics, and every line
        /// yields exactly one statement.
        #[test]
        fn prop_parse_total(text in "[ -~\n]{0,400}") {
            let program = parse(&text);
            prop_assert_eq!(program.len(), text.lines().count());
        }

        /// Parsing is deterministic: the same text yields a structurally
        /// identical program.
        #[test]
        fn prop_parse_deterministic(text in "[ -~\n]{0,400}") {
            let a = parse(&text);
            let b = parse(&text);
            prop_assert_eq!(a, b);
        }

        /// Statement indices are always the dense sequence 0..N-1 and line
        /// numbers are strictly increasing.
        #[test]
        fn prop_indices_dense(text in "[A-Za-z0-9 .;()\n-]{0,400}") {
            let program = parse(&text);
            for (i, stmt) in program.statements().iter().enumerate() {
                prop_assert_eq!(stmt.statement_index, i);
                prop_assert_eq!(stmt.line_number, i + 1);
            }
        }
    }
}

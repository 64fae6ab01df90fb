//! Program outline: header / body / footer classification.
//!
//! Editors show a program as three collapsible regions. The split is purely
//! positional: the header is everything before the first body-motion
//! statement, the footer everything after the last one, and the body the
//! motion section in between. The per-statement candidate flags from the
//! parser describe what a line *looks* like; this module decides where the
//! regions actually fall, so a stray `M5` in the middle of the body stays
//! in the body.

use std::ops::Range;

use camber_core::program::{Program, Statement};

/// The three regions of a program, as statement index ranges.
///
/// The ranges are contiguous and cover `0..program.len()` exactly. Programs
/// with no body motion are all header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outline {
    header: Range<usize>,
    body: Range<usize>,
    footer: Range<usize>,
}

impl Outline {
    /// Statement index range of the header region.
    pub fn header(&self) -> Range<usize> {
        self.header.clone()
    }

    /// Statement index range of the body region.
    pub fn body(&self) -> Range<usize> {
        self.body.clone()
    }

    /// Statement index range of the footer region.
    pub fn footer(&self) -> Range<usize> {
        self.footer.clone()
    }

    /// The region containing the given statement index, as `'h'`/`'b'`/`'f'`
    /// for display, or `None` when out of range.
    pub fn region_of(&self, statement_index: usize) -> Option<char> {
        if self.header.contains(&statement_index) {
            Some('h')
        } else if self.body.contains(&statement_index) {
            Some('b')
        } else if self.footer.contains(&statement_index) {
            Some('f')
        } else {
            None
        }
    }
}

/// Splits a program into header, body, and footer regions.
pub fn outline(program: &Program) -> Outline {
    let is_motion = |s: &Statement| s.is_body_motion;
    let first = program.statements().iter().position(is_motion);
    let last = program.statements().iter().rposition(is_motion);

    let len = program.len();
    match (first, last) {
        (Some(first), Some(last)) => Outline {
            header: 0..first,
            body: first..last + 1,
            footer: last + 1..len,
        },
        _ => Outline {
            header: 0..len,
            body: len..len,
            footer: len..len,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camber_parser::parse;

    #[test]
    fn test_typical_program_splits_in_three() {
        let program = parse("G21\nG54\nM3 S10000\nG0 X0 Y0 Z2\nG1 Z-0.1\nG1 X5\nM5\nM2");
        let outline = outline(&program);
        assert_eq!(outline.header(), 0..3);
        assert_eq!(outline.body(), 3..6);
        assert_eq!(outline.footer(), 6..8);
        assert_eq!(outline.region_of(0), Some('h'));
        assert_eq!(outline.region_of(4), Some('b'));
        assert_eq!(outline.region_of(7), Some('f'));
        assert_eq!(outline.region_of(8), None);
    }

    #[test]
    fn test_mid_body_stop_stays_in_body() {
        // Tool change in the middle: the M5/M3 pair is inside the body.
        let program = parse("G1 X1\nM5\nM3 S5000\nG1 X2");
        let outline = outline(&program);
        assert_eq!(outline.body(), 0..4);
        assert_eq!(outline.region_of(1), Some('b'));
    }

    #[test]
    fn test_no_motion_is_all_header() {
        let program = parse("G21\n; nothing to cut\nM2");
        let outline = outline(&program);
        assert_eq!(outline.header(), 0..3);
        assert!(outline.body().is_empty());
        assert!(outline.footer().is_empty());
    }

    #[test]
    fn test_empty_program() {
        let outline = outline(&parse(""));
        assert!(outline.header().is_empty());
        assert!(outline.body().is_empty());
        assert!(outline.footer().is_empty());
    }
}

//! The parsed program model: statements, movements, metadata.
//!
//! A [`Program`] is the ordered sequence of [`Statement`]s produced by one
//! parse pass, plus aggregate [`ProgramMetadata`]. Statements are created
//! once per parse and never mutated afterwards; an edit or transform always
//! produces a wholly new statement set. [`Movement`]s are derived records,
//! one per body-motion statement, used by the geometry builder and the
//! (external) streaming engine.

use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::diagnostics::Diagnostic;
use crate::geometry::{Bounds3, Point3};

/// Kind of a motion command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MotionKind {
    /// `G0` rapid positioning.
    Rapid,
    /// `G1` linear feed move.
    Feed,
    /// `G2` clockwise arc.
    ArcCw,
    /// `G3` counter-clockwise arc.
    ArcCcw,
}

impl MotionKind {
    /// Returns `true` for `G2`/`G3` arcs.
    pub fn is_arc(self) -> bool {
        matches!(self, MotionKind::ArcCw | MotionKind::ArcCcw)
    }

    /// The G word selecting this motion mode.
    pub fn g_number(self) -> u16 {
        match self {
            MotionKind::Rapid => 0,
            MotionKind::Feed => 1,
            MotionKind::ArcCw => 2,
            MotionKind::ArcCcw => 3,
        }
    }

    /// Maps a G number to a motion kind, if it is one.
    pub fn from_g_number(g: u16) -> Option<Self> {
        match g {
            0 => Some(MotionKind::Rapid),
            1 => Some(MotionKind::Feed),
            2 => Some(MotionKind::ArcCw),
            3 => Some(MotionKind::ArcCcw),
            _ => None,
        }
    }
}

impl fmt::Display for MotionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G{}", self.g_number())
    }
}

/// Supported linear units. Camber is millimeter-only; `G20` is rejected at
/// parse time, so the variant set is deliberately closed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Units {
    /// `G21` millimeters.
    #[default]
    Mm,
}

/// Work-coordinate selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Wcs {
    /// `G54` work coordinate system (default).
    #[default]
    G54,
    /// `G53` machine coordinates.
    G53,
}

impl fmt::Display for Wcs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Wcs::G54 => write!(f, "G54"),
            Wcs::G53 => write!(f, "G53"),
        }
    }
}

/// One letter/number word as it appeared on a source line (`X10.5`, `G1`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Word {
    /// Uppercase word letter.
    pub letter: char,
    /// Numeric value following the letter.
    pub value: f64,
}

impl Word {
    /// Creates a word, normalizing the letter to uppercase.
    pub fn new(letter: char, value: f64) -> Self {
        Self {
            letter: letter.to_ascii_uppercase(),
            value,
        }
    }

    /// Renders the word back to G-code text.
    ///
    /// Integral values print without a decimal point (`G1`, `X10`); others
    /// print with up to four decimals, trailing zeros trimmed (`X10.5`).
    pub fn render(&self) -> String {
        if self.value == self.value.trunc() && self.value.abs() < 1e15 {
            format!("{}{}", self.letter, self.value as i64)
        } else {
            let mut digits = format!("{:.4}", self.value);
            while digits.ends_with('0') {
                digits.pop();
            }
            if digits.ends_with('.') {
                digits.pop();
            }
            format!("{}{}", self.letter, digits)
        }
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// One parsed, resolved source line.
///
/// Coordinates and feed/spindle values are the *resolved* modal state after
/// this statement: axes omitted on the line inherit the previous value.
/// `raw` preserves the original text verbatim for re-display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    /// 1-based source line number, stable across the file.
    pub line_number: usize,
    /// 0-based position in the program's statement sequence.
    pub statement_index: usize,
    /// Original line text, byte-for-byte.
    pub raw: String,
    /// Comment content (`;...` or `(...)`), stripped of delimiters.
    pub comment: Option<String>,
    /// Words in source order, comments removed.
    pub words: Vec<Word>,
    /// G code carried by this line, if any (e.g. `1` for `G1`).
    pub g_code: Option<u16>,
    /// M code carried by this line, if any.
    pub m_code: Option<u16>,
    /// Motion mode active for this statement (modal, may be inherited).
    pub motion: Option<MotionKind>,
    /// Resolved absolute position after this statement.
    pub position: Point3,
    /// `true` if the line carried an explicit X word.
    pub has_x: bool,
    /// `true` if the line carried an explicit Y word.
    pub has_y: bool,
    /// `true` if the line carried an explicit Z word.
    pub has_z: bool,
    /// Feed rate in effect after this statement, if one was ever programmed.
    pub feed: Option<f64>,
    /// Spindle speed in effect after this statement, if ever programmed.
    pub spindle: Option<f64>,
    /// Carries a supported motion code with at least one axis word.
    pub is_body_motion: bool,
    /// Heuristic: codes typically appearing before the body (display only).
    pub is_header_candidate: bool,
    /// Heuristic: codes typically appearing after the body (display only).
    pub is_footer_candidate: bool,
    /// Problems diagnosed on this line.
    pub diagnostics: Vec<Diagnostic>,
}

impl Statement {
    /// Returns the value of the first word with the given letter, if present.
    pub fn word(&self, letter: char) -> Option<f64> {
        let letter = letter.to_ascii_uppercase();
        self.words
            .iter()
            .find(|w| w.letter == letter)
            .map(|w| w.value)
    }

    /// Returns `true` if any diagnostic on this line is an error.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity().is_error())
    }

    /// Returns `true` if the line carried an X and/or Y word.
    pub fn has_xy(&self) -> bool {
        self.has_x || self.has_y
    }

    /// Regenerates G-code text from the words and comment.
    ///
    /// Used by transforms for statements they rewrote; untouched statements
    /// keep [`Statement::raw`] instead.
    pub fn render_words(words: &[Word], comment: Option<&str>) -> String {
        let mut out = words
            .iter()
            .map(Word::render)
            .collect::<Vec<_>>()
            .join(" ");
        if let Some(comment) = comment {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str("; ");
            out.push_str(comment);
        }
        out
    }
}

/// A derived start → end motion record for one body-motion statement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    /// Index of the statement this movement was derived from.
    pub statement_index: usize,
    /// Absolute position before the statement.
    pub from: Point3,
    /// Resolved absolute position after the statement.
    pub to: Point3,
    /// Rapid, feed, or arc.
    pub kind: MotionKind,
}

/// Aggregate metadata for one parsed program.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgramMetadata {
    units: Units,
    wcs_seen: IndexSet<Wcs>,
    bounds: Bounds3,
    line_count: usize,
    motion_count: usize,
}

impl ProgramMetadata {
    /// Creates empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Detected units (always millimeters in the supported dialect).
    pub fn units(&self) -> Units {
        self.units
    }

    /// Work-coordinate systems referenced, in first-seen order.
    pub fn wcs_seen(&self) -> impl Iterator<Item = Wcs> + '_ {
        self.wcs_seen.iter().copied()
    }

    /// Records a referenced work-coordinate system.
    pub fn record_wcs(&mut self, wcs: Wcs) {
        self.wcs_seen.insert(wcs);
    }

    /// Bounding box over resolved motion targets.
    pub fn bounds(&self) -> Bounds3 {
        self.bounds
    }

    /// Grows the bounds to include a resolved position.
    pub fn merge_position(&mut self, point: Point3) {
        self.bounds.merge_point(point);
    }

    /// Total source lines (including blank and comment-only lines).
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Sets the total source line count.
    pub fn set_line_count(&mut self, count: usize) {
        self.line_count = count;
    }

    /// Number of body-motion statements.
    pub fn motion_count(&self) -> usize {
        self.motion_count
    }

    /// Increments the body-motion statement counter.
    pub fn record_motion(&mut self) {
        self.motion_count += 1;
    }
}

/// Full representation of a parsed G-code file.
///
/// Owns its statements exclusively. Invariants: `statement_index` is the
/// dense sequence `0..N-1` matching position, and `line_number` is
/// non-decreasing and covers every source line (blank and comment-only lines
/// still produce a non-motion statement).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    statements: Vec<Statement>,
    metadata: ProgramMetadata,
}

impl Program {
    /// Assembles a program from already-resolved statements.
    pub fn from_statements(statements: Vec<Statement>, metadata: ProgramMetadata) -> Self {
        debug_assert!(
            statements
                .iter()
                .enumerate()
                .all(|(i, s)| s.statement_index == i),
            "statement_index must match sequence position"
        );
        Self {
            statements,
            metadata,
        }
    }

    /// Returns all statements in program order.
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Number of statements (equals the source line count).
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Returns `true` for an empty program.
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Returns the statement at `index`, if in range.
    pub fn statement(&self, index: usize) -> Option<&Statement> {
        self.statements.get(index)
    }

    /// Aggregate metadata for the program.
    pub fn metadata(&self) -> &ProgramMetadata {
        &self.metadata
    }

    /// All diagnostics across every statement, in line order.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.statements.iter().flat_map(|s| s.diagnostics.iter())
    }

    /// Returns `true` if any body-motion statement has an unresolved error.
    ///
    /// Callers use this to block "send to machine" workflows.
    pub fn has_motion_errors(&self) -> bool {
        self.statements
            .iter()
            .any(|s| s.is_body_motion && s.has_errors())
    }

    /// Regenerates source text by joining statement raw lines.
    pub fn to_source(&self) -> String {
        self.statements
            .iter()
            .map(|s| s.raw.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

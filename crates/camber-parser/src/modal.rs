//! Modal interpreter state and per-line statement resolution.
//!
//! G-code is positionally modal: correctness depends on carrying unstated
//! values forward across arbitrarily many lines. [`ModalState`] makes that
//! carried state an explicit value threaded through each resolution step, so
//! resolution is reentrant and testable line by line — there is no module
//! global anywhere in the parser.

use camber_core::diagnostics::{Diagnostic, DiagnosticCode};
use camber_core::geometry::Point3;
use camber_core::program::{MotionKind, Statement, Units, Wcs};

use crate::codes;
use crate::config::ParserConfig;
use crate::lexer::LexedLine;

/// The modal G-code state at one point in a program.
///
/// The default state is the machine's power-on convention: millimeters,
/// absolute distance mode, `G54`, position at origin, no motion mode until
/// the first motion code appears.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ModalState {
    motion: Option<MotionKind>,
    units: Units,
    wcs: Wcs,
    position: Point3,
    feed: Option<f64>,
    spindle: Option<f64>,
}

impl ModalState {
    /// Creates the power-on modal state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Active motion mode, if any motion code has appeared yet.
    pub fn motion(&self) -> Option<MotionKind> {
        self.motion
    }

    /// Current absolute position.
    pub fn position(&self) -> Point3 {
        self.position
    }

    /// Current work-coordinate selection.
    pub fn wcs(&self) -> Wcs {
        self.wcs
    }

    /// Resolves one lexed line into a [`Statement`] and the modal state that
    /// follows it.
    ///
    /// Axes omitted on the line inherit their last resolved value; only axes
    /// present as words are updated. All problems are attached to the
    /// statement as diagnostics — resolution itself never fails.
    pub fn resolve(
        &self,
        line_number: usize,
        statement_index: usize,
        raw: &str,
        lexed: LexedLine,
        config: &ParserConfig,
    ) -> (Statement, ModalState) {
        let LexedLine {
            words,
            comment,
            mut diagnostics,
        } = lexed;

        let mut next = *self;
        let mut g_code = None;
        let mut m_code = None;
        let mut target = self.position;
        let (mut has_x, mut has_y, mut has_z) = (false, false, false);
        let mut has_s = false;

        for word in &words {
            match word.letter {
                'G' => {
                    if word.value < 0.0 || word.value.fract() != 0.0 {
                        diagnostics.push(Diagnostic::new(
                            DiagnosticCode::W100,
                            line_number,
                            format!("unsupported code `{}`", word.render()),
                        ));
                        continue;
                    }
                    let g = word.value as u16;
                    g_code = Some(g);
                    self.resolve_g(g, line_number, &mut next, &mut diagnostics);
                }
                'M' => {
                    if word.value < 0.0 || word.value.fract() != 0.0 {
                        diagnostics.push(Diagnostic::new(
                            DiagnosticCode::W100,
                            line_number,
                            format!("unsupported code `{}`", word.render()),
                        ));
                        continue;
                    }
                    let m = word.value as u16;
                    m_code = Some(m);
                    if !codes::is_supported_m(m) {
                        diagnostics.push(Diagnostic::new(
                            DiagnosticCode::W100,
                            line_number,
                            format!("unsupported code `M{m}`"),
                        ));
                    }
                }
                'X' => {
                    has_x = true;
                    target = target.with_x(word.value);
                    check_travel('X', word.value, line_number, config, &mut diagnostics);
                }
                'Y' => {
                    has_y = true;
                    target = target.with_y(word.value);
                    check_travel('Y', word.value, line_number, config, &mut diagnostics);
                }
                'Z' => {
                    has_z = true;
                    target = target.with_z(word.value);
                    check_travel('Z', word.value, line_number, config, &mut diagnostics);
                }
                'F' => next.feed = Some(word.value),
                'S' => {
                    has_s = true;
                    next.spindle = Some(word.value);
                    if let Some(max) = config.spindle_max {
                        if word.value < 0.0 || word.value > max {
                            diagnostics.push(Diagnostic::new(
                                DiagnosticCode::W201,
                                line_number,
                                format!("S{} outside spindle range 0..{max}", word.value),
                            ));
                        }
                    }
                }
                letter if codes::is_parameter_letter(letter) => {
                    // Arc/dwell parameters; consumed downstream.
                }
                letter => {
                    diagnostics.push(Diagnostic::new(
                        DiagnosticCode::W100,
                        line_number,
                        format!("unsupported code `{}{}`", letter, word.value),
                    ));
                }
            }
        }

        next.position = target;

        let has_axis = has_x || has_y || has_z;
        let is_body_motion = next.motion.is_some() && has_axis;

        let is_header_candidate = !is_body_motion
            && (g_code.is_some_and(codes::is_header_g)
                || m_code.is_some_and(codes::is_header_m)
                || has_s);
        let is_footer_candidate = !is_body_motion
            && (g_code.is_some_and(codes::is_footer_g) || m_code.is_some_and(codes::is_footer_m));

        let statement = Statement {
            line_number,
            statement_index,
            raw: raw.to_string(),
            comment,
            words,
            g_code,
            m_code,
            motion: next.motion,
            position: next.position,
            has_x,
            has_y,
            has_z,
            feed: next.feed,
            spindle: next.spindle,
            is_body_motion,
            is_header_candidate,
            is_footer_candidate,
            diagnostics,
        };

        (statement, next)
    }

    fn resolve_g(
        &self,
        g: u16,
        line_number: usize,
        next: &mut ModalState,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        match g {
            0 | 1 | 2 | 3 => next.motion = MotionKind::from_g_number(g),
            4 => {} // dwell; P word carried as a parameter
            20 => diagnostics.push(Diagnostic::new(
                DiagnosticCode::E100,
                line_number,
                "G20 inch units are not supported; program must be in millimeters",
            )),
            21 => {} // millimeters, the default
            28 => {} // homing
            53 => next.wcs = Wcs::G53,
            54 => next.wcs = Wcs::G54,
            90 => {} // absolute, the only supported distance mode
            91 => diagnostics.push(Diagnostic::new(
                DiagnosticCode::W101,
                line_number,
                "G91 incremental mode is not supported; coordinates resolved as absolute",
            )),
            92 => {} // position register set; preserved for the controller
            other => diagnostics.push(Diagnostic::new(
                DiagnosticCode::W100,
                line_number,
                format!("unsupported code `G{other}`"),
            )),
        }
    }
}

fn check_travel(
    axis: char,
    value: f64,
    line_number: usize,
    config: &ParserConfig,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if let Some(travel) = &config.travel {
        if !travel.contains(axis, value) {
            diagnostics.push(Diagnostic::new(
                DiagnosticCode::W200,
                line_number,
                format!("{axis}{value} outside configured travel limits"),
            ));
        }
    }
}

//! Alignment solving and application.
//!
//! Solving takes paired design/machine reference points and produces an
//! [`AlignmentProfile`] whose [`Transform2`] maps design XY onto machine XY.
//! Three modes are supported: rigid (rotation + translation, via the 2D
//! Kabsch closed form), rigid with uniform scale (spread-ratio estimate),
//! and full affine (3x3 normal equations). Residuals are always computed
//! and attached to the profile; a poor fit is logged but never rejected,
//! since the operator decides whether to re-probe.
//!
//! Applying a transform rewrites the program's XY coordinates and returns a
//! freshly parsed [`Program`]: rewritten statements are rendered back to
//! G-code text, untouched statements keep their raw bytes, and the joined
//! text goes through the ordinary parser so every downstream invariant holds
//! by construction. Arcs are flattened to line statements before the
//! rewrite (see [`crate::config::ArcPolicy`]).

use log::{debug, warn};
use thiserror::Error;

use camber_core::align::{AlignMode, AlignmentProfile, ReferencePoint, Residuals, Transform2};
use camber_core::geometry::Point3;
use camber_core::program::{MotionKind, Program, Statement, Word};

use crate::arc::flatten_arc;
use crate::config::{GeometryConfig, TransformConfig};

/// Minimum reference point pairs for any solve mode.
const MIN_POINTS: usize = 3;

/// Relative area threshold below which the input points count as collinear.
const COLLINEAR_EPSILON: f64 = 1e-9;

/// Why an alignment solve was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AlignError {
    /// Fewer point pairs than the solver needs.
    #[error("alignment needs at least {required} point pairs, got {got}")]
    TooFewPoints { required: usize, got: usize },

    /// Design and machine point lists differ in length.
    #[error("mismatched point lists: {design} design vs {machine} machine")]
    MismatchedPoints { design: usize, machine: usize },

    /// Points are coincident or collinear; the transform is underdetermined.
    #[error("reference points are collinear or coincident")]
    DegenerateInput,
}

/// Solves an alignment from paired reference points.
///
/// `design[i]` corresponds to `machine[i]`. Residuals above the configured
/// warning threshold are logged; the solve still succeeds.
pub fn solve(
    name: &str,
    mode: AlignMode,
    design: &[ReferencePoint],
    machine: &[ReferencePoint],
    config: &TransformConfig,
) -> Result<AlignmentProfile, AlignError> {
    if design.len() != machine.len() {
        return Err(AlignError::MismatchedPoints {
            design: design.len(),
            machine: machine.len(),
        });
    }
    if design.len() < MIN_POINTS {
        return Err(AlignError::TooFewPoints {
            required: MIN_POINTS,
            got: design.len(),
        });
    }
    if is_collinear(design) {
        return Err(AlignError::DegenerateInput);
    }

    let transform = match mode {
        AlignMode::Rigid => solve_rigid(design, machine, false)?,
        AlignMode::RigidScaled => solve_rigid(design, machine, true)?,
        AlignMode::Affine => solve_affine(design, machine)?,
    };

    let residuals = residuals(&transform, design, machine);
    if residuals.max_error > config.residual_warn_mm() {
        warn!(
            profile = name,
            max_error = residuals.max_error,
            rms_error = residuals.rms_error;
            "alignment residuals exceed threshold, consider re-probing"
        );
    } else {
        debug!(
            profile = name,
            max_error = residuals.max_error,
            rms_error = residuals.rms_error;
            "alignment solved"
        );
    }

    Ok(AlignmentProfile {
        name: name.to_string(),
        mode,
        transform,
        design_points: design.to_vec(),
        machine_points: machine.to_vec(),
        residuals,
        created_at: std::time::SystemTime::now(),
    })
}

/// 2D Kabsch: optimal rotation from centered cross-covariance, optional
/// uniform scale from the spread ratio.
fn solve_rigid(
    design: &[ReferencePoint],
    machine: &[ReferencePoint],
    scaled: bool,
) -> Result<Transform2, AlignError> {
    let (dcx, dcy) = centroid(design);
    let (mcx, mcy) = centroid(machine);

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    let mut d_spread = 0.0;
    let mut m_spread = 0.0;
    for (d, m) in design.iter().zip(machine) {
        let (dx, dy) = (d.x - dcx, d.y - dcy);
        let (mx, my) = (m.x - mcx, m.y - mcy);
        sxx += dx * mx + dy * my;
        sxy += dx * my - dy * mx;
        d_spread += dx * dx + dy * dy;
        m_spread += mx * mx + my * my;
    }
    if d_spread == 0.0 || m_spread == 0.0 {
        return Err(AlignError::DegenerateInput);
    }

    let theta = sxy.atan2(sxx);
    let scale = if scaled {
        (m_spread / d_spread).sqrt()
    } else {
        1.0
    };

    // Translation so the design centroid lands on the machine centroid.
    let (sin, cos) = theta.sin_cos();
    let tx = mcx - scale * (cos * dcx - sin * dcy);
    let ty = mcy - scale * (sin * dcx + cos * dcy);
    Ok(Transform2::scaled_rotation(scale, theta, tx, ty))
}

/// Least-squares affine fit via the 3x3 normal equations, one row of the
/// matrix per output axis.
fn solve_affine(
    design: &[ReferencePoint],
    machine: &[ReferencePoint],
) -> Result<Transform2, AlignError> {
    let mut a = [[0.0f64; 3]; 3];
    let mut bx = [0.0f64; 3];
    let mut by = [0.0f64; 3];
    for (d, m) in design.iter().zip(machine) {
        let row = [d.x, d.y, 1.0];
        for i in 0..3 {
            for j in 0..3 {
                a[i][j] += row[i] * row[j];
            }
            bx[i] += row[i] * m.x;
            by[i] += row[i] * m.y;
        }
    }

    let x_row = solve_3x3(&a, &bx).ok_or(AlignError::DegenerateInput)?;
    let y_row = solve_3x3(&a, &by).ok_or(AlignError::DegenerateInput)?;
    Ok(Transform2 {
        a11: x_row[0],
        a12: x_row[1],
        a21: y_row[0],
        a22: y_row[1],
        tx: x_row[2],
        ty: y_row[2],
    })
}

fn centroid(points: &[ReferencePoint]) -> (f64, f64) {
    let n = points.len() as f64;
    let sx: f64 = points.iter().map(|p| p.x).sum();
    let sy: f64 = points.iter().map(|p| p.y).sum();
    (sx / n, sy / n)
}

/// All points within `COLLINEAR_EPSILON` of one line (relative to spread).
fn is_collinear(points: &[ReferencePoint]) -> bool {
    let (cx, cy) = centroid(points);
    let spread_sq: f64 = points
        .iter()
        .map(|p| {
            let (dx, dy) = (p.x - cx, p.y - cy);
            dx * dx + dy * dy
        })
        .sum();
    if spread_sq == 0.0 {
        return true;
    }

    let p0 = &points[0];
    let p1 = &points[1];
    let (ux, uy) = (p1.x - p0.x, p1.y - p0.y);
    points.iter().all(|p| {
        let cross = ux * (p.y - p0.y) - uy * (p.x - p0.x);
        cross.abs() <= COLLINEAR_EPSILON * spread_sq.max(1.0)
    })
}

/// Cramer's rule; `None` when the matrix is singular.
fn solve_3x3(a: &[[f64; 3]; 3], b: &[f64; 3]) -> Option<[f64; 3]> {
    let det = det_3x3(a);
    if det.abs() < 1e-12 {
        return None;
    }
    let mut out = [0.0; 3];
    for (col, slot) in out.iter_mut().enumerate() {
        let mut replaced = *a;
        for row in 0..3 {
            replaced[row][col] = b[row];
        }
        *slot = det_3x3(&replaced) / det;
    }
    Some(out)
}

fn det_3x3(a: &[[f64; 3]; 3]) -> f64 {
    a[0][0] * (a[1][1] * a[2][2] - a[1][2] * a[2][1])
        - a[0][1] * (a[1][0] * a[2][2] - a[1][2] * a[2][0])
        + a[0][2] * (a[1][0] * a[2][1] - a[1][1] * a[2][0])
}

fn residuals(
    transform: &Transform2,
    design: &[ReferencePoint],
    machine: &[ReferencePoint],
) -> Residuals {
    let mut max_error = 0.0f64;
    let mut sum_sq = 0.0;
    for (d, m) in design.iter().zip(machine) {
        let (x, y) = transform.apply(d.x, d.y);
        let err = (x - m.x).hypot(y - m.y);
        max_error = max_error.max(err);
        sum_sq += err * err;
    }
    Residuals {
        max_error,
        rms_error: (sum_sq / design.len() as f64).sqrt(),
    }
}

/// Applies a solved transform to a program's XY coordinates.
///
/// Produces a new program by rewriting affected lines and reparsing. Rules:
///
/// - Statements that are not body motion, or carry no X/Y word, keep their
///   raw text byte-for-byte. Z-only plunges are never rewritten.
/// - Linear body motion with an X and/or Y word is re-rendered with *both*
///   transformed axis words, since rotation couples the axes and the modal
///   inherited value is no longer correct.
/// - A bare axis line before any motion code seeds the modal position, so it
///   is rewritten too. Axis words on register-setting codes (`G92`, `G28`)
///   are controller values rather than toolpath coordinates and keep their
///   raw text.
/// - Arcs with a usable center are flattened to `G1` lines first, then each
///   vertex is transformed. Feed and comment stay on the first emitted line.
pub fn apply(program: &Program, transform: &Transform2, geometry: &GeometryConfig) -> Program {
    let mut lines: Vec<String> = Vec::with_capacity(program.len());
    let mut position = Point3::default();

    for statement in program.statements() {
        let Some(kind) = statement.motion.filter(|_| statement.is_body_motion) else {
            position = statement.position;
            if statement.has_xy() && statement.g_code.is_none() && statement.m_code.is_none() {
                lines.push(rewrite_linear(
                    statement,
                    transform.apply(position.x(), position.y()),
                ));
            } else {
                lines.push(statement.raw.clone());
            }
            continue;
        };
        let from = position;
        let to = statement.position;
        position = to;

        let has_center = statement.word('I').is_some() || statement.word('J').is_some();
        let same_xy = from.x() == to.x() && from.y() == to.y();
        if kind.is_arc() && has_center && !same_xy {
            let center = (
                statement.word('I').unwrap_or(0.0),
                statement.word('J').unwrap_or(0.0),
            );
            let clockwise = kind == MotionKind::ArcCw;
            let vertices = flatten_arc(
                from,
                to,
                center,
                clockwise,
                geometry.arc_chord_tolerance(),
            );
            let helical = from.z() != to.z();
            for (i, vertex) in vertices.iter().enumerate() {
                let (x, y) = transform.apply(vertex.x(), vertex.y());
                let mut words = vec![Word::new('G', 1.0), Word::new('X', x), Word::new('Y', y)];
                if helical || statement.has_z {
                    words.push(Word::new('Z', vertex.z()));
                }
                if i == 0 {
                    if let Some(feed) = statement.word('F') {
                        words.push(Word::new('F', feed));
                    }
                    lines.push(Statement::render_words(
                        &words,
                        statement.comment.as_deref(),
                    ));
                } else {
                    lines.push(Statement::render_words(&words, None));
                }
            }
        } else if statement.has_xy() {
            lines.push(rewrite_linear(statement, transform.apply(to.x(), to.y())));
        } else {
            lines.push(statement.raw.clone());
        }
    }

    let rewritten = lines.join("\n");
    debug!(statements = program.len(), lines = lines.len(); "applied alignment transform");
    camber_parser::parse(&rewritten)
}

/// Re-renders a linear motion line with both transformed axis words,
/// preserving every other word and the comment.
fn rewrite_linear(statement: &Statement, (x, y): (f64, f64)) -> String {
    let mut words = Vec::with_capacity(statement.words.len() + 2);
    let mut wrote_x = false;
    let mut wrote_y = false;
    for word in &statement.words {
        match word.letter {
            'X' => {
                words.push(Word::new('X', x));
                wrote_x = true;
            }
            'Y' => {
                words.push(Word::new('Y', y));
                wrote_y = true;
            }
            _ => words.push(*word),
        }
    }
    if !wrote_x {
        words.push(Word::new('X', x));
    }
    if !wrote_y {
        words.push(Word::new('Y', y));
    }
    Statement::render_words(&words, statement.comment.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use camber_parser::parse;
    use float_cmp::assert_approx_eq;

    fn pairs(points: &[(f64, f64, f64, f64)]) -> (Vec<ReferencePoint>, Vec<ReferencePoint>) {
        let design = points
            .iter()
            .enumerate()
            .map(|(i, p)| ReferencePoint::design(format!("p{i}"), p.0, p.1))
            .collect();
        let machine = points
            .iter()
            .enumerate()
            .map(|(i, p)| ReferencePoint::machine(format!("p{i}"), p.2, p.3))
            .collect();
        (design, machine)
    }

    #[test]
    fn test_rigid_exact_translation() {
        let (design, machine) = pairs(&[
            (0.0, 0.0, 5.0, 5.0),
            (10.0, 0.0, 15.0, 5.0),
            (0.0, 10.0, 5.0, 15.0),
        ]);
        let profile = solve(
            "board",
            AlignMode::Rigid,
            &design,
            &machine,
            &TransformConfig::default(),
        )
        .unwrap();
        assert_approx_eq!(f64, profile.transform.tx, 5.0, epsilon = 1e-9);
        assert_approx_eq!(f64, profile.transform.ty, 5.0, epsilon = 1e-9);
        assert_approx_eq!(f64, profile.transform.a11, 1.0, epsilon = 1e-9);
        assert!(profile.residuals.max_error < 1e-9);
    }

    #[test]
    fn test_rigid_recovers_rotation() {
        // Machine points are the design rotated 90 degrees CCW.
        let (design, machine) = pairs(&[
            (1.0, 0.0, 0.0, 1.0),
            (0.0, 1.0, -1.0, 0.0),
            (2.0, 3.0, -3.0, 2.0),
        ]);
        let profile = solve(
            "rot",
            AlignMode::Rigid,
            &design,
            &machine,
            &TransformConfig::default(),
        )
        .unwrap();
        let (x, y) = profile.transform.apply(5.0, -2.0);
        assert_approx_eq!(f64, x, 2.0, epsilon = 1e-9);
        assert_approx_eq!(f64, y, 5.0, epsilon = 1e-9);
        assert!(profile.residuals.rms_error < 1e-9);
    }

    #[test]
    fn test_rigid_does_not_scale() {
        // Machine is design scaled by 2; a rigid solve keeps unit scale and
        // reports the misfit in the residuals instead.
        let (design, machine) = pairs(&[
            (0.0, 0.0, 0.0, 0.0),
            (10.0, 0.0, 20.0, 0.0),
            (0.0, 10.0, 0.0, 20.0),
        ]);
        let profile = solve(
            "scaled-board",
            AlignMode::Rigid,
            &design,
            &machine,
            &TransformConfig::default(),
        )
        .unwrap();
        let det = profile.transform.a11 * profile.transform.a22
            - profile.transform.a12 * profile.transform.a21;
        assert_approx_eq!(f64, det, 1.0, epsilon = 1e-9);
        assert!(profile.residuals.max_error > 1.0);
    }

    #[test]
    fn test_rigid_scaled_recovers_scale() {
        let (design, machine) = pairs(&[
            (0.0, 0.0, 1.0, 1.0),
            (10.0, 0.0, 21.0, 1.0),
            (0.0, 10.0, 1.0, 21.0),
        ]);
        let profile = solve(
            "scaled",
            AlignMode::RigidScaled,
            &design,
            &machine,
            &TransformConfig::default(),
        )
        .unwrap();
        assert_approx_eq!(f64, profile.transform.a11, 2.0, epsilon = 1e-9);
        assert!(profile.residuals.max_error < 1e-9);
    }

    #[test]
    fn test_affine_recovers_shear() {
        // x' = x + 0.5y + 1, y' = y - 2.
        let map = |x: f64, y: f64| (x + 0.5 * y + 1.0, y - 2.0);
        let src = [(0.0, 0.0), (10.0, 0.0), (0.0, 10.0), (7.0, 3.0)];
        let points: Vec<(f64, f64, f64, f64)> = src
            .iter()
            .map(|&(x, y)| {
                let (mx, my) = map(x, y);
                (x, y, mx, my)
            })
            .collect();
        let (design, machine) = pairs(&points);
        let profile = solve(
            "shear",
            AlignMode::Affine,
            &design,
            &machine,
            &TransformConfig::default(),
        )
        .unwrap();
        assert_approx_eq!(f64, profile.transform.a12, 0.5, epsilon = 1e-9);
        assert!(profile.residuals.max_error < 1e-9);
    }

    #[test]
    fn test_too_few_points() {
        let (design, machine) = pairs(&[(0.0, 0.0, 1.0, 1.0), (5.0, 0.0, 6.0, 1.0)]);
        let err = solve(
            "x",
            AlignMode::Rigid,
            &design,
            &machine,
            &TransformConfig::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            AlignError::TooFewPoints {
                required: 3,
                got: 2
            }
        );
    }

    #[test]
    fn test_mismatched_point_lists() {
        let (design, mut machine) = pairs(&[
            (0.0, 0.0, 0.0, 0.0),
            (10.0, 0.0, 10.0, 0.0),
            (0.0, 10.0, 0.0, 10.0),
        ]);
        machine.pop();
        let err = solve(
            "x",
            AlignMode::Rigid,
            &design,
            &machine,
            &TransformConfig::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            AlignError::MismatchedPoints {
                design: 3,
                machine: 2
            }
        );
    }

    #[test]
    fn test_collinear_points_rejected() {
        let (design, machine) = pairs(&[
            (0.0, 0.0, 1.0, 0.0),
            (5.0, 5.0, 6.0, 5.0),
            (10.0, 10.0, 11.0, 10.0),
        ]);
        for mode in [AlignMode::Rigid, AlignMode::RigidScaled, AlignMode::Affine] {
            let err = solve("x", mode, &design, &machine, &TransformConfig::default());
            assert_eq!(err.unwrap_err(), AlignError::DegenerateInput);
        }
    }

    #[test]
    fn test_noisy_fit_succeeds_with_residuals() {
        let (design, machine) = pairs(&[
            (0.0, 0.0, 0.05, 0.0),
            (10.0, 0.0, 10.0, 0.04),
            (0.0, 10.0, -0.03, 10.0),
        ]);
        let profile = solve(
            "noisy",
            AlignMode::Rigid,
            &design,
            &machine,
            &TransformConfig::default(),
        )
        .unwrap();
        assert!(profile.residuals.max_error > 0.0);
        assert!(profile.residuals.rms_error <= profile.residuals.max_error);
    }

    #[test]
    fn test_apply_translation_shifts_xy_only() {
        let program = parse("G0 X0 Y0 Z5\nG1 Z-1\nG1 X10 Y0\nM5");
        let out = apply(
            &program,
            &Transform2::translation(5.0, 5.0),
            &GeometryConfig::default(),
        );
        assert_eq!(out.len(), 4);
        let first = out.statement(0).unwrap();
        assert_eq!(first.position, Point3::new(5.0, 5.0, 5.0));
        // Z-only plunge keeps its raw text and the transformed modal XY.
        let plunge = out.statement(1).unwrap();
        assert_eq!(plunge.raw, "G1 Z-1");
        assert_eq!(plunge.position, Point3::new(5.0, 5.0, -1.0));
        assert_eq!(out.statement(2).unwrap().position, Point3::new(15.0, 5.0, -1.0));
        assert_eq!(out.statement(3).unwrap().raw, "M5");
    }

    #[test]
    fn test_apply_emits_both_axis_words_for_modal_lines() {
        // "Y20" inherits X modally; after a rotation both axes must be
        // explicit or the inherited X would be wrong.
        let program = parse("G1 X10 Y5\nY20");
        let quarter = Transform2::scaled_rotation(1.0, std::f64::consts::FRAC_PI_2, 0.0, 0.0);
        let out = apply(&program, &quarter, &GeometryConfig::default());
        let second = out.statement(1).unwrap();
        assert!(second.has_x && second.has_y);
        assert_approx_eq!(f64, second.position.x(), -20.0, epsilon = 1e-3);
        assert_approx_eq!(f64, second.position.y(), 10.0, epsilon = 1e-3);
    }

    #[test]
    fn test_apply_rewrites_pre_motion_axis_line() {
        // An axis line before any motion code seeds the modal position;
        // left alone it would feed stale XY into later Z-only lines.
        let program = parse("X5 Y5\nG1 Z-1 F30");
        let out = apply(
            &program,
            &Transform2::translation(5.0, 5.0),
            &GeometryConfig::default(),
        );
        let first = out.statement(0).unwrap();
        assert!(first.has_x && first.has_y);
        assert_eq!(first.position, Point3::new(10.0, 10.0, 0.0));
        let plunge = out.statement(1).unwrap();
        assert_eq!(plunge.raw, "G1 Z-1 F30");
        assert_eq!(plunge.position, Point3::new(10.0, 10.0, -1.0));
    }

    #[test]
    fn test_apply_leaves_offset_registers_alone() {
        let program = parse("G92 X0 Y0\nG1 X10 Y0 Z-1");
        let out = apply(
            &program,
            &Transform2::translation(5.0, 0.0),
            &GeometryConfig::default(),
        );
        // The register set keeps its words; only toolpath coordinates move.
        assert_eq!(out.statement(0).unwrap().raw, "G92 X0 Y0");
        assert_eq!(out.statement(1).unwrap().position, Point3::new(15.0, 0.0, -1.0));
    }

    #[test]
    fn test_apply_flattens_arcs_to_lines() {
        let program = parse("G1 X10 Y0\nG2 X-10 Y0 I-10 J0 F200\nM2");
        let out = apply(
            &program,
            &Transform2::identity(),
            &GeometryConfig::default(),
        );
        assert!(out.len() > 4);
        assert!(
            out.statements()
                .iter()
                .all(|s| s.motion.is_none_or(|k| !k.is_arc()))
        );
        // Feed survives on the first flattened line.
        let first_arc_line = out.statement(1).unwrap();
        assert_eq!(first_arc_line.feed, Some(200.0));
        // The flattened path still ends where the arc did.
        let last_motion = out
            .statements()
            .iter()
            .rev()
            .find(|s| s.is_body_motion)
            .unwrap();
        assert_approx_eq!(f64, last_motion.position.x(), -10.0, epsilon = 1e-3);
        assert_approx_eq!(f64, last_motion.position.y(), 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_apply_preserves_comments_and_blanks() {
        let program = parse("; header\n\nG1 X1 Y1 ( cut )\n");
        let out = apply(
            &program,
            &Transform2::translation(1.0, 0.0),
            &GeometryConfig::default(),
        );
        assert_eq!(out.statement(0).unwrap().raw, "; header");
        assert_eq!(out.statement(1).unwrap().raw, "");
        assert_eq!(out.statement(2).unwrap().comment.as_deref(), Some("cut"));
        assert_eq!(out.statement(2).unwrap().position, Point3::new(2.0, 1.0, 0.0));
    }

    #[test]
    fn test_apply_output_reparses_cleanly() {
        let program = parse("G21\nG0 X0 Y0 Z2\nG1 Z-0.1 F60\nG1 X10 Y10\nG3 X0 Y20 I-5 J5\nM5");
        let out = apply(
            &program,
            &Transform2::scaled_rotation(1.0, 0.3, 2.0, -1.0),
            &GeometryConfig::default(),
        );
        assert_eq!(out.diagnostics().count(), 0);
        assert!(!out.has_motion_errors());
    }
}

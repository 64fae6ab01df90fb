//! Height-map remapping.
//!
//! Rewrites a program's Z coordinates so cutting depth follows a probed
//! surface instead of an ideal plane: `z_corrected = z_nominal + z_mesh` at
//! every output vertex, with `z_mesh` bilinearly interpolated from a
//! normalized [`HeightMesh`].
//!
//! Moves entirely above Z zero are clearance travel and pass through
//! untouched. A move that starts or ends at or below zero is subdivided so
//! the piecewise-linear output tracks the surface: once where the nominal Z
//! crosses zero (that vertex enters the material, so it gets the corrected
//! height), and at every mesh grid line the cutting portion crosses, since
//! the interpolated surface changes slope there. Arcs are flattened to line
//! statements first, under the same policy as the alignment applier.
//!
//! Like the alignment applier, output statements are rendered to text and
//! reparsed, so the result upholds every program invariant by construction.

use log::{debug, warn};
use thiserror::Error;

use camber_core::geometry::Point3;
use camber_core::mesh::HeightMesh;
use camber_core::program::{MotionKind, Program, Statement, Word};

use crate::arc::flatten_arc;
use crate::config::{GeometryConfig, TransformConfig};

/// Why a remap was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RemapError {
    /// The mesh was not normalized at the Z touch-off point first.
    #[error("height mesh must be normalized at the reference point before remapping")]
    MeshNotNormalized,
}

/// Remaps a program's cutting depth against a probed surface.
///
/// The mesh must have been normalized via [`HeightMesh::normalized_at`];
/// passing a raw mesh is an error, not a silent offset.
pub fn remap(
    program: &Program,
    mesh: &HeightMesh,
    geometry: &GeometryConfig,
    config: &TransformConfig,
) -> Result<Program, RemapError> {
    if !mesh.is_normalized() {
        return Err(RemapError::MeshNotNormalized);
    }

    let mut lines: Vec<String> = Vec::with_capacity(program.len());
    let mut position = Point3::default();
    let mut outside_mesh = 0usize;

    for statement in program.statements() {
        let Some(kind) = statement.motion.filter(|_| statement.is_body_motion) else {
            position = statement.position;
            lines.push(statement.raw.clone());
            continue;
        };
        let from = position;
        let to = statement.position;
        position = to;

        // Clearance travel never touches the surface.
        if from.z() > 0.0 && to.z() > 0.0 {
            lines.push(statement.raw.clone());
            continue;
        }

        let has_center = statement.word('I').is_some() || statement.word('J').is_some();
        let same_xy = from.x() == to.x() && from.y() == to.y();
        let (out_kind, polyline) = if kind.is_arc() && has_center && !same_xy {
            let center = (
                statement.word('I').unwrap_or(0.0),
                statement.word('J').unwrap_or(0.0),
            );
            let vertices = flatten_arc(
                from,
                to,
                center,
                kind == MotionKind::ArcCw,
                geometry.arc_chord_tolerance(),
            );
            (MotionKind::Feed, vertices)
        } else {
            (kind, vec![to])
        };

        let mut first = true;
        let mut prev = from;
        for vertex in polyline {
            for point in subdivide(prev, vertex, mesh, config.t_epsilon()) {
                if !mesh.contains_xy(point.x(), point.y()) && point.z() <= 0.0 {
                    outside_mesh += 1;
                }
                let corrected = correct(point, mesh);
                lines.push(render_motion(statement, out_kind, prev, corrected, first));
                first = false;
            }
            prev = vertex;
        }
    }

    if outside_mesh > 0 {
        warn!(
            vertices = outside_mesh;
            "cutting moves extend beyond the probed mesh, edge heights were clamped"
        );
    }
    let rewritten = lines.join("\n");
    debug!(statements = program.len(), lines = lines.len(); "remapped heights");
    Ok(camber_parser::parse(&rewritten))
}

/// Splits `from → to` at the nominal Z-zero crossing and at mesh grid lines
/// crossed by the cutting portion within the mesh rectangle. Returns the
/// nominal (uncorrected) points after `from`, ending exactly at `to`.
fn subdivide(from: Point3, to: Point3, mesh: &HeightMesh, t_epsilon: f64) -> Vec<Point3> {
    let mut ts: Vec<f64> = Vec::new();

    // Where the nominal depth crosses zero, if it does.
    let dz = to.z() - from.z();
    let t_zero = if (from.z() > 0.0) != (to.z() > 0.0) && dz != 0.0 {
        let t = -from.z() / dz;
        if t > t_epsilon && t < 1.0 - t_epsilon {
            ts.push(t);
            Some(t)
        } else {
            None
        }
    } else {
        None
    };

    // Grid lines matter only where the move is actually in the material,
    // and only where the crossing point lies on the mesh rectangle; off the
    // mesh the clamped surface is flat, so extra vertices would be noise.
    let (t_min, t_max) = match t_zero {
        Some(t) if from.z() > 0.0 => (t, 1.0),
        Some(t) => (0.0, t),
        None => (0.0, 1.0),
    };
    let mut push_axis = |lines: &[f64], a: f64, b: f64| {
        let delta = b - a;
        if delta == 0.0 {
            return;
        }
        for &line in lines {
            let t = (line - a) / delta;
            if t > t_epsilon && t < 1.0 - t_epsilon && t >= t_min && t <= t_max {
                let crossing = from.lerp(to, t);
                if mesh.contains_xy(crossing.x(), crossing.y()) {
                    ts.push(t);
                }
            }
        }
    };
    push_axis(mesh.x_lines(), from.x(), to.x());
    push_axis(mesh.y_lines(), from.y(), to.y());

    ts.sort_by(|a, b| a.total_cmp(b));
    ts.dedup_by(|a, b| (*a - *b).abs() <= t_epsilon);

    let mut points: Vec<Point3> = ts.iter().map(|&t| from.lerp(to, t)).collect();
    points.push(to);
    points
}

/// Applies the mesh correction to a nominal point. Points above the surface
/// plane keep their nominal height.
fn correct(point: Point3, mesh: &HeightMesh) -> Point3 {
    if point.z() > 0.0 {
        point
    } else {
        point.with_z(point.z() + mesh.interpolate(point.x(), point.y()))
    }
}

/// Renders one output motion line. The first line of a rewritten statement
/// keeps the feed word and comment; XY words are omitted for pure plunges.
fn render_motion(
    statement: &Statement,
    kind: MotionKind,
    from: Point3,
    to: Point3,
    first: bool,
) -> String {
    let moves_xy = statement.position.x() != from.x() || statement.position.y() != from.y();
    let mut words = vec![Word::new('G', f64::from(kind.g_number()))];
    if moves_xy {
        words.push(Word::new('X', to.x()));
        words.push(Word::new('Y', to.y()));
    }
    words.push(Word::new('Z', to.z()));
    if first {
        if let Some(feed) = statement.word('F') {
            words.push(Word::new('F', feed));
        }
        Statement::render_words(&words, statement.comment.as_deref())
    } else {
        Statement::render_words(&words, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camber_parser::parse;
    use float_cmp::assert_approx_eq;

    /// A surface tilting from 0 at x=0 to +0.5 at x=10, already normalized
    /// at the origin.
    fn tilted_mesh() -> HeightMesh {
        HeightMesh::new(
            vec![0.0, 5.0, 10.0],
            vec![0.0, 10.0],
            vec![vec![0.0, 0.0], vec![0.25, 0.25], vec![0.5, 0.5]],
        )
        .unwrap()
        .normalized_at(0.0, 0.0)
    }

    fn remap_source(source: &str, mesh: &HeightMesh) -> Program {
        remap(
            &parse(source),
            mesh,
            &GeometryConfig::default(),
            &TransformConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_unnormalized_mesh() {
        let raw = HeightMesh::new(
            vec![0.0, 10.0],
            vec![0.0, 10.0],
            vec![vec![0.1, 0.1], vec![0.1, 0.1]],
        )
        .unwrap();
        let err = remap(
            &parse("G1 X1 Z-1"),
            &raw,
            &GeometryConfig::default(),
            &TransformConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err, RemapError::MeshNotNormalized);
    }

    #[test]
    fn test_clearance_moves_pass_through() {
        let mesh = tilted_mesh();
        let out = remap_source("G0 Z2\nG0 X5 Y5\nG0 X8 Y2", &mesh);
        // After the initial lift, travel at Z2 keeps its raw text.
        assert_eq!(out.statement(1).unwrap().raw, "G0 X5 Y5");
        assert_eq!(out.statement(2).unwrap().raw, "G0 X8 Y2");
        assert_approx_eq!(f64, out.statement(2).unwrap().position.z(), 2.0);
    }

    #[test]
    fn test_plunge_splits_at_surface_entry() {
        let mesh = tilted_mesh();
        let out = remap_source("G0 Z2\nG0 X10 Y5\nG1 Z-1 F30", &mesh);
        // The plunge becomes two lines: surface entry at nominal Z0, then
        // the corrected bottom. Mesh at x=10 is +0.5.
        let motions: Vec<_> = out
            .statements()
            .iter()
            .filter(|s| s.is_body_motion && s.line_number > 2)
            .collect();
        assert_eq!(motions.len(), 2);
        assert_approx_eq!(f64, motions[0].position.z(), 0.5, epsilon = 1e-3);
        assert_approx_eq!(f64, motions[1].position.z(), -0.5, epsilon = 1e-3);
        // Feed survives on the first rewritten line.
        assert_eq!(motions[0].feed, Some(30.0));
    }

    #[test]
    fn test_cut_splits_at_grid_lines() {
        let mesh = tilted_mesh();
        // Cut from x=0 to x=10 at constant nominal depth; one interior grid
        // line at x=5 gives three output vertices.
        let out = remap_source("G1 Z-1\nG1 X10", &mesh);
        let cut: Vec<_> = out
            .statements()
            .iter()
            .filter(|s| s.is_body_motion && s.has_x)
            .collect();
        assert_eq!(cut.len(), 2);
        assert_approx_eq!(f64, cut[0].position.x(), 5.0, epsilon = 1e-3);
        assert_approx_eq!(f64, cut[0].position.z(), -0.75, epsilon = 1e-3);
        assert_approx_eq!(f64, cut[1].position.x(), 10.0, epsilon = 1e-3);
        assert_approx_eq!(f64, cut[1].position.z(), -0.5, epsilon = 1e-3);
    }

    #[test]
    fn test_cut_inside_one_cell_stays_single_line() {
        let mesh = tilted_mesh();
        let out = remap_source("G1 Z-1\nG1 X4", &mesh);
        assert_eq!(out.len(), 2);
        let cut = out.statement(1).unwrap();
        assert_approx_eq!(f64, cut.position.z(), -1.0 + 0.2, epsilon = 1e-3);
    }

    #[test]
    fn test_endpoint_on_grid_line_not_duplicated() {
        let mesh = tilted_mesh();
        // The move ends exactly on the x=5 grid line; the crossing and the
        // endpoint must collapse to one output vertex.
        let out = remap_source("G1 Z-1\nG1 X5", &mesh);
        assert_eq!(out.len(), 2);
        assert_approx_eq!(f64, out.statement(1).unwrap().position.z(), -0.75, epsilon = 1e-3);
    }

    #[test]
    fn test_grid_crossings_outside_mesh_are_not_split() {
        let mesh = tilted_mesh();
        // The whole cut runs at y=-5, below the mesh rectangle. The x=5 grid
        // line would intersect the move there, so no extra vertex appears;
        // the endpoint still gets the edge-clamped correction.
        let out = remap_source("G1 Y-5 Z-1\nG1 X10", &mesh);
        assert_eq!(out.len(), 2);
        let cut = out.statement(1).unwrap();
        assert_approx_eq!(f64, cut.position.x(), 10.0, epsilon = 1e-9);
        assert_approx_eq!(f64, cut.position.z(), -0.5, epsilon = 1e-3);
    }

    #[test]
    fn test_flat_mesh_preserves_depth() {
        let flat = HeightMesh::new(
            vec![0.0, 10.0],
            vec![0.0, 10.0],
            vec![vec![0.3, 0.3], vec![0.3, 0.3]],
        )
        .unwrap()
        .normalized_at(0.0, 0.0);
        // Normalizing a flat mesh zeroes it, so depths are unchanged.
        let out = remap_source("G1 X3 Y3 Z-0.2", &flat);
        assert_approx_eq!(f64, out.statement(0).unwrap().position.z(), -0.2, epsilon = 1e-9);
    }

    #[test]
    fn test_arc_cut_flattens_and_corrects() {
        let mesh = tilted_mesh();
        let out = remap_source("G0 Z2\nG0 X10 Y2\nG1 Z-0.4 F50\nG2 X2 Y2 I-4 J0", &mesh);
        assert!(out.len() > 6);
        assert!(
            out.statements()
                .iter()
                .all(|s| s.motion.is_none_or(|k| !k.is_arc()))
        );
        // The flattened arc runs at constant nominal depth, so every vertex
        // sits exactly mesh-height above -0.4.
        let arc_lines = out
            .statements()
            .iter()
            .filter(|s| s.motion == Some(MotionKind::Feed) && s.has_x);
        let mut count = 0;
        for stmt in arc_lines {
            let expected = -0.4 + mesh.interpolate(stmt.position.x(), stmt.position.y());
            assert_approx_eq!(f64, stmt.position.z(), expected, epsilon = 1e-3);
            count += 1;
        }
        assert!(count > 3);
    }

    #[test]
    fn test_non_motion_lines_untouched() {
        let mesh = tilted_mesh();
        let out = remap_source("; drill pass\nG21\nG1 X2 Z-0.1\nM5", &mesh);
        assert_eq!(out.statement(0).unwrap().raw, "; drill pass");
        assert_eq!(out.statement(1).unwrap().raw, "G21");
        assert_eq!(out.statement(3).unwrap().raw, "M5");
    }

    #[test]
    fn test_output_reparses_cleanly() {
        let mesh = tilted_mesh();
        let out = remap_source("G21\nG0 X0 Y0 Z2\nG1 Z-0.2 F45\nG1 X10 Y10\nM5", &mesh);
        assert_eq!(out.diagnostics().count(), 0);
        assert!(!out.has_motion_errors());
    }
}

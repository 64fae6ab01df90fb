//! Arc flattening.
//!
//! XY-plane arcs in center mode (`I`/`J` offsets from the start point) are
//! subdivided into polylines under a maximum chord-deviation tolerance.
//! This is the single flattening routine shared by the geometry builder and
//! the XY transforms, so every consumer sees the same vertices.

use camber_core::geometry::Point3;

/// Flattens an arc into vertices along its sweep.
///
/// `center_offset` is the `(I, J)` offset from `from` to the arc center.
/// Returns the vertices after `from`, ending exactly at `to`; `from` itself
/// is not included. Z is interpolated linearly along the sweep (helical
/// moves stay helical).
///
/// Degenerate arcs (zero radius, or identical XY endpoints where the sweep
/// is ambiguous) collapse to a single straight step to `to`, matching how
/// the rest of the pipeline falls back to a line when `I`/`J` are missing.
pub(crate) fn flatten_arc(
    from: Point3,
    to: Point3,
    center_offset: (f64, f64),
    clockwise: bool,
    chord_tolerance: f64,
) -> Vec<Point3> {
    let cx = from.x() + center_offset.0;
    let cy = from.y() + center_offset.1;

    let r_start = (from.x() - cx).hypot(from.y() - cy);
    let r_end = (to.x() - cx).hypot(to.y() - cy);
    let radius = if r_start > 0.0 && r_end > 0.0 {
        (r_start + r_end) * 0.5
    } else {
        r_start.max(r_end)
    };

    let same_xy = from.x() == to.x() && from.y() == to.y();
    if radius <= 0.0 || same_xy {
        return vec![to];
    }

    let ang_start = (from.y() - cy).atan2(from.x() - cx);
    let mut ang_end = (to.y() - cy).atan2(to.x() - cx);
    if clockwise {
        if ang_end >= ang_start {
            ang_end -= 2.0 * std::f64::consts::PI;
        }
    } else if ang_end <= ang_start {
        ang_end += 2.0 * std::f64::consts::PI;
    }
    let sweep = ang_end - ang_start;

    let steps = step_count(sweep.abs(), radius, chord_tolerance);
    let mut vertices = Vec::with_capacity(steps);
    for i in 1..=steps {
        if i == steps {
            // Land exactly on the programmed endpoint; no accumulated drift.
            vertices.push(to);
        } else {
            let t = i as f64 / steps as f64;
            let theta = ang_start + sweep * t;
            vertices.push(Point3::new(
                cx + radius * theta.cos(),
                cy + radius * theta.sin(),
                from.z() + (to.z() - from.z()) * t,
            ));
        }
    }
    vertices
}

/// Number of subdivisions so each chord deviates at most `tolerance` from
/// the true arc.
///
/// The sagitta of a chord spanning angle `θ` on radius `r` is
/// `r·(1 − cos(θ/2))`; inverting gives the largest admissible step angle.
fn step_count(total_angle: f64, radius: f64, tolerance: f64) -> usize {
    let max_step = if tolerance >= radius {
        std::f64::consts::PI
    } else {
        2.0 * (1.0 - tolerance / radius).acos()
    };
    ((total_angle / max_step).ceil() as usize).max(1)
}

//! Geometry and index building.
//!
//! Converts a parsed [`Program`] into drawable geometry plus the
//! statement ↔ segment [`ProgramIndex`], deriving one [`Movement`] per
//! body-motion statement along the way. This is a single forward pass over
//! statements in order, carrying a running absolute position separately from
//! the parser's own modal state: coordinates are already resolved, so this
//! pass never re-interprets modal codes.
//!
//! Linear moves produce one segment; arcs are flattened into several under
//! the configured chord tolerance, every flattened segment mapping back to
//! the same statement. Non-motion statements contribute zero segments but
//! still occupy an (empty) slot in the index, preserving completeness.

use log::debug;

use camber_core::geometry::{Point3, Segment, Toolpath};
use camber_core::index::ProgramIndex;
use camber_core::program::{Movement, Program};

use crate::arc::flatten_arc;
use crate::config::GeometryConfig;

/// Geometry, index, and movements derived from one program.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildOutput {
    /// The flat drawable segment sequence.
    pub toolpath: Toolpath,
    /// Bidirectional statement ↔ segment map.
    pub index: ProgramIndex,
    /// One movement per body-motion statement, in program order.
    pub movements: Vec<Movement>,
}

impl BuildOutput {
    /// Flat vertex list (segment start/end pairs) for the rendering layer.
    pub fn vertices(&self) -> Vec<Point3> {
        let mut vertices = Vec::with_capacity(self.toolpath.len() * 2);
        for segment in self.toolpath.segments() {
            vertices.push(segment.start());
            vertices.push(segment.end());
        }
        vertices
    }
}

/// Builds geometry and index for a program.
///
/// Deterministic; O(statements + flattened vertices), no backtracking.
pub fn build(program: &Program, config: &GeometryConfig) -> BuildOutput {
    let mut toolpath = Toolpath::new();
    let mut index = ProgramIndex::new();
    let mut movements = Vec::new();
    let mut position = Point3::default();

    for statement in program.statements() {
        let statement_index = index.push_statement();

        let Some(kind) = statement.motion.filter(|_| statement.is_body_motion) else {
            position = statement.position;
            continue;
        };

        let from = position;
        let to = statement.position;
        movements.push(Movement {
            statement_index,
            from,
            to,
            kind,
        });

        if kind.is_arc() {
            let i = statement.word('I');
            let j = statement.word('J');
            let same_xy = from.x() == to.x() && from.y() == to.y();
            if (i.is_none() && j.is_none()) || same_xy {
                // No usable center: fall back to a straight segment.
                push_segment(&mut toolpath, &mut index, statement_index, from, to);
            } else {
                let center = (i.unwrap_or(0.0), j.unwrap_or(0.0));
                let clockwise = kind == camber_core::program::MotionKind::ArcCw;
                let mut prev = from;
                for vertex in flatten_arc(from, to, center, clockwise, config.arc_chord_tolerance())
                {
                    push_segment(&mut toolpath, &mut index, statement_index, prev, vertex);
                    prev = vertex;
                }
            }
        } else if from != to {
            push_segment(&mut toolpath, &mut index, statement_index, from, to);
        }

        position = to;
    }

    debug!(
        statements = program.len(),
        movements = movements.len(),
        segments = toolpath.len();
        "built geometry"
    );
    debug_assert!(index.is_consistent());

    BuildOutput {
        toolpath,
        index,
        movements,
    }
}

fn push_segment(
    toolpath: &mut Toolpath,
    index: &mut ProgramIndex,
    statement_index: usize,
    from: Point3,
    to: Point3,
) {
    let segment_index = toolpath.push(Segment::new(from, to));
    let linked = index.link_segment(statement_index);
    debug_assert_eq!(segment_index, linked);
}

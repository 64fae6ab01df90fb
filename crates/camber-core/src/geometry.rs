//! Basic 3D geometry types for toolpaths.
//!
//! Coordinates are absolute machine positions in millimeters. [`Point3`] and
//! [`Segment`] are small `Copy` values; [`Toolpath`] owns the flat, ordered
//! segment sequence that the viewer draws. Segment order is significant: the
//! position of a segment in [`Toolpath::segments`] is its *segment index*,
//! which [`crate::index::ProgramIndex`] maps back to statements.

use serde::{Deserialize, Serialize};

/// An absolute position in 3D machine space, in millimeters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    x: f64,
    y: f64,
    z: f64,
}

impl Point3 {
    /// Creates a new point with the specified coordinates.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Returns the x-coordinate of the point.
    pub fn x(self) -> f64 {
        self.x
    }

    /// Returns the y-coordinate of the point.
    pub fn y(self) -> f64 {
        self.y
    }

    /// Returns the z-coordinate of the point.
    pub fn z(self) -> f64 {
        self.z
    }

    /// Returns a copy of this point with a different x-coordinate.
    pub fn with_x(self, x: f64) -> Self {
        Self { x, ..self }
    }

    /// Returns a copy of this point with a different y-coordinate.
    pub fn with_y(self, y: f64) -> Self {
        Self { y, ..self }
    }

    /// Returns a copy of this point with a different z-coordinate.
    pub fn with_z(self, z: f64) -> Self {
        Self { z, ..self }
    }

    /// Adds another point component-wise, returning a new point.
    pub fn add_point(self, other: Point3) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }

    /// Subtracts another point component-wise, returning a new point.
    pub fn sub_point(self, other: Point3) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }

    /// Linearly interpolates between this point and `other`.
    ///
    /// `t = 0` yields `self`, `t = 1` yields `other`; values outside
    /// `[0, 1]` extrapolate.
    pub fn lerp(self, other: Point3, t: f64) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z: self.z + (other.z - self.z) * t,
        }
    }

    /// Euclidean distance to another point.
    pub fn distance(self, other: Point3) -> f64 {
        let d = self.sub_point(other);
        (d.x * d.x + d.y * d.y + d.z * d.z).sqrt()
    }

    /// Euclidean distance to another point, measured in the XY plane only.
    pub fn distance_xy(self, other: Point3) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// One drawable straight line in 3D.
///
/// Arcs never appear here; the geometry builder flattens them into several
/// segments before they reach a [`Toolpath`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    start: Point3,
    end: Point3,
}

impl Segment {
    /// Creates a segment from `start` to `end`.
    pub fn new(start: Point3, end: Point3) -> Self {
        Self { start, end }
    }

    /// Returns the start point of the segment.
    pub fn start(self) -> Point3 {
        self.start
    }

    /// Returns the end point of the segment.
    pub fn end(self) -> Point3 {
        self.end
    }

    /// Length of the segment.
    pub fn length(self) -> f64 {
        self.start.distance(self.end)
    }
}

/// Axis-aligned bounding box over a set of 3D points.
///
/// Empty until the first point is merged; an empty bounds reports `None`
/// extents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds3 {
    min: Option<Point3>,
    max: Option<Point3>,
}

impl Bounds3 {
    /// Creates an empty bounding box.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the minimum corner, or `None` if no point was merged yet.
    pub fn min(&self) -> Option<Point3> {
        self.min
    }

    /// Returns the maximum corner, or `None` if no point was merged yet.
    pub fn max(&self) -> Option<Point3> {
        self.max
    }

    /// Returns `true` if no point has been merged.
    pub fn is_empty(&self) -> bool {
        self.min.is_none()
    }

    /// Grows the bounds to include `point`.
    pub fn merge_point(&mut self, point: Point3) {
        match (self.min, self.max) {
            (Some(min), Some(max)) => {
                self.min = Some(Point3::new(
                    min.x.min(point.x),
                    min.y.min(point.y),
                    min.z.min(point.z),
                ));
                self.max = Some(Point3::new(
                    max.x.max(point.x),
                    max.y.max(point.y),
                    max.z.max(point.z),
                ));
            }
            _ => {
                self.min = Some(point);
                self.max = Some(point);
            }
        }
    }
}

/// The flat, ordered sequence of drawable segments for one program.
///
/// Indices into [`Toolpath::segments`] are the segment indices used by
/// [`crate::index::ProgramIndex`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Toolpath {
    segments: Vec<Segment>,
}

impl Toolpath {
    /// Creates an empty toolpath.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all segments in draw order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns `true` if the toolpath has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Appends a segment and returns its segment index.
    pub fn push(&mut self, segment: Segment) -> usize {
        let index = self.segments.len();
        self.segments.push(segment);
        index
    }

    /// Bounding box over every segment endpoint.
    pub fn bounds(&self) -> Bounds3 {
        let mut bounds = Bounds3::new();
        for segment in &self.segments {
            bounds.merge_point(segment.start());
            bounds.merge_point(segment.end());
        }
        bounds
    }
}

//! Alignment data types: reference points, 2D transforms, solved profiles.
//!
//! These are the units exchanged with project save/load and the alignment
//! wizard, so they carry serde derives. The numerical solving itself lives
//! in the `camber` crate; this module only defines the immutable results.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// Which coordinate space a reference point was captured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointSpace {
    /// Nominal coordinates from the design/program.
    Design,
    /// Measured coordinates on the physical machine.
    Machine,
}

/// A labeled 2D landmark in design or machine space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferencePoint {
    /// User-visible label (e.g. "fiducial A").
    pub label: String,
    /// Which space the coordinates live in.
    pub space: PointSpace,
    /// X coordinate in millimeters.
    pub x: f64,
    /// Y coordinate in millimeters.
    pub y: f64,
}

impl ReferencePoint {
    /// Creates a design-space reference point.
    pub fn design(label: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            label: label.into(),
            space: PointSpace::Design,
            x,
            y,
        }
    }

    /// Creates a machine-space reference point.
    pub fn machine(label: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            label: label.into(),
            space: PointSpace::Machine,
            x,
            y,
        }
    }
}

/// Solver mode for alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignMode {
    /// Rotation + translation; preserves shape exactly.
    #[default]
    Rigid,
    /// Rotation + translation + uniform scale.
    RigidScaled,
    /// General linear map + translation; may skew and scale non-uniformly.
    Affine,
}

/// A 2D affine map `(x, y) → A·(x, y) + t` with coefficients
/// `(a11, a12, a21, a22, tx, ty)`.
///
/// For rigid profiles the `a` submatrix is constrained to `s·R(θ)` form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform2 {
    pub a11: f64,
    pub a12: f64,
    pub a21: f64,
    pub a22: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Transform2 {
    /// The identity transform.
    pub fn identity() -> Self {
        Self {
            a11: 1.0,
            a12: 0.0,
            a21: 0.0,
            a22: 1.0,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// A pure translation.
    pub fn translation(tx: f64, ty: f64) -> Self {
        Self {
            tx,
            ty,
            ..Self::identity()
        }
    }

    /// A scaled rotation plus translation (`s·R(θ)` form).
    pub fn scaled_rotation(scale: f64, theta: f64, tx: f64, ty: f64) -> Self {
        let (sin, cos) = theta.sin_cos();
        Self {
            a11: scale * cos,
            a12: -scale * sin,
            a21: scale * sin,
            a22: scale * cos,
            tx,
            ty,
        }
    }

    /// Applies the transform to a 2D point.
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a11 * x + self.a12 * y + self.tx,
            self.a21 * x + self.a22 * y + self.ty,
        )
    }
}

impl Default for Transform2 {
    fn default() -> Self {
        Self::identity()
    }
}

/// Residual error statistics of a solved alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Residuals {
    /// Largest per-point error `‖T(design_i) − machine_i‖`, in mm.
    pub max_error: f64,
    /// Root-mean-square of the per-point errors, in mm.
    pub rms_error: f64,
}

/// Immutable result of an alignment solve.
///
/// Once created, a profile is never mutated; a re-solve produces a new
/// profile that supersedes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentProfile {
    /// User-visible profile name.
    pub name: String,
    /// Solver mode used.
    pub mode: AlignMode,
    /// The solved design → machine transform.
    pub transform: Transform2,
    /// Design-space input points, in correspondence order.
    pub design_points: Vec<ReferencePoint>,
    /// Machine-space input points, in correspondence order.
    pub machine_points: Vec<ReferencePoint>,
    /// Residual error statistics (advisory).
    pub residuals: Residuals,
    /// When the solve ran.
    pub created_at: SystemTime,
}

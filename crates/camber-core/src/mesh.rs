//! Probed surface height meshes.
//!
//! A [`HeightMesh`] is a rectangular grid of Z samples over XY, produced by
//! an external probing/import feature and consumed by the height-map
//! remapper through [`HeightMesh::interpolate`]. Before remapping, a mesh
//! must be normalized so its value at the chosen reference point is zero,
//! matching the program's own Z-zero convention; remapping against an
//! un-normalized mesh is a precondition violation, not silently corrected.

use thiserror::Error;

/// Errors constructing a [`HeightMesh`].
#[derive(Debug, Error, PartialEq)]
pub enum MeshError {
    #[error("mesh needs at least 2 grid lines per axis, got {x_lines}x{y_lines}")]
    TooFewLines { x_lines: usize, y_lines: usize },

    #[error("mesh grid lines must be strictly increasing on the {axis} axis")]
    UnsortedLines { axis: char },

    #[error("mesh Z samples must be {expected_rows} rows of {expected_cols}")]
    ShapeMismatch {
        expected_rows: usize,
        expected_cols: usize,
    },
}

/// A rectangular grid of Z samples over the XY plane.
///
/// `z[i][j]` is the sample at `(x_lines[i], y_lines[j])`. Grid lines are
/// strictly increasing and at least 2 per axis.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightMesh {
    x_lines: Vec<f64>,
    y_lines: Vec<f64>,
    z: Vec<Vec<f64>>,
    normalized: bool,
}

impl HeightMesh {
    /// Creates a mesh from raw samples, validating its shape.
    ///
    /// The result is *not* normalized; call [`HeightMesh::normalized_at`]
    /// before handing it to the remapper.
    pub fn new(x_lines: Vec<f64>, y_lines: Vec<f64>, z: Vec<Vec<f64>>) -> Result<Self, MeshError> {
        if x_lines.len() < 2 || y_lines.len() < 2 {
            return Err(MeshError::TooFewLines {
                x_lines: x_lines.len(),
                y_lines: y_lines.len(),
            });
        }
        if x_lines.windows(2).any(|w| w[1] <= w[0]) {
            return Err(MeshError::UnsortedLines { axis: 'X' });
        }
        if y_lines.windows(2).any(|w| w[1] <= w[0]) {
            return Err(MeshError::UnsortedLines { axis: 'Y' });
        }
        if z.len() != x_lines.len() || z.iter().any(|row| row.len() != y_lines.len()) {
            return Err(MeshError::ShapeMismatch {
                expected_rows: x_lines.len(),
                expected_cols: y_lines.len(),
            });
        }
        Ok(Self {
            x_lines,
            y_lines,
            z,
            normalized: false,
        })
    }

    /// X grid lines, strictly increasing.
    pub fn x_lines(&self) -> &[f64] {
        &self.x_lines
    }

    /// Y grid lines, strictly increasing.
    pub fn y_lines(&self) -> &[f64] {
        &self.y_lines
    }

    /// `true` once the mesh has been shifted to zero at its reference point.
    pub fn is_normalized(&self) -> bool {
        self.normalized
    }

    /// Returns `true` if `(x, y)` lies within the grid rectangle.
    pub fn contains_xy(&self, x: f64, y: f64) -> bool {
        let (x0, x1) = (self.x_lines[0], *self.x_lines.last().unwrap_or(&x));
        let (y0, y1) = (self.y_lines[0], *self.y_lines.last().unwrap_or(&y));
        x >= x0 && x <= x1 && y >= y0 && y <= y1
    }

    /// Bilinear interpolation of the surface height at `(x, y)`.
    ///
    /// Queries outside the grid clamp to the nearest edge cell, so the
    /// function is total.
    pub fn interpolate(&self, x: f64, y: f64) -> f64 {
        let (i, tx) = cell_param(&self.x_lines, x);
        let (j, ty) = cell_param(&self.y_lines, y);

        let z00 = self.z[i][j];
        let z10 = self.z[i + 1][j];
        let z01 = self.z[i][j + 1];
        let z11 = self.z[i + 1][j + 1];

        let z0 = z00 + (z10 - z00) * tx;
        let z1 = z01 + (z11 - z01) * tx;
        z0 + (z1 - z0) * ty
    }

    /// Returns a new mesh shifted so its value at `(x_ref, y_ref)` is zero.
    ///
    /// The reference point is the XY position where the program's Z-zero was
    /// touched off; after this call `interpolate(x_ref, y_ref)` is zero
    /// within numerical tolerance and [`HeightMesh::is_normalized`] is set.
    pub fn normalized_at(&self, x_ref: f64, y_ref: f64) -> Self {
        let offset = self.interpolate(x_ref, y_ref);
        let z = self
            .z
            .iter()
            .map(|row| row.iter().map(|v| v - offset).collect())
            .collect();
        Self {
            x_lines: self.x_lines.clone(),
            y_lines: self.y_lines.clone(),
            z,
            normalized: true,
        }
    }
}

/// Locates the cell containing `v` and the interpolation parameter inside it.
///
/// Out-of-range values clamp to the first/last cell with the parameter
/// clamped to `[0, 1]`.
fn cell_param(lines: &[f64], v: f64) -> (usize, f64) {
    let last_cell = lines.len() - 2;
    let i = match lines.partition_point(|&line| line <= v) {
        0 => 0,
        p => (p - 1).min(last_cell),
    };
    let span = lines[i + 1] - lines[i];
    let t = ((v - lines[i]) / span).clamp(0.0, 1.0);
    (i, t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    fn flat_mesh(height: f64) -> HeightMesh {
        HeightMesh::new(
            vec![0.0, 10.0, 20.0],
            vec![0.0, 10.0],
            vec![
                vec![height, height],
                vec![height, height],
                vec![height, height],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_new_rejects_too_few_lines() {
        let err = HeightMesh::new(vec![0.0], vec![0.0, 1.0], vec![vec![0.0, 0.0]]).unwrap_err();
        assert_eq!(
            err,
            MeshError::TooFewLines {
                x_lines: 1,
                y_lines: 2
            }
        );
    }

    #[test]
    fn test_new_rejects_unsorted_lines() {
        let err = HeightMesh::new(
            vec![0.0, -1.0],
            vec![0.0, 1.0],
            vec![vec![0.0, 0.0], vec![0.0, 0.0]],
        )
        .unwrap_err();
        assert_eq!(err, MeshError::UnsortedLines { axis: 'X' });
    }

    #[test]
    fn test_new_rejects_shape_mismatch() {
        let err = HeightMesh::new(vec![0.0, 1.0], vec![0.0, 1.0], vec![vec![0.0, 0.0]]).unwrap_err();
        assert_eq!(
            err,
            MeshError::ShapeMismatch {
                expected_rows: 2,
                expected_cols: 2
            }
        );
    }

    #[test]
    fn test_interpolate_at_grid_points() {
        let mesh = HeightMesh::new(
            vec![0.0, 10.0],
            vec![0.0, 10.0],
            vec![vec![0.0, 1.0], vec![2.0, 3.0]],
        )
        .unwrap();
        assert_approx_eq!(f64, mesh.interpolate(0.0, 0.0), 0.0);
        assert_approx_eq!(f64, mesh.interpolate(10.0, 0.0), 2.0);
        assert_approx_eq!(f64, mesh.interpolate(0.0, 10.0), 1.0);
        assert_approx_eq!(f64, mesh.interpolate(10.0, 10.0), 3.0);
    }

    #[test]
    fn test_interpolate_cell_center() {
        let mesh = HeightMesh::new(
            vec![0.0, 10.0],
            vec![0.0, 10.0],
            vec![vec![0.0, 1.0], vec![2.0, 3.0]],
        )
        .unwrap();
        assert_approx_eq!(f64, mesh.interpolate(5.0, 5.0), 1.5);
    }

    #[test]
    fn test_interpolate_clamps_outside() {
        let mesh = flat_mesh(0.25);
        assert_approx_eq!(f64, mesh.interpolate(-100.0, -100.0), 0.25);
        assert_approx_eq!(f64, mesh.interpolate(100.0, 100.0), 0.25);
    }

    #[test]
    fn test_normalized_reference_is_zero() {
        let mesh = HeightMesh::new(
            vec![0.0, 10.0],
            vec![0.0, 10.0],
            vec![vec![0.1, 0.2], vec![0.3, 0.4]],
        )
        .unwrap();
        assert!(!mesh.is_normalized());

        let norm = mesh.normalized_at(3.0, 7.0);
        assert!(norm.is_normalized());
        assert_approx_eq!(f64, norm.interpolate(3.0, 7.0), 0.0, epsilon = 1e-12);
        // Relative shape is preserved.
        let delta = mesh.interpolate(9.0, 1.0) - mesh.interpolate(3.0, 7.0);
        assert_approx_eq!(f64, norm.interpolate(9.0, 1.0), delta, epsilon = 1e-12);
    }

    #[test]
    fn test_contains_xy() {
        let mesh = flat_mesh(0.0);
        assert!(mesh.contains_xy(0.0, 0.0));
        assert!(mesh.contains_xy(20.0, 10.0));
        assert!(!mesh.contains_xy(20.1, 5.0));
        assert!(!mesh.contains_xy(5.0, -0.1));
    }
}

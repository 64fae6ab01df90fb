//! TOML input file formats for alignment points and height meshes.
//!
//! The `align` subcommand reads paired reference points and the `remap`
//! subcommand reads a probed mesh, both as small TOML documents so they can
//! be produced by hand or by an external probing script.
//!
//! Points file:
//!
//! ```toml
//! [[point]]
//! label = "fiducial A"
//! design = [0.0, 0.0]
//! machine = [5.2, 4.9]
//! ```
//!
//! Mesh file:
//!
//! ```toml
//! x_lines = [0.0, 10.0, 20.0]
//! y_lines = [0.0, 10.0]
//! z = [[0.00, 0.01], [0.04, 0.05], [0.09, 0.08]]
//! reference = [0.0, 0.0]
//! ```

use serde::Deserialize;

use camber::ReferencePoint;
use camber::mesh::{HeightMesh, MeshError};

/// Paired reference points file.
#[derive(Debug, Deserialize)]
pub struct PointsFile {
    /// Point pairs in correspondence order.
    #[serde(rename = "point")]
    pub points: Vec<PointEntry>,
}

/// One design/machine pair.
#[derive(Debug, Deserialize)]
pub struct PointEntry {
    pub label: String,
    /// Nominal `[x, y]` in the program's coordinates.
    pub design: [f64; 2],
    /// Measured `[x, y]` on the machine.
    pub machine: [f64; 2],
}

impl PointsFile {
    /// Splits the pairs into the two ordered lists the solver wants.
    pub fn into_point_lists(self) -> (Vec<ReferencePoint>, Vec<ReferencePoint>) {
        let design = self
            .points
            .iter()
            .map(|p| ReferencePoint::design(p.label.clone(), p.design[0], p.design[1]))
            .collect();
        let machine = self
            .points
            .iter()
            .map(|p| ReferencePoint::machine(p.label.clone(), p.machine[0], p.machine[1]))
            .collect();
        (design, machine)
    }
}

/// Probed height mesh file.
#[derive(Debug, Deserialize)]
pub struct MeshFile {
    pub x_lines: Vec<f64>,
    pub y_lines: Vec<f64>,
    /// Samples as `z[i][j]` at `(x_lines[i], y_lines[j])`.
    pub z: Vec<Vec<f64>>,
    /// `[x, y]` where the program's Z zero was touched off.
    pub reference: [f64; 2],
}

impl MeshFile {
    /// Validates the grid and normalizes it at the reference point.
    pub fn into_mesh(self) -> Result<HeightMesh, MeshError> {
        let mesh = HeightMesh::new(self.x_lines, self.y_lines, self.z)?;
        Ok(mesh.normalized_at(self.reference[0], self.reference[1]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camber::PointSpace;

    #[test]
    fn test_points_file_parses() {
        let file: PointsFile = toml::from_str(
            r#"
            [[point]]
            label = "a"
            design = [0.0, 0.0]
            machine = [5.0, 5.0]

            [[point]]
            label = "b"
            design = [10.0, 0.0]
            machine = [15.0, 5.0]
            "#,
        )
        .unwrap();
        let (design, machine) = file.into_point_lists();
        assert_eq!(design.len(), 2);
        assert_eq!(design[0].space, PointSpace::Design);
        assert_eq!(machine[1].x, 15.0);
        assert_eq!(machine[1].label, "b");
    }

    #[test]
    fn test_mesh_file_normalizes_at_reference() {
        let file: MeshFile = toml::from_str(
            r#"
            x_lines = [0.0, 10.0]
            y_lines = [0.0, 10.0]
            z = [[0.1, 0.1], [0.3, 0.3]]
            reference = [0.0, 0.0]
            "#,
        )
        .unwrap();
        let mesh = file.into_mesh().unwrap();
        assert!(mesh.is_normalized());
        assert!(mesh.interpolate(0.0, 0.0).abs() < 1e-12);
    }

    #[test]
    fn test_mesh_file_rejects_bad_grid() {
        let file: MeshFile = toml::from_str(
            r#"
            x_lines = [0.0]
            y_lines = [0.0, 10.0]
            z = [[0.0, 0.0]]
            reference = [0.0, 0.0]
            "#,
        )
        .unwrap();
        assert!(file.into_mesh().is_err());
    }
}

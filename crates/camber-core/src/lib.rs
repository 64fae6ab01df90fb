//! Camber Core Types and Definitions
//!
//! This crate provides the foundational types for the Camber G-code
//! pipeline. It includes:
//!
//! - **Geometry**: 3D points, segments, and toolpaths ([`geometry`] module)
//! - **Program**: parsed statements, movements, and metadata ([`program`] module)
//! - **Index**: the bidirectional statement ↔ segment map ([`index::ProgramIndex`])
//! - **Diagnostics**: per-line error/warning records ([`diagnostics`] module)
//! - **Meshes**: probed surface height grids ([`mesh::HeightMesh`])
//! - **Alignment**: reference points, transforms, profiles ([`align`] module)
//!
//! Everything here is an immutable value type: parsing and transforming
//! always produce fresh outputs and never mutate shared state.

pub mod align;
pub mod diagnostics;
pub mod geometry;
pub mod index;
pub mod mesh;
pub mod program;

//! Error types for Camber operations.
//!
//! [`CamberError`] is the single error surface of the pipeline facade,
//! wrapping the specific failures from alignment solving, height remapping,
//! and mesh construction. Parse problems are deliberately *not* here: the
//! parser reports them as per-line diagnostics on the program instead of
//! failing.

use std::io;

use thiserror::Error;

use camber_core::mesh::MeshError;

use crate::align::AlignError;
use crate::height::RemapError;

/// The main error type for Camber operations.
#[derive(Debug, Error)]
pub enum CamberError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("alignment error: {0}")]
    Align(#[from] AlignError),

    #[error("height remap error: {0}")]
    Remap(#[from] RemapError),

    #[error("mesh error: {0}")]
    Mesh(#[from] MeshError),

    #[error("configuration error: {0}")]
    Config(String),
}

//! Camber - G-code interpretation and transforms for CNC milling.
//!
//! Parsing, geometry building, alignment, and height-map remapping for the
//! millimeter G-code dialect used by small PCB mills. Programs are parsed
//! into an immutable statement model with per-line diagnostics, projected
//! into drawable toolpath geometry with a statement ↔ segment index, and
//! rewritten by transforms that always reparse their own output.

pub mod align;
pub mod builder;
pub mod config;
pub mod height;
pub mod outline;

mod arc;
mod error;

pub use camber_core::align::{
    AlignMode, AlignmentProfile, PointSpace, ReferencePoint, Residuals, Transform2,
};
pub use camber_core::{diagnostics, geometry, index, mesh, program};
pub use camber_parser::{ParserConfig, TravelLimits};

pub use error::CamberError;

use log::{debug, info};

use camber_core::geometry::{Point3, Toolpath};
use camber_core::index::ProgramIndex;
use camber_core::mesh::HeightMesh;
use camber_core::program::{Movement, Program};

use config::AppConfig;

/// A parsed program together with its derived geometry.
///
/// Everything here is produced by one pass and stays mutually consistent:
/// the index maps between the program's statements and the toolpath's
/// segments, and movements are in statement order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOutcome {
    /// The parsed statement model.
    pub program: Program,
    /// Flattened drawable geometry.
    pub toolpath: Toolpath,
    /// Bidirectional statement ↔ segment map.
    pub index: ProgramIndex,
    /// One derived movement per body-motion statement.
    pub movements: Vec<Movement>,
}

impl ParseOutcome {
    /// Flat vertex list for the rendering layer.
    pub fn vertices(&self) -> Vec<Point3> {
        let mut vertices = Vec::with_capacity(self.toolpath.len() * 2);
        for segment in self.toolpath.segments() {
            vertices.push(segment.start());
            vertices.push(segment.end());
        }
        vertices
    }
}

/// Facade over the parse / build / transform pipeline.
///
/// # Examples
///
/// ```rust
/// use camber::{Pipeline, config::AppConfig};
///
/// let pipeline = Pipeline::new(AppConfig::default());
/// let outcome = pipeline.parse("G21\nG0 X0 Y0 Z2\nG1 Z-0.1 F60\nG1 X10 Y10");
///
/// assert!(outcome.index.is_consistent());
/// assert_eq!(outcome.movements.len(), 3);
/// ```
#[derive(Default)]
pub struct Pipeline {
    config: AppConfig,
}

impl Pipeline {
    /// Creates a pipeline with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parses source text and builds its geometry and index.
    ///
    /// Never fails; malformed input surfaces as diagnostics on the program.
    pub fn parse(&self, source: &str) -> ParseOutcome {
        info!("parsing program");
        let program = camber_parser::parse_with_config(source, self.config.parser());
        self.build_outcome(program)
    }

    /// Solves an alignment from paired design/machine reference points.
    pub fn solve_alignment(
        &self,
        name: &str,
        mode: AlignMode,
        design: &[ReferencePoint],
        machine: &[ReferencePoint],
    ) -> Result<AlignmentProfile, CamberError> {
        let profile = align::solve(name, mode, design, machine, self.config.transform())?;
        Ok(profile)
    }

    /// Applies a solved alignment transform to a program.
    ///
    /// Returns a new outcome built from the rewritten source; the input
    /// program is untouched.
    pub fn apply_alignment(&self, program: &Program, transform: &Transform2) -> ParseOutcome {
        info!("applying alignment transform");
        let rewritten = align::apply(program, transform, self.config.geometry());
        self.reparse(&rewritten)
    }

    /// Remaps a program's cutting depth against a normalized height mesh.
    pub fn remap_heights(
        &self,
        program: &Program,
        mesh: &HeightMesh,
    ) -> Result<ParseOutcome, CamberError> {
        info!("remapping heights");
        let rewritten = height::remap(
            program,
            mesh,
            self.config.geometry(),
            self.config.transform(),
        )?;
        Ok(self.reparse(&rewritten))
    }

    /// Re-runs a transformed program through the configured parser so limit
    /// diagnostics reflect the rewritten coordinates.
    fn reparse(&self, program: &Program) -> ParseOutcome {
        let program = camber_parser::parse_with_config(&program.to_source(), self.config.parser());
        self.build_outcome(program)
    }

    fn build_outcome(&self, program: Program) -> ParseOutcome {
        let built = builder::build(&program, self.config.geometry());
        debug!(
            statements = program.len(),
            segments = built.toolpath.len();
            "program ready"
        );
        ParseOutcome {
            program,
            toolpath: built.toolpath,
            index: built.index,
            movements: built.movements,
        }
    }
}

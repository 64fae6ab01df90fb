//! Configuration for the Camber pipeline.
//!
//! Every tunable tolerance is surfaced here with a documented default
//! rather than hardcoded: the arc chord deviation used
//! when flattening, the parameter-space epsilon used to deduplicate
//! grid-crossing points, and the residual threshold above which an
//! alignment solve is worth warning about. Everything implements
//! [`serde::Deserialize`] so the CLI can load it from TOML.

use serde::Deserialize;

use camber_parser::ParserConfig;

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Geometry building section.
    #[serde(default)]
    geometry: GeometryConfig,

    /// Transform (alignment / height-map) section.
    #[serde(default)]
    transform: TransformConfig,

    /// Parser limits section.
    #[serde(default)]
    parser: ParserConfig,
}

impl AppConfig {
    /// Creates a config from its sections.
    pub fn new(geometry: GeometryConfig, transform: TransformConfig, parser: ParserConfig) -> Self {
        Self {
            geometry,
            transform,
            parser,
        }
    }

    /// Returns the geometry configuration.
    pub fn geometry(&self) -> &GeometryConfig {
        &self.geometry
    }

    /// Returns the transform configuration.
    pub fn transform(&self) -> &TransformConfig {
        &self.transform
    }

    /// Returns the parser configuration.
    pub fn parser(&self) -> &ParserConfig {
        &self.parser
    }
}

/// Geometry building options.
#[derive(Debug, Clone, Deserialize)]
pub struct GeometryConfig {
    /// Maximum chord deviation when flattening arcs, in mm.
    ///
    /// The default of 0.01 mm is visually indistinguishable at PCB scale.
    #[serde(default = "default_arc_chord_tolerance")]
    arc_chord_tolerance: f64,
}

impl GeometryConfig {
    /// Maximum chord deviation for arc flattening, in mm.
    pub fn arc_chord_tolerance(&self) -> f64 {
        self.arc_chord_tolerance
    }
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            arc_chord_tolerance: default_arc_chord_tolerance(),
        }
    }
}

fn default_arc_chord_tolerance() -> f64 {
    0.01
}

/// How arcs are handled when a program's XY is rewritten.
///
/// Camber supports exactly one policy: arcs are flattened to line statements
/// before the transform and never re-fit afterwards. Preserving true arcs
/// under affine maps is unsound (an ellipse is not an arc), and mixing
/// strategies between alignment and height remapping would silently lose
/// shape fidelity, so no `Preserve` variant exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArcPolicy {
    /// Flatten arcs under the chord tolerance, then transform the vertices.
    #[default]
    FlattenBeforeTransform,
}

/// Alignment and height-map transform options.
#[derive(Debug, Clone, Deserialize)]
pub struct TransformConfig {
    /// Arc handling policy for XY-rewriting transforms.
    #[serde(default)]
    arc_policy: ArcPolicy,

    /// Epsilon for deduplicating grid-crossing `t` values, in parameter
    /// space (`t ∈ [0, 1]`).
    ///
    /// Two crossings closer than this along a segment collapse into one
    /// output vertex; naive exact comparison would emit duplicate
    /// near-identical points.
    #[serde(default = "default_t_epsilon")]
    t_epsilon: f64,

    /// Residual threshold above which a solved alignment is logged as a
    /// warning, in mm. Advisory only; the solve still succeeds.
    #[serde(default = "default_residual_warn_mm")]
    residual_warn_mm: f64,
}

impl TransformConfig {
    /// Arc handling policy.
    pub fn arc_policy(&self) -> ArcPolicy {
        self.arc_policy
    }

    /// Grid-crossing deduplication epsilon.
    pub fn t_epsilon(&self) -> f64 {
        self.t_epsilon
    }

    /// Residual warning threshold in mm.
    pub fn residual_warn_mm(&self) -> f64 {
        self.residual_warn_mm
    }
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            arc_policy: ArcPolicy::default(),
            t_epsilon: default_t_epsilon(),
            residual_warn_mm: default_residual_warn_mm(),
        }
    }
}

fn default_t_epsilon() -> f64 {
    1e-6
}

fn default_residual_warn_mm() -> f64 {
    0.03
}

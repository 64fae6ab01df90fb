//! CLI logic for the Camber G-code toolkit.
//!
//! Four subcommands cover the offline workflow: `check` parses a program
//! and reports diagnostics, `stats` summarizes it, `align` solves and
//! applies an XY alignment from probed reference points, and `remap` bends
//! cutting depth to a probed height mesh.

pub mod report;

mod args;
mod config;
mod inputs;

pub use args::{Args, Command, ModeArg};

use std::{fs, io};

use log::info;
use thiserror::Error;

use camber::{CamberError, Pipeline, outline};

/// Errors surfaced to the CLI user.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Camber(#[from] CamberError),

    #[error("failed to parse {path}: {message}")]
    Input { path: String, message: String },

    #[error("{count} error diagnostic(s) in {path}")]
    ProgramErrors { path: String, count: usize },
}

/// Run the Camber CLI application
///
/// # Errors
///
/// Returns `CliError` for file I/O errors, malformed input files,
/// configuration errors, alignment/remap failures, and programs whose
/// diagnostics contain errors (`check` only).
pub fn run(args: &Args) -> Result<(), CliError> {
    let app_config = config::load_config(args.config.as_ref())?;
    let pipeline = Pipeline::new(app_config);

    match &args.command {
        Command::Check { input } => check(&pipeline, input),
        Command::Stats { input } => stats(&pipeline, input),
        Command::Align {
            input,
            points,
            output,
            mode,
        } => align(&pipeline, input, points, output, *mode),
        Command::Remap {
            input,
            mesh,
            output,
        } => remap(&pipeline, input, mesh, output),
    }
}

fn check(pipeline: &Pipeline, input: &str) -> Result<(), CliError> {
    let source = fs::read_to_string(input)?;
    let outcome = pipeline.parse(&source);

    let mut errors = 0usize;
    let mut warnings = 0usize;
    for diag in outcome.program.diagnostics() {
        if diag.severity().is_error() {
            errors += 1;
        } else {
            warnings += 1;
        }
        print!(
            "{}",
            report::render(&report::DiagnosticAdapter::new(diag, &source))
        );
    }
    println!(
        "{input}: {} statement(s), {} motion(s), {errors} error(s), {warnings} warning(s)",
        outcome.program.len(),
        outcome.movements.len()
    );

    if errors > 0 {
        return Err(CliError::ProgramErrors {
            path: input.to_string(),
            count: errors,
        });
    }
    Ok(())
}

fn stats(pipeline: &Pipeline, input: &str) -> Result<(), CliError> {
    let source = fs::read_to_string(input)?;
    let outcome = pipeline.parse(&source);
    let meta = outcome.program.metadata();
    let regions = outline::outline(&outcome.program);

    println!("lines:    {}", meta.line_count());
    println!("motions:  {}", meta.motion_count());
    println!("segments: {}", outcome.toolpath.len());
    if let (Some(min), Some(max)) = (meta.bounds().min(), meta.bounds().max()) {
        println!(
            "bounds:   X {:.3}..{:.3}  Y {:.3}..{:.3}  Z {:.3}..{:.3}",
            min.x(),
            max.x(),
            min.y(),
            max.y(),
            min.z(),
            max.z()
        );
    }
    let wcs: Vec<String> = meta.wcs_seen().map(|w| w.to_string()).collect();
    if !wcs.is_empty() {
        println!("wcs:      {}", wcs.join(", "));
    }
    println!(
        "regions:  header {} / body {} / footer {}",
        regions.header().len(),
        regions.body().len(),
        regions.footer().len()
    );
    Ok(())
}

fn align(
    pipeline: &Pipeline,
    input: &str,
    points_path: &str,
    output: &str,
    mode: ModeArg,
) -> Result<(), CliError> {
    let source = fs::read_to_string(input)?;
    let points_text = fs::read_to_string(points_path)?;
    let points: inputs::PointsFile =
        toml::from_str(&points_text).map_err(|e| CliError::Input {
            path: points_path.to_string(),
            message: e.to_string(),
        })?;

    let (design, machine) = points.into_point_lists();
    let profile = pipeline.solve_alignment(input, mode.into(), &design, &machine)?;
    println!(
        "solved {:?} alignment from {} point pair(s)",
        profile.mode,
        profile.design_points.len()
    );
    println!(
        "residuals: max {:.4} mm, rms {:.4} mm",
        profile.residuals.max_error, profile.residuals.rms_error
    );

    let outcome = pipeline.parse(&source);
    let aligned = pipeline.apply_alignment(&outcome.program, &profile.transform);
    fs::write(output, aligned.program.to_source())?;
    info!(output_file = output; "aligned program written");
    Ok(())
}

fn remap(pipeline: &Pipeline, input: &str, mesh_path: &str, output: &str) -> Result<(), CliError> {
    let source = fs::read_to_string(input)?;
    let mesh_text = fs::read_to_string(mesh_path)?;
    let mesh_file: inputs::MeshFile = toml::from_str(&mesh_text).map_err(|e| CliError::Input {
        path: mesh_path.to_string(),
        message: e.to_string(),
    })?;
    let mesh = mesh_file.into_mesh().map_err(CamberError::from)?;

    let outcome = pipeline.parse(&source);
    let remapped = pipeline.remap_heights(&outcome.program, &mesh)?;
    fs::write(output, remapped.program.to_source())?;
    info!(output_file = output; "remapped program written");
    Ok(())
}

//! Command-line argument definitions for the Camber CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. A subcommand selects the operation; global flags control
//! configuration file selection and logging verbosity.

use clap::{Parser, Subcommand, ValueEnum};

use camber::AlignMode;

/// Command-line arguments for the Camber G-code toolkit
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
}

/// The operation to run.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse a program and report its diagnostics
    Check {
        /// Path to the input G-code file
        input: String,
    },

    /// Print program statistics: bounds, counts, regions
    Stats {
        /// Path to the input G-code file
        input: String,
    },

    /// Solve an alignment from reference points and apply it
    Align {
        /// Path to the input G-code file
        input: String,

        /// Paired reference points file (TOML)
        #[arg(short, long)]
        points: String,

        /// Path to the transformed output file
        #[arg(short, long, default_value = "aligned.gcode")]
        output: String,

        /// Solver mode
        #[arg(short, long, value_enum, default_value = "rigid")]
        mode: ModeArg,
    },

    /// Remap cutting depth against a probed height mesh
    Remap {
        /// Path to the input G-code file
        input: String,

        /// Height mesh file (TOML)
        #[arg(short, long)]
        mesh: String,

        /// Path to the remapped output file
        #[arg(short, long, default_value = "remapped.gcode")]
        output: String,
    },
}

/// Alignment solver mode as a command-line value.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    /// Rotation + translation
    Rigid,
    /// Rotation + translation + uniform scale
    RigidScaled,
    /// General affine map
    Affine,
}

impl From<ModeArg> for AlignMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Rigid => AlignMode::Rigid,
            ModeArg::RigidScaled => AlignMode::RigidScaled,
            ModeArg::Affine => AlignMode::Affine,
        }
    }
}

//! Parser for CNC G-code programs.
//!
//! Turns raw `.nc` text into a [`camber_core::program::Program`]: one
//! resolved statement per source line, with modal state (active motion mode,
//! units, work-coordinate selection, last-known position, feed, spindle)
//! carried forward explicitly. Malformed input never aborts a parse; every
//! problem is attached to its statement as a diagnostic.

pub mod codes;
pub mod config;
pub mod lexer;
pub mod modal;

mod parser;

#[cfg(test)]
mod parser_tests;

pub use config::{ParserConfig, TravelLimits};
pub use parser::{parse, parse_with_config};

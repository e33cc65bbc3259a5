//! Command-line interface for batchprover
//!
//! ## Module Structure
//!
//! - `args`: CLI argument definitions (clap)
//! - `run`: entry point, configuration, and workflow dispatch
//! - `reporter`: operator output on stdout

pub mod args;
mod reporter;
mod run;

pub use args::{Cli, build_cli};
pub use reporter::ConsoleReporter;
pub use run::{run, run_with_args};

//! Command line interface for starcheat_release.
//!
//! Parses arguments, builds the immutable configuration and CI snapshot, and
//! dispatches to the pipeline.

mod args;
mod commands;
mod output;

pub use args::Args;
pub use commands::execute_command;
pub use output::OutputManager;

use crate::error::Result;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    execute_command(args).await
}

//! Command line interface for nxtscape_packager.
//!
//! Parses arguments, resolves the build context and dispatches to the
//! packaging, signing and release commands.

mod args;
pub mod commands;
mod output;

pub use args::{Args, Command, RuntimeConfig};
pub use commands::execute_command;
pub use output::OutputManager;

use crate::error::Result;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    execute_command(args).await
}

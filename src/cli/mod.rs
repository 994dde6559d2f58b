//! CLI module for examhall
//!
//! Provides the command-line interface:
//! - serve: boot the engines and enter the HTTP serving loop

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::run_command;
pub use errors::{CliError, CliResult};

/// Parse arguments and dispatch.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

//! CLI argument definitions using clap
//!
//! Commands:
//! - examhall serve --port <port> [--audit-dir <path>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// examhall - exam scheduling and promotion-audit core
#[derive(Parser, Debug)]
#[command(name = "examhall")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the examhall HTTP server
    Serve {
        /// Port to bind to
        #[arg(long, default_value_t = 7400)]
        port: u16,

        /// Directory for append-only audit files; audit stays in memory
        /// only when omitted
        #[arg(long)]
        audit_dir: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

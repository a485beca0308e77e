//! Command-line interface definition for joinery.
//!
//! # Command Structure
//!
//! - `joinery resolve` - resolve the project config and print it
//! - `joinery join` - show which bundles a set of files joins

mod commands;

use clap::Parser;

pub use commands::{Command, JoinArgs, ProjectArgs, ResolveArgs};

/// joinery - asset build configuration resolver
#[derive(Parser, Debug)]
#[command(
    name = "joinery",
    version,
    about = "Resolve asset build configuration",
    long_about = "joinery loads a project's build configuration, applies defaults and\n\
                  environment overrides, and compiles the rules that decide which source\n\
                  files join which output bundle."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

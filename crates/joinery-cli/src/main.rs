//! joinery CLI - resolve asset build configuration from the command line.
//!
//! Parses arguments, sets up logging and dispatches to a command.

use clap::Parser;
use joinery_cli::{cli, commands, error, logger, ui};
use miette::Result;

fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    let result = match args.command {
        cli::Command::Resolve(resolve_args) => commands::resolve_execute(resolve_args),
        cli::Command::Join(join_args) => commands::join_execute(join_args),
    };

    result.map_err(error::cli_error_to_miette)
}

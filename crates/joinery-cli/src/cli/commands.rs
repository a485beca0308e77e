use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Available joinery subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve the project configuration
    ///
    /// Loads the config file, fills defaults, applies the requested
    /// environment overrides and prints a summary or the full JSON view.
    Resolve(ResolveArgs),

    /// Show which output bundles files join
    ///
    /// Resolves the configuration, then prints, for each path, every
    /// destination of the given file type whose rule accepts it.
    Join(JoinArgs),
}

/// Where the project lives and which environments to resolve for
#[derive(Args, Debug, Clone, Default)]
pub struct ProjectArgs {
    /// Config file to load instead of discovering one
    ///
    /// Falls back to JOINERY_CONFIG, then to joinery-config.toml,
    /// joinery-config.json, config.toml, config.json and package.json.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Project root directory (defaults to the current directory)
    #[arg(short, long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Environment overrides to apply, in order
    ///
    /// Examples:
    ///   joinery resolve -e production
    ///   joinery resolve -e production -e ci
    #[arg(short, long = "env", value_name = "ENV")]
    pub env: Vec<String>,
}

/// Arguments for the resolve command
#[derive(Args, Debug)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Print the resolved config as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the join command
#[derive(Args, Debug)]
pub struct JoinArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// File type as named under `files` (e.g. javascripts)
    #[arg(value_name = "TYPE")]
    pub file_type: String,

    /// Source paths to check
    #[arg(required = true, value_name = "PATH")]
    pub paths: Vec<String>,
}

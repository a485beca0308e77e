//! `joinery resolve`

use std::io::{self, Write};

use joinery_config::ResolvedConfig;

use crate::cli::ResolveArgs;
use crate::commands::utils::load_project;
use crate::error::Result;
use crate::ui;

/// Execute the resolve command.
pub fn execute(args: ResolveArgs) -> Result<()> {
    let config = load_project(&args.project)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.json {
        serde_json::to_writer_pretty(&mut out, &config.to_json())?;
        writeln!(out)?;
    } else {
        write_summary(&mut out, &config)?;
        ui::success("Resolved config");
    }
    Ok(())
}

/// Human-readable overview of a resolved config.
pub fn write_summary(out: &mut impl Write, config: &ResolvedConfig) -> io::Result<()> {
    let env = if config.env().is_empty() {
        "(none)".to_string()
    } else {
        config.env().join(", ")
    };
    writeln!(out, "environments: {env}")?;

    let paths = config.paths();
    writeln!(out, "public: {}", paths.public)?;
    writeln!(out, "watched: {}", paths.watched.join(", "))?;
    writeln!(
        out,
        "optimize: {}, source maps: {}",
        config.optimize(),
        config.source_maps()
    )?;

    let server = config.server();
    match &server.path {
        Some(path) => writeln!(out, "server: {path} on port {}", server.port)?,
        None => writeln!(out, "server: built-in on port {}", server.port)?,
    }

    for (file_type, join) in config.join().types() {
        writeln!(out, "{file_type}:")?;
        for (destination, _) in join.destinations() {
            writeln!(out, "  -> {destination}")?;
        }
        if !join.plugin_helpers().is_empty() {
            writeln!(out, "  plugin helpers: {}", join.plugin_helpers().join(", "))?;
        }
    }

    let packages = config.package_info();
    writeln!(
        out,
        "packages: {} npm, {} bower, {} component",
        packages.npm.components.len(),
        packages.bower.components.len(),
        packages.component.components.len()
    )
}

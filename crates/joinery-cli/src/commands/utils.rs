//! Loading the project config for a command.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use joinery_config::{ConfigBuilder, ConfigDiscovery, ResolveOptions, ResolvedConfig};
use tracing::debug;

use crate::cli::ProjectArgs;
use crate::error::{CliError, Result};
use crate::settings::Settings;
use crate::ui;

/// Discovers, loads and resolves the project config. Deprecation warnings
/// are printed as they are found.
pub(crate) fn load_project(project: &ProjectArgs) -> Result<Arc<ResolvedConfig>> {
    let settings = Settings::load()?;
    load_project_with(project, &settings)
}

pub(crate) fn load_project_with(
    project: &ProjectArgs,
    settings: &Settings,
) -> Result<Arc<ResolvedConfig>> {
    let root = project_root(project.root.as_deref())?;
    let explicit = project.config.as_deref().or(settings.config.as_deref());

    let loaded = ConfigDiscovery::new(&root).load(explicit)?;
    debug!(path = %loaded.path.display(), "loaded config");

    let options = ResolveOptions::new()
        .env(project.env.iter().cloned())
        .process_env(settings.env.clone())
        .base_dir(&root);

    let config_path = loaded.config_name(&root);
    let config = ConfigBuilder::new(loaded.tree)
        .config_path(config_path)
        .options(options)
        .warnings(|message: &str| ui::warning(message))
        .build()?;
    Ok(config)
}

fn project_root(root: Option<&Path>) -> Result<PathBuf> {
    match root {
        Some(root) if root.is_dir() => Ok(root.to_path_buf()),
        Some(root) => Err(CliError::RootNotFound(root.to_path_buf())),
        None => Ok(std::env::current_dir()?),
    }
}

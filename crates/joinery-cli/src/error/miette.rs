//! Miette diagnostic conversion for CLI errors.

use ::miette::Report;
use joinery_config::ConfigError;

use crate::error::CliError;

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Config(e) => config_error_to_miette(e),
        CliError::UnknownFileType { file_type, known } => ::miette::miette!(
            "Unknown file type '{}'\n\nHint: the config defines: {}",
            file_type,
            known
        ),
        CliError::RootNotFound(root) => ::miette::miette!(
            "Project root not found: {}\n\nHint: pass an existing directory to --root",
            root.display()
        ),
        _ => ::miette::miette!("{}", err),
    }
}

/// Convert a library ConfigError to a miette Report
pub fn config_error_to_miette(err: ConfigError) -> Report {
    match err {
        ConfigError::NotFound { root } => ::miette::miette!(
            "No config found in {}\n\nHint: create joinery-config.toml or pass --config <path>",
            root.display()
        ),
        ConfigError::MissingFiles => ::miette::miette!(
            "{}\n\nHint: add a [files] table describing how sources join bundles",
            err
        ),
        ConfigError::Parse { .. } => {
            ::miette::miette!("{}\n\nHint: check the config file syntax", err)
        }
        _ => ::miette::miette!("Configuration error: {}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn not_found_suggests_creating_config() {
        let report = cli_error_to_miette(CliError::Config(ConfigError::NotFound {
            root: PathBuf::from("site"),
        }));
        let text = report.to_string();
        assert!(text.contains("site"));
        assert!(text.contains("joinery-config.toml"));
    }

    #[test]
    fn unknown_type_lists_known_types() {
        let report = cli_error_to_miette(CliError::UnknownFileType {
            file_type: "templates".into(),
            known: "javascripts, stylesheets".into(),
        });
        assert!(report.to_string().contains("javascripts, stylesheets"));
    }
}

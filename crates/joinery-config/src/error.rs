//! Error types for configuration loading and resolution.

use std::path::PathBuf;

use thiserror::Error;

use crate::packages::PackageKind;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    // Config discovery/loading errors
    #[error("config not found in {}", .root.display())]
    NotFound { root: PathBuf },

    #[error("failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("config must be a valid object")]
    NotAMap,

    #[error("config must have \"files\" property")]
    MissingFiles,

    // Shape errors found while resolving
    #[error("invalid config value for `{field}`{}", format_hint(.hint))]
    InvalidValue { field: String, hint: Option<String> },

    #[error("invalid matcher for `{field}`{}", format_hint(.hint))]
    InvalidMatcher { field: String, hint: Option<String> },

    #[error("config.modules.wrapper should be a function or one of: \"commonjs\", \"amd\", false (got {found})")]
    InvalidWrapper { found: String },

    #[error("config.modules.definition should be a function or one of: \"commonjs\", false (got {found})")]
    InvalidDefinition { found: String },

    // Package metadata
    #[error("{kind} packages could not be read: {message}. You probably need to execute `{kind} install` to install your dependencies")]
    PackageManifest { kind: PackageKind, message: String },

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub(crate) fn invalid_value(field: impl Into<String>, hint: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.into(),
            hint: Some(hint.into()),
        }
    }

    pub(crate) fn invalid_matcher(field: impl Into<String>, hint: impl Into<String>) -> Self {
        ConfigError::InvalidMatcher {
            field: field.into(),
            hint: Some(hint.into()),
        }
    }
}

fn format_hint(hint: &Option<String>) -> String {
    match hint {
        Some(hint) => format!(": {hint}"),
        None => String::new(),
    }
}

//! Error handling for the joinery CLI.
//!
//! Library errors pass through unchanged inside [`CliError::Config`]; the
//! remaining variants cover what only the CLI can get wrong. Rendering with
//! hints happens at the `main` boundary in [`cli_error_to_miette`].

mod miette;

use std::path::PathBuf;
use thiserror::Error;

pub use self::miette::cli_error_to_miette;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Config loading or resolution failed
    #[error("Configuration error: {0}")]
    Config(#[from] joinery_config::ConfigError),

    /// `join` was asked about a type the config does not define
    #[error("Unknown file type '{file_type}' (known: {known})")]
    UnknownFileType { file_type: String, known: String },

    /// Project root does not exist
    #[error("Project root not found: {}", .0.display())]
    RootNotFound(PathBuf),

    /// `JOINERY_*` settings could not be read
    #[error("Invalid JOINERY_* setting: {message}")]
    Settings { message: String },

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

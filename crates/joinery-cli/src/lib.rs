//! joinery CLI - command-line access to config resolution.
//!
//! The CLI is a thin layer over `joinery-config`:
//!
//! - [`cli`] - clap argument definitions
//! - [`commands`] - `resolve` and `join`
//! - [`settings`] - `JOINERY_*` environment settings
//! - [`error`] - CLI errors and their miette rendering
//! - [`logger`] - tracing subscriber setup
//! - [`ui`] - status messages on stderr

pub mod cli;
pub mod commands;
pub mod error;
pub mod logger;
pub mod settings;
pub mod ui;

pub use error::{CliError, Result};

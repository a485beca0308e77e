//! Command implementations for the joinery CLI.
//!
//! - [`resolve`] - resolve and print the project config
//! - [`join`] - report join destinations for source paths
//!
//! Each command provides an `execute` function that takes its parsed
//! arguments and returns a Result.

pub mod join;
pub mod resolve;
pub(crate) mod utils;

pub use join::execute as join_execute;
pub use resolve::execute as resolve_execute;

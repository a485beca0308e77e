//! Configuration resolution for the joinery asset builder.
//!
//! A raw config tree goes in; an immutable [`ResolvedConfig`] comes out with
//! defaults filled, environment overrides applied and join rules compiled.

pub mod config;
pub mod defaults;
pub mod deprecation;
pub mod discovery;
pub mod error;
pub mod join;
pub mod matcher;
pub mod merge;
pub mod modules;
pub mod overrides;
pub mod packages;
pub mod paths;
pub mod resolve;
pub mod value;

// Re-export main types
pub use config::*;
pub use error::*;
pub use join::{JoinConfig, TypeJoin};
pub use matcher::{FragmentSet, Matcher};
pub use modules::{Hook, ModuleDefinition, ModuleWrapper, NameCleaner, WrappedModule};
pub use paths::PathStyle;
pub use resolve::{load_and_resolve, resolve, ConfigBuilder, ResolveOptions};
pub use value::{Map, Value};

// Re-export collaborators
pub use deprecation::{TracingWarnings, WarningSink};
pub use discovery::{ConfigDiscovery, LoadedConfig};
pub use packages::{
    FsPackageResolver, NoPackages, PackageError, PackageInfo, PackageKind, PackageManifest,
    PackageRequest, PackageResolver,
};

//! Module wrapping strategies.
//!
//! `modules.wrapper` decides how a compiled module registers itself under its
//! logical name; `modules.definition` supplies the runtime that wrappers rely
//! on. Both accept a named strategy or a caller-supplied function.

mod definition;
mod wrapper;

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::error::{ConfigError, Result};
use crate::value::Value;

pub use definition::{normalize_definition, ModuleDefinition, COMMONJS_DEFINITION};
pub use wrapper::{normalize_wrapper, ModuleWrapper, WrappedModule};

/// A function-valued config leaf.
#[derive(Clone)]
pub enum Hook {
    Wrapper(ModuleWrapper),
    Definition(ModuleDefinition),
    NameCleaner(NameCleaner),
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hook::Wrapper(_) => f.write_str("Wrapper(..)"),
            Hook::Definition(_) => f.write_str("Definition(..)"),
            Hook::NameCleaner(_) => f.write_str("NameCleaner(..)"),
        }
    }
}

impl PartialEq for Hook {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Hook::Wrapper(a), Hook::Wrapper(b)) => a.ptr_eq(b),
            (Hook::Definition(a), Hook::Definition(b)) => a.ptr_eq(b),
            (Hook::NameCleaner(a), Hook::NameCleaner(b)) => Arc::ptr_eq(&a.0, &b.0),
            _ => false,
        }
    }
}

type CleanFn = dyn Fn(&str) -> String + Send + Sync;

/// Maps a source path to the module name the wrapper registers.
#[derive(Clone)]
pub struct NameCleaner(Arc<CleanFn>);

impl NameCleaner {
    pub fn new(f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Strips a leading `app/`.
    pub fn strip_app() -> Self {
        Self::new(|path| path.strip_prefix("app/").unwrap_or(path).to_string())
    }

    /// Removes the first match of `pattern`.
    pub fn strip_pattern(pattern: &str) -> Result<Self> {
        let re = Regex::new(pattern).map_err(|err| {
            ConfigError::invalid_value("modules.nameCleaner", err.to_string())
        })?;
        Ok(Self::new(move |path| re.replace(path, "").into_owned()))
    }

    /// Reads `modules.nameCleaner`; absent means [`NameCleaner::strip_app`].
    pub fn from_value(value: Option<&Value>) -> Result<Self> {
        match value {
            None | Some(Value::Null) => Ok(Self::strip_app()),
            Some(Value::Hook(Hook::NameCleaner(cleaner))) => Ok(cleaner.clone()),
            Some(Value::String(pattern)) => Self::strip_pattern(pattern),
            Some(other) => Err(ConfigError::invalid_value(
                "modules.nameCleaner",
                format!("expected a function or a pattern to strip, got {}", other.kind()),
            )),
        }
    }

    pub fn clean(&self, path: &str) -> String {
        (self.0)(path)
    }
}

impl fmt::Debug for NameCleaner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NameCleaner(..)")
    }
}

/// Normalizes a source path for use as a module name: backslashes become
/// forward slashes, leading `../` segments are dropped, then the cleaner runs.
pub fn clean_module_name(path: &str, cleaner: &NameCleaner) -> String {
    let forward = path.replace('\\', "/");
    let mut relative = forward.as_str();
    while let Some(rest) = relative.strip_prefix("../") {
        relative = rest;
    }
    cleaner.clean(relative)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cleaner_strips_app_prefix() {
        let cleaner = NameCleaner::from_value(None).unwrap();
        assert_eq!(cleaner.clean("app/models/user.js"), "models/user.js");
        assert_eq!(cleaner.clean("test/user.js"), "test/user.js");
    }

    #[test]
    fn string_cleaner_removes_pattern() {
        let cleaner = NameCleaner::from_value(Some(&Value::from("^src/"))).unwrap();
        assert_eq!(cleaner.clean("src/main.js"), "main.js");
    }

    #[test]
    fn module_names_drop_parent_segments_and_backslashes() {
        let cleaner = NameCleaner::strip_app();
        assert_eq!(
            clean_module_name("../../app\\views\\home.js", &cleaner),
            "views/home.js"
        );
    }

    #[test]
    fn non_function_cleaner_is_rejected() {
        assert!(NameCleaner::from_value(Some(&Value::Bool(true))).is_err());
    }
}

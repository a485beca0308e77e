use std::fmt;
use std::sync::Arc;

use super::wrapper::describe;
use super::Hook;
use crate::error::{ConfigError, Result};
use crate::value::Value;

/// Module registry runtime prepended once per build when modules are wrapped
/// with the `commonjs` strategy.
pub const COMMONJS_DEFINITION: &str = include_str!("require_definition.js");

type DefinitionFn = dyn Fn(&str, &str) -> String + Send + Sync;

/// `(path, data) -> runtime snippet` to prepend to a bundle.
#[derive(Clone)]
pub struct ModuleDefinition(Arc<DefinitionFn>);

impl ModuleDefinition {
    pub fn new(f: impl Fn(&str, &str) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn empty() -> Self {
        Self::new(|_, _| String::new())
    }

    pub fn commonjs() -> Self {
        Self::new(|_, _| COMMONJS_DEFINITION.to_string())
    }

    pub fn definition(&self, path: &str, data: &str) -> String {
        (self.0)(path, data)
    }

    pub(crate) fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ModuleDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ModuleDefinition(..)")
    }
}

/// Resolves `modules.definition` into a definition function.
pub fn normalize_definition(selector: &Value) -> Result<ModuleDefinition> {
    match selector {
        Value::String(name) if name == "commonjs" => Ok(ModuleDefinition::commonjs()),
        Value::String(name) if name == "amd" => Ok(ModuleDefinition::empty()),
        Value::Bool(false) => Ok(ModuleDefinition::empty()),
        Value::Hook(Hook::Definition(definition)) => Ok(definition.clone()),
        other => Err(ConfigError::InvalidDefinition {
            found: describe(other),
        }),
    }
}

use std::fmt;
use std::sync::Arc;

use regex::{Captures, Regex};
use tracing::debug;

use super::{clean_module_name, Hook, NameCleaner};
use crate::error::{ConfigError, Result};
use crate::value::Value;

type WrapFn = dyn Fn(&str, &str, bool) -> WrappedModule + Send + Sync;

/// Result of wrapping one compiled module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WrappedModule {
    /// The module text, untouched.
    Unchanged(String),
    /// Text to emit before and after the untouched module text.
    Bracketed { prefix: String, suffix: String },
    /// Replacement module text.
    Rewritten(String),
}

impl WrappedModule {
    /// Final text for a module whose original text was `data`.
    pub fn render(&self, data: &str) -> String {
        match self {
            WrappedModule::Unchanged(text) | WrappedModule::Rewritten(text) => text.clone(),
            WrappedModule::Bracketed { prefix, suffix } => format!("{prefix}{data}{suffix}"),
        }
    }
}

/// `(path, data, is_vendor) -> WrappedModule`, shared by every compile call.
#[derive(Clone)]
pub struct ModuleWrapper(Arc<WrapFn>);

impl ModuleWrapper {
    pub fn new(f: impl Fn(&str, &str, bool) -> WrappedModule + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Leaves every module as it is.
    pub fn identity() -> Self {
        Self::new(|_, data, _| WrappedModule::Unchanged(data.to_string()))
    }

    pub fn wrap(&self, path: &str, data: &str, is_vendor: bool) -> WrappedModule {
        (self.0)(path, data, is_vendor)
    }

    pub(crate) fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ModuleWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ModuleWrapper(..)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    CommonJs,
    Amd,
}

/// Resolves `modules.wrapper` into a wrapper function.
pub fn normalize_wrapper(selector: &Value, cleaner: &NameCleaner) -> Result<ModuleWrapper> {
    match selector {
        Value::String(name) if name == "commonjs" => {
            Ok(strategy_wrapper(Strategy::CommonJs, cleaner.clone(), None))
        }
        Value::String(name) if name == "amd" => {
            let define = Regex::new(r"define\s*\(")
                .map_err(|err| ConfigError::invalid_value("modules.wrapper", err.to_string()))?;
            Ok(strategy_wrapper(Strategy::Amd, cleaner.clone(), Some(define)))
        }
        Value::Bool(false) => Ok(ModuleWrapper::identity()),
        Value::Hook(Hook::Wrapper(wrapper)) => Ok(wrapper.clone()),
        other => Err(ConfigError::InvalidWrapper {
            found: describe(other),
        }),
    }
}

fn strategy_wrapper(
    strategy: Strategy,
    cleaner: NameCleaner,
    define: Option<Regex>,
) -> ModuleWrapper {
    ModuleWrapper::new(move |path, data, is_vendor| {
        let module_name = clean_module_name(path, &cleaner);
        // Quoted the way it appears in the emitted source.
        let name = serde_json::Value::from(strip_extension(&module_name)).to_string();
        if is_vendor {
            debug!("Not wrapping {name}, is vendor file");
            return WrappedModule::Unchanged(data.to_string());
        }
        debug!("Wrapping {name} with {strategy:?}");

        match (strategy, &define) {
            (Strategy::Amd, Some(define)) => WrappedModule::Rewritten(
                define
                    .replacen(data, 1, |caps: &Captures<'_>| format!("{}{name}, ", &caps[0]))
                    .into_owned(),
            ),
            _ => WrappedModule::Bracketed {
                prefix: format!("require.register({name}, function(exports, require, module) {{\n"),
                suffix: "});\n\n".to_string(),
            },
        }
    })
}

/// Drops a trailing `.ext` made of word characters.
fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(dot)
            if dot + 1 < name.len()
                && name[dot + 1..]
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_') =>
        {
            &name[..dot]
        }
        _ => name,
    }
}

pub(super) fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => format!("{s:?}"),
        Value::Bool(b) => b.to_string(),
        other => other.kind().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_stripped_once() {
        assert_eq!(strip_extension("models/user.js"), "models/user");
        assert_eq!(strip_extension("lib/jquery.min.js"), "lib/jquery.min");
        assert_eq!(strip_extension("dir.d/file"), "dir.d/file");
        assert_eq!(strip_extension("Makefile"), "Makefile");
    }

    #[test]
    fn render_brackets_original_text() {
        let wrapped = WrappedModule::Bracketed {
            prefix: "(".into(),
            suffix: ")".into(),
        };
        assert_eq!(wrapped.render("x"), "(x)");
    }

    #[test]
    fn true_is_not_a_wrapper() {
        let err = normalize_wrapper(&Value::Bool(true), &NameCleaner::strip_app()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidWrapper { .. }));
    }
}

//! File-based config discovery
//!
//! Finds and parses a project's config file. Parsing stops at the raw
//! [`Value`] tree; defaults, overrides and compilation happen in
//! [`crate::resolve`].

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::defaults::DEFAULT_CONFIG_NAME;
use crate::error::{ConfigError, Result};
use crate::value::{Map, Value};

/// Extensions a config file may carry, in lookup order.
pub const CONFIG_EXTENSIONS: [&str; 2] = ["toml", "json"];

/// Base name used before the config file was renamed.
const LEGACY_CONFIG_NAME: &str = "config";

const PACKAGE_JSON: &str = "package.json";
const PACKAGE_FIELD: &str = "joinery";

/// A parsed config file.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub tree: Map,
    /// File the tree was read from.
    pub path: PathBuf,
}

impl LoadedConfig {
    /// Config path relative to `root` with its extension removed, the form
    /// `paths.config` records.
    pub fn config_name(&self, root: &Path) -> String {
        let relative = self.path.strip_prefix(root).unwrap_or(&self.path);
        relative
            .with_extension("")
            .to_string_lossy()
            .replace('\\', "/")
    }
}

/// Searches a project root for its config file.
///
/// # Example
///
/// ```no_run
/// use joinery_config::ConfigDiscovery;
///
/// let loaded = ConfigDiscovery::new(".").load(None).unwrap();
/// println!("{}", loaded.path.display());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigDiscovery {
    root: PathBuf,
}

impl ConfigDiscovery {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Find a config file in the root directory
    ///
    /// Searches in this order:
    /// 1. `joinery-config.toml`, `joinery-config.json`
    /// 2. legacy `config.toml`, `config.json`
    /// 3. package.json (`joinery` field)
    pub fn find(&self) -> Option<PathBuf> {
        for name in [DEFAULT_CONFIG_NAME, LEGACY_CONFIG_NAME] {
            for ext in CONFIG_EXTENSIONS {
                let path = self.root.join(format!("{name}.{ext}"));
                if path.is_file() {
                    return Some(path);
                }
            }
        }

        let pkg_path = self.root.join(PACKAGE_JSON);
        let content = fs::read_to_string(&pkg_path).ok()?;
        let parsed: serde_json::Value = serde_json::from_str(&content).ok()?;
        parsed
            .get(PACKAGE_FIELD)
            .is_some_and(|field| !field.is_null())
            .then_some(pkg_path)
    }

    /// Loads `explicit` if given, else the discovered config file.
    ///
    /// # Errors
    ///
    /// `ConfigError::NotFound` when nothing is found, `ConfigError::Parse` for
    /// unreadable syntax and `ConfigError::NotAMap` when the root is not a
    /// table.
    pub fn load(&self, explicit: Option<&Path>) -> Result<LoadedConfig> {
        let path = match explicit {
            Some(path) if path.is_absolute() => path.to_path_buf(),
            Some(path) => self.root.join(path),
            None => self.find().ok_or_else(|| ConfigError::NotFound {
                root: self.root.clone(),
            })?,
        };
        debug!(path = %path.display(), "loading config");

        let tree = match Value::from(parse_file(&path)?) {
            Value::Map(tree) => tree,
            _ => return Err(ConfigError::NotAMap),
        };
        Ok(LoadedConfig { tree, path })
    }
}

fn parse_file(path: &Path) -> Result<serde_json::Value> {
    let content = fs::read_to_string(path)?;
    let parse_error = |message: String| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    };

    if path.file_name() == Some(std::ffi::OsStr::new(PACKAGE_JSON)) {
        let mut parsed: serde_json::Value =
            serde_json::from_str(&content).map_err(|e| parse_error(e.to_string()))?;
        return match parsed.get_mut(PACKAGE_FIELD).map(serde_json::Value::take) {
            Some(field) if !field.is_null() => Ok(field),
            _ => Err(ConfigError::InvalidValue {
                field: PACKAGE_FIELD.to_string(),
                hint: Some(format!("Add a '{PACKAGE_FIELD}' field to your package.json")),
            }),
        };
    }

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&content).map_err(|e| parse_error(e.to_string())),
        _ => {
            let toml_val: toml::Value =
                toml::from_str(&content).map_err(|e| parse_error(format!("Invalid TOML syntax: {e}")))?;
            serde_json::to_value(toml_val)
                .map_err(|e| parse_error(format!("TOML to JSON conversion failed: {e}")))
        }
    }
}

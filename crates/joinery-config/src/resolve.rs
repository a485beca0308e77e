//! Config resolution pipeline.
//!
//! [`ConfigBuilder`] owns the mutable tree while it moves through the stages
//! below, in this order, and gives it up only as an `Arc<ResolvedConfig>`:
//!
//! 1. fill defaults
//! 2. locate a default server entry point
//! 3. warn about deprecated fields
//! 4. apply environment overrides
//! 5. merge runtime options
//! 6. normalize path separators
//! 7. compile join rules and module wrappers
//! 8. fetch package metadata

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::config::{string_list, Modules, Normalized, ResolvedConfig};
use crate::defaults::fill_defaults;
use crate::deprecation::{warn_deprecations, TracingWarnings, WarningSink};
use crate::discovery::{ConfigDiscovery, CONFIG_EXTENSIONS};
use crate::error::{ConfigError, Result};
use crate::join::JoinConfig;
use crate::matcher::Matcher;
use crate::merge::{merge_into, MergeExclusions};
use crate::modules::{normalize_definition, normalize_wrapper, NameCleaner};
use crate::overrides::{apply_overrides_in_place, environment_stack};
use crate::packages::{
    load_package_info, FsPackageResolver, NoPackages, PackageInfo, PackageRequest, PackageResolver,
};
use crate::paths::{normalize_separators_in_place, PathStyle};
use crate::value::{Map, Value};

const SERVER_CANDIDATES: [&str; 3] = [
    "joinery-server",
    "joinery-server.js",
    "joinery-server/index.js",
];

const PLUGIN_LISTS: [&str; 3] = ["on", "off", "only"];

/// Runtime options layered over the loaded config.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    env: Vec<String>,
    process_env: Option<String>,
    path_style: PathStyle,
    overrides: Value,
    base_dir: PathBuf,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            env: Vec::new(),
            process_env: None,
            path_style: PathStyle::host(),
            overrides: Value::map(),
            base_dir: PathBuf::from("."),
        }
    }
}

impl ResolveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Environments to resolve for; later names win.
    pub fn env<I, S>(mut self, env: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.env = env.into_iter().map(Into::into).collect();
        self
    }

    /// Process-wide environment name, applied before the explicit ones.
    pub fn process_env(mut self, name: Option<impl Into<String>>) -> Self {
        self.process_env = name.map(Into::into);
        self
    }

    pub fn path_style(mut self, style: PathStyle) -> Self {
        self.path_style = style;
        self
    }

    /// Sets a config field after overrides are applied, e.g.
    /// `set(["server", "port"], 8080)`. Runtime options merge key by key,
    /// join specs under `files` included.
    pub fn set<I, S>(mut self, path: I, value: impl Into<Value>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: Vec<String> = path.into_iter().map(Into::into).collect();
        if keys.is_empty() {
            return self;
        }
        let leaf: Value = value.into();
        let patch = keys
            .into_iter()
            .rev()
            .fold(leaf, |inner, key| Value::Map(Map::from([(key, inner)])));
        merge_into(&mut self.overrides, &patch, &MergeExclusions::new());
        self
    }

    /// Merges a whole tree of options.
    pub fn merge(mut self, options: &Map) -> Self {
        merge_into(
            &mut self.overrides,
            &Value::Map(options.clone()),
            &MergeExclusions::new(),
        );
        self
    }

    /// Directory that `paths.root` and other relative paths resolve against.
    pub fn base_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.base_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Environment stack in application order.
    pub fn environments(&self) -> Vec<String> {
        environment_stack(&self.env, self.process_env.as_deref())
    }
}

/// Staged builder for a [`ResolvedConfig`].
///
/// # Example
///
/// ```
/// use joinery_config::{ConfigBuilder, PathStyle, ResolveOptions, Value};
///
/// let tree = Value::from(serde_json::json!({
///     "files": { "javascripts": { "joinTo": "app.js" } }
/// }));
/// let config = ConfigBuilder::new(tree.as_map().cloned().unwrap_or_default())
///     .options(ResolveOptions::new().path_style(PathStyle::Posix))
///     .without_packages()
///     .build()
///     .unwrap();
/// assert_eq!(config.join().destinations_for("javascripts", "app/a.js"), ["app.js"]);
/// ```
pub struct ConfigBuilder {
    tree: Map,
    config_path: Option<String>,
    options: ResolveOptions,
    warnings: Box<dyn WarningSink>,
    packages: Option<Box<dyn PackageResolver>>,
}

impl ConfigBuilder {
    pub fn new(tree: Map) -> Self {
        Self {
            tree,
            config_path: None,
            options: ResolveOptions::default(),
            warnings: Box::new(TracingWarnings),
            packages: None,
        }
    }

    /// Path the config was loaded from, without extension.
    pub fn config_path(mut self, path: impl Into<String>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    pub fn warnings(mut self, sink: impl WarningSink + 'static) -> Self {
        self.warnings = Box::new(sink);
        self
    }

    /// Package metadata source. Defaults to [`FsPackageResolver`] rooted at
    /// the options' base directory.
    pub fn packages(mut self, resolver: impl PackageResolver + 'static) -> Self {
        self.packages = Some(Box::new(resolver));
        self
    }

    /// Skips package metadata entirely.
    pub fn without_packages(self) -> Self {
        self.packages(NoPackages)
    }

    pub fn build(self) -> Result<Arc<ResolvedConfig>> {
        let Self {
            mut tree,
            config_path,
            options,
            warnings,
            packages,
        } = self;
        let style = options.path_style;

        if tree.get("files").is_none_or(Value::is_null) {
            return Err(ConfigError::MissingFiles);
        }

        fill_defaults(&mut tree, config_path.as_deref(), style)?;
        locate_server(&mut tree, &options.base_dir, style);
        let deprecated = warn_deprecations(&tree, warnings.as_ref());
        debug!(deprecated, "filled config defaults");

        let env = options.environments();
        let mut config = Value::Map(tree);
        apply_overrides_in_place(&mut config, &env);

        merge_into(&mut config, &options.overrides, &MergeExclusions::new());
        normalize_separators_in_place(&mut config, style);

        let Value::Map(mut tree) = config else {
            return Err(ConfigError::NotAMap);
        };
        normalize_plugin_lists(&mut tree)?;

        let join = JoinConfig::compile(tree.get("files").unwrap_or(&Value::Null))?;
        let modules = compile_modules(&tree)?;
        debug!(types = join.types().count(), "compiled join config");

        let fs_packages;
        let resolver: &dyn PackageResolver = match &packages {
            Some(resolver) => resolver.as_ref(),
            None => {
                fs_packages = FsPackageResolver::new(&options.base_dir);
                &fs_packages
            }
        };
        let package_info = fetch_package_info(&tree, resolver)?;

        let normalized = normalize_config_files(&tree, join, package_info);
        let resolved = ResolvedConfig::new(tree, env, modules, normalized)?;
        Ok(Arc::new(resolved))
    }
}

/// Resolves an in-memory config tree.
pub fn resolve(tree: Map, options: ResolveOptions) -> Result<Arc<ResolvedConfig>> {
    ConfigBuilder::new(tree).options(options).build()
}

/// Discovers the config file under `root` (or reads `explicit`) and resolves
/// it with `root` as the base directory.
pub fn load_and_resolve(
    root: impl AsRef<Path>,
    explicit: Option<&Path>,
    options: ResolveOptions,
) -> Result<Arc<ResolvedConfig>> {
    let root = root.as_ref();
    let loaded = ConfigDiscovery::new(root).load(explicit)?;
    let config_path = loaded.config_name(root);
    ConfigBuilder::new(loaded.tree)
        .config_path(config_path)
        .options(options.base_dir(root))
        .build()
}

/// Points `server.path` at the first server entry point found under the
/// project root. Lookup failures are ignored.
fn locate_server(tree: &mut Map, base_dir: &Path, style: PathStyle) {
    let Some(server) = tree.get("server").and_then(Value::as_map) else {
        return;
    };
    if server.get("path").is_some_and(|path| !path.is_null()) {
        return;
    }
    let root = tree
        .get("paths")
        .and_then(|paths| paths.get("root"))
        .and_then(Value::as_str)
        .unwrap_or(".")
        .to_string();

    let found = SERVER_CANDIDATES
        .iter()
        .find(|candidate| base_dir.join(&root).join(candidate).is_file());
    if let Some(candidate) = found {
        let path = style.join(&root, candidate);
        debug!(%path, "found server entry point");
        if let Some(server) = tree.get_mut("server").and_then(Value::as_map_mut) {
            server.insert("path".to_string(), Value::from(path));
        }
    }
}

/// Turns bare-string `plugins.on|off|only` into one-element lists.
fn normalize_plugin_lists(tree: &mut Map) -> Result<()> {
    let mut lists = Vec::with_capacity(PLUGIN_LISTS.len());
    for key in PLUGIN_LISTS {
        lists.push((key, string_list(tree, &["plugins", key])?));
    }
    let Some(plugins) = tree.get_mut("plugins").and_then(Value::as_map_mut) else {
        return Ok(());
    };
    for (key, list) in lists {
        if plugins.contains_key(key) {
            plugins.insert(
                key.to_string(),
                Value::Array(list.into_iter().map(Value::from).collect()),
            );
        }
    }
    Ok(())
}

fn compile_modules(tree: &Map) -> Result<Modules> {
    let modules = tree.get("modules").unwrap_or(&Value::Null);
    let name_cleaner = NameCleaner::from_value(modules.get("nameCleaner"))?;
    let wrapper = normalize_wrapper(modules.get("wrapper").unwrap_or(&Value::Null), &name_cleaner)?;
    let definition = normalize_definition(modules.get("definition").unwrap_or(&Value::Null))?;
    Ok(Modules {
        wrapper,
        definition,
        auto_require: modules.get("autoRequire").cloned().unwrap_or_else(Value::map),
        name_cleaner,
    })
}

fn fetch_package_info(tree: &Map, resolver: &dyn PackageResolver) -> Result<PackageInfo> {
    let path = |key: &str| {
        tree.get("paths")
            .and_then(|paths| paths.get(key))
            .and_then(Value::as_str)
            .unwrap_or_default()
    };
    let ignored = tree
        .get("conventions")
        .and_then(|conventions| conventions.get("ignored"))
        .map(|value| Matcher::from_value(value, "conventions.ignored"))
        .transpose()?
        .unwrap_or_else(|| Matcher::predicate(|_| false));
    let npm_enabled = tree
        .get("npm")
        .and_then(|npm| npm.get("enabled"))
        .is_some_and(Value::is_truthy);

    let request = PackageRequest {
        root: path("root"),
        package_config: path("packageConfig"),
        bower_config: path("bowerConfig"),
        ignored: &ignored,
    };
    load_package_info(resolver, &request, npm_enabled)
}

fn normalize_config_files(
    tree: &Map,
    join: JoinConfig,
    package_info: PackageInfo,
) -> Normalized {
    let paths = tree.get("paths").unwrap_or(&Value::Null);
    let path = |key: &str| paths.get(key).and_then(Value::as_str).unwrap_or_default();

    let possible_config_files: Vec<String> = CONFIG_EXTENSIONS
        .iter()
        .map(|ext| format!("{}.{ext}", path("config")))
        .collect();
    let all_config_files = [path("packageConfig"), path("bowerConfig")]
        .into_iter()
        .map(str::to_string)
        .chain(possible_config_files.iter().cloned())
        .collect();

    Normalized {
        join,
        package_info,
        possible_config_files,
        all_config_files,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree(value: serde_json::Value) -> Map {
        match Value::from(value) {
            Value::Map(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn set_builds_nested_patch() {
        let options = ResolveOptions::new()
            .set(["server", "port"], 8080u16)
            .set(["server", "run"], true);
        assert_eq!(
            options.overrides.to_json(),
            json!({ "server": { "port": 8080, "run": true } })
        );
    }

    #[test]
    fn plugin_strings_become_lists() {
        let mut t = tree(json!({ "plugins": { "on": "sass", "off": ["coffee"] } }));
        normalize_plugin_lists(&mut t).unwrap();
        assert_eq!(
            Value::Map(t).get("plugins").unwrap().to_json(),
            json!({ "on": ["sass"], "off": ["coffee"] })
        );
    }

    #[test]
    fn config_files_follow_config_path() {
        let t = tree(json!({
            "paths": {
                "config": "joinery-config",
                "packageConfig": "package.json",
                "bowerConfig": "bower.json"
            }
        }));
        let normalized =
            normalize_config_files(&t, JoinConfig::default(), PackageInfo::default());
        assert_eq!(
            normalized.possible_config_files,
            ["joinery-config.toml", "joinery-config.json"]
        );
        assert_eq!(normalized.all_config_files.len(), 4);
        assert_eq!(normalized.all_config_files[0], "package.json");
    }

    #[test]
    fn missing_files_is_fatal() {
        let err = ConfigBuilder::new(tree(json!({ "paths": {} })))
            .without_packages()
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingFiles));
    }
}

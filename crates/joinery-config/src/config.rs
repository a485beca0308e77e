//! The resolved configuration.
//!
//! [`ResolvedConfig`] is the immutable product of resolution. It is handed
//! out behind an `Arc` and offers shared access only, so every consumer sees
//! the same tree for the lifetime of a build.

use crate::error::{ConfigError, Result};
use crate::join::JoinConfig;
use crate::matcher::Matcher;
use crate::modules::{ModuleDefinition, ModuleWrapper, NameCleaner};
use crate::overrides::OVERRIDES_KEY;
use crate::packages::PackageInfo;
use crate::value::{Map, Value};

/// `paths.*` after defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub root: String,
    pub public: String,
    pub watched: Vec<String>,
    pub config: String,
    pub package_config: String,
    pub bower_config: String,
}

/// File classification predicates from `conventions.*`.
#[derive(Debug, Clone)]
pub struct Conventions {
    pub assets: Matcher,
    pub ignored: Matcher,
    pub vendor: Matcher,
}

impl Conventions {
    pub fn is_asset(&self, path: &str) -> bool {
        self.assets.matches(path)
    }

    pub fn is_ignored(&self, path: &str) -> bool {
        self.ignored.matches(path)
    }

    pub fn is_vendor(&self, path: &str) -> bool {
        self.vendor.matches(path)
    }
}

/// `modules.*` with the wrapper and definition compiled.
#[derive(Debug, Clone)]
pub struct Modules {
    pub wrapper: ModuleWrapper,
    pub definition: ModuleDefinition,
    pub auto_require: Value,
    pub name_cleaner: NameCleaner,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerOptions {
    pub base: String,
    pub port: u16,
    pub run: bool,
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginLists {
    pub on: Vec<String>,
    pub off: Vec<String>,
    pub only: Vec<String>,
}

/// Values derived from the tree during resolution.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub join: JoinConfig,
    pub package_info: PackageInfo,
    pub possible_config_files: Vec<String>,
    pub all_config_files: Vec<String>,
}

/// A fully resolved configuration.
#[derive(Debug)]
pub struct ResolvedConfig {
    tree: Map,
    env: Vec<String>,
    paths: Paths,
    conventions: Conventions,
    modules: Modules,
    server: ServerOptions,
    plugins: PluginLists,
    normalized: Normalized,
}

impl ResolvedConfig {
    pub(crate) fn new(
        tree: Map,
        env: Vec<String>,
        modules: Modules,
        normalized: Normalized,
    ) -> Result<Self> {
        let paths = read_paths(&tree)?;
        let conventions = read_conventions(&tree)?;
        let server = read_server(&tree)?;
        let plugins = PluginLists {
            on: string_list(&tree, &["plugins", "on"])?,
            off: string_list(&tree, &["plugins", "off"])?,
            only: string_list(&tree, &["plugins", "only"])?,
        };
        Ok(Self {
            tree,
            env,
            paths,
            conventions,
            modules,
            server,
            plugins,
            normalized,
        })
    }

    /// Environment stack the config was resolved for, in application order.
    pub fn env(&self) -> &[String] {
        &self.env
    }

    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    pub fn conventions(&self) -> &Conventions {
        &self.conventions
    }

    pub fn modules(&self) -> &Modules {
        &self.modules
    }

    pub fn server(&self) -> &ServerOptions {
        &self.server
    }

    pub fn plugins(&self) -> &PluginLists {
        &self.plugins
    }

    pub fn normalized(&self) -> &Normalized {
        &self.normalized
    }

    pub fn join(&self) -> &JoinConfig {
        &self.normalized.join
    }

    pub fn package_info(&self) -> &PackageInfo {
        &self.normalized.package_info
    }

    /// `overrides`, including the `_default` snapshot when one was taken.
    pub fn overrides(&self) -> Option<&Map> {
        self.tree.get(OVERRIDES_KEY).and_then(Value::as_map)
    }

    pub fn optimize(&self) -> bool {
        self.flag("optimize")
    }

    pub fn source_maps(&self) -> bool {
        self.flag("sourceMaps")
    }

    pub fn notifications(&self) -> bool {
        self.flag("notifications")
    }

    pub fn npm_enabled(&self) -> bool {
        self.get(&["npm", "enabled"]).is_some_and(Value::is_truthy)
    }

    /// Looks up any field of the resolved tree by key path.
    pub fn get(&self, path: &[&str]) -> Option<&Value> {
        lookup(&self.tree, path)
    }

    pub fn tree(&self) -> &Map {
        &self.tree
    }

    fn flag(&self, key: &str) -> bool {
        self.tree.get(key).is_some_and(Value::is_truthy)
    }

    /// Serializable view of the whole config. Matchers render as their source
    /// text and functions as `"[function]"`.
    pub fn to_json(&self) -> serde_json::Value {
        let mut root: serde_json::Map<String, serde_json::Value> = self
            .tree
            .iter()
            .map(|(key, value)| (key.clone(), value.to_json()))
            .collect();
        root.insert("env".into(), serde_json::Value::from(self.env.clone()));

        let normalized = serde_json::json!({
            "join": self.normalized.join.to_json(),
            "paths": {
                "possibleConfigFiles": self.normalized.possible_config_files,
                "allConfigFiles": self.normalized.all_config_files,
            },
            "modules": {
                "autoRequire": self.modules.auto_require.to_json(),
            },
            "packageInfo": serde_json::to_value(&self.normalized.package_info).unwrap_or_default(),
        });
        root.insert("_normalized".into(), normalized);
        serde_json::Value::Object(root)
    }
}

fn field_name(path: &[&str]) -> String {
    path.join(".")
}

fn lookup<'a>(tree: &'a Map, path: &[&str]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    let head = tree.get(*first)?;
    if rest.is_empty() {
        Some(head)
    } else {
        head.pointer(rest)
    }
}

fn string_at(tree: &Map, path: &[&str]) -> Result<String> {
    match lookup(tree, path) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(ConfigError::invalid_value(
            field_name(path),
            format!("expected a path, got {}", other.kind()),
        )),
        None => Err(ConfigError::InvalidValue {
            field: field_name(path),
            hint: None,
        }),
    }
}

/// Reads a list of strings; a bare string is a one-element list and an
/// absent field is empty.
pub(crate) fn string_list(tree: &Map, path: &[&str]) -> Result<Vec<String>> {
    match lookup(tree, path) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(s)) => Ok(vec![s.clone()]),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    ConfigError::invalid_value(field_name(path), "expected a list of strings")
                })
            })
            .collect(),
        Some(other) => Err(ConfigError::invalid_value(
            field_name(path),
            format!("expected a list of strings, got {}", other.kind()),
        )),
    }
}

fn read_paths(tree: &Map) -> Result<Paths> {
    Ok(Paths {
        root: string_at(tree, &["paths", "root"])?,
        public: string_at(tree, &["paths", "public"])?,
        watched: string_list(tree, &["paths", "watched"])?,
        config: string_at(tree, &["paths", "config"])?,
        package_config: string_at(tree, &["paths", "packageConfig"])?,
        bower_config: string_at(tree, &["paths", "bowerConfig"])?,
    })
}

fn read_conventions(tree: &Map) -> Result<Conventions> {
    let matcher = |name: &str| {
        let field = format!("conventions.{name}");
        match lookup(tree, &["conventions", name]) {
            Some(value) => Matcher::from_value(value, &field),
            None => Err(ConfigError::InvalidMatcher { field, hint: None }),
        }
    };
    Ok(Conventions {
        assets: matcher("assets")?,
        ignored: matcher("ignored")?,
        vendor: matcher("vendor")?,
    })
}

fn read_server(tree: &Map) -> Result<ServerOptions> {
    let port = lookup(tree, &["server", "port"])
        .and_then(Value::as_u64)
        .and_then(|port| u16::try_from(port).ok())
        .ok_or_else(|| ConfigError::invalid_value("server.port", "expected a port number"))?;
    let path = match lookup(tree, &["server", "path"]) {
        None | Some(Value::Null) => None,
        Some(_) => Some(string_at(tree, &["server", "path"])?),
    };
    Ok(ServerOptions {
        base: string_at(tree, &["server", "base"])?,
        port,
        run: lookup(tree, &["server", "run"]).is_some_and(Value::is_truthy),
        path,
    })
}

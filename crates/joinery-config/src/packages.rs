//! Third-party package metadata.
//!
//! Resolution asks a [`PackageResolver`] for the installed components of each
//! package kind. How manifests are read is the resolver's business; this
//! module owns the policy around it: which failures are fatal, which degrade
//! to an empty component list, and how component files are ordered.

use std::cmp::Reverse;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

use crate::error::{ConfigError, Result};
use crate::matcher::Matcher;
use crate::merge::{merge, MergeExclusions};
use crate::paths::PathStyle;
use crate::value::Value;

/// Plugins for the tool itself are not library code.
const TOOL_NAME: &str = "joinery";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageKind {
    Npm,
    Bower,
    Component,
}

impl PackageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PackageKind::Npm => "npm",
            PackageKind::Bower => "bower",
            PackageKind::Component => "component",
        }
    }
}

impl fmt::Display for PackageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub name: String,
    pub files: Vec<String>,
    pub version: Option<String>,
    /// Higher levels load first.
    pub sorting_level: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PackageManifest {
    pub components: Vec<Component>,
    pub aliases: IndexMap<String, String>,
    pub order: Vec<String>,
}

impl PackageManifest {
    pub fn from_components(components: Vec<Component>) -> Self {
        Self {
            components,
            ..Self::default()
        }
    }

    /// Fills `order` with component files, dependencies first.
    fn with_order(mut self) -> Self {
        self.components.sort_by(|a, b| {
            (Reverse(a.sorting_level), a.files.first()).cmp(&(Reverse(b.sorting_level), b.files.first()))
        });
        self.order = self
            .components
            .iter()
            .flat_map(|component| component.files.iter().cloned())
            .collect();
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PackageInfo {
    pub npm: PackageManifest,
    pub bower: PackageManifest,
    pub component: PackageManifest,
}

impl PackageInfo {
    pub fn get(&self, kind: PackageKind) -> &PackageManifest {
        match kind {
            PackageKind::Npm => &self.npm,
            PackageKind::Bower => &self.bower,
            PackageKind::Component => &self.component,
        }
    }
}

#[derive(Debug, Error)]
pub enum PackageError {
    #[error("manifest not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("malformed manifest {}: {message}", .path.display())]
    Malformed { path: PathBuf, message: String },
}

/// What a resolver needs to know about the project. `package_config` and
/// `bower_config` are paths as configured, `root` is the project root.
#[derive(Debug, Clone, Copy)]
pub struct PackageRequest<'a> {
    pub root: &'a str,
    pub package_config: &'a str,
    pub bower_config: &'a str,
    pub ignored: &'a Matcher,
}

/// Reads installed package manifests.
pub trait PackageResolver {
    fn resolve(
        &self,
        kind: PackageKind,
        request: &PackageRequest<'_>,
    ) -> std::result::Result<PackageManifest, PackageError>;
}

/// Collects metadata for all package kinds. npm is only consulted when
/// enabled and any npm failure is fatal; bower and component failures
/// degrade to an empty manifest.
pub fn load_package_info(
    resolver: &dyn PackageResolver,
    request: &PackageRequest<'_>,
    npm_enabled: bool,
) -> Result<PackageInfo> {
    let npm = if npm_enabled {
        resolver
            .resolve(PackageKind::Npm, request)
            .map_err(|err| ConfigError::PackageManifest {
                kind: PackageKind::Npm,
                message: err.to_string(),
            })?
    } else {
        PackageManifest::default()
    };

    Ok(PackageInfo {
        npm,
        bower: load_components(resolver, request, PackageKind::Bower),
        component: load_components(resolver, request, PackageKind::Component),
    })
}

fn load_components(
    resolver: &dyn PackageResolver,
    request: &PackageRequest<'_>,
    kind: PackageKind,
) -> PackageManifest {
    match resolver.resolve(kind, request) {
        Ok(manifest) => manifest.with_order(),
        Err(PackageError::NotFound(path)) => {
            debug!("no {kind} manifest at {}", path.display());
            PackageManifest::default()
        }
        Err(err) => {
            error!("{err}");
            PackageManifest::default()
        }
    }
}

/// Resolver that never finds anything. Useful when package metadata is not
/// wanted.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPackages;

impl PackageResolver for NoPackages {
    fn resolve(
        &self,
        _kind: PackageKind,
        request: &PackageRequest<'_>,
    ) -> std::result::Result<PackageManifest, PackageError> {
        Err(PackageError::NotFound(PathBuf::from(request.root)))
    }
}

/// Reads manifests from the project directory.
#[derive(Debug, Clone)]
pub struct FsPackageResolver {
    base: PathBuf,
}

impl FsPackageResolver {
    /// `base` is the directory `paths.root` is relative to.
    pub fn new(base: impl AsRef<Path>) -> Self {
        Self {
            base: base.as_ref().to_path_buf(),
        }
    }

    fn resolve_npm(&self, request: &PackageRequest<'_>) -> std::result::Result<PackageManifest, PackageError> {
        let root = self.base.join(request.root);
        let manifest: NpmManifest = read_json(&self.base.join(request.package_config))?;
        let overrides = manifest.overrides.map(Value::from);

        let mut components = Vec::new();
        for (dep, version) in &manifest.dependencies {
            if dep.contains(TOOL_NAME) || request.ignored.matches(dep) {
                continue;
            }
            let dep_manifest_path = root.join("node_modules").join(dep).join("package.json");
            let dep_manifest = Value::from(read_json::<serde_json::Value>(&dep_manifest_path)?);
            let dep_manifest = match overrides.as_ref().and_then(|o| o.get(dep)) {
                Some(patch) => merge(&dep_manifest, patch, &MergeExclusions::new()),
                None => dep_manifest,
            };
            let main = dep_manifest
                .get("main")
                .and_then(Value::as_str)
                .unwrap_or("index.js");
            components.push(Component {
                name: dep.clone(),
                files: vec![PathStyle::Posix.join(&format!("node_modules/{dep}"), main)],
                version: version.as_str().map(str::to_string),
                sorting_level: 0,
            });
        }
        Ok(PackageManifest::from_components(components))
    }

    fn resolve_components(
        &self,
        layout: ComponentLayout,
        request: &PackageRequest<'_>,
    ) -> std::result::Result<PackageManifest, PackageError> {
        let root = self.base.join(request.root);
        let manifest_path = match layout.kind {
            PackageKind::Bower => self.base.join(request.bower_config),
            _ => root.join(layout.manifest),
        };
        let manifest: ComponentManifest = read_json(&manifest_path)?;

        // Breadth-first walk; a package's level is the deepest it is reached.
        let mut levels: IndexMap<String, u32> = IndexMap::new();
        let mut manifests: HashMap<String, ComponentManifest> = HashMap::new();
        let mut queue: VecDeque<(String, u32)> =
            manifest.dependencies.keys().map(|name| (name.clone(), 0)).collect();

        while let Some((name, level)) = queue.pop_front() {
            let known = levels.get(&name).copied();
            if known.is_some_and(|known| known >= level) {
                continue;
            }
            // A level past the package count means a dependency cycle.
            if level as usize > manifest.dependencies.len() + manifests.len() {
                continue;
            }
            levels.insert(name.clone(), level);

            if !manifests.contains_key(&name) {
                let dir = root.join(layout.directory).join(layout.directory_name(&name));
                let dep_manifest: ComponentManifest = layout
                    .package_manifests
                    .iter()
                    .map(|file| dir.join(file))
                    .find(|path| path.exists())
                    .ok_or_else(|| PackageError::Malformed {
                        path: dir.clone(),
                        message: format!("{name} is listed but not installed"),
                    })
                    .and_then(|path| read_json(&path))?;
                manifests.insert(name.clone(), dep_manifest);
            }
            if let Some(dep_manifest) = manifests.get(&name) {
                queue.extend(
                    dep_manifest
                        .dependencies
                        .keys()
                        .map(|child| (child.clone(), level + 1)),
                );
            }
        }

        let mut aliases = IndexMap::new();
        let components = levels
            .into_iter()
            .filter_map(|(name, level)| {
                let dep_manifest = manifests.remove(&name)?;
                let dir = layout.directory_name(&name);
                let prefix = format!("{}/{dir}", layout.directory);
                let files = layout
                    .files(&dep_manifest)
                    .iter()
                    .map(|file| PathStyle::Posix.join(&prefix, file))
                    .collect();
                if dir != name {
                    aliases.insert(name.clone(), dir);
                }
                Some(Component {
                    version: dep_manifest.version.clone(),
                    name,
                    files,
                    sorting_level: level,
                })
            })
            .collect();

        Ok(PackageManifest {
            components,
            aliases,
            order: Vec::new(),
        })
    }
}

impl PackageResolver for FsPackageResolver {
    fn resolve(
        &self,
        kind: PackageKind,
        request: &PackageRequest<'_>,
    ) -> std::result::Result<PackageManifest, PackageError> {
        match kind {
            PackageKind::Npm => self.resolve_npm(request),
            PackageKind::Bower => self.resolve_components(ComponentLayout::BOWER, request),
            PackageKind::Component => self.resolve_components(ComponentLayout::COMPONENT, request),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ComponentLayout {
    kind: PackageKind,
    manifest: &'static str,
    directory: &'static str,
    package_manifests: &'static [&'static str],
}

impl ComponentLayout {
    const BOWER: Self = Self {
        kind: PackageKind::Bower,
        manifest: "bower.json",
        directory: "bower_components",
        package_manifests: &[".bower.json", "bower.json"],
    };

    const COMPONENT: Self = Self {
        kind: PackageKind::Component,
        manifest: "component.json",
        directory: "components",
        package_manifests: &["component.json"],
    };

    fn directory_name(&self, name: &str) -> String {
        match self.kind {
            PackageKind::Component => name.replace('/', "-"),
            _ => name.to_string(),
        }
    }

    fn files(&self, manifest: &ComponentManifest) -> Vec<String> {
        match self.kind {
            PackageKind::Component => manifest
                .scripts
                .iter()
                .chain(manifest.styles.iter())
                .cloned()
                .collect(),
            _ => match &manifest.main {
                Some(MainField::One(file)) => vec![file.clone()],
                Some(MainField::Many(files)) => files.clone(),
                None => Vec::new(),
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct NpmManifest {
    #[serde(default)]
    dependencies: IndexMap<String, serde_json::Value>,
    #[serde(default)]
    overrides: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
struct ComponentManifest {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    main: Option<MainField>,
    #[serde(default)]
    scripts: Vec<String>,
    #[serde(default)]
    styles: Vec<String>,
    #[serde(default)]
    dependencies: IndexMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MainField {
    One(String),
    Many(Vec<String>),
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> std::result::Result<T, PackageError> {
    let content = fs::read_to_string(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => PackageError::NotFound(path.to_path_buf()),
        _ => PackageError::Malformed {
            path: path.to_path_buf(),
            message: err.to_string(),
        },
    })?;
    serde_json::from_str(&content).map_err(|err| PackageError::Malformed {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

//! Default values for every optional config field.
//!
//! Defaults fill holes only: a field that is present and not null is never
//! touched, whatever its value.

use crate::error::{ConfigError, Result};
use crate::matcher::Matcher;
use crate::paths::PathStyle;
use crate::value::{Map, Value};

pub const DEFAULT_CONFIG_NAME: &str = "joinery-config";
pub const DEFAULT_SERVER_PORT: u16 = 3333;

const ASSETS_CONVENTION: &str = r"assets[\\/]";
const IGNORED_CONVENTIONS: [&str; 2] = [r"[\\/]_", r"vendor[\\/](node|j?ruby-.*|bundle)[\\/]"];
const VENDOR_CONVENTION: &str = r"(^bower_components|node_modules|vendor)[\\/]";

/// Fills defaults into the config root. `config_path` is the path the config
/// was loaded from, if any.
pub fn fill_defaults(config: &mut Map, config_path: Option<&str>, style: PathStyle) -> Result<()> {
    fill_paths(config, config_path, style)?;
    fill_conventions(config)?;

    set_default(config, "notifications", true);
    set_default(config, "sourceMaps", true);
    set_default(config, "optimize", false);
    set_default(config, "plugins", Value::map());

    let modules = section(config, "modules")?;
    set_default(modules, "wrapper", "commonjs");
    set_default(modules, "definition", "commonjs");
    // nameCleaner stays absent; absent means "strip app/" when normalized.
    set_default(modules, "autoRequire", Value::map());

    let server = section(config, "server")?;
    set_default(server, "base", "");
    set_default(server, "port", DEFAULT_SERVER_PORT);
    set_default(server, "run", false);

    let overrides = section(config, "overrides")?;
    let production = section(overrides, "production")?;
    set_default(production, "optimize", true);
    set_default(production, "sourceMaps", false);
    let plugins = section(production, "plugins")?;
    let auto_reload = section(plugins, "autoReload")?;
    set_default(auto_reload, "enabled", false);

    let npm = section(config, "npm")?;
    set_default(npm, "enabled", false);

    Ok(())
}

fn fill_paths(config: &mut Map, config_path: Option<&str>, style: PathStyle) -> Result<()> {
    let paths = section(config, "paths")?;
    set_default(paths, "root", ".");
    let root = paths
        .get("root")
        .and_then(Value::as_str)
        .unwrap_or(".")
        .to_string();
    let join_root = |name: &str| Value::from(style.join(&root, name));

    set_default(paths, "public", join_root("public"));
    set_default(
        paths,
        "watched",
        Value::Array(["app", "test", "vendor"].into_iter().map(join_root).collect()),
    );
    set_default(
        paths,
        "config",
        config_path.map_or_else(|| join_root("config"), Value::from),
    );
    set_default(paths, "packageConfig", join_root("package.json"));
    set_default(paths, "bowerConfig", join_root("bower.json"));
    Ok(())
}

fn fill_conventions(config: &mut Map) -> Result<()> {
    let legacy_ignored = config
        .get("paths")
        .and_then(|paths| paths.get("ignored"))
        .filter(|ignored| ignored.is_truthy())
        .cloned();

    let conventions = section(config, "conventions")?;
    set_default(conventions, "assets", Matcher::pattern(ASSETS_CONVENTION)?);
    if is_absent(conventions.get("ignored")) {
        let ignored = match legacy_ignored {
            Some(ignored) => ignored,
            None => Value::Matcher(Matcher::AnyOf(
                IGNORED_CONVENTIONS
                    .into_iter()
                    .map(Matcher::pattern)
                    .collect::<Result<_>>()?,
            )),
        };
        conventions.insert("ignored".to_string(), ignored);
    }
    set_default(conventions, "vendor", Matcher::pattern(VENDOR_CONVENTION)?);
    Ok(())
}

fn is_absent(value: Option<&Value>) -> bool {
    value.is_none_or(Value::is_null)
}

fn set_default(map: &mut Map, key: &str, value: impl Into<Value>) {
    if is_absent(map.get(key)) {
        map.insert(key.to_string(), value.into());
    }
}

/// Returns the map stored at `key`, creating it when absent.
fn section<'a>(map: &'a mut Map, key: &str) -> Result<&'a mut Map> {
    let slot = map.entry(key.to_string()).or_insert_with(Value::map);
    if slot.is_null() {
        *slot = Value::map();
    }
    let kind = slot.kind();
    slot.as_map_mut()
        .ok_or_else(|| ConfigError::invalid_value(key, format!("expected a map, got {kind}")))
}

//! Join configuration compiler.
//!
//! `files.<type>.joinTo` says which source files end up in which output
//! bundle. It may be a single destination (every file of the type joins it)
//! or a map of destination to matcher. Compilation turns both forms into one
//! ordered map of destination to [`Matcher`] per type and picks the
//! destinations that host plugin helper code.

use indexmap::IndexMap;

use crate::error::{ConfigError, Result};
use crate::matcher::Matcher;
use crate::value::Value;

/// Probe path used to find the bundle that library-origin files land in.
pub const VENDOR_PROBE: &str = "vendor/.";

/// Compiled join rules for every file type.
#[derive(Debug, Clone, Default)]
pub struct JoinConfig {
    types: IndexMap<String, TypeJoin>,
}

/// Compiled join rules for a single file type.
#[derive(Debug, Clone, Default)]
pub struct TypeJoin {
    destinations: IndexMap<String, Matcher>,
    plugin_helpers: Vec<String>,
}

impl JoinConfig {
    /// Compiles the `files` section of a config.
    pub fn compile(files: &Value) -> Result<Self> {
        let specs = files.as_map().ok_or(ConfigError::MissingFiles)?;
        let types = specs
            .iter()
            .map(|(name, spec)| TypeJoin::compile(name, spec).map(|join| (name.clone(), join)))
            .collect::<Result<_>>()?;
        Ok(Self { types })
    }

    pub fn get(&self, file_type: &str) -> Option<&TypeJoin> {
        self.types.get(file_type)
    }

    pub fn types(&self) -> impl Iterator<Item = (&str, &TypeJoin)> {
        self.types.iter().map(|(name, join)| (name.as_str(), join))
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Every destination of `file_type` that `path` joins. A path may join
    /// several destinations.
    pub fn destinations_for(&self, file_type: &str, path: &str) -> Vec<&str> {
        self.get(file_type)
            .map(|join| join.destinations_for(path))
            .unwrap_or_default()
    }

    pub(crate) fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.types
                .iter()
                .map(|(name, join)| (name.clone(), join.to_json()))
                .collect(),
        )
    }
}

impl TypeJoin {
    fn compile(file_type: &str, spec: &Value) -> Result<Self> {
        let field = format!("files.{file_type}");
        if !spec.is_map() {
            return Err(ConfigError::invalid_value(
                field,
                format!("expected a map with a `joinTo` key, got {}", spec.kind()),
            ));
        }

        let destinations: IndexMap<String, Matcher> = match spec.get("joinTo") {
            None | Some(Value::Null) => IndexMap::new(),
            Some(Value::String(destination)) => {
                IndexMap::from([(destination.clone(), Matcher::any_path())])
            }
            Some(Value::Map(rules)) => rules
                .iter()
                .map(|(destination, matcher)| {
                    Matcher::from_value(matcher, &format!("{field}.joinTo.{destination}"))
                        .map(|matcher| (destination.clone(), matcher))
                })
                .collect::<Result<_>>()?,
            Some(other) => {
                return Err(ConfigError::invalid_value(
                    format!("{field}.joinTo"),
                    format!("expected a destination or a map of destinations, got {}", other.kind()),
                ));
            }
        };

        let plugin_helpers = match spec.get("pluginHelpers") {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        ConfigError::invalid_value(
                            format!("{field}.pluginHelpers"),
                            "expected a list of destination paths",
                        )
                    })
                })
                .collect::<Result<_>>()?,
            Some(Value::String(helper)) if !helper.is_empty() => vec![helper.clone()],
            _ => default_plugin_helpers(&destinations),
        };

        Ok(Self {
            destinations,
            plugin_helpers,
        })
    }

    pub fn destinations(&self) -> impl Iterator<Item = (&str, &Matcher)> {
        self.destinations
            .iter()
            .map(|(destination, matcher)| (destination.as_str(), matcher))
    }

    pub fn matcher(&self, destination: &str) -> Option<&Matcher> {
        self.destinations.get(destination)
    }

    /// Whether `path` joins `destination`.
    pub fn matches(&self, destination: &str, path: &str) -> bool {
        self.matcher(destination).is_some_and(|m| m.matches(path))
    }

    pub fn destinations_for(&self, path: &str) -> Vec<&str> {
        self.destinations
            .iter()
            .filter(|(_, matcher)| matcher.matches(path))
            .map(|(destination, _)| destination.as_str())
            .collect()
    }

    pub fn plugin_helpers(&self) -> &[String] {
        &self.plugin_helpers
    }

    fn to_json(&self) -> serde_json::Value {
        let mut map: serde_json::Map<String, serde_json::Value> = self
            .destinations
            .iter()
            .map(|(destination, matcher)| (destination.clone(), matcher.to_json()))
            .collect();
        map.insert(
            "pluginHelpers".into(),
            serde_json::Value::from(self.plugin_helpers.clone()),
        );
        serde_json::Value::Object(map)
    }
}

/// Picks the plugin helper destination: the first one that accepts the
/// vendor probe, else the first whose name mentions "vendor", else the first
/// destination overall.
fn default_plugin_helpers(destinations: &IndexMap<String, Matcher>) -> Vec<String> {
    let by_probe = destinations
        .iter()
        .find(|(_, matcher)| matcher.matches(VENDOR_PROBE))
        .map(|(destination, _)| destination);
    let by_name = || {
        destinations
            .keys()
            .find(|destination| destination.to_ascii_lowercase().contains("vendor"))
    };

    by_probe
        .or_else(by_name)
        .or_else(|| destinations.keys().next())
        .map(|destination| vec![destination.clone()])
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn compile(files: serde_json::Value) -> JoinConfig {
        JoinConfig::compile(&Value::from(files)).unwrap()
    }

    #[test]
    fn missing_join_to_compiles_to_no_destinations() {
        let join = compile(json!({ "templates": {} }));
        let templates = join.get("templates").unwrap();
        assert_eq!(templates.destinations().count(), 0);
        assert!(templates.plugin_helpers().is_empty());
    }

    #[test]
    fn non_map_type_spec_is_rejected() {
        let err = JoinConfig::compile(&Value::from(json!({ "javascripts": "app.js" }))).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "files.javascripts"));
    }

    #[test]
    fn files_must_be_a_map() {
        assert!(matches!(
            JoinConfig::compile(&Value::Null),
            Err(ConfigError::MissingFiles)
        ));
    }

    #[test]
    fn explicit_plugin_helpers_win() {
        let join = compile(json!({
            "javascripts": {
                "joinTo": { "app.js": "^app", "vendor.js": "^vendor" },
                "pluginHelpers": "app.js"
            }
        }));
        assert_eq!(join.get("javascripts").unwrap().plugin_helpers(), ["app.js"]);
    }

    #[test]
    fn destination_order_is_preserved() {
        let join = compile(json!({
            "javascripts": { "joinTo": { "z.js": "z", "a.js": "a", "m.js": "m" } }
        }));
        let names: Vec<_> = join
            .get("javascripts")
            .unwrap()
            .destinations()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["z.js", "a.js", "m.js"]);
    }
}

//! Environment overrides.
//!
//! A config carries named override blocks under `overrides`. Resolving for a
//! list of environments layers those blocks over the base tree in order, so
//! later environments win. Before the first block is applied the object-valued
//! top-level fields are snapshotted into `overrides._default`, which keeps the
//! pre-override values addressable as an environment of their own.

use tracing::debug;

use crate::merge::{merge_into, MergeExclusions};
use crate::value::{Map, Value};

pub const OVERRIDES_KEY: &str = "overrides";
pub const DEFAULT_OVERRIDE: &str = "_default";

/// Builds the ordered environment stack. A process-wide environment name, even
/// an empty one, is placed first so explicitly requested environments still
/// win over it.
pub fn environment_stack(explicit: &[String], process_env: Option<&str>) -> Vec<String> {
    process_env
        .map(str::to_string)
        .into_iter()
        .chain(explicit.iter().cloned())
        .collect()
}

/// Applies the override blocks named by `environments` to `config`.
pub fn apply_overrides(config: &Value, environments: &[String]) -> Value {
    let mut config = config.clone();
    apply_overrides_in_place(&mut config, environments);
    config
}

pub(crate) fn apply_overrides_in_place(config: &mut Value, environments: &[String]) {
    if environments.is_empty() {
        return;
    }
    snapshot_defaults(config);

    for name in environments {
        let stored = config
            .pointer(&[OVERRIDES_KEY, name.as_str()])
            .filter(|block| block.is_map())
            .cloned();
        let is_stored = stored.is_some();
        let block = reconcile_plugin_lists(config, stored.unwrap_or_else(Value::map));
        // The reconciled lists stay on the stored block, so re-applying an
        // environment extends them again.
        if is_stored {
            store_override(config, name, block.clone());
        }
        let exclusions = MergeExclusions::children_of(config, "files");
        debug!(environment = %name, "applying config override");
        merge_into(config, &block, &exclusions);
    }
}

fn store_override(config: &mut Value, name: &str, block: Value) {
    if let Some(overrides) = config
        .as_map_mut()
        .and_then(|root| root.get_mut(OVERRIDES_KEY))
        .and_then(Value::as_map_mut)
    {
        overrides.insert(name.to_string(), block);
    }
}

fn snapshot_defaults(config: &mut Value) {
    let Some(root) = config.as_map() else {
        return;
    };
    if !root.contains_key(OVERRIDES_KEY) {
        return;
    }
    let snapshot: Map = root
        .iter()
        .filter(|(key, value)| key.as_str() != OVERRIDES_KEY && value.is_map())
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    if let Some(overrides) = config
        .as_map_mut()
        .and_then(|root| root.get_mut(OVERRIDES_KEY))
        .and_then(Value::as_map_mut)
    {
        overrides.insert(DEFAULT_OVERRIDE.to_string(), Value::Map(snapshot));
    }
}

/// Carries the base config's plugin `on`/`off` decisions into an override
/// block. For each key whose base list is non-empty, the override's list for
/// that key is extended with every base entry the override does not list
/// under the opposite key. Entries the override names come first. `off` is
/// extended before `on`, so `on` is filtered against the extended `off`.
fn reconcile_plugin_lists(config: &Value, mut block: Value) -> Value {
    const PAIRS: [(&str, &str); 2] = [("off", "on"), ("on", "off")];

    if !block.is_map() {
        return block;
    }
    for (list, opposite) in PAIRS {
        let base = plugin_list(config.pointer(&["plugins", list]));
        if base.is_empty() {
            continue;
        }
        let Some(block_map) = block.as_map_mut() else {
            continue;
        };
        let plugins = block_map
            .entry("plugins".to_string())
            .or_insert_with(Value::map);
        if !plugins.is_map() {
            *plugins = Value::map();
        }
        let Some(plugins) = plugins.as_map_mut() else {
            continue;
        };

        let excluded = plugin_list(plugins.get(opposite));
        let mut merged = plugin_list(plugins.get(list));
        merged.extend(base.into_iter().filter(|plugin| !excluded.contains(plugin)));
        plugins.insert(list.to_string(), Value::Array(merged));
    }
    block
}

fn plugin_list(value: Option<&Value>) -> Vec<Value> {
    match value {
        Some(Value::Array(items)) => items.clone(),
        Some(single @ Value::String(s)) if !s.is_empty() => vec![single.clone()],
        _ => Vec::new(),
    }
}

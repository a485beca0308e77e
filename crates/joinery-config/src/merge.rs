//! Recursive config merging.
//!
//! Maps merge key by key; every other value (arrays, matchers, functions,
//! scalars) replaces whatever was there. Subtrees listed in
//! [`MergeExclusions`] are not descended into: the children of an excluded
//! path are assigned wholesale, which keeps user join specs intact when an
//! override block supplies a new one.

use std::collections::HashSet;

use crate::value::{Map, Value};

/// Key paths whose children must be replaced rather than merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeExclusions {
    paths: HashSet<Vec<String>>,
}

impl MergeExclusions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path<I, S>(mut self, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(path);
        self
    }

    pub fn insert<I, S>(&mut self, path: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.paths.insert(path.into_iter().map(Into::into).collect());
    }

    /// Excludes every direct child of `key` present in `config`, e.g. each
    /// `files.<type>` entry.
    pub fn children_of(config: &Value, key: &str) -> Self {
        let mut exclusions = Self::new();
        if let Some(children) = config.get(key).and_then(Value::as_map) {
            for child in children.keys() {
                exclusions.insert([key, child.as_str()]);
            }
        }
        exclusions
    }

    pub fn contains(&self, path: &[String]) -> bool {
        self.paths.contains(path)
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Merges `source` over `target` and returns the result; neither input is
/// modified.
pub fn merge(target: &Value, source: &Value, exclusions: &MergeExclusions) -> Value {
    let mut merged = target.clone();
    merge_into(&mut merged, source, exclusions);
    merged
}

/// In-place variant of [`merge`] for staged builders that own their tree.
pub fn merge_into(target: &mut Value, source: &Value, exclusions: &MergeExclusions) {
    let Value::Map(source_map) = source else {
        *target = source.clone();
        return;
    };
    if !target.is_map() {
        *target = Value::map();
    }
    if let Value::Map(target_map) = target {
        merge_maps(target_map, source_map, &mut Vec::new(), exclusions);
    }
}

fn merge_maps(
    target: &mut Map,
    source: &Map,
    path: &mut Vec<String>,
    exclusions: &MergeExclusions,
) {
    let excluded = exclusions.contains(path);
    for (key, value) in source {
        match value {
            Value::Map(nested) if !excluded => {
                let slot = target.entry(key.clone()).or_insert_with(Value::map);
                if !slot.is_map() {
                    *slot = Value::map();
                }
                if let Value::Map(slot_map) = slot {
                    path.push(key.clone());
                    merge_maps(slot_map, nested, path, exclusions);
                    path.pop();
                }
            }
            _ => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn v(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    #[test]
    fn nested_maps_merge_key_by_key() {
        let target = v(json!({ "server": { "port": 3333, "run": false } }));
        let source = v(json!({ "server": { "run": true } }));
        let merged = merge(&target, &source, &MergeExclusions::new());
        assert_eq!(
            merged.to_json(),
            json!({ "server": { "port": 3333, "run": true } })
        );
    }

    #[test]
    fn arrays_are_atomic() {
        let target = v(json!({ "paths": { "watched": ["app", "test", "vendor"] } }));
        let source = v(json!({ "paths": { "watched": ["src"] } }));
        let merged = merge(&target, &source, &MergeExclusions::new());
        assert_eq!(merged.to_json(), json!({ "paths": { "watched": ["src"] } }));
    }

    #[test]
    fn inputs_are_left_untouched() {
        let target = v(json!({ "a": { "b": 1 } }));
        let source = v(json!({ "a": { "c": 2 } }));
        let _ = merge(&target, &source, &MergeExclusions::new());
        assert_eq!(target.to_json(), json!({ "a": { "b": 1 } }));
    }

    #[test]
    fn excluded_subtrees_are_replaced_wholesale() {
        let target = v(json!({
            "files": {
                "javascripts": { "joinTo": { "app.js": "^app", "vendor.js": "^vendor" } }
            }
        }));
        let source = v(json!({
            "files": { "javascripts": { "joinTo": { "all.js": ".*" } } }
        }));
        let exclusions = MergeExclusions::children_of(&target, "files");
        let merged = merge(&target, &source, &exclusions);
        assert_eq!(
            merged.to_json(),
            json!({ "files": { "javascripts": { "joinTo": { "all.js": ".*" } } } })
        );
    }

    #[test]
    fn scalar_slots_become_maps_when_merged_with_maps() {
        let target = v(json!({ "npm": false }));
        let source = v(json!({ "npm": { "enabled": true } }));
        let merged = merge(&target, &source, &MergeExclusions::new());
        assert_eq!(merged.to_json(), json!({ "npm": { "enabled": true } }));
    }

    #[test]
    fn non_map_source_overwrites() {
        let merged = merge(&v(json!({ "a": 1 })), &v(json!(5)), &MergeExclusions::new());
        assert_eq!(merged.to_json(), json!(5));
    }
}

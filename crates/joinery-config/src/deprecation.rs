//! Warnings for config fields that were moved or removed.

use tracing::warn;

use crate::value::{Map, Value};

/// Receives deprecation messages. Fire and forget.
pub trait WarningSink {
    fn warn(&self, message: &str);
}

impl<F: Fn(&str)> WarningSink for F {
    fn warn(&self, message: &str) {
        self(message)
    }
}

/// Default sink: emits each message through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingWarnings;

impl WarningSink for TracingWarnings {
    fn warn(&self, message: &str) {
        warn!("{message}");
    }
}

/// Lists a message for every legacy field present in `config`.
pub fn deprecation_messages(config: &Map) -> Vec<String> {
    let empty = Value::Null;
    let paths = config.get("paths").unwrap_or(&empty);
    let mut messages = Vec::new();

    for name in ["app", "test", "vendor", "assets"] {
        if paths.get(name).is_some_and(Value::is_truthy) {
            messages.push(format!(
                "config.paths.{name} was removed, use config.paths.watched"
            ));
        }
    }

    let moved = [
        (paths.get("ignored"), "paths.ignored", "conventions.ignored"),
        (config.get("rootPath"), "rootPath", "paths.root"),
        (config.get("buildPath"), "buildPath", "paths.public"),
    ];
    for (value, from, to) in moved {
        if value.is_some_and(Value::is_truthy) {
            messages.push(format!("config.{from} moved to config.{to}"));
        }
    }

    for name in ["assets", "test", "vendor"] {
        if matches!(paths.get(name), Some(Value::Array(_))) {
            messages.push(format!(
                "config.paths.{name} can't be an array. Use config.conventions.{name}"
            ));
        }
    }

    messages
}

/// Sends every deprecation message for `config` to `sink`.
pub fn warn_deprecations(config: &Map, sink: &dyn WarningSink) -> usize {
    let messages = deprecation_messages(config);
    for message in &messages {
        sink.warn(message);
    }
    messages.len()
}

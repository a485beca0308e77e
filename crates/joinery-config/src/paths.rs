//! Path separator handling.
//!
//! Users write join specs with forward slashes. When the tool runs on a
//! backslash platform the destination keys and `order` lists are rewritten so
//! they compare equal to the paths the watcher reports. The style is passed in
//! explicitly rather than sniffed from the host, which keeps resolution
//! deterministic in tests.

use path_clean::PathClean;
use std::path::Path;

use crate::value::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathStyle {
    #[default]
    Posix,
    Windows,
}

impl PathStyle {
    /// The convention of the platform this binary was built for.
    pub fn host() -> Self {
        if cfg!(windows) {
            PathStyle::Windows
        } else {
            PathStyle::Posix
        }
    }

    pub fn separator(self) -> char {
        match self {
            PathStyle::Posix => '/',
            PathStyle::Windows => '\\',
        }
    }

    /// Rewrites forward slashes into this style's separator.
    pub fn to_native(self, path: &str) -> String {
        match self {
            PathStyle::Posix => path.to_string(),
            PathStyle::Windows => path.replace('/', "\\"),
        }
    }

    /// Joins `name` onto `base` and collapses `.` and `..` segments.
    pub fn join(self, base: &str, name: &str) -> String {
        let base = base.replace('\\', "/");
        let name = name.replace('\\', "/");
        let cleaned = Path::new(&base).join(name).clean();
        let joined = cleaned.to_string_lossy().replace('\\', "/");
        self.to_native(&joined)
    }
}

/// Rewrites join destinations and `order` entries under `files` to the given
/// style. A no-op for [`PathStyle::Posix`].
pub fn normalize_separators(config: &Value, style: PathStyle) -> Value {
    let mut config = config.clone();
    normalize_separators_in_place(&mut config, style);
    config
}

pub(crate) fn normalize_separators_in_place(config: &mut Value, style: PathStyle) {
    if style == PathStyle::Posix {
        return;
    }
    let Some(files) = config
        .as_map_mut()
        .and_then(|root| root.get_mut("files"))
        .and_then(Value::as_map_mut)
    else {
        return;
    };

    for spec in files.values_mut().filter_map(Value::as_map_mut) {
        if let Some(order) = spec.get_mut("order").and_then(Value::as_map_mut) {
            for list in order.values_mut() {
                if let Value::Array(items) = list {
                    for item in items.iter_mut() {
                        if let Value::String(path) = item {
                            *path = style.to_native(path);
                        }
                    }
                }
            }
        }

        match spec.get_mut("joinTo") {
            Some(Value::String(destination)) => {
                *destination = style.to_native(destination);
            }
            Some(Value::Map(destinations)) => {
                let renamed: Map = std::mem::take(destinations)
                    .into_iter()
                    .map(|(key, matcher)| (style.to_native(&key), matcher))
                    .collect();
                *destinations = renamed;
            }
            _ => {}
        }
    }
}

//! File matchers.
//!
//! Join destinations and conventions accept several matcher shapes. They are
//! normalized once into `Matcher`, which answers a single question: does this
//! path belong?

use std::fmt;
use std::sync::Arc;

use globset::{Glob, GlobSet, GlobSetBuilder};
use regex::Regex;

use crate::error::{ConfigError, Result};
use crate::value::Value;

type PredicateFn = dyn Fn(&str) -> bool + Send + Sync;

#[derive(Clone)]
pub enum Matcher {
    /// Regular expression tested against the whole path string.
    Pattern(Regex),
    /// Caller-supplied predicate.
    Predicate(Arc<PredicateFn>),
    /// Inclusion list of paths, directories or globs.
    FragmentSet(FragmentSet),
    /// Matches when any inner matcher does.
    AnyOf(Vec<Matcher>),
}

impl Matcher {
    /// Compiles a regular expression matcher.
    pub fn pattern(source: &str) -> Result<Self> {
        Regex::new(source)
            .map(Matcher::Pattern)
            .map_err(|err| ConfigError::invalid_matcher(source, err.to_string()))
    }

    pub fn predicate(f: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        Matcher::Predicate(Arc::new(f))
    }

    pub fn fragments<I, S>(fragments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FragmentSet::new(fragments).map(Matcher::FragmentSet)
    }

    /// Matches every non-empty path.
    pub fn any_path() -> Self {
        Matcher::predicate(|path| !path.is_empty())
    }

    /// Normalizes a config value into a matcher. `field` names the value in
    /// error messages.
    pub fn from_value(value: &Value, field: &str) -> Result<Self> {
        match value {
            Value::Matcher(matcher) => Ok(matcher.clone()),
            Value::String(source) => Regex::new(source)
                .map(Matcher::Pattern)
                .map_err(|err| ConfigError::invalid_matcher(field, err.to_string())),
            Value::Array(items) => {
                if let Some(strings) = items
                    .iter()
                    .map(Value::as_str)
                    .collect::<Option<Vec<_>>>()
                {
                    return FragmentSet::new(strings).map(Matcher::FragmentSet);
                }
                items
                    .iter()
                    .map(|item| Matcher::from_value(item, field))
                    .collect::<Result<Vec<_>>>()
                    .map(Matcher::AnyOf)
            }
            Value::Map(map) => match map.get("pattern").and_then(Value::as_str) {
                Some(source) => Matcher::from_value(&Value::from(source), field),
                None => Err(ConfigError::invalid_matcher(
                    field,
                    "a table matcher needs a `pattern` key",
                )),
            },
            other => Err(ConfigError::invalid_matcher(
                field,
                format!(
                    "expected a pattern, a list of paths or a predicate, got {}",
                    other.kind()
                ),
            )),
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            Matcher::Pattern(re) => re.is_match(path),
            Matcher::Predicate(f) => f(path),
            Matcher::FragmentSet(set) => set.matches(path),
            Matcher::AnyOf(matchers) => matchers.iter().any(|m| m.matches(path)),
        }
    }

    pub(crate) fn to_json(&self) -> serde_json::Value {
        match self {
            Matcher::Pattern(re) => serde_json::Value::String(format!("/{}/", re.as_str())),
            Matcher::Predicate(_) => serde_json::Value::String("[function]".into()),
            Matcher::FragmentSet(set) => serde_json::Value::Array(
                set.fragments
                    .iter()
                    .cloned()
                    .map(serde_json::Value::String)
                    .collect(),
            ),
            Matcher::AnyOf(matchers) => {
                serde_json::Value::Array(matchers.iter().map(Matcher::to_json).collect())
            }
        }
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Pattern(re) => write!(f, "Pattern(/{}/)", re.as_str()),
            Matcher::Predicate(_) => f.write_str("Predicate(..)"),
            Matcher::FragmentSet(set) => write!(f, "FragmentSet({:?})", set.fragments),
            Matcher::AnyOf(matchers) => f.debug_tuple("AnyOf").field(matchers).finish(),
        }
    }
}

impl PartialEq for Matcher {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Matcher::Pattern(a), Matcher::Pattern(b)) => a.as_str() == b.as_str(),
            (Matcher::Predicate(a), Matcher::Predicate(b)) => Arc::ptr_eq(a, b),
            (Matcher::FragmentSet(a), Matcher::FragmentSet(b)) => a.fragments == b.fragments,
            (Matcher::AnyOf(a), Matcher::AnyOf(b)) => a == b,
            _ => false,
        }
    }
}

/// A list of path fragments. A path matches a fragment when it is equal to
/// it, lies inside it as a directory, or matches it as a glob.
#[derive(Clone)]
pub struct FragmentSet {
    fragments: Vec<String>,
    globs: GlobSet,
}

impl FragmentSet {
    pub fn new<I, S>(fragments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fragments: Vec<String> = fragments.into_iter().map(Into::into).collect();
        let mut builder = GlobSetBuilder::new();
        for fragment in fragments.iter().filter(|f| is_glob(f)) {
            let glob = Glob::new(fragment)
                .map_err(|err| ConfigError::invalid_matcher(fragment.as_str(), err.to_string()))?;
            builder.add(glob);
        }
        let globs = builder
            .build()
            .map_err(|err| ConfigError::invalid_matcher("fragments", err.to_string()))?;
        Ok(Self { fragments, globs })
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    pub fn matches(&self, path: &str) -> bool {
        self.fragments.iter().any(|fragment| contains(fragment, path)) || self.globs.is_match(path)
    }
}

fn contains(fragment: &str, path: &str) -> bool {
    if path == fragment {
        return true;
    }
    let dir = fragment.trim_end_matches(['/', '\\']);
    !dir.is_empty()
        && path
            .strip_prefix(dir)
            .is_some_and(|rest| rest.starts_with(['/', '\\']))
}

fn is_glob(fragment: &str) -> bool {
    fragment.contains(['*', '?', '[', '{'])
}

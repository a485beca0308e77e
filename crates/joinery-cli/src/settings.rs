//! Process-level settings read from `JOINERY_*` environment variables.
//!
//! | Variable         | Setting                                   |
//! |------------------|-------------------------------------------|
//! | `JOINERY_ENV`    | environment applied before `--env` values |
//! | `JOINERY_CONFIG` | config file used when `--config` is unset |

use std::path::PathBuf;

use figment::{
    providers::{Env, Serialized},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{CliError, Result};

const ENV_PREFIX: &str = "JOINERY_";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Process-wide environment name.
    #[serde(default)]
    pub env: Option<String>,
    /// Config file path.
    #[serde(default)]
    pub config: Option<PathBuf>,
}

impl Settings {
    /// Loads settings from the process environment.
    pub fn load() -> Result<Self> {
        Self::from_figment(Self::figment())
    }

    /// Defaults with `JOINERY_*` variables layered on top.
    pub fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let settings: Settings = figment.extract().map_err(|e| CliError::Settings {
            message: e.to_string(),
        })?;
        // An empty variable means "unset".
        Ok(Settings {
            env: settings.env.filter(|env| !env.is_empty()),
            config: settings.config.filter(|path| !path.as_os_str().is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_empty() {
        let settings =
            Settings::from_figment(Figment::new().merge(Serialized::defaults(Settings::default())))
                .unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn later_providers_win() {
        let figment = Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(("env", "production"))
            .merge(("config", "site/joinery-config.toml"));
        let settings = Settings::from_figment(figment).unwrap();
        assert_eq!(settings.env.as_deref(), Some("production"));
        assert_eq!(
            settings.config,
            Some(PathBuf::from("site/joinery-config.toml"))
        );
    }

    #[test]
    fn empty_values_count_as_unset() {
        let figment = Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(("env", ""));
        assert_eq!(Settings::from_figment(figment).unwrap().env, None);
    }
}

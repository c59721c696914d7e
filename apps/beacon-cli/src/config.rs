//! Application configuration
//!
//! Layered with figment: serde defaults, then an optional YAML file, then
//! `BEACON_`-prefixed environment variables (`__` separates nested keys, e.g.
//! `BEACON_LOGGING__LEVEL=debug`).

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Registry settings
    #[serde(default)]
    pub beacon: beacon_registry::Config,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Persist registry state to this JSON file after every batch
    #[serde(default)]
    pub state_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence
    #[serde(default = "default_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable text
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

impl AppConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new();

        if let Some(path) = path {
            if !path.exists() {
                anyhow::bail!("config file {} does not exist", path.display());
            }
            figment = figment.merge(Yaml::file(path));
        }

        figment
            .merge(Env::prefixed("BEACON_").split("__"))
            .extract()
            .context("failed to load configuration")
    }
}

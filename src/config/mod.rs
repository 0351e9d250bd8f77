// ABOUTME: Configuration types and parsing for lister.yml.
// ABOUTME: Per-kind default formats, discovered from the working directory or named explicitly.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "lister.yml";
pub const CONFIG_FILENAME_ALT: &str = "lister.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".lister/config.yml";

/// Environment variable naming a configuration file, bypassing discovery.
pub const CONFIG_ENV_VAR: &str = "LISTER_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Format used for a kind when none is requested, e.g.
    /// `network: "table {{.ID}}\t{{.Name}}"`.
    #[serde(default)]
    pub formats: HashMap<String, String>,
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document is a valid, empty configuration.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&content)?;
        tracing::debug!(path = %path.display(), kinds = config.formats.len(), "loaded configuration");
        Ok(config)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// Configuration for one invocation.
    ///
    /// An explicit path wins, then `LISTER_CONFIG`, then discovery in `dir`.
    /// Only discovery may come up empty, in which case defaults apply.
    pub fn locate(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR).filter(|v| !v.is_empty()) {
            return Self::load(&PathBuf::from(path));
        }
        match Self::discover(dir) {
            Err(Error::ConfigNotFound(dir)) => {
                tracing::debug!(dir = %dir.display(), "no configuration file, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Configured default format for `kind`.
    pub fn format(&self, kind: &str) -> Option<&str> {
        self.formats.get(kind).map(String::as_str)
    }
}

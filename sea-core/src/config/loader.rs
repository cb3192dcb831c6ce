//! Configuration loader

use crate::config::ConfigStore;
use crate::error::{Error, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Environment variables starting with this prefix override config keys
pub const ENV_OVERRIDE_PREFIX: &str = "SEA_CONFIG_";

/// Directory below the application root holding configuration files
const CONFIG_DIR: &str = "configs";

/// Configuration loader for various formats
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<BTreeMap<String, Value>> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match ext {
            "json" => Self::from_json(&content),
            "toml" => Self::from_toml(&content),
            _ => Err(Error::Config(format!("Unknown config format: {}", ext))),
        }
    }

    /// Parse JSON configuration
    pub fn from_json(content: &str) -> Result<BTreeMap<String, Value>> {
        serde_json::from_str(content).map_err(|e| Error::Config(format!("Invalid JSON: {}", e)))
    }

    /// Parse TOML configuration
    pub fn from_toml(content: &str) -> Result<BTreeMap<String, Value>> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }

    /// Load `configs/default.*` and then `configs/<env>.*` below `root`.
    ///
    /// Missing files are skipped; keys from the environment file override
    /// the defaults.
    pub fn load_env_dir(root: &Path, env: &str) -> Result<ConfigStore> {
        let dir = root.join(CONFIG_DIR);
        let store = ConfigStore::new();

        for stem in ["default", env] {
            for ext in ["toml", "json"] {
                let path = dir.join(format!("{stem}.{ext}"));
                if path.is_file() {
                    tracing::debug!("Loading config file: {}", path.display());
                    store.merge(Self::load(&path)?);
                }
            }
        }

        Ok(store)
    }

    /// Apply `SEA_CONFIG_<KEY>` overrides from the process environment
    pub fn apply_env_overrides(store: &ConfigStore) {
        Self::apply_overrides(store, std::env::vars());
    }

    /// Apply overrides from `(name, value)` pairs. Values are parsed as JSON
    /// when possible (`42`, `true`, `[1, 2]`) and kept as strings otherwise.
    pub fn apply_overrides<I>(store: &ConfigStore, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let overrides: BTreeMap<String, Value> = vars
            .into_iter()
            .filter_map(|(name, raw)| {
                let key = name.strip_prefix(ENV_OVERRIDE_PREFIX)?;
                if key.is_empty() {
                    return None;
                }
                let value = serde_json::from_str(&raw).unwrap_or(Value::String(raw));
                Some((key.to_string(), value))
            })
            .collect();

        if !overrides.is_empty() {
            tracing::debug!("Applying {} config overrides from environment", overrides.len());
            store.merge(overrides);
        }
    }
}

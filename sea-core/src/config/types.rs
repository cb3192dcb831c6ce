//! Configuration type definitions
//!
//! Typed view over the framework-level keys of a [`ConfigStore`].

use crate::config::ConfigStore;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Settings the runner itself reads from the application config
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct AppSettings {
    /// Extra plugin manifests
    #[serde(default, rename = "PLUGIN_MANIFESTS")]
    pub plugin_manifests: Vec<PathBuf>,

    /// Log filter directive
    #[serde(default, rename = "LOG_LEVEL")]
    pub log_level: Option<String>,
}

impl AppSettings {
    /// Read the settings from `store`. Missing keys fall back to defaults;
    /// keys with the wrong shape are a configuration error. Application keys
    /// are ignored.
    pub fn from_store(store: &ConfigStore) -> Result<Self> {
        let snapshot = serde_json::to_value(store.snapshot())?;
        serde_json::from_value(snapshot).map_err(|e| Error::Config(format!("Invalid app settings: {}", e)))
    }
}

//! Plugin loader
//!
//! Enumerates job-provider entry points, loads each one and merges what it
//! contributes into the registry. A broken plugin only loses its own jobs:
//! every failure is logged once and the loader moves on to the next entry.

use crate::JOB_PROVIDER_CATEGORY;
use crate::outcome::panic_message;
use crate::registry::{JobDescriptor, JobRegistry, JobSource};
use crate::traits::{Contribution, EntryPoint, ProviderSource};
use sea_core::Result;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// What happened to one entry point (or one source that failed to enumerate)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginLoadOutcome {
    /// Loaded; lists the job names it registered
    Ok { jobs: Vec<String> },
    /// Loading or registering failed with this cause
    LoadFailed(String),
}

/// Diagnostic record for one plugin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginLoadResult {
    pub plugin_name: String,
    pub outcome: PluginLoadOutcome,
}

impl PluginLoadResult {
    pub fn is_ok(&self) -> bool {
        matches!(self.outcome, PluginLoadOutcome::Ok { .. })
    }
}

/// Loads job providers from a list of sources, in order
pub struct PluginLoader {
    sources: Vec<Box<dyn ProviderSource>>,
}

impl PluginLoader {
    pub fn new(sources: Vec<Box<dyn ProviderSource>>) -> Self {
        Self { sources }
    }

    /// Load every entry point of every source into `registry`.
    ///
    /// Never fails; per-plugin errors are logged and reported in the
    /// returned diagnostics.
    pub fn load_into(&self, registry: &JobRegistry) -> Vec<PluginLoadResult> {
        let mut results = Vec::new();

        for source in &self.sources {
            let enumerated = panic::catch_unwind(AssertUnwindSafe(|| source.enumerate(JOB_PROVIDER_CATEGORY)))
                .unwrap_or_else(|payload| Err(sea_core::Error::Plugin(panic_message(payload.as_ref()))));

            let entries = match enumerated {
                Ok(entries) => entries,
                Err(e) => {
                    results.push(Self::failed(source.name(), e.to_string()));
                    continue;
                }
            };

            tracing::debug!("Found {} job providers in {}", entries.len(), source.name());
            for entry in entries {
                results.push(Self::load_entry(entry.as_ref(), registry));
            }
        }

        let failed = results.iter().filter(|r| !r.is_ok()).count();
        if !results.is_empty() {
            tracing::debug!("Plugin discovery finished: {} loaded, {} failed", results.len() - failed, failed);
        }
        results
    }

    fn load_entry(entry: &dyn EntryPoint, registry: &JobRegistry) -> PluginLoadResult {
        let plugin_name = entry.name().to_string();

        let loaded = panic::catch_unwind(AssertUnwindSafe(|| entry.load()))
            .unwrap_or_else(|payload| Err(sea_core::Error::Plugin(panic_message(payload.as_ref()))));

        let registered = loaded.and_then(|contribution| Self::register(&plugin_name, contribution, registry));

        match registered {
            Ok(jobs) => {
                tracing::info!("Loaded plugin '{}' with jobs: {}", plugin_name, jobs.join(", "));
                PluginLoadResult {
                    plugin_name,
                    outcome: PluginLoadOutcome::Ok { jobs },
                }
            }
            Err(e) => Self::failed(&plugin_name, e.to_string()),
        }
    }

    /// Register everything `contribution` provides. Names are checked
    /// before anything is inserted so a bad contribution registers nothing.
    fn register(plugin_name: &str, contribution: Contribution, registry: &JobRegistry) -> Result<Vec<String>> {
        let descriptors = match contribution {
            Contribution::Handler(handler) => vec![JobDescriptor::new(plugin_name, handler)],
            Contribution::Jobs(jobs) => jobs,
        };

        if let Some(bad) = descriptors.iter().find(|d| d.name.trim().is_empty()) {
            return Err(sea_core::Error::InvalidJobName(bad.name.clone()));
        }

        let mut names = Vec::with_capacity(descriptors.len());
        for mut descriptor in descriptors {
            descriptor.source = JobSource::Plugin;
            descriptor.origin_plugin = Some(plugin_name.to_string());
            names.push(descriptor.name.clone());
            registry.insert(descriptor)?;
        }
        Ok(names)
    }

    fn failed(plugin_name: &str, cause: String) -> PluginLoadResult {
        tracing::error!("error has occurred during pkg loading: {}", cause);
        PluginLoadResult {
            plugin_name: plugin_name.to_string(),
            outcome: PluginLoadOutcome::LoadFailed(cause),
        }
    }
}

/// In-memory provider source
#[derive(Default)]
pub struct StaticSource {
    entries: Vec<(String, Arc<dyn EntryPoint>)>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry under the job-provider category
    pub fn with_entry(self, entry: Arc<dyn EntryPoint>) -> Self {
        self.with_category_entry(JOB_PROVIDER_CATEGORY, entry)
    }

    /// Add an entry under `category`
    pub fn with_category_entry(mut self, category: impl Into<String>, entry: Arc<dyn EntryPoint>) -> Self {
        self.entries.push((category.into(), entry));
        self
    }
}

impl ProviderSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    fn enumerate(&self, category: &str) -> Result<Vec<Arc<dyn EntryPoint>>> {
        Ok(self
            .entries
            .iter()
            .filter(|(c, _)| c == category)
            .map(|(_, entry)| entry.clone())
            .collect())
    }
}

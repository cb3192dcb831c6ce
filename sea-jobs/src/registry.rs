//! Job registry

use crate::loader::{PluginLoadResult, PluginLoader};
use crate::traits::JobHandler;
use parking_lot::{Mutex, RwLock};
use sea_core::{Error, Result};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Where a job came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobSource {
    /// Registered by the application itself
    Local,
    /// Contributed by a plugin during discovery
    Plugin,
}

impl fmt::Display for JobSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Plugin => write!(f, "plugin"),
        }
    }
}

/// A registered job
#[derive(Clone)]
pub struct JobDescriptor {
    pub name: String,
    pub handler: Arc<dyn JobHandler>,
    pub source: JobSource,
    /// Plugin that contributed the job, for plugin jobs
    pub origin_plugin: Option<String>,
    /// One-line description
    pub about: Option<String>,
}

impl fmt::Debug for JobDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobDescriptor")
            .field("name", &self.name)
            .field("source", &self.source)
            .field("origin_plugin", &self.origin_plugin)
            .field("about", &self.about)
            .finish()
    }
}

impl JobDescriptor {
    /// Descriptor for a locally registered job
    pub fn new(name: impl Into<String>, handler: Arc<dyn JobHandler>) -> Self {
        Self {
            name: name.into(),
            handler,
            source: JobSource::Local,
            origin_plugin: None,
            about: None,
        }
    }

    pub fn with_about(mut self, about: impl Into<String>) -> Self {
        self.about = Some(about.into());
        self
    }
}

/// Registry of jobs, keyed by name.
///
/// Created once per process and shared by reference. Plugin discovery runs
/// lazily on the first lookup and never more than once.
pub struct JobRegistry {
    jobs: RwLock<HashMap<String, Arc<JobDescriptor>>>,
    /// Held for the whole discovery pass; `true` once discovery has run
    loaded: Mutex<bool>,
    loader: Option<PluginLoader>,
}

impl JobRegistry {
    /// Registry without plugin discovery
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
            loaded: Mutex::new(false),
            loader: None,
        }
    }

    /// Registry that discovers plugin jobs through `loader`
    pub fn with_loader(loader: PluginLoader) -> Self {
        Self {
            loader: Some(loader),
            ..Self::new()
        }
    }

    /// Register a local job, replacing any job with the same name
    pub fn register(&self, name: impl Into<String>, handler: Arc<dyn JobHandler>) -> Result<()> {
        self.insert(JobDescriptor::new(name, handler))
    }

    /// Register a fully described job
    pub fn register_with(&self, descriptor: JobDescriptor) -> Result<()> {
        self.insert(descriptor)
    }

    pub(crate) fn insert(&self, descriptor: JobDescriptor) -> Result<()> {
        if descriptor.name.trim().is_empty() {
            return Err(Error::InvalidJobName(descriptor.name));
        }

        let name = descriptor.name.clone();
        let source = descriptor.source;
        if let Some(previous) = self.jobs.write().insert(name.clone(), Arc::new(descriptor)) {
            tracing::debug!(
                "Job '{}' ({}) replaced by {} registration",
                name,
                previous.source,
                source
            );
        } else {
            tracing::trace!("Registered {} job '{}'", source, name);
        }
        Ok(())
    }

    /// Look up a job, running plugin discovery first if it has not run yet
    pub fn resolve(&self, name: &str) -> Option<Arc<JobDescriptor>> {
        self.discover();
        self.jobs.read().get(name).cloned()
    }

    /// Run plugin discovery now. Only the first call does any work; later
    /// calls return no results.
    pub fn discover(&self) -> Vec<PluginLoadResult> {
        let mut loaded = self.loaded.lock();
        if *loaded {
            return Vec::new();
        }

        let results = match &self.loader {
            Some(loader) => loader.load_into(self),
            None => Vec::new(),
        };
        *loaded = true;
        results
    }

    /// Whether discovery has already run
    pub fn is_loaded(&self) -> bool {
        *self.loaded.lock()
    }

    /// All jobs sorted by name, after discovery
    pub fn list(&self) -> Vec<Arc<JobDescriptor>> {
        self.discover();
        let mut jobs: Vec<_> = self.jobs.read().values().cloned().collect();
        jobs.sort_by(|a, b| a.name.cmp(&b.name));
        jobs
    }

    /// Number of registered jobs, without triggering discovery
    pub fn len(&self) -> usize {
        self.jobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.read().is_empty()
    }
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::StaticSource;
    use crate::outcome::JobError;
    use crate::traits::{Contribution, EntryFn, job_fn};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn noop() -> Arc<dyn JobHandler> {
        job_fn(|_, _| Ok(()))
    }

    fn failing(message: &'static str) -> Arc<dyn JobHandler> {
        job_fn(move |_, _| Err(JobError::failure(message)))
    }

    #[test]
    fn test_register_and_resolve() {
        let registry = JobRegistry::new();
        registry.register("plusone", noop()).unwrap();

        let job = registry.resolve("plusone").unwrap();
        assert_eq!(job.name, "plusone");
        assert_eq!(job.source, JobSource::Local);
        assert!(job.origin_plugin.is_none());
        assert!(registry.resolve("config_hello").is_none());
    }

    #[test]
    fn test_last_writer_wins() {
        let registry = JobRegistry::new();
        registry.register("job", noop()).unwrap();
        registry
            .register_with(JobDescriptor::new("job", failing("second")).with_about("second"))
            .unwrap();

        let job = registry.resolve("job").unwrap();
        assert_eq!(job.about.as_deref(), Some("second"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_empty_name_rejected() {
        let registry = JobRegistry::new();
        assert!(matches!(registry.register("", noop()), Err(Error::InvalidJobName(_))));
        assert!(matches!(registry.register("  ", noop()), Err(Error::InvalidJobName(_))));
        assert!(registry.is_empty());
    }

    fn counting_loader(loads: &Arc<AtomicUsize>) -> PluginLoader {
        let loads = loads.clone();
        let source = StaticSource::new().with_entry(Arc::new(EntryFn::new("xyz", move || {
            loads.fetch_add(1, Ordering::SeqCst);
            Ok(Contribution::Handler(job_fn(|_, _| Ok(()))))
        })));
        PluginLoader::new(vec![Box::new(source)])
    }

    #[test]
    fn test_discovery_runs_once() {
        let loads = Arc::new(AtomicUsize::new(0));
        let registry = JobRegistry::with_loader(counting_loader(&loads));
        assert!(!registry.is_loaded());

        for _ in 0..5 {
            assert!(registry.resolve("xyz").is_some());
        }
        assert!(registry.resolve("missing").is_none());
        assert!(registry.discover().is_empty());

        assert!(registry.is_loaded());
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_resolve_discovers_once() {
        let loads = Arc::new(AtomicUsize::new(0));
        let registry = Arc::new(JobRegistry::with_loader(counting_loader(&loads)));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                std::thread::spawn(move || registry.resolve("xyz").is_some())
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_plugin_overrides_local() {
        let source = StaticSource::new().with_entry(Arc::new(EntryFn::new("plusone", || {
            Ok(Contribution::Handler(job_fn(|_, _| Ok(()))))
        })));
        let registry = JobRegistry::with_loader(PluginLoader::new(vec![Box::new(source)]));
        registry.register("plusone", noop()).unwrap();

        let job = registry.resolve("plusone").unwrap();
        assert_eq!(job.source, JobSource::Plugin);
        assert_eq!(job.origin_plugin.as_deref(), Some("plusone"));
    }

    #[test]
    fn test_list_is_sorted() {
        let registry = JobRegistry::new();
        registry.register("zeta", noop()).unwrap();
        registry.register("alpha", noop()).unwrap();

        let names: Vec<_> = registry.list().iter().map(|j| j.name.clone()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }
}

//! Application context provider
//!
//! An [`App`] bundles the configuration store with the long-lived resources
//! a job may touch (database pools, cache clients, ...). Jobs never see the
//! `App` directly; they run inside an execution scope that enters the app
//! before the handler and exits it afterwards.

use crate::config::{ConfigLoader, ConfigStore};
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Something that can be entered and exited as a scope around a job
pub trait ContextProvider: Send + Sync {
    /// Mutable application configuration
    fn config(&self) -> &ConfigStore;

    /// Application root directory
    fn root_path(&self) -> &Path;

    /// Environment name (`development`, `testing`, ...)
    fn env(&self) -> &str;

    /// Acquire scoped state. Must fail if the scope is already active.
    fn enter(&self) -> Result<()>;

    /// Release scoped state. Called exactly once per successful `enter`.
    fn exit(&self);
}

/// A process-wide resource opened for the duration of a job
pub trait Resource: Send + Sync {
    /// Resource name used in logs
    fn name(&self) -> &str;

    /// Open the resource
    fn open(&self) -> Result<()>;

    /// Close the resource
    fn close(&self);
}

/// The application a job runs against
pub struct App {
    name: String,
    root_path: PathBuf,
    env: String,
    config: ConfigStore,
    resources: Vec<Arc<dyn Resource>>,
    active: AtomicBool,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("name", &self.name)
            .field("root_path", &self.root_path)
            .field("env", &self.env)
            .field("resources", &self.resources.iter().map(|r| r.name().to_string()).collect::<Vec<_>>())
            .finish()
    }
}

impl App {
    /// Create an app over an existing config store
    pub fn new(name: impl Into<String>, root_path: impl Into<PathBuf>, env: impl Into<String>, config: ConfigStore) -> Self {
        Self {
            name: name.into(),
            root_path: root_path.into(),
            env: env.into(),
            config,
            resources: Vec::new(),
            active: AtomicBool::new(false),
        }
    }

    /// Load an app rooted at `root`: config files from `configs/` followed
    /// by `SEA_CONFIG_*` environment overrides.
    pub fn load(root: impl AsRef<Path>, env: &str) -> Result<Self> {
        let root = root.as_ref();
        let config = ConfigLoader::load_env_dir(root, env)?;
        ConfigLoader::apply_env_overrides(&config);

        let name = config.get::<String>("APP_NAME").unwrap_or_else(|| {
            root.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "app".to_string())
        });

        tracing::debug!("Loaded app '{}' ({}) from {}", name, env, root.display());
        Ok(Self::new(name, root, env, config))
    }

    /// Attach a resource; resources open in attachment order
    pub fn with_resource(mut self, resource: Arc<dyn Resource>) -> Self {
        self.resources.push(resource);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a scope is currently open
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

impl ContextProvider for App {
    fn config(&self) -> &ConfigStore {
        &self.config
    }

    fn root_path(&self) -> &Path {
        &self.root_path
    }

    fn env(&self) -> &str {
        &self.env
    }

    fn enter(&self) -> Result<()> {
        if self
            .active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(Error::Context(format!(
                "context for app '{}' is already active; nested dispatch is not supported",
                self.name
            )));
        }

        let mut rollback = Rollback {
            app: self,
            opened: 0,
            armed: true,
        };
        for resource in &self.resources {
            if let Err(e) = resource.open() {
                tracing::error!("Failed to open resource '{}': {}", resource.name(), e);
                return Err(e);
            }
            rollback.opened += 1;
            tracing::trace!("Opened resource '{}'", resource.name());
        }
        rollback.armed = false;

        Ok(())
    }

    fn exit(&self) {
        for resource in self.resources.iter().rev() {
            resource.close();
            tracing::trace!("Closed resource '{}'", resource.name());
        }
        self.active.store(false, Ordering::SeqCst);
    }
}

/// Closes the resources opened so far and clears the active flag unless
/// disarmed; runs on early return and while unwinding from a panicking `open`
struct Rollback<'a> {
    app: &'a App,
    opened: usize,
    armed: bool,
}

impl Drop for Rollback<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        for done in self.app.resources[..self.opened].iter().rev() {
            done.close();
        }
        self.app.active.store(false, Ordering::SeqCst);
    }
}

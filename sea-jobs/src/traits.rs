//! Job and plugin traits

use crate::args::JobArgs;
use crate::context::ExecutionContext;
use crate::outcome::JobError;
use crate::registry::JobDescriptor;
use sea_core::Result;
use std::sync::Arc;

/// A runnable job
pub trait JobHandler: Send + Sync {
    /// Run the job inside an open execution context
    fn run(&self, ctx: &ExecutionContext<'_>, args: &JobArgs) -> std::result::Result<(), JobError>;
}

struct FnJob<F>(F);

impl<F> JobHandler for FnJob<F>
where
    F: Fn(&ExecutionContext<'_>, &JobArgs) -> std::result::Result<(), JobError> + Send + Sync,
{
    fn run(&self, ctx: &ExecutionContext<'_>, args: &JobArgs) -> std::result::Result<(), JobError> {
        (self.0)(ctx, args)
    }
}

/// Wrap a function or closure as a job handler
pub fn job_fn<F>(f: F) -> Arc<dyn JobHandler>
where
    F: Fn(&ExecutionContext<'_>, &JobArgs) -> std::result::Result<(), JobError> + Send + Sync + 'static,
{
    Arc::new(FnJob(f))
}

/// What a loaded extension point contributes
pub enum Contribution {
    /// A single handler, registered under the entry point's declared name
    Handler(Arc<dyn JobHandler>),
    /// A set of named jobs
    Jobs(Vec<JobDescriptor>),
}

/// A single discovered extension point
pub trait EntryPoint: Send + Sync {
    /// Declared name
    fn name(&self) -> &str;

    /// Load the code behind the entry point
    fn load(&self) -> Result<Contribution>;
}

/// Enumerates extension points of a category.
///
/// This is the only thing the plugin loader knows about how plugins are
/// installed, so tests can substitute a [`StaticSource`](crate::StaticSource).
pub trait ProviderSource: Send + Sync {
    /// Source name used in diagnostics
    fn name(&self) -> &str;

    /// All entry points declared under `category`
    fn enumerate(&self, category: &str) -> Result<Vec<Arc<dyn EntryPoint>>>;
}

/// Entry point backed by a closure, for providers linked into the binary
pub struct EntryFn<F> {
    name: String,
    load: F,
}

impl<F> EntryFn<F>
where
    F: Fn() -> Result<Contribution> + Send + Sync,
{
    pub fn new(name: impl Into<String>, load: F) -> Self {
        Self {
            name: name.into(),
            load,
        }
    }
}

impl<F> EntryPoint for EntryFn<F>
where
    F: Fn() -> Result<Contribution> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> Result<Contribution> {
        (self.load)()
    }
}

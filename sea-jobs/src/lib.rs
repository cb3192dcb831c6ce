//! Sea Job System
//!
//! Named jobs are registered by the application or contributed by plugins,
//! resolved by name and run inside a scoped application context.
//!
//! ```rust,ignore
//! use sea_jobs::{job_fn, Dispatcher, JobRegistry, JobOutcome};
//!
//! let registry = JobRegistry::new();
//! registry.register("plusone", job_fn(|ctx, _args| {
//!     let number: i64 = ctx.config().get_or("NUMBER", 100);
//!     ctx.config().set("NUMBER", number + 1)?;
//!     Ok(())
//! }))?;
//!
//! let outcome = Dispatcher::new(&registry, &app).dispatch("plusone", vec![]);
//! assert!(outcome.is_success());
//! ```

mod args;
mod context;
mod dispatcher;
mod loader;
mod manifest;
mod outcome;
mod registry;
mod traits;

pub use args::JobArgs;
pub use context::{ExecutionContext, with_context};
pub use dispatcher::Dispatcher;
pub use loader::{PluginLoadOutcome, PluginLoadResult, PluginLoader, StaticSource};
pub use manifest::{CommandJob, ManifestSource, ProviderDecl};
pub use outcome::{JobError, JobFailure, JobOutcome};
pub use registry::{JobDescriptor, JobRegistry, JobSource};
pub use traits::{Contribution, EntryFn, EntryPoint, JobHandler, ProviderSource, job_fn};

/// Extension-point category under which job providers are declared
pub const JOB_PROVIDER_CATEGORY: &str = "sea.jobs";

//! Job dispatcher

use crate::args::JobArgs;
use crate::context::with_context;
use crate::outcome::{JobError, JobOutcome, panic_message};
use crate::registry::JobRegistry;
use sea_core::ContextProvider;
use std::panic::{self, AssertUnwindSafe};

/// Resolves job names and runs them inside an execution context
pub struct Dispatcher<'a> {
    registry: &'a JobRegistry,
    provider: &'a dyn ContextProvider,
}

impl<'a> Dispatcher<'a> {
    pub fn new(registry: &'a JobRegistry, provider: &'a dyn ContextProvider) -> Self {
        Self { registry, provider }
    }

    /// Run the job registered as `name` with `args`.
    ///
    /// Unknown names return [`JobOutcome::NotFound`] without opening a
    /// context. Otherwise the context is closed again before the outcome is
    /// returned, whatever the handler did.
    pub fn dispatch(&self, name: &str, args: Vec<String>) -> JobOutcome {
        let job = if name.is_empty() {
            None
        } else {
            self.registry.resolve(name)
        };
        let Some(job) = job else {
            tracing::debug!("No job registered as '{}'", name);
            return JobOutcome::NotFound(name.to_string());
        };

        let args = JobArgs::new(name, args);
        tracing::info!("Running {} job '{}'", job.source, name);

        // Panics from opening the context or from the handler both land here,
        // after the context has been torn down.
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            with_context(self.provider, |ctx| job.handler.run(ctx, &args))
        }));

        let outcome = match result {
            Err(payload) => JobOutcome::UnhandledError(anyhow::anyhow!(
                "job '{}' panicked: {}",
                name,
                panic_message(payload.as_ref())
            )),
            Ok(Err(e)) => JobOutcome::UnhandledError(
                anyhow::Error::new(e).context(format!("failed to open execution context for job '{}'", name)),
            ),
            Ok(Ok(Ok(()))) | Ok(Ok(Err(JobError::Finished))) => JobOutcome::Success,
            Ok(Ok(Err(JobError::Failure(failure)))) => JobOutcome::DomainFailure(failure),
            Ok(Ok(Err(JobError::Unhandled(e)))) => JobOutcome::UnhandledError(e),
        };

        match &outcome {
            JobOutcome::Success => tracing::info!("Job '{}' finished", name),
            JobOutcome::DomainFailure(f) => tracing::warn!("Job '{}' failed: {}", name, f),
            JobOutcome::UnhandledError(e) => tracing::error!("Job '{}' crashed: {:#}", name, e),
            JobOutcome::NotFound(_) => {}
        }
        outcome
    }
}

//! Execution context management

use sea_core::{ConfigStore, ContextProvider, Result};
use std::path::Path;

/// Ambient state visible to a running job.
///
/// Only exists while its provider is entered; there is no way to keep one
/// past the end of [`with_context`].
pub struct ExecutionContext<'a> {
    provider: &'a dyn ContextProvider,
}

impl<'a> ExecutionContext<'a> {
    pub fn config(&self) -> &'a ConfigStore {
        self.provider.config()
    }

    pub fn root_path(&self) -> &'a Path {
        self.provider.root_path()
    }

    pub fn env(&self) -> &'a str {
        self.provider.env()
    }

    pub fn provider(&self) -> &'a dyn ContextProvider {
        self.provider
    }
}

/// Exits the provider when dropped, including during unwinding
struct ScopeGuard<'a> {
    provider: &'a dyn ContextProvider,
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        self.provider.exit();
        tracing::debug!("Execution context closed");
    }
}

/// Enter `provider`, run `f` inside it and exit again.
///
/// The provider is exited before this function returns on every path, so
/// whatever `f` produced is only observed after teardown. If entering fails
/// `f` is not called.
pub fn with_context<T, F>(provider: &dyn ContextProvider, f: F) -> Result<T>
where
    F: FnOnce(&ExecutionContext<'_>) -> T,
{
    provider.enter()?;
    tracing::debug!("Execution context opened");
    let _guard = ScopeGuard { provider };

    let ctx = ExecutionContext { provider };
    Ok(f(&ctx))
}

//! Job errors and dispatch outcomes

use std::any::Any;
use std::fmt;
use thiserror::Error;

/// A recognized, expected job failure.
///
/// Returning this from a handler is an ordinary business outcome, reported
/// to the user rather than treated as a crash.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct JobFailure {
    message: String,
    code: Option<u8>,
}

impl JobFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    /// Exit code the CLI should report for this failure
    pub fn with_code(mut self, code: u8) -> Self {
        self.code = Some(code);
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> Option<u8> {
        self.code
    }
}

/// Error returned by a job handler
#[derive(Debug, Error)]
pub enum JobError {
    /// Domain failure
    #[error(transparent)]
    Failure(#[from] JobFailure),

    /// Anything else; treated as a defect
    #[error(transparent)]
    Unhandled(#[from] anyhow::Error),

    /// The job stopped early without failing, e.g. after printing `--help`
    #[error("job finished early")]
    Finished,
}

impl JobError {
    /// Shorthand for a domain failure with `message`
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure(JobFailure::new(message))
    }
}

impl From<sea_core::Error> for JobError {
    fn from(e: sea_core::Error) -> Self {
        Self::Unhandled(anyhow::Error::new(e))
    }
}

/// Result of dispatching a job
#[derive(Debug)]
pub enum JobOutcome {
    /// The handler returned normally
    Success,
    /// The handler signaled a recognized failure
    DomainFailure(JobFailure),
    /// The handler failed unexpectedly, or its context could not be opened
    UnhandledError(anyhow::Error),
    /// No job is registered under the requested name
    NotFound(String),
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Process exit code for this outcome
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Success => 0,
            Self::DomainFailure(f) => f.code().unwrap_or(1),
            Self::UnhandledError(_) => 1,
            Self::NotFound(_) => 2,
        }
    }

    /// Turn an unhandled error into `Err` so it propagates with `?`
    pub fn into_result(self) -> anyhow::Result<Self> {
        match self {
            Self::UnhandledError(e) => Err(e),
            other => Ok(other),
        }
    }
}

impl fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::DomainFailure(failure) => write!(f, "job failed: {}", failure),
            Self::UnhandledError(e) => write!(f, "unhandled error: {:#}", e),
            Self::NotFound(name) => write!(f, "no such job: {}", name),
        }
    }
}

/// Best-effort message from a caught panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}

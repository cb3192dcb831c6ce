//! Arguments forwarded to a job

use crate::outcome::{JobError, JobFailure};
use clap::{ArgMatches, Command};

/// Arguments passed verbatim from the command line to a job.
///
/// The dispatcher never interprets them; a job that wants flags declares a
/// [`clap::Command`] and calls [`JobArgs::parse`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobArgs {
    job: String,
    raw: Vec<String>,
}

impl JobArgs {
    pub fn new(job: impl Into<String>, raw: Vec<String>) -> Self {
        Self { job: job.into(), raw }
    }

    /// Name the job was invoked under
    pub fn job(&self) -> &str {
        &self.job
    }

    pub fn raw(&self) -> &[String] {
        &self.raw
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Parse the arguments against `command`. Usage errors become a job
    /// failure carrying clap's rendered message; `--help` and `--version`
    /// print to stdout and end the job successfully.
    pub fn parse(&self, command: Command) -> Result<ArgMatches, JobError> {
        command
            .no_binary_name(true)
            .try_get_matches_from(&self.raw)
            .map_err(|e| {
                if e.use_stderr() {
                    return JobError::from(JobFailure::new(e.render().to_string().trim_end()).with_code(2));
                }
                match e.print() {
                    Ok(()) => JobError::Finished,
                    Err(io) => JobError::Unhandled(anyhow::Error::new(io).context("failed to print job help")),
                }
            })
    }
}

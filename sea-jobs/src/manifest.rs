//! Plugins declared in TOML manifests
//!
//! Externally installed job providers are executables listed in a manifest:
//!
//! ```toml
//! [[provider]]
//! name = "xyz"
//! command = "sea-xyz"
//! args = ["--quiet"]
//! about = "Rebuild the xyz index"
//! ```
//!
//! Bare command names are looked up on `PATH`; anything containing a path
//! separator is resolved relative to the manifest's directory.

use crate::JOB_PROVIDER_CATEGORY;
use crate::args::JobArgs;
use crate::context::ExecutionContext;
use crate::outcome::{JobError, JobFailure};
use crate::registry::JobDescriptor;
use crate::traits::{Contribution, EntryPoint, JobHandler, ProviderSource};
use anyhow::Context as _;
use sea_core::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default, rename = "provider")]
    providers: Vec<ProviderDecl>,
}

/// One `[[provider]]` table
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ProviderDecl {
    /// Job name
    pub name: String,

    /// Extension-point category
    #[serde(default = "default_category")]
    pub category: String,

    /// Executable to run
    pub command: String,

    /// Fixed arguments placed before the forwarded job arguments
    #[serde(default)]
    pub args: Vec<String>,

    #[serde(default)]
    pub about: Option<String>,
}

fn default_category() -> String {
    JOB_PROVIDER_CATEGORY.to_string()
}

/// Provider source reading a single manifest file. A missing file declares
/// no providers.
pub struct ManifestSource {
    path: PathBuf,
    name: String,
}

impl ManifestSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }

    fn read(&self) -> Result<Vec<ProviderDecl>> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            Error::Plugin(format!("cannot read plugin manifest {}: {}", self.path.display(), e))
        })?;
        let manifest: Manifest = toml::from_str(&content).map_err(|e| {
            Error::Plugin(format!("invalid plugin manifest {}: {}", self.path.display(), e))
        })?;
        Ok(manifest.providers)
    }
}

impl ProviderSource for ManifestSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn enumerate(&self, category: &str) -> Result<Vec<Arc<dyn EntryPoint>>> {
        if !self.path.exists() {
            tracing::debug!("No plugin manifest at {}", self.path.display());
            return Ok(Vec::new());
        }

        let base_dir = self.path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(self
            .read()?
            .into_iter()
            .filter(|decl| decl.category == category)
            .map(|decl| {
                Arc::new(CommandEntryPoint {
                    decl,
                    base_dir: base_dir.clone(),
                }) as Arc<dyn EntryPoint>
            })
            .collect())
    }
}

struct CommandEntryPoint {
    decl: ProviderDecl,
    base_dir: PathBuf,
}

impl EntryPoint for CommandEntryPoint {
    fn name(&self) -> &str {
        &self.decl.name
    }

    fn load(&self) -> Result<Contribution> {
        let program = resolve_command(&self.decl.command, &self.base_dir)?;
        let job = CommandJob {
            program,
            args: self.decl.args.clone(),
        };

        let mut descriptor = JobDescriptor::new(self.decl.name.clone(), Arc::new(job));
        descriptor.about = self.decl.about.clone();
        Ok(Contribution::Jobs(vec![descriptor]))
    }
}

/// Find the executable for `command`
fn resolve_command(command: &str, base_dir: &Path) -> Result<PathBuf> {
    if command.trim().is_empty() {
        return Err(Error::Plugin("plugin command is empty".to_string()));
    }

    let as_path = Path::new(command);
    if as_path.components().count() > 1 || as_path.is_absolute() {
        let candidate = base_dir.join(as_path);
        if candidate.is_file() {
            return Ok(candidate);
        }
        return Err(Error::Plugin(format!("command not found: {}", candidate.display())));
    }

    std::env::var_os("PATH")
        .iter()
        .flat_map(std::env::split_paths)
        .map(|dir| dir.join(command))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| Error::Plugin(format!("command not found on PATH: {}", command)))
}

/// Job that runs an external executable
#[derive(Debug, Clone)]
pub struct CommandJob {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandJob {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl JobHandler for CommandJob {
    fn run(&self, ctx: &ExecutionContext<'_>, args: &JobArgs) -> std::result::Result<(), JobError> {
        tracing::debug!("Running {} {:?}", self.program.display(), args.raw());

        let status = Command::new(&self.program)
            .args(&self.args)
            .args(args.raw())
            .current_dir(ctx.root_path())
            .env("SEA_ROOT", ctx.root_path())
            .env("SEA_ENV", ctx.env())
            .env("SEA_JOB", args.job())
            .status()
            .with_context(|| format!("failed to spawn {}", self.program.display()))?;

        if status.success() {
            return Ok(());
        }

        let code = status
            .code()
            .and_then(|c| u8::try_from(c).ok())
            .filter(|c| *c != 0)
            .unwrap_or(1);
        Err(JobFailure::new(format!("{} exited with {}", self.program.display(), status))
            .with_code(code)
            .into())
    }
}

//! sea - run operational jobs inside an application context
//!
//! This is the main entry point for the sea CLI.

mod jobs;

use anyhow::Context as _;
use clap::Parser;
use sea_core::{App, AppSettings, ContextProvider, DEFAULT_ENV};
use sea_jobs::{Dispatcher, JobOutcome, JobRegistry, ManifestSource, PluginLoader, ProviderSource};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Name of the per-application plugin manifest
const PLUGIN_MANIFEST: &str = "plugins.toml";

/// sea - run a named job inside an initialized application
#[derive(Parser)]
#[command(name = "sea")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Application root directory
    #[arg(short = 'C', long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Environment whose configs/<ENV>.* file is loaded
    #[arg(short, long, env = "SEA_ENV", default_value = DEFAULT_ENV)]
    env: String,

    /// List the available jobs and exit
    #[arg(long)]
    list: bool,

    /// Job to run, followed by the arguments passed to it unchanged
    #[arg(
        value_name = "JOB [ARGS]",
        trailing_var_arg = true,
        allow_hyphen_values = true,
        num_args = 0..
    )]
    command: Vec<String>,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let root = match &cli.root {
        Some(root) => root.clone(),
        None => std::env::current_dir().context("cannot determine current directory")?,
    };

    let app = App::load(&root, &cli.env).with_context(|| format!("failed to load app at {}", root.display()))?;
    let settings = AppSettings::from_store(app.config())?;

    init_tracing(cli.verbose, settings.log_level.as_deref());

    let registry = JobRegistry::with_loader(PluginLoader::new(plugin_sources(&root, &settings)));
    jobs::register_builtin(&registry)?;

    if cli.list {
        for job in registry.list() {
            println!(
                "{:<20} {:<8} {}",
                job.name,
                job.source,
                job.about.as_deref().unwrap_or("")
            );
        }
        return Ok(ExitCode::SUCCESS);
    }

    let mut command = cli.command.into_iter();
    let Some(job) = command.next() else {
        eprintln!("No job given; run `sea --list` to see the available jobs");
        return Ok(ExitCode::from(2));
    };

    let outcome = Dispatcher::new(&registry, &app).dispatch(&job, command.collect());
    let code = ExitCode::from(outcome.exit_code());

    match outcome {
        JobOutcome::Success => Ok(code),
        JobOutcome::DomainFailure(failure) => {
            eprintln!("{}", failure);
            Ok(code)
        }
        JobOutcome::NotFound(name) => {
            eprintln!("no such job: {}", name);
            Ok(code)
        }
        JobOutcome::UnhandledError(e) => Err(e.context(format!("job '{}' failed", job))),
    }
}

/// Logs go to stderr so job output on stdout stays clean
fn init_tracing(verbose: bool, configured: Option<&str>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directive = if verbose { "debug" } else { configured.unwrap_or("info") };
        EnvFilter::new(directive)
    });

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal()),
        )
        .with(filter)
        .init();

    if verbose {
        tracing::debug!("Verbose mode enabled");
    }
}

/// Manifests are read in order: the app's own, the user's, then any listed
/// in `PLUGIN_MANIFESTS`. Later declarations override earlier ones.
fn plugin_sources(root: &Path, settings: &AppSettings) -> Vec<Box<dyn ProviderSource>> {
    let mut paths = vec![root.join(PLUGIN_MANIFEST)];
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("sea").join(PLUGIN_MANIFEST));
    }
    paths.extend(settings.plugin_manifests.iter().map(|p| root.join(p)));

    paths
        .into_iter()
        .map(|path| Box::new(ManifestSource::new(path)) as Box<dyn ProviderSource>)
        .collect()
}

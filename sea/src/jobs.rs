//! Jobs every sea application gets

use clap::{Arg, Command, value_parser};
use sea_jobs::{ExecutionContext, JobArgs, JobDescriptor, JobError, JobFailure, JobRegistry, job_fn};

/// Register the built-in local jobs
pub fn register_builtin(registry: &JobRegistry) -> sea_core::Result<()> {
    registry.register_with(
        JobDescriptor::new("plusone", job_fn(plusone)).with_about("Increment the NUMBER setting by one"),
    )?;
    registry.register_with(JobDescriptor::new("config", job_fn(show_config)).with_about("Print configuration values"))?;
    Ok(())
}

/// `plusone [-n N]`: store N + 1 (or NUMBER + 1) as NUMBER
fn plusone(ctx: &ExecutionContext<'_>, args: &JobArgs) -> Result<(), JobError> {
    let matches = args.parse(
        Command::new("plusone").arg(
            Arg::new("number")
                .short('n')
                .long("number")
                .help("Base value; defaults to the NUMBER setting")
                .value_parser(value_parser!(i64)),
        ),
    )?;

    let base = match matches.get_one::<i64>("number") {
        Some(n) => *n,
        None => ctx.config().get_or("NUMBER", 100),
    };
    let next = base
        .checked_add(1)
        .ok_or_else(|| JobFailure::new(format!("NUMBER overflows: {}", base)))?;

    ctx.config().set("NUMBER", next)?;
    println!("NUMBER = {}", next);
    Ok(())
}

/// `config [KEY]`: print one value, or the whole config, as JSON
fn show_config(ctx: &ExecutionContext<'_>, args: &JobArgs) -> Result<(), JobError> {
    let matches = args.parse(Command::new("config").arg(Arg::new("key").help("Config key to print")))?;

    let rendered = match matches.get_one::<String>("key") {
        Some(key) => {
            let value = ctx
                .config()
                .get_value(key)
                .ok_or_else(|| JobFailure::new(format!("config key not set: {}", key)))?;
            serde_json::to_string_pretty(&value).map_err(anyhow::Error::from)?
        }
        None => serde_json::to_string_pretty(&ctx.config().snapshot()).map_err(anyhow::Error::from)?,
    };

    println!("{}", rendered);
    Ok(())
}

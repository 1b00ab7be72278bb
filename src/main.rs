use std::process::{self, Command};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use uprun::cli::Args;
use uprun::config;
use uprun::throttle::ThrottleFile;
use uprun::update::{Updater, run_with_update_check};

fn main() {
    let code = match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("uprun: {err:#}");
            1
        }
    };
    process::exit(code);
}

fn run() -> Result<i32> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("UPRUN_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let file_config = config::load_file_config(args.config.as_deref())?;
    let update_config = file_config
        .update
        .to_update_config(args.auto_update_override(), args.update_version.clone());

    let command = file_config
        .run
        .command
        .clone()
        .context("no [run] command configured; nothing to launch")?;
    let mut delegate_args = file_config.run.args.clone();
    delegate_args.extend(args.args.iter().cloned());

    let updater = Updater::new(update_config, ThrottleFile::in_temp_dir());
    Ok(run_with_update_check(&updater, || {
        run_delegate(&command, &delegate_args)
    }))
}

/// The launcher's normal job: run the wrapped command with inherited streams
/// and pass its exit code through.
fn run_delegate(command: &str, args: &[String]) -> i32 {
    debug!("running {command} {args:?}");
    match Command::new(command).args(args).status() {
        Ok(status) => status.code().unwrap_or(1),
        Err(err) => {
            eprintln!("uprun: failed to run {command}: {err}");
            127
        }
    }
}

mod commands;
mod config;
mod environment;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::commands::Commands;
use crate::config::ProvisionerConfig;
use crate::environment::Environment;
use crate::error::{CliError, Result};

/// Exit code when a run is already in progress.
const EXIT_CONFLICT: u8 = 2;

#[derive(Parser)]
#[command(name = "provisioner")]
#[command(version)]
#[command(about = "Provision KPI definitions and augmentation rules", long_about = None)]
struct Cli {
    /// Config file (default: provisioner.toml in the current directory, if present)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_error(&e);
            if e.is_conflict() {
                ExitCode::from(EXIT_CONFLICT)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir().map_err(CliError::CurrentDir)?;
    let config = ProvisionerConfig::load(cli.config.as_deref(), &cwd)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    runtime.block_on(async {
        let env = Environment::new(&config, tokio::runtime::Handle::current())?;
        let result = cli.command.execute(&env).await;
        env.faults.drain().await;
        result
    })
}

fn print_error(error: &CliError) {
    eprintln!("error: {error}");

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        eprintln!("caused by: {cause}");
        source = std::error::Error::source(cause);
    }
}

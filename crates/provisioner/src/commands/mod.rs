mod interrupt;
mod reset;
mod run;
mod status;

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::environment::Environment;
use crate::error::Result;

#[derive(Args)]
pub(crate) struct RunArgs {
    /// TOML file with the definitions and augmentation rules to provision
    #[arg(long, short = 'w')]
    pub work: PathBuf,
}

#[derive(Args)]
pub(crate) struct StatusArgs {
    /// Also list every recorded lifecycle transition
    #[arg(long)]
    pub history: bool,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Provision a work file, rolling back on failure
    Run(RunArgs),
    /// Show the provisioning lifecycle state
    Status(StatusArgs),
    /// Clear a finished, failed or interrupted run so a new one may start
    Reset,
    /// Mark an in-flight run as interrupted
    Interrupt,
}

impl Commands {
    pub(crate) async fn execute(self, env: &Environment) -> Result<()> {
        match self {
            Self::Run(args) => run::run(args, env).await,
            Self::Status(args) => status::run(&args, env),
            Self::Reset => reset::run(env),
            Self::Interrupt => interrupt::run(env),
        }
    }
}

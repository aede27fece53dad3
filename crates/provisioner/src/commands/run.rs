use std::sync::Arc;

use provisioner_lifecycle::{ShutdownGuard, ensure_not_running, watch_shutdown};
use provisioner_operations::OperationError;
use provisioner_operations::operations::{ProvisionOperation, ProvisionOutcome};
use provisioner_operations::providers::load_work_file;
use tracing::warn;

use super::RunArgs;
use crate::config::ClientMode;
use crate::environment::{Environment, Tracker};
use crate::error::Result;

/// Exit code after Ctrl-C, following the shell convention for SIGINT.
const EXIT_INTERRUPTED: i32 = 130;

pub(crate) async fn run(args: RunArgs, env: &Environment) -> Result<()> {
    let work = load_work_file(&args.work)?;

    // A STARTED run owned by another process must not be marked interrupted on exit.
    let current = env
        .tracker
        .current_provisioning_state()
        .map_err(OperationError::from)?;
    ensure_not_running(&current).map_err(OperationError::from)?;
    let _guard = ShutdownGuard::new(Arc::clone(&env.tracker));
    let watcher = tokio::spawn(interrupt_on_ctrl_c(Arc::clone(&env.tracker)));

    let operation = ProvisionOperation::new(Arc::clone(&env.tracker), env.context());
    let result = tokio::task::block_in_place(|| operation.execute(&work));
    watcher.abort();

    env.faults.drain().await;
    let diverged = env.gauge.value();
    if diverged > 0 {
        eprintln!(
            "warning: {diverged} item(s) were accepted remotely but not recorded locally; \
             reconcile them, then run `provisioner reset`"
        );
    }

    let outcome = result?;
    print_outcome(&outcome, env);
    Ok(())
}

async fn interrupt_on_ctrl_c(tracker: Arc<Tracker>) {
    let signal = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            warn!(%error, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };
    match watch_shutdown(tracker, signal).await {
        Ok(Some(record)) => eprintln!("Provisioning interrupted (record {}).", record.id),
        Ok(None) => {}
        Err(error) => warn!(%error, "failed to record interrupted provisioning"),
    }
    std::process::exit(EXIT_INTERRUPTED);
}

fn print_outcome(outcome: &ProvisionOutcome, env: &Environment) {
    println!(
        "Provisioned {} definition(s) and {} augmentation rule(s).",
        outcome.definitions_pushed, outcome.augmentations_pushed
    );
    match env.client_mode() {
        ClientMode::DryRun => println!("Dry run: nothing was sent downstream."),
        ClientMode::Outbox => println!(
            "Payloads queued in {}",
            env.config().client.outbox_dir.display()
        ),
    }
    println!(
        "Run recorded as {} (record {}).",
        outcome.record.state, outcome.record.id
    );
}

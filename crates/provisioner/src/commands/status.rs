use std::sync::Arc;

use provisioner_lifecycle::{LifecycleRecord, ProvisioningState};
use provisioner_operations::operations::{StatusOperation, StatusReport};

use super::StatusArgs;
use crate::environment::Environment;
use crate::error::Result;

pub(crate) fn run(args: &StatusArgs, env: &Environment) -> Result<()> {
    let report = StatusOperation::new(Arc::clone(&env.tracker)).execute()?;

    print_status(&report);
    if args.history {
        print_history(&report.history);
    }
    Ok(())
}

fn print_status(report: &StatusReport) {
    let current = &report.current;
    if current.state == ProvisioningState::Initial {
        println!("No provisioning runs recorded.");
        return;
    }

    println!("Provisioning state: {} (record {})", current.state, current.id);
    if let Some(start) = current.provisioning_start_time {
        println!("  started:  {}", start.to_rfc3339());
    }
    if let Some(end) = current.provisioning_end_time {
        println!("  finished: {}", end.to_rfc3339());
    }
    if let Some(cause) = &current.cause {
        println!("  cause:    {cause}");
    }

    if current.is_running() {
        println!("A run is in progress.");
    } else if !report.can_start() {
        println!("Run `provisioner reset` before starting another run.");
    }
}

fn print_history(history: &[LifecycleRecord]) {
    println!();
    println!("History:");
    for record in history {
        let at = record
            .provisioning_end_time
            .or(record.provisioning_start_time)
            .map(|t| t.to_rfc3339())
            .unwrap_or_default();
        println!("  {:>4}  {:<9}  {at}", record.id, record.state.as_str());
    }
}

use std::sync::Arc;

use provisioner_operations::operations::ResetOperation;

use crate::environment::Environment;
use crate::error::Result;

pub(crate) fn run(env: &Environment) -> Result<()> {
    let operation = ResetOperation::new(Arc::clone(&env.tracker), env.faults.clone());
    let record = operation.execute()?;

    println!("Provisioning reset (record {}).", record.id);
    Ok(())
}

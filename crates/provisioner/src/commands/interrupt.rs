use std::sync::Arc;

use provisioner_operations::operations::InterruptOperation;

use crate::environment::Environment;
use crate::error::Result;

pub(crate) fn run(env: &Environment) -> Result<()> {
    let record = InterruptOperation::new(Arc::clone(&env.tracker)).execute()?;

    println!("Provisioning interrupted (record {}).", record.id);
    println!("Run `provisioner reset` before starting another run.");
    Ok(())
}

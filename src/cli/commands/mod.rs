//! Command execution functions.

mod gate;
mod release;

use crate::cli::{Args, OutputManager};
use crate::config::CiEnvironment;
use crate::error::Result;

use gate::execute_gate_check;
use release::execute_release;

/// Execute the pipeline (or the gate check alone) for parsed arguments
pub async fn execute_command(args: Args) -> Result<i32> {
    let output = OutputManager::new();

    let config = match args.to_config() {
        Ok(config) => config,
        Err(e) => {
            output.error(&e.to_string());
            return Ok(1);
        }
    };

    let env = CiEnvironment::from_env();

    if args.gate_only {
        execute_gate_check(&env, &output);
        return Ok(0);
    }

    execute_release(&config, &env, &output).await
}

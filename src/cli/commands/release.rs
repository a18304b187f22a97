//! Full pipeline run.

use crate::cli::OutputManager;
use crate::config::{CiEnvironment, ReleaseConfig};
use crate::error::Result;
use crate::pipeline::{Pipeline, PipelineOutcome};
use crate::process::SystemRunner;

pub(super) async fn execute_release(
    config: &ReleaseConfig,
    env: &CiEnvironment,
    output: &OutputManager,
) -> Result<i32> {
    let runner = SystemRunner::new(output.clone());
    let pipeline = Pipeline::new(config, env, &runner, output);

    match pipeline.run().await? {
        PipelineOutcome::Skipped(_) => {
            output.success("Build and smoke test passed");
        }
        PipelineOutcome::Released(report) => {
            output.success(&format!("Released {} as {}", report.tag, report.asset_name));
            if let Some(url) = &report.download_url {
                output.indent(url);
            }
        }
    }

    Ok(0)
}

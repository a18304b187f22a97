//! The release pipeline: build, smoke test, gate, package, publish.
//!
//! Stages run strictly in order and any failure aborts the run. The gate
//! check is the only branch: an ineligible build stops successfully after the
//! smoke test.

mod package;
mod publish;

pub use publish::{PublishReport, archive_command, asset_name};

use crate::cli::OutputManager;
use crate::config::{CiEnvironment, ReleaseConfig};
use crate::error::Result;
use crate::gate::{self, GateDecision, SkipReason};
use crate::process::{CommandRunner, ToolCommand};

/// How a pipeline run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Built and tested, but not an eligible release
    Skipped(SkipReason),
    /// Packaged and uploaded
    Released(PublishReport),
}

/// One run of the release pipeline
pub struct Pipeline<'a, R: CommandRunner> {
    config: &'a ReleaseConfig,
    env: &'a CiEnvironment,
    runner: &'a R,
    output: &'a OutputManager,
}

impl<'a, R: CommandRunner> Pipeline<'a, R> {
    /// Create a pipeline over an immutable configuration and CI snapshot
    pub fn new(
        config: &'a ReleaseConfig,
        env: &'a CiEnvironment,
        runner: &'a R,
        output: &'a OutputManager,
    ) -> Self {
        Self {
            config,
            env,
            runner,
            output,
        }
    }

    /// Run every stage in order
    pub async fn run(&self) -> Result<PipelineOutcome> {
        self.output.section("Build");
        self.build()?;

        self.output.section("Smoke test");
        self.smoke_test()?;

        let tag = match gate::evaluate(self.env) {
            GateDecision::Eligible { tag } => tag,
            GateDecision::Skip(reason) => {
                log::info!("Gate check: not publishing ({})", reason);
                self.output
                    .info(&format!("Not a release build: {}. Skipping packaging.", reason));
                return Ok(PipelineOutcome::Skipped(reason));
            }
        };
        log::info!("Gate check: publishing {}", tag);

        self.output.section("Package");
        package::package_bundle(self.config, self.runner).await?;

        self.output.section("Publish");
        let report = publish::publish_bundle(self.config, self.env, &tag, self.output).await?;

        Ok(PipelineOutcome::Released(report))
    }

    /// `python3 build.py -v` in the project directory
    fn build(&self) -> Result<()> {
        let cmd = ToolCommand::new("python3", &self.config.project_dir).args(["build.py", "-v"]);
        self.runner.run(&cmd)
    }

    /// `./starcheat.py -v` in the build output directory
    fn smoke_test(&self) -> Result<()> {
        let cmd = ToolCommand::new("./starcheat.py", self.config.build_dir()).arg("-v");
        self.runner.run(&cmd)
    }
}

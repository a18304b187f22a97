//! Command line argument parsing and validation.
//!
//! CI invokes the tool with no arguments; every flag has a default and an
//! environment fallback so local runs can point it elsewhere.

use crate::config::{
    DEFAULT_API_URL, DEFAULT_MACDEPLOYQT, DEFAULT_REPOSITORY, ReleaseConfig,
};
use crate::error::Result;
use clap::Parser;
use std::path::PathBuf;

/// Build, smoke test and publish the starcheat macOS bundle
#[derive(Parser, Debug)]
#[command(
    name = "starcheat_release",
    version,
    about = "Build, smoke test and publish the starcheat macOS bundle",
    long_about = "Runs the CI release pipeline for starcheat.

Always builds the project and smoke tests the result. On tagged CI builds
(TRAVIS_BUILD_ID set, TRAVIS_SECURE_ENV_VARS not \"false\", TRAVIS_BRANCH a
version such as v1.2.3) it also packages StarCheat.app and uploads it to a
GitHub release using GITHUB_KEY."
)]
pub struct Args {
    /// Project checkout containing build.py and mac/setup.py
    #[arg(long, env = "STARCHEAT_PROJECT_DIR", default_value = ".")]
    pub project_dir: PathBuf,

    /// Repository receiving the release, as OWNER/NAME
    #[arg(long, env = "STARCHEAT_RELEASE_REPO", default_value = DEFAULT_REPOSITORY)]
    pub repository: String,

    /// Release host API base URL
    #[arg(long, env = "STARCHEAT_RELEASE_API", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Path to the Qt deployment tool
    #[arg(long, env = "STARCHEAT_MACDEPLOYQT", default_value = DEFAULT_MACDEPLOYQT)]
    pub macdeployqt: PathBuf,

    /// Only evaluate and print the release gate decision
    #[arg(long)]
    pub gate_only: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Build the release configuration, validating repository and URL
    pub fn to_config(&self) -> Result<ReleaseConfig> {
        ReleaseConfig::new(
            &self.project_dir,
            &self.repository,
            &self.api_url,
            &self.macdeployqt,
        )
    }
}

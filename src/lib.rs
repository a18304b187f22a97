//! # Starcheat Release
//!
//! CI build and release pipeline for the starcheat macOS application.
//!
//! A run builds the project, smoke tests the build, and on tagged CI builds
//! packages `StarCheat.app`, archives it and uploads it to a GitHub release.
//!
//! ## Stages
//!
//! - **Build**: `python3 build.py -v`
//! - **Smoke test**: `./starcheat.py -v` in the build directory
//! - **Gate check**: tagged CI build with secrets available?
//! - **Package**: py2app, macdeployqt, smoke test the bundle
//! - **Publish**: tar.gz the bundle, create the release, upload the asset
//!
//! ## Usage
//!
//! ```bash
//! starcheat_release                 # full pipeline, as CI runs it
//! starcheat_release --gate-only     # print whether this build would publish
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod archive;
pub mod cli;
pub mod config;
pub mod error;
pub mod gate;
pub mod github;
pub mod pipeline;
pub mod process;

pub use config::{CiEnvironment, ReleaseConfig, Repository};
pub use error::{ReleaseError, Result};
pub use gate::{GateDecision, SkipReason};
pub use pipeline::{Pipeline, PipelineOutcome, PublishReport};
pub use process::{CommandOutcome, CommandRunner, SystemRunner, ToolCommand};

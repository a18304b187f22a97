//! macOS bundle packaging with py2app and macdeployqt.

use crate::config::ReleaseConfig;
use crate::error::{FsContext, PackageError, Result};
use crate::process::{CommandRunner, ToolCommand};
use std::path::Path;
use tokio::fs;

/// Produce `StarCheat.app` in the build directory and smoke test it.
///
/// Both packaging tools must already be installed on the host.
pub(super) async fn package_bundle<R: CommandRunner>(
    config: &ReleaseConfig,
    runner: &R,
) -> Result<()> {
    let build_dir = config.build_dir();

    relocate_setup_script(config, &build_dir).await?;

    runner.run(&ToolCommand::new("python3", &build_dir).args(["setup.py", "py2app"]))?;

    let dist_bundle = build_dir.join(config.dist_bundle());
    if !dist_bundle.is_dir() {
        return Err(PackageError::MissingBundle { path: dist_bundle }.into());
    }

    let deploy = ToolCommand::new(config.macdeployqt.to_string_lossy(), &build_dir).args([
        config.dist_bundle().to_string_lossy().into_owned(),
        "-verbose=2".to_string(),
    ]);
    runner.run(&deploy)?;

    let bundle = build_dir.join(config.bundle_name());
    if bundle.exists() {
        log::warn!("Removing stale bundle {}", bundle.display());
        fs::remove_dir_all(&bundle)
            .await
            .fs_context("removing stale bundle", &bundle)?;
    }
    fs::rename(&dist_bundle, &bundle)
        .await
        .fs_context("moving bundle to", &bundle)?;
    log::info!("Bundle ready at {}", bundle.display());

    let executable = format!("{}/Contents/MacOS/starcheat", config.bundle_name());
    runner.run(&ToolCommand::new(executable, &build_dir).arg("-v"))
}

/// Move `mac/setup.py` next to the build output, where py2app expects it
async fn relocate_setup_script(config: &ReleaseConfig, build_dir: &Path) -> Result<()> {
    let source = config.setup_script();
    let dest = build_dir.join("setup.py");

    if !source.is_file() {
        if dest.is_file() {
            log::debug!("setup.py already relocated to {}", dest.display());
            return Ok(());
        }
        return Err(PackageError::MissingSetupScript { path: source }.into());
    }

    fs::rename(&source, &dest)
        .await
        .fs_context("moving setup script to", &dest)
}

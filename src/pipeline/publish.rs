//! Archive the bundle and publish it as a release asset.

use crate::archive;
use crate::cli::OutputManager;
use crate::config::{CiEnvironment, ReleaseConfig};
use crate::error::{FsContext, PublishError, PublishPhase, Result};
use crate::github::{ReleaseClient, ReleaseDescriptor};
use crate::process::ToolCommand;
use bytes::Bytes;

/// What a completed publish produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    /// Release tag
    pub tag: String,
    /// Uploaded asset file name
    pub asset_name: String,
    /// Release page, when the host returned one
    pub release_url: Option<String>,
    /// Asset download link, when the host returned one
    pub download_url: Option<String>,
}

/// Asset name for a tag, e.g. `starcheat-v2.1.0-osx.tar.gz`
pub fn asset_name(tag: &str) -> String {
    format!("starcheat-{}-osx.tar.gz", tag)
}

/// Equivalent `tar` invocation, printed as the archive step's trace line
pub fn archive_command(config: &ReleaseConfig) -> ToolCommand {
    ToolCommand::new("tar", config.build_dir()).args([
        "czf",
        config.archive_name(),
        config.bundle_name(),
    ])
}

/// Archive, create release, extract upload URL, upload.
///
/// Any phase failing aborts the rest. A release created before a later
/// failure is left in place on the host.
pub(super) async fn publish_bundle(
    config: &ReleaseConfig,
    env: &CiEnvironment,
    tag: &str,
    output: &OutputManager,
) -> Result<PublishReport> {
    let token = env
        .github_token
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or(PublishError::MissingToken)?;
    let client = ReleaseClient::new(config, token)?;

    let build_dir = config.build_dir();

    log::info!("Publish phase: {}", PublishPhase::Archive);
    output.trace(&archive_command(config).trace_line());
    let archive_path = archive::create_tar_gz(
        &build_dir.join(config.bundle_name()),
        &build_dir.join(config.archive_name()),
    )
    .await?;
    output.indent(&format!("Archived {}", archive_path.display()));

    output.trace("==> Uploading");

    log::info!("Publish phase: {}", PublishPhase::CreateRelease);
    let created = client.create_release(&ReleaseDescriptor::for_tag(tag)).await?;

    log::info!("Publish phase: {}", PublishPhase::ExtractUrl);
    let upload_url = created.upload_url()?;
    let release_url = created.html_url();
    if let Some(url) = &release_url {
        output.indent(&format!("Release: {}", url));
    }

    log::info!("Publish phase: {}", PublishPhase::Upload);
    let content = tokio::fs::read(&archive_path)
        .await
        .fs_context("reading archive", &archive_path)?;
    let name = asset_name(tag);
    let asset = client
        .upload_asset(&upload_url, &name, Bytes::from(content))
        .await?;

    output.success(&format!("Uploaded {}", asset.name));

    Ok(PublishReport {
        tag: tag.to_string(),
        asset_name: asset.name,
        release_url,
        download_url: asset.download_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_name_follows_tag() {
        assert_eq!(asset_name("v2.1.0"), "starcheat-v2.1.0-osx.tar.gz");
        assert_eq!(asset_name("1.0"), "starcheat-1.0-osx.tar.gz");
    }

    #[test]
    fn test_archive_step_traces_tar_invocation() {
        let config = ReleaseConfig::default();
        let cmd = archive_command(&config);
        assert_eq!(cmd.trace_line(), "==> tar czf starcheat.tar.gz StarCheat.app");
        assert_eq!(cmd.cwd, config.build_dir());
    }
}

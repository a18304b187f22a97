//! Release host client: create a release, then upload one asset to it.

use crate::config::{ReleaseConfig, Repository};
use crate::error::{PublishError, PublishPhase, Result};
use bytes::Bytes;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use url::Url;

/// Media type of the uploaded archive
pub const ARCHIVE_CONTENT_TYPE: &str = "application/gzip";

/// Body of the create-release request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseDescriptor {
    /// Tag the release points at
    pub tag_name: String,
    /// Display name
    pub name: String,
}

impl ReleaseDescriptor {
    /// Descriptor for a starcheat release of `tag`
    pub fn for_tag(tag: &str) -> Self {
        Self {
            tag_name: tag.to_string(),
            name: format!("starcheat {}", tag),
        }
    }
}

/// Fields read from a create-release response
#[derive(Debug, Default, Deserialize)]
struct ReleaseBody {
    upload_url: Option<String>,
    html_url: Option<String>,
    message: Option<String>,
}

/// Raw create-release response
#[derive(Debug, Clone)]
pub struct CreatedRelease {
    /// HTTP status code
    pub status: u16,
    /// Response body as received
    pub body: String,
}

impl CreatedRelease {
    /// Upload URL with the URI template suffix removed.
    ///
    /// A response without a usable `upload_url` is fatal even though the
    /// host may already have created the release; nothing is rolled back.
    pub fn upload_url(&self) -> Result<Url> {
        let parsed = parse_release_body(&self.body);

        let Some(raw) = parsed.upload_url.as_deref().and_then(strip_url_template) else {
            return Err(PublishError::MissingUploadUrl {
                status: self.status,
                message: parsed.message,
            }
            .into());
        };

        Url::parse(raw).map_err(|e| {
            PublishError::InvalidUploadUrl {
                url: raw.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Web page of the created release, if the host returned one
    pub fn html_url(&self) -> Option<String> {
        parse_release_body(&self.body).html_url
    }
}

/// Asset accepted by the release host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedAsset {
    /// Asset file name
    pub name: String,
    /// Public download URL, if the host returned one
    pub download_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AssetBody {
    browser_download_url: Option<String>,
}

/// Bodies that are not JSON objects yield no fields rather than an error,
/// so a garbled response surfaces as a missing upload URL.
fn parse_release_body(body: &str) -> ReleaseBody {
    serde_json::from_str(body).unwrap_or_else(|e| {
        log::warn!("Release response is not a JSON object: {}", e);
        ReleaseBody::default()
    })
}

/// Drop the RFC 6570 expression (`{?name}`, `{?name,label}`) from a URL template
pub fn strip_url_template(template: &str) -> Option<&str> {
    let base = match template.find('{') {
        Some(idx) => &template[..idx],
        None => template,
    };
    (!base.is_empty()).then_some(base)
}

/// Client for the two release host calls the pipeline makes
#[derive(Debug, Clone)]
pub struct ReleaseClient {
    http: reqwest::Client,
    api_url: Url,
    repository: Repository,
    token: String,
}

impl ReleaseClient {
    /// Create a client authenticating with `token`
    pub fn new(config: &ReleaseConfig, token: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PublishError::RequestFailed {
                phase: PublishPhase::CreateRelease,
                reason: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            repository: config.repository.clone(),
            token: token.into(),
        })
    }

    /// `<api>/repos/<owner>/<name>/releases`, keeping any path prefix on the API URL
    pub fn releases_endpoint(&self) -> Result<Url> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|()| PublishError::RequestFailed {
                phase: PublishPhase::CreateRelease,
                reason: format!("API URL '{}' cannot take a path", self.api_url),
            })?
            .pop_if_empty()
            .extend([
                "repos",
                self.repository.owner.as_str(),
                self.repository.name.as_str(),
                "releases",
            ]);
        Ok(url)
    }

    /// POST the release descriptor and capture the response as-is
    pub async fn create_release(&self, descriptor: &ReleaseDescriptor) -> Result<CreatedRelease> {
        let endpoint = self.releases_endpoint()?;
        log::info!("Creating release {} at {}", descriptor.tag_name, endpoint);

        let response = self
            .http
            .post(endpoint)
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/json")
            .json(descriptor)
            .send()
            .await
            .map_err(|e| request_failed(PublishPhase::CreateRelease, e))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| request_failed(PublishPhase::CreateRelease, e))?;

        log::debug!("Create release responded with HTTP {}", status);
        Ok(CreatedRelease { status, body })
    }

    /// POST the archive bytes to the upload URL as asset `asset_name`
    pub async fn upload_asset(
        &self,
        upload_url: &Url,
        asset_name: &str,
        content: Bytes,
    ) -> Result<UploadedAsset> {
        let mut url = upload_url.clone();
        url.query_pairs_mut().append_pair("name", asset_name);
        log::info!("Uploading {} ({} bytes) to {}", asset_name, content.len(), url);

        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, ARCHIVE_CONTENT_TYPE)
            .body(content)
            .send()
            .await
            .map_err(|e| request_failed(PublishPhase::Upload, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| request_failed(PublishPhase::Upload, e))?;

        if !status.is_success() {
            return Err(PublishError::UploadRejected {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let asset: AssetBody = serde_json::from_str(&body).unwrap_or_default();
        Ok(UploadedAsset {
            name: asset_name.to_string(),
            download_url: asset.browser_download_url,
        })
    }
}

fn request_failed(phase: PublishPhase, error: reqwest::Error) -> PublishError {
    PublishError::RequestFailed {
        phase,
        reason: error.to_string(),
    }
}

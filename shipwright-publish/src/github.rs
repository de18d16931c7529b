//! Source-host (GitHub releases) publication.

use std::path::{Path, PathBuf};

use log::info;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Serialize;
use shipwright_core::ReleaseLevel;

use crate::error::{PublishError, PublishStep};
use crate::http::{USER_AGENT, blocking_client, endpoint, expect_status, json_string_field};
use crate::outcome::{PublishOutcome, SkipReason};

/// Default GitHub API endpoint.
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
/// Content type used for uploaded assets.
pub const ASSET_CONTENT_TYPE: &str = "application/java-archive";

/// Source-host repository configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseTarget {
    /// API base URL.
    pub api_url: String,
    /// Token authorized to create releases.
    pub token: Option<String>,
    /// Repository owner.
    pub owner: Option<String>,
    /// Repository name.
    pub repo: Option<String>,
    /// Tag the release is created for.
    pub tag: Option<String>,
}

/// What to publish as a release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRequest {
    /// Release level of the build.
    pub level: ReleaseLevel,
    /// Publish even when the level is a snapshot.
    pub force: bool,
    /// Full artifact version string.
    pub version_string: String,
    /// Minecraft version the build targets.
    pub minecraft_version: String,
    /// Release body (rendered release notes).
    pub notes: String,
    /// Files to attach, in upload order.
    pub assets: Vec<PathBuf>,
}

impl ReleaseRequest {
    /// Release title shown on the source host.
    pub fn title(&self) -> String {
        format!(
            "Version {} (for Minecraft {})",
            self.version_string, self.minecraft_version
        )
    }
}

/// Release creation payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRelease {
    /// Tag to attach the release to.
    pub tag_name: String,
    /// Release title.
    pub name: String,
    /// Release body.
    pub body: String,
    /// Whether the release is marked as a pre-release.
    pub prerelease: bool,
}

/// Source-host release API operations.
pub trait ReleaseHost {
    /// Create a release, returning its asset upload URL template.
    fn create_release(&self, release: &NewRelease) -> Result<String, PublishError>;
    /// Upload one asset to a release.
    fn upload_asset(&self, upload_url: &str, asset: &Path) -> Result<String, PublishError>;
}

/// GitHub releases client backed by a blocking reqwest client.
#[derive(Debug, Clone)]
pub struct GitHubReleasesClient {
    base_url: String,
    token: String,
    owner: String,
    repo: String,
    client: Client,
}

impl GitHubReleasesClient {
    /// Build a client for a repository.
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> Result<Self, PublishError> {
        Ok(Self {
            base_url: base_url.into(),
            token: token.into(),
            owner: owner.into(),
            repo: repo.into(),
            client: blocking_client(PublishStep::CreateRelease)?,
        })
    }
}

impl ReleaseHost for GitHubReleasesClient {
    fn create_release(&self, release: &NewRelease) -> Result<String, PublishError> {
        let step = PublishStep::CreateRelease;
        let url = endpoint(
            &self.base_url,
            &format!("repos/{}/{}/releases", self.owner, self.repo),
        );
        let response = self
            .client
            .post(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(ACCEPT, "application/vnd.github+json")
            .bearer_auth(&self.token)
            .json(release)
            .send()
            .map_err(|err| PublishError::request(step, err))?;
        let response = expect_status(step, response, StatusCode::CREATED)?;
        json_string_field(step, response, "upload_url")
    }

    fn upload_asset(&self, upload_url: &str, asset: &Path) -> Result<String, PublishError> {
        let step = PublishStep::UploadAsset;
        let name = asset_name(asset);
        let bytes = std::fs::read(asset).map_err(|source| PublishError::Io { step, source })?;
        let response = self
            .client
            .post(asset_upload_url(upload_url, &name))
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(CONTENT_TYPE, ASSET_CONTENT_TYPE)
            .bearer_auth(&self.token)
            .body(bytes)
            .send()
            .map_err(|err| PublishError::request(step, err))?;
        expect_status(step, response, StatusCode::CREATED)?;
        Ok(name)
    }
}

/// Build the upload URL for an asset from the release's URL template.
///
/// GitHub returns templates such as `.../assets{?name,label}`; everything
/// from the first `{` is dropped.
pub fn asset_upload_url(upload_url: &str, file_name: &str) -> String {
    let base = upload_url
        .split_once('{')
        .map(|(base, _)| base)
        .unwrap_or(upload_url);
    format!("{base}?name={}", urlencoding::encode(file_name))
}

fn asset_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Create a release and upload each asset in order.
///
/// The first failing upload aborts the remaining ones.
pub fn create_release_with_assets<H: ReleaseHost + ?Sized>(
    host: &H,
    release: &NewRelease,
    assets: &[PathBuf],
) -> Result<Vec<String>, PublishError> {
    let upload_url = host.create_release(release)?;
    info!("created release {} ({})", release.name, release.tag_name);
    let mut uploaded = Vec::with_capacity(assets.len());
    for asset in assets {
        let name = host.upload_asset(&upload_url, asset)?;
        info!("uploaded release asset {name}");
        uploaded.push(name);
    }
    Ok(uploaded)
}

/// Gate and publish a build as a source-host release.
pub fn publish_release(
    target: &ReleaseTarget,
    request: &ReleaseRequest,
) -> Result<PublishOutcome, PublishError> {
    let Some(token) = target.token.as_deref() else {
        return Ok(skip(SkipReason::MissingConfig("github token")));
    };
    let Some(tag) = target.tag.as_deref() else {
        return Ok(skip(SkipReason::MissingConfig("release tag")));
    };
    if !request.level.should_publish(request.force) {
        return Ok(skip(SkipReason::Snapshot));
    }
    let Some(owner) = target.owner.as_deref() else {
        return Ok(skip(SkipReason::MissingConfig("github owner")));
    };
    let Some(repo) = target.repo.as_deref() else {
        return Ok(skip(SkipReason::MissingConfig("github repository")));
    };

    let release = NewRelease {
        tag_name: tag.to_string(),
        name: request.title(),
        body: request.notes.clone(),
        prerelease: !request.level.is_release(),
    };
    let client = GitHubReleasesClient::new(&target.api_url, token, owner, repo)?;
    let uploaded = create_release_with_assets(&client, &release, &request.assets)?;
    Ok(PublishOutcome::Published(uploaded))
}

fn skip(reason: SkipReason) -> PublishOutcome {
    info!("skipping github release: {reason}");
    PublishOutcome::Skipped(reason)
}

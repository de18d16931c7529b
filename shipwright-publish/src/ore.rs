//! Plugin-host (Ore) publication.
//!
//! The protocol is session based: authenticate with the API key, upload the
//! plugin file with the session token, then destroy the session. Once a
//! session exists it is destroyed on every exit path.

use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use shipwright_core::ReleaseLevel;

use crate::error::{PublishError, PublishStep};
use crate::http::{USER_AGENT, blocking_client, endpoint, expect_status, json_string_field};
use crate::outcome::{PublishOutcome, SkipReason};

/// Default Ore API endpoint.
pub const DEFAULT_ORE_URL: &str = "https://ore.spongepowered.org/api";

/// Plugin-host endpoint configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OreTarget {
    /// API base URL, e.g. `https://ore.spongepowered.org/api`.
    pub endpoint: String,
    /// API key used to open a session.
    pub api_key: Option<String>,
    /// Project (plugin) id to publish under.
    pub project_id: Option<String>,
}

/// What to publish to the plugin host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OreRequest {
    /// Release level of the build.
    pub level: ReleaseLevel,
    /// Publish even when the level is a snapshot.
    pub force: bool,
    /// Plugin file to upload.
    pub artifact: Option<PathBuf>,
    /// Version description (rendered release notes).
    pub description: String,
}

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OreUpload {
    /// File name reported by the host, if any.
    pub file_name: Option<String>,
}

#[derive(Debug, Serialize)]
struct PluginInfo<'a> {
    description: &'a str,
    create_forum_post: bool,
}

/// Plugin-host API operations.
pub trait PluginHost {
    /// Open a session, returning its token.
    fn authenticate(&self) -> Result<String, PublishError>;
    /// Upload a plugin file as a new project version.
    fn upload_version(
        &self,
        session: &str,
        artifact: &Path,
        description: &str,
    ) -> Result<OreUpload, PublishError>;
    /// Destroy a session, returning the status code the host answered with.
    fn destroy_session(&self, session: &str) -> Result<u16, PublishError>;
}

/// Ore API client backed by a blocking reqwest client.
#[derive(Debug, Clone)]
pub struct OreApiClient {
    base_url: String,
    api_key: String,
    project_id: String,
    client: Client,
}

impl OreApiClient {
    /// Build a client for a project.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        project_id: impl Into<String>,
    ) -> Result<Self, PublishError> {
        Ok(Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            project_id: project_id.into(),
            client: blocking_client(PublishStep::Authenticate)?,
        })
    }
}

impl PluginHost for OreApiClient {
    fn authenticate(&self) -> Result<String, PublishError> {
        let step = PublishStep::Authenticate;
        let response = self
            .client
            .post(endpoint(&self.base_url, "v2/authenticate"))
            .header(AUTHORIZATION, format!("OreApi apikey={}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .map_err(|err| PublishError::request(step, err))?;
        let response = expect_status(step, response, StatusCode::OK)?;
        json_string_field(step, response, "session")
    }

    fn upload_version(
        &self,
        session: &str,
        artifact: &Path,
        description: &str,
    ) -> Result<OreUpload, PublishError> {
        let step = PublishStep::UploadVersion;
        let info = serde_json::to_string(&PluginInfo {
            description,
            create_forum_post: true,
        })
        .map_err(|err| PublishError::decode(step, format!("plugin info encode failed: {err}")))?;
        let info_part = Part::text(info)
            .mime_str("application/json")
            .map_err(|err| PublishError::request(step, err))?;
        let file_part = Part::file(artifact).map_err(|source| PublishError::Io { step, source })?;
        let form = Form::new()
            .part("plugin-info", info_part)
            .part("plugin-file", file_part);

        let url = endpoint(
            &self.base_url,
            &format!("v2/projects/{}/versions", self.project_id),
        );
        let response = self
            .client
            .post(url)
            .header(AUTHORIZATION, format!("OreApi session={session}"))
            .header(ACCEPT, "application/json")
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .multipart(form)
            .send()
            .map_err(|err| PublishError::request(step, err))?;
        let response = expect_status(step, response, StatusCode::CREATED).inspect_err(|err| {
            error!("ore rejected upload: {err}");
        })?;

        let value: serde_json::Value = response
            .json()
            .map_err(|err| PublishError::decode(step, format!("response decode failed: {err}")))?;
        debug!("ore upload response: {value}");
        let file_name = value
            .get("file_info")
            .and_then(|info| info.get("name"))
            .and_then(|name| name.as_str())
            .map(str::to_string);
        Ok(OreUpload { file_name })
    }

    fn destroy_session(&self, session: &str) -> Result<u16, PublishError> {
        let step = PublishStep::DestroySession;
        let response = self
            .client
            .delete(endpoint(&self.base_url, "v2/sessions/current"))
            .header(AUTHORIZATION, format!("OreApi session={session}"))
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .map_err(|err| PublishError::request(step, err))?;
        Ok(response.status().as_u16())
    }
}

/// An open plugin-host session, destroyed when dropped.
struct SessionGuard<'a, H: PluginHost + ?Sized> {
    host: &'a H,
    token: String,
}

impl<'a, H: PluginHost + ?Sized> SessionGuard<'a, H> {
    fn open(host: &'a H) -> Result<Self, PublishError> {
        let token = host.authenticate()?;
        info!("created session");
        Ok(Self { host, token })
    }

    fn token(&self) -> &str {
        &self.token
    }
}

impl<H: PluginHost + ?Sized> Drop for SessionGuard<'_, H> {
    fn drop(&mut self) {
        match self.host.destroy_session(&self.token) {
            Ok(status) => info!("deleted session: {status}"),
            Err(err) => warn!("failed to delete session: {err}"),
        }
    }
}

/// Upload an artifact inside a session.
///
/// The session is destroyed before this returns, whether the upload worked
/// or not.
pub fn upload_with_session<H: PluginHost + ?Sized>(
    host: &H,
    artifact: &Path,
    description: &str,
) -> Result<OreUpload, PublishError> {
    info!("starting upload of {}", artifact.display());
    let session = SessionGuard::open(host)?;
    let upload = host.upload_version(session.token(), artifact, description)?;
    info!(
        "successfully uploaded: {}",
        upload.file_name.as_deref().unwrap_or("<unnamed>")
    );
    Ok(upload)
}

/// Gate and publish a build to the plugin host.
pub fn publish_to_ore(target: &OreTarget, request: &OreRequest) -> Result<PublishOutcome, PublishError> {
    if !request.level.should_publish(request.force) {
        return Ok(skip(SkipReason::Snapshot));
    }
    let Some(api_key) = target.api_key.as_deref() else {
        return Ok(skip(SkipReason::MissingConfig("ore api key")));
    };
    let Some(project_id) = target.project_id.as_deref() else {
        return Ok(skip(SkipReason::MissingConfig("ore project id")));
    };
    let Some(artifact) = request.artifact.as_deref() else {
        return Ok(skip(SkipReason::MissingArtifact));
    };

    let client = OreApiClient::new(&target.endpoint, api_key, project_id)?;
    let upload = upload_with_session(&client, artifact, &request.description)?;
    let name = upload.file_name.unwrap_or_else(|| display_name(artifact));
    Ok(PublishOutcome::Published(vec![name]))
}

fn skip(reason: SkipReason) -> PublishOutcome {
    info!("skipping ore upload: {reason}");
    PublishOutcome::Skipped(reason)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

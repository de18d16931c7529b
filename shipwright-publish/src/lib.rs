#![deny(missing_docs)]
//! Shipwright artifact publication.
//!
//! Blocking HTTP clients for the plugin host and the source host, plus the
//! gating and orchestration around them.

pub mod error;
pub mod github;
mod http;
pub mod ore;
pub mod outcome;

pub use error::{PublishError, PublishStep};
pub use github::{
    DEFAULT_GITHUB_API_URL, GitHubReleasesClient, NewRelease, ReleaseHost, ReleaseRequest,
    ReleaseTarget, asset_upload_url, create_release_with_assets, publish_release,
};
pub use http::USER_AGENT;
pub use ore::{
    DEFAULT_ORE_URL, OreApiClient, OreRequest, OreTarget, OreUpload, PluginHost, publish_to_ore,
    upload_with_session,
};
pub use outcome::{PublishOutcome, SkipReason};

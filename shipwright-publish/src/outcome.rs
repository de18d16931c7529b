//! Publish outcomes and skip reasons.

use std::fmt;

use serde::Serialize;

/// Why a publish operation did not run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// Snapshot builds are only published when forced.
    Snapshot,
    /// A required setting was not provided.
    MissingConfig(&'static str),
    /// No artifact was provided.
    MissingArtifact,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Snapshot => write!(f, "snapshot builds are not published without --force"),
            Self::MissingConfig(setting) => write!(f, "{setting} is not configured"),
            Self::MissingArtifact => write!(f, "no artifact to upload"),
        }
    }
}

/// Terminal state of a publish operation that did not fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum PublishOutcome {
    /// Nothing was sent.
    Skipped(SkipReason),
    /// Every upload completed; holds the uploaded file names.
    Published(Vec<String>),
}

impl PublishOutcome {
    /// Whether any network work happened.
    pub fn is_published(&self) -> bool {
        matches!(self, Self::Published(_))
    }
}

impl fmt::Display for PublishOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped(reason) => write!(f, "skipped: {reason}"),
            Self::Published(files) if files.is_empty() => write!(f, "published"),
            Self::Published(files) => write!(f, "published {}", files.join(", ")),
        }
    }
}

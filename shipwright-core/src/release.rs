//! Release level classification and version descriptors.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Release maturity tiers, ordered from least to most stable.
///
/// Classification walks [`ReleaseLevel::ALL`] in order and picks the first
/// tier whose predicate matches, so the order here is significant.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseLevel {
    /// Suffix ends with `SNAPSHOT`.
    Snapshot,
    /// Suffix contains `ALPHA`.
    Alpha,
    /// Suffix contains `BETA`.
    Beta,
    /// Suffix contains `RC`.
    ReleaseCandidate,
    /// Version ends with `.0`.
    Major,
    /// Anything else.
    Minor,
}

impl ReleaseLevel {
    /// All tiers in evaluation order.
    pub const ALL: [ReleaseLevel; 6] = [
        ReleaseLevel::Snapshot,
        ReleaseLevel::Alpha,
        ReleaseLevel::Beta,
        ReleaseLevel::ReleaseCandidate,
        ReleaseLevel::Major,
        ReleaseLevel::Minor,
    ];

    /// Position of the tier in evaluation order.
    pub fn rank(&self) -> usize {
        *self as usize
    }

    /// Stable identifier for the tier.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseLevel::Snapshot => "snapshot",
            ReleaseLevel::Alpha => "alpha",
            ReleaseLevel::Beta => "beta",
            ReleaseLevel::ReleaseCandidate => "release_candidate",
            ReleaseLevel::Major => "major",
            ReleaseLevel::Minor => "minor",
        }
    }

    /// Changelog template name (without the `.md` extension).
    pub fn template(&self) -> &'static str {
        match self {
            ReleaseLevel::Snapshot => "snapshot",
            ReleaseLevel::Alpha => "alpha",
            ReleaseLevel::Beta => "beta",
            ReleaseLevel::ReleaseCandidate => "rc",
            ReleaseLevel::Major => "major",
            ReleaseLevel::Minor => "minor",
        }
    }

    /// Whether this is a development snapshot.
    pub fn is_snapshot(&self) -> bool {
        matches!(self, ReleaseLevel::Snapshot)
    }

    /// Whether this is a full (non pre-release) release.
    pub fn is_release(&self) -> bool {
        matches!(self, ReleaseLevel::Major | ReleaseLevel::Minor)
    }

    /// Whether artifacts of this tier should be published.
    pub fn should_publish(&self, force: bool) -> bool {
        force || !self.is_snapshot()
    }

    fn matches(&self, version: &str, suffix: Option<&str>) -> bool {
        match self {
            ReleaseLevel::Snapshot => suffix.is_some_and(|s| s.ends_with("SNAPSHOT")),
            ReleaseLevel::Alpha => suffix.is_some_and(|s| s.contains("ALPHA")),
            ReleaseLevel::Beta => suffix.is_some_and(|s| s.contains("BETA")),
            ReleaseLevel::ReleaseCandidate => suffix.is_some_and(|s| s.contains("RC")),
            ReleaseLevel::Major => version.ends_with(".0"),
            ReleaseLevel::Minor => true,
        }
    }
}

impl fmt::Display for ReleaseLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a version and optional pre-release suffix into a release level.
///
/// Never fails: anything that matches no specific tier is a minor release.
pub fn classify(version: &str, suffix: Option<&str>) -> ReleaseLevel {
    ReleaseLevel::ALL
        .into_iter()
        .find(|level| level.matches(version, suffix))
        .unwrap_or(ReleaseLevel::Minor)
}

/// The version being built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionDescriptor {
    /// Base version, e.g. `1.14.0`.
    pub version: String,
    /// Optional pre-release suffix, e.g. `SNAPSHOT` or `BETA2`.
    pub suffix: Option<String>,
    /// Target platform API version, e.g. `7.1`.
    pub platform_version: String,
}

impl VersionDescriptor {
    /// Build a descriptor. Blank suffixes are treated as absent.
    pub fn new(
        version: impl Into<String>,
        suffix: Option<String>,
        platform_version: impl Into<String>,
    ) -> Self {
        let suffix = suffix
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        Self {
            version: version.into().trim().to_string(),
            suffix,
            platform_version: platform_version.into().trim().to_string(),
        }
    }

    /// Release level for this version.
    pub fn level(&self) -> ReleaseLevel {
        classify(&self.version, self.suffix.as_deref())
    }

    /// Full artifact version, `<version>-S<platform>[-<suffix>]`.
    pub fn version_string(&self) -> String {
        match &self.suffix {
            Some(suffix) => format!("{}-S{}-{suffix}", self.version, self.platform_version),
            None => format!("{}-S{}", self.version, self.platform_version),
        }
    }
}

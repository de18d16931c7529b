//! Report formatting utilities for Shipwright outputs.

use std::fmt::Write;

use serde::Serialize;

use crate::error::Result;
use crate::release::{ReleaseLevel, VersionDescriptor};

/// Render a serializable payload as pretty JSON.
pub fn render_json<T: Serialize + ?Sized>(payload: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(payload)?)
}

/// Classification summary for a version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelReport {
    /// Base version.
    pub version: String,
    /// Pre-release suffix, if any.
    pub suffix: Option<String>,
    /// Full artifact version string.
    pub version_string: String,
    /// Selected release level.
    pub level: ReleaseLevel,
    /// Changelog template selected by the level.
    pub template: String,
    /// Whether the level is a snapshot.
    pub is_snapshot: bool,
    /// Whether the level is a full release.
    pub is_release: bool,
}

impl LevelReport {
    /// Summarize the classification of a version descriptor.
    pub fn from_descriptor(descriptor: &VersionDescriptor) -> Self {
        let level = descriptor.level();
        Self {
            version: descriptor.version.clone(),
            suffix: descriptor.suffix.clone(),
            version_string: descriptor.version_string(),
            level,
            template: level.template().to_string(),
            is_snapshot: level.is_snapshot(),
            is_release: level.is_release(),
        }
    }
}

/// Render a classification summary as plain text.
pub fn render_level_text(report: &LevelReport) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Version: {}", report.version_string);
    let _ = writeln!(output, "- Level: {}", report.level);
    let _ = writeln!(output, "- Template: {}.md", report.template);
    let _ = writeln!(output, "- Snapshot: {}", yes_no(report.is_snapshot));
    let _ = writeln!(output, "- Release: {}", yes_no(report.is_release));
    output
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_report_summarizes_descriptor() {
        let descriptor = VersionDescriptor::new("1.2.3", Some("2.1-BETA".to_string()), "7.1");
        let report = LevelReport::from_descriptor(&descriptor);
        assert_eq!(report.level, ReleaseLevel::Beta);
        assert_eq!(report.template, "beta");
        assert_eq!(report.version_string, "1.2.3-S7.1-2.1-BETA");
        assert!(!report.is_snapshot);
        assert!(!report.is_release);
    }

    #[test]
    fn renders_json_with_camel_case_keys() {
        let descriptor = VersionDescriptor::new("1.2.0", None, "7.1");
        let json = render_json(&LevelReport::from_descriptor(&descriptor)).expect("json");
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("parse");
        assert_eq!(parsed["level"], "major");
        assert_eq!(parsed["versionString"], "1.2.0-S7.1");
        assert_eq!(parsed["isRelease"], true);
        assert_eq!(parsed["isSnapshot"], false);
        assert!(parsed["suffix"].is_null());
    }

    #[test]
    fn json_failures_surface_as_core_errors() {
        let mut payload = std::collections::BTreeMap::new();
        payload.insert((1, 2), "non-string key");

        let err = render_json(&payload).unwrap_err();

        assert!(matches!(err, crate::error::ShipwrightError::Json(_)));
        assert!(err.to_string().starts_with("json error:"));
    }

    #[test]
    fn renders_text_summary() {
        let descriptor = VersionDescriptor::new("1.2.3", Some("SNAPSHOT".to_string()), "7.1");
        let text = render_level_text(&LevelReport::from_descriptor(&descriptor));
        assert!(text.contains("Version: 1.2.3-S7.1-SNAPSHOT"));
        assert!(text.contains("- Level: snapshot"));
        assert!(text.contains("- Template: snapshot.md"));
        assert!(text.contains("- Snapshot: yes"));
        assert!(text.contains("- Release: no"));
    }
}

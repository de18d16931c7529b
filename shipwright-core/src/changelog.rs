//! Changelog template rendering.
//!
//! Templates live in `changelogs/templates/<level>.md` and may reference the
//! tokens below. Per-version notes are spliced in through `{{info}}`.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::fs::FileSystem;
use crate::release::{ReleaseLevel, VersionDescriptor};

/// Placeholder for the short git commit hash.
pub const HASH_TOKEN: &str = "{{hash}}";
/// Placeholder for the per-version release notes.
pub const INFO_TOKEN: &str = "{{info}}";
/// Placeholder for the base version.
pub const VERSION_TOKEN: &str = "{{version}}";
/// Placeholder for the latest commit message.
pub const MESSAGE_TOKEN: &str = "{{message}}";
/// Placeholder for the platform API version.
pub const SPONGE_TOKEN: &str = "{{sponge}}";

/// Text used when the level template is missing.
pub const MISSING_TEMPLATE_TEXT: &str = "There are no templated release notes available.";
/// Text used when no notes file exists for the version.
pub const MISSING_NOTES_TEXT: &str = "There are no release notes available.";

const TOKENS: [&str; 5] = [
    HASH_TOKEN,
    INFO_TOKEN,
    VERSION_TOKEN,
    MESSAGE_TOKEN,
    SPONGE_TOKEN,
];

/// Runtime values needed to render release notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseNotesInput {
    /// Release level selecting the template.
    pub level: ReleaseLevel,
    /// Base version, substituted for `{{version}}`.
    pub version: String,
    /// Full artifact version used to find the notes file.
    pub version_string: String,
    /// Platform API version, substituted for `{{sponge}}`.
    pub platform_version: String,
    /// Short git hash, substituted for `{{hash}}`.
    pub git_hash: String,
    /// Latest commit message, substituted for `{{message}}`.
    pub commit_message: String,
}

impl ReleaseNotesInput {
    /// Build rendering input for a version descriptor and git metadata.
    pub fn from_descriptor(
        descriptor: &VersionDescriptor,
        git_hash: impl Into<String>,
        commit_message: impl Into<String>,
    ) -> Self {
        Self {
            level: descriptor.level(),
            version: descriptor.version.clone(),
            version_string: descriptor.version_string(),
            platform_version: descriptor.platform_version.clone(),
            git_hash: git_hash.into(),
            commit_message: commit_message.into(),
        }
    }
}

/// Token replacement values for a single render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogContext {
    /// Replacement for `{{hash}}`.
    pub hash: String,
    /// Replacement for `{{info}}`.
    pub info: String,
    /// Replacement for `{{version}}`.
    pub version: String,
    /// Replacement for `{{message}}`.
    pub message: String,
    /// Replacement for `{{sponge}}`.
    pub sponge: String,
}

impl ChangelogContext {
    /// Build a context from rendering input and the resolved notes text.
    pub fn new(input: &ReleaseNotesInput, info: impl Into<String>) -> Self {
        Self {
            hash: input.git_hash.clone(),
            info: info.into(),
            version: input.version.clone(),
            message: input.commit_message.clone(),
            sponge: input.platform_version.clone(),
        }
    }

    fn lookup<'a>(&'a self, text: &str) -> Option<(&'static str, &'a str)> {
        let values = [
            (HASH_TOKEN, self.hash.as_str()),
            (INFO_TOKEN, self.info.as_str()),
            (VERSION_TOKEN, self.version.as_str()),
            (MESSAGE_TOKEN, self.message.as_str()),
            (SPONGE_TOKEN, self.sponge.as_str()),
        ];
        values
            .into_iter()
            .find(|(token, _)| text.starts_with(token))
    }
}

/// Directory holding level templates and per-version notes.
pub fn templates_dir(root: &Path) -> PathBuf {
    root.join("changelogs").join("templates")
}

/// Path of the template for a release level.
pub fn template_path(root: &Path, level: ReleaseLevel) -> PathBuf {
    templates_dir(root).join(format!("{}.md", level.template()))
}

/// Candidate notes files, in lookup order.
///
/// The exact version string is preferred; the fallback keys on the part of
/// the version string before the first `-` plus the platform version.
pub fn notes_candidates(root: &Path, version_string: &str, platform_version: &str) -> [PathBuf; 2] {
    let dir = templates_dir(root);
    let prefix = version_string
        .split_once('-')
        .map(|(prefix, _)| prefix)
        .unwrap_or(version_string);
    [
        dir.join(format!("{version_string}.md")),
        dir.join(format!("{prefix}-S{platform_version}.md")),
    ]
}

/// Render release notes for the given input.
///
/// Missing template or notes files never fail the render; fixed sentinel
/// text is used in their place.
pub fn render_release_notes<F: FileSystem>(
    fs: &F,
    root: &Path,
    input: &ReleaseNotesInput,
) -> Result<String> {
    let template_path = template_path(root, input.level);
    let Some(template) = fs.read_optional(&template_path)? else {
        log::warn!("no changelog template at {}", template_path.display());
        return Ok(MISSING_TEMPLATE_TEXT.to_string());
    };

    let unknown = unknown_tokens(&template);
    if !unknown.is_empty() {
        log::warn!(
            "template {} has unrecognized tokens: {}",
            template_path.display(),
            unknown.join(", ")
        );
    }

    let info = read_notes(fs, root, input)?;
    let context = ChangelogContext::new(input, info);
    Ok(apply_context(&template, &context))
}

fn read_notes<F: FileSystem>(fs: &F, root: &Path, input: &ReleaseNotesInput) -> Result<String> {
    for candidate in notes_candidates(root, &input.version_string, &input.platform_version) {
        if let Some(notes) = fs.read_optional(&candidate)? {
            log::debug!("using release notes from {}", candidate.display());
            return Ok(notes);
        }
    }
    log::warn!("no release notes found for {}", input.version_string);
    Ok(MISSING_NOTES_TEXT.to_string())
}

/// Replace every recognized token in a single left-to-right pass.
///
/// Substituted values are never rescanned, so a value containing a token is
/// emitted verbatim.
pub fn apply_context(template: &str, context: &ChangelogContext) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        output.push_str(&rest[..start]);
        let candidate = &rest[start..];
        match context.lookup(candidate) {
            Some((token, value)) => {
                output.push_str(value);
                rest = &candidate[token.len()..];
            }
            None => {
                output.push('{');
                rest = &candidate[1..];
            }
        }
    }
    output.push_str(rest);
    output
}

/// List `{{...}}` tokens in a template that the renderer does not know.
pub fn unknown_tokens(template: &str) -> Vec<String> {
    let mut unknown: Vec<String> = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            break;
        };
        let token = &rest[start..start + end + 4];
        if !TOKENS.contains(&token) && !unknown.iter().any(|seen| seen == token) {
            unknown.push(token.to_string());
        }
        rest = &after[end + 2..];
    }
    unknown
}

/// Write rendered notes to `changelogs/<version>.md` and `output/<version>.md`.
pub fn write_release_notes<F: FileSystem>(
    fs: &F,
    root: &Path,
    version: &str,
    notes: &str,
) -> Result<Vec<PathBuf>> {
    let file_name = format!("{version}.md");
    let targets = vec![
        root.join("changelogs").join(&file_name),
        root.join("output").join(&file_name),
    ];
    for target in &targets {
        fs.write(target, notes)?;
        log::info!("wrote release notes to {}", target.display());
    }
    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{MockFileSystem, StdFileSystem};
    use std::path::PathBuf;

    fn sample_input(level: ReleaseLevel) -> ReleaseNotesInput {
        ReleaseNotesInput {
            level,
            version: "1.14.0".to_string(),
            version_string: "1.14.0-S7.1-BETA".to_string(),
            platform_version: "7.1".to_string(),
            git_hash: "abc1234".to_string(),
            commit_message: "Fix warp listing".to_string(),
        }
    }

    fn sample_context() -> ChangelogContext {
        ChangelogContext {
            hash: "abc1234".to_string(),
            info: "notes".to_string(),
            version: "1.14.0".to_string(),
            message: "msg".to_string(),
            sponge: "7.1".to_string(),
        }
    }

    #[test]
    fn apply_context_replaces_all_tokens() {
        let template = "v{{version}} ({{hash}}) for {{sponge}}\n{{message}}\n{{info}}\n{{hash}}";
        let rendered = apply_context(template, &sample_context());
        assert_eq!(rendered, "v1.14.0 (abc1234) for 7.1\nmsg\nnotes\nabc1234");
    }

    #[test]
    fn apply_context_is_case_sensitive_and_leaves_unknown_tokens() {
        let rendered = apply_context("{{HASH}} {{other}} {{hash", &sample_context());
        assert_eq!(rendered, "{{HASH}} {{other}} {{hash");
    }

    #[test]
    fn apply_context_does_not_rescan_values() {
        let mut context = sample_context();
        context.info = "see {{hash}}".to_string();
        let rendered = apply_context("{{info}}", &context);
        assert_eq!(rendered, "see {{hash}}");
    }

    #[test]
    fn apply_context_handles_extra_braces() {
        let rendered = apply_context("{{{hash}}}", &sample_context());
        assert_eq!(rendered, "{abc1234}");
    }

    #[test]
    fn apply_context_is_idempotent_once_substituted() {
        let once = apply_context("{{version}} - {{info}}", &sample_context());
        let twice = apply_context(&once, &sample_context());
        assert_eq!(once, twice);
    }

    #[test]
    fn unknown_tokens_lists_each_once() {
        let unknown = unknown_tokens("{{hash}} {{foo}} {{bar}} {{foo}} {{open");
        assert_eq!(unknown, vec!["{{foo}}".to_string(), "{{bar}}".to_string()]);
        assert!(unknown_tokens("{{hash}}{{info}}{{version}}{{message}}{{sponge}}").is_empty());
    }

    #[test]
    fn notes_candidates_prefer_full_version_string() {
        let root = PathBuf::from("/project");
        let [exact, fallback] = notes_candidates(&root, "1.14.0-S7.1-BETA", "7.1");
        assert_eq!(exact, root.join("changelogs/templates/1.14.0-S7.1-BETA.md"));
        assert_eq!(fallback, root.join("changelogs/templates/1.14.0-S7.1.md"));

        let [_, no_dash] = notes_candidates(&root, "1.14.0", "8.0");
        assert_eq!(no_dash, root.join("changelogs/templates/1.14.0-S8.0.md"));
    }

    #[test]
    fn template_path_uses_level_template() {
        let root = PathBuf::from("/project");
        assert_eq!(
            template_path(&root, ReleaseLevel::ReleaseCandidate),
            root.join("changelogs/templates/rc.md")
        );
    }

    #[test]
    fn render_uses_sentinel_when_template_missing() {
        let mut fs = MockFileSystem::new();
        fs.expect_read_optional()
            .withf(|path| path.ends_with("changelogs/templates/beta.md"))
            .returning(|_| Ok(None));

        let rendered = render_release_notes(
            &fs,
            Path::new("/project"),
            &sample_input(ReleaseLevel::Beta),
        )
        .expect("rendered");

        assert_eq!(rendered, MISSING_TEMPLATE_TEXT);
    }

    #[test]
    fn render_falls_back_to_prefix_notes() {
        let mut fs = MockFileSystem::new();
        fs.expect_read_optional()
            .withf(|path| path.ends_with("changelogs/templates/major.md"))
            .returning(|_| Ok(Some("## {{version}}\n{{info}}".to_string())));
        fs.expect_read_optional()
            .withf(|path| path.ends_with("changelogs/templates/1.14.0-S7.1-BETA.md"))
            .returning(|_| Ok(None));
        fs.expect_read_optional()
            .withf(|path| path.ends_with("changelogs/templates/1.14.0-S7.1.md"))
            .returning(|_| Ok(Some("fallback notes".to_string())));

        let rendered = render_release_notes(
            &fs,
            Path::new("/project"),
            &sample_input(ReleaseLevel::Major),
        )
        .expect("rendered");

        assert_eq!(rendered, "## 1.14.0\nfallback notes");
    }

    #[test]
    fn render_uses_sentinel_when_notes_missing() {
        let mut fs = MockFileSystem::new();
        fs.expect_read_optional()
            .withf(|path| path.ends_with("changelogs/templates/minor.md"))
            .returning(|_| Ok(Some("{{info}}".to_string())));
        fs.expect_read_optional()
            .withf(|path| !path.ends_with("changelogs/templates/minor.md"))
            .times(2)
            .returning(|_| Ok(None));

        let rendered = render_release_notes(
            &fs,
            Path::new("/project"),
            &sample_input(ReleaseLevel::Minor),
        )
        .expect("rendered");

        assert_eq!(rendered, MISSING_NOTES_TEXT);
    }

    #[test]
    fn render_reads_templates_from_disk() {
        let root = std::env::temp_dir().join(unique_dir_name());
        let templates = templates_dir(&root);
        std::fs::create_dir_all(&templates).expect("create templates");
        std::fs::write(
            templates.join("beta.md"),
            "Nucleus {{version}} for API {{sponge}}\nBuilt from {{hash}}: {{message}}\n\n{{info}}",
        )
        .expect("write template");
        std::fs::write(templates.join("1.14.0-S7.1-BETA.md"), "* Added warps")
            .expect("write notes");

        let input = ReleaseNotesInput::from_descriptor(
            &VersionDescriptor::new("1.14.0", Some("BETA".to_string()), "7.1"),
            "abc1234",
            "Fix warp listing",
        );
        let fs = StdFileSystem::new();
        let rendered = render_release_notes(&fs, &root, &input).expect("rendered");

        assert_eq!(
            rendered,
            "Nucleus 1.14.0 for API 7.1\nBuilt from abc1234: Fix warp listing\n\n* Added warps"
        );

        let written = write_release_notes(&fs, &root, &input.version, &rendered).expect("write");
        assert_eq!(
            written,
            vec![
                root.join("changelogs").join("1.14.0.md"),
                root.join("output").join("1.14.0.md"),
            ]
        );
        for path in written {
            assert_eq!(std::fs::read_to_string(path).expect("read"), rendered);
        }

        std::fs::remove_dir_all(&root).expect("cleanup temp dir");
    }

    #[test]
    fn input_from_descriptor_carries_level_and_versions() {
        let descriptor = VersionDescriptor::new("2.0.1", Some("SNAPSHOT".to_string()), "8.0");
        let input = ReleaseNotesInput::from_descriptor(&descriptor, "deadbee", "msg");
        assert_eq!(input.level, ReleaseLevel::Snapshot);
        assert_eq!(input.version, "2.0.1");
        assert_eq!(input.version_string, "2.0.1-S8.0-SNAPSHOT");
        assert_eq!(input.platform_version, "8.0");
    }

    static UNIQUE_COUNTER: std::sync::atomic::AtomicUsize = std::sync::atomic::AtomicUsize::new(0);

    fn unique_dir_name() -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("system time")
            .as_nanos();
        let counter = UNIQUE_COUNTER.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        PathBuf::from(format!("shipwright_changelog_test_{nanos}_{counter}"))
    }
}

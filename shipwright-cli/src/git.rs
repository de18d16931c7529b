//! Git metadata used in release notes.

use std::path::Path;
use std::process::Command;

use crate::CliResult;

/// Hash used when git cannot report one.
pub const UNKNOWN_HASH: &str = "unknown";

/// Commit metadata substituted into changelog templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitMetadata {
    /// Short commit hash.
    pub hash: String,
    /// Full message of the latest commit.
    pub message: String,
}

impl GitMetadata {
    /// Resolve metadata from the repository at `root`, preferring explicit overrides.
    pub fn resolve(root: &Path, hash: Option<String>, message: Option<String>) -> Self {
        Self {
            hash: hash.unwrap_or_else(|| short_hash(root)),
            message: message.unwrap_or_else(|| commit_message(root)),
        }
    }
}

/// Short hash of `HEAD`, or [`UNKNOWN_HASH`] when git fails.
pub fn short_hash(root: &Path) -> String {
    match run_git(root, &["rev-parse", "--short", "HEAD"]) {
        Ok(hash) if !hash.trim().is_empty() => hash.trim().to_string(),
        Ok(_) => UNKNOWN_HASH.to_string(),
        Err(err) => {
            log::debug!("falling back to unknown git hash: {err}");
            UNKNOWN_HASH.to_string()
        }
    }
}

/// Message of the latest commit, or empty text when git fails.
pub fn commit_message(root: &Path) -> String {
    match run_git(root, &["log", "-1", "--format=%B"]) {
        Ok(message) => message.trim_end().to_string(),
        Err(err) => {
            log::debug!("no commit message available: {err}");
            String::new()
        }
    }
}

fn run_git(path: &Path, args: &[&str]) -> CliResult<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(path)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .map_err(|err| format!("git command failed: {err}"))?;
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("git {:?} failed: {}", args, stderr.trim()).into());
    }
    Ok(stdout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn overrides_skip_git() {
        let metadata = GitMetadata::resolve(
            Path::new("/definitely/not/a/repo"),
            Some("abc1234".to_string()),
            Some("Manual message".to_string()),
        );
        assert_eq!(metadata.hash, "abc1234");
        assert_eq!(metadata.message, "Manual message");
    }

    #[test]
    fn falls_back_outside_a_repository() {
        let root = temp_dir();
        let metadata = GitMetadata::resolve(&root, None, None);
        assert_eq!(metadata.hash, UNKNOWN_HASH);
        assert_eq!(metadata.message, "");
        std::fs::remove_dir_all(&root).expect("cleanup temp dir");
    }

    #[test]
    fn reads_hash_and_message_from_repository() {
        if Command::new("git").arg("--version").output().is_err() {
            return;
        }
        let root = temp_dir();
        git(&root, &["init", "-q"]);
        git(
            &root,
            &[
                "-c",
                "user.name=Shipwright",
                "-c",
                "user.email=shipwright@example.com",
                "-c",
                "commit.gpgsign=false",
                "commit",
                "-q",
                "--allow-empty",
                "-m",
                "Add warp categories",
            ],
        );

        let metadata = GitMetadata::resolve(&root, None, None);
        assert_ne!(metadata.hash, UNKNOWN_HASH);
        assert!(metadata.hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(metadata.message, "Add warp categories");

        std::fs::remove_dir_all(&root).expect("cleanup temp dir");
    }

    fn git(root: &Path, args: &[&str]) {
        let status = Command::new("git")
            .args(args)
            .current_dir(root)
            .status()
            .expect("run git");
        assert!(status.success(), "git {args:?} failed");
    }

    static UNIQUE_COUNTER: std::sync::atomic::AtomicUsize = std::sync::atomic::AtomicUsize::new(0);

    fn temp_dir() -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("system time")
            .as_nanos();
        let counter = UNIQUE_COUNTER.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let root = std::env::temp_dir().join(format!("shipwright_git_test_{nanos}_{counter}"));
        std::fs::create_dir_all(&root).expect("create temp dir");
        root
    }
}

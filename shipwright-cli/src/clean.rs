//! Output directory cleanup.

use std::path::{Path, PathBuf};

use crate::CliResult;

/// Extensions of build outputs removed by `clean`.
pub const CLEANED_EXTENSIONS: [&str; 4] = ["jar", "md", "json", "yml"];

/// Remove build outputs directly inside `dir`, returning the removed paths.
///
/// A missing directory is not an error.
pub fn clean_output_dir(dir: &Path) -> CliResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut removed = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        if is_build_output(&path) {
            std::fs::remove_file(&path)?;
            log::debug!("removed {}", path.display());
            removed.push(path);
        }
    }
    removed.sort();
    Ok(removed)
}

fn is_build_output(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| CLEANED_EXTENSIONS.iter().any(|ext| name.ends_with(ext)))
        .unwrap_or(false)
}

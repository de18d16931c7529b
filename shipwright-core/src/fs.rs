//! Filesystem abstractions used by the changelog renderer.

use std::io;
use std::path::Path;

use crate::error::Result;

/// Abstraction over filesystem access for testability.
#[cfg_attr(test, mockall::automock)]
pub trait FileSystem {
    /// Read a file into a string, returning `None` when it does not exist.
    fn read_optional(&self, path: &Path) -> Result<Option<String>>;
    /// Write a file, creating missing parent directories.
    fn write(&self, path: &Path, contents: &str) -> Result<()>;
}

/// Default filesystem implementation backed by `std::fs`.
#[derive(Debug, Default, Clone)]
pub struct StdFileSystem;

impl StdFileSystem {
    /// Create a new standard filesystem adapter.
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for StdFileSystem {
    fn read_optional(&self, path: &Path) -> Result<Option<String>> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::StdFileSystem;
    use crate::fs::FileSystem;
    use std::path::PathBuf;

    #[test]
    fn std_filesystem_writes_and_reads_files() {
        let root = std::env::temp_dir().join(unique_dir_name());
        let file_path = root.join("nested").join("notes.md");

        let fs = StdFileSystem::new();
        fs.write(&file_path, "hello shipwright").expect("write file");

        let contents = fs.read_optional(&file_path).expect("read file");
        assert_eq!(contents.as_deref(), Some("hello shipwright"));

        std::fs::remove_dir_all(&root).expect("cleanup temp dir");
    }

    #[test]
    fn std_filesystem_reports_missing_files_as_none() {
        let root = std::env::temp_dir().join(unique_dir_name());
        let fs = StdFileSystem::new();
        let contents = fs.read_optional(&root.join("absent.md")).expect("read");
        assert!(contents.is_none());
    }

    static UNIQUE_COUNTER: std::sync::atomic::AtomicUsize = std::sync::atomic::AtomicUsize::new(0);

    fn unique_dir_name() -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("system time")
            .as_nanos();
        let counter = UNIQUE_COUNTER.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        PathBuf::from(format!("shipwright_core_test_{nanos}_{counter}"))
    }
}

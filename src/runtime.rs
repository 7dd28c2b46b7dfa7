//! System abstraction for filesystem access.
//!
//! A thin trait over the handful of operations the downloader performs on the
//! host, so path handling and artifact placement can be tested against a mock
//! instead of the real filesystem.

use anyhow::Result;
use std::io::Write;
use std::path::{Path, PathBuf};

#[cfg_attr(test, mockall::automock)]
pub trait Runtime: Send + Sync {
    fn current_dir(&self) -> Result<PathBuf>;

    /// Resolves symlinks and returns the canonical absolute path.
    fn canonicalize(&self, path: &Path) -> Result<PathBuf>;

    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    fn is_file(&self, path: &Path) -> bool;
    fn create_dir_all(&self, path: &Path) -> Result<()>;
    fn create_file(&self, path: &Path) -> Result<Box<dyn Write + Send>>;
}

pub struct RealRuntime;

impl Runtime for RealRuntime {
    fn current_dir(&self) -> Result<PathBuf> {
        Ok(std::env::current_dir()?)
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        Ok(std::fs::canonicalize(path)?)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        Ok(std::fs::create_dir_all(path)?)
    }

    fn create_file(&self, path: &Path) -> Result<Box<dyn Write + Send>> {
        Ok(Box::new(std::fs::File::create(path)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn real_runtime_creates_nested_directories_and_files() {
        let root = tempdir().unwrap();
        let runtime = RealRuntime;

        let dir = root.path().join("a/b/c");
        runtime.create_dir_all(&dir).unwrap();
        assert!(runtime.is_dir(&dir));

        let file = dir.join("out.bin");
        let mut writer = runtime.create_file(&file).unwrap();
        writer.write_all(b"content").unwrap();
        drop(writer);

        assert!(runtime.is_file(&file));
        assert_eq!(std::fs::read(&file).unwrap(), b"content");
    }
}

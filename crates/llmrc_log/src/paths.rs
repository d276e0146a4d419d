//! Severity to log file path resolution.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{LogError, Result};
use crate::severity::Severity;

/// Default output root, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "./output";

/// Maps severities to files under a fixed output root.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    /// Creates a resolver rooted at `root`. Nothing is created yet.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The output root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file for `severity`, without touching the filesystem.
    #[must_use]
    pub fn path_for(&self, severity: Severity) -> PathBuf {
        self.root.join(severity.file_name())
    }

    /// Creates the output root (and parents) if missing. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::CreateDir`] if the directory cannot be created.
    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|source| LogError::CreateDir {
            path: self.root.clone(),
            source,
        })
    }

    /// Ensures the root exists and returns the file for `severity`.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::CreateDir`] if the root cannot be created.
    pub fn resolve(&self, severity: Severity) -> Result<PathBuf> {
        self.ensure_dir()?;
        Ok(self.path_for(severity))
    }
}

impl Default for PathResolver {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_path_for_each_severity() {
        let resolver = PathResolver::new("/var/log/app");
        assert_eq!(
            resolver.path_for(Severity::Info),
            PathBuf::from("/var/log/app/INFO.log")
        );
        assert_eq!(
            resolver.path_for(Severity::Fatal),
            PathBuf::from("/var/log/app/FATAL.log")
        );
    }

    #[test]
    fn test_default_root() {
        assert_eq!(PathResolver::default().root(), Path::new("./output"));
    }

    #[test]
    fn test_resolve_creates_nested_root() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("a").join("b");
        let resolver = PathResolver::new(&root);

        let path = resolver.resolve(Severity::Warn).unwrap();

        assert!(root.is_dir());
        assert_eq!(path, root.join("WARN.log"));
    }

    #[test]
    fn test_ensure_dir_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let resolver = PathResolver::new(tmp.path().join("out"));
        resolver.ensure_dir().unwrap();
        resolver.ensure_dir().unwrap();
    }

    #[test]
    fn test_resolve_reports_blocked_root() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("file");
        fs::write(&blocker, b"not a dir").unwrap();
        let resolver = PathResolver::new(blocker.join("out"));

        let err = resolver.resolve(Severity::Error).unwrap_err();

        assert!(matches!(
            err,
            LogError::CreateDir { ref path, .. } if *path == blocker.join("out")
        ));
    }
}

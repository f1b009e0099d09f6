//! Source acquisition interface.
//!
//! Fetching is a collaborator concern: the engine only needs a writable
//! source tree on disk. The shipped `DirFetcher` stages a local checkout;
//! network and archive fetchers plug in behind the same trait.

use std::path::{Path, PathBuf};

use semver::Version;
use thiserror::Error;

use crate::util::fs::{copy_dir_all, ensure_dir, glob_files};
use crate::util::hash::hash_tree;

/// A handle to a writable source tree on disk.
#[derive(Debug, Clone)]
pub struct SourceTree {
    root: PathBuf,
}

impl SourceTree {
    /// Wrap an existing directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        SourceTree { root: root.into() }
    }

    /// The tree root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Fingerprint the tree contents.
    ///
    /// Taken before patching, this records exactly which upstream bytes the
    /// evaluation started from.
    pub fn fingerprint(&self) -> anyhow::Result<String> {
        hash_tree(&self.root)
    }
}

/// Failure to produce a source tree.
#[derive(Debug, Error)]
#[error("failed to fetch sources for `{package}`: {message}")]
pub struct FetchError {
    pub package: String,
    pub message: String,
}

impl FetchError {
    /// Create a fetch error for a package.
    pub fn new(package: impl Into<String>, message: impl Into<String>) -> Self {
        FetchError {
            package: package.into(),
            message: message.into(),
        }
    }
}

/// Produces writable source trees for packages.
pub trait SourceFetcher {
    /// Fetch the sources for a package version.
    fn fetch(&mut self, package: &str, version: &Version) -> Result<SourceTree, FetchError>;
}

/// Stages a local directory as the source tree.
///
/// When export patterns are given, only matching files are staged; that is
/// how a recipe picks the build-relevant subset of a checkout. Each fetch
/// stages a fresh copy so patches always start from pristine bytes.
pub struct DirFetcher {
    source_dir: PathBuf,
    stage_root: PathBuf,
    export_patterns: Vec<String>,
}

impl DirFetcher {
    /// Create a fetcher staging `source_dir` under `stage_root`.
    pub fn new(source_dir: impl Into<PathBuf>, stage_root: impl Into<PathBuf>) -> Self {
        DirFetcher {
            source_dir: source_dir.into(),
            stage_root: stage_root.into(),
            export_patterns: Vec::new(),
        }
    }

    /// Restrict staging to files matching these glob patterns.
    pub fn with_export_patterns(mut self, patterns: Vec<String>) -> Self {
        self.export_patterns = patterns;
        self
    }
}

impl SourceFetcher for DirFetcher {
    fn fetch(&mut self, package: &str, version: &Version) -> Result<SourceTree, FetchError> {
        if !self.source_dir.is_dir() {
            return Err(FetchError::new(
                package,
                format!("source directory does not exist: {}", self.source_dir.display()),
            ));
        }

        let dest = self.stage_root.join(format!("{}-{}", package, version));
        if dest.exists() {
            std::fs::remove_dir_all(&dest).map_err(|e| {
                FetchError::new(package, format!("failed to clear stale stage: {}", e))
            })?;
        }

        tracing::info!(
            package,
            %version,
            from = %self.source_dir.display(),
            to = %dest.display(),
            "staging sources"
        );

        if self.export_patterns.is_empty() {
            copy_dir_all(&self.source_dir, &dest)
                .map_err(|e| FetchError::new(package, format!("{:#}", e)))?;
        } else {
            let files = glob_files(&self.source_dir, &self.export_patterns)
                .map_err(|e| FetchError::new(package, format!("{:#}", e)))?;

            if files.is_empty() {
                return Err(FetchError::new(
                    package,
                    format!(
                        "no files matched export patterns in {}",
                        self.source_dir.display()
                    ),
                ));
            }

            for file in files {
                let rel = file.strip_prefix(&self.source_dir).map_err(|_| {
                    FetchError::new(package, "glob escaped the source directory")
                })?;
                let target = dest.join(rel);
                if let Some(parent) = target.parent() {
                    ensure_dir(parent)
                        .map_err(|e| FetchError::new(package, format!("{:#}", e)))?;
                }
                std::fs::copy(&file, &target).map_err(|e| {
                    FetchError::new(
                        package,
                        format!("failed to stage {}: {}", rel.display(), e),
                    )
                })?;
            }
        }

        Ok(SourceTree::new(dest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn checkout() -> TempDir {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("src")).unwrap();
        fs::create_dir_all(tmp.path().join("docs")).unwrap();
        fs::write(tmp.path().join("CMakeLists.txt"), "project(demo)").unwrap();
        fs::write(tmp.path().join("src/main.c"), "int main() {}").unwrap();
        fs::write(tmp.path().join("docs/guide.md"), "guide").unwrap();
        tmp
    }

    #[test]
    fn test_stage_whole_tree() {
        let src = checkout();
        let stage = TempDir::new().unwrap();

        let mut fetcher = DirFetcher::new(src.path(), stage.path());
        let tree = fetcher.fetch("demo", &Version::new(1, 0, 0)).unwrap();

        assert!(tree.root().ends_with("demo-1.0.0"));
        assert!(tree.root().join("CMakeLists.txt").exists());
        assert!(tree.root().join("docs/guide.md").exists());
    }

    #[test]
    fn test_stage_with_export_patterns() {
        let src = checkout();
        let stage = TempDir::new().unwrap();

        let mut fetcher = DirFetcher::new(src.path(), stage.path()).with_export_patterns(vec![
            "CMakeLists.txt".to_string(),
            "src/**/*".to_string(),
        ]);
        let tree = fetcher.fetch("demo", &Version::new(1, 0, 0)).unwrap();

        assert!(tree.root().join("CMakeLists.txt").exists());
        assert!(tree.root().join("src/main.c").exists());
        assert!(!tree.root().join("docs").exists());
    }

    #[test]
    fn test_refetch_restages_pristine_tree() {
        let src = checkout();
        let stage = TempDir::new().unwrap();

        let mut fetcher = DirFetcher::new(src.path(), stage.path());
        let tree = fetcher.fetch("demo", &Version::new(1, 0, 0)).unwrap();
        fs::write(tree.root().join("CMakeLists.txt"), "patched").unwrap();

        let tree = fetcher.fetch("demo", &Version::new(1, 0, 0)).unwrap();
        assert_eq!(
            fs::read_to_string(tree.root().join("CMakeLists.txt")).unwrap(),
            "project(demo)"
        );
    }

    #[test]
    fn test_missing_source_dir() {
        let stage = TempDir::new().unwrap();
        let mut fetcher = DirFetcher::new(stage.path().join("nope"), stage.path());

        let err = fetcher.fetch("demo", &Version::new(1, 0, 0)).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_fingerprint_changes_with_contents() {
        let src = checkout();
        let stage = TempDir::new().unwrap();

        let mut fetcher = DirFetcher::new(src.path(), stage.path());
        let tree = fetcher.fetch("demo", &Version::new(1, 0, 0)).unwrap();

        let before = tree.fingerprint().unwrap();
        fs::write(tree.root().join("src/main.c"), "int main() { return 1; }").unwrap();
        let after = tree.fingerprint().unwrap();
        assert_ne!(before, after);
    }
}

//! Hashing utilities for patch guards and source-tree fingerprints.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

/// Compute SHA256 hash of a byte slice.
pub fn sha256_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Compute SHA256 hash of a string.
pub fn sha256_str(s: &str) -> String {
    sha256_bytes(s.as_bytes())
}

/// Compute SHA256 hash of a file.
pub fn sha256_file(path: &Path) -> Result<String> {
    let file = File::open(path)
        .with_context(|| format!("failed to open file for hashing: {}", path.display()))?;

    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Compute a fingerprint over every file in a directory tree.
///
/// Files are visited in sorted path order; both the tree-relative path and
/// the file contents feed the digest, so renames and content edits both
/// change the fingerprint.
pub fn hash_tree(root: &Path) -> Result<String> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry
            .with_context(|| format!("failed to walk directory: {}", root.display()))?;
        if entry.file_type().is_file() {
            paths.push(entry.into_path());
        }
    }
    paths.sort();

    let mut hasher = Sha256::new();
    for path in &paths {
        let rel = path.strip_prefix(root).unwrap_or(path);
        hasher.update(rel.to_string_lossy().as_bytes());
        hasher.update(b"\0");

        let file = File::open(path)
            .with_context(|| format!("failed to open file for hashing: {}", path.display()))?;
        let mut reader = BufReader::new(file);
        let mut buffer = [0u8; 8192];
        loop {
            let bytes_read = reader.read(&mut buffer)?;
            if bytes_read == 0 {
                break;
            }
            hasher.update(&buffer[..bytes_read]);
        }
        hasher.update(b"\0");
    }

    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sha256_str() {
        let hash = sha256_str("hello");
        assert_eq!(
            hash,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_sha256_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("test.txt");
        std::fs::write(&path, "hello").unwrap();

        let hash = sha256_file(&path).unwrap();
        assert_eq!(
            hash,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_hash_tree_detects_content_changes() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("src")).unwrap();
        std::fs::write(tmp.path().join("src/a.c"), "int a;").unwrap();
        std::fs::write(tmp.path().join("src/b.c"), "int b;").unwrap();

        let before = hash_tree(tmp.path()).unwrap();
        let again = hash_tree(tmp.path()).unwrap();
        assert_eq!(before, again);

        std::fs::write(tmp.path().join("src/a.c"), "int a = 1;").unwrap();
        let after = hash_tree(tmp.path()).unwrap();
        assert_ne!(before, after);
    }

    #[test]
    fn test_hash_tree_detects_renames() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("a.c"), "int a;").unwrap();

        let before = hash_tree(tmp.path()).unwrap();

        std::fs::rename(tmp.path().join("a.c"), tmp.path().join("b.c")).unwrap();
        let after = hash_tree(tmp.path()).unwrap();
        assert_ne!(before, after);
    }
}

//! Source patch engine.
//!
//! Recipes carry an ordered sequence of exact-match text substitutions that
//! are applied to the fetched source tree before any build step runs. The
//! engine is deliberately strict: a patch whose match text is missing or
//! ambiguous signals that the upstream sources drifted away from what this
//! recipe version expects, and the evaluation must stop rather than build
//! from a silently mispatched tree.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::util::fs::replace_file_atomic;
use crate::util::hash::sha256_str;

/// One exact-match text substitution against a file in the source tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchSpec {
    /// Target file, relative to the source tree root
    pub file: PathBuf,

    /// Exact text to locate (substring match, not a pattern)
    pub find: String,

    /// Replacement text
    pub replace: String,

    /// SHA256 of the pristine file, when the recipe pins it.
    ///
    /// Guards against upstream drift: the patch refuses to touch a file
    /// whose bytes differ from what the recipe was written against.
    pub pristine_digest: Option<String>,
}

impl PatchSpec {
    /// Create a substitution patch.
    pub fn new(
        file: impl Into<PathBuf>,
        find: impl Into<String>,
        replace: impl Into<String>,
    ) -> Self {
        PatchSpec {
            file: file.into(),
            find: find.into(),
            replace: replace.into(),
            pristine_digest: None,
        }
    }

    /// Pin the pristine file digest.
    pub fn with_pristine_digest(mut self, digest: impl Into<String>) -> Self {
        self.pristine_digest = Some(digest.into());
        self
    }
}

/// Failure while applying a patch sequence.
#[derive(Debug, Error)]
pub enum PatchError {
    #[error("patch target not found in {file}: `{snippet}`")]
    TargetNotFound { file: PathBuf, snippet: String },

    #[error("patch target occurs {occurrences} times in {file}: `{snippet}`")]
    AmbiguousTarget {
        file: PathBuf,
        snippet: String,
        occurrences: usize,
    },

    #[error("{file} already contains the patched text; refusing to patch twice")]
    AlreadyPatched { file: PathBuf },

    #[error("{file} does not match the pristine digest pinned by the recipe")]
    PristineMismatch {
        file: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("failed to {action} {file}")]
    Io {
        action: &'static str,
        file: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

/// Apply a patch sequence to a source tree, in declaration order.
///
/// Each patch is all-or-nothing: a failed substitution leaves its target
/// file byte-for-byte unchanged. Earlier patches in the sequence stay
/// applied when a later one fails; the tree must be re-fetched before the
/// evaluation is retried.
pub fn apply_patches(root: &Path, patches: &[PatchSpec]) -> Result<(), PatchError> {
    for patch in patches {
        apply_one(root, patch)?;
    }
    Ok(())
}

fn apply_one(root: &Path, patch: &PatchSpec) -> Result<(), PatchError> {
    let path = root.join(&patch.file);

    let text = crate::util::fs::read_to_string(&path).map_err(|e| PatchError::Io {
        action: "read",
        file: patch.file.clone(),
        source: e,
    })?;

    if let Some(ref expected) = patch.pristine_digest {
        let actual = sha256_str(&text);
        if &actual != expected {
            return Err(PatchError::PristineMismatch {
                file: patch.file.clone(),
                expected: expected.clone(),
                actual,
            });
        }
    }

    let occurrences = text.matches(&patch.find).count();
    if occurrences == 0 {
        return Err(PatchError::TargetNotFound {
            file: patch.file.clone(),
            snippet: snippet(&patch.find),
        });
    }
    if occurrences > 1 {
        return Err(PatchError::AmbiguousTarget {
            file: patch.file.clone(),
            snippet: snippet(&patch.find),
            occurrences,
        });
    }

    // Insertion-style patches embed the match text in their replacement, so
    // the match being present does not prove the file is pristine. The
    // replacement text already appearing means a previous application. A
    // replacement contained in the match text proves nothing and is skipped.
    if !patch.replace.is_empty()
        && patch.replace != patch.find
        && !patch.find.contains(&patch.replace)
        && text.contains(&patch.replace)
    {
        return Err(PatchError::AlreadyPatched {
            file: patch.file.clone(),
        });
    }

    let patched = text.replacen(&patch.find, &patch.replace, 1);

    tracing::debug!(file = %patch.file.display(), "applying source patch");

    replace_file_atomic(&path, &patched).map_err(|e| PatchError::Io {
        action: "write",
        file: patch.file.clone(),
        source: e,
    })?;

    Ok(())
}

/// Truncate match text for error messages.
fn snippet(s: &str) -> String {
    const LIMIT: usize = 60;
    let first_line = s.lines().next().unwrap_or("");
    if first_line.len() > LIMIT {
        let cut: String = first_line.chars().take(LIMIT).collect();
        format!("{}...", cut)
    } else if s.lines().count() > 1 {
        format!("{}...", first_line)
    } else {
        first_line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tree_with(file: &str, contents: &str) -> TempDir {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        tmp
    }

    #[test]
    fn test_substitution() {
        let tmp = tree_with(
            "bin/CMakeLists.txt",
            "target_link_libraries(lookup maxminddb pthread)\n",
        );
        let patch = PatchSpec::new(
            "bin/CMakeLists.txt",
            "target_link_libraries(lookup maxminddb pthread)",
            "target_link_libraries(lookup maxminddb Threads::Threads)",
        );

        apply_patches(tmp.path(), &[patch]).unwrap();

        let text = fs::read_to_string(tmp.path().join("bin/CMakeLists.txt")).unwrap();
        assert!(text.contains("Threads::Threads"));
        assert!(!text.contains("pthread)"));
    }

    #[test]
    fn test_target_not_found_leaves_file_unchanged() {
        let original = "add_library(maxminddb STATIC)\n";
        let tmp = tree_with("CMakeLists.txt", original);
        let patch = PatchSpec::new("CMakeLists.txt", "no such text", "replacement");

        let err = apply_patches(tmp.path(), &[patch]).unwrap_err();
        assert!(matches!(err, PatchError::TargetNotFound { .. }));

        let text = fs::read_to_string(tmp.path().join("CMakeLists.txt")).unwrap();
        assert_eq!(text, original);
    }

    #[test]
    fn test_ambiguous_target() {
        let tmp = tree_with("CMakeLists.txt", "set(X 1)\nset(X 1)\n");
        let patch = PatchSpec::new("CMakeLists.txt", "set(X 1)", "set(X 2)");

        let err = apply_patches(tmp.path(), &[patch]).unwrap_err();
        assert!(matches!(
            err,
            PatchError::AmbiguousTarget { occurrences: 2, .. }
        ));
    }

    #[test]
    fn test_reapply_substitution_fails() {
        let tmp = tree_with("CMakeLists.txt", "link(pthread)\n");
        let patch = PatchSpec::new("CMakeLists.txt", "link(pthread)", "link(Threads::Threads)");

        apply_patches(tmp.path(), std::slice::from_ref(&patch)).unwrap();
        let err = apply_patches(tmp.path(), &[patch]).unwrap_err();
        assert!(matches!(err, PatchError::TargetNotFound { .. }));
    }

    #[test]
    fn test_reapply_insertion_fails() {
        // The replacement embeds the match text, so the match alone cannot
        // detect a second application.
        let tmp = tree_with("tool/CMakeLists.txt", "install(TARGETS bssl)\n");
        let patch = PatchSpec::new(
            "tool/CMakeLists.txt",
            "install(TARGETS bssl)",
            "set_target_properties(bssl PROPERTIES MACOSX_BUNDLE False)\ninstall(TARGETS bssl)",
        );

        apply_patches(tmp.path(), std::slice::from_ref(&patch)).unwrap();
        let err = apply_patches(tmp.path(), &[patch]).unwrap_err();
        assert!(matches!(err, PatchError::AlreadyPatched { .. }));
    }

    #[test]
    fn test_pristine_digest_guard() {
        let tmp = tree_with("CMakeLists.txt", "drifted upstream contents\n");
        let patch = PatchSpec::new("CMakeLists.txt", "drifted", "patched")
            .with_pristine_digest(sha256_str("the contents the recipe expected\n"));

        let err = apply_patches(tmp.path(), &[patch]).unwrap_err();
        assert!(matches!(err, PatchError::PristineMismatch { .. }));

        let text = fs::read_to_string(tmp.path().join("CMakeLists.txt")).unwrap();
        assert_eq!(text, "drifted upstream contents\n");
    }

    #[test]
    fn test_pristine_digest_accepts_expected_file() {
        let contents = "install(TARGETS bssl)\n";
        let tmp = tree_with("CMakeLists.txt", contents);
        let patch = PatchSpec::new("CMakeLists.txt", "install", "install_if_enabled")
            .with_pristine_digest(sha256_str(contents));

        apply_patches(tmp.path(), &[patch]).unwrap();
        let text = fs::read_to_string(tmp.path().join("CMakeLists.txt")).unwrap();
        assert!(text.starts_with("install_if_enabled"));
    }

    #[test]
    fn test_declaration_order() {
        let tmp = tree_with("a.txt", "one two\n");
        let patches = vec![
            PatchSpec::new("a.txt", "one", "1"),
            PatchSpec::new("a.txt", "1 two", "1 2"),
        ];

        apply_patches(tmp.path(), &patches).unwrap();
        let text = fs::read_to_string(tmp.path().join("a.txt")).unwrap();
        assert_eq!(text, "1 2\n");
    }
}

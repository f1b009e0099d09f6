//! Dependency declarations.
//!
//! A DependencyDeclaration describes what a recipe requires from another
//! package: a name, a semver constraint, and optionally the alternatives
//! group it belongs to. Resolution guarantees at most one member per group
//! in the final sequence.

use std::fmt;

use semver::VersionReq;
use serde::Serialize;

/// A single dependency requirement of a recipe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DependencyDeclaration {
    /// Package name
    name: String,

    /// Version requirement
    version_req: VersionReq,

    /// Alternatives group this declaration belongs to, if any
    group: Option<String>,
}

impl DependencyDeclaration {
    /// Create a declaration from a name and a version requirement string.
    pub fn parse(name: impl Into<String>, req: &str) -> Result<Self, semver::Error> {
        Ok(DependencyDeclaration {
            name: name.into(),
            version_req: req.parse()?,
            group: None,
        })
    }

    /// Create a declaration accepting any version.
    pub fn any_version(name: impl Into<String>) -> Self {
        DependencyDeclaration {
            name: name.into(),
            version_req: VersionReq::STAR,
            group: None,
        }
    }

    /// Tag this declaration as a member of an alternatives group.
    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Get the package name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the version requirement.
    pub fn version_req(&self) -> &VersionReq {
        &self.version_req
    }

    /// Get the alternatives group, if any.
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// Check if a version satisfies this declaration.
    pub fn matches_version(&self, version: &semver::Version) -> bool {
        self.version_req.matches(version)
    }
}

impl fmt::Display for DependencyDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if self.version_req != VersionReq::STAR {
            write!(f, " {}", self.version_req)?;
        }
        if let Some(ref group) = self.group {
            write!(f, " [{}]", group)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use semver::Version;

    #[test]
    fn test_parse_and_match() {
        let dep = DependencyDeclaration::parse("boost", ">=1.72").unwrap();
        assert_eq!(dep.name(), "boost");
        assert!(dep.matches_version(&Version::new(1, 81, 0)));
        assert!(!dep.matches_version(&Version::new(1, 66, 0)));
    }

    #[test]
    fn test_exact_requirement() {
        let dep = DependencyDeclaration::parse("rapidjson", "=1.1.0").unwrap();
        assert!(dep.matches_version(&Version::new(1, 1, 0)));
        assert!(!dep.matches_version(&Version::new(1, 2, 0)));
    }

    #[test]
    fn test_group_tagging() {
        let dep = DependencyDeclaration::parse("boringssl", ">=18")
            .unwrap()
            .in_group("tls");
        assert_eq!(dep.group(), Some("tls"));
        assert_eq!(dep.to_string(), "boringssl >=18 [tls]");
    }

    #[test]
    fn test_invalid_requirement() {
        assert!(DependencyDeclaration::parse("zlib", "not a version").is_err());
    }
}

//! External build-tool interface.
//!
//! The engine never inspects the build tool's internals: it hands over a
//! BuildPlan and a phase marker, and consumes a success/failure result plus
//! (on install) the artifact directory. Anything richer belongs to the
//! tool implementation.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::builder::plan::BuildPlan;

/// The pipeline phase a build-tool invocation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhase {
    Configure,
    Build,
    Test,
    Install,
}

impl fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuildPhase::Configure => "configure",
            BuildPhase::Build => "build",
            BuildPhase::Test => "test",
            BuildPhase::Install => "install",
        };
        write!(f, "{}", name)
    }
}

/// A collaborator failure, surfaced verbatim with its phase.
#[derive(Debug, Error)]
#[error("build tool failed during {phase}: {message}")]
pub struct BuildToolError {
    pub phase: BuildPhase,
    pub message: String,
}

impl BuildToolError {
    /// Create an error for a phase.
    pub fn new(phase: BuildPhase, message: impl Into<String>) -> Self {
        BuildToolError {
            phase,
            message: message.into(),
        }
    }
}

/// The external native build tool.
///
/// Calls are synchronous and may take arbitrarily long; the engine awaits
/// each phase to completion before moving on.
pub trait BuildTool {
    /// Configure the source tree with the given plan.
    fn configure(&mut self, plan: &BuildPlan, source_dir: &Path) -> Result<(), BuildToolError>;

    /// Build the given targets (empty = all).
    fn build(&mut self, targets: &[String]) -> Result<(), BuildToolError>;

    /// Run the project's test harness.
    fn test(&mut self) -> Result<(), BuildToolError>;

    /// Install the built artifacts; returns the install directory.
    fn install(&mut self) -> Result<PathBuf, BuildToolError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_display() {
        assert_eq!(BuildPhase::Configure.to_string(), "configure");
        assert_eq!(BuildPhase::Install.to_string(), "install");
    }

    #[test]
    fn test_error_carries_phase_context() {
        let err = BuildToolError::new(BuildPhase::Build, "ninja: error: loading build.ninja");
        assert!(err.to_string().contains("during build"));
        assert!(err.to_string().contains("ninja"));
    }
}

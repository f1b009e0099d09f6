//! CMake driver for the external build-tool interface.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::builder::plan::BuildPlan;
use crate::builder::tool::{BuildPhase, BuildTool, BuildToolError};
use crate::util::fs::ensure_dir;
use crate::util::process::{find_cmake, find_ctest, ProcessBuilder};

/// Drives a CMake configure/build/test/install cycle for one evaluation.
pub struct CmakeDriver {
    cmake: PathBuf,
    build_dir: PathBuf,
    install_prefix: PathBuf,
}

impl CmakeDriver {
    /// Create a driver writing into `build_dir` and installing into
    /// `install_prefix`.
    pub fn new(build_dir: PathBuf, install_prefix: PathBuf) -> Result<Self> {
        let Some(cmake) = find_cmake() else {
            bail!(
                "CMake not found\n\
                 \n\
                 CMake is required to build recipes.\n\
                 Install CMake and ensure it's in your PATH."
            );
        };

        Ok(CmakeDriver {
            cmake,
            build_dir,
            install_prefix,
        })
    }

    fn run(&self, phase: BuildPhase, cmd: ProcessBuilder) -> Result<(), BuildToolError> {
        tracing::debug!(%phase, command = %cmd.display_command(), "invoking build tool");

        let output = cmd
            .exec()
            .map_err(|e| BuildToolError::new(phase, format!("{:#}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BuildToolError::new(
                phase,
                format!("exit code {:?}\n{}", output.status.code(), stderr),
            ));
        }

        Ok(())
    }
}

impl BuildTool for CmakeDriver {
    fn configure(&mut self, plan: &BuildPlan, source_dir: &Path) -> Result<(), BuildToolError> {
        tracing::info!(source = %source_dir.display(), "configuring");

        ensure_dir(&self.build_dir)
            .map_err(|e| BuildToolError::new(BuildPhase::Configure, format!("{:#}", e)))?;

        let cmd = ProcessBuilder::new(&self.cmake)
            .arg("-S")
            .arg(source_dir)
            .arg("-B")
            .arg(&self.build_dir)
            .args(plan.cache_args());

        self.run(BuildPhase::Configure, cmd)
    }

    fn build(&mut self, targets: &[String]) -> Result<(), BuildToolError> {
        tracing::info!(?targets, "building");

        let mut cmd = ProcessBuilder::new(&self.cmake)
            .arg("--build")
            .arg(&self.build_dir)
            .arg("--parallel");

        if !targets.is_empty() {
            cmd = cmd.arg("--target").args(targets);
        }

        self.run(BuildPhase::Build, cmd)
    }

    fn test(&mut self) -> Result<(), BuildToolError> {
        tracing::info!("running test harness");

        let ctest = find_ctest()
            .ok_or_else(|| BuildToolError::new(BuildPhase::Test, "ctest not found in PATH"))?;

        let cmd = ProcessBuilder::new(ctest)
            .arg("--test-dir")
            .arg(&self.build_dir)
            .arg("--output-on-failure");

        self.run(BuildPhase::Test, cmd)
    }

    fn install(&mut self) -> Result<PathBuf, BuildToolError> {
        tracing::info!(prefix = %self.install_prefix.display(), "installing");

        let cmd = ProcessBuilder::new(&self.cmake)
            .arg("--install")
            .arg(&self.build_dir)
            .arg("--prefix")
            .arg(&self.install_prefix);

        self.run(BuildPhase::Install, cmd)?;

        Ok(self.install_prefix.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::plan::PlanValue;

    #[test]
    fn test_cache_args_shape() {
        // The driver's contract with the plan: every variable becomes one
        // -D argument, booleans as ON/OFF.
        let mut plan = BuildPlan::new();
        plan.set("BUILD_TEST", PlanValue::Bool(true));
        plan.set("VERSION", PlanValue::Str("1.5.0".to_string()));

        let args = plan.cache_args();
        assert_eq!(args, ["-DBUILD_TEST=ON", "-DVERSION=1.5.0"]);
    }
}

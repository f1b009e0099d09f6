//! Platform facts - the immutable description of the target environment.
//!
//! All four axes are closed enumerations so that platform-conditional logic
//! in the normalizer and exporter is an exhaustive match: adding a platform
//! is a compile-time-checked change, not a stringly-typed branch.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Target operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    Windows,
    Linux,
    Macos,
    FreeBsd,
    Android,
    Ios,
    TvOs,
    WatchOs,
}

impl Os {
    /// OS families that cannot host a test harness or standalone executable.
    pub fn is_mobile(&self) -> bool {
        matches!(self, Os::Android | Os::Ios | Os::TvOs | Os::WatchOs)
    }

    /// Whether position-independent code is a meaningful toggle on this OS.
    pub fn supports_pic(&self) -> bool {
        !matches!(self, Os::Windows)
    }

    /// Detect the operating system this process is running on.
    ///
    /// Cross-building to mobile targets always goes through explicit flags;
    /// detection only covers the desktop hosts.
    pub fn host() -> Os {
        if cfg!(target_os = "windows") {
            Os::Windows
        } else if cfg!(target_os = "macos") {
            Os::Macos
        } else if cfg!(target_os = "freebsd") {
            Os::FreeBsd
        } else {
            Os::Linux
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Os::Windows => "windows",
            Os::Linux => "linux",
            Os::Macos => "macos",
            Os::FreeBsd => "freebsd",
            Os::Android => "android",
            Os::Ios => "ios",
            Os::TvOs => "tvos",
            Os::WatchOs => "watchos",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Os {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "windows" => Ok(Os::Windows),
            "linux" => Ok(Os::Linux),
            "macos" | "darwin" => Ok(Os::Macos),
            "freebsd" => Ok(Os::FreeBsd),
            "android" => Ok(Os::Android),
            "ios" => Ok(Os::Ios),
            "tvos" => Ok(Os::TvOs),
            "watchos" => Ok(Os::WatchOs),
            other => Err(format!("unknown operating system: `{}`", other)),
        }
    }
}

/// Compiler family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Compiler {
    Gcc,
    Clang,
    AppleClang,
    Msvc,
}

impl fmt::Display for Compiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Compiler::Gcc => "gcc",
            Compiler::Clang => "clang",
            Compiler::AppleClang => "apple-clang",
            Compiler::Msvc => "msvc",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Compiler {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gcc" | "g++" => Ok(Compiler::Gcc),
            "clang" | "clang++" => Ok(Compiler::Clang),
            "apple-clang" | "appleclang" => Ok(Compiler::AppleClang),
            "msvc" | "cl" => Ok(Compiler::Msvc),
            other => Err(format!("unknown compiler: `{}`", other)),
        }
    }
}

impl Compiler {
    /// Detect a plausible default compiler for a host OS.
    pub fn default_for(os: Os) -> Compiler {
        match os {
            Os::Windows => Compiler::Msvc,
            Os::Macos | Os::Ios | Os::TvOs | Os::WatchOs => Compiler::AppleClang,
            Os::Linux => Compiler::Gcc,
            Os::FreeBsd | Os::Android => Compiler::Clang,
        }
    }
}

/// Target CPU architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    X86,
    #[serde(rename = "x86_64")]
    X86_64,
    Armv7,
    Aarch64,
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Arch::X86 => "x86",
            Arch::X86_64 => "x86_64",
            Arch::Armv7 => "armv7",
            Arch::Aarch64 => "aarch64",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Arch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "x86" | "i686" => Ok(Arch::X86),
            "x86_64" | "amd64" => Ok(Arch::X86_64),
            "armv7" | "arm" => Ok(Arch::Armv7),
            "aarch64" | "arm64" => Ok(Arch::Aarch64),
            other => Err(format!("unknown architecture: `{}`", other)),
        }
    }
}

impl Arch {
    /// Detect the architecture this process is running on.
    pub fn host() -> Arch {
        if cfg!(target_arch = "x86_64") {
            Arch::X86_64
        } else if cfg!(target_arch = "aarch64") {
            Arch::Aarch64
        } else if cfg!(target_arch = "arm") {
            Arch::Armv7
        } else {
            Arch::X86
        }
    }
}

/// Build mode, following the CMake configuration names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    Debug,
    Release,
    RelWithDebInfo,
    MinSizeRel,
}

impl BuildMode {
    /// The CMake configuration name for this mode.
    pub fn cmake_name(&self) -> &'static str {
        match self {
            BuildMode::Debug => "Debug",
            BuildMode::Release => "Release",
            BuildMode::RelWithDebInfo => "RelWithDebInfo",
            BuildMode::MinSizeRel => "MinSizeRel",
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cmake_name())
    }
}

impl FromStr for BuildMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(BuildMode::Debug),
            "release" => Ok(BuildMode::Release),
            "relwithdebinfo" => Ok(BuildMode::RelWithDebInfo),
            "minsizerel" => Ok(BuildMode::MinSizeRel),
            other => Err(format!("unknown build mode: `{}`", other)),
        }
    }
}

/// The full set of platform facts for one build invocation.
///
/// Set once per evaluation and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformFacts {
    pub os: Os,
    pub compiler: Compiler,
    pub arch: Arch,
    pub build_mode: BuildMode,
}

impl PlatformFacts {
    /// Platform facts for the running host, release mode.
    pub fn host() -> PlatformFacts {
        let os = Os::host();
        PlatformFacts {
            os,
            compiler: Compiler::default_for(os),
            arch: Arch::host(),
            build_mode: BuildMode::Release,
        }
    }
}

impl fmt::Display for PlatformFacts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} {} ({})",
            self.os, self.arch, self.compiler, self.build_mode
        )
    }
}

//! Slipway - A declarative recipe engine for native C/C++ packages
//!
//! This crate provides the core library functionality for Slipway,
//! including option normalization, requirement resolution, source patching,
//! build plan generation, and artifact descriptor export.

pub mod builder;
pub mod core;
pub mod export;
pub mod ops;
pub mod patch;
pub mod recipes;
pub mod resolver;
pub mod sources;
pub mod util;

pub use crate::core::{
    dependency::DependencyDeclaration,
    normalize::normalize,
    options::{OptionSchema, OptionSelection, OptionValue},
    platform::{Arch, BuildMode, Compiler, Os, PlatformFacts},
    recipe::Recipe,
};

pub use crate::builder::plan::{generate_plan, BuildPlan};
pub use crate::export::descriptor::ArtifactDescriptor;
pub use crate::resolver::resolve;

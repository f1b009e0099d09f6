//! Core data structures for Slipway.
//!
//! This module contains the foundational types used throughout Slipway:
//! - Platform facts (OS, compiler, architecture, build mode)
//! - Option schemas and selections
//! - Dependency declarations
//! - Recipes and their rule tables

pub mod dependency;
pub mod normalize;
pub mod options;
pub mod platform;
pub mod recipe;

pub use dependency::DependencyDeclaration;
pub use options::{OptionSchema, OptionSelection, OptionValue, SchemaViolation};
pub use platform::{Arch, BuildMode, Compiler, Os, PlatformFacts};
pub use recipe::Recipe;

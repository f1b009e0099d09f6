//! High-level operations composing the engine modules.

pub mod evaluate;

pub use evaluate::{evaluate, Evaluation};

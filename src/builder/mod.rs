//! Build plan generation and the external build-tool interface.

pub mod cmake;
pub mod plan;
pub mod tool;

pub use plan::{generate_plan, BuildPlan, PlanValue};
pub use tool::{BuildPhase, BuildTool, BuildToolError};

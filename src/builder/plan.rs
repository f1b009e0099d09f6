//! Build plan generation.
//!
//! A BuildPlan is the flat set of named generator variables handed to the
//! external build tool. It is derived from the normalized selection and the
//! platform facts through the recipe's plan rules; nothing else feeds it,
//! so equal inputs always produce equal plans.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::core::options::{OptionSelection, OptionValue};
use crate::core::platform::PlatformFacts;
use crate::core::recipe::{PlanRule, Recipe};

/// One generator variable value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PlanValue {
    Bool(bool),
    Str(String),
}

impl fmt::Display for PlanValue {
    /// Renders the way CMake cache entries expect: `ON`/`OFF` for booleans.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanValue::Bool(true) => write!(f, "ON"),
            PlanValue::Bool(false) => write!(f, "OFF"),
            PlanValue::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<&OptionValue> for PlanValue {
    fn from(value: &OptionValue) -> Self {
        match value {
            OptionValue::Bool(b) => PlanValue::Bool(*b),
            OptionValue::Str(s) => PlanValue::Str(s.clone()),
        }
    }
}

/// The flat generator-variable mapping for one build invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildPlan {
    vars: BTreeMap<String, PlanValue>,
}

impl BuildPlan {
    /// Create an empty plan.
    pub fn new() -> Self {
        BuildPlan::default()
    }

    /// Set a variable.
    pub fn set(&mut self, name: impl Into<String>, value: PlanValue) {
        self.vars.insert(name.into(), value);
    }

    /// Look up a variable.
    pub fn get(&self, name: &str) -> Option<&PlanValue> {
        self.vars.get(name)
    }

    /// Iterate over (name, value) pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PlanValue)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Whether the plan is empty.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Render the plan as `-D` cache arguments for a CMake-style tool.
    pub fn cache_args(&self) -> Vec<String> {
        self.vars
            .iter()
            .map(|(name, value)| format!("-D{}={}", name, value))
            .collect()
    }
}

/// Generate the build plan for a normalized selection.
///
/// Options absent from the selection (dropped by normalization) emit
/// nothing: their variables are simply not set, leaving the build tool's
/// own defaults in force.
pub fn generate_plan(
    recipe: &Recipe,
    selection: &OptionSelection,
    platform: &PlatformFacts,
) -> BuildPlan {
    let mut plan = BuildPlan::new();

    plan.set(
        "CMAKE_BUILD_TYPE",
        PlanValue::Str(platform.build_mode.cmake_name().to_string()),
    );

    for rule in &recipe.plan_rules {
        match rule {
            PlanRule::Bool { option, variable } => {
                if let Some(value) = selection.bool(option) {
                    plan.set(variable.clone(), PlanValue::Bool(value));
                }
            }
            PlanRule::BoolNegated { option, variable } => {
                if let Some(value) = selection.bool(option) {
                    plan.set(variable.clone(), PlanValue::Bool(!value));
                }
            }
            PlanRule::EnumEquals {
                option,
                choice,
                variable,
            } => {
                if let Some(value) = selection.str(option) {
                    plan.set(variable.clone(), PlanValue::Bool(value == choice));
                }
            }
            PlanRule::EnumValue { option, variable } => {
                if let Some(value) = selection.str(option) {
                    plan.set(variable.clone(), PlanValue::Str(value.to_string()));
                }
            }
            PlanRule::Constant { variable, value } => {
                plan.set(variable.clone(), PlanValue::from(value));
            }
            PlanRule::Version { variable } => {
                plan.set(variable.clone(), PlanValue::Str(recipe.version.to_string()));
            }
        }
    }

    plan
}

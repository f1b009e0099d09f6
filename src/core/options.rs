//! Option schemas and selections.
//!
//! An OptionSchema declares the configurable switches of a recipe: each
//! option has a value domain (boolean or a closed set of choices) and a
//! default. An OptionSelection is one concrete instantiation of a schema;
//! it additionally remembers which options the caller set explicitly, which
//! the resolver uses to distinguish a deliberate pin from a defaulted value.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// A concrete option value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Str(String),
}

impl OptionValue {
    /// Parse a CLI-supplied value: `true`/`false` become booleans,
    /// everything else is an enum choice.
    pub fn parse(s: &str) -> OptionValue {
        match s {
            "true" => OptionValue::Bool(true),
            "false" => OptionValue::Bool(false),
            other => OptionValue::Str(other.to_string()),
        }
    }

    /// The boolean value, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            OptionValue::Str(_) => None,
        }
    }

    /// The string value, if this is an enum choice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Bool(_) => None,
            OptionValue::Str(s) => Some(s),
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{}", b),
            OptionValue::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Str(s.to_string())
    }
}

/// The legal value set of an option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionDomain {
    /// `true` or `false`.
    Bool,
    /// One of a closed set of choices.
    Enum(Vec<String>),
}

impl OptionDomain {
    /// Whether a value is inside this domain.
    pub fn allows(&self, value: &OptionValue) -> bool {
        match (self, value) {
            (OptionDomain::Bool, OptionValue::Bool(_)) => true,
            (OptionDomain::Enum(choices), OptionValue::Str(s)) => {
                choices.iter().any(|c| c == s)
            }
            _ => false,
        }
    }

    /// Human-readable rendering of the domain for error messages.
    pub fn describe(&self) -> String {
        match self {
            OptionDomain::Bool => "true, false".to_string(),
            OptionDomain::Enum(choices) => choices.join(", "),
        }
    }
}

/// One declared option: its domain and default value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDecl {
    pub domain: OptionDomain,
    pub default: OptionValue,
}

/// The full option declaration table of a recipe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSchema {
    decls: BTreeMap<String, OptionDecl>,
}

impl OptionSchema {
    /// Create an empty schema.
    pub fn new() -> Self {
        OptionSchema::default()
    }

    /// Declare a boolean option.
    pub fn bool_option(mut self, name: impl Into<String>, default: bool) -> Self {
        self.decls.insert(
            name.into(),
            OptionDecl {
                domain: OptionDomain::Bool,
                default: OptionValue::Bool(default),
            },
        );
        self
    }

    /// Declare an enum option with a closed choice set.
    pub fn enum_option(
        mut self,
        name: impl Into<String>,
        choices: impl IntoIterator<Item = impl Into<String>>,
        default: impl Into<String>,
    ) -> Self {
        self.decls.insert(
            name.into(),
            OptionDecl {
                domain: OptionDomain::Enum(choices.into_iter().map(|c| c.into()).collect()),
                default: OptionValue::Str(default.into()),
            },
        );
        self
    }

    /// Look up an option declaration.
    pub fn get(&self, name: &str) -> Option<&OptionDecl> {
        self.decls.get(name)
    }

    /// Whether an option is declared.
    pub fn contains(&self, name: &str) -> bool {
        self.decls.contains_key(name)
    }

    /// Iterate over all declarations in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionDecl)> {
        self.decls.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// A selection holding every option at its default, none explicit.
    pub fn defaults(&self) -> OptionSelection {
        let mut selection = OptionSelection::new();
        for (name, decl) in &self.decls {
            selection.set_default(name.clone(), decl.default.clone());
        }
        selection
    }

    /// Validate one (name, value) pair against this schema.
    pub fn validate(
        &self,
        recipe: &str,
        name: &str,
        value: &OptionValue,
    ) -> Result<(), SchemaViolation> {
        let decl = self.get(name).ok_or_else(|| SchemaViolation::UnknownOption {
            recipe: recipe.to_string(),
            option: name.to_string(),
        })?;

        if !decl.domain.allows(value) {
            return Err(SchemaViolation::DisallowedValue {
                recipe: recipe.to_string(),
                option: name.to_string(),
                value: value.to_string(),
                allowed: decl.domain.describe(),
            });
        }

        Ok(())
    }
}

/// The input selection violates the recipe's option schema.
///
/// This is a caller bug: the selection must be corrected, never retried
/// as-is.
#[derive(Debug, Error)]
pub enum SchemaViolation {
    #[error("recipe `{recipe}` has no option named `{option}`")]
    UnknownOption { recipe: String, option: String },

    #[error("option `{option}` of recipe `{recipe}` cannot be `{value}` (allowed: {allowed})")]
    DisallowedValue {
        recipe: String,
        option: String,
        value: String,
        allowed: String,
    },
}

/// One concrete instantiation of an option schema.
///
/// Mutable only during normalization; callers treat the normalized result
/// as frozen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OptionSelection {
    values: BTreeMap<String, OptionValue>,
    explicit: BTreeSet<String>,
}

impl OptionSelection {
    /// Create an empty selection.
    pub fn new() -> Self {
        OptionSelection::default()
    }

    /// Build a selection from explicit (name, value) pairs.
    pub fn from_pairs(
        pairs: impl IntoIterator<Item = (impl Into<String>, OptionValue)>,
    ) -> Self {
        let mut selection = OptionSelection::new();
        for (name, value) in pairs {
            selection.set(name.into(), value);
        }
        selection
    }

    /// Set an option explicitly (the caller chose this value).
    pub fn set(&mut self, name: impl Into<String>, value: OptionValue) {
        let name = name.into();
        self.explicit.insert(name.clone());
        self.values.insert(name, value);
    }

    /// Set an option without marking it explicit (a schema default).
    pub fn set_default(&mut self, name: impl Into<String>, value: OptionValue) {
        let name = name.into();
        if !self.values.contains_key(&name) {
            self.values.insert(name, value);
        }
    }

    /// Force an option to a value and strip its explicit mark: the value is
    /// no longer user-controlled.
    pub fn force(&mut self, name: impl Into<String>, value: OptionValue) {
        let name = name.into();
        self.explicit.remove(&name);
        self.values.insert(name, value);
    }

    /// Remove an option entirely.
    pub fn remove(&mut self, name: &str) {
        self.values.remove(name);
        self.explicit.remove(name);
    }

    /// Look up an option value.
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    /// Look up a boolean option.
    pub fn bool(&self, name: &str) -> Option<bool> {
        self.values.get(name).and_then(OptionValue::as_bool)
    }

    /// Look up an enum option.
    pub fn str(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(OptionValue::as_str)
    }

    /// Whether an option is present.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Whether the caller set this option explicitly.
    pub fn is_explicit(&self, name: &str) -> bool {
        self.explicit.contains(name)
    }

    /// Iterate over (name, value) pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of options present.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the selection is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

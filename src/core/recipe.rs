//! Recipe definitions.
//!
//! A Recipe is the declarative build description of one package: its option
//! schema, the platform adjustments the normalizer applies, the dependency
//! tables the resolver instantiates, the source patches, the generator
//! variable rules, and the component table the exporter publishes.
//!
//! Recipes are data. All decision logic lives in the engine modules
//! (`core::normalize`, `resolver`, `patch`, `builder::plan`, `export`);
//! a recipe only parameterizes them.

use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};
use semver::Version;
use url::Url;

use crate::core::dependency::DependencyDeclaration;
use crate::core::options::{OptionDomain, OptionSchema, OptionValue};
use crate::core::platform::Os;
use crate::patch::PatchSpec;

/// Where the upstream sources live.
#[derive(Debug, Clone)]
pub struct SourceLocation {
    /// Upstream archive or repository URL
    pub url: Url,

    /// Archive digest, when the recipe pins one
    pub sha256: Option<String>,
}

/// A platform-conditional correction the normalizer applies to a raw
/// selection.
///
/// Rules run in a fixed priority order regardless of declaration order:
/// first the OS-fact-driven rules (`DropOnOs`, then `ForceOnOs`), then the
/// rules conditioned on other option values (`DropWhenEnabled`). Option-
/// conditioned rules must observe post-force values, or normalization would
/// not be idempotent.
#[derive(Debug, Clone)]
pub enum Adjustment {
    /// The option has no meaning on these OS families; remove it.
    DropOnOs { option: String, oses: Vec<Os> },

    /// These OS families force the option to a fixed value regardless of
    /// user input.
    ForceOnOs {
        option: String,
        value: OptionValue,
        oses: Vec<Os>,
    },

    /// Enabling `when` makes the option implied; remove it from user
    /// control.
    DropWhenEnabled { option: String, when: String },
}

impl Adjustment {
    /// Fixed application priority; lower runs first.
    pub(crate) fn priority(&self) -> u8 {
        match self {
            Adjustment::DropOnOs { .. } => 0,
            Adjustment::ForceOnOs { .. } => 1,
            Adjustment::DropWhenEnabled { .. } => 2,
        }
    }
}

/// A boolean feature option that forces an alternatives-group selector to a
/// specific choice and pulls in extra dependencies only that choice needs.
#[derive(Debug, Clone)]
pub struct SelectorOverride {
    /// Boolean option that triggers the override
    pub when: String,

    /// The choice the selector is forced to
    pub choice: String,

    /// Extra dependencies required by the forced choice
    pub extra: Vec<DependencyDeclaration>,
}

/// A set of mutually exclusive dependency choices, selected by an enum
/// option. Exactly one member appears in a resolved dependency sequence.
#[derive(Debug, Clone)]
pub struct AlternativesGroup {
    /// Group name (used to tag the chosen member)
    pub name: String,

    /// Enum option that selects the member
    pub selector: String,

    /// Choice -> dependency
    pub members: BTreeMap<String, DependencyDeclaration>,

    /// Feature overrides, evaluated before the selector is read
    pub overrides: Vec<SelectorOverride>,
}

impl AlternativesGroup {
    /// Create a group selected by an enum option.
    pub fn new(name: impl Into<String>, selector: impl Into<String>) -> Self {
        AlternativesGroup {
            name: name.into(),
            selector: selector.into(),
            members: BTreeMap::new(),
            overrides: Vec::new(),
        }
    }

    /// Add a member for one selector choice.
    pub fn member(mut self, choice: impl Into<String>, dep: DependencyDeclaration) -> Self {
        let name = self.name.clone();
        self.members.insert(choice.into(), dep.in_group(name));
        self
    }

    /// Add a feature override.
    pub fn with_override(mut self, rule: SelectorOverride) -> Self {
        self.overrides.push(rule);
        self
    }
}

/// One rule mapping options/platform facts onto a generator variable.
#[derive(Debug, Clone)]
pub enum PlanRule {
    /// A boolean option maps directly onto a boolean variable.
    Bool { option: String, variable: String },

    /// A boolean option maps onto the negation of a boolean variable
    /// (e.g. a static-linking flag derived from a shared-library option).
    BoolNegated { option: String, variable: String },

    /// A boolean variable that is true when an enum option equals a choice.
    EnumEquals {
        option: String,
        choice: String,
        variable: String,
    },

    /// An enum option maps onto a string variable carrying the choice.
    EnumValue { option: String, variable: String },

    /// A fixed variable the recipe always sets.
    Constant { variable: String, value: OptionValue },

    /// A string variable carrying the recipe version.
    Version { variable: String },
}

/// One logical library unit in the artifact descriptor.
#[derive(Debug, Clone, Default)]
pub struct ComponentSpec {
    /// Component name
    pub name: String,

    /// Library file base names, in link order
    pub libs: Vec<String>,

    /// Other components this one links against
    pub requires: Vec<String>,

    /// System libraries needed on every OS
    pub system_libs: Vec<String>,

    /// Extra system libraries per OS family
    pub os_system_libs: BTreeMap<Os, Vec<String>>,

    /// When true, exporting on an OS without an `os_system_libs` entry is
    /// an unsupported-platform error rather than an empty set.
    pub os_libs_required: bool,

    /// Downstream CMake target name
    pub cmake_target: Option<String>,

    /// Downstream pkg-config name
    pub pkg_config: Option<String>,
}

impl ComponentSpec {
    /// Create a component with its library file names.
    pub fn new(
        name: impl Into<String>,
        libs: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        ComponentSpec {
            name: name.into(),
            libs: libs.into_iter().map(|l| l.into()).collect(),
            ..ComponentSpec::default()
        }
    }

    /// Require another component.
    pub fn requires(mut self, component: impl Into<String>) -> Self {
        self.requires.push(component.into());
        self
    }

    /// Add system libraries needed on every OS.
    pub fn with_system_libs(
        mut self,
        libs: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.system_libs.extend(libs.into_iter().map(|l| l.into()));
        self
    }

    /// Add OS-specific system libraries for a set of OS families.
    pub fn with_os_system_libs(
        mut self,
        oses: impl IntoIterator<Item = Os>,
        libs: impl IntoIterator<Item = impl Into<String>> + Clone,
    ) -> Self {
        for os in oses {
            let entry = self.os_system_libs.entry(os).or_default();
            entry.extend(libs.clone().into_iter().map(|l| l.into()));
        }
        self
    }

    /// Mark the OS table as mandatory for every export platform.
    pub fn os_libs_required(mut self) -> Self {
        self.os_libs_required = true;
        self
    }

    /// Set the downstream CMake target name.
    pub fn with_cmake_target(mut self, target: impl Into<String>) -> Self {
        self.cmake_target = Some(target.into());
        self
    }

    /// Set the downstream pkg-config name.
    pub fn with_pkg_config(mut self, name: impl Into<String>) -> Self {
        self.pkg_config = Some(name.into());
        self
    }
}

/// A named, versioned package build description.
#[derive(Debug, Clone)]
pub struct Recipe {
    /// Package name
    pub name: String,

    /// Package version being built
    pub version: Version,

    /// One-line description
    pub description: String,

    /// SPDX license expression
    pub license: Option<String>,

    /// Upstream source location
    pub source: Option<SourceLocation>,

    /// Glob patterns selecting which files a local source tree exports
    pub export_sources: Vec<String>,

    /// Option declarations
    pub schema: OptionSchema,

    /// Normalizer rules
    pub adjustments: Vec<Adjustment>,

    /// Unconditional dependencies
    pub requires: Vec<DependencyDeclaration>,

    /// Mutually exclusive dependency groups
    pub alternatives: Vec<AlternativesGroup>,

    /// Source patches, in application order
    pub patches: Vec<PatchSpec>,

    /// Generator variable rules
    pub plan_rules: Vec<PlanRule>,

    /// Build-tool targets to build (empty = all)
    pub build_targets: Vec<String>,

    /// Boolean option gating the test phase
    pub test_option: Option<String>,

    /// Descriptor components
    pub components: Vec<ComponentSpec>,
}

impl Recipe {
    /// Create a recipe with the given identity.
    pub fn new(
        name: impl Into<String>,
        version: Version,
        description: impl Into<String>,
    ) -> Self {
        Recipe {
            name: name.into(),
            version,
            description: description.into(),
            license: None,
            source: None,
            export_sources: Vec::new(),
            schema: OptionSchema::new(),
            adjustments: Vec::new(),
            requires: Vec::new(),
            alternatives: Vec::new(),
            patches: Vec::new(),
            plan_rules: Vec::new(),
            build_targets: Vec::new(),
            test_option: None,
            components: Vec::new(),
        }
    }

    /// Set the license expression.
    pub fn with_license(mut self, license: impl Into<String>) -> Self {
        self.license = Some(license.into());
        self
    }

    /// Set the upstream source location.
    pub fn with_source(mut self, url: Url, sha256: Option<String>) -> Self {
        self.source = Some(SourceLocation { url, sha256 });
        self
    }

    /// Set the export-source glob patterns.
    pub fn with_export_sources(
        mut self,
        patterns: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.export_sources = patterns.into_iter().map(|p| p.into()).collect();
        self
    }

    /// Set the option schema.
    pub fn with_schema(mut self, schema: OptionSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Add a normalizer adjustment.
    pub fn with_adjustment(mut self, adjustment: Adjustment) -> Self {
        self.adjustments.push(adjustment);
        self
    }

    /// Add an unconditional dependency.
    pub fn with_requirement(mut self, dep: DependencyDeclaration) -> Self {
        self.requires.push(dep);
        self
    }

    /// Add an alternatives group.
    pub fn with_alternatives(mut self, group: AlternativesGroup) -> Self {
        self.alternatives.push(group);
        self
    }

    /// Add a source patch.
    pub fn with_patch(mut self, patch: PatchSpec) -> Self {
        self.patches.push(patch);
        self
    }

    /// Add a plan rule.
    pub fn with_plan_rule(mut self, rule: PlanRule) -> Self {
        self.plan_rules.push(rule);
        self
    }

    /// Restrict the build phase to a named target.
    pub fn with_build_target(mut self, target: impl Into<String>) -> Self {
        self.build_targets.push(target.into());
        self
    }

    /// Gate the test phase on a boolean option.
    pub fn with_test_option(mut self, option: impl Into<String>) -> Self {
        self.test_option = Some(option.into());
        self
    }

    /// Add a descriptor component.
    pub fn with_component(mut self, component: ComponentSpec) -> Self {
        self.components.push(component);
        self
    }

    /// Check the recipe's internal consistency.
    ///
    /// Rule tables referencing undeclared options or components are
    /// construction bugs, caught here rather than at evaluation time.
    pub fn validate(&self) -> Result<()> {
        self.validate_inner()
            .with_context(|| format!("invalid recipe `{}`", self.name))
    }

    fn validate_inner(&self) -> Result<()> {
        for adjustment in &self.adjustments {
            match adjustment {
                Adjustment::DropOnOs { option, .. } => {
                    self.require_option(option)?;
                }
                Adjustment::ForceOnOs { option, value, .. } => {
                    let decl = self.require_option(option)?;
                    if !decl.domain.allows(value) {
                        bail!(
                            "adjustment forces option `{}` to `{}`, outside its domain",
                            option,
                            value
                        );
                    }
                }
                Adjustment::DropWhenEnabled { option, when } => {
                    self.require_option(option)?;
                    self.require_bool_option(when)?;
                }
            }
        }

        for group in &self.alternatives {
            let decl = self.require_option(&group.selector)?;
            let choices = match &decl.domain {
                OptionDomain::Enum(choices) => choices.clone(),
                OptionDomain::Bool => bail!(
                    "alternatives group `{}` selector `{}` must be an enum option",
                    group.name,
                    group.selector
                ),
            };
            for choice in &choices {
                if !group.members.contains_key(choice) {
                    bail!(
                        "alternatives group `{}` has no member for `{} = {}`",
                        group.name,
                        group.selector,
                        choice
                    );
                }
            }
            for rule in &group.overrides {
                self.require_bool_option(&rule.when)?;
                if !group.members.contains_key(&rule.choice) {
                    bail!(
                        "override on `{}` forces unknown choice `{}` in group `{}`",
                        rule.when,
                        rule.choice,
                        group.name
                    );
                }
            }
        }

        for rule in &self.plan_rules {
            match rule {
                PlanRule::Bool { option, .. } | PlanRule::BoolNegated { option, .. } => {
                    self.require_bool_option(option)?;
                }
                PlanRule::EnumEquals { option, choice, .. } => {
                    let decl = self.require_option(option)?;
                    match &decl.domain {
                        OptionDomain::Enum(choices) if choices.contains(choice) => {}
                        _ => bail!(
                            "plan rule compares option `{}` to unknown choice `{}`",
                            option,
                            choice
                        ),
                    }
                }
                PlanRule::EnumValue { option, .. } => {
                    self.require_option(option)?;
                }
                PlanRule::Constant { .. } | PlanRule::Version { .. } => {}
            }
        }

        if let Some(ref option) = self.test_option {
            self.require_bool_option(option)?;
        }

        let component_names: Vec<&str> =
            self.components.iter().map(|c| c.name.as_str()).collect();
        for component in &self.components {
            for required in &component.requires {
                if !component_names.contains(&required.as_str()) {
                    bail!(
                        "component `{}` requires undeclared component `{}`",
                        component.name,
                        required
                    );
                }
            }
        }

        for patch in &self.patches {
            if patch.find.is_empty() {
                bail!("patch for {} has an empty match text", patch.file.display());
            }
        }

        Ok(())
    }

    fn require_option(&self, name: &str) -> Result<&crate::core::options::OptionDecl> {
        self.schema
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("rule references undeclared option `{}`", name))
    }

    fn require_bool_option(&self, name: &str) -> Result<()> {
        let decl = self.require_option(name)?;
        if !matches!(decl.domain, OptionDomain::Bool) {
            bail!("rule requires option `{}` to be boolean", name);
        }
        Ok(())
    }
}

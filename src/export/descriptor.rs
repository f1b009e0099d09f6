//! Artifact descriptors.
//!
//! After a successful build, the exporter turns the recipe's component
//! table and the resolved dependency sequence into the structured metadata
//! downstream packagers consume: which library files were produced, how the
//! components link against each other, and which system libraries each OS
//! needs on top.

use std::collections::{BTreeMap, BTreeSet};

use petgraph::algo::toposort;
use petgraph::graph::DiGraph;
use semver::Version;
use serde::Serialize;
use thiserror::Error;

use crate::core::dependency::DependencyDeclaration;
use crate::core::platform::{Os, PlatformFacts};
use crate::core::recipe::Recipe;

/// One logical library unit in the descriptor.
#[derive(Debug, Clone, Serialize)]
pub struct Component {
    /// Library file base names, in link order
    pub libs: Vec<String>,

    /// Components this one links against
    pub requires: BTreeSet<String>,

    /// System libraries needed on every OS
    pub system_libs: BTreeSet<String>,

    /// Extra system libraries per OS family
    pub os_system_libs: BTreeMap<Os, BTreeSet<String>>,

    /// Downstream CMake target name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmake_target: Option<String>,

    /// Downstream pkg-config name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pkg_config: Option<String>,
}

impl Component {
    /// The full system-library set for one OS: the common set plus that
    /// OS's extras.
    pub fn system_libs_for(&self, os: Os) -> BTreeSet<String> {
        let mut libs = self.system_libs.clone();
        if let Some(extra) = self.os_system_libs.get(&os) {
            libs.extend(extra.iter().cloned());
        }
        libs
    }
}

/// Structured description of what a successful build produced.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactDescriptor {
    /// Recipe name
    pub recipe: String,

    /// Built version
    pub version: Version,

    /// Platform the build ran against
    pub platform: PlatformFacts,

    /// Fingerprint of the pristine source tree, when one was taken
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_fingerprint: Option<String>,

    /// The resolved dependency sequence the build used
    pub dependencies: Vec<DependencyDeclaration>,

    /// Components in name order
    pub components: BTreeMap<String, Component>,
}

/// Failure to construct a descriptor.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("recipe `{recipe}` does not support {os}: component `{component}` has no system-library mapping")]
    UnsupportedPlatform {
        recipe: String,
        component: String,
        os: Os,
    },

    #[error("component `{component}` of `{recipe}` requires undeclared component `{requires}`")]
    UnknownComponent {
        recipe: String,
        component: String,
        requires: String,
    },

    #[error("component graph of `{recipe}` is cyclic at `{component}`")]
    ComponentCycle { recipe: String, component: String },
}

/// Build the artifact descriptor for a successful evaluation.
///
/// Component `requires` edges must form a DAG; a component transitively
/// requiring itself is a recipe bug and is rejected here rather than
/// shipped to downstream packagers.
pub fn export_descriptor(
    recipe: &Recipe,
    resolved: &[DependencyDeclaration],
    platform: &PlatformFacts,
    source_fingerprint: Option<String>,
) -> Result<ArtifactDescriptor, ExportError> {
    let mut graph: DiGraph<&str, ()> = DiGraph::new();
    let mut nodes = BTreeMap::new();
    for spec in &recipe.components {
        nodes.insert(spec.name.as_str(), graph.add_node(spec.name.as_str()));
    }

    let mut components = BTreeMap::new();

    for spec in &recipe.components {
        if spec.os_libs_required && !spec.os_system_libs.contains_key(&platform.os) {
            return Err(ExportError::UnsupportedPlatform {
                recipe: recipe.name.clone(),
                component: spec.name.clone(),
                os: platform.os,
            });
        }

        for required in &spec.requires {
            let Some(&target) = nodes.get(required.as_str()) else {
                return Err(ExportError::UnknownComponent {
                    recipe: recipe.name.clone(),
                    component: spec.name.clone(),
                    requires: required.clone(),
                });
            };
            graph.add_edge(nodes[spec.name.as_str()], target, ());
        }

        components.insert(
            spec.name.clone(),
            Component {
                libs: spec.libs.clone(),
                requires: spec.requires.iter().cloned().collect(),
                system_libs: spec.system_libs.iter().cloned().collect(),
                os_system_libs: spec
                    .os_system_libs
                    .iter()
                    .map(|(os, libs)| (*os, libs.iter().cloned().collect()))
                    .collect(),
                cmake_target: spec.cmake_target.clone(),
                pkg_config: spec.pkg_config.clone(),
            },
        );
    }

    if let Err(cycle) = toposort(&graph, None) {
        return Err(ExportError::ComponentCycle {
            recipe: recipe.name.clone(),
            component: graph[cycle.node_id()].to_string(),
        });
    }

    tracing::info!(
        recipe = %recipe.name,
        version = %recipe.version,
        components = components.len(),
        "exported artifact descriptor"
    );

    Ok(ArtifactDescriptor {
        recipe: recipe.name.clone(),
        version: recipe.version.clone(),
        platform: *platform,
        source_fingerprint,
        dependencies: resolved.to_vec(),
        components,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::platform::{Arch, BuildMode, Compiler};
    use crate::core::recipe::ComponentSpec;

    fn platform(os: Os) -> PlatformFacts {
        PlatformFacts {
            os,
            compiler: Compiler::default_for(os),
            arch: Arch::X86_64,
            build_mode: BuildMode::Release,
        }
    }

    fn tls_recipe() -> Recipe {
        Recipe::new("boringssl", Version::new(24, 0, 0), "TLS library")
            .with_component(
                ComponentSpec::new("crypto", ["crypto"])
                    .with_os_system_libs(
                        [Os::Windows],
                        ["crypt32", "ws2_32", "advapi32", "user32", "bcrypt"],
                    )
                    .with_os_system_libs([Os::Linux, Os::FreeBsd], ["dl", "rt", "pthread"]),
            )
            .with_component(ComponentSpec::new("ssl", ["ssl"]).requires("crypto"))
    }

    #[test]
    fn test_component_edges_and_os_libs() {
        let recipe = tls_recipe();
        let descriptor =
            export_descriptor(&recipe, &[], &platform(Os::Linux), None).unwrap();

        let ssl = &descriptor.components["ssl"];
        assert!(ssl.requires.contains("crypto"));

        let crypto = &descriptor.components["crypto"];
        let linux_libs = crypto.system_libs_for(Os::Linux);
        assert!(linux_libs.contains("pthread"));
        assert!(!linux_libs.contains("crypt32"));

        let windows_libs = crypto.system_libs_for(Os::Windows);
        assert!(windows_libs.contains("crypt32"));
        assert!(!windows_libs.contains("rt"));

        // macOS has no extra entry and that is fine: empty extras.
        assert!(crypto.system_libs_for(Os::Macos).is_empty());
    }

    #[test]
    fn test_unsupported_platform() {
        let recipe = Recipe::new("demo", Version::new(1, 0, 0), "demo").with_component(
            ComponentSpec::new("runtime", ["runtime"])
                .with_os_system_libs([Os::Linux], ["pthread"])
                .os_libs_required(),
        );

        let err = export_descriptor(&recipe, &[], &platform(Os::Macos), None).unwrap_err();
        assert!(matches!(err, ExportError::UnsupportedPlatform { .. }));
    }

    #[test]
    fn test_cycle_rejected() {
        let recipe = Recipe::new("demo", Version::new(1, 0, 0), "demo")
            .with_component(ComponentSpec::new("a", ["a"]).requires("b"))
            .with_component(ComponentSpec::new("b", ["b"]).requires("a"));

        let err = export_descriptor(&recipe, &[], &platform(Os::Linux), None).unwrap_err();
        assert!(matches!(err, ExportError::ComponentCycle { .. }));
    }

    #[test]
    fn test_self_cycle_rejected() {
        let recipe = Recipe::new("demo", Version::new(1, 0, 0), "demo")
            .with_component(ComponentSpec::new("a", ["a"]).requires("a"));

        let err = export_descriptor(&recipe, &[], &platform(Os::Linux), None).unwrap_err();
        assert!(matches!(err, ExportError::ComponentCycle { .. }));
    }

    #[test]
    fn test_unknown_component_rejected() {
        let recipe = Recipe::new("demo", Version::new(1, 0, 0), "demo")
            .with_component(ComponentSpec::new("ssl", ["ssl"]).requires("crypto"));

        let err = export_descriptor(&recipe, &[], &platform(Os::Linux), None).unwrap_err();
        assert!(matches!(err, ExportError::UnknownComponent { .. }));
    }

    #[test]
    fn test_descriptor_echoes_dependencies() {
        let recipe = tls_recipe();
        let deps = vec![DependencyDeclaration::parse("zlib", ">=1.2").unwrap()];
        let descriptor =
            export_descriptor(&recipe, &deps, &platform(Os::Linux), Some("abc123".into()))
                .unwrap();

        assert_eq!(descriptor.dependencies.len(), 1);
        assert_eq!(descriptor.source_fingerprint.as_deref(), Some("abc123"));

        let json = serde_json::to_string_pretty(&descriptor).unwrap();
        assert!(json.contains("\"recipe\": \"boringssl\""));
        assert!(json.contains("\"crypto\""));
    }
}

//! libmaxminddb: the C reader library for the MaxMind DB format.

use anyhow::Result;
use semver::Version;
use url::Url;

use crate::core::options::{OptionSchema, OptionValue};
use crate::core::platform::Os;
use crate::core::recipe::{Adjustment, ComponentSpec, PlanRule, Recipe};
use crate::patch::PatchSpec;

/// The `maxminddb` recipe.
pub fn recipe() -> Result<Recipe> {
    let recipe = Recipe::new(
        "maxminddb",
        Version::new(1, 9, 1),
        "C library for the MaxMind DB file format",
    )
    .with_license("Apache-2.0")
    .with_source(
        Url::parse("https://github.com/maxmind/libmaxminddb/releases")?,
        None,
    )
    .with_schema(
        OptionSchema::new()
            .bool_option("shared", false)
            .bool_option("fpic", true),
    )
    .with_adjustment(Adjustment::DropOnOs {
        option: "fpic".to_string(),
        oses: vec![Os::Windows],
    })
    .with_adjustment(Adjustment::DropWhenEnabled {
        option: "fpic".to_string(),
        when: "shared".to_string(),
    })
    // The lookup tool links pthread by name; go through the Threads
    // package so non-glibc platforms resolve it too.
    .with_patch(PatchSpec::new(
        "bin/CMakeLists.txt",
        "target_link_libraries(mmdblookup maxminddb pthread)",
        "find_package(Threads REQUIRED)\n\
         target_link_libraries(mmdblookup maxminddb Threads::Threads)",
    ))
    .with_plan_rule(PlanRule::Constant {
        variable: "BUILD_TESTING".to_string(),
        value: OptionValue::Bool(false),
    })
    .with_plan_rule(PlanRule::Bool {
        option: "shared".to_string(),
        variable: "BUILD_SHARED_LIBS".to_string(),
    })
    .with_plan_rule(PlanRule::Bool {
        option: "fpic".to_string(),
        variable: "CMAKE_POSITION_INDEPENDENT_CODE".to_string(),
    })
    .with_component(
        ComponentSpec::new("maxminddb", ["maxminddb"])
            .with_cmake_target("maxminddb::maxminddb")
            .with_pkg_config("libmaxminddb"),
    );

    recipe.validate()?;
    Ok(recipe)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::plan::{generate_plan, PlanValue};
    use crate::core::normalize::normalize;
    use crate::core::options::{OptionSelection, OptionValue};
    use crate::core::platform::{Arch, BuildMode, Compiler, PlatformFacts};

    fn platform(os: Os) -> PlatformFacts {
        PlatformFacts {
            os,
            compiler: Compiler::default_for(os),
            arch: Arch::X86_64,
            build_mode: BuildMode::Release,
        }
    }

    #[test]
    fn test_upstream_tests_always_off() {
        let recipe = recipe().unwrap();
        let selection =
            normalize(&recipe, &OptionSelection::new(), &platform(Os::Linux)).unwrap();
        let plan = generate_plan(&recipe, &selection, &platform(Os::Linux));

        assert_eq!(plan.get("BUILD_TESTING"), Some(&PlanValue::Bool(false)));
    }

    #[test]
    fn test_shared_drops_fpic() {
        let recipe = recipe().unwrap();
        let raw = OptionSelection::from_pairs([("shared", OptionValue::Bool(true))]);
        let selection = normalize(&recipe, &raw, &platform(Os::Linux)).unwrap();

        assert!(!selection.contains("fpic"));
        let plan = generate_plan(&recipe, &selection, &platform(Os::Linux));
        assert_eq!(plan.get("BUILD_SHARED_LIBS"), Some(&PlanValue::Bool(true)));
        assert!(plan.get("CMAKE_POSITION_INDEPENDENT_CODE").is_none());
    }

    #[test]
    fn test_patch_targets_lookup_tool() {
        let recipe = recipe().unwrap();
        assert_eq!(recipe.patches.len(), 1);
        assert!(recipe.patches[0]
            .file
            .to_string_lossy()
            .contains("bin/CMakeLists.txt"));
    }
}

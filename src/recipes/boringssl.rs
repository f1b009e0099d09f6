//! BoringSSL: a TLS library with split crypto/ssl components.

use anyhow::Result;
use semver::Version;
use url::Url;

use crate::core::options::{OptionSchema, OptionValue};
use crate::core::platform::Os;
use crate::core::recipe::{Adjustment, ComponentSpec, PlanRule, Recipe};
use crate::patch::PatchSpec;

/// The `boringssl` recipe.
pub fn recipe() -> Result<Recipe> {
    let recipe = Recipe::new(
        "boringssl",
        Version::new(24, 0, 0),
        "BoringSSL is a fork of OpenSSL that is designed to meet Google's needs",
    )
    .with_license("OpenSSL AND ISC AND MIT")
    .with_source(
        Url::parse("https://boringssl.googlesource.com/boringssl")?,
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
    // Only the bssl tool target is needed for installation.
    .with_build_target("bssl")
    // The upstream tool bundle defaults to a macOS app bundle, which breaks
    // plain install trees.
    .with_patch(PatchSpec::new(
        "tool/CMakeLists.txt",
        "install_if_enabled(TARGETS bssl DESTINATION ${INSTALL_DESTINATION_DEFAULT})",
        "set_target_properties(bssl PROPERTIES MACOSX_BUNDLE False)\n\
         install_if_enabled(TARGETS bssl DESTINATION ${INSTALL_DESTINATION_DEFAULT})",
    ))
    .with_plan_rule(PlanRule::Constant {
        variable: "FUZZ".to_string(),
        value: OptionValue::Bool(false),
    })
    .with_plan_rule(PlanRule::Constant {
        variable: "RUST_BINDINGS".to_string(),
        value: OptionValue::Bool(false),
    })
    .with_plan_rule(PlanRule::Constant {
        variable: "FIPS".to_string(),
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
        ComponentSpec::new("crypto", ["crypto"])
            .with_cmake_target("BoringSSL::Crypto")
            .with_pkg_config("libcrypto")
            .with_os_system_libs(
                [Os::Windows],
                ["crypt32", "ws2_32", "advapi32", "user32", "bcrypt"],
            )
            .with_os_system_libs([Os::Linux, Os::FreeBsd], ["dl", "rt", "pthread"]),
    )
    .with_component(
        ComponentSpec::new("ssl", ["ssl"])
            .with_cmake_target("BoringSSL::SSL")
            .with_pkg_config("libssl")
            .requires("crypto"),
    );

    recipe.validate()?;
    Ok(recipe)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::plan::{generate_plan, PlanValue};
    use crate::core::normalize::normalize;
    use crate::core::options::OptionSelection;
    use crate::core::platform::{Arch, BuildMode, Compiler, PlatformFacts};
    use crate::export::descriptor::export_descriptor;
    use crate::resolver::resolve;

    fn platform(os: Os) -> PlatformFacts {
        PlatformFacts {
            os,
            compiler: Compiler::default_for(os),
            arch: Arch::X86_64,
            build_mode: BuildMode::Release,
        }
    }

    #[test]
    fn test_no_dependencies() {
        let recipe = recipe().unwrap();
        let selection = recipe.schema.defaults();
        assert!(resolve(&recipe, &selection).unwrap().is_empty());
    }

    #[test]
    fn test_plan_pins_hardening_constants() {
        let recipe = recipe().unwrap();
        let selection =
            normalize(&recipe, &OptionSelection::new(), &platform(Os::Linux)).unwrap();
        let plan = generate_plan(&recipe, &selection, &platform(Os::Linux));

        assert_eq!(plan.get("FUZZ"), Some(&PlanValue::Bool(false)));
        assert_eq!(plan.get("RUST_BINDINGS"), Some(&PlanValue::Bool(false)));
        assert_eq!(plan.get("FIPS"), Some(&PlanValue::Bool(false)));
        assert_eq!(
            plan.get("CMAKE_POSITION_INDEPENDENT_CODE"),
            Some(&PlanValue::Bool(true))
        );
    }

    #[test]
    fn test_windows_plan_has_no_pic_variable() {
        let recipe = recipe().unwrap();
        let selection =
            normalize(&recipe, &OptionSelection::new(), &platform(Os::Windows)).unwrap();
        let plan = generate_plan(&recipe, &selection, &platform(Os::Windows));

        assert!(plan.get("CMAKE_POSITION_INDEPENDENT_CODE").is_none());
    }

    #[test]
    fn test_ssl_requires_crypto() {
        let recipe = recipe().unwrap();
        let descriptor =
            export_descriptor(&recipe, &[], &platform(Os::Linux), None).unwrap();

        assert!(descriptor.components["ssl"].requires.contains("crypto"));
        assert!(descriptor.components["crypto"]
            .system_libs_for(Os::Windows)
            .contains("bcrypt"));
    }

    #[test]
    fn test_build_restricted_to_bssl_target() {
        let recipe = recipe().unwrap();
        assert_eq!(recipe.build_targets, ["bssl"]);
    }
}

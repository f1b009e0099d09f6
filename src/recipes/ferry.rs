//! Ferry: a flexible rule-based proxy application.
//!
//! This is the largest recipe and exercises every engine feature: mobile
//! platform forcing, a three-way TLS alternatives group with a feature
//! override, conditional test execution, and a full generator-variable
//! table.

use anyhow::Result;
use semver::Version;

use crate::core::dependency::DependencyDeclaration;
use crate::core::options::{OptionSchema, OptionValue};
use crate::core::platform::Os;
use crate::core::recipe::{
    Adjustment, AlternativesGroup, ComponentSpec, PlanRule, Recipe, SelectorOverride,
};

const MOBILE: [Os; 4] = [Os::Android, Os::Ios, Os::TvOs, Os::WatchOs];

/// The `ferry` recipe.
pub fn recipe() -> Result<Recipe> {
    let recipe = Recipe::new(
        "ferry",
        Version::new(1, 5, 0),
        "Flexible rule-based proxy",
    )
    .with_license("BSD-3-Clause")
    .with_export_sources([
        "CMakeLists.txt",
        "cmake/**/*",
        "include/**/*",
        "src/**/*",
        "server/**/*",
        "test/**/*",
    ])
    .with_schema(
        OptionSchema::new()
            .bool_option("shared", false)
            .bool_option("fpic", true)
            .bool_option("build_test", true)
            .bool_option("build_server", true)
            .bool_option("tls_fingerprint", false)
            .enum_option("transparent", ["none", "pf", "iptables"], "none")
            .enum_option(
                "tls_backend",
                ["openssl", "libressl", "boringssl"],
                "openssl",
            ),
    )
    .with_adjustment(Adjustment::DropOnOs {
        option: "fpic".to_string(),
        oses: vec![Os::Windows],
    })
    .with_adjustment(Adjustment::DropWhenEnabled {
        option: "fpic".to_string(),
        when: "shared".to_string(),
    })
    .with_adjustment(Adjustment::ForceOnOs {
        option: "build_test".to_string(),
        value: OptionValue::Bool(false),
        oses: MOBILE.to_vec(),
    })
    .with_adjustment(Adjustment::ForceOnOs {
        option: "build_server".to_string(),
        value: OptionValue::Bool(false),
        oses: MOBILE.to_vec(),
    })
    .with_adjustment(Adjustment::ForceOnOs {
        option: "shared".to_string(),
        value: OptionValue::Bool(false),
        oses: MOBILE.to_vec(),
    })
    .with_requirement(DependencyDeclaration::parse("boost", ">=1.72.0")?)
    .with_requirement(DependencyDeclaration::parse("mbedtls", ">=3.0.0")?)
    .with_requirement(DependencyDeclaration::parse("libsodium", ">=1.0.12")?)
    .with_requirement(DependencyDeclaration::parse("maxminddb", ">=1.5.0")?)
    .with_requirement(DependencyDeclaration::parse("rapidjson", "=1.1.0")?)
    .with_alternatives(
        AlternativesGroup::new("tls", "tls_backend")
            .member("openssl", DependencyDeclaration::parse("openssl", ">=1.1.1")?)
            .member("libressl", DependencyDeclaration::parse("libressl", ">=3.5.0")?)
            .member("boringssl", DependencyDeclaration::parse("boringssl", ">=18")?)
            .with_override(SelectorOverride {
                when: "tls_fingerprint".to_string(),
                choice: "boringssl".to_string(),
                extra: vec![DependencyDeclaration::parse("brotli", ">=1.0.0")?],
            }),
    )
    .with_plan_rule(PlanRule::Version {
        variable: "VERSION".to_string(),
    })
    .with_plan_rule(PlanRule::Constant {
        variable: "INSTALL_DEVEL".to_string(),
        value: OptionValue::Bool(true),
    })
    .with_plan_rule(PlanRule::Constant {
        variable: "CMAKE_CXX_STANDARD".to_string(),
        value: OptionValue::Str("17".to_string()),
    })
    .with_plan_rule(PlanRule::Bool {
        option: "build_server".to_string(),
        variable: "BUILD_SERVER".to_string(),
    })
    .with_plan_rule(PlanRule::Bool {
        option: "build_test".to_string(),
        variable: "BUILD_TEST".to_string(),
    })
    .with_plan_rule(PlanRule::EnumEquals {
        option: "transparent".to_string(),
        choice: "pf".to_string(),
        variable: "TRANSPARENT_PF".to_string(),
    })
    .with_plan_rule(PlanRule::EnumEquals {
        option: "transparent".to_string(),
        choice: "iptables".to_string(),
        variable: "TRANSPARENT_IPTABLES".to_string(),
    })
    .with_plan_rule(PlanRule::Bool {
        option: "tls_fingerprint".to_string(),
        variable: "TLS_FINGERPRINT".to_string(),
    })
    .with_plan_rule(PlanRule::Bool {
        option: "shared".to_string(),
        variable: "BUILD_SHARED_LIBS".to_string(),
    })
    .with_plan_rule(PlanRule::Bool {
        option: "fpic".to_string(),
        variable: "CMAKE_POSITION_INDEPENDENT_CODE".to_string(),
    })
    .with_test_option("build_test")
    .with_component(
        ComponentSpec::new("ferry", ["ferry"])
            .with_cmake_target("ferry::ferry")
            .with_pkg_config("libferry"),
    );

    recipe.validate()?;
    Ok(recipe)
}

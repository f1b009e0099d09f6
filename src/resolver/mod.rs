//! Requirement resolution.
//!
//! Resolution maps a normalized option selection onto the ordered sequence
//! of dependency declarations a recipe needs. It is a pure function of the
//! selection: no clock, environment, or hidden state feeds it, so two calls
//! with equal inputs yield identical sequences.
//!
//! Alternatives groups are resolved first. Each group evaluates its feature
//! overrides before reading the selector: an override may redirect a
//! *defaulted* selector silently, but an explicitly pinned selector that
//! conflicts with an override is reported as unsatisfiable rather than
//! guessed around.

pub mod errors;

pub use errors::ResolveError;

use crate::core::dependency::DependencyDeclaration;
use crate::core::options::OptionSelection;
use crate::core::recipe::Recipe;

/// Resolve the dependency declarations for a normalized selection.
pub fn resolve(
    recipe: &Recipe,
    selection: &OptionSelection,
) -> Result<Vec<DependencyDeclaration>, ResolveError> {
    let mut resolved = Vec::new();

    for group in &recipe.alternatives {
        let mut effective = selection.str(&group.selector).map(str::to_owned);
        let mut extra = Vec::new();

        for rule in &group.overrides {
            if selection.bool(&rule.when) != Some(true) {
                continue;
            }

            if selection.is_explicit(&group.selector) {
                if let Some(ref pinned) = effective {
                    if pinned != &rule.choice {
                        return Err(ResolveError::UnsatisfiableSelection {
                            recipe: recipe.name.clone(),
                            selector: group.selector.clone(),
                            pinned: pinned.clone(),
                            feature: rule.when.clone(),
                            required: rule.choice.clone(),
                        });
                    }
                }
            }

            if effective.as_deref() != Some(rule.choice.as_str()) {
                tracing::debug!(
                    feature = %rule.when,
                    selector = %group.selector,
                    choice = %rule.choice,
                    "feature override redirects defaulted selector"
                );
            }
            effective = Some(rule.choice.clone());
            extra.extend(rule.extra.iter().cloned());
        }

        let choice = effective.ok_or_else(|| ResolveError::MissingSelector {
            recipe: recipe.name.clone(),
            group: group.name.clone(),
            selector: group.selector.clone(),
        })?;

        let member =
            group
                .members
                .get(&choice)
                .ok_or_else(|| ResolveError::UnknownAlternative {
                    recipe: recipe.name.clone(),
                    group: group.name.clone(),
                    selector: group.selector.clone(),
                    choice: choice.clone(),
                })?;

        resolved.push(member.clone());
        resolved.extend(extra);
    }

    resolved.extend(recipe.requires.iter().cloned());

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::options::{OptionSchema, OptionValue};
    use crate::core::recipe::{AlternativesGroup, SelectorOverride};
    use semver::Version;

    /// A recipe with a three-way TLS backend group and a fingerprint
    /// feature that requires one specific backend plus a compression
    /// library.
    fn recipe() -> Recipe {
        Recipe::new("demo", Version::new(1, 0, 0), "demo")
            .with_schema(
                OptionSchema::new()
                    .bool_option("tls_fingerprint", false)
                    .enum_option(
                        "tls_backend",
                        ["openssl", "libressl", "boringssl"],
                        "openssl",
                    ),
            )
            .with_alternatives(
                AlternativesGroup::new("tls", "tls_backend")
                    .member(
                        "openssl",
                        DependencyDeclaration::parse("openssl", ">=1.1.1").unwrap(),
                    )
                    .member(
                        "libressl",
                        DependencyDeclaration::parse("libressl", ">=3.5").unwrap(),
                    )
                    .member(
                        "boringssl",
                        DependencyDeclaration::parse("boringssl", ">=18").unwrap(),
                    )
                    .with_override(SelectorOverride {
                        when: "tls_fingerprint".to_string(),
                        choice: "boringssl".to_string(),
                        extra: vec![DependencyDeclaration::parse("brotli", ">=1.0").unwrap()],
                    }),
            )
            .with_requirement(DependencyDeclaration::parse("boost", ">=1.72").unwrap())
            .with_requirement(DependencyDeclaration::parse("libsodium", ">=1.0.12").unwrap())
    }

    fn names(deps: &[DependencyDeclaration]) -> Vec<&str> {
        deps.iter().map(|d| d.name()).collect()
    }

    #[test]
    fn test_default_backend() {
        let recipe = recipe();
        let selection = recipe.schema.defaults();
        let deps = resolve(&recipe, &selection).unwrap();

        assert_eq!(names(&deps), ["openssl", "boost", "libsodium"]);
    }

    #[test]
    fn test_explicit_backend() {
        let recipe = recipe();
        let mut selection = recipe.schema.defaults();
        selection.set("tls_backend", OptionValue::Str("libressl".into()));

        let deps = resolve(&recipe, &selection).unwrap();
        assert_eq!(names(&deps), ["libressl", "boost", "libsodium"]);
    }

    #[test]
    fn test_override_redirects_defaulted_selector() {
        let recipe = recipe();
        let mut selection = recipe.schema.defaults();
        selection.set("tls_fingerprint", OptionValue::Bool(true));

        let deps = resolve(&recipe, &selection).unwrap();
        assert_eq!(names(&deps), ["boringssl", "brotli", "boost", "libsodium"]);
    }

    #[test]
    fn test_override_conflicts_with_explicit_pin() {
        let recipe = recipe();
        let mut selection = recipe.schema.defaults();
        selection.set("tls_backend", OptionValue::Str("openssl".into()));
        selection.set("tls_fingerprint", OptionValue::Bool(true));

        let err = resolve(&recipe, &selection).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::UnsatisfiableSelection { .. }
        ));
    }

    #[test]
    fn test_override_agrees_with_explicit_pin() {
        let recipe = recipe();
        let mut selection = recipe.schema.defaults();
        selection.set("tls_backend", OptionValue::Str("boringssl".into()));
        selection.set("tls_fingerprint", OptionValue::Bool(true));

        let deps = resolve(&recipe, &selection).unwrap();
        assert_eq!(names(&deps), ["boringssl", "brotli", "boost", "libsodium"]);
    }

    #[test]
    fn test_group_exclusivity() {
        let recipe = recipe();
        for fingerprint in [false, true] {
            let mut selection = recipe.schema.defaults();
            selection.set("tls_fingerprint", OptionValue::Bool(fingerprint));

            let deps = resolve(&recipe, &selection).unwrap();
            let tls_members = deps.iter().filter(|d| d.group() == Some("tls")).count();
            assert_eq!(tls_members, 1);
        }
    }

    #[test]
    fn test_pure_resolution() {
        let recipe = recipe();
        let mut selection = recipe.schema.defaults();
        selection.set("tls_fingerprint", OptionValue::Bool(true));

        let first = resolve(&recipe, &selection).unwrap();
        let second = resolve(&recipe, &selection).unwrap();
        assert_eq!(first, second);
    }
}

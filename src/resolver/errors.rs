//! Resolution error types and diagnostics.

use thiserror::Error;

use crate::util::diagnostic::Diagnostic;

/// Error during requirement resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("unsatisfiable option selection for `{recipe}`")]
    UnsatisfiableSelection {
        recipe: String,
        selector: String,
        pinned: String,
        feature: String,
        required: String,
    },

    #[error("recipe `{recipe}` resolved no value for selector `{selector}`")]
    MissingSelector {
        recipe: String,
        group: String,
        selector: String,
    },

    #[error("recipe `{recipe}` has no dependency for `{selector} = {choice}`")]
    UnknownAlternative {
        recipe: String,
        group: String,
        selector: String,
        choice: String,
    },
}

impl ResolveError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ResolveError::UnsatisfiableSelection {
                recipe,
                selector,
                pinned,
                feature,
                required,
            } => Diagnostic::error(format!(
                "unsatisfiable option selection for `{}`",
                recipe
            ))
            .with_context(format!("`{}` is explicitly set to `{}`", selector, pinned))
            .with_context(format!(
                "`{} = true` requires `{} = {}`",
                feature, selector, required
            ))
            .with_suggestion(format!(
                "Remove the explicit `{}` choice and let `{}` select it",
                selector, feature
            ))
            .with_suggestion(format!("Disable `{}`", feature)),

            ResolveError::MissingSelector {
                recipe,
                group,
                selector,
            } => Diagnostic::error(format!(
                "no value for selector `{}` of group `{}` in `{}`",
                selector, group, recipe
            ))
            .with_suggestion(format!(
                "Pass `-o {}=<choice>` or normalize the selection first",
                selector
            )),

            ResolveError::UnknownAlternative {
                recipe,
                group,
                selector,
                choice,
            } => Diagnostic::error(format!(
                "recipe `{}` has no dependency for `{} = {}`",
                recipe, selector, choice
            ))
            .with_context(format!("alternatives group `{}` does not cover it", group)),
        }
    }
}

//! User-friendly diagnostic messages.
//!
//! Every error surfaced to the user must include the root cause, the
//! conflicting constraints, and suggested fixes.

use std::fmt;
use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Suggestion when a recipe name is not recognized.
    pub const UNKNOWN_RECIPE: &str = "help: Run `slipway recipes` to list available recipes";

    /// Suggestion when an option selection conflicts.
    pub const CONFLICTING_SELECTION: &str =
        "help: Run `slipway options <recipe>` to inspect the normalized selection";

    /// Suggestion when a patch does not apply.
    pub const PATCH_MISMATCH: &str =
        "help: The fetched sources do not match this recipe version; check the upstream tree";
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Note,
    Help,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
            Severity::Help => write!(f, "help"),
        }
    }
}

/// A diagnostic message with optional suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Severity level
    pub severity: Severity,
    /// Additional context lines
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
    /// Related location (file path)
    pub location: Option<PathBuf>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity: Severity::Error,
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    /// Create a new warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity: Severity::Warning,
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    /// Add context to the diagnostic.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Add a suggestion for fixing the issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Add a file location.
    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut output = String::new();

        let severity_str = if color {
            match self.severity {
                Severity::Error => "\x1b[1;31merror\x1b[0m",
                Severity::Warning => "\x1b[1;33mwarning\x1b[0m",
                Severity::Note => "\x1b[1;36mnote\x1b[0m",
                Severity::Help => "\x1b[1;32mhelp\x1b[0m",
            }
        } else {
            match self.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
                Severity::Note => "note",
                Severity::Help => "help",
            }
        };

        output.push_str(&format!("{}: {}\n", severity_str, self.message));

        if let Some(ref path) = self.location {
            output.push_str(&format!("  --> {}\n", path.display()));
        }

        for ctx in &self.context {
            output.push_str(&format!("  -> {}\n", ctx));
        }

        if !self.suggestions.is_empty() {
            output.push('\n');
            let help_prefix = if color {
                "\x1b[1;32mhelp\x1b[0m"
            } else {
                "help"
            };
            output.push_str(&format!("{}: consider:\n", help_prefix));
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// Option selection conflict with detailed diagnostics.
#[derive(Debug, Error, MietteDiagnostic)]
#[error("unsatisfiable option selection for `{recipe}`")]
#[diagnostic(
    code(slipway::resolve::unsatisfiable),
    help("Drop the explicit `{selector}` choice or disable `{feature}`")
)]
pub struct SelectionConflictError {
    pub recipe: String,
    pub selector: String,
    pub feature: String,
}

/// Patch mismatch against the fetched source tree.
#[derive(Debug, Error, MietteDiagnostic)]
#[error("patch for `{recipe}` does not apply to {file}")]
#[diagnostic(
    code(slipway::patch::drift),
    help("The upstream sources changed incompatibly with this recipe version; update the recipe")
)]
pub struct PatchDriftError {
    pub recipe: String,
    pub file: String,
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_formatting() {
        let diag = Diagnostic::error("unsatisfiable option selection for `ferry`")
            .with_context("`tls_backend` is pinned to `openssl`")
            .with_context("`tls_fingerprint = true` requires `boringssl`")
            .with_suggestion("Remove the explicit `tls_backend` choice")
            .with_suggestion("Disable `tls_fingerprint`");

        let output = diag.format(false);
        assert!(output.contains("error: unsatisfiable option selection"));
        assert!(output.contains("pinned to `openssl`"));
        assert!(output.contains("help: consider:"));
        assert!(output.contains("1. Remove the explicit"));
    }
}

//! Full recipe evaluation.
//!
//! One evaluation runs the whole pipeline for a single
//! package-version-option combination:
//!
//! normalize -> resolve -> fetch -> fingerprint -> patch -> plan
//!   -> configure/build/(test)/install -> export -> publish
//!
//! The flow is sequential and non-reentrant. Every failure aborts the
//! evaluation before a descriptor exists, so a published descriptor always
//! describes a build that actually succeeded.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::builder::plan::generate_plan;
use crate::builder::tool::BuildTool;
use crate::core::normalize::normalize;
use crate::core::options::OptionSelection;
use crate::core::platform::PlatformFacts;
use crate::core::recipe::Recipe;
use crate::export::descriptor::{export_descriptor, ArtifactDescriptor};
use crate::export::sink::MetadataSink;
use crate::patch::apply_patches;
use crate::resolver::resolve;
use crate::sources::SourceFetcher;

/// The outcome of a successful evaluation.
#[derive(Debug)]
pub struct Evaluation {
    /// The published descriptor
    pub descriptor: ArtifactDescriptor,

    /// Where the build tool installed the artifacts
    pub artifact_dir: PathBuf,
}

/// Evaluate one recipe end to end.
pub fn evaluate(
    recipe: &Recipe,
    raw: &OptionSelection,
    platform: &PlatformFacts,
    fetcher: &mut dyn SourceFetcher,
    tool: &mut dyn BuildTool,
    sink: &mut dyn MetadataSink,
) -> Result<Evaluation> {
    tracing::info!(
        recipe = %recipe.name,
        version = %recipe.version,
        %platform,
        "evaluating recipe"
    );

    let selection = normalize(recipe, raw, platform)
        .with_context(|| format!("normalizing options for `{}`", recipe.name))?;

    let dependencies = resolve(recipe, &selection)
        .with_context(|| format!("resolving requirements of `{}`", recipe.name))?;
    for dep in &dependencies {
        tracing::info!(dependency = %dep, "requires");
    }

    let tree = fetcher.fetch(&recipe.name, &recipe.version)?;

    let fingerprint = tree
        .fingerprint()
        .with_context(|| format!("fingerprinting sources of `{}`", recipe.name))?;
    tracing::debug!(%fingerprint, "pristine source fingerprint");

    apply_patches(tree.root(), &recipe.patches)
        .with_context(|| format!("patching sources of `{}` {}", recipe.name, recipe.version))?;

    let plan = generate_plan(recipe, &selection, platform);

    tool.configure(&plan, tree.root())?;
    tool.build(&recipe.build_targets)?;

    let run_tests = recipe
        .test_option
        .as_deref()
        .and_then(|option| selection.bool(option))
        .unwrap_or(false);
    if run_tests {
        tool.test()?;
    } else {
        tracing::debug!("test phase skipped by option selection");
    }

    let artifact_dir = tool.install()?;

    let descriptor = export_descriptor(recipe, &dependencies, platform, Some(fingerprint))?;
    sink.publish(&descriptor)?;

    Ok(Evaluation {
        descriptor,
        artifact_dir,
    })
}

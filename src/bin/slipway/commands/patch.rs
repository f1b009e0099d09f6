//! `slipway patch` command
//!
//! Applies a recipe's source patches to a tree on disk. Useful for
//! inspecting what a build would change, or for preparing a tree that a
//! caller builds outside the engine.

use anyhow::Result;

use slipway::patch::{apply_patches, PatchError};
use slipway::util::diagnostic::PatchDriftError;

use crate::cli::PatchArgs;
use crate::commands::load_recipe;

pub fn execute(args: PatchArgs) -> Result<()> {
    let recipe = load_recipe(&args.recipe)?;

    if recipe.patches.is_empty() {
        println!("{} {} has no patches", recipe.name, recipe.version);
        return Ok(());
    }

    if let Err(err) = apply_patches(&args.tree, &recipe.patches) {
        // Mismatches against the tree mean the sources drifted from what
        // this recipe version expects; report them as such.
        let drifted_file = match &err {
            PatchError::TargetNotFound { file, .. }
            | PatchError::AmbiguousTarget { file, .. }
            | PatchError::PristineMismatch { file, .. } => Some(file.display().to_string()),
            PatchError::AlreadyPatched { .. } | PatchError::Io { .. } => None,
        };

        return match drifted_file {
            Some(file) => Err(anyhow::Error::new(err).context(PatchDriftError {
                recipe: recipe.name.clone(),
                file,
            })),
            None => Err(err.into()),
        };
    }

    println!(
        "applied {} patch(es) for {} {}",
        recipe.patches.len(),
        recipe.name,
        recipe.version
    );

    Ok(())
}

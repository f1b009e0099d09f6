//! `slipway deps` command
//!
//! Shows the dependency declarations a recipe resolves to under an option
//! selection.

use anyhow::{bail, Result};

use slipway::core::normalize::normalize;
use slipway::resolver::resolve;
use slipway::util::diagnostic;

use crate::cli::DepsArgs;
use crate::commands::{load_recipe, platform_from_args, selection_from_args};

pub fn execute(args: DepsArgs, color: bool) -> Result<()> {
    let recipe = load_recipe(&args.recipe)?;
    let platform = platform_from_args(&args.platform)?;
    let raw = selection_from_args(&args.selection)?;

    let normalized = normalize(&recipe, &raw, &platform)?;

    let deps = match resolve(&recipe, &normalized) {
        Ok(deps) => deps,
        Err(err) => {
            diagnostic::emit(&err.to_diagnostic(), color);
            bail!("could not resolve requirements of `{}`", recipe.name);
        }
    };

    if deps.is_empty() {
        println!("{} {} has no dependencies", recipe.name, recipe.version);
        return Ok(());
    }

    for dep in &deps {
        println!("{}", dep);
    }

    Ok(())
}

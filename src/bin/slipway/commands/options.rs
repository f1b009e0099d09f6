//! `slipway options` command
//!
//! Shows the normalized option selection for a recipe on a platform.

use anyhow::Result;

use slipway::core::normalize::normalize;

use crate::cli::OptionsArgs;
use crate::commands::{load_recipe, platform_from_args, selection_from_args};

pub fn execute(args: OptionsArgs) -> Result<()> {
    let recipe = load_recipe(&args.recipe)?;
    let platform = platform_from_args(&args.platform)?;
    let raw = selection_from_args(&args.selection)?;

    let normalized = normalize(&recipe, &raw, &platform)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&normalized)?);
        return Ok(());
    }

    println!("# {} {} on {}", recipe.name, recipe.version, platform);
    for (name, value) in normalized.iter() {
        let origin = if normalized.is_explicit(name) {
            "set"
        } else {
            "default"
        };
        println!("{} = {} ({})", name, value, origin);
    }

    // Options declared by the schema but absent after normalization were
    // dropped for this platform.
    for (name, _) in recipe.schema.iter() {
        if !normalized.contains(name) {
            println!("{} (dropped)", name);
        }
    }

    Ok(())
}

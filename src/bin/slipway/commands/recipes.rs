//! `slipway recipes` command
//!
//! Lists the built-in recipes with their versions and upstream sources.

use anyhow::Result;

use crate::cli::RecipesArgs;

pub fn execute(_args: RecipesArgs) -> Result<()> {
    for recipe in slipway::recipes::builtin()? {
        println!("{} {}", recipe.name, recipe.version);
        println!("    {}", recipe.description);
        if let Some(ref license) = recipe.license {
            println!("    license: {}", license);
        }
        if let Some(ref source) = recipe.source {
            println!("    source: {}", source.url);
        }
    }
    Ok(())
}

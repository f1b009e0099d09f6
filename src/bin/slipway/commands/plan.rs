//! `slipway plan` command
//!
//! Shows the generator variables a recipe hands to the build tool.

use anyhow::Result;

use slipway::builder::plan::generate_plan;
use slipway::core::normalize::normalize;

use crate::cli::PlanArgs;
use crate::commands::{load_recipe, platform_from_args, selection_from_args};

pub fn execute(args: PlanArgs) -> Result<()> {
    let recipe = load_recipe(&args.recipe)?;
    let platform = platform_from_args(&args.platform)?;
    let raw = selection_from_args(&args.selection)?;

    let normalized = normalize(&recipe, &raw, &platform)?;
    let plan = generate_plan(&recipe, &normalized, &platform);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    for (name, value) in plan.iter() {
        println!("{}={}", name, value);
    }

    Ok(())
}

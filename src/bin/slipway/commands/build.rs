//! `slipway build` command
//!
//! Runs the full pipeline for one recipe: stage sources, patch, configure,
//! build, optionally test, install, and export the artifact descriptor.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

use slipway::builder::cmake::CmakeDriver;
use slipway::export::sink::JsonFileSink;
use slipway::ops::evaluate;
use slipway::sources::DirFetcher;
use slipway::util::fs::ensure_dir;

use crate::cli::BuildArgs;
use crate::commands::{load_recipe, platform_from_args, selection_from_args};

pub fn execute(args: BuildArgs) -> Result<()> {
    let recipe = load_recipe(&args.recipe)?;
    let platform = platform_from_args(&args.platform)?;
    let raw = selection_from_args(&args.selection)?;

    let work_dir = match args.work_dir {
        Some(dir) => dir,
        None => default_work_dir(&recipe.name)?,
    };
    ensure_dir(&work_dir)?;

    let mut fetcher = DirFetcher::new(&args.source_dir, work_dir.join("stage"))
        .with_export_patterns(recipe.export_sources.clone());
    let mut tool = CmakeDriver::new(work_dir.join("build"), work_dir.join("install"))?;
    let mut sink = JsonFileSink::new(work_dir.join("descriptor.json"));

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    spinner.set_message(format!("building {} {}", recipe.name, recipe.version));
    spinner.enable_steady_tick(std::time::Duration::from_millis(120));

    let start = Instant::now();
    let result = evaluate(&recipe, &raw, &platform, &mut fetcher, &mut tool, &mut sink);
    spinner.finish_and_clear();

    let evaluation = result?;

    eprintln!(
        "    Finished {} {} in {:.2}s",
        recipe.name,
        recipe.version,
        start.elapsed().as_secs_f64()
    );
    eprintln!("   Artifacts {}", evaluation.artifact_dir.display());
    eprintln!("  Descriptor {}", sink.path().display());

    Ok(())
}

/// Per-recipe work directory under the user cache.
fn default_work_dir(recipe: &str) -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "slipway")
        .context("could not determine a cache directory; pass --work-dir")?;
    Ok(dirs.cache_dir().join(recipe))
}

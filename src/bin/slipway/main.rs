//! Slipway CLI - a declarative recipe engine for native packages

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("slipway=debug")
    } else {
        EnvFilter::new("slipway=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    let color = !cli.no_color;

    match cli.command {
        Commands::Recipes(args) => commands::recipes::execute(args),
        Commands::Options(args) => commands::options::execute(args),
        Commands::Deps(args) => commands::deps::execute(args, color),
        Commands::Plan(args) => commands::plan::execute(args),
        Commands::Patch(args) => commands::patch::execute(args),
        Commands::Build(args) => commands::build::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

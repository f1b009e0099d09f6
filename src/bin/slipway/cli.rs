//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Slipway - A declarative recipe engine for native C/C++ packages
#[derive(Parser)]
#[command(name = "slipway")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the built-in recipes
    Recipes(RecipesArgs),

    /// Show the normalized option selection for a recipe
    Options(OptionsArgs),

    /// Show the resolved dependency declarations for a recipe
    Deps(DepsArgs),

    /// Show the generator variables handed to the build tool
    Plan(PlanArgs),

    /// Apply a recipe's source patches to a tree
    Patch(PatchArgs),

    /// Build a recipe end to end and export its descriptor
    Build(BuildArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Target platform flags, defaulting to the host.
#[derive(Args)]
pub struct PlatformArgs {
    /// Target operating system (windows, linux, macos, freebsd, android, ios, tvos, watchos)
    #[arg(long)]
    pub os: Option<String>,

    /// Target compiler family (gcc, clang, apple-clang, msvc)
    #[arg(long)]
    pub compiler: Option<String>,

    /// Target architecture (x86, x86_64, armv7, aarch64)
    #[arg(long)]
    pub arch: Option<String>,

    /// Build mode (debug, release, relwithdebinfo, minsizerel)
    #[arg(long)]
    pub build_mode: Option<String>,
}

/// Option selection flags.
#[derive(Args)]
pub struct SelectionArgs {
    /// Set a recipe option (repeatable): -o name=value
    #[arg(short = 'o', long = "option", value_name = "NAME=VALUE")]
    pub options: Vec<String>,

    /// Load options from a TOML table
    #[arg(long, value_name = "FILE")]
    pub options_file: Option<PathBuf>,
}

#[derive(Args)]
pub struct RecipesArgs {}

#[derive(Args)]
pub struct OptionsArgs {
    /// Recipe name
    pub recipe: String,

    #[command(flatten)]
    pub selection: SelectionArgs,

    #[command(flatten)]
    pub platform: PlatformArgs,

    /// Emit JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct DepsArgs {
    /// Recipe name
    pub recipe: String,

    #[command(flatten)]
    pub selection: SelectionArgs,

    #[command(flatten)]
    pub platform: PlatformArgs,
}

#[derive(Args)]
pub struct PlanArgs {
    /// Recipe name
    pub recipe: String,

    #[command(flatten)]
    pub selection: SelectionArgs,

    #[command(flatten)]
    pub platform: PlatformArgs,

    /// Emit JSON instead of key=value lines
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct PatchArgs {
    /// Recipe name
    pub recipe: String,

    /// Source tree to patch
    #[arg(long, value_name = "DIR")]
    pub tree: PathBuf,
}

#[derive(Args)]
pub struct BuildArgs {
    /// Recipe name
    pub recipe: String,

    /// Local source checkout to stage and build
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub source_dir: PathBuf,

    /// Working directory for staging, build trees, and outputs
    #[arg(long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    #[command(flatten)]
    pub selection: SelectionArgs,

    #[command(flatten)]
    pub platform: PlatformArgs,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

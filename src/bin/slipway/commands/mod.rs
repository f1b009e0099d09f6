//! Command implementations.

pub mod build;
pub mod completions;
pub mod deps;
pub mod options;
pub mod patch;
pub mod plan;
pub mod recipes;

use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};

use slipway::core::options::{OptionSelection, OptionValue};
use slipway::core::platform::{Arch, BuildMode, Compiler, Os, PlatformFacts};
use slipway::core::recipe::Recipe;
use slipway::util::diagnostic::suggestions;

use crate::cli::{PlatformArgs, SelectionArgs};

/// Look up a built-in recipe or fail with a pointer to `slipway recipes`.
pub(crate) fn load_recipe(name: &str) -> Result<Recipe> {
    match slipway::recipes::find(name)? {
        Some(recipe) => Ok(recipe),
        None => bail!("unknown recipe `{}`\n{}", name, suggestions::UNKNOWN_RECIPE),
    }
}

/// Build the platform facts from CLI flags, defaulting to the host.
pub(crate) fn platform_from_args(args: &PlatformArgs) -> Result<PlatformFacts> {
    let mut platform = PlatformFacts::host();

    if let Some(ref os) = args.os {
        platform.os = os.parse::<Os>().map_err(anyhow::Error::msg)?;
        // A changed OS invalidates the host compiler guess unless the
        // caller overrides it too.
        platform.compiler = Compiler::default_for(platform.os);
    }
    if let Some(ref compiler) = args.compiler {
        platform.compiler = compiler.parse::<Compiler>().map_err(anyhow::Error::msg)?;
    }
    if let Some(ref arch) = args.arch {
        platform.arch = arch.parse::<Arch>().map_err(anyhow::Error::msg)?;
    }
    if let Some(ref mode) = args.build_mode {
        platform.build_mode = mode.parse::<BuildMode>().map_err(anyhow::Error::msg)?;
    }

    Ok(platform)
}

/// Build the raw option selection from `-o` flags and an optional TOML file.
///
/// File entries and flags both count as explicit choices; a flag wins over
/// a file entry for the same option.
pub(crate) fn selection_from_args(args: &SelectionArgs) -> Result<OptionSelection> {
    let mut selection = OptionSelection::new();

    if let Some(ref path) = args.options_file {
        let text = slipway::util::fs::read_to_string(path)?;
        let table: BTreeMap<String, toml::Value> = toml::from_str(&text)
            .with_context(|| format!("failed to parse options file: {}", path.display()))?;

        for (name, value) in table {
            let value = match value {
                toml::Value::Boolean(b) => OptionValue::Bool(b),
                toml::Value::String(s) => OptionValue::Str(s),
                other => bail!(
                    "option `{}` in {} has unsupported type `{}`",
                    name,
                    path.display(),
                    other.type_str()
                ),
            };
            selection.set(name, value);
        }
    }

    for entry in &args.options {
        let Some((name, value)) = entry.split_once('=') else {
            bail!("invalid option `{}`: expected NAME=VALUE", entry);
        };
        selection.set(name.to_string(), OptionValue::parse(value));
    }

    Ok(selection)
}

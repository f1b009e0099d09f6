//! Option normalization.
//!
//! Normalization turns a raw, possibly sparse option selection into the
//! complete selection the rest of the engine consumes: defaults are filled
//! in, values are validated against the schema, and the recipe's platform
//! adjustments are applied. The result is frozen by convention; running
//! normalization on its own output is a no-op.

use crate::core::options::{OptionSelection, SchemaViolation};
use crate::core::platform::PlatformFacts;
use crate::core::recipe::{Adjustment, Recipe};

/// Normalize a raw selection against a recipe and platform.
///
/// Adjustments run in fixed priority order: OS-driven drops, OS-driven
/// forces, then drops conditioned on other option values. Forces run before
/// option-conditioned drops so those drops observe the forced values;
/// anything else would make the pass non-idempotent.
///
/// The schema is never mutated.
pub fn normalize(
    recipe: &Recipe,
    raw: &OptionSelection,
    platform: &PlatformFacts,
) -> Result<OptionSelection, SchemaViolation> {
    for (name, value) in raw.iter() {
        recipe.schema.validate(&recipe.name, name, value)?;
    }

    let mut selection = recipe.schema.defaults();
    for (name, value) in raw.iter() {
        if raw.is_explicit(name) {
            selection.set(name, value.clone());
        } else {
            selection.force(name, value.clone());
        }
    }

    let mut adjustments: Vec<&Adjustment> = recipe.adjustments.iter().collect();
    adjustments.sort_by_key(|a| a.priority());

    for adjustment in adjustments {
        match adjustment {
            Adjustment::DropOnOs { option, oses } => {
                if oses.contains(&platform.os) && selection.contains(option) {
                    tracing::debug!(
                        option = %option,
                        os = %platform.os,
                        "dropping option with no meaning on this OS"
                    );
                    selection.remove(option);
                }
            }
            Adjustment::ForceOnOs { option, value, oses } => {
                if oses.contains(&platform.os) && selection.contains(option) {
                    tracing::debug!(
                        option = %option,
                        value = %value,
                        os = %platform.os,
                        "forcing option on constrained OS"
                    );
                    selection.force(option.clone(), value.clone());
                }
            }
            Adjustment::DropWhenEnabled { option, when } => {
                if selection.bool(when) == Some(true) && selection.contains(option) {
                    tracing::debug!(option = %option, parent = %when, "dropping option implied by parent");
                    selection.remove(option);
                }
            }
        }
    }

    Ok(selection)
}

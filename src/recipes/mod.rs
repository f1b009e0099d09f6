//! Built-in recipes.
//!
//! Each recipe is pure data handed to the engine modules. Construction is
//! fallible (version requirements are parsed) and every recipe validates
//! itself before it is returned.

pub mod boringssl;
pub mod ferry;
pub mod maxminddb;

use anyhow::Result;

use crate::core::recipe::Recipe;

/// All built-in recipes, in listing order.
pub fn builtin() -> Result<Vec<Recipe>> {
    Ok(vec![
        ferry::recipe()?,
        boringssl::recipe()?,
        maxminddb::recipe()?,
    ])
}

/// Look up a built-in recipe by name.
pub fn find(name: &str) -> Result<Option<Recipe>> {
    Ok(builtin()?.into_iter().find(|r| r.name == name))
}

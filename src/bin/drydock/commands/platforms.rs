//! `drydock platforms` command.

use anyhow::Result;

use drydock::core::platform::default_platforms;
use drydock::util::Config;

use crate::cli::PlatformsArgs;

pub fn execute(_args: PlatformsArgs) -> Result<()> {
    let cwd = std::env::current_dir()?;

    // Listing platforms works without a manifest; fall back to the
    // built-in table.
    let table = match Config::find_and_load(&cwd) {
        Ok((config, _)) if !config.platforms.is_empty() => config.platforms,
        _ => default_platforms(),
    };

    for (id, spec) in &table {
        println!("{id} -> {}", spec.base);
    }

    Ok(())
}

//! `drydock requires` command.

use anyhow::Result;

use drydock::core::spec::scan_build_requires;

use crate::cli::RequiresArgs;

pub fn execute(args: RequiresArgs) -> Result<()> {
    let reqs = scan_build_requires(&args.spec)?;

    for req in reqs {
        println!("{req}");
    }

    Ok(())
}

//! `drydock build` command.

use anyhow::Result;

use drydock::builder::{MessageFormat, Reporter};
use drydock::ops::{self, BuildOptions};
use drydock::util::Config;

use crate::cli::{BuildArgs, MessageFormatArg};

fn message_format(arg: MessageFormatArg) -> MessageFormat {
    match arg {
        MessageFormatArg::Human => MessageFormat::Human,
        MessageFormatArg::Json => MessageFormat::Json,
    }
}

pub fn execute(args: BuildArgs) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let (config, root) = Config::find_and_load(&cwd)?;

    let format = message_format(args.message_format);
    let opts = BuildOptions {
        platform: args.platform,
        docker: args.docker,
        no_cache: args.no_cache,
        keep_build_products: args.keep_build_products,
        keep_going: args.keep_going,
        shell_before: args.shell_before,
        shell_after: args.shell_after,
        output_dir: args.output_dir,
        targets: args.targets,
        message_format: format,
    };

    match ops::build(&config, &root, &opts) {
        Ok(summary) => {
            for (target, artifacts) in &summary.built {
                tracing::info!("Built {} artifact(s) for `{target}`", artifacts.len());
            }
            if !summary.failed.is_empty() {
                anyhow::bail!(
                    "failed to build {} of {} target(s)",
                    summary.failed.len(),
                    summary.failed.len() + summary.built.len()
                );
            }
            Ok(())
        }
        Err(err) => {
            ops::drydock_build::report_error(&Reporter::new(format), &err);
            std::process::exit(1);
        }
    }
}

//! Implementation of `drydock build`.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::builder::errors::BuildError;
use crate::builder::events::{BuildEvent, MessageFormat, Reporter};
use crate::builder::pipeline::TargetBuilder;
use crate::core::platform;
use crate::engine::Docker;
use crate::util::config::Config;

/// Options for the build command.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Platform id override
    pub platform: Option<String>,

    /// Docker command override
    pub docker: Option<String>,

    /// Do not cache the results of `docker build`
    pub no_cache: bool,

    /// Keep the build directory, container, and image
    pub keep_build_products: bool,

    /// Keep processing remaining targets after a failure
    pub keep_going: bool,

    /// Drop to a shell before invoking `rpmbuild`
    pub shell_before: bool,

    /// Drop to a shell after invoking `rpmbuild`
    pub shell_after: bool,

    /// Output directory override
    pub output_dir: Option<PathBuf>,

    /// Specific targets to build (empty = all)
    pub targets: Vec<String>,

    /// Output format for build reporting
    pub message_format: MessageFormat,
}

/// Result of a build run.
#[derive(Debug, Default)]
pub struct BuildSummary {
    /// Per-target extracted artifacts, in build order
    pub built: Vec<(String, Vec<PathBuf>)>,

    /// Targets whose pipeline failed (only populated with `keep_going`)
    pub failed: Vec<String>,
}

/// Print a pipeline error, with diagnostics for the typed failures.
pub fn report_error(reporter: &Reporter, err: &anyhow::Error) {
    match err.downcast_ref::<BuildError>() {
        Some(build_err) => reporter.error(build_err.to_diagnostic().format()),
        None => reporter.error(format!("error: {err:#}")),
    }
}

/// Build the selected targets from the manifest.
pub fn build(config: &Config, root: &Path, opts: &BuildOptions) -> Result<BuildSummary> {
    let mut settings = config.build.clone();
    if let Some(platform) = &opts.platform {
        settings.platform = platform.clone();
    }
    if let Some(docker) = &opts.docker {
        settings.docker = docker.clone();
    }
    if let Some(output_dir) = &opts.output_dir {
        settings.output_dir = output_dir.clone();
    }
    settings.no_cache |= opts.no_cache;
    settings.keep_build_products |= opts.keep_build_products;
    settings.keep_going |= opts.keep_going;
    settings.shell_before |= opts.shell_before;
    settings.shell_after |= opts.shell_after;

    // Platform resolution failure is fatal before any target is processed.
    let platform = platform::resolve(&config.platforms, &settings.platform)?;
    tracing::debug!("Platform {} (base image {})", platform.id, platform.base);

    let engine = Docker::new(&settings.docker)?;
    let reporter = Reporter::new(opts.message_format);

    let targets = config.select_targets(&opts.targets)?;
    if targets.is_empty() {
        bail!("no targets declared in manifest");
    }

    let builder = TargetBuilder::new(&engine, &platform, &settings, root, &reporter);
    let mut summary = BuildSummary::default();

    for target in targets {
        tracing::info!("Building RPMs for target `{}`", target.name);
        match builder.build_target(target) {
            Ok(artifacts) => {
                reporter.emit(BuildEvent::TargetFinished {
                    target: target.name.clone(),
                    success: true,
                    artifacts: artifacts.len() as u64,
                });
                summary.built.push((target.name.clone(), artifacts));
            }
            Err(err) => {
                reporter.emit(BuildEvent::TargetFinished {
                    target: target.name.clone(),
                    success: false,
                    artifacts: 0,
                });
                if settings.keep_going {
                    report_error(&reporter, &err);
                    summary.failed.push(target.name.clone());
                } else {
                    return Err(err);
                }
            }
        }
    }

    Ok(summary)
}

//! Per-target build pipeline.
//!
//! One attempt per target, strictly sequential: scan requirements, stage
//! the context, build the image, run the container, extract artifacts.
//! Cleanup is a separate phase that runs on every exit path, so the named
//! image/container and the scoped build directory never outlive the
//! attempt unless retention is configured.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

use crate::builder::cleanup::{self, BuildHandles};
use crate::builder::context::{self, ContextOptions, StagedContext};
use crate::builder::errors::BuildError;
use crate::builder::events::{BuildEvent, Reporter};
use crate::builder::extract;
use crate::core::platform::Platform;
use crate::core::spec::scan_build_requires;
use crate::core::target::RpmTarget;
use crate::engine::{unique_name, Docker};
use crate::util::config::BuildSettings;
use crate::util::fs;

/// Prefix for generated image names.
const IMAGE_NAME_PREFIX: &str = "rpm-image";

/// Prefix for generated container names.
const CONTAINER_NAME_PREFIX: &str = "rpm-builder";

/// Builds one target at a time against a resolved platform.
pub struct TargetBuilder<'a> {
    engine: &'a Docker,
    platform: &'a Platform,
    settings: &'a BuildSettings,
    /// Manifest directory; target and output paths resolve against it
    root: &'a Path,
    reporter: &'a Reporter,
}

impl<'a> TargetBuilder<'a> {
    pub fn new(
        engine: &'a Docker,
        platform: &'a Platform,
        settings: &'a BuildSettings,
        root: &'a Path,
        reporter: &'a Reporter,
    ) -> Self {
        TargetBuilder {
            engine,
            platform,
            settings,
            root,
            reporter,
        }
    }

    /// Run the full pipeline for one target.
    ///
    /// Returns the output-relative paths of the extracted artifacts.
    pub fn build_target(&self, target: &RpmTarget) -> Result<Vec<PathBuf>> {
        let build_dir = TempDir::new().context("failed to create build directory")?;
        tracing::debug!("Build directory: {}", build_dir.path().display());

        let mut handles = BuildHandles::default();
        let result = self.run_pipeline(target, build_dir.path(), &mut handles);

        // Resource-release phase: runs whether the pipeline succeeded or
        // failed, and its own failures never replace the pipeline result.
        if self.settings.keep_build_products {
            let kept = build_dir.into_path();
            tracing::info!("Keeping build products in {}", kept.display());
            if let Some(image) = &handles.image {
                tracing::info!("Keeping image {image}");
            }
            if let Some(container) = &handles.container {
                tracing::info!("Keeping container {container}");
            }
        } else {
            cleanup::release(self.engine, &handles, self.reporter);
        }

        result
    }

    fn run_pipeline(
        &self,
        target: &RpmTarget,
        build_dir: &Path,
        handles: &mut BuildHandles,
    ) -> Result<Vec<PathBuf>> {
        let spec_path = fs::resolve_relative(self.root, &target.spec);
        let build_reqs = scan_build_requires(&spec_path)?;
        tracing::debug!(
            "Target `{}` build requirements: {build_reqs:?}",
            target.name
        );

        let opts = ContextOptions {
            shell_before: self.settings.shell_before,
            shell_after: self.settings.shell_after,
            context_files: &self.settings.context_files,
            setup_commands: &self.settings.setup_commands,
        };
        let staged = context::stage(
            self.platform,
            target,
            &build_reqs,
            self.root,
            build_dir,
            &opts,
        )?;

        let image = format!("{}:latest", unique_name(IMAGE_NAME_PREFIX));
        handles.image = Some(image.clone());
        self.build_image(target, &staged, &image)?;

        let container = unique_name(CONTAINER_NAME_PREFIX);
        handles.container = Some(container.clone());
        self.run_container(target, &image, &container)?;

        self.extract_artifacts(target, &container)
    }

    fn build_image(&self, target: &RpmTarget, staged: &StagedContext, image: &str) -> Result<()> {
        tracing::info!("Building image {image}");
        let outcome = self
            .engine
            .build_image(&staged.dir, image, self.settings.no_cache)?;

        self.reporter.emit(BuildEvent::StageStarted {
            target: target.name.clone(),
            stage: "build-image".to_string(),
            cmd: outcome.command.clone(),
        });
        self.reporter
            .stage_output(&target.name, "build-image", &outcome.stdout, &outcome.stderr);
        self.reporter.emit(BuildEvent::StageFinished {
            target: target.name.clone(),
            stage: "build-image".to_string(),
            success: outcome.success(),
        });

        if !outcome.success() {
            return Err(BuildError::ImageBuild {
                image: image.to_string(),
                command: outcome.command.clone(),
                code: outcome.code(),
                stderr: outcome.stderr_lossy(),
            }
            .into());
        }
        Ok(())
    }

    fn run_container(&self, target: &RpmTarget, image: &str, container: &str) -> Result<()> {
        tracing::info!("Running build container {container}");
        let interactive = self.settings.shell_before || self.settings.shell_after;
        let outcome = self.engine.run_container(image, container, interactive)?;

        self.reporter.emit(BuildEvent::StageStarted {
            target: target.name.clone(),
            stage: "run-container".to_string(),
            cmd: outcome.command.clone(),
        });
        self.reporter.stage_output(
            &target.name,
            "run-container",
            &outcome.stdout,
            &outcome.stderr,
        );
        self.reporter.emit(BuildEvent::StageFinished {
            target: target.name.clone(),
            stage: "run-container".to_string(),
            success: outcome.success(),
        });

        if !outcome.success() {
            return Err(BuildError::ContainerRun {
                container: container.to_string(),
                command: outcome.command.clone(),
                code: outcome.code(),
                stderr: outcome.stderr_lossy(),
            }
            .into());
        }
        Ok(())
    }

    fn extract_artifacts(&self, target: &RpmTarget, container: &str) -> Result<Vec<PathBuf>> {
        let output_dir = fs::resolve_relative(self.root, &self.settings.output_dir);
        fs::ensure_dir(&output_dir)?;

        let (mut child, command) = self.engine.export(container)?;
        self.reporter.emit(BuildEvent::StageStarted {
            target: target.name.clone(),
            stage: "extract-rpms".to_string(),
            cmd: command,
        });

        let stdout = child
            .stdout
            .take()
            .context("docker export stdout was not piped")?;

        // The exporter keeps producing while the extractor consumes; the
        // entry loop runs against the live pipe.
        let extract_result = extract::extract_artifacts(stdout, &output_dir);

        let status = child.wait().context("failed to wait for docker export")?;
        self.reporter.emit(BuildEvent::StageFinished {
            target: target.name.clone(),
            stage: "extract-rpms".to_string(),
            success: status.success() && extract_result.is_ok(),
        });

        // A non-zero export exit is fatal even after a successful partial
        // extraction; no partial-success state is reported as success.
        if !status.success() {
            return Err(BuildError::ArtifactExtraction {
                container: container.to_string(),
                code: status.code(),
            }
            .into());
        }
        let artifacts = extract_result?;

        for path in &artifacts {
            self.reporter.emit(BuildEvent::ArtifactExtracted {
                target: target.name.clone(),
                path: path.clone(),
            });
        }
        Ok(artifacts)
    }
}

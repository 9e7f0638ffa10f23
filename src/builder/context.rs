//! Build context assembly.
//!
//! Stages the self-contained directory handed to `docker build`: the spec
//! file, local sources, the generated entrypoint script, the generated
//! Dockerfile, and any globally configured extra context files. An
//! incomplete context is unusable, so every copy failure aborts the attempt.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::builder::scripts::{self, DockerfileParams, ENTRYPOINT_SCRIPT};
use crate::core::platform::Platform;
use crate::core::target::{RemoteSource, RpmTarget};
use crate::util::fs;

/// Staging options derived from the run configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextOptions<'a> {
    /// Insert an interactive shell before `rpmbuild`
    pub shell_before: bool,
    /// Insert an interactive shell after `rpmbuild`
    pub shell_after: bool,
    /// Extra context file path templates (`{platform_id}` substituted)
    pub context_files: &'a [String],
    /// Extra Dockerfile line templates (`{platform_id}` substituted)
    pub setup_commands: &'a [String],
}

/// A fully staged build context.
#[derive(Debug)]
pub struct StagedContext {
    /// The staged directory, handed to `docker build`
    pub dir: PathBuf,
    /// Basename of the staged spec file
    pub spec_basename: String,
    /// Basenames of the staged local sources
    pub local_sources: Vec<String>,
    /// Remote source descriptors rendered into the Dockerfile
    pub remote_sources: Vec<RemoteSource>,
}

/// Stage a build context for one target into `dest`.
///
/// `root` is the manifest directory; target paths are resolved against it.
/// No network access happens here: remote sources only become `RUN curl`
/// lines in the generated Dockerfile.
pub fn stage(
    platform: &Platform,
    target: &RpmTarget,
    build_reqs: &[String],
    root: &Path,
    dest: &Path,
    opts: &ContextOptions<'_>,
) -> Result<StagedContext> {
    // Spec file, preserving its basename.
    let spec_path = fs::resolve_relative(root, &target.spec);
    fs::require_file(&spec_path)
        .with_context(|| format!("spec file for target `{}`", target.name))?;
    let spec_basename = fs::copy_into(&spec_path, dest)?;

    // Local sources, preserving basenames.
    let mut local_sources = Vec::new();
    for source in &target.sources {
        let source_path = fs::resolve_relative(root, source);
        fs::require_file(&source_path)
            .with_context(|| format!("local source for target `{}`", target.name))?;
        local_sources.push(fs::copy_into(&source_path, dest)?);
    }

    // Remote source descriptors; fetching is delegated to the image build.
    let remote_sources = target
        .remote_sources
        .iter()
        .map(|url| RemoteSource::from_url(url))
        .collect::<Result<Vec<_>>>()?;

    // Entrypoint script, executable.
    let entrypoint = scripts::render_entrypoint(&spec_basename, opts.shell_before, opts.shell_after);
    fs::write_executable(&dest.join(ENTRYPOINT_SCRIPT), &entrypoint)?;

    // Globally configured extra context files.
    for template in opts.context_files {
        let path = template.replace("{platform_id}", &platform.id);
        let path = fs::resolve_relative(root, Path::new(&path));
        fs::require_file(&path).context("extra context file")?;
        fs::copy_into(&path, dest)?;
    }

    // Setup commands with the platform id substituted.
    let setup_commands: Vec<String> = opts
        .setup_commands
        .iter()
        .map(|command| command.replace("{platform_id}", &platform.id))
        .collect();

    // The Dockerfile ties the context together.
    let dockerfile = scripts::render_dockerfile(&DockerfileParams {
        base_image: &platform.base,
        setup_commands: &setup_commands,
        spec_basename: &spec_basename,
        build_reqs,
        local_sources: &local_sources,
        remote_sources: &remote_sources,
    });
    fs::write_string(&dest.join("Dockerfile"), &dockerfile)?;

    Ok(StagedContext {
        dir: dest.to_path_buf(),
        spec_basename,
        local_sources,
        remote_sources,
    })
}

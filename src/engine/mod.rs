//! Docker engine driver.
//!
//! Thin wrapper over the docker CLI covering the image-build / run / export
//! / remove lifecycle the pipeline needs. Every invocation blocks until the
//! external process exits; `export` is the exception, handing the caller a
//! live child whose stdout pipe carries the filesystem archive.

use std::path::{Path, PathBuf};
use std::process::{Child, ExitStatus};

use anyhow::{Context, Result};
use rand::Rng;

use crate::util::diagnostic::suggestions;
use crate::util::process::{find_executable, ProcessBuilder};

/// Generate a collision-resistant name with the given prefix.
///
/// Name uniqueness is what makes independent builds (across targets,
/// processes, or hosts sharing a daemon) safe to run concurrently.
pub fn unique_name(prefix: &str) -> String {
    let suffix: u64 = rand::thread_rng().gen();
    format!("{prefix}-{suffix:016x}")
}

/// Outcome of a captured docker invocation.
#[derive(Debug)]
pub struct EngineOutcome {
    /// Full command line, for diagnostics
    pub command: String,
    /// Exit status of the docker process
    pub status: ExitStatus,
    /// Captured stdout (empty for interactive invocations)
    pub stdout: Vec<u8>,
    /// Captured stderr (empty for interactive invocations)
    pub stderr: Vec<u8>,
}

impl EngineOutcome {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    pub fn code(&self) -> Option<i32> {
        self.status.code()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Handle to the docker CLI.
#[derive(Debug, Clone)]
pub struct Docker {
    program: PathBuf,
}

impl Docker {
    /// Locate the docker command in PATH.
    pub fn new(program: &str) -> Result<Self> {
        let program = find_executable(program).with_context(|| {
            format!(
                "container engine `{program}` not found in PATH\n{}",
                suggestions::DOCKER_NOT_FOUND
            )
        })?;

        Ok(Docker { program })
    }

    /// Get the resolved docker binary path.
    pub fn program(&self) -> &Path {
        &self.program
    }

    fn builder(&self) -> ProcessBuilder {
        ProcessBuilder::new(&self.program)
    }

    fn run_captured(&self, pb: ProcessBuilder) -> Result<EngineOutcome> {
        let command = pb.display_command();
        let output = pb.exec()?;
        Ok(EngineOutcome {
            command,
            status: output.status,
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    /// Build an image from a staged context directory.
    pub fn build_image(
        &self,
        context_dir: &Path,
        image: &str,
        no_cache: bool,
    ) -> Result<EngineOutcome> {
        let pb = self
            .builder()
            .args(build_image_args(image, no_cache))
            .arg(context_dir);
        tracing::debug!("Executing: {}", pb.display_command());
        self.run_captured(pb)
    }

    /// Run an image as a named container to completion.
    ///
    /// `interactive` attaches the caller's terminal and allocates a tty, for
    /// the pre/post-build shell sessions; otherwise output is captured.
    pub fn run_container(
        &self,
        image: &str,
        container: &str,
        interactive: bool,
    ) -> Result<EngineOutcome> {
        let pb = self
            .builder()
            .args(run_container_args(image, container, interactive));
        tracing::debug!("Executing: {}", pb.display_command());

        if interactive {
            let command = pb.display_command();
            let status = pb.exec_interactive()?;
            Ok(EngineOutcome {
                command,
                status,
                stdout: Vec::new(),
                stderr: Vec::new(),
            })
        } else {
            self.run_captured(pb)
        }
    }

    /// Spawn a filesystem export of the container, stdout piped to the caller.
    ///
    /// Returns the live child and the display command line. The caller must
    /// drain stdout before waiting on the child.
    pub fn export(&self, container: &str) -> Result<(Child, String)> {
        let pb = self.builder().arg("export").arg(container);
        let command = pb.display_command();
        tracing::debug!("Executing: {command}");
        let child = pb.spawn_piped_stdout()?;
        Ok((child, command))
    }

    /// Remove a container by name.
    pub fn remove_container(&self, container: &str) -> Result<EngineOutcome> {
        self.run_captured(self.builder().arg("rm").arg(container))
    }

    /// Remove an image by name.
    pub fn remove_image(&self, image: &str) -> Result<EngineOutcome> {
        self.run_captured(self.builder().arg("rmi").arg(image))
    }

    /// Check whether a container with the given name exists.
    pub fn container_exists(&self, container: &str) -> Result<bool> {
        let outcome = self.run_captured(
            self.builder()
                .args(["ps", "-a", "--format", "{{.Names}}"]),
        )?;
        let names = String::from_utf8_lossy(&outcome.stdout);
        Ok(names.lines().any(|line| line.trim() == container))
    }

    /// Check whether an image with the given name exists.
    pub fn image_exists(&self, image: &str) -> Result<bool> {
        let outcome = self.run_captured(
            self.builder()
                .args(["images", "--format", "{{.Repository}}:{{.Tag}}"]),
        )?;
        let names = String::from_utf8_lossy(&outcome.stdout);
        Ok(names.lines().any(|line| line.trim() == image))
    }
}

fn build_image_args(image: &str, no_cache: bool) -> Vec<String> {
    let mut args = vec!["build".to_string()];
    if no_cache {
        args.push("--no-cache".to_string());
    }
    args.push("-t".to_string());
    args.push(image.to_string());
    args
}

fn run_container_args(image: &str, container: &str, interactive: bool) -> Vec<String> {
    let mut args = vec![
        "run".to_string(),
        "--attach=stdout".to_string(),
        "--attach=stderr".to_string(),
        format!("--name={container}"),
    ];
    if interactive {
        args.push("-i".to_string());
        args.push("-t".to_string());
    }
    args.push(image.to_string());
    args
}

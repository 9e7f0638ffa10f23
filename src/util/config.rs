//! Drydock.toml manifest parsing and schema.
//!
//! The manifest declares the RPM targets to build and the run-wide build
//! settings. It is searched for upward from the working directory, and most
//! settings can be overridden per-invocation from the command line.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::platform::PlatformSpec;
use crate::core::target::RpmTarget;
use crate::util::fs::find_upward;

/// Canonical manifest filename.
pub const MANIFEST_NAME: &str = "Drydock.toml";

/// Drydock configuration, as parsed from `Drydock.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Run-wide build settings
    pub build: BuildSettings,

    /// Platform table: id -> base image. Empty means the built-in defaults.
    pub platforms: BTreeMap<String, PlatformSpec>,

    /// RPM targets to build
    pub targets: Vec<RpmTarget>,
}

/// Settings shared by every target in a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSettings {
    /// Platform id to build RPMs for
    pub platform: String,

    /// Name of the docker command to invoke
    pub docker: String,

    /// Do not cache the results of `docker build`
    pub no_cache: bool,

    /// Do not remove the build directory, container, or image
    pub keep_build_products: bool,

    /// Keep processing remaining targets after a per-target failure
    pub keep_going: bool,

    /// Drop to a shell inside the container before invoking `rpmbuild`
    pub shell_before: bool,

    /// Drop to a shell inside the container after invoking `rpmbuild`
    pub shell_after: bool,

    /// Directory the recovered RPMs are written under
    pub output_dir: PathBuf,

    /// Extra files to copy into the build context; `{platform_id}` in each
    /// path template is substituted with the selected platform id.
    pub context_files: Vec<String>,

    /// Extra Dockerfile lines injected before the rpm toolchain setup;
    /// `{platform_id}` is substituted as for `context_files`.
    pub setup_commands: Vec<String>,
}

impl Default for BuildSettings {
    fn default() -> Self {
        BuildSettings {
            platform: "centos7".to_string(),
            docker: "docker".to_string(),
            no_cache: false,
            keep_build_products: false,
            keep_going: false,
            shell_before: false,
            shell_after: false,
            output_dir: PathBuf::from("dist/rpmbuild"),
            context_files: Vec::new(),
            setup_commands: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from a manifest file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse manifest: {}", path.display()))
    }

    /// Find the manifest by searching upward from `start` and load it.
    ///
    /// Returns the configuration together with the directory containing the
    /// manifest; target paths are resolved relative to that directory.
    pub fn find_and_load(start: &Path) -> Result<(Self, PathBuf)> {
        let manifest = find_upward(start, MANIFEST_NAME).with_context(|| {
            format!(
                "no {} found in {} or any parent directory",
                MANIFEST_NAME,
                start.display()
            )
        })?;

        let config = Self::load(&manifest)?;
        let root = manifest
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok((config, root))
    }

    /// Select targets by name, or all targets when the filter is empty.
    pub fn select_targets(&self, filter: &[String]) -> Result<Vec<&RpmTarget>> {
        if filter.is_empty() {
            return Ok(self.targets.iter().collect());
        }

        let mut selected = Vec::new();
        for name in filter {
            match self.targets.iter().find(|t| &t.name == name) {
                Some(target) => selected.push(target),
                None => anyhow::bail!(
                    "target `{}` not found in manifest\n\
                     available targets: {}",
                    name,
                    if self.targets.is_empty() {
                        "(none)".to_string()
                    } else {
                        self.targets
                            .iter()
                            .map(|t| t.name.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    }
                ),
            }
        }

        Ok(selected)
    }
}

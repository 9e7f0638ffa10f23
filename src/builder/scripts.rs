//! Entrypoint script and Dockerfile rendering.
//!
//! The build environment is described entirely by two generated files in the
//! build context: `build_rpm.sh`, the container entrypoint that drives
//! `rpmbuild`, and the `Dockerfile` that stages the rpm toolchain, the
//! declared build requirements, and the spec plus sources.

use std::fmt::Write as _;

use crate::core::target::RemoteSource;

/// Filename of the generated entrypoint script.
pub const ENTRYPOINT_SCRIPT: &str = "build_rpm.sh";

/// Unprivileged user the build runs as inside the container.
pub const BUILD_USER: &str = "rpmuser";

/// The build user's home directory inside the container.
pub const BUILD_HOME: &str = "/home/rpmuser";

/// Parameters for [`render_dockerfile`].
#[derive(Debug)]
pub struct DockerfileParams<'a> {
    /// Base image reference for the selected platform
    pub base_image: &'a str,
    /// Extra Dockerfile lines injected before the toolchain setup
    pub setup_commands: &'a [String],
    /// Basename of the staged spec file
    pub spec_basename: &'a str,
    /// Build requirements to pre-install; empty means no install line
    pub build_reqs: &'a [String],
    /// Basenames of the staged local source files
    pub local_sources: &'a [String],
    /// Remote sources fetched during the image build
    pub remote_sources: &'a [RemoteSource],
}

/// Render the container entrypoint script.
///
/// `shell_before` / `shell_after` insert an interactive shell around the
/// `rpmbuild` invocation for debugging broken specs.
pub fn render_entrypoint(spec_basename: &str, shell_before: bool, shell_after: bool) -> String {
    let mut script = String::new();
    script.push_str("#!/bin/sh\n");
    script.push_str("set -e\n");
    script.push_str("cd \"$HOME\"\n");

    if shell_before {
        script.push_str("/bin/bash -i\n");
    }

    let _ = writeln!(script, "rpmbuild -ba \"rpmbuild/SPECS/{spec_basename}\"");

    if shell_after {
        script.push_str("/bin/bash -i\n");
    }

    script
}

/// Render the Dockerfile for one build attempt.
pub fn render_dockerfile(params: &DockerfileParams<'_>) -> String {
    let mut dockerfile = String::new();
    let _ = writeln!(dockerfile, "FROM {}", params.base_image);

    for command in params.setup_commands {
        let _ = writeln!(dockerfile, "{command}");
    }

    dockerfile.push_str("RUN yum install -y rpm-build tar gzip make curl\n");

    if !params.build_reqs.is_empty() {
        let _ = writeln!(
            dockerfile,
            "RUN yum install -y {}",
            params.build_reqs.join(" ")
        );
    }

    let _ = writeln!(
        dockerfile,
        "RUN useradd --create-home --shell /bin/bash {BUILD_USER}"
    );
    let _ = writeln!(
        dockerfile,
        "RUN mkdir -p {BUILD_HOME}/rpmbuild/BUILD {BUILD_HOME}/rpmbuild/RPMS \
         {BUILD_HOME}/rpmbuild/SOURCES {BUILD_HOME}/rpmbuild/SPECS {BUILD_HOME}/rpmbuild/SRPMS"
    );

    let _ = writeln!(
        dockerfile,
        "COPY {} {BUILD_HOME}/rpmbuild/SPECS/",
        params.spec_basename
    );
    for basename in params.local_sources {
        let _ = writeln!(dockerfile, "COPY {basename} {BUILD_HOME}/rpmbuild/SOURCES/");
    }
    for remote in params.remote_sources {
        let _ = writeln!(
            dockerfile,
            "RUN curl -f -L -o \"{BUILD_HOME}/rpmbuild/SOURCES/{}\" \"{}\"",
            remote.basename, remote.url
        );
    }

    let _ = writeln!(
        dockerfile,
        "COPY {ENTRYPOINT_SCRIPT} {BUILD_HOME}/{ENTRYPOINT_SCRIPT}"
    );
    let _ = writeln!(dockerfile, "RUN chown -R {BUILD_USER}:{BUILD_USER} {BUILD_HOME}");
    let _ = writeln!(dockerfile, "USER {BUILD_USER}");
    let _ = writeln!(dockerfile, "WORKDIR {BUILD_HOME}");
    let _ = writeln!(dockerfile, "ENTRYPOINT [\"{BUILD_HOME}/{ENTRYPOINT_SCRIPT}\"]");

    dockerfile
}

//! Pipeline error types and diagnostics.

use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// Fatal error from the per-target build pipeline.
///
/// Each variant originates at the point of detection and propagates
/// unchanged to the per-target boundary; nothing in the pipeline retries.
/// Cleanup failures are deliberately not represented here: they are logged
/// and never allowed to mask one of these.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("unknown platform `{platform}`")]
    UnknownPlatform {
        platform: String,
        available: Vec<String>,
    },

    #[error("failed to build image `{image}`")]
    ImageBuild {
        image: String,
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("failed to run build container `{container}`")]
    ContainerRun {
        container: String,
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("failed to extract RPMs from container `{container}`")]
    ArtifactExtraction {
        container: String,
        code: Option<i32>,
    },
}

/// Render an exit code the way shells report it.
pub fn exit_display(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

impl BuildError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            BuildError::UnknownPlatform {
                platform,
                available,
            } => Diagnostic::error(format!("unknown platform `{platform}`"))
                .with_context(format!("configured platforms: {}", available.join(", ")))
                .with_suggestion(suggestions::UNKNOWN_PLATFORM),

            BuildError::ImageBuild {
                image,
                command,
                code,
                stderr,
            } => {
                let mut diag = Diagnostic::error(format!("failed to build image `{image}`"))
                    .with_context(format!("`{command}` failed with {}", exit_display(*code)));
                if !stderr.trim().is_empty() {
                    diag = diag.with_context(stderr.trim().to_string());
                }
                diag.with_suggestion(suggestions::KEEP_BUILD_PRODUCTS)
            }

            BuildError::ContainerRun {
                container,
                command,
                code,
                stderr,
            } => {
                let mut diag =
                    Diagnostic::error(format!("failed to run build container `{container}`"))
                        .with_context(format!("`{command}` failed with {}", exit_display(*code)));
                if !stderr.trim().is_empty() {
                    diag = diag.with_context(stderr.trim().to_string());
                }
                diag.with_suggestion(suggestions::KEEP_BUILD_PRODUCTS)
            }

            BuildError::ArtifactExtraction { container, code } => {
                Diagnostic::error(format!(
                    "failed to extract RPMs from container `{container}`"
                ))
                .with_context(format!("docker export failed with {}", exit_display(*code)))
                .with_suggestion(suggestions::KEEP_BUILD_PRODUCTS)
            }
        }
    }
}

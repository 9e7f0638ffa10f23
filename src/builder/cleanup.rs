//! Best-effort removal of the transient container and image.

use crate::builder::errors::exit_display;
use crate::builder::events::Reporter;
use crate::engine::Docker;

/// Named docker resources created by one build attempt.
///
/// Names are recorded at the moment the resource may start to exist (the
/// image name before `docker build`, the container name before
/// `docker run`), so the release pass covers resources left behind by
/// failed creation attempts too.
#[derive(Debug, Default)]
pub struct BuildHandles {
    /// Image name including the `:latest` tag
    pub image: Option<String>,
    /// Container name, set only once a run was attempted
    pub container: Option<String>,
}

/// Remove the attempt's container and image.
///
/// The container goes first: an image cannot be removed while a dependent
/// container exists. Each step is best-effort; failures are reported and
/// swallowed so they can never mask an earlier pipeline error.
pub fn release(engine: &Docker, handles: &BuildHandles, reporter: &Reporter) {
    if let Some(container) = &handles.container {
        match engine.remove_container(container) {
            Ok(outcome) if outcome.success() => {
                tracing::debug!("Removed container {container}");
            }
            Ok(outcome) => reporter.warn(format!(
                "failed to remove container `{container}` ({})",
                exit_display(outcome.code())
            )),
            Err(err) => reporter.warn(format!(
                "failed to remove container `{container}`: {err:#}"
            )),
        }
    }

    if let Some(image) = &handles.image {
        match engine.remove_image(image) {
            Ok(outcome) if outcome.success() => {
                tracing::debug!("Removed image {image}");
            }
            Ok(outcome) => reporter.warn(format!(
                "failed to remove image `{image}` ({})",
                exit_display(outcome.code())
            )),
            Err(err) => reporter.warn(format!("failed to remove image `{image}`: {err:#}")),
        }
    }
}

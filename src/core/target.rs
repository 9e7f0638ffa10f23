//! RPM build targets.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// One RPM package to build, as declared by a `[[targets]]` manifest entry.
///
/// Paths are relative to the manifest's directory. The pipeline treats
/// targets as read-only input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpmTarget {
    /// Target name, used for selection on the command line
    pub name: String,

    /// Path to the RPM spec file
    pub spec: PathBuf,

    /// Local source files copied into the build context
    #[serde(default)]
    pub sources: Vec<PathBuf>,

    /// Remote source URLs, fetched inside the container during the image build
    #[serde(default)]
    pub remote_sources: Vec<String>,
}

/// A remote source descriptor: the URL plus the filename it lands under
/// in the rpmbuild `SOURCES` directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSource {
    pub url: String,
    pub basename: String,
}

impl RemoteSource {
    /// Build a descriptor from a source URL.
    ///
    /// The basename is the final segment of the URL path; a URL without one
    /// (e.g. `https://example.com/`) is rejected since the fetched file
    /// would have no name to land under.
    pub fn from_url(url_str: &str) -> Result<Self> {
        let url = Url::parse(url_str)
            .with_context(|| format!("invalid remote source URL: {url_str}"))?;

        let basename = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .with_context(|| format!("cannot derive a filename from URL: {url_str}"))?;

        Ok(RemoteSource {
            url: url_str.to_string(),
            basename,
        })
    }
}

//! Build platform selection.
//!
//! A platform maps a short id (e.g. `centos7`) to the Docker base image the
//! builder image is derived from. The platform is resolved once per run;
//! an unknown id is fatal before any target is processed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::builder::errors::BuildError;

/// A platform entry as declared in the manifest's `[platforms]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformSpec {
    /// Docker base image reference (e.g. `centos:7`)
    pub base: String,
}

/// A resolved build platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    /// Platform id, as used in `{platform_id}` substitutions
    pub id: String,
    /// Docker base image reference
    pub base: String,
}

/// Built-in platform table, used when the manifest declares none.
pub fn default_platforms() -> BTreeMap<String, PlatformSpec> {
    let mut table = BTreeMap::new();
    table.insert(
        "centos6".to_string(),
        PlatformSpec {
            base: "centos:6.8".to_string(),
        },
    );
    table.insert(
        "centos7".to_string(),
        PlatformSpec {
            base: "centos:7".to_string(),
        },
    );
    table
}

/// Resolve a platform id against the configured table.
///
/// An empty table falls back to [`default_platforms`].
pub fn resolve(table: &BTreeMap<String, PlatformSpec>, id: &str) -> Result<Platform, BuildError> {
    let defaults;
    let table = if table.is_empty() {
        defaults = default_platforms();
        &defaults
    } else {
        table
    };

    match table.get(id) {
        Some(spec) => Ok(Platform {
            id: id.to_string(),
            base: spec.base.clone(),
        }),
        None => Err(BuildError::UnknownPlatform {
            platform: id.to_string(),
            available: table.keys().cloned().collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_default_table() {
        let platform = resolve(&BTreeMap::new(), "centos7").unwrap();
        assert_eq!(platform.id, "centos7");
        assert_eq!(platform.base, "centos:7");
    }

    #[test]
    fn test_resolve_configured_table() {
        let mut table = BTreeMap::new();
        table.insert(
            "rocky9".to_string(),
            PlatformSpec {
                base: "rockylinux:9".to_string(),
            },
        );

        let platform = resolve(&table, "rocky9").unwrap();
        assert_eq!(platform.base, "rockylinux:9");

        // The configured table replaces the defaults entirely.
        assert!(resolve(&table, "centos7").is_err());
    }

    #[test]
    fn test_resolve_unknown_platform() {
        let err = resolve(&BTreeMap::new(), "sles12").unwrap_err();
        match err {
            BuildError::UnknownPlatform {
                platform,
                available,
            } => {
                assert_eq!(platform, "sles12");
                assert_eq!(available, vec!["centos6", "centos7"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

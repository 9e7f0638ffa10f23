//! RPM spec file scanning.
//!
//! The only thing the builder needs from the spec file itself is the set of
//! declared build-time dependencies, so the image can install them before
//! `rpmbuild` runs. Everything else in the spec is interpreted by `rpmbuild`
//! inside the container.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};

/// Extract the declared `BuildRequires` package names from a spec file.
///
/// Reads the file line by line (byte-oriented, so arbitrarily long and
/// non-UTF-8 lines are tolerated). Each line is trimmed and lower-cased;
/// lines starting with `buildrequires` contribute the comma-separated
/// package names after the first colon, each with any version qualifier
/// (the text from the first space onward) stripped.
///
/// Names are returned in file order, duplicates included. No validation is
/// performed; malformed tokens pass through verbatim.
pub fn scan_build_requires(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path)
        .with_context(|| format!("failed to open spec file: {}", path.display()))?;
    let mut reader = BufReader::new(file);

    let mut reqs = Vec::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .with_context(|| format!("failed to read spec file: {}", path.display()))?;
        if read == 0 {
            break;
        }

        let line = String::from_utf8_lossy(&buf);
        let line = line.trim().to_ascii_lowercase();
        if !line.starts_with("buildrequires") {
            continue;
        }

        let Some((_, payload)) = line.split_once(':') else {
            continue;
        };
        reqs.extend(convert_build_req(payload));
    }

    Ok(reqs)
}

/// Split a raw `BuildRequires` payload into bare package names.
fn convert_build_req(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|token| {
            let token = token.trim();
            // Strip version comparators: everything from the first space on.
            token.split(' ').next().unwrap_or("").to_string()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn spec_with(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_versioned_requirements() {
        let spec = spec_with("Name: demo\nBuildRequires: foo >= 1.2, bar\n");

        let reqs = scan_build_requires(spec.path()).unwrap();
        assert_eq!(reqs, vec!["foo", "bar"]);
    }

    #[test]
    fn test_case_insensitive_keyword_and_lowercased_names() {
        let spec = spec_with("BUILDREQUIRES: OpenSSL-devel\nbuildrequires: zlib\n");

        let reqs = scan_build_requires(spec.path()).unwrap();
        assert_eq!(reqs, vec!["openssl-devel", "zlib"]);
    }

    #[test]
    fn test_non_matching_lines_contribute_nothing() {
        let spec = spec_with(
            "Name: demo\n\
             Requires: runtime-only\n\
             %description\n\
             Build Requires: not-a-keyword\n",
        );

        let reqs = scan_build_requires(spec.path()).unwrap();
        assert!(reqs.is_empty());
    }

    #[test]
    fn test_order_and_duplicates_preserved() {
        let spec = spec_with(
            "BuildRequires: zlib\n\
             BuildRequires: gcc, zlib\n",
        );

        let reqs = scan_build_requires(spec.path()).unwrap();
        assert_eq!(reqs, vec!["zlib", "gcc", "zlib"]);
    }

    #[test]
    fn test_scan_is_idempotent() {
        let spec = spec_with("BuildRequires: foo >= 1.2, bar\nBuildRequires: baz\n");

        let first = scan_build_requires(spec.path()).unwrap();
        let second = scan_build_requires(spec.path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_keyword_without_colon_is_skipped() {
        let spec = spec_with("buildrequires\nBuildRequires: ok\n");

        let reqs = scan_build_requires(spec.path()).unwrap();
        assert_eq!(reqs, vec!["ok"]);
    }

    #[test]
    fn test_tolerates_non_utf8_lines() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"%define junk \xff\xfe\nBuildRequires: make\n")
            .unwrap();

        let reqs = scan_build_requires(file.path()).unwrap();
        assert_eq!(reqs, vec!["make"]);
    }

    #[test]
    fn test_no_requirements_is_valid() {
        let spec = spec_with("Name: demo\n");
        assert!(scan_build_requires(spec.path()).unwrap().is_empty());
    }
}

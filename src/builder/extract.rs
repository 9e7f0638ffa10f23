//! Streaming artifact extraction from an exported container filesystem.
//!
//! `docker export` writes the whole container filesystem as a tar stream.
//! Only a handful of entries are interesting: the `.rpm` files under the
//! rpmbuild output directories. The stream is consumed entry by entry off
//! the live pipe, and matching entries are copied out through a fixed-size
//! buffer, so peak memory never scales with the archive or entry size.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::util::fs::ensure_dir;

/// Container path prefix of built binary RPMs.
pub const RPMS_PREFIX: &str = "home/rpmuser/rpmbuild/RPMS/";

/// Container path prefix of built source RPMs.
pub const SRPMS_PREFIX: &str = "home/rpmuser/rpmbuild/SRPMS/";

/// Shared root stripped from matching entries; a prefix of both of the above.
const ARTIFACT_ROOT: &str = "home/rpmuser/rpmbuild/";

/// Extension of package files worth extracting.
const ARTIFACT_EXT: &str = ".rpm";

/// Fixed copy buffer size: 1 MiB.
pub const COPY_BUFFER_SIZE: usize = 1024 * 1024;

/// Map an archive entry name to its output-relative path, or `None` when
/// the entry is not a build artifact.
///
/// The shared root is removed by exact prefix match, never by character
/// trimming, so a relative path that happens to begin with characters from
/// the root keeps them.
pub fn artifact_relative_path(name: &str) -> Option<&str> {
    if !name.ends_with(ARTIFACT_EXT) {
        return None;
    }
    if !name.starts_with(RPMS_PREFIX) && !name.starts_with(SRPMS_PREFIX) {
        return None;
    }

    let rel = &name[ARTIFACT_ROOT.len()..];
    (!rel.is_empty()).then_some(rel)
}

/// Copy `reader` to `writer` through a fixed 1 MiB buffer.
fn copy_chunked<R: Read + ?Sized, W: Write>(reader: &mut R, writer: &mut W) -> Result<u64> {
    let mut buf = vec![0u8; COPY_BUFFER_SIZE];
    let mut total = 0u64;
    loop {
        let read = reader.read(&mut buf).context("failed to read archive entry")?;
        if read == 0 {
            break;
        }
        writer
            .write_all(&buf[..read])
            .context("failed to write artifact")?;
        total += read as u64;
    }
    Ok(total)
}

/// Extract the RPM artifacts from a tar stream into `output_dir`.
///
/// `reader` is typically the live stdout pipe of a `docker export` child;
/// entries are processed in stream order as the exporter produces them.
/// Returns the output-relative paths of the extracted artifacts.
///
/// The caller remains responsible for checking the exporter's exit status
/// after the stream is fully consumed.
pub fn extract_artifacts<R: Read>(reader: R, output_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut archive = tar::Archive::new(reader);
    let mut extracted = Vec::new();

    for entry in archive
        .entries()
        .context("failed to read container export stream")?
    {
        let mut entry = entry.context("failed to read container export entry")?;
        let name = entry
            .path()
            .context("failed to get entry path")?
            .to_string_lossy()
            .into_owned();

        let Some(rel) = artifact_relative_path(&name) else {
            continue;
        };
        let rel = PathBuf::from(rel);

        tracing::info!("Extracting {}", rel.display());

        let dest = output_dir.join(&rel);
        if let Some(parent) = dest.parent() {
            ensure_dir(parent)?;
        }
        let mut file = File::create(&dest)
            .with_context(|| format!("failed to create artifact file: {}", dest.display()))?;
        copy_chunked(&mut entry, &mut file)
            .with_context(|| format!("failed to extract {name}"))?;

        extracted.push(rel);
    }

    // Drain any trailing padding so the exporter is never left blocked on a
    // full pipe; the caller checks its exit status only after EOF.
    let mut inner = archive.into_inner();
    std::io::copy(&mut inner, &mut std::io::sink())
        .context("failed to drain container export stream")?;

    Ok(extracted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use tempfile::TempDir;

    fn tar_with_entries(entries: &[(&str, &[u8])]) -> Vec<u8> {
        use tar::{Builder, Header};

        let mut builder = Builder::new(Vec::new());
        for (name, data) in entries {
            let mut header = Header::new_gnu();
            header.set_path(name).unwrap();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append(&header, *data).unwrap();
        }
        builder.into_inner().unwrap()
    }

    #[test]
    fn test_artifact_relative_path_filter() {
        assert_eq!(
            artifact_relative_path("home/rpmuser/rpmbuild/RPMS/x86_64/pkg-1.0.rpm"),
            Some("RPMS/x86_64/pkg-1.0.rpm")
        );
        assert_eq!(
            artifact_relative_path("home/rpmuser/rpmbuild/SRPMS/pkg-1.0.src.rpm"),
            Some("SRPMS/pkg-1.0.src.rpm")
        );

        // Wrong extension, wrong root, or outside the output directories.
        assert_eq!(
            artifact_relative_path("home/rpmuser/rpmbuild/RPMS/x86_64/readme.txt"),
            None
        );
        assert_eq!(artifact_relative_path("etc/passwd"), None);
        assert_eq!(
            artifact_relative_path("home/rpmuser/rpmbuild/BUILD/pkg-1.0.rpm"),
            None
        );
    }

    #[test]
    fn test_exact_prefix_strip_keeps_leading_root_characters() {
        // "RPMS/..." starts with characters that also occur in the stripped
        // root; an exact-prefix strip must leave them untouched.
        let rel =
            artifact_relative_path("home/rpmuser/rpmbuild/RPMS/noarch/home-tool-1.0.rpm")
                .unwrap();
        assert_eq!(rel, "RPMS/noarch/home-tool-1.0.rpm");
    }

    #[test]
    fn test_extracts_only_matching_entries() {
        let tar = tar_with_entries(&[
            ("home/rpmuser/rpmbuild/RPMS/x86_64/pkg-1.0.rpm", b"rpm-bytes"),
            ("home/rpmuser/rpmbuild/RPMS/x86_64/readme.txt", b"notes"),
            ("home/rpmuser/rpmbuild/SRPMS/pkg-1.0.src.rpm", b"src-bytes"),
            ("etc/passwd", b"root:x:0:0"),
        ]);

        let out = TempDir::new().unwrap();
        let extracted = extract_artifacts(tar.as_slice(), out.path()).unwrap();

        assert_eq!(
            extracted,
            vec![
                PathBuf::from("RPMS/x86_64/pkg-1.0.rpm"),
                PathBuf::from("SRPMS/pkg-1.0.src.rpm"),
            ]
        );
        assert_eq!(
            std::fs::read(out.path().join("RPMS/x86_64/pkg-1.0.rpm")).unwrap(),
            b"rpm-bytes"
        );
        assert!(!out.path().join("RPMS/x86_64/readme.txt").exists());
        assert!(!out.path().join("etc/passwd").exists());
    }

    #[test]
    fn test_existing_output_directories_are_not_an_error() {
        let tar = tar_with_entries(&[(
            "home/rpmuser/rpmbuild/RPMS/x86_64/pkg-1.0.rpm",
            b"rpm-bytes".as_slice(),
        )]);

        let out = TempDir::new().unwrap();
        std::fs::create_dir_all(out.path().join("RPMS/x86_64")).unwrap();

        let extracted = extract_artifacts(tar.as_slice(), out.path()).unwrap();
        assert_eq!(extracted.len(), 1);
    }

    /// Reader wrapper recording the largest single read request.
    struct TrackingReader<R> {
        inner: R,
        max_read: usize,
    }

    impl<R: Read> Read for TrackingReader<R> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.max_read = self.max_read.max(buf.len());
            self.inner.read(buf)
        }
    }

    #[test]
    fn test_large_entry_is_copied_in_bounded_chunks() {
        let payload = vec![0xabu8; 3 * COPY_BUFFER_SIZE + 17];
        let tar = tar_with_entries(&[(
            "home/rpmuser/rpmbuild/RPMS/x86_64/big-1.0.rpm",
            payload.as_slice(),
        )]);

        let out = TempDir::new().unwrap();
        let mut reader = TrackingReader {
            inner: tar.as_slice(),
            max_read: 0,
        };
        let extracted = extract_artifacts(&mut reader, out.path()).unwrap();

        assert_eq!(extracted.len(), 1);
        let written = std::fs::metadata(out.path().join("RPMS/x86_64/big-1.0.rpm"))
            .unwrap()
            .len();
        assert_eq!(written, payload.len() as u64);
        assert!(reader.max_read <= COPY_BUFFER_SIZE);
    }
}

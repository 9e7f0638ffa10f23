//! Filesystem utilities.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

/// Ensure a directory exists, creating it if necessary.
///
/// An already-existing directory is not an error; the output artifact
/// directory in particular is shared across runs and appended to.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Copy a file into a directory, preserving its base filename.
///
/// Returns the base filename of the copied file.
pub fn copy_into(src: &Path, dest_dir: &Path) -> Result<String> {
    let basename = src
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("path has no filename: {}", src.display()))?;

    let dest = dest_dir.join(&basename);
    fs::copy(src, &dest).with_context(|| {
        format!("failed to copy {} to {}", src.display(), dest.display())
    })?;

    Ok(basename)
}

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read file: {}", path.display()))
}

/// Write a string to a file, creating parent directories if needed.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents)
        .with_context(|| format!("failed to write file: {}", path.display()))
}

/// Write a string to a file and mark it executable.
pub fn write_executable(path: &Path, contents: &str) -> Result<()> {
    write_string(path, contents)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path)
            .with_context(|| format!("failed to stat {}", path.display()))?
            .permissions();
        perms.set_mode(0o755);
        fs::set_permissions(path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

/// Search upward from `start` for a file with the given name.
pub fn find_upward(start: &Path, name: &str) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Resolve a path against a base directory unless it is already absolute.
pub fn resolve_relative(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Check that a source file exists before staging it.
pub fn require_file(path: &Path) -> Result<()> {
    if !path.is_file() {
        bail!("file not found: {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_into_preserves_basename() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("sub").join("pkg.spec");
        fs::create_dir_all(src.parent().unwrap()).unwrap();
        fs::write(&src, "Name: pkg").unwrap();

        let dest_dir = tmp.path().join("out");
        fs::create_dir_all(&dest_dir).unwrap();

        let basename = copy_into(&src, &dest_dir).unwrap();
        assert_eq!(basename, "pkg.spec");
        assert_eq!(
            fs::read_to_string(dest_dir.join("pkg.spec")).unwrap(),
            "Name: pkg"
        );
    }

    #[test]
    fn test_ensure_dir_idempotent() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("a").join("b");

        ensure_dir(&dir).unwrap();
        ensure_dir(&dir).unwrap();
        assert!(dir.is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn test_write_executable_sets_mode() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let script = tmp.path().join("run.sh");
        write_executable(&script, "#!/bin/sh\n").unwrap();

        let mode = fs::metadata(&script).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111);
    }

    #[test]
    fn test_find_upward() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("Drydock.toml"), "").unwrap();
        let nested = tmp.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        let found = find_upward(&nested, "Drydock.toml").unwrap();
        assert_eq!(found, tmp.path().join("Drydock.toml"));
    }
}

//! Writing archive entries under a destination directory
//!
//! Every entry is checked before the first byte is written. An entry must be
//! a relative path without `..` components, and its deepest existing
//! ancestor must canonicalize to a directory inside the canonical
//! destination, so pre-existing symlinks cannot redirect a write.

use rgem_errors::{Error, InstallError};
use rgem_types::FileEntry;
use std::path::{Component, Path, PathBuf};

/// Write `entries` below `destination`
///
/// Returns the absolute paths written, in entry order.
///
/// # Errors
///
/// Returns `InstallError::RelativeDestination` if `destination` is relative,
/// `InstallError::PathTraversal` naming the first entry that would land
/// outside it (nothing is written in that case) and
/// `InstallError::FilesystemError` for I/O failures.
pub fn extract(destination: &Path, entries: &[FileEntry]) -> Result<Vec<PathBuf>, Error> {
    if !destination.is_absolute() {
        return Err(InstallError::RelativeDestination {
            path: destination.display().to_string(),
        }
        .into());
    }

    let relative: Vec<PathBuf> = entries
        .iter()
        .map(|entry| normalize_entry_path(&entry.path))
        .collect::<Result<_, _>>()?;

    std::fs::create_dir_all(destination)
        .map_err(|e| fs_error("create_dir_all", destination, &e))?;
    let root = destination
        .canonicalize()
        .map_err(|e| fs_error("canonicalize", destination, &e))?;

    let targets: Vec<PathBuf> = entries
        .iter()
        .zip(&relative)
        .map(|(entry, rel)| contained_target(&root, &entry.path, rel))
        .collect::<Result<_, _>>()?;

    let mut written = Vec::with_capacity(entries.len());
    for (entry, target) in entries.iter().zip(targets) {
        write_entry(entry, &target)?;
        written.push(target);
    }

    tracing::debug!(destination = %root.display(), files = written.len(), "extracted archive");
    Ok(written)
}

/// Lexical checks on an entry path; returns it as a clean relative path
fn normalize_entry_path(raw: &str) -> Result<PathBuf, Error> {
    let traversal = |reason: &str| -> Error {
        InstallError::PathTraversal {
            path: raw.to_string(),
            reason: reason.to_string(),
        }
        .into()
    };

    if raw.is_empty() {
        return Err(traversal("empty path"));
    }
    if raw.contains('\0') {
        return Err(traversal("NUL byte in path"));
    }
    if raw.starts_with(['/', '\\']) || has_drive_prefix(raw) {
        return Err(traversal("absolute path"));
    }

    let mut clean = PathBuf::new();
    for part in raw.split(['/', '\\']) {
        match part {
            "" | "." => {}
            ".." => return Err(traversal("parent directory reference")),
            name => {
                let mut components = Path::new(name).components();
                match (components.next(), components.next()) {
                    (Some(Component::Normal(_)), None) => clean.push(name),
                    _ => return Err(traversal("invalid path component")),
                }
            }
        }
    }

    if clean.as_os_str().is_empty() {
        return Err(traversal("path resolves to the destination itself"));
    }
    Ok(clean)
}

fn has_drive_prefix(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Resolve where `rel` would be written and check it stays under `root`
fn contained_target(root: &Path, raw: &str, rel: &Path) -> Result<PathBuf, Error> {
    let target = root.join(rel);
    let outside = || -> Error {
        InstallError::PathTraversal {
            path: raw.to_string(),
            reason: format!("resolves outside {}", root.display()),
        }
        .into()
    };

    // A symlink at the target itself would redirect the write
    if let Ok(meta) = std::fs::symlink_metadata(&target) {
        if meta.file_type().is_symlink() {
            let resolved = target.canonicalize().map_err(|_| outside())?;
            if !resolved.starts_with(root) || resolved == root {
                return Err(outside());
            }
            return Ok(target);
        }
    }

    let mut ancestor = target.parent();
    while let Some(dir) = ancestor {
        if dir.exists() {
            let resolved = dir
                .canonicalize()
                .map_err(|e| fs_error("canonicalize", dir, &e))?;
            if !resolved.starts_with(root) {
                return Err(outside());
            }
            return Ok(target);
        }
        ancestor = dir.parent();
    }

    Err(outside())
}

fn write_entry(entry: &FileEntry, target: &Path) -> Result<(), Error> {
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent).map_err(|e| fs_error("create_dir_all", parent, &e))?;
    }
    std::fs::write(target, &entry.contents).map_err(|e| fs_error("write", target, &e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Some(mode) = entry.mode {
            std::fs::set_permissions(target, std::fs::Permissions::from_mode(mode & 0o7777))
                .map_err(|e| fs_error("set_permissions", target, &e))?;
        }
    }

    Ok(())
}

fn fs_error(operation: &str, path: &Path, err: &std::io::Error) -> Error {
    InstallError::FilesystemError {
        operation: operation.to_string(),
        path: path.display().to_string(),
        message: err.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rgem_errors::ErrorKind;

    fn entry(path: &str, contents: &str) -> FileEntry {
        FileEntry::new(path, contents.as_bytes())
    }

    #[test]
    fn test_writes_nested_entries() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("gems/rack-2.2.8");

        let written = extract(
            &dest,
            &[
                entry("lib/rack.rb", "module Rack; end"),
                entry("./lib/rack/version.rb", "VERSION = '2.2.8'"),
                entry("bin//rackup", "#!/usr/bin/env ruby"),
            ],
        )
        .unwrap();

        let root = dest.canonicalize().unwrap();
        assert_eq!(written[0], root.join("lib/rack.rb"));
        assert_eq!(written[1], root.join("lib/rack/version.rb"));
        assert_eq!(
            std::fs::read_to_string(root.join("bin/rackup")).unwrap(),
            "#!/usr/bin/env ruby"
        );
    }

    #[test]
    fn test_rejections_write_nothing() {
        let cases = [
            "../outside.rb",
            "lib/../../outside.rb",
            "/etc/passwd",
            "\\windows\\system.ini",
            "C:/evil.rb",
            "lib\\..\\..\\x",
            "",
            "./.",
        ];

        for bad in cases {
            let dir = tempfile::tempdir().unwrap();
            let dest = dir.path().join("pkg");
            let err = extract(&dest, &[entry("lib/ok.rb", "ok"), entry(bad, "evil")]).unwrap_err();

            assert_eq!(err.kind(), ErrorKind::PathTraversal, "{bad}");
            assert!(!dest.join("lib/ok.rb").exists(), "{bad} wrote files");
        }
    }

    #[test]
    fn test_error_names_offending_entry() {
        let dir = tempfile::tempdir().unwrap();
        let err = extract(dir.path(), &[entry("../../etc/cron.d/job", "x")]).unwrap_err();
        assert!(err.to_string().contains("../../etc/cron.d/job"));
    }

    #[test]
    fn test_relative_destination_fails_fast() {
        let err = extract(Path::new("gems/foo-1.0"), &[entry("a", "b")]).unwrap_err();
        assert!(matches!(
            err,
            Error::Install(InstallError::RelativeDestination { .. })
        ));
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(!Path::new("gems/foo-1.0").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directory_cannot_escape() {
        let dir = tempfile::tempdir().unwrap();
        let outside = dir.path().join("outside");
        let dest = dir.path().join("pkg");
        std::fs::create_dir_all(&outside).unwrap();
        std::fs::create_dir_all(&dest).unwrap();
        std::os::unix::fs::symlink(&outside, dest.join("lib")).unwrap();

        let err = extract(&dest, &[entry("lib/evil.rb", "x")]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PathTraversal);
        assert!(!outside.join("evil.rb").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_file_cannot_escape() {
        let dir = tempfile::tempdir().unwrap();
        let outside = dir.path().join("victim.txt");
        let dest = dir.path().join("pkg");
        std::fs::create_dir_all(&dest).unwrap();
        std::fs::write(&outside, "original").unwrap();
        std::os::unix::fs::symlink(&outside, dest.join("README")).unwrap();

        assert!(extract(&dest, &[entry("README", "overwritten")]).is_err());
        assert_eq!(std::fs::read_to_string(&outside).unwrap(), "original");
    }

    #[cfg(unix)]
    #[test]
    fn test_mode_is_applied() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let written = extract(dir.path(), &[entry("bin/tool", "#!/bin/sh").with_mode(0o755)]).unwrap();
        let mode = std::fs::metadata(&written[0]).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}

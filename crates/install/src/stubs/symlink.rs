//! Version-aware symlink launchers

use rgem_types::{parse_version, Version};
use std::path::Path;

/// Decision for an existing link at the stub location
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkAction {
    /// Nothing there yet
    Create,
    /// Points at the same or a newer version
    Keep { existing: Version },
    /// Older version, unknown target or a plain file
    Replace,
}

/// Decide what to do with `link` for `package` at `version`
#[must_use]
pub fn link_action(link: &Path, package: &str, version: &Version) -> LinkAction {
    let Ok(meta) = std::fs::symlink_metadata(link) else {
        return LinkAction::Create;
    };
    if !meta.file_type().is_symlink() {
        return LinkAction::Replace;
    }

    let existing = std::fs::read_link(link)
        .ok()
        .and_then(|target| embedded_version(&target, package));
    match existing {
        Some(existing) if existing >= *version => LinkAction::Keep { existing },
        _ => LinkAction::Replace,
    }
}

/// Version segment of the `<package>-<version>` directory in `target`
#[must_use]
pub fn embedded_version(target: &Path, package: &str) -> Option<Version> {
    let prefix = format!("{package}-");
    target
        .components()
        .rev()
        .filter_map(|c| c.as_os_str().to_str())
        .filter_map(|name| name.strip_prefix(&prefix))
        .find_map(|rest| {
            parse_version(rest).ok().or_else(|| {
                // Platform specific directories: name-1.2.3-x86_64-linux
                rest.split_once('-')
                    .and_then(|(version, _)| parse_version(version).ok())
            })
        })
}

#[cfg(unix)]
pub(crate) fn create(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
pub(crate) fn create(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}

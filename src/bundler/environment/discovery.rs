//! Upward manifest search for project and workspace roots.

use crate::{
    bundler::{Error, Result},
    metadata::{MANIFEST_FILE, declares_workspace},
};
use std::path::{Path, PathBuf};

/// Marker file of the toolkit project that owns the asset bundle.
pub const TOOLKIT_PROJECT_FILE: &str = "pubspec.yaml";

/// Walks upward from `start` and returns the first directory containing `file_name`.
///
/// Returns `None` once the filesystem root has been checked.
pub fn find_manifest_dir(start: &Path, file_name: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(file_name).is_file())
        .map(Path::to_path_buf)
}

/// Nearest directory at or above `start` holding the project manifest.
pub fn find_project_dir(start: &Path) -> Result<PathBuf> {
    find_manifest_dir(start, MANIFEST_FILE).ok_or_else(|| Error::PathResolution {
        start: start.to_path_buf(),
        file_name: MANIFEST_FILE,
    })
}

/// Enclosing workspace of `project_dir`, searched from one level up.
///
/// Only manifests declaring a `[workspace]` table count, so a plain package
/// sitting above the project does not redirect its output. A project whose own
/// manifest declares `[workspace]` is its own root and has no enclosing
/// workspace.
pub fn find_workspace_dir(project_dir: &Path) -> Option<PathBuf> {
    if declares_workspace(&project_dir.join(MANIFEST_FILE)) {
        return None;
    }

    let mut search = project_dir.parent().map(Path::to_path_buf);
    while let Some(dir) = search {
        let found = find_manifest_dir(&dir, MANIFEST_FILE)?;
        if declares_workspace(&found.join(MANIFEST_FILE)) {
            return Some(found);
        }
        search = found.parent().map(Path::to_path_buf);
    }

    None
}

/// Directory of the toolkit project that produces the asset bundle.
///
/// The nearest ancestor holding `pubspec.yaml`, falling back to the parent of
/// the Rust project (the conventional `<app>/rust` layout).
pub fn find_toolkit_project_dir(project_dir: &Path) -> PathBuf {
    find_manifest_dir(project_dir, TOOLKIT_PROJECT_FILE)
        .or_else(|| project_dir.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| project_dir.to_path_buf())
}

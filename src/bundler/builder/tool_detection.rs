//! External tool lookup.
//!
//! Packaging tools are resolved on `PATH` before a packager writes anything,
//! so a missing `dmgbuild` or `makensis` is reported up front instead of after
//! the staging work.

use crate::bundler::error::{Error, Result, ToolFailure};
use std::path::{Path, PathBuf};

/// Resolves `name` on `PATH`.
pub fn locate_tool(name: &str) -> Result<PathBuf> {
    match which::which(name) {
        Ok(path) => {
            log::debug!("Found {} at: {}", name, path.display());
            Ok(path)
        }
        Err(e) => {
            log::debug!("{} not found in PATH: {}", name, e);
            Err(Error::ExternalTool {
                tool: name.to_string(),
                failure: ToolFailure::NotFound,
            })
        }
    }
}

/// Toolkit launcher inside an SDK root.
fn sdk_launcher(toolkit_root: &Path) -> PathBuf {
    let file_name = if cfg!(windows) { "flutter.bat" } else { "flutter" };
    toolkit_root.join("bin").join(file_name)
}

/// Toolkit executable: `<toolkit_root>/bin/flutter` when that exists,
/// otherwise plain `flutter` resolved through `PATH` at spawn time.
pub fn toolkit_executable(toolkit_root: Option<&Path>) -> PathBuf {
    if let Some(root) = toolkit_root {
        let launcher = sdk_launcher(root);
        if launcher.is_file() {
            return launcher;
        }
        log::warn!(
            "No toolkit launcher at {}, falling back to PATH",
            launcher.display()
        );
    }

    which::which("flutter").unwrap_or_else(|_| PathBuf::from("flutter"))
}

//! Project manifest parsing.
//!
//! Reads the `[package]` table of a `Cargo.toml` together with the
//! `[package.metadata.flutter]` table that pins the toolkit.

use crate::bundler::{Error, Result};
use std::path::{Path, PathBuf};

/// File name of the project manifest.
pub const MANIFEST_FILE: &str = "Cargo.toml";

/// Metadata table holding the toolkit pin.
pub const TOOLKIT_KEY: &str = "flutter";

/// Toolkit pin from `[package.metadata.flutter]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolkitMetadata {
    /// Pinned toolkit version. Keys the engine framework directory.
    pub version: String,

    /// Bundle identifier in reverse domain notation, if configured.
    pub identifier: Option<String>,

    /// Engine build to use, if pinned in the manifest.
    pub engine_version: Option<String>,
}

/// Parsed project manifest. Read-only after [`load_manifest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    /// Path the manifest was read from.
    pub path: PathBuf,

    /// Package name. Also the name of the compiled binary.
    pub name: String,

    /// Package version (semver).
    pub version: String,

    /// Package description, empty when absent.
    pub description: String,

    /// Toolkit pin.
    pub toolkit: ToolkitMetadata,
}

impl Manifest {
    /// Directory containing the manifest.
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }
}

/// Load and validate a manifest.
///
/// Fails with [`Error::Manifest`] if the file is missing or unparsable, or if
/// `package.name`, `package.version` or `package.metadata.flutter.version` is
/// absent. Nothing is written to disk.
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let invalid = |reason: String| Error::Manifest {
        path: path.to_path_buf(),
        reason,
    };

    let content = std::fs::read_to_string(path)
        .map_err(|e| invalid(format!("failed to read manifest: {e}")))?;

    parse_manifest(path, &content)
}

/// Parse manifest text that was read from `path`.
pub fn parse_manifest(path: &Path, content: &str) -> Result<Manifest> {
    let invalid = |reason: String| Error::Manifest {
        path: path.to_path_buf(),
        reason,
    };

    let toml_value: toml::Table =
        toml::from_str(content).map_err(|e| invalid(format!("failed to parse TOML: {e}")))?;

    let package = toml_value
        .get("package")
        .ok_or_else(|| invalid("no [package] section".to_string()))?;

    let required_str = |key: &str| -> Result<String> {
        package
            .get(key)
            .and_then(|v| v.as_str())
            .map(String::from)
            .ok_or_else(|| invalid(format!("missing '{key}' in [package]")))
    };

    let name = required_str("name")?;
    let version = required_str("version")?;
    semver::Version::parse(&version)
        .map_err(|e| invalid(format!("'version' is not a semantic version: {e}")))?;

    let description = package
        .get("description")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    let toolkit_table = package
        .get("metadata")
        .and_then(|m| m.get(TOOLKIT_KEY))
        .ok_or_else(|| invalid(format!("missing [package.metadata.{TOOLKIT_KEY}] table")))?;

    let toolkit_str = |key: &str| {
        toolkit_table
            .get(key)
            .and_then(|v| v.as_str())
            .map(String::from)
    };

    let toolkit = ToolkitMetadata {
        version: toolkit_str("version").ok_or_else(|| {
            invalid(format!(
                "missing 'version' in [package.metadata.{TOOLKIT_KEY}]"
            ))
        })?,
        identifier: toolkit_str("identifier"),
        engine_version: toolkit_str("engine_version"),
    };

    Ok(Manifest {
        path: path.to_path_buf(),
        name,
        version,
        description,
        toolkit,
    })
}

/// Whether the manifest text declares a `[workspace]` table.
pub fn declares_workspace(path: &Path) -> bool {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|content| content.parse::<toml::Table>().ok())
        .is_some_and(|table| table.contains_key("workspace"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPLETE: &str = r#"
[package]
name = "gallery"
version = "0.2.1"
description = "Flutter gallery"

[package.metadata.flutter]
version = "1.12.13"
identifier = "com.example.gallery"
"#;

    #[test]
    fn parses_complete_manifest() {
        let manifest = parse_manifest(Path::new("/p/Cargo.toml"), COMPLETE).unwrap();
        assert_eq!(manifest.name, "gallery");
        assert_eq!(manifest.version, "0.2.1");
        assert_eq!(manifest.description, "Flutter gallery");
        assert_eq!(manifest.toolkit.version, "1.12.13");
        assert_eq!(
            manifest.toolkit.identifier.as_deref(),
            Some("com.example.gallery")
        );
        assert_eq!(manifest.toolkit.engine_version, None);
        assert_eq!(manifest.dir(), Path::new("/p"));
    }

    #[test]
    fn missing_toolkit_version_is_a_manifest_error() {
        let content = r#"
[package]
name = "gallery"
version = "0.2.1"

[package.metadata.flutter]
identifier = "com.example.gallery"
"#;
        let err = parse_manifest(Path::new("Cargo.toml"), content).unwrap_err();
        assert!(matches!(err, Error::Manifest { .. }), "{err:?}");
        assert!(err.to_string().contains("'version'"));
    }

    #[test]
    fn missing_toolkit_table_is_a_manifest_error() {
        let content = "[package]\nname = \"a\"\nversion = \"1.0.0\"\n";
        let err = parse_manifest(Path::new("Cargo.toml"), content).unwrap_err();
        assert!(matches!(err, Error::Manifest { .. }));
    }

    #[test]
    fn rejects_non_semver_version() {
        let content = "[package]\nname = \"a\"\nversion = \"one\"\n\n[package.metadata.flutter]\nversion = \"1\"\n";
        let err = parse_manifest(Path::new("Cargo.toml"), content).unwrap_err();
        assert!(err.to_string().contains("semantic version"));
    }

    #[test]
    fn unreadable_file_is_a_manifest_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_manifest(&dir.path().join("Cargo.toml")).unwrap_err();
        assert!(matches!(err, Error::Manifest { .. }));
    }

    #[test]
    fn detects_workspace_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Cargo.toml");
        std::fs::write(&path, "[workspace]\nmembers = [\"app\"]\n").unwrap();
        assert!(declares_workspace(&path));

        std::fs::write(&path, COMPLETE).unwrap();
        assert!(!declares_workspace(&path));
    }
}

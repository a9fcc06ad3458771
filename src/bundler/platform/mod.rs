//! Platform packagers.
//!
//! [`PackageType`] is the closed set of packaging strategies. Each variant
//! implements the same two operations:
//!
//! - `prepare` returns a copy of the environment extended with the variant's
//!   derived paths. The input is only borrowed and never changes.
//! - `build` checks that every input exists, produces the artifact and
//!   returns it.

pub mod linux;
pub mod macos;
pub mod windows;

use crate::bundler::{
    Environment,
    builder::checksum::calculate_sha256,
    error::{Error, ErrorExt, Result},
};
use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

/// Packaging target. Exactly one is selected per invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PackageType {
    /// macOS `.app` bundle.
    #[value(name = "mac", alias = "app-bundle")]
    AppBundle,
    /// macOS disk image built from the `.app` bundle.
    #[value(name = "dmg", alias = "disk-image")]
    Dmg,
    /// Windows installer compiled by NSIS.
    #[value(name = "nsis", alias = "windows-installer")]
    Nsis,
    /// Linux snap package.
    #[value(name = "snap", alias = "linux-package")]
    Snap,
}

impl PackageType {
    /// Every supported package type.
    pub const ALL: [PackageType; 4] = [Self::AppBundle, Self::Dmg, Self::Nsis, Self::Snap];

    /// Short name as accepted on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Self::AppBundle => "mac",
            Self::Dmg => "dmg",
            Self::Nsis => "nsis",
            Self::Snap => "snap",
        }
    }

    /// Package types whose artifacts must exist before this one is built.
    pub fn dependencies(self) -> &'static [PackageType] {
        match self {
            Self::Dmg => &[Self::AppBundle],
            Self::AppBundle | Self::Nsis | Self::Snap => &[],
        }
    }

    /// Extends `env` with this variant's derived fields.
    pub fn prepare(self, env: &Environment) -> Environment {
        match self {
            Self::AppBundle => macos::app::prepare(env),
            Self::Dmg => macos::dmg::prepare(env),
            Self::Nsis => windows::nsis::prepare(env),
            Self::Snap => linux::snap::prepare(env),
        }
    }

    /// Produces the artifact from a prepared environment.
    ///
    /// Fails with [`Error::PrerequisiteMissing`] before writing anything when
    /// `env` was not prepared for this variant or an input is absent.
    pub async fn build(self, env: &Environment) -> Result<Artifact> {
        let path = match self {
            Self::AppBundle => macos::app::bundle_project(env).await?,
            Self::Dmg => macos::dmg::bundle_project(env).await?,
            Self::Nsis => windows::nsis::bundle_project(env).await?,
            Self::Snap => linux::snap::bundle_project(env).await?,
        };

        Artifact::describe(self, path).await
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PackageType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mac" | "app-bundle" => Ok(Self::AppBundle),
            "dmg" | "disk-image" => Ok(Self::Dmg),
            "nsis" | "windows-installer" => Ok(Self::Nsis),
            "snap" | "linux-package" => Ok(Self::Snap),
            other => Err(Error::UnknownPackageType(other.to_string())),
        }
    }
}

/// A produced package on disk.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Artifact {
    /// Variant that produced it.
    pub package_type: PackageType,
    /// File or bundle directory.
    pub path: PathBuf,
    /// Size in bytes (sum of all files for bundle directories).
    pub size: u64,
    /// Hex-encoded SHA-256.
    pub checksum: String,
}

impl Artifact {
    /// Collects size and checksum of the artifact at `path`.
    pub async fn describe(package_type: PackageType, path: PathBuf) -> Result<Self> {
        let size = artifact_size(&path).await?;
        let checksum = calculate_sha256(&path).await?;

        Ok(Self {
            package_type,
            path,
            size,
            checksum,
        })
    }
}

async fn artifact_size(path: &Path) -> Result<u64> {
    let metadata = tokio::fs::metadata(path)
        .await
        .fs_context("reading artifact metadata", path)?;
    if metadata.is_file() {
        return Ok(metadata.len());
    }

    let root = path.to_path_buf();
    tokio::task::spawn_blocking(move || -> Result<u64> {
        let mut total = 0;
        for entry in walkdir::WalkDir::new(&root).follow_links(false) {
            let entry = entry?;
            if entry.file_type().is_file() {
                total += entry.metadata()?.len();
            }
        }
        Ok(total)
    })
    .await
    .map_err(|e| Error::GenericError(format!("size calculation task panicked: {e}")))?
}

/// Fails with [`Error::PrerequisiteMissing`] unless `path` is an existing file.
pub(crate) fn require_file(stage: &'static str, what: &str, path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(Error::missing(stage, what, path))
    }
}

/// Fails with [`Error::PrerequisiteMissing`] unless `path` is an existing directory.
pub(crate) fn require_dir(stage: &'static str, what: &str, path: &Path) -> Result<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(Error::missing(stage, what, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_names() {
        for ty in PackageType::ALL {
            assert_eq!(ty.name().parse::<PackageType>().unwrap(), ty);
        }
        assert_eq!(
            "disk-image".parse::<PackageType>().unwrap(),
            PackageType::Dmg
        );
        assert_eq!(
            "linux-package".parse::<PackageType>().unwrap(),
            PackageType::Snap
        );
        assert!(matches!(
            "msi".parse::<PackageType>(),
            Err(Error::UnknownPackageType(name)) if name == "msi"
        ));
    }

    #[test]
    fn only_dmg_has_dependencies() {
        assert_eq!(PackageType::Dmg.dependencies(), &[PackageType::AppBundle]);
        assert!(PackageType::AppBundle.dependencies().is_empty());
        assert!(PackageType::Nsis.dependencies().is_empty());
        assert!(PackageType::Snap.dependencies().is_empty());
    }

    #[tokio::test]
    async fn describes_directory_artifacts() {
        let tmp = tempfile::tempdir().unwrap();
        let app = tmp.path().join("demo.app");
        std::fs::create_dir_all(app.join("Contents")).unwrap();
        std::fs::write(app.join("Contents/a"), "1234").unwrap();
        std::fs::write(app.join("b"), "56").unwrap();

        let artifact = Artifact::describe(PackageType::AppBundle, app.clone())
            .await
            .unwrap();
        assert_eq!(artifact.size, 6);
        assert_eq!(artifact.checksum.len(), 64);
        assert_eq!(artifact.path, app);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn unreadable_bundle_content_is_an_error() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let app = tmp.path().join("demo.app");
        let locked = app.join("Contents/Resources");
        std::fs::create_dir_all(&locked).unwrap();
        std::fs::write(locked.join("asset"), "1234").unwrap();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

        // Permission bits do not bind a privileged user.
        let readable = std::fs::read_dir(&locked).is_ok();
        let result = artifact_size(&app).await;
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();
        if readable {
            return;
        }

        assert!(matches!(result, Err(Error::WalkDir(_))), "{result:?}");
    }
}

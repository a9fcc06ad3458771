//! Derived build environment.
//!
//! [`Environment::derive`] maps a parsed [`Manifest`] and the invocation's
//! [`BuildFlags`] to every path and name the pipeline needs. It reads no
//! process-wide state: the starting directory and all overrides arrive through
//! the flags, so identical inputs always give an identical environment.
//!
//! Packagers receive `&Environment` and return an extended copy from
//! `prepare`, so the environment a caller holds never changes underneath it.

mod discovery;

pub use discovery::{
    TOOLKIT_PROJECT_FILE, find_manifest_dir, find_project_dir, find_toolkit_project_dir,
    find_workspace_dir,
};

use crate::{
    bundler::{
        Result,
        platform::{
            linux::snap::SnapPaths,
            macos::{app::AppBundlePaths, dmg::DiskImagePaths},
            windows::nsis::InstallerSlots,
        },
    },
    metadata::{self, MANIFEST_FILE, Manifest},
};
use std::path::{Path, PathBuf};

/// Identifier used when the manifest does not configure one.
pub const DEFAULT_IDENTIFIER: &str = "one.juju.flutter-app";

/// Name of the engine framework shipped inside the app bundle.
pub const ENGINE_FRAMEWORK: &str = "FlutterEmbedder.framework";

/// Cargo build profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// `cargo build`
    #[default]
    Debug,
    /// `cargo build --release`
    Release,
}

impl Profile {
    /// Selects the profile from a `--release` flag.
    pub fn from_release(release: bool) -> Self {
        if release { Self::Release } else { Self::Debug }
    }

    /// Output subdirectory under the target directory.
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
        }
    }

    /// Whether this is the release profile.
    pub fn is_release(self) -> bool {
        self == Self::Release
    }
}

/// Values that can be supplied from outside the project.
///
/// The CLI fills these from flags or their environment variables. They are
/// consulted only where the project itself does not determine the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolkitOverrides {
    /// Toolkit SDK root (`FLUTTER_ROOT`).
    pub toolkit_root: Option<PathBuf>,
    /// Engine build (`FLUTTER_ENGINE_VERSION`).
    pub engine_version: Option<String>,
    /// Workspace root used when none is discovered.
    pub workspace_root: Option<PathBuf>,
    /// User cache directory holding downloaded engines.
    pub engine_cache_dir: Option<PathBuf>,
}

/// Flags of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildFlags {
    /// Directory the project search starts from.
    pub start_dir: PathBuf,
    /// Build profile.
    pub profile: Profile,
    /// External overrides.
    pub overrides: ToolkitOverrides,
}

impl BuildFlags {
    /// Debug flags starting the search at `start_dir`.
    pub fn new(start_dir: impl Into<PathBuf>) -> Self {
        Self {
            start_dir: start_dir.into(),
            profile: Profile::Debug,
            overrides: ToolkitOverrides::default(),
        }
    }

    /// Sets the build profile.
    pub fn profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    /// Sets the external overrides.
    pub fn overrides(mut self, overrides: ToolkitOverrides) -> Self {
        self.overrides = overrides;
        self
    }
}

/// Immutable mapping of derived paths, names and flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    project_dir: PathBuf,
    workspace_dir: Option<PathBuf>,
    target_dir: PathBuf,
    output_dir: PathBuf,
    profile: Profile,

    name: String,
    version: String,
    description: String,
    identifier: String,

    toolkit_version: String,
    engine_version: Option<String>,
    toolkit_root: Option<PathBuf>,
    framework_search_dirs: Vec<PathBuf>,

    assets_dir: PathBuf,
    toolkit_project_dir: PathBuf,
    toolkit_assets_dir: PathBuf,

    app_bundle: Option<AppBundlePaths>,
    disk_image: Option<DiskImagePaths>,
    installer: Option<InstallerSlots>,
    snap: Option<SnapPaths>,
}

impl Environment {
    /// Locates the project from `flags.start_dir`, reads its manifest and derives.
    ///
    /// Fails with `PathResolution` if no manifest exists at or above the start
    /// directory, and with `Manifest` if it is invalid.
    pub fn discover(flags: &BuildFlags) -> Result<Self> {
        let project_dir = find_project_dir(&flags.start_dir)?;
        let manifest = metadata::load_manifest(&project_dir.join(MANIFEST_FILE))?;
        Self::derive(&manifest, flags)
    }

    /// Derives the environment of `manifest` under `flags`.
    pub fn derive(manifest: &Manifest, flags: &BuildFlags) -> Result<Self> {
        let overrides = &flags.overrides;
        let project_dir = manifest.dir().to_path_buf();

        let workspace_dir =
            find_workspace_dir(&project_dir).or_else(|| overrides.workspace_root.clone());
        let target_dir = workspace_dir
            .as_deref()
            .unwrap_or(&project_dir)
            .join("target");
        let output_dir = target_dir.join(flags.profile.dir_name());

        let toolkit_project_dir = find_toolkit_project_dir(&project_dir);
        let toolkit_assets_dir = toolkit_project_dir.join("build").join("flutter_assets");

        let toolkit_version = manifest.toolkit.version.clone();
        let engine_version = manifest
            .toolkit
            .engine_version
            .clone()
            .or_else(|| overrides.engine_version.clone())
            .or_else(|| {
                overrides
                    .toolkit_root
                    .as_deref()
                    .and_then(read_engine_version)
            });

        // Toolkit-version layouts first, then engine-build layouts.
        let engine_roots: Vec<PathBuf> = std::iter::once(target_dir.clone())
            .chain(overrides.engine_cache_dir.clone())
            .map(|base| base.join("flutter-engine"))
            .collect();
        let framework_search_dirs = std::iter::once(&toolkit_version)
            .chain(engine_version.as_ref())
            .flat_map(|key| engine_roots.iter().map(move |root| root.join(key)))
            .collect();

        let identifier = manifest
            .toolkit
            .identifier
            .clone()
            .unwrap_or_else(|| DEFAULT_IDENTIFIER.to_string());

        log::debug!(
            "derived environment for {} {}: target={}, workspace={:?}",
            manifest.name,
            flags.profile.dir_name(),
            target_dir.display(),
            workspace_dir
        );
        if let Some(engine) = &engine_version {
            log::debug!("engine build {engine} for toolkit {toolkit_version}");
        }

        Ok(Self {
            assets_dir: project_dir.join("assets"),
            project_dir,
            workspace_dir,
            target_dir,
            output_dir,
            profile: flags.profile,
            name: manifest.name.clone(),
            version: manifest.version.clone(),
            description: manifest.description.clone(),
            identifier,
            toolkit_version,
            engine_version,
            toolkit_root: overrides.toolkit_root.clone(),
            framework_search_dirs,
            toolkit_project_dir,
            toolkit_assets_dir,
            app_bundle: None,
            disk_image: None,
            installer: None,
            snap: None,
        })
    }

    /// Rust project root (directory of the manifest).
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Enclosing workspace root, if any.
    pub fn workspace_dir(&self) -> Option<&Path> {
        self.workspace_dir.as_deref()
    }

    /// Cargo target directory.
    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    /// Profile output directory (`target/debug` or `target/release`).
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Build profile.
    pub fn profile(&self) -> Profile {
        self.profile
    }

    /// Package and binary name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Package version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Package description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Bundle identifier.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Pinned toolkit version.
    pub fn toolkit_version(&self) -> &str {
        &self.toolkit_version
    }

    /// Engine build, when it could be determined.
    pub fn engine_version(&self) -> Option<&str> {
        self.engine_version.as_deref()
    }

    /// Toolkit SDK root, when supplied.
    pub fn toolkit_root(&self) -> Option<&Path> {
        self.toolkit_root.as_deref()
    }

    /// Directories searched, in order, for the engine framework.
    pub fn framework_search_dirs(&self) -> &[PathBuf] {
        &self.framework_search_dirs
    }

    /// Native resources (`icon.icns`, `icon.ico`, `icudtl.dat`).
    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }

    /// Directory the asset bundler runs in.
    pub fn toolkit_project_dir(&self) -> &Path {
        &self.toolkit_project_dir
    }

    /// Asset bundle produced by the toolkit.
    pub fn toolkit_assets_dir(&self) -> &Path {
        &self.toolkit_assets_dir
    }

    /// Compiled binary in the profile output directory.
    pub fn binary_path(&self) -> PathBuf {
        self.output_dir.join(&self.name)
    }

    /// App bundle paths added by the app bundle packager.
    pub fn app_bundle(&self) -> Option<&AppBundlePaths> {
        self.app_bundle.as_ref()
    }

    /// Disk image paths added by the disk image packager.
    pub fn disk_image(&self) -> Option<&DiskImagePaths> {
        self.disk_image.as_ref()
    }

    /// Installer slots added by the Windows installer packager.
    pub fn installer(&self) -> Option<&InstallerSlots> {
        self.installer.as_ref()
    }

    /// Snap paths added by the Linux packager.
    pub fn snap(&self) -> Option<&SnapPaths> {
        self.snap.as_ref()
    }

    pub(crate) fn with_app_bundle(&self, paths: AppBundlePaths) -> Self {
        Self {
            app_bundle: Some(paths),
            ..self.clone()
        }
    }

    pub(crate) fn with_disk_image(&self, paths: DiskImagePaths) -> Self {
        Self {
            disk_image: Some(paths),
            ..self.clone()
        }
    }

    pub(crate) fn with_installer(&self, slots: InstallerSlots) -> Self {
        Self {
            installer: Some(slots),
            ..self.clone()
        }
    }

    pub(crate) fn with_snap(&self, paths: SnapPaths) -> Self {
        Self {
            snap: Some(paths),
            ..self.clone()
        }
    }
}

/// Reads `<root>/bin/internal/engine.version`.
fn read_engine_version(toolkit_root: &Path) -> Option<String> {
    let path = toolkit_root.join("bin").join("internal").join("engine.version");
    match std::fs::read_to_string(&path) {
        Ok(version) => Some(version.trim().to_string()),
        Err(e) => {
            log::debug!("no engine version at {}: {}", path.display(), e);
            None
        }
    }
}

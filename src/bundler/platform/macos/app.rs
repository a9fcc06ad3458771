//! macOS `.app` bundle creation.
//!
//! Lays out the canonical bundle:
//!
//! ```text
//! <name>.app/Contents/
//!   Info.plist
//!   MacOS/<name>
//!   Frameworks/FlutterEmbedder.framework
//!   Resources/{icon.icns, icudtl.dat, flutter_assets/}
//! ```

use crate::bundler::{
    Environment,
    environment::ENGINE_FRAMEWORK,
    error::{Error, ErrorExt, Result},
    platform::{require_dir, require_file},
    template::{self, Escape},
    utils::fs::{self, PartialArtifactGuard},
};
use std::path::{Path, PathBuf};

const STAGE: &str = "app bundle";

/// Bundle locations derived by [`prepare`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppBundlePaths {
    /// `<name>.app`
    pub app_name: String,
    /// `<output_dir>/<name>.app`
    pub app_path: PathBuf,
}

impl AppBundlePaths {
    /// `Contents` directory.
    pub fn contents_dir(&self) -> PathBuf {
        self.app_path.join("Contents")
    }

    /// Executable directory.
    pub fn macos_dir(&self) -> PathBuf {
        self.contents_dir().join("MacOS")
    }

    /// Shared library directory.
    pub fn frameworks_dir(&self) -> PathBuf {
        self.contents_dir().join("Frameworks")
    }

    /// Resource directory.
    pub fn resources_dir(&self) -> PathBuf {
        self.contents_dir().join("Resources")
    }
}

/// Adds the `.app` name and path to the environment.
pub fn prepare(env: &Environment) -> Environment {
    let app_name = format!("{}.app", env.name());
    let app_path = env.output_dir().join(&app_name);
    env.with_app_bundle(AppBundlePaths { app_name, app_path })
}

/// Inputs of the bundle, resolved and checked before anything is written.
struct BundleInputs {
    binary: PathBuf,
    framework: PathBuf,
    icon: PathBuf,
    icu_data: PathBuf,
    toolkit_assets: PathBuf,
}

fn check_inputs(env: &Environment) -> Result<BundleInputs> {
    let binary = env.binary_path();
    require_file(STAGE, "compiled binary", &binary)?;

    let framework = locate_framework(env)?;

    let icon = env.assets_dir().join("icon.icns");
    require_file(STAGE, "application icon", &icon)?;

    let icu_data = env.assets_dir().join("icudtl.dat");
    require_file(STAGE, "ICU locale data", &icu_data)?;

    let toolkit_assets = env.toolkit_assets_dir().to_path_buf();
    require_dir(STAGE, "asset bundle", &toolkit_assets)?;

    Ok(BundleInputs {
        binary,
        framework,
        icon,
        icu_data,
        toolkit_assets,
    })
}

/// First framework search directory holding the engine framework.
fn locate_framework(env: &Environment) -> Result<PathBuf> {
    env.framework_search_dirs()
        .iter()
        .map(|dir| dir.join(ENGINE_FRAMEWORK))
        .find(|candidate| candidate.is_dir())
        .ok_or_else(|| {
            let expected = env
                .framework_search_dirs()
                .first()
                .map(|dir| dir.join(ENGINE_FRAMEWORK))
                .unwrap_or_else(|| PathBuf::from(ENGINE_FRAMEWORK));
            Error::missing(
                STAGE,
                format!("engine framework for toolkit {}", env.toolkit_version()),
                expected,
            )
        })
}

/// Builds the `.app` bundle and returns its path.
///
/// Any bundle left by a previous run is removed first, so the result only
/// contains files from this run. If a copy fails halfway, the partial bundle
/// is removed as well.
pub async fn bundle_project(env: &Environment) -> Result<PathBuf> {
    let paths = env.app_bundle().ok_or_else(|| {
        Error::missing(
            STAGE,
            "bundle paths (environment was not prepared)",
            env.output_dir(),
        )
    })?;
    let inputs = check_inputs(env)?;

    log::info!("Creating {}", paths.app_name);

    fs::remove_dir_all(&paths.app_path).await?;
    let guard = PartialArtifactGuard::new(&paths.app_path);

    let macos_dir = paths.macos_dir();
    let frameworks_dir = paths.frameworks_dir();
    let resources_dir = paths.resources_dir();
    for dir in [&macos_dir, &frameworks_dir, &resources_dir] {
        fs::create_dir_all(dir, false).await?;
    }

    let bundled_binary = macos_dir.join(env.name());
    fs::copy_file(&inputs.binary, &bundled_binary).await?;
    fs::make_executable(&bundled_binary).await?;

    fs::copy_dir(&inputs.framework, &frameworks_dir.join(ENGINE_FRAMEWORK)).await?;

    fs::copy_file(&inputs.icon, &resources_dir.join("icon.icns")).await?;
    fs::copy_file(&inputs.icu_data, &resources_dir.join("icudtl.dat")).await?;
    fs::copy_dir(&inputs.toolkit_assets, &resources_dir.join("flutter_assets")).await?;

    write_info_plist(env, &paths.contents_dir()).await?;

    let app_path = guard.commit();
    log::info!("✓ Created app bundle: {}", app_path.display());
    Ok(app_path)
}

#[derive(serde::Serialize)]
struct InfoPlistContext<'a> {
    executable: &'a str,
    name: &'a str,
    identifier: &'a str,
    version: &'a str,
}

const INFO_PLIST_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
	<key>CFBundleExecutable</key>
	<string>{{executable}}</string>
	<key>CFBundleName</key>
	<string>{{name}}</string>
	<key>CFBundleIconFile</key>
	<string>icon.icns</string>
	<key>CFBundleIdentifier</key>
	<string>{{identifier}}</string>
	<key>CFBundleShortVersionString</key>
	<string>{{version}}</string>
	<key>CFBundlePackageType</key>
	<string>APPL</string>
	<key>NSHighResolutionCapable</key>
	<true/>
	<key>LSUIElement</key>
	<true/>
</dict>
</plist>
"#;

async fn write_info_plist(env: &Environment, contents_dir: &Path) -> Result<()> {
    let context = InfoPlistContext {
        executable: env.name(),
        name: env.name(),
        identifier: env.identifier(),
        version: env.version(),
    };
    let plist = template::render("Info.plist", INFO_PLIST_TEMPLATE, &context, Escape::Markup)?;

    let plist_path = contents_dir.join("Info.plist");
    tokio::fs::write(&plist_path, plist)
        .await
        .fs_context("writing Info.plist", &plist_path)
}

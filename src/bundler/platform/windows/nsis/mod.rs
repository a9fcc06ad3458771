//! Windows NSIS installer creation.
//!
//! The installer script is fixed and reads its inputs from environment
//! variables (`$%NAME%`, `$%FILE1%`, ...). [`prepare`] derives those values as
//! [`InstallerSlots`] and [`bundle_project`] passes them to `makensis`.
//!
//! # Module Organization
//!
//! - `template` - embedded NSI script
//! - `utils` - script file helpers

mod template;
mod utils;

use crate::bundler::{
    Environment,
    builder::tool_detection::locate_tool,
    error::{Error, ErrorExt, Result},
    platform::{require_dir, require_file},
    utils::{
        fs::{self, PartialArtifactGuard},
        process::ExternalCommand,
    },
};
use std::path::PathBuf;

const STAGE: &str = "windows installer";

/// Engine library shipped next to the executable.
pub const ENGINE_LIBRARY: &str = "flutter_engine.dll";

/// Installer file written into the output directory.
pub const INSTALLER_FILE: &str = "Installer.exe";

/// Values the installer script reads from its environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallerSlots {
    /// `NAME`
    pub name: String,
    /// `VERSION`
    pub version: String,
    /// `FILE1`: the application executable.
    pub executable: PathBuf,
    /// `FILE2`: the engine library.
    pub engine_library: PathBuf,
    /// `FILE3`: ICU locale data.
    pub icu_data: PathBuf,
    /// `ICON`
    pub icon: PathBuf,
    /// `FLUTTER_ASSETS`
    pub flutter_assets: PathBuf,
    /// `OUTPUT_FILE`
    pub output_file: PathBuf,
}

impl InstallerSlots {
    /// Slot names paired with their values, as exported to `makensis`.
    pub fn env_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("NAME", self.name.clone()),
            ("VERSION", self.version.clone()),
            ("FILE1", self.executable.display().to_string()),
            ("FILE2", self.engine_library.display().to_string()),
            ("FILE3", self.icu_data.display().to_string()),
            ("ICON", self.icon.display().to_string()),
            ("FLUTTER_ASSETS", self.flutter_assets.display().to_string()),
            ("OUTPUT_FILE", self.output_file.display().to_string()),
        ]
    }
}

/// Adds the installer slots to the environment.
pub fn prepare(env: &Environment) -> Environment {
    let output_dir = env.output_dir();
    let slots = InstallerSlots {
        name: env.name().to_string(),
        version: env.version().to_string(),
        executable: output_dir.join(format!("{}.exe", env.name())),
        engine_library: output_dir.join(ENGINE_LIBRARY),
        icu_data: env.assets_dir().join("icudtl.dat"),
        icon: env.assets_dir().join("icon.ico"),
        flutter_assets: env.toolkit_assets_dir().to_path_buf(),
        output_file: output_dir.join(INSTALLER_FILE),
    };
    env.with_installer(slots)
}

fn check_inputs(slots: &InstallerSlots) -> Result<()> {
    require_file(STAGE, "compiled executable", &slots.executable)?;
    require_file(STAGE, "engine library", &slots.engine_library)?;
    require_file(STAGE, "ICU locale data", &slots.icu_data)?;
    require_file(STAGE, "installer icon", &slots.icon)?;
    require_dir(STAGE, "asset bundle", &slots.flutter_assets)
}

/// Bundle project as NSIS installer.
///
/// # Process
///
/// 1. Check every slot path and locate `makensis`
/// 2. Write the NSI script into a temporary directory
/// 3. Remove any previous installer
/// 4. Run `makensis` with the slots exported as environment variables
pub async fn bundle_project(env: &Environment) -> Result<PathBuf> {
    let slots = env.installer().ok_or_else(|| {
        Error::missing(
            STAGE,
            "installer slots (environment was not prepared)",
            env.output_dir(),
        )
    })?;
    check_inputs(slots)?;
    let makensis = locate_tool("makensis")?;

    log::info!("Building NSIS installer for {}", slots.name);

    let script_dir = tempfile::tempdir().map_err(Error::IoError)?;
    let nsi_path = script_dir.path().join("installer.nsi");
    utils::write_utf8_bom(&nsi_path, template::NSI_TEMPLATE).await?;

    fs::remove_file(&slots.output_file).await?;
    let guard = PartialArtifactGuard::new(&slots.output_file);

    let mut command = ExternalCommand::new(makensis)
        .args(["-V3", "-INPUTCHARSET", "UTF8"])
        .arg(&nsi_path)
        .current_dir(env.output_dir());
    for (key, value) in slots.env_pairs() {
        command = command.env(key, value);
    }
    command.run().await?;

    tokio::fs::metadata(&slots.output_file)
        .await
        .fs_context("locating compiled installer", &slots.output_file)?;

    let installer = guard.commit();
    log::info!("✓ Created NSIS installer: {}", installer.display());
    Ok(installer)
}

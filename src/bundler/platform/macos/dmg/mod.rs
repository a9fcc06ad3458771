//! macOS DMG disk image creator.
//!
//! Wraps the `.app` bundle in a drag-to-install disk image using `dmgbuild`.
//! The window layout is described by a generated settings script that only
//! lives for the duration of the dmgbuild run.

mod settings;

pub use settings::{APP_ICON_POSITION, APPLICATIONS_ICON_POSITION};

use super::app;
use crate::bundler::{
    Environment,
    builder::tool_detection::locate_tool,
    error::{Error, ErrorExt, Result},
    platform::require_dir,
    utils::{
        fs::{self, PartialArtifactGuard},
        process::ExternalCommand,
    },
};
use std::{io::Write, path::PathBuf};

const STAGE: &str = "disk image";

/// Disk image locations derived by [`prepare`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskImagePaths {
    /// `<output_dir>/<name>.dmg`
    pub dmg_path: PathBuf,
    /// Volume name shown when the image is mounted.
    pub volume_name: String,
}

/// Adds the app bundle and disk image paths to the environment.
pub fn prepare(env: &Environment) -> Environment {
    let env = app::prepare(env);
    let paths = DiskImagePaths {
        dmg_path: env.output_dir().join(format!("{}.dmg", env.name())),
        volume_name: env.name().to_string(),
    };
    env.with_disk_image(paths)
}

/// Bundle project as DMG disk image
///
/// # Process
/// 1. Check that the `.app` bundle exists and `dmgbuild` is installed
/// 2. Render the dmgbuild settings into a temporary file
/// 3. Remove any previous image
/// 4. Run `dmgbuild -s <settings> <volume> <dmg>`
///
/// The settings file is removed on every exit path and a failed run leaves
/// no image behind.
pub async fn bundle_project(env: &Environment) -> Result<PathBuf> {
    let (bundle, image) = match (env.app_bundle(), env.disk_image()) {
        (Some(bundle), Some(image)) => (bundle, image),
        _ => {
            return Err(Error::missing(
                STAGE,
                "disk image paths (environment was not prepared)",
                env.output_dir(),
            ));
        }
    };
    require_dir(STAGE, "app bundle", &bundle.app_path)?;
    let dmgbuild = locate_tool("dmgbuild")?;

    log::info!("Creating DMG for {}", env.name());

    let script = settings::render(env, &bundle.app_path, &bundle.app_name)?;
    let mut settings_file = tempfile::Builder::new()
        .prefix("dmg-settings-")
        .suffix(".py")
        .tempfile()
        .map_err(Error::IoError)?;
    settings_file
        .write_all(script.as_bytes())
        .fs_context("writing dmgbuild settings", settings_file.path())?;
    log::debug!("dmgbuild settings at {}", settings_file.path().display());

    fs::remove_file(&image.dmg_path).await?;
    let guard = PartialArtifactGuard::new(&image.dmg_path);

    ExternalCommand::new(dmgbuild)
        .arg("-s")
        .arg(settings_file.path())
        .arg(&image.volume_name)
        .arg(&image.dmg_path)
        .run()
        .await?;

    if !image.dmg_path.is_file() {
        return Err(Error::GenericError(format!(
            "dmgbuild finished without writing {}",
            image.dmg_path.display()
        )));
    }

    let dmg_path = guard.commit();
    log::info!("✓ Created DMG: {}", dmg_path.display());
    Ok(dmg_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::BuildFlags;

    fn environment(root: &std::path::Path) -> Environment {
        std::fs::write(
            root.join("Cargo.toml"),
            "[package]\nname = \"demo\"\nversion = \"0.1.0\"\n\n[package.metadata.flutter]\nversion = \"1.12.13\"\n",
        )
        .unwrap();
        Environment::discover(&BuildFlags::new(root)).unwrap()
    }

    #[test]
    fn prepare_includes_app_bundle_paths() {
        let tmp = tempfile::tempdir().unwrap();
        let env = environment(tmp.path());
        let snapshot = env.clone();

        let prepared = prepare(&env);
        assert_eq!(env, snapshot);
        assert_eq!(
            prepared.app_bundle().unwrap().app_path,
            env.output_dir().join("demo.app")
        );
        let image = prepared.disk_image().unwrap();
        assert_eq!(image.dmg_path, env.output_dir().join("demo.dmg"));
        assert_eq!(image.volume_name, "demo");
    }

    #[tokio::test]
    async fn missing_app_bundle_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let env = prepare(&environment(tmp.path()));

        let err = bundle_project(&env).await.unwrap_err();
        match err {
            Error::PrerequisiteMissing { path, .. } => {
                assert_eq!(path, env.output_dir().join("demo.app"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!env.disk_image().unwrap().dmg_path.exists());
    }

    #[tokio::test]
    async fn unprepared_environment_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let env = environment(tmp.path());
        let err = bundle_project(&env).await.unwrap_err();
        assert!(matches!(err, Error::PrerequisiteMissing { .. }), "{err:?}");
    }
}

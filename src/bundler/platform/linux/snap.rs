//! Linux snap package creation.
//!
//! Stages the application into a scratch directory next to the output and
//! runs `snapcraft` there with the `dump` plugin, so the package contains
//! exactly the staged files:
//!
//! ```text
//! snap-stage/
//!   snap/snapcraft.yaml
//!   payload/bin/<name>
//!   payload/bin/icudtl.dat
//!   payload/bin/flutter_assets/
//! ```

use crate::bundler::{
    Environment,
    builder::tool_detection::locate_tool,
    error::{Error, ErrorExt, Result},
    platform::{require_dir, require_file},
    template::{self, Escape},
    utils::{
        fs::{self, PartialArtifactGuard},
        process::ExternalCommand,
    },
};
use std::path::{Path, PathBuf};

const STAGE: &str = "linux package";

/// Longest summary the snap store accepts.
const MAX_SUMMARY_LEN: usize = 78;

/// Snap locations derived by [`prepare`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapPaths {
    /// Scratch directory snapcraft runs in.
    pub stage_dir: PathBuf,
    /// `<output_dir>/<name>_<version>_<arch>.snap`
    pub snap_path: PathBuf,
    /// Snap architecture name (`amd64`, `arm64`, ...).
    pub arch: String,
}

/// Snap architecture for a Rust target architecture.
pub fn snap_arch(rust_arch: &str) -> &str {
    match rust_arch {
        "x86_64" => "amd64",
        "x86" => "i386",
        "aarch64" => "arm64",
        "arm" => "armhf",
        "powerpc64" => "ppc64el",
        other => other,
    }
}

/// Adds the staging directory and snap path to the environment.
pub fn prepare(env: &Environment) -> Environment {
    let arch = snap_arch(std::env::consts::ARCH).to_string();
    let paths = SnapPaths {
        stage_dir: env.output_dir().join("snap-stage"),
        snap_path: env
            .output_dir()
            .join(format!("{}_{}_{}.snap", env.name(), env.version(), arch)),
        arch,
    };
    env.with_snap(paths)
}

/// Single-quoted YAML scalar.
fn yaml_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn summary(env: &Environment) -> String {
    let text = if env.description().is_empty() {
        format!("{} desktop application", env.name())
    } else {
        env.description().lines().next().unwrap_or_default().to_string()
    };
    text.chars().take(MAX_SUMMARY_LEN).collect()
}

#[derive(serde::Serialize)]
struct SnapcraftContext {
    name: String,
    quoted_name: String,
    version: String,
    summary: String,
    description: String,
    arch: String,
}

const SNAPCRAFT_TEMPLATE: &str = r#"name: {{quoted_name}}
version: {{version}}
summary: {{summary}}
description: {{description}}
base: core22
grade: stable
confinement: strict
architectures:
  - build-on: [{{arch}}]

apps:
  {{name}}:
    command: bin/{{name}}
    plugs: [desktop, desktop-legacy, wayland, x11, opengl, home, network]

parts:
  {{name}}:
    plugin: dump
    source: payload
"#;

fn render_snapcraft(env: &Environment, paths: &SnapPaths) -> Result<String> {
    let description = if env.description().is_empty() {
        summary(env)
    } else {
        env.description().to_string()
    };
    let context = SnapcraftContext {
        name: env.name().to_string(),
        quoted_name: yaml_quote(env.name()),
        version: yaml_quote(env.version()),
        summary: yaml_quote(&summary(env)),
        description: yaml_quote(&description),
        arch: paths.arch.clone(),
    };
    template::render("snapcraft.yaml", SNAPCRAFT_TEMPLATE, &context, Escape::Verbatim)
}

async fn stage(env: &Environment, paths: &SnapPaths, binary: &Path, icu_data: &Path) -> Result<()> {
    let bin_dir = paths.stage_dir.join("payload").join("bin");
    fs::create_dir_all(&bin_dir, false).await?;

    let staged_binary = bin_dir.join(env.name());
    fs::copy_file(binary, &staged_binary).await?;
    fs::make_executable(&staged_binary).await?;
    fs::copy_file(icu_data, &bin_dir.join("icudtl.dat")).await?;
    fs::copy_dir(env.toolkit_assets_dir(), &bin_dir.join("flutter_assets")).await?;

    let snap_dir = paths.stage_dir.join("snap");
    fs::create_dir_all(&snap_dir, false).await?;
    let manifest = snap_dir.join("snapcraft.yaml");
    tokio::fs::write(&manifest, render_snapcraft(env, paths)?)
        .await
        .fs_context("writing snapcraft.yaml", &manifest)
}

/// Bundle project as a snap.
///
/// The staging directory is recreated for every run and removed afterwards,
/// whether or not snapcraft succeeds.
pub async fn bundle_project(env: &Environment) -> Result<PathBuf> {
    let paths = env.snap().ok_or_else(|| {
        Error::missing(
            STAGE,
            "snap paths (environment was not prepared)",
            env.output_dir(),
        )
    })?;

    let binary = env.binary_path();
    require_file(STAGE, "compiled binary", &binary)?;
    let icu_data = env.assets_dir().join("icudtl.dat");
    require_file(STAGE, "ICU locale data", &icu_data)?;
    require_dir(STAGE, "asset bundle", env.toolkit_assets_dir())?;
    let snapcraft = locate_tool("snapcraft")?;

    log::info!("Creating snap for {}", env.name());

    fs::create_dir_all(&paths.stage_dir, true).await?;
    // Never committed: the stage is scratch space.
    let _stage_guard = PartialArtifactGuard::new(&paths.stage_dir);
    stage(env, paths, &binary, &icu_data).await?;

    fs::remove_file(&paths.snap_path).await?;
    let guard = PartialArtifactGuard::new(&paths.snap_path);

    ExternalCommand::new(snapcraft)
        .args(["pack", "--destructive-mode", "--output"])
        .arg(&paths.snap_path)
        .current_dir(&paths.stage_dir)
        .run()
        .await?;

    tokio::fs::metadata(&paths.snap_path)
        .await
        .fs_context("locating built snap", &paths.snap_path)?;

    let snap_path = guard.commit();
    log::info!("✓ Created snap: {}", snap_path.display());
    Ok(snap_path)
}

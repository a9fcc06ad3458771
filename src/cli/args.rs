//! Command line argument parsing.
//!
//! Toolkit overrides can come from flags or their environment variables;
//! clap resolves both so the library only ever sees explicit values.

use crate::{
    bundler::{BuildFlags, PackageType, Profile, ToolkitOverrides},
    dev::DEFAULT_READINESS_TIMEOUT,
    error::{CliError, Result},
};
use clap::{Parser, Subcommand};
use path_absolutize::Absolutize;
use std::{path::PathBuf, time::Duration};

/// Package and run Rust desktop applications with a Flutter front end
#[derive(Parser, Debug)]
#[command(
    name = "flutter-bundler",
    version,
    about = "Package and run Rust desktop applications with a Flutter front end",
    long_about = "Compiles a Rust project, builds its Flutter asset bundle and packages both
into a macOS app bundle, a disk image, a Windows installer or a snap.

Usage:
  flutter-bundler build mac --release
  flutter-bundler build dmg --project-dir ./app/rust
  flutter-bundler build nsis --json
  flutter-bundler run --timeout 60

Exit code 0 = artifact exists at the printed path."
)]
pub struct Args {
    /// Only print results and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile, build the asset bundle and package the application
    Build(BuildArgs),
    /// Run the application and attach the hot-reload client
    Run(RunArgs),
}

/// Arguments of `build`.
#[derive(clap::Args, Debug)]
pub struct BuildArgs {
    /// Package to create
    #[arg(value_enum, value_name = "TARGET")]
    pub target: PackageType,

    /// Print the artifact as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub project: ProjectArgs,
}

/// Arguments of `run`.
#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Seconds to wait for the application to report readiness
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_READINESS_TIMEOUT.as_secs())]
    pub timeout: u64,

    #[command(flatten)]
    pub project: ProjectArgs,
}

impl RunArgs {
    /// Readiness deadline.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// Project selection and toolkit overrides shared by every subcommand.
#[derive(clap::Args, Debug)]
pub struct ProjectArgs {
    /// Use the release profile
    #[arg(long)]
    pub release: bool,

    /// Directory to search for the project manifest from (default: current directory)
    #[arg(long, value_name = "DIR")]
    pub project_dir: Option<PathBuf>,

    /// Flutter SDK root
    #[arg(long, env = "FLUTTER_ROOT", value_name = "DIR")]
    pub flutter_root: Option<PathBuf>,

    /// Flutter engine build to use
    #[arg(long, env = "FLUTTER_ENGINE_VERSION", value_name = "HASH")]
    pub engine_version: Option<String>,

    /// Workspace root used when none is found above the project
    #[arg(long, env = "FLUTTER_BUNDLER_WORKSPACE", value_name = "DIR")]
    pub workspace_root: Option<PathBuf>,
}

impl ProjectArgs {
    /// Resolves the arguments against the current directory.
    pub fn build_flags(&self) -> Result<BuildFlags> {
        let cwd = std::env::current_dir()?;
        let start_dir = match &self.project_dir {
            Some(dir) => dir.absolutize_from(&cwd)?.into_owned(),
            None => cwd.clone(),
        };
        if !start_dir.is_dir() {
            return Err(CliError::MissingProjectDir { path: start_dir }.into());
        }

        let absolute = |path: &Option<PathBuf>| -> Result<Option<PathBuf>> {
            Ok(match path {
                Some(p) => Some(p.absolutize_from(&cwd)?.into_owned()),
                None => None,
            })
        };

        let overrides = ToolkitOverrides {
            toolkit_root: absolute(&self.flutter_root)?,
            engine_version: self.engine_version.clone().filter(|v| !v.trim().is_empty()),
            workspace_root: absolute(&self.workspace_root)?,
            engine_cache_dir: dirs::cache_dir(),
        };

        Ok(BuildFlags::new(start_dir)
            .profile(Profile::from_release(self.release))
            .overrides(overrides))
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

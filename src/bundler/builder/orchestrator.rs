//! Main bundler orchestration.
//!
//! This module provides the [`Bundler`] orchestrator that runs the packaging
//! pipeline for one selected [`PackageType`]:
//!
//! 1. compile the Rust project
//! 2. build the toolkit asset bundle
//! 3. `prepare` the environment for the package type
//! 4. `build` the artifact
//!
//! Stages run strictly in sequence. The first failure aborts the remaining
//! stages and nothing completed earlier is rolled back.

use super::tool_detection::toolkit_executable;
use crate::bundler::{Artifact, Environment, PackageType, Result, utils::process::ExternalCommand};

/// External commands for the compile and asset-bundle stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    /// Compiles the project binary.
    pub compile: ExternalCommand,
    /// Produces the toolkit asset bundle.
    pub asset_bundle: ExternalCommand,
}

impl Toolchain {
    /// `cargo build [--release]` in the project directory and
    /// `flutter build bundle` in the toolkit project directory.
    pub fn for_environment(env: &Environment) -> Self {
        let mut compile = ExternalCommand::new("cargo")
            .arg("build")
            .current_dir(env.project_dir());
        if env.profile().is_release() {
            compile = compile.arg("--release");
        }

        Self {
            compile,
            asset_bundle: asset_bundle_command(env),
        }
    }
}

/// `flutter build bundle` in the toolkit project directory.
pub fn asset_bundle_command(env: &Environment) -> ExternalCommand {
    ExternalCommand::new(toolkit_executable(env.toolkit_root()))
        .args(["build", "bundle"])
        .current_dir(env.toolkit_project_dir())
}

/// Main bundler orchestrator.
///
/// Holds the derived environment and the toolchain used for the first two
/// stages. The environment is never modified; every package type works on
/// its own prepared copy.
///
/// # Examples
///
/// ```no_run
/// use flutter_app_bundler::bundler::{BuildFlags, Bundler, Environment, PackageType, Toolchain};
///
/// # async fn example() -> flutter_app_bundler::bundler::Result<()> {
/// let env = Environment::discover(&BuildFlags::new("/path/to/app/rust"))?;
/// let toolchain = Toolchain::for_environment(&env);
/// let artifact = Bundler::new(env, toolchain).bundle(PackageType::Dmg).await?;
/// println!("Created: {} ({} bytes)", artifact.path.display(), artifact.size);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Bundler {
    env: Environment,
    toolchain: Toolchain,
}

impl Bundler {
    /// Creates a bundler for `env`.
    pub fn new(env: Environment, toolchain: Toolchain) -> Self {
        Self { env, toolchain }
    }

    /// Returns the environment the bundler was created with.
    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Runs every stage for `package_type` and returns the artifact.
    pub async fn bundle(&self, package_type: PackageType) -> Result<Artifact> {
        log::info!("[1/4] Compiling {}", self.env.name());
        self.toolchain.compile.run().await?;

        log::info!("[2/4] Building asset bundle");
        self.toolchain.asset_bundle.run().await?;

        log::info!("[3/4] Preparing {} package", package_type);
        let prepared = package_type.prepare(&self.env);

        log::info!("[4/4] Building {} package", package_type);
        self.package(package_type, &prepared).await
    }

    /// Builds the dependencies of `package_type`, then `package_type` itself.
    async fn package(&self, package_type: PackageType, prepared: &Environment) -> Result<Artifact> {
        for dependency in package_type.dependencies() {
            log::info!("Building {} (required by {})", dependency, package_type);
            let env = dependency.prepare(&self.env);
            dependency.build(&env).await?;
        }

        let artifact = package_type.build(prepared).await?;
        log::info!(
            "✓ {} package: {} ({} bytes, sha256 {})",
            package_type,
            artifact.path.display(),
            artifact.size,
            artifact.checksum
        );
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::{BuildFlags, Error, Profile};
    use std::path::Path;

    fn environment(project: &Path, profile: Profile) -> Environment {
        std::fs::create_dir_all(project).unwrap();
        std::fs::write(
            project.join("Cargo.toml"),
            "[package]\nname = \"demo\"\nversion = \"0.1.0\"\n\n[package.metadata.flutter]\nversion = \"1.12.13\"\n",
        )
        .unwrap();
        Environment::discover(&BuildFlags::new(project).profile(profile)).unwrap()
    }

    #[test]
    fn default_toolchain_follows_profile() {
        let tmp = tempfile::tempdir().unwrap();
        let project = tmp.path().join("app/rust");

        let debug = Toolchain::for_environment(&environment(&project, Profile::Debug));
        assert_eq!(debug.compile, ExternalCommand::new("cargo").arg("build").current_dir(&project));

        let release = Toolchain::for_environment(&environment(&project, Profile::Release));
        assert_eq!(release.compile.display(), "cargo build --release");
        assert!(release.asset_bundle.display().ends_with("build bundle"));
    }

    #[cfg(unix)]
    fn shell(script: &str) -> ExternalCommand {
        ExternalCommand::new("sh").args(["-c", script])
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn compile_failure_aborts_before_asset_stage() {
        let tmp = tempfile::tempdir().unwrap();
        let env = environment(&tmp.path().join("app/rust"), Profile::Debug);
        let marker = tmp.path().join("assets-ran");

        let toolchain = Toolchain {
            compile: shell("exit 7"),
            asset_bundle: shell(&format!("touch '{}'", marker.display())),
        };
        let err = Bundler::new(env, toolchain)
            .bundle(PackageType::AppBundle)
            .await
            .unwrap_err();

        assert_eq!(err.tool_exit_code(), Some(7));
        assert!(!marker.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn asset_failure_aborts_before_packaging() {
        let tmp = tempfile::tempdir().unwrap();
        let env = environment(&tmp.path().join("app/rust"), Profile::Debug);
        let output_dir = env.output_dir().to_path_buf();

        let toolchain = Toolchain {
            compile: shell("exit 0"),
            asset_bundle: shell("exit 3"),
        };
        let err = Bundler::new(env, toolchain)
            .bundle(PackageType::Dmg)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::ExternalTool { .. }), "{err:?}");
        assert_eq!(err.tool_exit_code(), Some(3));
        assert!(!output_dir.join("demo.app").exists());
        assert!(!output_dir.join("demo.dmg").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn packaging_runs_on_a_prepared_copy() {
        let tmp = tempfile::tempdir().unwrap();
        let env = environment(&tmp.path().join("app/rust"), Profile::Debug);
        let snapshot = env.clone();

        let toolchain = Toolchain {
            compile: shell("exit 0"),
            asset_bundle: shell("exit 0"),
        };
        let bundler = Bundler::new(env, toolchain);
        let err = bundler.bundle(PackageType::Nsis).await.unwrap_err();

        assert!(matches!(err, Error::PrerequisiteMissing { .. }), "{err:?}");
        assert_eq!(bundler.environment(), &snapshot);
    }
}

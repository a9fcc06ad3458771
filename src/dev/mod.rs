//! Development workflow: run the application with hot reload attached.

pub mod readiness;
pub mod run_loop;

pub use readiness::{ReadinessMatcher, ReadinessScanner};
pub use run_loop::{ATTACH_DEVICE_ID, DEFAULT_READINESS_TIMEOUT, DevRunLoop, RunState};

use crate::bundler::{
    Environment, Result,
    builder::{asset_bundle_command, tool_detection::toolkit_executable},
    utils::process::ExternalCommand,
};
use std::time::Duration;

/// `cargo run [--release]` in the project directory.
pub fn run_command(env: &Environment) -> ExternalCommand {
    let command = ExternalCommand::new("cargo")
        .arg("run")
        .current_dir(env.project_dir());
    if env.profile().is_release() {
        command.arg("--release")
    } else {
        command
    }
}

/// `flutter attach --device-id=flutter-tester` in the toolkit project directory.
pub fn attach_command(env: &Environment) -> ExternalCommand {
    ExternalCommand::new(toolkit_executable(env.toolkit_root()))
        .arg("attach")
        .arg(format!("--device-id={ATTACH_DEVICE_ID}"))
        .current_dir(env.toolkit_project_dir())
}

/// Builds the asset bundle, then runs the application with the attach client.
pub async fn run_dev(env: &Environment, timeout: Duration) -> Result<()> {
    log::info!("Building asset bundle");
    asset_bundle_command(env).run().await?;

    let mut dev = DevRunLoop::new(run_command(env), attach_command(env), timeout)?;
    dev.run().await
}

//! Command line interface for the Flutter desktop bundler.
//!
//! `build` runs the packaging pipeline for one target, `run` starts the
//! development loop. Both resolve the project from `--project-dir` or the
//! current directory.

mod args;
mod output;

pub use args::{Args, BuildArgs, Command, ProjectArgs, RunArgs};
pub use output::OutputManager;

use crate::{
    bundler::{Bundler, Environment, Toolchain},
    dev,
    error::Result,
};

/// Main CLI entry point
pub async fn run() -> Result<()> {
    let args = Args::parse_args();
    let output = OutputManager::new(args.quiet);

    match args.command {
        Command::Build(build) => run_build(build, output).await,
        Command::Run(run) => run_dev(run, output).await,
    }
}

async fn run_build(args: BuildArgs, output: OutputManager) -> Result<()> {
    let env = Environment::discover(&args.project.build_flags()?)?;
    output.section(&format!(
        "Packaging {} {} as {}",
        env.name(),
        env.version(),
        args.target
    ))?;

    let toolchain = Toolchain::for_environment(&env);
    let artifact = Bundler::new(env, toolchain).bundle(args.target).await?;

    if args.json {
        output.result(&serde_json::to_string_pretty(&artifact)?)?;
    } else {
        output.success(&format!("Created {} package", artifact.package_type))?;
        output.result(&artifact.path.display().to_string())?;
        output.indent(&format!("size:   {} bytes", artifact.size))?;
        output.indent(&format!("sha256: {}", artifact.checksum))?;
    }
    Ok(())
}

async fn run_dev(args: RunArgs, output: OutputManager) -> Result<()> {
    let env = Environment::discover(&args.project.build_flags()?)?;
    output.progress(&format!(
        "Running {} (waiting up to {}s for readiness)",
        env.name(),
        args.timeout
    ))?;

    dev::run_dev(&env, args.timeout()).await?;
    output.success("Attach client exited")?;
    Ok(())
}

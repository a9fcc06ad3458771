//! External tool invocation.
//!
//! Every compiler, asset bundler and packaging tool runs as an opaque child
//! process. Runs are blocking from the pipeline's point of view and a non-zero
//! exit is fatal to the calling stage.

use crate::bundler::error::{Error, Result, ToolFailure};
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process::Stdio,
};
use tokio::process::Command;

/// A program with its arguments, working directory and extra environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    program: PathBuf,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    envs: Vec<(String, OsString)>,
}

impl ExternalCommand {
    /// Command running `program`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            envs: Vec::new(),
        }
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets the working directory.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Adds an environment variable for the child.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<OsString>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Program being run.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Short tool name used in logs and errors.
    pub fn tool_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.display().to_string())
    }

    /// Full command line for logging.
    pub fn display(&self) -> String {
        std::iter::once(self.program.display().to_string())
            .chain(self.args.iter().map(|a| a.to_string_lossy().into_owned()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Builds the tokio command without spawning it.
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(cwd) = &self.cwd {
            command.current_dir(cwd);
        }
        for (key, value) in &self.envs {
            command.env(key, value);
        }
        command
    }

    /// Runs to completion with inherited stdio.
    ///
    /// A missing executable is reported as [`ToolFailure::NotFound`], other
    /// spawn errors as [`ToolFailure::Spawn`], and an unsuccessful exit as
    /// [`ToolFailure::ExitStatus`].
    pub async fn run(&self) -> Result<()> {
        log::info!("Running {}", self.display());

        let status = self
            .to_command()
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if status.success() {
            Ok(())
        } else {
            Err(Error::ExternalTool {
                tool: self.tool_name(),
                failure: ToolFailure::ExitStatus(status.code()),
            })
        }
    }

    /// Maps a spawn error to an [`Error::ExternalTool`].
    pub fn spawn_error(&self, e: std::io::Error) -> Error {
        let failure = if e.kind() == std::io::ErrorKind::NotFound {
            ToolFailure::NotFound
        } else {
            ToolFailure::Spawn(e)
        };
        Error::ExternalTool {
            tool: self.tool_name(),
            failure,
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn successful_run() {
        ExternalCommand::new("sh").args(["-c", "exit 0"]).run().await.unwrap();
    }

    #[tokio::test]
    async fn non_zero_exit_carries_code() {
        let err = ExternalCommand::new("sh")
            .args(["-c", "exit 3"])
            .run()
            .await
            .unwrap_err();
        assert_eq!(err.tool_exit_code(), Some(3));
        assert!(matches!(err, Error::ExternalTool { ref tool, .. } if tool == "sh"));
    }

    #[tokio::test]
    async fn missing_program_is_not_found() {
        let err = ExternalCommand::new("definitely-not-an-installed-tool")
            .run()
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ExternalTool {
                failure: ToolFailure::NotFound,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn env_and_cwd_are_applied() {
        let dir = tempfile::tempdir().unwrap();
        ExternalCommand::new("sh")
            .args(["-c", "test \"$SLOT\" = value && test -d ./here"])
            .env("SLOT", "value")
            .current_dir(dir.path())
            .run()
            .await
            .unwrap_err();

        std::fs::create_dir(dir.path().join("here")).unwrap();
        ExternalCommand::new("sh")
            .args(["-c", "test \"$SLOT\" = value && test -d ./here"])
            .env("SLOT", "value")
            .current_dir(dir.path())
            .run()
            .await
            .unwrap();
    }
}
